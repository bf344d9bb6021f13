use std::collections::HashSet;
use std::fs;
use std::path::Path;

use boltgen::batch::{NoopObserver, Outcome, run_batch};
use boltgen::domain::BatchConfig;
use boltgen::io::checkpoint::read_checkpoint;
use boltgen::modeler::MeshModeler;
use boltgen::verify::{VerifyConfig, verify};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn write_table(path: &Path, rows: usize) {
    let mut csv = String::from("thread,body_diameter,pitch,head_diameter,body_length,head_height\n");
    for i in 0..rows {
        csv.push_str(&format!("\"M8, row {i}\",7.8,1.25,13,{},5.3\n", 30 + i));
    }
    fs::write(path, csv).unwrap();
}

fn config(dir: &Path, campaign: u32, batch: u32) -> BatchConfig {
    let mut config = BatchConfig::new(Some(dir.join("dims.csv")), dir.join("stl"));
    config.campaign_size = campaign;
    config.batch_size = batch;
    config
}

#[test]
fn campaign_resumes_across_runs_until_complete() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("dims.csv"), 12);
    let config = config(dir.path(), 10, 4);
    let mut rng = StdRng::seed_from_u64(2024);

    let mut seen = HashSet::new();
    let mut exported_per_run = Vec::new();
    for _ in 0..3 {
        let mut modeler = MeshModeler::new();
        let Outcome::Finished(summary) = run_batch(&config, &mut modeler, &mut NoopObserver, &mut rng).unwrap() else {
            panic!("campaign finished early");
        };
        assert_eq!(modeler.live_models(), 0);
        assert!(summary.checkpoint_error.is_none());
        exported_per_run.push(summary.exported);

        let saved = read_checkpoint(&config.checkpoint_path).unwrap();
        assert_eq!(saved, summary.checkpoint);
        // Every run only adds indices; earlier ones are never redrawn.
        assert!(seen.iter().all(|idx| saved.used_indices.contains(idx)));
        seen.extend(saved.used_indices.iter().copied());
    }
    assert_eq!(exported_per_run, [4, 4, 2]);

    let outcome = run_batch(&config, &mut MeshModeler::new(), &mut NoopObserver, &mut rng).unwrap();
    assert!(matches!(outcome, Outcome::CampaignComplete(plan) if plan.last_bolt == 10));

    for n in 1..=10 {
        assert!(config.export_path(n).is_file(), "bolt_{n}.stl missing");
    }

    let mut verify_config = VerifyConfig::new(
        dir.path().join("dims.csv"),
        config.checkpoint_path.clone(),
        config.export_dir.clone(),
    );
    verify_config.expected = 10;
    let report = verify(&verify_config).unwrap();
    assert_eq!(report.file_count, 10);
    assert!(report.duplicate_indices.is_empty());
    assert!(report.sizes.is_some_and(|s| s.min > 0));
    assert!(report.passed());
}

#[test]
fn missing_dataset_aborts_without_touching_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), 10, 4);
    config.csv_path = None;

    let err = run_batch(&config, &mut MeshModeler::new(), &mut NoopObserver, &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(config.export_dir.is_dir());
    assert!(!config.checkpoint_path.exists());
}

#[test]
fn unloadable_dataset_aborts_without_touching_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("dims.csv"), "thread,a,b,c,d,e\nM8,x,1,2,3,4\n").unwrap();
    let config = config(dir.path(), 10, 4);

    let err = run_batch(&config, &mut MeshModeler::new(), &mut NoopObserver, &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(!config.checkpoint_path.exists());
}

#[test]
fn verifier_reports_one_pair_for_identical_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv = "thread,body_diameter,pitch,head_diameter,body_length,head_height\n\
               M8,7.8,1.25,13,40,5.3\n\
               M8 copy,7.8,1.25,13,40,5.3\n\
               M10,9.8,1.5,16,55,6.4\n";
    fs::write(dir.path().join("dims.csv"), csv).unwrap();
    let config = config(dir.path(), 3, 3);

    run_batch(&config, &mut MeshModeler::new(), &mut NoopObserver, &mut StdRng::seed_from_u64(5)).unwrap();

    let mut verify_config = VerifyConfig::new(
        dir.path().join("dims.csv"),
        config.checkpoint_path.clone(),
        config.export_dir.clone(),
    );
    verify_config.expected = 3;
    let report = verify(&verify_config).unwrap();

    assert_eq!(report.duplicate_dimensions.len(), 1);
    let pair = &report.duplicate_dimensions[0];
    let mut indices = [pair.first_index, pair.duplicate_index];
    indices.sort();
    assert_eq!(indices, [0, 1]);
    assert!(!report.passed());
}
