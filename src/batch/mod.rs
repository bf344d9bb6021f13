//! Resumable batch driver.
//!
//! One call to `run_batch` is one run of the campaign:
//! validate config -> load checkpoint -> plan -> load table -> build bolts -> save checkpoint.
//!
//! The loop is single-threaded. Between bolts it reports progress to a
//! `BatchObserver` and asks whether the operator cancelled; a bolt that is
//! already being built always finishes (or fails) first.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use rand::Rng;

use crate::bolt::{derive_bolt_spec, thread_ladder};
use crate::data::{DimensionTable, SampleError, UnusedIndexSampler, load_dimension_table};
use crate::domain::{BatchConfig, BoltSpec, ThreadDesignation};
use crate::error::AppError;
use crate::io::checkpoint::{self, Checkpoint};
use crate::modeler::{BoltModeler, BuildError};

pub mod plan;

pub use plan::BatchPlan;

/// Driver states, logged at debug level as the run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Loading,
    Sampling,
    Building,
    Exporting,
    Checkpointing,
    Done,
    Aborted,
}

fn enter(state: BatchState) {
    debug!("batch state -> {state:?}");
}

/// Snapshot handed to the observer before each bolt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub built: u32,
    pub target: u32,
    pub attempts: u32,
    /// Sequence number the next successful bolt will get.
    pub next_bolt: u32,
    pub end_bolt: u32,
}

/// Progress sink and cancellation check for the batch loop.
pub trait BatchObserver {
    fn on_progress(&mut self, _progress: &BatchProgress) {}

    /// Polled once per bolt, after `on_progress`.
    fn is_cancelled(&self) -> bool {
        false
    }

    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Observer that never cancels and reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Everything a run needs, built explicitly instead of living in globals.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub config: BatchConfig,
    pub plan: BatchPlan,
    pub table: DimensionTable,
    pub sampler: UnusedIndexSampler,
}

/// Result of the entry checks.
#[derive(Debug, Clone)]
pub enum Prepared {
    CampaignComplete(BatchPlan),
    Ready(BatchContext),
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing left to build; not an error.
    CampaignComplete(BatchPlan),
    Finished(RunSummary),
}

/// End-of-run totals.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub plan: BatchPlan,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Bolts built and written to disk.
    pub exported: u32,
    /// Bolts dropped because no thread designation could be cut.
    pub discarded: u32,
    /// Bolts lost to body construction or export failures.
    pub errors: u32,
    pub attempts: u32,
    /// Exported bolts that needed a fallback designation.
    pub thread_fallbacks: u32,
    pub cancelled: bool,
    pub exhausted: Option<SampleError>,
    /// Checkpoint written at the end of the run (or that would have been written).
    pub checkpoint: Checkpoint,
    pub checkpoint_error: Option<String>,
}

impl RunSummary {
    fn new(plan: BatchPlan, checkpoint: Checkpoint) -> Self {
        let now = Local::now();
        Self {
            plan,
            started_at: now,
            finished_at: now,
            exported: 0,
            discarded: 0,
            errors: 0,
            attempts: 0,
            thread_fallbacks: 0,
            cancelled: false,
            exhausted: None,
            checkpoint,
            checkpoint_error: None,
        }
    }

    /// Plan of the next run given what this one produced.
    pub fn next_plan(&self) -> BatchPlan {
        self.plan.advance(self.exported)
    }
}

/// What happened to a single bolt.
#[derive(Debug, Clone, PartialEq)]
pub enum BoltOutcome {
    /// `fallback` is the ladder position of the designation that worked (0 = exact).
    Exported {
        thread: Option<ThreadDesignation>,
        fallback: usize,
    },
    /// Every designation failed; the model was deleted.
    ThreadFailed,
    Failed(BuildError),
}

/// Entry checks: export dir, dataset path, checkpoint, campaign arithmetic, table load.
pub fn prepare(config: &BatchConfig) -> Result<Prepared, AppError> {
    enter(BatchState::Idle);
    if config.batch_size == 0 || config.campaign_size == 0 {
        return Err(AppError::new(2, "Campaign size and batch size must be > 0."));
    }

    fs::create_dir_all(&config.export_dir).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to create export directory '{}': {e}",
                config.export_dir.display()
            ),
        )
    })?;

    let csv_path = config
        .csv_path
        .as_deref()
        .ok_or_else(|| AppError::new(2, "Please provide a dimension CSV path (--csv or BOLTGEN_CSV)."))?;

    enter(BatchState::Loading);
    let saved = checkpoint::load_or_default(&config.checkpoint_path);
    let plan = BatchPlan::new(saved.last_bolt_count, config.campaign_size, config.batch_size);
    if plan.is_complete() {
        info!(
            "All {} bolts have already been generated; nothing to do",
            config.campaign_size
        );
        enter(BatchState::Done);
        return Ok(Prepared::CampaignComplete(plan));
    }

    let loaded = load_dimension_table(csv_path)?;
    let sampler = UnusedIndexSampler::new(loaded.table.len(), saved.used_indices.iter().copied());
    info!(
        "Batch {}/{}: bolts {}-{} ({}/{} rows unused)",
        plan.batch_number,
        plan.total_batches,
        plan.start_bolt,
        plan.end_bolt,
        sampler.unused_count(),
        sampler.table_len()
    );

    Ok(Prepared::Ready(BatchContext {
        config: config.clone(),
        plan,
        table: loaded.table,
        sampler,
    }))
}

/// Run one batch end to end.
pub fn run_batch<M, O, R>(
    config: &BatchConfig,
    modeler: &mut M,
    observer: &mut O,
    rng: &mut R,
) -> Result<Outcome, AppError>
where
    M: BoltModeler,
    O: BatchObserver + ?Sized,
    R: Rng + ?Sized,
{
    match prepare(config)? {
        Prepared::CampaignComplete(plan) => Ok(Outcome::CampaignComplete(plan)),
        Prepared::Ready(mut ctx) => {
            let summary = run_context(&mut ctx, modeler, observer, rng);
            Ok(Outcome::Finished(summary))
        }
    }
}

/// The per-bolt loop plus the final checkpoint write.
pub fn run_context<M, O, R>(
    ctx: &mut BatchContext,
    modeler: &mut M,
    observer: &mut O,
    rng: &mut R,
) -> RunSummary
where
    M: BoltModeler,
    O: BatchObserver + ?Sized,
    R: Rng + ?Sized,
{
    let plan = ctx.plan;
    let start_used = ctx.sampler.used().len();
    let mut summary = RunSummary::new(plan, Checkpoint::default());

    while summary.exported < plan.bolts_to_create && summary.attempts < plan.max_attempts() {
        let sequence = plan.start_bolt + summary.exported;
        observer.on_progress(&BatchProgress {
            built: summary.exported,
            target: plan.bolts_to_create,
            attempts: summary.attempts,
            next_bolt: sequence,
            end_bolt: plan.end_bolt,
        });
        if observer.is_cancelled() {
            info!("Cancelled before bolt {sequence}");
            summary.cancelled = true;
            break;
        }

        enter(BatchState::Sampling);
        let index = match ctx.sampler.draw(rng) {
            Ok(index) => index,
            Err(err) => {
                warn!("{err}");
                summary.exhausted = Some(err);
                break;
            }
        };
        summary.attempts += 1;

        let Some(row) = ctx.table.get(index) else {
            // The sampler only draws below the table length.
            summary.errors += 1;
            continue;
        };

        enter(BatchState::Building);
        let spec = derive_bolt_spec(row, index, sequence, rng);
        let path = ctx.config.export_path(sequence);
        match build_bolt(modeler, &spec, ctx.config.create_threads, &path) {
            BoltOutcome::Exported { thread, fallback } => {
                summary.exported += 1;
                if fallback > 0 {
                    summary.thread_fallbacks += 1;
                }
                match thread {
                    Some(designation) => debug!("{} exported with {designation} (row {index})", spec.name),
                    None => debug!("{} exported without thread (row {index})", spec.name),
                }
            }
            BoltOutcome::ThreadFailed => {
                warn!(
                    "{}: discarded, no thread designation could be created (row {index} stays used)",
                    spec.name
                );
                summary.discarded += 1;
            }
            BoltOutcome::Failed(err) => {
                warn!("{}: {err}", spec.name);
                summary.errors += 1;
            }
        }
    }

    if summary.exported < plan.bolts_to_create
        && !summary.cancelled
        && summary.exhausted.is_none()
    {
        warn!(
            "Stopped after {} attempts with {}/{} bolts built",
            summary.attempts, summary.exported, plan.bolts_to_create
        );
    }

    observer.on_progress(&BatchProgress {
        built: summary.exported,
        target: plan.bolts_to_create,
        attempts: summary.attempts,
        next_bolt: plan.start_bolt + summary.exported,
        end_bolt: plan.end_bolt,
    });

    summary.checkpoint = Checkpoint::new(
        plan.last_bolt + summary.exported,
        ctx.sampler.used().iter().copied(),
    );

    if ctx.sampler.used().len() > start_used {
        enter(BatchState::Checkpointing);
        if let Err(err) = checkpoint::save(&ctx.config.checkpoint_path, &summary.checkpoint) {
            warn!("{err}");
            summary.checkpoint_error = Some(err.to_string());
        }
    }

    enter(if summary.cancelled || summary.exhausted.is_some() {
        BatchState::Aborted
    } else {
        BatchState::Done
    });
    summary.finished_at = Local::now();
    observer.on_finish(&summary);
    summary
}

/// Build, thread, export and delete one bolt.
///
/// Thread creation walks the fallback ladder (exact, next smaller size, bare);
/// when every designation fails the model is deleted and nothing is exported.
pub fn build_bolt<M: BoltModeler>(
    modeler: &mut M,
    spec: &BoltSpec,
    create_threads: bool,
    path: &Path,
) -> BoltOutcome {
    let mut model = match modeler.build_body(spec) {
        Ok(model) => model,
        Err(err) => return BoltOutcome::Failed(err),
    };

    let mut threaded = None;
    if create_threads {
        for (tier, designation) in thread_ladder(spec.thread.standard_size).into_iter().enumerate() {
            match modeler.create_thread(&mut model, &spec.thread, &designation) {
                Ok(()) => {
                    threaded = Some((designation, tier));
                    break;
                }
                Err(err) => debug!("{}: {err}", spec.name),
            }
        }
        if threaded.is_none() {
            modeler.discard(model);
            return BoltOutcome::ThreadFailed;
        }
    }

    enter(BatchState::Exporting);
    let exported = modeler.export(&model, path);
    modeler.discard(model);

    match exported {
        Ok(()) => BoltOutcome::Exported {
            thread: threaded.map(|(designation, _)| designation),
            fallback: threaded.map_or(0, |(_, tier)| tier),
        },
        Err(err) => BoltOutcome::Failed(err),
    }
}
