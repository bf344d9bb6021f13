//! Post-hoc campaign check.
//!
//! Read-only: counts exported files, cross-checks the checkpoint, and looks
//! for repeated indices or repeated dimension tuples among the used rows.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::data::{DimensionTable, load_dimension_table};
use crate::domain::CAMPAIGN_CAP;
use crate::error::AppError;
use crate::io::checkpoint::read_checkpoint;

/// Dimension comparison granularity (mm).
const DIMENSION_PRECISION: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub csv_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub export_dir: PathBuf,
    pub expected: u32,
    /// Exported file extension, without the dot.
    pub extension: String,
}

impl VerifyConfig {
    pub fn new(csv_path: PathBuf, checkpoint_path: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            csv_path,
            checkpoint_path,
            export_dir,
            expected: CAMPAIGN_CAP,
            extension: "stl".to_string(),
        }
    }
}

/// Two used rows with the same five numeric fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateDimension {
    pub first_index: usize,
    pub duplicate_index: usize,
    pub dimensions: [f64; 5],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStats {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub expected: u32,
    pub file_count: usize,
    pub last_bolt: u32,
    pub used_count: usize,
    /// Extra occurrences of indices listed more than once in the checkpoint.
    pub duplicate_indices: Vec<usize>,
    /// Indices that do not exist in the table.
    pub out_of_range: Vec<usize>,
    pub duplicate_dimensions: Vec<DuplicateDimension>,
    pub sizes: Option<SizeStats>,
}

impl VerifyReport {
    pub fn files_ok(&self) -> bool {
        self.file_count == self.expected as usize
    }

    pub fn last_bolt_ok(&self) -> bool {
        self.last_bolt == self.expected
    }

    pub fn used_count_ok(&self) -> bool {
        self.used_count == self.expected as usize
    }

    /// `last_bolt` should equal the number of consumed rows when no bolt was discarded.
    pub fn checkpoint_consistent(&self) -> bool {
        self.last_bolt as usize == self.used_count
    }

    pub fn passed(&self) -> bool {
        self.files_ok()
            && self.last_bolt_ok()
            && self.used_count_ok()
            && self.duplicate_indices.is_empty()
            && self.out_of_range.is_empty()
            && self.duplicate_dimensions.is_empty()
    }
}

/// Run every check and collect the results.
pub fn verify(config: &VerifyConfig) -> Result<VerifyReport, AppError> {
    let files = list_exported_files(&config.export_dir, &config.extension)?;
    let sizes = file_size_stats(&files)?;

    let checkpoint = read_checkpoint(&config.checkpoint_path)?;
    let table = load_dimension_table(&config.csv_path)?.table;

    let used = &checkpoint.used_indices;
    let out_of_range = used.iter().copied().filter(|&idx| idx >= table.len()).collect();

    Ok(VerifyReport {
        expected: config.expected,
        file_count: files.len(),
        last_bolt: checkpoint.last_bolt_count,
        used_count: used.len(),
        duplicate_indices: duplicate_indices(used),
        out_of_range,
        duplicate_dimensions: duplicate_dimensions(&table, used),
        sizes,
    })
}

pub fn duplicate_indices(used: &[usize]) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(used.len());
    used.iter().copied().filter(|idx| !seen.insert(*idx)).collect()
}

/// Repeated dimension tuples among `used` rows, in checkpoint order.
///
/// Repeated indices are skipped here (they are reported by `duplicate_indices`).
pub fn duplicate_dimensions(table: &DimensionTable, used: &[usize]) -> Vec<DuplicateDimension> {
    let mut first_seen: HashMap<[i64; 5], usize> = HashMap::new();
    let mut visited = HashSet::new();
    let mut duplicates = Vec::new();

    for &idx in used {
        if !visited.insert(idx) {
            continue;
        }
        let Some(row) = table.get(idx) else {
            continue;
        };
        let dimensions = row.numeric_fields();
        let key = dimensions.map(|v| (v / DIMENSION_PRECISION).round() as i64);
        match first_seen.get(&key) {
            Some(&first_index) => duplicates.push(DuplicateDimension {
                first_index,
                duplicate_index: idx,
                dimensions,
            }),
            None => {
                first_seen.insert(key, idx);
            }
        }
    }
    duplicates
}

fn list_exported_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read export directory '{}': {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::new(4, format!("Failed to list '{}': {e}", dir.display())))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_size_stats(files: &[PathBuf]) -> Result<Option<SizeStats>, AppError> {
    let sizes = files
        .par_iter()
        .map(|path| {
            fs::metadata(path)
                .map(|m| m.len())
                .map_err(|e| AppError::new(4, format!("Failed to stat '{}': {e}", path.display())))
        })
        .collect::<Result<Vec<u64>, AppError>>()?;

    let (Some(&min), Some(&max)) = (sizes.iter().min(), sizes.iter().max()) else {
        return Ok(None);
    };
    let mean = sizes.iter().map(|&s| s as f64).sum::<f64>() / sizes.len() as f64;
    Ok(Some(SizeStats { min, max, mean }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DimensionRow;

    fn row(label: &str, dims: [f64; 5]) -> DimensionRow {
        DimensionRow {
            thread_label: label.to_string(),
            body_diameter: dims[0],
            pitch: dims[1],
            head_diameter: dims[2],
            body_length: dims[3],
            head_height: dims[4],
            line: 0,
        }
    }

    #[test]
    fn one_pair_for_two_identical_rows() {
        let table = DimensionTable::new(vec![
            row("A", [7.8, 1.25, 13.0, 40.0, 5.3]),
            row("B", [9.8, 1.5, 16.0, 55.0, 6.4]),
            row("C", [7.8, 1.25, 13.0, 40.0, 5.3]),
        ]);

        let duplicates = duplicate_dimensions(&table, &[2, 1, 0]);
        assert_eq!(
            duplicates,
            vec![DuplicateDimension {
                first_index: 2,
                duplicate_index: 0,
                dimensions: [7.8, 1.25, 13.0, 40.0, 5.3],
            }]
        );
    }

    #[test]
    fn unused_duplicates_are_ignored() {
        let table = DimensionTable::new(vec![
            row("A", [7.8, 1.25, 13.0, 40.0, 5.3]),
            row("B", [7.8, 1.25, 13.0, 40.0, 5.3]),
        ]);
        assert!(duplicate_dimensions(&table, &[0]).is_empty());
    }

    #[test]
    fn every_repeated_index_is_reported() {
        assert_eq!(duplicate_indices(&[4, 1, 4, 2, 4]), vec![4, 4]);
        assert!(duplicate_indices(&[1, 2, 3]).is_empty());
    }
}
