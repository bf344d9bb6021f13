//! Read/write the campaign checkpoint.
//!
//! The checkpoint is the only state carried between runs:
//!
//! ```json
//! {"last_bolt": 250, "used_indices": [3, 17, ...]}
//! ```
//!
//! Loading is best-effort (a missing or corrupt file starts a fresh campaign),
//! saving goes through a temp file + rename so a crash never leaves half a file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Persisted campaign progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(rename = "last_bolt")]
    pub last_bolt_count: u32,
    /// Kept exactly as stored so duplicates in a hand-edited file stay visible.
    #[serde(default)]
    pub used_indices: Vec<usize>,
}

impl Checkpoint {
    pub fn new(last_bolt_count: u32, used: impl IntoIterator<Item = usize>) -> Self {
        Self {
            last_bolt_count,
            used_indices: used.into_iter().collect(),
        }
    }
}

/// Load a checkpoint, falling back to an empty one when the file is absent or unreadable.
pub fn load_or_default(path: &Path) -> Checkpoint {
    if !path.exists() {
        info!("No checkpoint at {}; starting a new campaign", path.display());
        return Checkpoint::default();
    }

    match read_checkpoint(path) {
        Ok(checkpoint) => checkpoint,
        Err(err) => {
            warn!("{err}; starting from an empty checkpoint");
            Checkpoint::default()
        }
    }
}

/// Strict load: any IO or parse problem is an error.
pub fn read_checkpoint(path: &Path) -> Result<Checkpoint, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open checkpoint '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| {
        AppError::new(2, format!("Invalid checkpoint JSON '{}': {e}", path.display()))
    })
}

/// Write the checkpoint atomically (temp file in the same directory, then rename).
pub fn save(path: &Path, checkpoint: &Checkpoint) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(
                4,
                format!("Failed to create checkpoint directory '{}': {e}", parent.display()),
            )
        })?;
    }

    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|e| {
        AppError::new(4, format!("Failed to create checkpoint '{}': {e}", tmp.display()))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, checkpoint)
        .map_err(|e| AppError::new(4, format!("Failed to write checkpoint JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush checkpoint: {e}")))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AppError::new(4, format!("Failed to sync checkpoint: {e}")))?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::new(
            4,
            format!("Failed to replace checkpoint '{}': {e}", path.display()),
        )
    })?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "checkpoint.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = load_or_default(&dir.path().join("bolt_tracking.json"));
        assert_eq!(checkpoint, Checkpoint::default());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bolt_tracking.json");
        fs::write(&path, "{\"last_bolt\": ").unwrap();

        assert_eq!(load_or_default(&path), Checkpoint::default());
        assert_eq!(read_checkpoint(&path).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn round_trip_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bolt_tracking.json");
        let original = Checkpoint::new(250, [42, 7, 7, 300]);

        save(&path, &original).unwrap();
        let loaded = load_or_default(&path);
        assert_eq!(loaded, original);

        save(&path, &loaded).unwrap();
        assert_eq!(read_checkpoint(&path).unwrap(), original);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn reads_the_original_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bolt_tracking.json");
        fs::write(&path, r#"{"used_indices": [1, 2, 3], "last_bolt": 3}"#).unwrap();

        let checkpoint = read_checkpoint(&path).unwrap();
        assert_eq!(checkpoint.last_bolt_count, 3);
        assert_eq!(checkpoint.used_indices, vec![1, 2, 3]);

        let json = serde_json::to_value(&checkpoint).unwrap();
        assert_eq!(json["last_bolt"], 3);
    }
}
