//! Shared domain types.
//!
//! These are plain data records passed between the loader, the sampler, the
//! batch driver and the geometry collaborator. None of them own behavior beyond
//! small conversions and formatting.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Total number of bolts a campaign produces across all runs.
pub const CAMPAIGN_CAP: u32 = 1000;

/// Maximum number of bolts built by a single run.
pub const BATCH_SIZE: u32 = 250;

/// Each bolt may take up to this many sampling attempts before the run gives up.
pub const ATTEMPTS_PER_BOLT: u32 = 3;

/// Legacy grid spacing between bolts (cm). Kept as configuration only.
pub const DEFAULT_SPACING_CM: f64 = 5.0;

/// Tolerance class used for every external thread.
pub const THREAD_CLASS: &str = "6g";

/// File name of the checkpoint when none is given explicitly.
pub const DEFAULT_CHECKPOINT_NAME: &str = "bolt_tracking.json";

/// One parsed row of the dimension table. Lengths are millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRow {
    pub thread_label: String,
    pub body_diameter: f64,
    pub pitch: f64,
    pub head_diameter: f64,
    pub body_length: f64,
    pub head_height: f64,
    /// 1-based line in the source file (header is line 1).
    #[serde(skip)]
    pub line: usize,
}

impl DimensionRow {
    /// The five numeric fields in file order.
    pub fn numeric_fields(&self) -> [f64; 5] {
        [
            self.body_diameter,
            self.pitch,
            self.head_diameter,
            self.body_length,
            self.head_height,
        ]
    }
}

/// Thread profile family requested from the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadProfile {
    AnsiMetricM,
    GbMetric,
    IsoMetric,
}

impl ThreadProfile {
    pub const ALL: [ThreadProfile; 3] = [
        ThreadProfile::AnsiMetricM,
        ThreadProfile::GbMetric,
        ThreadProfile::IsoMetric,
    ];

    /// Name as the host thread library spells it.
    pub fn display_name(self) -> &'static str {
        match self {
            ThreadProfile::AnsiMetricM => "ANSI Metric M Profile",
            ThreadProfile::GbMetric => "GB Metric profile",
            ThreadProfile::IsoMetric => "ISO Metric profile",
        }
    }
}

/// Metric thread designation such as `M8x1.25` or the bare `M6`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadDesignation {
    /// Nominal major diameter (mm).
    pub size: f64,
    /// Pitch (mm); `None` lets the thread library pick its default.
    pub pitch: Option<f64>,
}

impl ThreadDesignation {
    pub fn with_pitch(size: f64, pitch: f64) -> Self {
        Self {
            size,
            pitch: Some(pitch),
        }
    }

    pub fn bare(size: f64) -> Self {
        Self { size, pitch: None }
    }
}

impl fmt::Display for ThreadDesignation {
    // Sizes print without a trailing `.0` (`M8`), pitches always keep one (`x1.0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.size)?;
        if let Some(pitch) = self.pitch {
            write!(f, "x{pitch:?}")?;
        }
        Ok(())
    }
}

/// Thread parameters attached to a bolt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSpec {
    pub profile: ThreadProfile,
    pub designation: ThreadDesignation,
    pub class: String,
    /// Standard size closest to the raw table diameter (mm).
    pub standard_size: f64,
    /// Coarse pitch mapped from `standard_size` (mm).
    pub standard_pitch: f64,
}

/// Fully derived parameters of one bolt. Lengths are centimetres, angles radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltSpec {
    /// Sequence number within the campaign; also names the exported file.
    pub sequence: u32,
    pub name: String,
    /// Row of the dimension table this bolt was built from.
    pub row_index: usize,
    pub head_diameter: f64,
    pub body_diameter: f64,
    pub head_height: f64,
    pub body_length: f64,
    pub cut_angle: f64,
    pub chamfer_distance: f64,
    pub fillet_radius: f64,
    pub thread: ThreadSpec,
}

/// Resolved configuration for one `boltgen run`.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Dimension table; `None` is rejected when the run starts.
    pub csv_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub checkpoint_path: PathBuf,
    pub create_threads: bool,
    /// Legacy placement spacing (cm); bolts are exported one by one at the origin.
    pub spacing: f64,
    pub campaign_size: u32,
    pub batch_size: u32,
    pub seed: Option<u64>,
}

impl BatchConfig {
    /// Defaults matching the original campaign: 1000 bolts, 250 per run.
    pub fn new(csv_path: Option<PathBuf>, export_dir: PathBuf) -> Self {
        let checkpoint_path = export_dir.join(DEFAULT_CHECKPOINT_NAME);
        Self {
            csv_path,
            export_dir,
            checkpoint_path,
            create_threads: true,
            spacing: DEFAULT_SPACING_CM,
            campaign_size: CAMPAIGN_CAP,
            batch_size: BATCH_SIZE,
            seed: None,
        }
    }

    /// Path of the mesh file for bolt `sequence`.
    pub fn export_path(&self, sequence: u32) -> PathBuf {
        self.export_dir.join(format!("bolt_{sequence}.stl"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designation_formats_like_thread_tables() {
        assert_eq!(ThreadDesignation::with_pitch(8.0, 1.25).to_string(), "M8x1.25");
        assert_eq!(ThreadDesignation::with_pitch(6.0, 1.0).to_string(), "M6x1.0");
        assert_eq!(ThreadDesignation::with_pitch(1.6, 0.35).to_string(), "M1.6x0.35");
        assert_eq!(ThreadDesignation::bare(6.0).to_string(), "M6");
    }

    #[test]
    fn checkpoint_defaults_to_export_dir() {
        let config = BatchConfig::new(None, PathBuf::from("out"));
        assert_eq!(config.checkpoint_path, PathBuf::from("out").join("bolt_tracking.json"));
        assert_eq!(config.export_path(12), PathBuf::from("out").join("bolt_12.stl"));
        assert_eq!(config.campaign_size, 1000);
        assert_eq!(config.batch_size, 250);
    }
}
