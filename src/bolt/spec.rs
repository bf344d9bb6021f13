//! Per-bolt parameter derivation.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::bolt::standard::{DEFAULT_PITCH, closest_standard_size, coarse_pitch};
use crate::domain::{BoltSpec, DimensionRow, THREAD_CLASS, ThreadDesignation, ThreadProfile, ThreadSpec};

/// Nominal flank cut angle of the head (degrees).
pub const CUT_ANGLE_DEG: f64 = 30.0;
pub const CUT_ANGLE_JITTER_DEG: f64 = 5.0;

/// Tip chamfer as a fraction of the body diameter.
pub const CHAMFER_RATIO: f64 = 0.0769;
/// Head fillet as a fraction of the body diameter.
pub const FILLET_RATIO: f64 = 0.05988;
/// Absolute jitter on chamfer and fillet (cm).
pub const EDGE_JITTER_CM: f64 = 0.01;

/// Table values are millimetres, the modeler works in centimetres.
const MM_PER_CM: f64 = 10.0;

/// Build the spec for bolt number `sequence` from table row `row_index`.
pub fn derive_bolt_spec<R: Rng + ?Sized>(
    row: &DimensionRow,
    row_index: usize,
    sequence: u32,
    rng: &mut R,
) -> BoltSpec {
    let angle_jitter = Uniform::new_inclusive(-CUT_ANGLE_JITTER_DEG, CUT_ANGLE_JITTER_DEG);
    let edge_jitter = Uniform::new_inclusive(-EDGE_JITTER_CM, EDGE_JITTER_CM);

    let body_diameter = row.body_diameter / MM_PER_CM;
    let cut_angle = (CUT_ANGLE_DEG + angle_jitter.sample(rng)).to_radians();
    let chamfer_distance = body_diameter * CHAMFER_RATIO + edge_jitter.sample(rng);
    let fillet_radius = body_diameter * FILLET_RATIO + edge_jitter.sample(rng);

    let profile = ThreadProfile::ALL[rng.gen_range(0..ThreadProfile::ALL.len())];
    let standard_size = closest_standard_size(row.body_diameter);
    let standard_pitch = coarse_pitch(standard_size).unwrap_or(DEFAULT_PITCH);

    BoltSpec {
        sequence,
        name: format!("bolt_{sequence}"),
        row_index,
        head_diameter: row.head_diameter / MM_PER_CM,
        body_diameter,
        head_height: row.head_height / MM_PER_CM,
        body_length: row.body_length / MM_PER_CM,
        cut_angle,
        chamfer_distance,
        fillet_radius,
        thread: ThreadSpec {
            profile,
            designation: ThreadDesignation::with_pitch(standard_size, standard_pitch),
            class: THREAD_CLASS.to_string(),
            standard_size,
            standard_pitch,
        },
    }
}
