//! ISO metric coarse-thread table and the designation fallback ladder.

use crate::domain::ThreadDesignation;

/// Standard sizes (mm) with their coarse pitch (mm), ascending.
pub const STANDARD_SIZES: [(f64, f64); 25] = [
    (1.0, 0.25),
    (1.6, 0.35),
    (2.0, 0.4),
    (2.5, 0.45),
    (3.0, 0.5),
    (4.0, 0.7),
    (5.0, 0.8),
    (6.0, 1.0),
    (8.0, 1.25),
    (10.0, 1.5),
    (12.0, 1.75),
    (14.0, 2.0),
    (16.0, 2.0),
    (18.0, 2.5),
    (20.0, 2.5),
    (22.0, 2.5),
    (24.0, 3.0),
    (27.0, 3.0),
    (30.0, 3.5),
    (33.0, 3.5),
    (36.0, 4.0),
    (39.0, 4.0),
    (42.0, 4.5),
    (45.0, 4.5),
    (48.0, 5.0),
];

/// Pitch assumed for the primary designation when a size has no table entry.
pub const DEFAULT_PITCH: f64 = 1.5;

/// Pitch assumed for the smaller-size fallback when that size has no table entry.
pub const FALLBACK_PITCH: f64 = 1.0;

/// Standard size nearest to `diameter` (mm). Ties resolve to the smaller size.
pub fn closest_standard_size(diameter: f64) -> f64 {
    let mut best = STANDARD_SIZES[0].0;
    for &(size, _) in &STANDARD_SIZES[1..] {
        if (size - diameter).abs() < (best - diameter).abs() {
            best = size;
        }
    }
    best
}

/// Coarse pitch for a standard size.
pub fn coarse_pitch(size: f64) -> Option<f64> {
    STANDARD_SIZES
        .iter()
        .find(|&&(s, _)| s == size)
        .map(|&(_, pitch)| pitch)
}

/// Largest standard size strictly below `size`.
pub fn next_smaller_size(size: f64) -> Option<f64> {
    STANDARD_SIZES
        .iter()
        .rev()
        .map(|&(s, _)| s)
        .find(|&s| s < size)
}

/// Designations to try, in order, when threading a shank rounded to `size`:
///
/// 1. `M<size>x<pitch>`
/// 2. the next smaller standard size with its pitch
/// 3. the bare smaller size (or the bare `size` when nothing is smaller)
pub fn thread_ladder(size: f64) -> Vec<ThreadDesignation> {
    let primary = ThreadDesignation::with_pitch(size, coarse_pitch(size).unwrap_or(DEFAULT_PITCH));
    match next_smaller_size(size) {
        Some(smaller) => vec![
            primary,
            ThreadDesignation::with_pitch(smaller, coarse_pitch(smaller).unwrap_or(FALLBACK_PITCH)),
            ThreadDesignation::bare(smaller),
        ],
        None => vec![primary, ThreadDesignation::bare(size)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_standard_size() {
        assert_eq!(closest_standard_size(7.8), 8.0);
        assert_eq!(closest_standard_size(0.2), 1.0);
        assert_eq!(closest_standard_size(1.7), 1.6);
        assert_eq!(closest_standard_size(60.0), 48.0);
        // Equidistant between 8 and 10.
        assert_eq!(closest_standard_size(9.0), 8.0);
    }

    #[test]
    fn pitch_lookup() {
        assert_eq!(coarse_pitch(8.0), Some(1.25));
        assert_eq!(coarse_pitch(6.0), Some(1.0));
        assert_eq!(coarse_pitch(7.0), None);
    }

    #[test]
    fn ladder_for_m8() {
        let ladder: Vec<String> = thread_ladder(8.0).iter().map(ToString::to_string).collect();
        assert_eq!(ladder, ["M8x1.25", "M6x1.0", "M6"]);
    }

    #[test]
    fn ladder_for_smallest_size_falls_back_to_bare() {
        let ladder: Vec<String> = thread_ladder(1.0).iter().map(ToString::to_string).collect();
        assert_eq!(ladder, ["M1x0.25", "M1"]);
    }
}
