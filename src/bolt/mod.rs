//! Bolt parameters: standard thread table and per-bolt derivation.

pub mod spec;
pub mod standard;

pub use spec::derive_bolt_spec;
pub use standard::{closest_standard_size, coarse_pitch, next_smaller_size, thread_ladder};
