//! Domain types used throughout the batch pipeline.
//!
//! This module defines:
//!
//! - dataset rows (`DimensionRow`)
//! - per-bolt derived parameters (`BoltSpec`, `ThreadSpec`, `ThreadDesignation`)
//! - run configuration and campaign constants (`BatchConfig`, `CAMPAIGN_CAP`, ...)

pub mod types;

pub use types::*;
