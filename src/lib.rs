//! `boltgen` library crate.
//!
//! The binary (`boltgen`) is a thin wrapper around this library so that:
//!
//! - the sampler, checkpoint and batch driver are testable without spawning processes
//! - a host CAD integration can drive `batch::run_batch` with its own `BoltModeler`
//! - the verifier can be reused from scripts

pub mod app;
pub mod batch;
pub mod bolt;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod modeler;
pub mod report;
pub mod verify;
