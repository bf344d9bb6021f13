//! Geometry/export collaborator seam.
//!
//! The batch driver never builds geometry itself: it hands a `BoltSpec` to a
//! `BoltModeler`, asks it to cut threads, export, and throw the model away.
//! A host CAD application plugs in here; `MeshModeler` is the built-in
//! stand-in that writes coarse STL meshes.

use std::path::Path;

use thiserror::Error;

use crate::domain::{BoltSpec, ThreadDesignation, ThreadSpec};

pub mod mesh;
pub mod reference;

pub use reference::MeshModeler;

/// A failed collaborator call. Each variant carries the collaborator's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("body construction failed: {0}")]
    Body(String),
    #[error("thread {designation} failed: {message}")]
    Thread { designation: String, message: String },
    #[error("export failed: {0}")]
    Export(String),
}

/// Builds, threads and exports one bolt at a time.
///
/// Models are single-use: after `export` (or on any failure) the driver hands
/// the model back through `discard`.
pub trait BoltModeler {
    type Model;

    /// Head, shank, chamfer, fillet and head cuts. On error the collaborator
    /// cleans up whatever it had started.
    fn build_body(&mut self, spec: &BoltSpec) -> Result<Self::Model, BuildError>;

    /// Cut a modeled external thread on the shank.
    fn create_thread(
        &mut self,
        model: &mut Self::Model,
        thread: &ThreadSpec,
        designation: &ThreadDesignation,
    ) -> Result<(), BuildError>;

    fn export(&mut self, model: &Self::Model, path: &Path) -> Result<(), BuildError>;

    /// Delete the in-session model.
    fn discard(&mut self, model: Self::Model);
}
