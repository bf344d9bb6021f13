//! Input/output helpers.
//!
//! - campaign checkpoint JSON (`checkpoint`)
//! - ASCII STL export for the reference mesh modeler (`stl`)

pub mod checkpoint;
pub mod stl;

pub use checkpoint::{Checkpoint, load_or_default, read_checkpoint};
pub use stl::write_ascii_stl;
