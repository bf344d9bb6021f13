//! Dataset access: the dimension table and the row sampler.

pub mod sampler;
pub mod table;

pub use sampler::{SampleError, UnusedIndexSampler};
pub use table::{DimensionTable, LoadedTable, RowError, load_dimension_table, read_dimension_table};
