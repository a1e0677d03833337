/// Configuration, types, and shared structures for rfgrid.
///
/// This crate contains the record and grid types, the pipeline configuration,
/// and the traits shared by the ingestion, tensor and export crates.

pub mod config;
pub mod error;
pub mod grid;
pub mod record;
pub mod traits;

pub use config::{ColumnMap, PipelineConfig};
pub use error::CoreError;
pub use grid::{FeatureGrid, SessionTensor};
pub use record::{ReadRecord, SessionLog};
