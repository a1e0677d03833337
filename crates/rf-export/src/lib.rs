/// Tensor persistence (`.npy`) and per-class merging for rfgrid.

pub mod error;
pub mod merge;
pub mod npy;

pub use error::ExportError;
pub use merge::{ClassBuckets, MergedClass, bucket_by_class, merge_class, parse_class_id};
pub use npy::{read_tensor, session_array, write_session_tensor, write_tensor};
