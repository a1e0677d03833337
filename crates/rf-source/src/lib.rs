/// Session log ingestion for rfgrid: CSV reading, column mapping, and
/// directory discovery.

pub mod discover;
pub mod error;
pub mod session;

pub use error::SourceError;
pub use session::{IngestOptions, read_session};
