/// Round segmentation and feature-grid construction for rfgrid.
///
/// Turns a session's ordered tag reads into one (4, 8, 8) grid per sweep round.

pub mod aggregate;
pub mod builder;
pub mod fill;
pub mod rounds;

pub use builder::{BuiltSession, SessionBuilder, SessionSummary};
