//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: manifest-verified model, scaler and label files
//! - `dataset`: survey CSV loading
//! - `sanitize`: redaction of identifying text in logs

pub mod artifacts;
pub mod dataset;
pub mod sanitize;

pub use artifacts::ArtifactError;
pub use dataset::DatasetError;
