//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! prediction for one patient and the dataset report.

mod prediction;
pub mod report;

pub use prediction::{predict, ModelArtifacts, PredictionService, ResolvedClass};
pub use report::ReportService;
