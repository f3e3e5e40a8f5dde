//! Ports layer: Trait definitions for external collaborators.
//!
//! These traits separate the application from the exported model artifacts
//! and from the dataset file.

mod classifier;
mod dataset;

pub use classifier::{
    ClassOutput, Classifier, FeatureScaler, LabelTable, ModelOutput, PredictionError,
};
pub use dataset::{DatasetSource, FeatureImportance, NumericColumn, SurveyRecord};
