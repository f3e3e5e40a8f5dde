//! # Obesitrack
//!
//! Obesity-level triage from lifestyle survey answers.
//!
//! This crate provides:
//! - categorical encoding and derived risk features for a pre-trained classifier
//! - manifest-verified loading of the exported model artifacts
//! - descriptive reports over the historical survey dataset
//! - a terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (answers, encodings, derived features, layouts, predictions)
//! - `ports`: Trait definitions for the classifier, scaler and dataset
//! - `adapters`: Concrete implementations (JSON artifacts, CSV dataset, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::AppConfig;
pub use domain::{PatientAnswers, Prediction};

/// Result type for Obesitrack operations
pub type Result<T> = std::result::Result<T, ObesitrackError>;

/// Main error type for Obesitrack
#[derive(Debug, thiserror::Error)]
pub enum ObesitrackError {
    #[error("Unrecognized answer: {0}")]
    Encoding(#[from] domain::EncodingError),

    #[error("Invalid patient answers: {0}")]
    Validation(String),

    #[error("Artifact load failure: {0}")]
    ArtifactLoad(#[from] adapters::ArtifactError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ports::PredictionError),

    #[error("Dataset unavailable: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("Configuration error: {0}")]
    Config(String),
}
