//! Classifier port: Traits for the externally trained model and scaler.
//!
//! The model and scaler are opaque artifacts produced by a training pipeline
//! outside this crate. Only their inference surface is modeled here.

use crate::domain::FeatureLayout;

/// Errors that can occur while turning a feature vector into a label.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Feature vector shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Feature layout mismatch: model expects {expected}, vector is {actual}")]
    LayoutMismatch {
        expected: FeatureLayout,
        actual: FeatureLayout,
    },

    #[error("Class index {index} outside label table of size {size}")]
    LabelOutOfRange { index: usize, size: usize },

    #[error("Model evaluation failed: {0}")]
    Model(String),
}

/// What the classifier reports for one vector.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassOutput {
    /// Class position, to be resolved through a label table
    Index(usize),
    /// Class token carried by the model itself
    Label(String),
}

/// Classifier output with the winning class probability, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub class: ClassOutput,
    pub probability: Option<f64>,
}

/// Trait for a fitted classifier.
pub trait Classifier: Send + Sync {
    /// Number of input values the model was fit on.
    fn n_features(&self) -> usize;

    /// Predict the class of a single feature vector.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` if `features` has the wrong
    /// length, or `PredictionError::Model` if the artifact is inconsistent.
    fn predict(&self, features: &[f64]) -> Result<ModelOutput, PredictionError>;
}

/// Trait for a fitted feature-wise normalizer.
pub trait FeatureScaler: Send + Sync {
    /// Number of input values the scaler was fit on.
    fn n_features(&self) -> usize;

    /// Apply the fitted transformation.
    ///
    /// # Errors
    /// Returns `PredictionError::ShapeMismatch` if `features` has the wrong length.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// Ordered class names, indexed by class position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve a class position to its name.
    ///
    /// # Errors
    /// Returns `PredictionError::LabelOutOfRange` if `index >= len()`.
    pub fn resolve(&self, index: usize) -> Result<&str, PredictionError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(PredictionError::LabelOutOfRange {
                index,
                size: self.labels.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_table_resolution() {
        let table = LabelTable::new(vec!["A".into(), "B".into(), "C".into()]);
        for i in 0..table.len() {
            assert!(table.resolve(i).is_ok());
        }
        assert_eq!(table.resolve(1), Ok("B"));
        assert_eq!(
            table.resolve(3),
            Err(PredictionError::LabelOutOfRange { index: 3, size: 3 })
        );
    }
}
