//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O: categorical encoding, derived features, feature
//! vector layouts and prediction records.

pub mod categories;
pub mod features;
pub mod layout;
pub mod patient;
mod prediction;

pub use categories::{
    encode, CategoricalField, EncodedFeatures, EncodingError, Frequency, Gender, TransportMode,
    YesNo,
};
pub use features::{derive, DerivedFeatures};
pub use layout::{assemble, FeatureLayout, FeatureVector};
pub use patient::{PatientAnswers, RawAnswers};
pub use prediction::{BmiBand, ObesityCategory, Prediction, Severity};
