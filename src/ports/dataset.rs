//! Dataset port: Trait for the historical survey records behind the report.

use serde::{Deserialize, Serialize};

/// One cleaned row of the historical survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub gender: String,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub family_history: String,
    pub favc: String,
    pub fcvc: f64,
    pub ncp: f64,
    pub caec: String,
    pub smoke: String,
    pub ch2o: f64,
    pub scc: String,
    pub faf: f64,
    pub tue: f64,
    pub calc: String,
    pub mtrans: String,
    /// Target class (`NObeyesdad`)
    pub category: String,
}

/// Numeric columns available for correlation and scatter views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Age,
    Height,
    Weight,
    Fcvc,
    Ncp,
    Ch2o,
    Faf,
    Tue,
}

impl NumericColumn {
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::Height,
        Self::Weight,
        Self::Fcvc,
        Self::Ncp,
        Self::Ch2o,
        Self::Faf,
        Self::Tue,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::Fcvc => "FCVC",
            Self::Ncp => "NCP",
            Self::Ch2o => "CH2O",
            Self::Faf => "FAF",
            Self::Tue => "TUE",
        }
    }
}

impl SurveyRecord {
    #[must_use]
    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Age => self.age,
            NumericColumn::Height => self.height,
            NumericColumn::Weight => self.weight,
            NumericColumn::Fcvc => self.fcvc,
            NumericColumn::Ncp => self.ncp,
            NumericColumn::Ch2o => self.ch2o,
            NumericColumn::Faf => self.faf,
            NumericColumn::Tue => self.tue,
        }
    }
}

/// Trait for loading survey records.
pub trait DatasetSource: Send + Sync {
    /// Error type for dataset operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every record, cleaned and with normalized column names.
    ///
    /// # Errors
    /// Returns error if the source is missing or malformed.
    fn load_records(&self) -> Result<Vec<SurveyRecord>, Self::Error>;
}

/// Relative importance of one model input, as exported by the training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}
