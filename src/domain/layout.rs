//! Feature vector layouts.
//!
//! A layout is the exact field order and length a trained classifier was fit
//! on. Two layouts exist and they are NOT interchangeable: an artifact bundle
//! declares which one it expects in its manifest, and the assembler must be
//! called with that layout.

use serde::{Deserialize, Serialize};

use super::categories::EncodedFeatures;
use super::features::DerivedFeatures;
use super::patient::PatientAnswers;

/// Named, versioned feature layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureLayout {
    /// Every answer (encoded) plus BMI, behavioral score and two ratios.
    #[serde(rename = "wide-v1")]
    WideV1,
    /// BMI plus the three composite risk scores.
    #[serde(rename = "compact-v1")]
    CompactV1,
}

const WIDE_V1_NAMES: [&str; 18] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "BMI",
    "risk_score",
    "water_per_kg",
    "active_vs_sedentary",
];

const COMPACT_V1_NAMES: [&str; 4] = ["BMI", "behavioral_risk", "sedentary_risk", "social_risk"];

impl FeatureLayout {
    pub const ALL: [Self; 2] = [Self::WideV1, Self::CompactV1];

    /// Stable identifier used in artifact manifests.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::WideV1 => "wide-v1",
            Self::CompactV1 => "compact-v1",
        }
    }

    /// Look up a layout by its manifest identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.id() == id.trim())
    }

    /// Column names in vector order.
    #[must_use]
    pub fn feature_names(&self) -> &'static [&'static str] {
        match self {
            Self::WideV1 => &WIDE_V1_NAMES,
            Self::CompactV1 => &COMPACT_V1_NAMES,
        }
    }

    /// Number of values in a vector of this layout.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.feature_names().len()
    }
}

impl std::fmt::Display for FeatureLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Ordered numeric input for a classifier, tagged with its layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub layout: FeatureLayout,
    pub values: Vec<f64>,
}

impl FeatureVector {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pair each value with its column name.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.layout
            .feature_names()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

/// Assemble the feature vector for `layout`.
#[must_use]
pub fn assemble(
    raw: &PatientAnswers,
    encoded: &EncodedFeatures,
    derived: &DerivedFeatures,
    layout: FeatureLayout,
) -> FeatureVector {
    let values = match layout {
        FeatureLayout::WideV1 => vec![
            f64::from(encoded.gender),
            f64::from(raw.age),
            raw.height_m,
            raw.weight_kg,
            f64::from(encoded.favc),
            raw.fcvc,
            raw.ncp,
            f64::from(encoded.caec),
            f64::from(encoded.smoke),
            raw.ch2o,
            f64::from(encoded.scc),
            raw.faf,
            raw.tue,
            f64::from(encoded.calc),
            derived.bmi,
            f64::from(derived.behavioral_risk),
            derived.water_per_kg,
            derived.active_vs_sedentary,
        ],
        FeatureLayout::CompactV1 => vec![
            derived.bmi,
            f64::from(derived.behavioral_risk),
            f64::from(derived.sedentary_risk),
            f64::from(derived.social_risk),
        ],
    };

    FeatureVector { layout, values }
}
