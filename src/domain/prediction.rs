//! Prediction result types.
//!
//! Represents the output of the obesity level classifier together with the
//! derived values shown alongside it.

use serde::{Deserialize, Serialize};

use super::features::DerivedFeatures;
use super::layout::FeatureLayout;

/// Coarse severity used for coloring and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Underweight or normal weight
    Low,
    /// Overweight
    Moderate,
    /// Obesity
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Target classes of the obesity dataset (`NObeyesdad`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObesityCategory {
    InsufficientWeight,
    NormalWeight,
    OverweightLevelI,
    OverweightLevelII,
    ObesityTypeI,
    ObesityTypeII,
    ObesityTypeIII,
}

impl ObesityCategory {
    pub const ALL: [Self; 7] = [
        Self::InsufficientWeight,
        Self::NormalWeight,
        Self::OverweightLevelI,
        Self::OverweightLevelII,
        Self::ObesityTypeI,
        Self::ObesityTypeII,
        Self::ObesityTypeIII,
    ];

    /// Match a class token such as `Obesity_Type_I` or `obesity type i`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let key = label.trim().to_lowercase().replace(' ', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == key)
    }

    /// Dataset token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientWeight => "Insufficient_Weight",
            Self::NormalWeight => "Normal_Weight",
            Self::OverweightLevelI => "Overweight_Level_I",
            Self::OverweightLevelII => "Overweight_Level_II",
            Self::ObesityTypeI => "Obesity_Type_I",
            Self::ObesityTypeII => "Obesity_Type_II",
            Self::ObesityTypeIII => "Obesity_Type_III",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::InsufficientWeight | Self::NormalWeight => Severity::Low,
            Self::OverweightLevelI | Self::OverweightLevelII => Severity::Moderate,
            Self::ObesityTypeI | Self::ObesityTypeII | Self::ObesityTypeIII => Severity::High,
        }
    }

    /// Short guidance line for the result screen.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::InsufficientWeight => "Below healthy weight - nutritional follow-up suggested",
            Self::NormalWeight => "Healthy weight - keep current habits",
            Self::OverweightLevelI | Self::OverweightLevelII => {
                "Overweight - lifestyle counselling recommended"
            }
            Self::ObesityTypeI | Self::ObesityTypeII | Self::ObesityTypeIII => {
                "Obesity - clinical follow-up advised"
            }
        }
    }
}

impl std::fmt::Display for ObesityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WHO body-mass index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiBand {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiBand {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else if bmi < 35.0 {
            Self::ObesityI
        } else if bmi < 40.0 {
            Self::ObesityII
        } else {
            Self::ObesityIII
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight (< 18.5)",
            Self::Normal => "Normal (18.5 - 24.9)",
            Self::Overweight => "Overweight (25 - 29.9)",
            Self::ObesityI => "Obesity I (30 - 34.9)",
            Self::ObesityII => "Obesity II (35 - 39.9)",
            Self::ObesityIII => "Obesity III (>= 40)",
        }
    }
}

/// Complete prediction record for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique identifier
    pub id: String,

    /// Human-readable class label
    pub label: String,

    /// Label matched against the known dataset classes, if it is one
    pub category: Option<ObesityCategory>,

    /// Class index when the model reported one
    pub class_index: Option<usize>,

    /// Probability of the predicted class, when the model exposes it
    pub probability: Option<f64>,

    /// Derived values used to build the feature vector
    pub derived: DerivedFeatures,

    /// Layout the vector was assembled with
    pub layout: FeatureLayout,

    /// Timestamp of prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    /// Create a new prediction record.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        class_index: Option<usize>,
        probability: Option<f64>,
        derived: DerivedFeatures,
        layout: FeatureLayout,
    ) -> Self {
        let label = label.into();
        Self {
            id: uuid_v4(),
            category: ObesityCategory::from_label(&label),
            label,
            class_index,
            probability,
            derived,
            layout,
            created_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn bmi_band(&self) -> BmiBand {
        BmiBand::from_bmi(self.derived.bmi)
    }

    /// Severity of the predicted category, falling back to the BMI band when
    /// the label is not one of the dataset classes.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self.category {
            Some(category) => category.severity(),
            None => match self.bmi_band() {
                BmiBand::Underweight | BmiBand::Normal => Severity::Low,
                BmiBand::Overweight => Severity::Moderate,
                _ => Severity::High,
            },
        }
    }
}

/// Generate a random UUID v4 using ChaCha20 seeded from OS entropy.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}
