//! Categorical answers and their fixed integer codes.
//!
//! Every categorical field of the questionnaire is a closed enumeration. Raw
//! answers arrive either as the dataset's English tokens (`"Sometimes"`,
//! `"Public_Transportation"`) or as the Portuguese wording used on the form
//! (`"às vezes"`, `"sim"`). Anything outside the vocabulary is rejected with
//! [`EncodingError::UnrecognizedCategory`]; nothing defaults silently.

use serde::{Deserialize, Serialize};

/// Error raised when a raw answer does not belong to its field's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Unrecognized category {value:?} for field {field}")]
    UnrecognizedCategory {
        field: CategoricalField,
        value: String,
    },
}

/// The categorical columns of the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Gender,
    /// Frequent consumption of high-calorie food
    Favc,
    /// Food between meals
    Caec,
    Smoke,
    /// Calorie monitoring / follows health advice
    Scc,
    /// Alcohol consumption
    Calc,
    FamilyHistory,
    /// Transport mode
    Mtrans,
}

impl CategoricalField {
    pub const ALL: [Self; 8] = [
        Self::Gender,
        Self::Favc,
        Self::Caec,
        Self::Smoke,
        Self::Scc,
        Self::Calc,
        Self::FamilyHistory,
        Self::Mtrans,
    ];

    /// Dataset column name.
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Favc => "FAVC",
            Self::Caec => "CAEC",
            Self::Smoke => "SMOKE",
            Self::Scc => "SCC",
            Self::Calc => "CALC",
            Self::FamilyHistory => "family_history_with_overweight",
            Self::Mtrans => "MTRANS",
        }
    }

    /// Largest code this field can produce. Codes are contiguous from 0.
    #[must_use]
    pub fn max_code(&self) -> u8 {
        match self {
            Self::Gender | Self::Favc | Self::Smoke | Self::Scc | Self::FamilyHistory => 1,
            Self::Caec | Self::Calc | Self::Mtrans => 3,
        }
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Lowercase, trim, and fold underscores so `Public_Transportation` and
/// `public transportation` compare equal.
fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', " ")
}

fn unrecognized(field: CategoricalField, raw: &str) -> EncodingError {
    EncodingError::UnrecognizedCategory {
        field,
        value: raw.to_string(),
    }
}

/// Encode a raw answer for `field` into its integer code.
///
/// # Errors
/// Returns [`EncodingError::UnrecognizedCategory`] when `raw` is not part of
/// the field's vocabulary.
pub fn encode(field: CategoricalField, raw: &str) -> Result<u8, EncodingError> {
    match field {
        CategoricalField::Gender => Gender::parse(raw).map(Gender::code),
        CategoricalField::Favc
        | CategoricalField::Smoke
        | CategoricalField::Scc
        | CategoricalField::FamilyHistory => YesNo::parse(field, raw).map(YesNo::code),
        CategoricalField::Caec | CategoricalField::Calc => {
            Frequency::parse(field, raw).map(Frequency::code)
        }
        CategoricalField::Mtrans => TransportMode::parse(raw).map(TransportMode::code),
    }
}

/// Biological sex as recorded by the dataset (`Female` = 0, `Male` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// # Errors
    /// Returns [`EncodingError::UnrecognizedCategory`] for unknown spellings.
    pub fn parse(raw: &str) -> Result<Self, EncodingError> {
        match normalize(raw).as_str() {
            "female" | "f" | "feminino" => Ok(Self::Female),
            "male" | "m" | "masculino" => Ok(Self::Male),
            _ => Err(unrecognized(CategoricalField::Gender, raw)),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 0,
            Self::Male => 1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

/// Binary answer (`no` = 0, `yes` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    No,
    Yes,
}

impl YesNo {
    pub const ALL: [Self; 2] = [Self::Yes, Self::No];

    /// # Errors
    /// Returns [`EncodingError::UnrecognizedCategory`] tagged with `field`.
    pub fn parse(field: CategoricalField, raw: &str) -> Result<Self, EncodingError> {
        match normalize(raw).as_str() {
            "no" | "não" | "nao" => Ok(Self::No),
            "yes" | "sim" => Ok(Self::Yes),
            _ => Err(unrecognized(field, raw)),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
        }
    }

    #[must_use]
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Intensity-ordered frequency scale shared by CAEC and CALC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Never,
    Sometimes,
    Frequently,
    Always,
}

impl Frequency {
    pub const ALL: [Self; 4] = [Self::Never, Self::Sometimes, Self::Frequently, Self::Always];

    /// # Errors
    /// Returns [`EncodingError::UnrecognizedCategory`] tagged with `field`.
    pub fn parse(field: CategoricalField, raw: &str) -> Result<Self, EncodingError> {
        match normalize(raw).as_str() {
            "no" | "never" | "nunca" | "não" | "nao" => Ok(Self::Never),
            "sometimes" | "às vezes" | "as vezes" => Ok(Self::Sometimes),
            "frequently" | "frequentemente" => Ok(Self::Frequently),
            "always" | "sempre" => Ok(Self::Always),
            _ => Err(unrecognized(field, raw)),
        }
    }

    /// Rank 0..=3, preserving intensity order.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Never => 0,
            Self::Sometimes => 1,
            Self::Frequently => 2,
            Self::Always => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "no",
            Self::Sometimes => "Sometimes",
            Self::Frequently => "Frequently",
            Self::Always => "Always",
        }
    }
}

/// Usual transport mode, banded by how sedentary it is.
///
/// The code is a risk band, not alphabetical order: active modes share band 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    Walking,
    Bike,
    Motorbike,
    Automobile,
    PublicTransportation,
}

impl TransportMode {
    pub const ALL: [Self; 5] = [
        Self::Walking,
        Self::Bike,
        Self::Motorbike,
        Self::Automobile,
        Self::PublicTransportation,
    ];

    /// # Errors
    /// Returns [`EncodingError::UnrecognizedCategory`] for unknown modes.
    pub fn parse(raw: &str) -> Result<Self, EncodingError> {
        match normalize(raw).as_str() {
            "walking" | "caminhada" | "a pé" | "a pe" => Ok(Self::Walking),
            "bike" | "bicycle" | "bicicleta" => Ok(Self::Bike),
            "motorbike" | "moto" | "motocicleta" => Ok(Self::Motorbike),
            "automobile" | "car" | "carro" => Ok(Self::Automobile),
            "public transportation" | "transporte público" | "transporte publico" => {
                Ok(Self::PublicTransportation)
            }
            _ => Err(unrecognized(CategoricalField::Mtrans, raw)),
        }
    }

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Walking | Self::Bike => 0,
            Self::Motorbike => 1,
            Self::Automobile => 2,
            Self::PublicTransportation => 3,
        }
    }

    /// Motorized or transit modes (band 1 and above).
    #[must_use]
    pub fn is_motorized(self) -> bool {
        self.code() >= 1
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "Walking",
            Self::Bike => "Bike",
            Self::Motorbike => "Motorbike",
            Self::Automobile => "Automobile",
            Self::PublicTransportation => "Public_Transportation",
        }
    }
}

/// Patient answers after categorical-to-numeric mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFeatures {
    pub gender: u8,
    pub favc: u8,
    pub caec: u8,
    pub smoke: u8,
    pub scc: u8,
    pub calc: u8,
    pub family_history: u8,
    pub mtrans: u8,
}
