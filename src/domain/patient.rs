//! Patient questionnaire answers.
//!
//! Field set follows the UCI "Estimation of obesity levels based on eating
//! habits and physical condition" survey (Gender, Age, Height, Weight, FAVC,
//! FCVC, NCP, CAEC, SMOKE, CH2O, SCC, FAF, TUE, CALC, family history, MTRANS).

use serde::{Deserialize, Serialize};

use super::categories::{
    CategoricalField, EncodedFeatures, EncodingError, Frequency, Gender, TransportMode, YesNo,
};

/// Answers as typed by the user, before categorical parsing.
///
/// Categorical fields hold free text; numeric fields are already parsed by the
/// input surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnswers {
    pub gender: String,
    pub age: u32,
    pub height_m: f64,
    pub weight_kg: f64,
    pub favc: String,
    pub fcvc: f64,
    pub ncp: f64,
    pub caec: String,
    pub smoke: String,
    pub scc: String,
    pub calc: String,
    pub ch2o: f64,
    pub faf: f64,
    pub tue: f64,
    pub family_history: String,
    pub mtrans: String,
}

impl RawAnswers {
    /// Parse every categorical answer against its vocabulary.
    ///
    /// # Errors
    /// Returns the first [`EncodingError::UnrecognizedCategory`] encountered.
    pub fn parse(&self) -> Result<PatientAnswers, EncodingError> {
        Ok(PatientAnswers {
            gender: Gender::parse(&self.gender)?,
            age: self.age,
            height_m: self.height_m,
            weight_kg: self.weight_kg,
            favc: YesNo::parse(CategoricalField::Favc, &self.favc)?,
            fcvc: self.fcvc,
            ncp: self.ncp,
            caec: Frequency::parse(CategoricalField::Caec, &self.caec)?,
            smoke: YesNo::parse(CategoricalField::Smoke, &self.smoke)?,
            scc: YesNo::parse(CategoricalField::Scc, &self.scc)?,
            calc: Frequency::parse(CategoricalField::Calc, &self.calc)?,
            ch2o: self.ch2o,
            faf: self.faf,
            tue: self.tue,
            family_history: YesNo::parse(CategoricalField::FamilyHistory, &self.family_history)?,
            mtrans: TransportMode::parse(&self.mtrans)?,
        })
    }
}

impl From<&PatientAnswers> for RawAnswers {
    fn from(a: &PatientAnswers) -> Self {
        Self {
            gender: a.gender.as_str().to_string(),
            age: a.age,
            height_m: a.height_m,
            weight_kg: a.weight_kg,
            favc: a.favc.as_str().to_string(),
            fcvc: a.fcvc,
            ncp: a.ncp,
            caec: a.caec.as_str().to_string(),
            smoke: a.smoke.as_str().to_string(),
            scc: a.scc.as_str().to_string(),
            calc: a.calc.as_str().to_string(),
            ch2o: a.ch2o,
            faf: a.faf,
            tue: a.tue,
            family_history: a.family_history.as_str().to_string(),
            mtrans: a.mtrans.as_str().to_string(),
        }
    }
}

/// Validated, typed questionnaire answers for one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientAnswers {
    pub gender: Gender,
    /// Age in whole years (10-80 on the form)
    pub age: u32,
    /// Height in meters (1.0-2.5)
    pub height_m: f64,
    /// Weight in kilograms (30-200)
    pub weight_kg: f64,
    /// Eats high-calorie food frequently
    pub favc: YesNo,
    /// Vegetable consumption frequency (0-3)
    pub fcvc: f64,
    /// Main meals per day (1-6)
    pub ncp: f64,
    /// Food between meals
    pub caec: Frequency,
    pub smoke: YesNo,
    /// Monitors calories / follows professional advice
    pub scc: YesNo,
    /// Alcohol consumption
    pub calc: Frequency,
    /// Daily water intake in litres (0-5)
    pub ch2o: f64,
    /// Physical activity frequency (0-3)
    pub faf: f64,
    /// Technology use in hours per day (0-5)
    pub tue: f64,
    pub family_history: YesNo,
    pub mtrans: TransportMode,
}

/// Inclusive bounds for the numeric answers, as offered by the form.
pub const AGE_RANGE: (u32, u32) = (10, 80);
pub const HEIGHT_RANGE: (f64, f64) = (1.0, 2.5);
pub const WEIGHT_RANGE: (f64, f64) = (30.0, 200.0);
pub const FCVC_RANGE: (f64, f64) = (0.0, 3.0);
pub const NCP_RANGE: (f64, f64) = (1.0, 6.0);
pub const CH2O_RANGE: (f64, f64) = (0.0, 5.0);
pub const FAF_RANGE: (f64, f64) = (0.0, 3.0);
pub const TUE_RANGE: (f64, f64) = (0.0, 5.0);

fn check_range(errors: &mut Vec<String>, label: &str, value: f64, (min, max): (f64, f64)) {
    if !value.is_finite() || value < min || value > max {
        errors.push(format!("{label} {value} out of range [{min}, {max}]"));
    }
}

impl PatientAnswers {
    /// Validate that all numeric answers are within the form's ranges.
    ///
    /// Height must be strictly positive for the BMI computation; the range
    /// check guarantees it.
    ///
    /// # Errors
    /// Returns every violation found, as human-readable strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.age < AGE_RANGE.0 || self.age > AGE_RANGE.1 {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        check_range(&mut errors, "Height", self.height_m, HEIGHT_RANGE);
        check_range(&mut errors, "Weight", self.weight_kg, WEIGHT_RANGE);
        check_range(&mut errors, "FCVC", self.fcvc, FCVC_RANGE);
        check_range(&mut errors, "NCP", self.ncp, NCP_RANGE);
        check_range(&mut errors, "CH2O", self.ch2o, CH2O_RANGE);
        check_range(&mut errors, "FAF", self.faf, FAF_RANGE);
        check_range(&mut errors, "TUE", self.tue, TUE_RANGE);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Map every categorical answer to its integer code.
    #[must_use]
    pub fn encode(&self) -> EncodedFeatures {
        EncodedFeatures {
            gender: self.gender.code(),
            favc: self.favc.code(),
            caec: self.caec.code(),
            smoke: self.smoke.code(),
            scc: self.scc.code(),
            calc: self.calc.code(),
            family_history: self.family_history.code(),
            mtrans: self.mtrans.code(),
        }
    }

    /// Default answers shown by the form.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            gender: Gender::Male,
            age: 25,
            height_m: 1.70,
            weight_kg: 70.0,
            favc: YesNo::Yes,
            fcvc: 2.0,
            ncp: 3.0,
            caec: Frequency::Sometimes,
            smoke: YesNo::No,
            scc: YesNo::No,
            calc: Frequency::Never,
            ch2o: 2.0,
            faf: 1.0,
            tue: 2.0,
            family_history: YesNo::Yes,
            mtrans: TransportMode::PublicTransportation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sample() -> RawAnswers {
        RawAnswers {
            gender: "Male".into(),
            age: 45,
            height_m: 1.70,
            weight_kg: 70.0,
            favc: "yes".into(),
            fcvc: 2.0,
            ncp: 3.0,
            caec: "Frequently".into(),
            smoke: "no".into(),
            scc: "no".into(),
            calc: "no".into(),
            ch2o: 2.0,
            faf: 1.0,
            tue: 2.0,
            family_history: "sim".into(),
            mtrans: "Automobile".into(),
        }
    }

    #[test]
    fn test_parse_raw_answers() {
        let answers = raw_sample().parse().expect("Should parse");
        assert_eq!(answers.gender, Gender::Male);
        assert_eq!(answers.caec, Frequency::Frequently);
        assert_eq!(answers.family_history, YesNo::Yes);
        assert_eq!(answers.mtrans, TransportMode::Automobile);
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let mut raw = raw_sample();
        raw.caec = "talvez".into();
        let err = raw.parse().unwrap_err();
        assert!(matches!(
            err,
            EncodingError::UnrecognizedCategory {
                field: CategoricalField::Caec,
                ..
            }
        ));
    }

    #[test]
    fn test_typed_answers_reparse() {
        let sample = PatientAnswers::sample();
        let raw = RawAnswers::from(&sample);
        assert_eq!(raw.mtrans, "Public_Transportation");
        assert_eq!(raw.parse().expect("Should parse"), sample);
    }

    #[test]
    fn test_encode_answers() {
        let encoded = raw_sample().parse().expect("Should parse").encode();
        assert_eq!(encoded.gender, 1);
        assert_eq!(encoded.favc, 1);
        assert_eq!(encoded.caec, 2);
        assert_eq!(encoded.calc, 0);
        assert_eq!(encoded.mtrans, 2);
    }

    #[test]
    fn test_validation() {
        assert!(PatientAnswers::sample().validate().is_ok());

        let invalid = PatientAnswers {
            age: 5,
            height_m: 0.0,
            weight_kg: 250.0,
            ..PatientAnswers::sample()
        };
        let errors = invalid.validate().unwrap_err();
        assert_eq!(errors.len(), 3);

        let nan = PatientAnswers {
            tue: f64::NAN,
            ..PatientAnswers::sample()
        };
        assert!(nan.validate().is_err());
    }
}
