//! Derived features: body-mass index and composite risk scores.
//!
//! Every surface that needs these values goes through [`derive`]; the scores
//! are fixed rule sums, not learned.

use serde::{Deserialize, Serialize};

use super::categories::{EncodedFeatures, Frequency};
use super::patient::PatientAnswers;

/// Physical activity below this frequency counts as sedentary.
pub const LOW_ACTIVITY_THRESHOLD: f64 = 1.0;

/// Daily technology use at or above this many hours counts as sedentary.
pub const HIGH_SCREEN_TIME_HOURS: f64 = 2.0;

/// Ages strictly above this count toward social risk.
pub const SOCIAL_RISK_AGE: u32 = 40;

/// Number of indicators summed by each composite score.
pub const SCORE_MAX: u8 = 3;

/// Values computed from the answers for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// weight / height²
    pub bmi: f64,
    /// High-calorie food + frequent snacking + frequent drinking (0-3)
    pub behavioral_risk: u8,
    /// Low activity + high screen time + motorized transport (0-3)
    pub sedentary_risk: u8,
    /// Family history + male + age over 40 (0-3)
    pub social_risk: u8,
    /// Litres of water per kilogram of body weight
    pub water_per_kg: f64,
    /// Activity frequency minus technology hours
    pub active_vs_sedentary: f64,
}

/// Body-mass index in kg/m².
///
/// Height must be positive; input validation guarantees it.
#[must_use]
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

fn indicator(condition: bool) -> u8 {
    u8::from(condition)
}

/// Compute every derived feature from the answers and their codes.
#[must_use]
pub fn derive(raw: &PatientAnswers, encoded: &EncodedFeatures) -> DerivedFeatures {
    let behavioral_risk = indicator(encoded.favc == 1)
        + indicator(encoded.caec >= Frequency::Frequently.code())
        + indicator(encoded.calc >= Frequency::Frequently.code());

    let sedentary_risk = indicator(raw.faf < LOW_ACTIVITY_THRESHOLD)
        + indicator(raw.tue >= HIGH_SCREEN_TIME_HOURS)
        + indicator(raw.mtrans.is_motorized());

    let social_risk = indicator(encoded.family_history == 1)
        + indicator(encoded.gender == 1)
        + indicator(raw.age > SOCIAL_RISK_AGE);

    DerivedFeatures {
        bmi: bmi(raw.weight_kg, raw.height_m),
        behavioral_risk,
        sedentary_risk,
        social_risk,
        water_per_kg: raw.ch2o / raw.weight_kg,
        active_vs_sedentary: raw.faf - raw.tue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::categories::{Gender, TransportMode, YesNo};

    fn answers() -> PatientAnswers {
        PatientAnswers {
            gender: Gender::Female,
            age: 30,
            height_m: 1.70,
            weight_kg: 70.0,
            favc: YesNo::No,
            fcvc: 2.0,
            ncp: 3.0,
            caec: Frequency::Never,
            smoke: YesNo::No,
            scc: YesNo::No,
            calc: Frequency::Never,
            ch2o: 2.0,
            faf: 2.0,
            tue: 1.0,
            family_history: YesNo::No,
            mtrans: TransportMode::Walking,
        }
    }

    fn derive_for(a: &PatientAnswers) -> DerivedFeatures {
        derive(a, &a.encode())
    }

    #[test]
    fn test_bmi_reference_value() {
        let value = bmi(70.0, 1.70);
        assert!((value - 24.22).abs() < 0.01, "bmi = {value}");
    }

    #[test]
    fn test_bmi_monotonic() {
        let mut previous = 0.0;
        for w in (30..=200).step_by(10) {
            let value = bmi(f64::from(w), 1.75);
            assert!(value > previous);
            previous = value;
        }

        let mut previous = f64::INFINITY;
        for h in 100..=250 {
            let value = bmi(80.0, f64::from(h) / 100.0);
            assert!(value < previous);
            previous = value;
        }
    }

    #[test]
    fn test_behavioral_scenario() {
        let a = PatientAnswers {
            favc: YesNo::Yes,
            caec: Frequency::Frequently,
            calc: Frequency::Never,
            scc: YesNo::No,
            smoke: YesNo::No,
            ..answers()
        };
        assert_eq!(derive_for(&a).behavioral_risk, 2);
    }

    #[test]
    fn test_social_scenario() {
        let a = PatientAnswers {
            gender: Gender::Male,
            age: 45,
            family_history: YesNo::parse(
                crate::domain::categories::CategoricalField::FamilyHistory,
                "sim",
            )
            .expect("sim is a yes"),
            ..answers()
        };
        assert_eq!(derive_for(&a).social_risk, 3);
    }

    #[test]
    fn test_age_forty_is_not_risk() {
        let a = PatientAnswers {
            age: 40,
            ..answers()
        };
        assert_eq!(derive_for(&a).social_risk, 0);
    }

    #[test]
    fn test_sedentary_indicators_accumulate() {
        let base = answers();
        assert_eq!(derive_for(&base).sedentary_risk, 0);

        let low_activity = PatientAnswers { faf: 0.5, ..base };
        assert_eq!(derive_for(&low_activity).sedentary_risk, 1);

        let screens = PatientAnswers {
            tue: 2.0,
            ..low_activity
        };
        assert_eq!(derive_for(&screens).sedentary_risk, 2);

        let car = PatientAnswers {
            mtrans: TransportMode::Automobile,
            ..screens
        };
        assert_eq!(derive_for(&car).sedentary_risk, 3);
    }

    #[test]
    fn test_scores_bounded_and_monotonic() {
        // Walk every combination of the behavioral indicators.
        for favc in YesNo::ALL {
            for caec in Frequency::ALL {
                for calc in Frequency::ALL {
                    let a = PatientAnswers {
                        favc,
                        caec,
                        calc,
                        ..answers()
                    };
                    let d = derive_for(&a);
                    assert!(d.behavioral_risk <= SCORE_MAX);
                    assert!(d.sedentary_risk <= SCORE_MAX);
                    assert!(d.social_risk <= SCORE_MAX);

                    if favc == YesNo::No {
                        let flipped = PatientAnswers {
                            favc: YesNo::Yes,
                            ..a
                        };
                        assert_eq!(derive_for(&flipped).behavioral_risk, d.behavioral_risk + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_behavioral_score_follows_frequency_order() {
        for field in ["caec", "calc"] {
            let mut previous = 0;
            for level in Frequency::ALL {
                let a = match field {
                    "caec" => PatientAnswers {
                        caec: level,
                        ..answers()
                    },
                    _ => PatientAnswers {
                        calc: level,
                        ..answers()
                    },
                };
                let score = derive_for(&a).behavioral_risk;
                assert!(score >= previous, "{field} {level:?} dropped to {score}");
                previous = score;
            }
            assert_eq!(previous, 1, "{field} at Always");
        }
    }

    #[test]
    fn test_auxiliary_ratios() {
        let d = derive_for(&answers());
        assert!((d.water_per_kg - 2.0 / 70.0).abs() < f64::EPSILON);
        assert!((d.active_vs_sedentary - 1.0).abs() < f64::EPSILON);
    }
}
