//! Prediction service: answers in, labelled prediction out.
//!
//! The pipeline for one request:
//! - validate numeric ranges
//! - encode categoricals and derive risk features
//! - assemble the vector in the layout the artifacts declare
//! - scale, classify and resolve the class label

use std::path::Path;
use std::sync::Arc;

use crate::adapters::artifacts::{self, ArtifactBundle};
use crate::domain::{
    self, DerivedFeatures, FeatureLayout, FeatureVector, PatientAnswers, Prediction, RawAnswers,
};
use crate::ports::{
    ClassOutput, Classifier, FeatureImportance, FeatureScaler, LabelTable, PredictionError,
};
use crate::ObesitrackError;

/// Loaded model artifacts. Immutable once built.
pub struct ModelArtifacts {
    layout: FeatureLayout,
    model: Box<dyn Classifier>,
    scaler: Option<Box<dyn FeatureScaler>>,
    labels: Option<LabelTable>,
    importances: Option<Vec<FeatureImportance>>,
    fingerprint: Option<String>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("layout", &self.layout)
            .field("n_features", &self.model.n_features())
            .field("scaler", &self.scaler.is_some())
            .field("labels", &self.labels.as_ref().map(LabelTable::len))
            .field("importances", &self.importances.as_ref().map(Vec::len))
            .finish()
    }
}

impl ModelArtifacts {
    #[must_use]
    pub fn new(
        layout: FeatureLayout,
        model: Box<dyn Classifier>,
        scaler: Option<Box<dyn FeatureScaler>>,
        labels: Option<LabelTable>,
    ) -> Self {
        Self {
            layout,
            model,
            scaler,
            labels,
            importances: None,
            fingerprint: None,
        }
    }

    #[must_use]
    pub fn with_importances(mut self, importances: Vec<FeatureImportance>) -> Self {
        self.importances = Some(importances);
        self
    }

    /// Load and verify an artifact directory.
    ///
    /// # Errors
    /// Returns `ObesitrackError::ArtifactLoad` if the directory fails
    /// verification, or `ObesitrackError::Config` if `expected_layout` is set
    /// and differs from the manifest.
    pub fn load(dir: &Path, expected_layout: Option<FeatureLayout>) -> Result<Self, ObesitrackError> {
        let bundle = artifacts::load_artifacts(dir)?;
        if let Some(expected) = expected_layout {
            if expected != bundle.layout {
                return Err(ObesitrackError::Config(format!(
                    "artifacts in {dir:?} use layout {}, configuration expects {expected}",
                    bundle.layout
                )));
            }
        }
        Ok(Self::from(bundle))
    }

    #[must_use]
    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    #[must_use]
    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    #[must_use]
    pub fn labels(&self) -> Option<&LabelTable> {
        self.labels.as_ref()
    }

    /// Feature importances, when the training run exported them.
    #[must_use]
    pub fn importances(&self) -> Option<&[FeatureImportance]> {
        self.importances.as_deref()
    }

    /// Short manifest digest for display.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref().map(|f| &f[..f.len().min(16)])
    }

    /// Classify an assembled vector.
    ///
    /// # Errors
    /// See [`predict`].
    pub fn predict(&self, vector: &FeatureVector) -> Result<ResolvedClass, PredictionError> {
        predict(
            vector,
            self.layout,
            self.model.as_ref(),
            self.scaler.as_deref(),
            self.labels.as_ref(),
        )
    }
}

impl From<ArtifactBundle> for ModelArtifacts {
    fn from(bundle: ArtifactBundle) -> Self {
        Self {
            layout: bundle.layout,
            model: Box::new(bundle.model),
            scaler: bundle
                .scaler
                .map(|s| Box::new(s) as Box<dyn FeatureScaler>),
            labels: bundle.labels,
            importances: bundle.importances,
            fingerprint: Some(bundle.manifest_sha256),
        }
    }
}

/// Classifier output with the label resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClass {
    pub label: String,
    pub class_index: Option<usize>,
    pub probability: Option<f64>,
}

/// Scale (when a scaler is present), classify and resolve one vector.
///
/// # Errors
/// - `PredictionError::LayoutMismatch` if the vector was assembled for another layout
/// - `PredictionError::ShapeMismatch` if its length differs from what the
///   scaler or model expects
/// - `PredictionError::LabelOutOfRange` if the class index has no label
pub fn predict(
    vector: &FeatureVector,
    expected_layout: FeatureLayout,
    model: &dyn Classifier,
    scaler: Option<&dyn FeatureScaler>,
    labels: Option<&LabelTable>,
) -> Result<ResolvedClass, PredictionError> {
    if vector.layout != expected_layout {
        return Err(PredictionError::LayoutMismatch {
            expected: expected_layout,
            actual: vector.layout,
        });
    }

    let expected = model.n_features();
    if vector.len() != expected {
        return Err(PredictionError::ShapeMismatch {
            expected,
            actual: vector.len(),
        });
    }

    let scaled;
    let input: &[f64] = match scaler {
        Some(scaler) => {
            if scaler.n_features() != expected {
                return Err(PredictionError::ShapeMismatch {
                    expected: scaler.n_features(),
                    actual: vector.len(),
                });
            }
            scaled = scaler.transform(&vector.values)?;
            &scaled
        }
        None => &vector.values,
    };

    let output = model.predict(input)?;

    let (label, class_index) = match output.class {
        ClassOutput::Label(label) => (label, None),
        ClassOutput::Index(index) => {
            let table = labels.ok_or_else(|| {
                PredictionError::Model(format!("class index {index} with no label table"))
            })?;
            (table.resolve(index)?.to_string(), Some(index))
        }
    };

    Ok(ResolvedClass {
        label,
        class_index,
        probability: output.probability,
    })
}

/// Service for turning patient answers into predictions.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifacts: Arc<ModelArtifacts>,
}

impl PredictionService {
    #[must_use]
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    #[must_use]
    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    fn prepare(
        &self,
        answers: &PatientAnswers,
    ) -> Result<(FeatureVector, DerivedFeatures), ObesitrackError> {
        answers
            .validate()
            .map_err(|errors| ObesitrackError::Validation(errors.join("; ")))?;

        let encoded = answers.encode();
        let derived = domain::derive(answers, &encoded);
        let vector = domain::assemble(answers, &encoded, &derived, self.artifacts.layout());
        Ok((vector, derived))
    }

    /// Run the full pipeline for validated, typed answers.
    ///
    /// # Errors
    /// Returns `ObesitrackError::Validation` for out-of-range answers or
    /// `ObesitrackError::Prediction` if the model rejects the vector.
    pub fn predict(&self, answers: &PatientAnswers) -> Result<Prediction, ObesitrackError> {
        let (vector, derived) = self.prepare(answers)?;

        let resolved = self.artifacts.predict(&vector).map_err(|e| {
            tracing::warn!("Prediction failed: {e}");
            e
        })?;

        let prediction = Prediction::new(
            resolved.label,
            resolved.class_index,
            resolved.probability,
            derived,
            vector.layout,
        );

        tracing::info!(
            "Prediction complete: label={}, layout={}, probability={}",
            prediction.label,
            prediction.layout,
            prediction
                .probability
                .map_or_else(|| "n/a".to_string(), |p| format!("{:.1}%", p * 100.0))
        );

        Ok(prediction)
    }

    /// Parse raw string answers, then predict.
    ///
    /// # Errors
    /// Returns `ObesitrackError::Encoding` for an unrecognized categorical
    /// answer, otherwise as [`PredictionService::predict`].
    pub fn predict_raw(&self, raw: &RawAnswers) -> Result<Prediction, ObesitrackError> {
        let answers = raw.parse()?;
        self.predict(&answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::fixtures::compact_dir;
    use crate::adapters::artifacts::StandardScaler;
    use crate::domain::{Frequency, Gender, ObesityCategory, YesNo};
    use crate::ports::ModelOutput;

    /// Predicts class 2 when the first input exceeds 30, class 0 otherwise.
    struct ThresholdModel {
        n_features: usize,
    }

    impl Classifier for ThresholdModel {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict(&self, features: &[f64]) -> Result<ModelOutput, PredictionError> {
            if features.len() != self.n_features {
                return Err(PredictionError::ShapeMismatch {
                    expected: self.n_features,
                    actual: features.len(),
                });
            }
            let index = if features[0] > 30.0 { 2 } else { 0 };
            Ok(ModelOutput {
                class: ClassOutput::Index(index),
                probability: None,
            })
        }
    }

    struct FixedLabel;

    impl Classifier for FixedLabel {
        fn n_features(&self) -> usize {
            4
        }

        fn predict(&self, _features: &[f64]) -> Result<ModelOutput, PredictionError> {
            Ok(ModelOutput {
                class: ClassOutput::Label("Obesity_Type_I".into()),
                probability: Some(0.8),
            })
        }
    }

    fn labels(n: usize) -> LabelTable {
        let all = [
            "Normal_Weight",
            "Overweight_Level_I",
            "Obesity_Type_II",
            "Obesity_Type_III",
        ];
        LabelTable::new(all[..n].iter().map(|s| (*s).to_string()).collect())
    }

    fn compact_service(model: Box<dyn Classifier>, table: Option<LabelTable>) -> PredictionService {
        PredictionService::new(Arc::new(ModelArtifacts::new(
            FeatureLayout::CompactV1,
            model,
            None,
            table,
        )))
    }

    fn heavy_patient() -> PatientAnswers {
        PatientAnswers {
            gender: Gender::Male,
            age: 45,
            weight_kg: 110.0,
            favc: YesNo::Yes,
            caec: Frequency::Frequently,
            ..PatientAnswers::sample()
        }
    }

    #[test]
    fn test_predict_resolves_index() {
        let service = compact_service(Box::new(ThresholdModel { n_features: 4 }), Some(labels(3)));

        let normal = service.predict(&PatientAnswers::sample()).expect("predict");
        assert_eq!(normal.label, "Normal_Weight");
        assert_eq!(normal.class_index, Some(0));
        assert_eq!(normal.category, Some(ObesityCategory::NormalWeight));
        assert!((normal.derived.bmi - 24.22).abs() < 0.01);

        let heavy = service.predict(&heavy_patient()).expect("predict");
        assert_eq!(heavy.label, "Obesity_Type_II");
        assert_eq!(heavy.derived.social_risk, 3);
    }

    #[test]
    fn test_model_label_passes_through() {
        let service = compact_service(Box::new(FixedLabel), None);
        let p = service.predict(&PatientAnswers::sample()).expect("predict");
        assert_eq!(p.label, "Obesity_Type_I");
        assert_eq!(p.class_index, None);
        assert_eq!(p.probability, Some(0.8));
    }

    #[test]
    fn test_label_out_of_range() {
        let service = compact_service(Box::new(ThresholdModel { n_features: 4 }), Some(labels(2)));
        let err = service.predict(&heavy_patient()).unwrap_err();
        assert!(matches!(
            err,
            ObesitrackError::Prediction(PredictionError::LabelOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn test_wide_vector_rejected_by_compact_model() {
        let artifacts = ModelArtifacts::new(
            FeatureLayout::CompactV1,
            Box::new(ThresholdModel { n_features: 4 }),
            None,
            Some(labels(3)),
        );
        let answers = PatientAnswers::sample();
        let encoded = answers.encode();
        let derived = domain::derive(&answers, &encoded);
        let wide = domain::assemble(&answers, &encoded, &derived, FeatureLayout::WideV1);

        assert_eq!(
            artifacts.predict(&wide),
            Err(PredictionError::LayoutMismatch {
                expected: FeatureLayout::CompactV1,
                actual: FeatureLayout::WideV1
            })
        );
    }

    #[test]
    fn test_shape_mismatch_from_model_arity() {
        let vector = FeatureVector {
            layout: FeatureLayout::WideV1,
            values: vec![0.0; 18],
        };
        let err = predict(
            &vector,
            FeatureLayout::WideV1,
            &ThresholdModel { n_features: 4 },
            None,
            Some(&labels(3)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PredictionError::ShapeMismatch {
                expected: 4,
                actual: 18
            }
        );
    }

    #[test]
    fn test_scaler_applied_before_model() {
        // BMI 24.22 scaled by (x - 0) / 0.5 crosses the stub's threshold of 30.
        let scaler = StandardScaler {
            mean: vec![0.0; 4],
            scale: vec![0.5, 1.0, 1.0, 1.0],
        };
        let service = PredictionService::new(Arc::new(ModelArtifacts::new(
            FeatureLayout::CompactV1,
            Box::new(ThresholdModel { n_features: 4 }),
            Some(Box::new(scaler)),
            Some(labels(3)),
        )));
        let p = service.predict(&PatientAnswers::sample()).expect("predict");
        assert_eq!(p.class_index, Some(2));
    }

    #[test]
    fn test_validation_collects_errors() {
        let service = compact_service(Box::new(FixedLabel), None);
        let answers = PatientAnswers {
            age: 5,
            height_m: 3.0,
            ..PatientAnswers::sample()
        };
        match service.predict(&answers) {
            Err(ObesitrackError::Validation(msg)) => assert!(msg.contains(';')),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_predict_raw_rejects_unknown_answer() {
        let service = compact_service(Box::new(FixedLabel), None);
        let mut raw = RawAnswers::from(&PatientAnswers::sample());
        raw.caec = "talvez".into();
        assert!(matches!(
            service.predict_raw(&raw),
            Err(ObesitrackError::Encoding(_))
        ));
    }

    #[test]
    fn test_end_to_end_with_loaded_artifacts() {
        let dir = compact_dir();
        let artifacts = ModelArtifacts::load(dir.path(), Some(FeatureLayout::CompactV1)).expect("load");
        assert!(artifacts.fingerprint().is_some());
        let service = PredictionService::new(Arc::new(artifacts));

        let p = service.predict(&PatientAnswers::sample()).expect("predict");
        assert_eq!(p.label, "Normal_Weight");
        assert_eq!(p.class_index, Some(0));
        assert!((p.probability.unwrap_or_default() - 0.9).abs() < 1e-12);

        let heavy = service.predict(&heavy_patient()).expect("predict");
        assert_eq!(heavy.label, "Obesity_Type_I");
    }

    #[test]
    fn test_bundled_demo_model() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let artifacts = ModelArtifacts::load(&dir, None).expect("load bundled models");
        assert_eq!(artifacts.layout(), FeatureLayout::CompactV1);
        assert!(artifacts.importances().is_some_and(|rows| rows[0].feature == "BMI"));
        let service = PredictionService::new(Arc::new(artifacts));

        let p = service.predict(&PatientAnswers::sample()).expect("predict");
        assert_eq!(p.label, "Normal_Weight");
        assert!((p.probability.unwrap_or_default() - 1.9 / 3.0).abs() < 1e-9);

        let heavy = service.predict(&heavy_patient()).expect("predict");
        assert_eq!(heavy.label, "Obesity_Type_II");
        assert_eq!(heavy.derived.social_risk, 3);
    }

    #[test]
    fn test_load_rejects_layout_override() {
        let dir = compact_dir();
        assert!(matches!(
            ModelArtifacts::load(dir.path(), Some(FeatureLayout::WideV1)),
            Err(ObesitrackError::Config(_))
        ));
    }
}
