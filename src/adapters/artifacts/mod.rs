//! Model artifact adapter.
//!
//! Loads the exported classifier, its optional scaler and label table, and the
//! optional feature importances from one directory. Every file the model
//! depends on must be bound by `manifest.json` with its SHA-256 digest, and
//! the manifest declares which feature layout the model was fit on.
//!
//! ```text
//! models/
//!   manifest.json            {"version":1,"layout":"compact-v1","files":{...}}
//!   model.json               random forest
//!   scaler.json              optional, {"mean":[..],"scale":[..]}
//!   labels.json              optional, ["Insufficient_Weight", ...]
//!   feature_importances.csv  optional, unbound, report only
//! ```

mod forest;
mod scaler;

pub use forest::{DecisionTree, ForestClassifier, TreeNode};
pub use scaler::StandardScaler;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::FeatureLayout;
use crate::ports::{FeatureImportance, LabelTable};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const LABELS_FILE: &str = "labels.json";
pub const IMPORTANCES_FILE: &str = "feature_importances.csv";

/// Supported manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Errors raised while loading the artifact directory.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {file}: {reason}")]
    Corrupt { file: String, reason: String },

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),

    #[error("Unsupported manifest version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unknown feature layout: {0:?}")]
    UnknownLayout(String),

    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub layout: String,
    pub files: BTreeMap<String, String>,
}

/// Everything loaded from a verified artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub layout: FeatureLayout,
    pub model: ForestClassifier,
    pub scaler: Option<StandardScaler>,
    pub labels: Option<LabelTable>,
    /// `None` when the importances file is absent or unreadable
    pub importances: Option<Vec<FeatureImportance>>,
    pub manifest_sha256: String,
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(file: &str, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|e| ArtifactError::Corrupt {
        file: file.to_string(),
        reason: e.to_string(),
    })
}

/// Read and check `manifest.json`, then verify every file it binds.
///
/// # Errors
/// Returns error if the manifest is missing or malformed, declares an unknown
/// layout, or any bound file is missing or fails its digest check.
pub fn verify_manifest(dir: &Path) -> Result<(ArtifactManifest, FeatureLayout, String), ArtifactError> {
    let manifest_bytes = read_bytes(&dir.join(MANIFEST_FILE))?;
    let manifest: ArtifactManifest = parse_json(MANIFEST_FILE, &manifest_bytes)?;

    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactError::UnsupportedVersion(manifest.version));
    }

    let layout = FeatureLayout::from_id(&manifest.layout)
        .ok_or_else(|| ArtifactError::UnknownLayout(manifest.layout.clone()))?;

    if !manifest.files.contains_key(MODEL_FILE) {
        return Err(ArtifactError::Inconsistent(format!(
            "{MANIFEST_FILE} must bind {MODEL_FILE}"
        )));
    }

    for (name, expected_hex) in &manifest.files {
        // Bound files live directly in the artifact directory.
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(ArtifactError::Corrupt {
                file: MANIFEST_FILE.to_string(),
                reason: format!("invalid file name {name:?}"),
            });
        }
        let bytes = read_bytes(&dir.join(name))?;
        if !sha256_hex(&bytes).eq_ignore_ascii_case(expected_hex.trim()) {
            return Err(ArtifactError::HashMismatch(name.clone()));
        }
    }

    // Optional inputs present on disk must be bound.
    for optional in [SCALER_FILE, LABELS_FILE] {
        if dir.join(optional).exists() && !manifest.files.contains_key(optional) {
            return Err(ArtifactError::Inconsistent(format!(
                "{optional} is present but not bound by {MANIFEST_FILE}"
            )));
        }
    }

    Ok((manifest, layout, sha256_hex(&manifest_bytes)))
}

/// Hash the model and whichever optional inputs exist in `dir` into a new
/// manifest for `layout`.
///
/// # Errors
/// Returns `ArtifactError::Missing` if `model.json` is absent.
pub fn build_manifest(dir: &Path, layout: FeatureLayout) -> Result<ArtifactManifest, ArtifactError> {
    let mut files = BTreeMap::new();
    files.insert(
        MODEL_FILE.to_string(),
        sha256_hex(&read_bytes(&dir.join(MODEL_FILE))?),
    );
    for optional in [SCALER_FILE, LABELS_FILE] {
        let path = dir.join(optional);
        if path.exists() {
            files.insert(optional.to_string(), sha256_hex(&read_bytes(&path)?));
        }
    }

    Ok(ArtifactManifest {
        version: MANIFEST_VERSION,
        layout: layout.id().to_string(),
        files,
    })
}

/// Load `feature_importances.csv`, sorted by descending importance.
///
/// # Errors
/// Returns error if the file is missing or a row does not parse.
pub fn load_importances(path: &Path) -> Result<Vec<FeatureImportance>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    let corrupt = |e: csv::Error| ArtifactError::Corrupt {
        file: IMPORTANCES_FILE.to_string(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(corrupt)?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<FeatureImportance>() {
        rows.push(row.map_err(corrupt)?);
    }
    rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(rows)
}

/// Load and cross-check the whole artifact directory.
///
/// # Errors
/// Returns error on any manifest, parse or consistency failure. A missing or
/// malformed importances file only logs a warning.
pub fn load_artifacts(dir: &Path) -> Result<ArtifactBundle, ArtifactError> {
    let (manifest, layout, manifest_sha256) = verify_manifest(dir)?;

    let model: ForestClassifier = parse_json(MODEL_FILE, &read_bytes(&dir.join(MODEL_FILE))?)?;
    model.validate().map_err(|reason| ArtifactError::Corrupt {
        file: MODEL_FILE.to_string(),
        reason,
    })?;

    let expected = layout.arity();
    if model.n_features != expected {
        return Err(ArtifactError::Inconsistent(format!(
            "model expects {} features, layout {layout} has {expected}",
            model.n_features
        )));
    }

    let scaler = if manifest.files.contains_key(SCALER_FILE) {
        let scaler: StandardScaler = parse_json(SCALER_FILE, &read_bytes(&dir.join(SCALER_FILE))?)?;
        scaler.validate().map_err(|reason| ArtifactError::Corrupt {
            file: SCALER_FILE.to_string(),
            reason,
        })?;
        if scaler.mean.len() != expected {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler expects {} features, layout {layout} has {expected}",
                scaler.mean.len()
            )));
        }
        Some(scaler)
    } else {
        None
    };

    let labels = if manifest.files.contains_key(LABELS_FILE) {
        let labels: Vec<String> = parse_json(LABELS_FILE, &read_bytes(&dir.join(LABELS_FILE))?)?;
        if labels.len() != model.n_classes {
            return Err(ArtifactError::Inconsistent(format!(
                "{LABELS_FILE} has {} labels, model has {} classes",
                labels.len(),
                model.n_classes
            )));
        }
        Some(LabelTable::new(labels))
    } else {
        None
    };

    if model.classes.is_none() && labels.is_none() {
        return Err(ArtifactError::Inconsistent(format!(
            "model carries no class tokens and {LABELS_FILE} is not provided"
        )));
    }

    let importances = match load_importances(&dir.join(IMPORTANCES_FILE)) {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::warn!("Feature importances unavailable: {e}");
            None
        }
    };

    tracing::info!(
        "Loaded model from {:?} (layout={}, trees={}, classes={}, scaler={}, labels={})",
        dir,
        layout,
        model.trees.len(),
        model.n_classes,
        scaler.is_some(),
        labels.is_some()
    );

    Ok(ArtifactBundle {
        layout,
        model,
        scaler,
        labels,
        importances,
        manifest_sha256,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_load_compact_bundle() {
        let dir = compact_dir();
        let bundle = load_artifacts(dir.path()).expect("load");
        assert_eq!(bundle.layout, FeatureLayout::CompactV1);
        assert!(bundle.scaler.is_none());
        assert_eq!(bundle.labels.as_ref().map(LabelTable::len), Some(3));
        assert!(bundle.importances.is_none());
        assert_eq!(bundle.manifest_sha256.len(), 64);
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), MODEL_FILE, &model_json());
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Missing(_))
        ));
    }

    #[test]
    fn test_tampered_model_rejected() {
        let dir = compact_dir();
        write(dir.path(), MODEL_FILE, &model_json().replace("25.0", "26.0"));
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::HashMismatch(name)) if name == MODEL_FILE
        ));
    }

    #[test]
    fn test_unknown_layout_rejected() {
        let dir = compact_dir();
        write_manifest(dir.path(), "compact-v9", &[MODEL_FILE, LABELS_FILE]);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::UnknownLayout(id)) if id == "compact-v9"
        ));
    }

    #[test]
    fn test_layout_arity_mismatch() {
        let dir = compact_dir();
        write_manifest(dir.path(), "wide-v1", &[MODEL_FILE, LABELS_FILE]);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_unbound_scaler_rejected() {
        let dir = compact_dir();
        write(dir.path(), SCALER_FILE, r#"{"mean":[0,0,0,0],"scale":[1,1,1,1]}"#);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_scaler_arity_checked() {
        let dir = compact_dir();
        write(dir.path(), SCALER_FILE, r#"{"mean":[0,0],"scale":[1,1]}"#);
        write_manifest(dir.path(), "compact-v1", &[MODEL_FILE, LABELS_FILE, SCALER_FILE]);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_label_count_checked() {
        let dir = compact_dir();
        write(dir.path(), LABELS_FILE, r#"["A","B"]"#);
        write_manifest(dir.path(), "compact-v1", &[MODEL_FILE, LABELS_FILE]);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_requires_some_label_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), MODEL_FILE, &model_json());
        write_manifest(dir.path(), "compact-v1", &[MODEL_FILE]);
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_path_in_manifest_rejected() {
        let dir = compact_dir();
        let manifest = ArtifactManifest {
            version: 1,
            layout: "compact-v1".into(),
            files: [
                (MODEL_FILE.to_string(), "00".to_string()),
                ("../etc/passwd".to_string(), "00".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        write(
            dir.path(),
            MANIFEST_FILE,
            &serde_json::to_string(&manifest).expect("json"),
        );
        assert!(matches!(
            verify_manifest(dir.path()),
            Err(ArtifactError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_importances_sorted_and_optional() {
        let dir = compact_dir();
        write(
            dir.path(),
            IMPORTANCES_FILE,
            "feature,importance\nsocial_risk, 0.1\nBMI,0.7\nbehavioral_risk,0.2\n",
        );
        let bundle = load_artifacts(dir.path()).expect("load");
        let rows = bundle.importances.expect("importances");
        assert_eq!(rows[0].feature, "BMI");
        assert_eq!(rows.len(), 3);

        write(dir.path(), IMPORTANCES_FILE, "feature,importance\nBMI,high\n");
        let bundle = load_artifacts(dir.path()).expect("load");
        assert!(bundle.importances.is_none());
    }

    #[test]
    fn test_build_manifest_binds_present_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), MODEL_FILE, &model_json());
        write(
            dir.path(),
            LABELS_FILE,
            &serde_json::to_string(&LABELS).expect("labels"),
        );

        let manifest = build_manifest(dir.path(), FeatureLayout::CompactV1).expect("manifest");
        assert_eq!(manifest.layout, "compact-v1");
        assert_eq!(
            manifest.files.keys().collect::<Vec<_>>(),
            vec![LABELS_FILE, MODEL_FILE]
        );

        write(
            dir.path(),
            MANIFEST_FILE,
            &serde_json::to_string_pretty(&manifest).expect("json"),
        );
        assert!(load_artifacts(dir.path()).is_ok());
    }

    #[test]
    fn test_build_manifest_requires_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            build_manifest(dir.path(), FeatureLayout::WideV1),
            Err(ArtifactError::Missing(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = compact_dir();
        write(
            dir.path(),
            MANIFEST_FILE,
            r#"{"version":2,"layout":"compact-v1","files":{}}"#,
        );
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::UnsupportedVersion(2))
        ));
    }
}
