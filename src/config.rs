//! Runtime configuration from `OBESITRACK_*` environment variables.

use std::path::PathBuf;

use crate::domain::FeatureLayout;
use crate::ObesitrackError;

pub const MODEL_PATH_ENV: &str = "OBESITRACK_MODEL_PATH";
pub const DATASET_PATH_ENV: &str = "OBESITRACK_DATASET_PATH";
pub const LOG_MODE_ENV: &str = "OBESITRACK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "OBESITRACK_LOG_FILE";
pub const LAYOUT_ENV: &str = "OBESITRACK_LAYOUT";

const DEFAULT_MODEL_PATH: &str = "models";
const DEFAULT_DATASET_PATH: &str = "Obesity.csv";
const DEFAULT_LOG_FILE: &str = "obesitrack.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Some(Self::Auto),
            "file" => Some(Self::File),
            "stdout" => Some(Self::Stdout),
            _ => None,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::Auto => interactive,
            Self::File => true,
            Self::Stdout => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Artifact directory with `manifest.json`
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// When set, the loaded artifacts must declare this layout
    pub expected_layout: Option<FeatureLayout>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            expected_layout: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ObesitrackError::Config` for an unknown log mode or layout id.
    pub fn from_env() -> Result<Self, ObesitrackError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `ObesitrackError::Config` for an unknown log mode or layout id.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ObesitrackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(MODEL_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(DATASET_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(LOG_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(path);
        }
        if let Some(mode) = lookup(LOG_MODE_ENV) {
            config.log_mode = LogMode::parse(&mode).ok_or_else(|| {
                ObesitrackError::Config(format!("{LOG_MODE_ENV}={mode:?} (expected auto, file or stdout)"))
            })?;
        }
        if let Some(id) = lookup(LAYOUT_ENV).filter(|v| !v.trim().is_empty()) {
            let layout = FeatureLayout::from_id(&id).ok_or_else(|| {
                ObesitrackError::Config(format!("{LAYOUT_ENV}={id:?} is not a known layout"))
            })?;
            config.expected_layout = Some(layout);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_path, PathBuf::from("models"));
        assert_eq!(config.dataset_path, PathBuf::from("Obesity.csv"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (MODEL_PATH_ENV, "/srv/model"),
            (LOG_MODE_ENV, "STDOUT"),
            (LAYOUT_ENV, "wide-v1"),
        ]))
        .expect("config");
        assert_eq!(config.model_path, PathBuf::from("/srv/model"));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.expected_layout, Some(FeatureLayout::WideV1));
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[(LOG_MODE_ENV, "syslog")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(LAYOUT_ENV, "tiny-v2")])).is_err());
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
