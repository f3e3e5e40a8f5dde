//! CSV-backed survey dataset.
//!
//! Older exports name the target column `Obesity` and the family history
//! column `family_history`; both are renamed to the canonical headers before
//! rows are deserialized.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ports::{DatasetSource, SurveyRecord};

/// Errors from reading the dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset missing column {0}")]
    MissingColumn(String),

    #[error("Dataset is empty")]
    Empty,
}

const HEADER_RENAMES: [(&str, &str); 2] = [
    ("Obesity", "NObeyesdad"),
    ("family_history", "family_history_with_overweight"),
];

const REQUIRED_COLUMNS: [&str; 17] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history_with_overweight",
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
    "MTRANS",
    "NObeyesdad",
];

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Height")]
    height: f64,
    #[serde(rename = "Weight")]
    weight: f64,
    family_history_with_overweight: String,
    #[serde(rename = "FAVC")]
    favc: String,
    #[serde(rename = "FCVC")]
    fcvc: f64,
    #[serde(rename = "NCP")]
    ncp: f64,
    #[serde(rename = "CAEC")]
    caec: String,
    #[serde(rename = "SMOKE")]
    smoke: String,
    #[serde(rename = "CH2O")]
    ch2o: f64,
    #[serde(rename = "SCC")]
    scc: String,
    #[serde(rename = "FAF")]
    faf: f64,
    #[serde(rename = "TUE")]
    tue: f64,
    #[serde(rename = "CALC")]
    calc: String,
    #[serde(rename = "MTRANS")]
    mtrans: String,
    #[serde(rename = "NObeyesdad")]
    category: String,
}

/// `"  male"` -> `"Male"`.
fn capitalize(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<Row> for SurveyRecord {
    fn from(row: Row) -> Self {
        Self {
            gender: capitalize(&row.gender),
            age: row.age,
            height: row.height,
            weight: row.weight,
            family_history: row.family_history_with_overweight,
            favc: row.favc,
            fcvc: row.fcvc,
            ncp: row.ncp,
            caec: row.caec,
            smoke: row.smoke,
            ch2o: row.ch2o,
            scc: row.scc,
            faf: row.faf,
            tue: row.tue,
            calc: row.calc,
            mtrans: row.mtrans,
            category: row.category.trim().to_string(),
        }
    }
}

/// Survey dataset read from a CSV file on every load.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse records from any reader, normalizing headers first.
    ///
    /// # Errors
    /// Returns error on malformed CSV, missing columns or an empty file.
    pub fn read_from<R: std::io::Read>(reader: R) -> Result<Vec<SurveyRecord>, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: csv::StringRecord = reader
            .headers()?
            .iter()
            .map(|h| {
                HEADER_RENAMES
                    .iter()
                    .find(|(old, _)| *old == h)
                    .map_or(h, |(_, new)| *new)
            })
            .collect();

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|c| !headers.iter().any(|h| h == **c))
        {
            return Err(DatasetError::MissingColumn((*missing).to_string()));
        }
        reader.set_headers(headers);

        let mut records = Vec::new();
        for row in reader.deserialize::<Row>() {
            records.push(SurveyRecord::from(row?));
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(records)
    }
}

impl DatasetSource for CsvDataset {
    type Error = DatasetError;

    fn load_records(&self) -> Result<Vec<SurveyRecord>, Self::Error> {
        if !self.path.exists() {
            return Err(DatasetError::NotFound(self.path.clone()));
        }
        let file = std::fs::File::open(&self.path).map_err(csv::Error::from)?;
        let records = Self::read_from(file)?;
        tracing::info!("Loaded {} survey records from {:?}", records.len(), self.path);
        Ok(records)
    }
}
