//! Report service: descriptive statistics over the historical survey.
//!
//! Backs the report screen tabs: overview, gender, category, correlation,
//! box summaries, scatter and feature importances.

use std::collections::BTreeMap;

use crate::adapters::DatasetError;
use crate::application::ModelArtifacts;
use crate::domain::ObesityCategory;
use crate::ports::{DatasetSource, FeatureImportance, NumericColumn, SurveyRecord};
use crate::ObesitrackError;

/// Columns in the canonical dataset.
pub const DATASET_COLUMNS: usize = 17;

/// Dataset size and class balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub records: usize,
    pub columns: usize,
    pub categories: usize,
    /// Count per target class, in category order
    pub category_counts: Vec<(String, usize)>,
}

/// Count table of one categorical column against another.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    fn build<R: Into<String>, C: Into<String>>(
        pairs: impl Iterator<Item = (R, C)>,
        row_order: fn(&str) -> (usize, String),
    ) -> Self {
        let mut cells: BTreeMap<(String, String), usize> = BTreeMap::new();
        for (row, col) in pairs {
            *cells.entry((row.into(), col.into())).or_default() += 1;
        }

        let mut rows: Vec<String> = cells.keys().map(|(r, _)| r.clone()).collect();
        rows.sort_by_key(|r| row_order(r));
        rows.dedup();
        let mut columns: Vec<String> = cells.keys().map(|(_, c)| c.clone()).collect();
        columns.sort();
        columns.dedup();

        let counts = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| cells.get(&(r.clone(), c.clone())).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            rows,
            columns,
            counts,
        }
    }

    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> usize {
        let r = self.rows.iter().position(|x| x == row);
        let c = self.columns.iter().position(|x| x == column);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }
}

/// Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// `None` where a column has zero variance
    pub values: Vec<Vec<Option<f64>>>,
}

/// Minimum, quartiles and maximum of one column within one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumber {
    /// Quartiles with linear interpolation between order statistics.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let quantile = |q: f64| {
            let pos = q * (sorted.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        };

        Some(Self {
            min: sorted[0],
            q1: quantile(0.25),
            median: quantile(0.5),
            q3: quantile(0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub category: String,
}

/// Feature importances as the report shows them.
#[derive(Debug, Clone, PartialEq)]
pub enum Importances<'a> {
    Available(&'a [FeatureImportance]),
    Unavailable { warning: String },
}

/// Known classes first in severity order, then anything else alphabetically.
fn category_order(label: &str) -> (usize, String) {
    let rank = ObesityCategory::from_label(label)
        .and_then(|c| ObesityCategory::ALL.iter().position(|x| *x == c))
        .unwrap_or(ObesityCategory::ALL.len());
    (rank, label.to_string())
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Service over an in-memory copy of the survey.
#[derive(Debug, Clone)]
pub struct ReportService {
    records: Vec<SurveyRecord>,
}

impl ReportService {
    #[must_use]
    pub fn new(records: Vec<SurveyRecord>) -> Self {
        Self { records }
    }

    /// Load every record from `source`.
    ///
    /// # Errors
    /// Returns `ObesitrackError::Dataset` if the source cannot be read.
    pub fn load<D>(source: &D) -> crate::Result<Self>
    where
        D: DatasetSource,
        D::Error: Into<DatasetError>,
    {
        let records = source
            .load_records()
            .map_err(|e| ObesitrackError::Dataset(e.into()))?;
        Ok(Self::new(records))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records.
    #[must_use]
    pub fn head(&self, n: usize) -> &[SurveyRecord] {
        &self.records[..n.min(self.records.len())]
    }

    #[must_use]
    pub fn overview(&self) -> Overview {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.category.as_str()).or_default() += 1;
        }
        let mut category_counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        category_counts.sort_by_key(|(c, _)| category_order(c));

        Overview {
            records: self.records.len(),
            columns: DATASET_COLUMNS,
            categories: category_counts.len(),
            category_counts,
        }
    }

    /// Record count per gender, most frequent first.
    #[must_use]
    pub fn gender_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.gender.as_str()).or_default() += 1;
        }
        let mut out: Vec<(String, usize)> =
            counts.into_iter().map(|(g, n)| (g.to_string(), n)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Category x gender counts.
    #[must_use]
    pub fn category_by_gender(&self) -> CrossTab {
        CrossTab::build(
            self.records
                .iter()
                .map(|r| (r.category.as_str(), r.gender.as_str())),
            category_order,
        )
    }

    /// Category x FAVC (high-calorie food) counts, with answers lowercased.
    #[must_use]
    pub fn favc_by_category(&self) -> CrossTab {
        CrossTab::build(
            self.records
                .iter()
                .map(|r| (r.category.as_str(), r.favc.to_lowercase())),
            category_order,
        )
    }

    #[must_use]
    pub fn correlation_matrix(&self, columns: &[NumericColumn]) -> CorrelationMatrix {
        let series: Vec<Vec<f64>> = columns
            .iter()
            .map(|c| self.records.iter().map(|r| r.numeric(*c)).collect())
            .collect();

        let values = series
            .iter()
            .map(|a| series.iter().map(|b| pearson(a, b)).collect())
            .collect();

        CorrelationMatrix {
            columns: columns.to_vec(),
            values,
        }
    }

    /// Five-number summary of `column` for each category.
    #[must_use]
    pub fn box_summary(&self, column: NumericColumn) -> Vec<(String, FiveNumber)> {
        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for r in &self.records {
            groups
                .entry(r.category.as_str())
                .or_default()
                .push(r.numeric(column));
        }

        let mut out: Vec<(String, FiveNumber)> = groups
            .into_iter()
            .filter_map(|(c, values)| FiveNumber::from_values(&values).map(|s| (c.to_string(), s)))
            .collect();
        out.sort_by_key(|(c, _)| category_order(c));
        out
    }

    #[must_use]
    pub fn scatter(&self, x: NumericColumn, y: NumericColumn) -> Vec<ScatterPoint> {
        self.records
            .iter()
            .map(|r| ScatterPoint {
                x: r.numeric(x),
                y: r.numeric(y),
                category: r.category.clone(),
            })
            .collect()
    }
}

/// Importances from the loaded artifacts, or the warning the report shows.
#[must_use]
pub fn importances(artifacts: Option<&ModelArtifacts>) -> Importances<'_> {
    match artifacts {
        None => Importances::Unavailable {
            warning: "Model not loaded; feature importances unavailable".into(),
        },
        Some(a) => match a.importances() {
            Some(rows) if !rows.is_empty() => Importances::Available(rows),
            _ => Importances::Unavailable {
                warning: "feature_importances.csv not found or unreadable".into(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dataset::fixtures::SURVEY_CSV;
    use crate::adapters::dataset::CsvDataset;
    use crate::domain::FeatureLayout;
    use crate::ports::{ClassOutput, Classifier, ModelOutput, PredictionError};

    fn service() -> ReportService {
        ReportService::new(CsvDataset::read_from(SURVEY_CSV.as_bytes()).expect("parse"))
    }

    #[test]
    fn test_overview() {
        let overview = service().overview();
        assert_eq!(overview.records, 12);
        assert_eq!(overview.columns, 17);
        assert_eq!(overview.categories, 5);
        assert_eq!(overview.category_counts[0], ("Normal_Weight".to_string(), 8));
        assert_eq!(
            overview.category_counts.last(),
            Some(&("Obesity_Type_III".to_string(), 1))
        );
    }

    #[test]
    fn test_head() {
        let s = service();
        assert_eq!(s.head(5).len(), 5);
        assert_eq!(s.head(100).len(), 12);
    }

    #[test]
    fn test_gender_distribution() {
        let dist = service().gender_distribution();
        assert_eq!(dist, vec![("Male".into(), 8), ("Female".into(), 4)]);
    }

    #[test]
    fn test_cross_tabs() {
        let s = service();
        let by_gender = s.category_by_gender();
        assert_eq!(by_gender.columns, vec!["Female", "Male"]);
        assert_eq!(by_gender.get("Normal_Weight", "Female"), 3);
        assert_eq!(by_gender.get("Normal_Weight", "Male"), 5);
        assert_eq!(by_gender.get("Obesity_Type_II", "Female"), 0);

        let favc = s.favc_by_category();
        assert_eq!(favc.get("Normal_Weight", "yes"), 4);
        assert_eq!(favc.get("Obesity_Type_III", "yes"), 1);
        let total: usize = favc.counts.iter().flatten().sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn test_favc_answers_grouped_case_insensitively() {
        let mut s = service();
        s.records[0].favc = "Yes".into();
        s.records[1].favc = "NO".into();

        let favc = s.favc_by_category();
        assert_eq!(favc.columns, vec!["no", "yes"]);
        assert_eq!(favc.get("Normal_Weight", "yes"), 5);
        let total: usize = favc.counts.iter().flatten().sum();
        assert_eq!(total, 12);
    }

    #[test]
    fn test_correlation_matrix() {
        let matrix = service().correlation_matrix(&NumericColumn::ALL);
        assert_eq!(matrix.values.len(), 8);
        for (i, row) in matrix.values.iter().enumerate() {
            let diag = row[i].expect("non-constant column");
            assert!((diag - 1.0).abs() < 1e-9);
            for (j, v) in row.iter().enumerate() {
                assert_eq!(*v, matrix.values[j][i]);
            }
        }
    }

    #[test]
    fn test_pearson_degenerate() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        let r = pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).expect("r");
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_five_number_summary() {
        let s = FiveNumber::from_values(&[4.0, 1.0, 3.0, 2.0]).expect("summary");
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!(s.max, 4.0);
        assert!(FiveNumber::from_values(&[]).is_none());
    }

    #[test]
    fn test_box_summary_per_category() {
        let faf = service().box_summary(NumericColumn::Faf);
        assert_eq!(faf.len(), 5);
        assert_eq!(faf[0].0, "Normal_Weight");
        assert_eq!(faf[0].1.max, 3.0);
        assert_eq!(faf[0].1.min, 0.0);
    }

    #[test]
    fn test_scatter() {
        let points = service().scatter(NumericColumn::Height, NumericColumn::Weight);
        assert_eq!(points.len(), 12);
        assert_eq!(points[0].x, 1.62);
        assert_eq!(points[0].y, 64.0);
        assert_eq!(points[0].category, "Normal_Weight");
    }

    #[test]
    fn test_load_missing_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = CsvDataset::new(dir.path().join("Obesity.csv"));
        assert!(matches!(
            ReportService::load(&source),
            Err(ObesitrackError::Dataset(DatasetError::NotFound(_)))
        ));
    }

    struct Constant;

    impl Classifier for Constant {
        fn n_features(&self) -> usize {
            4
        }

        fn predict(&self, _features: &[f64]) -> Result<ModelOutput, PredictionError> {
            Ok(ModelOutput {
                class: ClassOutput::Label("Normal_Weight".into()),
                probability: None,
            })
        }
    }

    #[test]
    fn test_importances_optional() {
        assert!(matches!(importances(None), Importances::Unavailable { .. }));

        let bare = ModelArtifacts::new(FeatureLayout::CompactV1, Box::new(Constant), None, None);
        assert!(matches!(
            importances(Some(&bare)),
            Importances::Unavailable { .. }
        ));

        let rows = vec![FeatureImportance {
            feature: "BMI".into(),
            importance: 0.7,
        }];
        let with = bare.with_importances(rows.clone());
        assert_eq!(importances(Some(&with)), Importances::Available(&rows));
    }
}
