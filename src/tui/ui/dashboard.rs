//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{ModelArtifacts, ReportService};
use crate::domain::{Prediction, Severity};
use crate::tui::styles::TriageTheme;

/// Predictions made in this session, aggregated by severity.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub total: usize,
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
    pub last_label: Option<String>,
}

impl SessionSummary {
    pub fn record(&mut self, prediction: &Prediction) {
        self.total += 1;
        match prediction.severity() {
            Severity::Low => self.low += 1,
            Severity::Moderate => self.moderate += 1,
            Severity::High => self.high += 1,
        }
        self.last_label = Some(prediction.label.clone());
    }
}

/// Render the main dashboard view.
pub fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    model: Result<&ModelArtifacts, &str>,
    dataset: Result<&ReportService, &str>,
    session: &SessionSummary,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Status panels
            Constraint::Percentage(55), // Session
        ])
        .split(chunks[1]);

    render_status_panels(f, columns[0], model, dataset);
    render_session_summary(f, columns[1], session);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Obesitrack", TriageTheme::title()),
        Span::styled(" │ ", TriageTheme::text_muted()),
        Span::styled(
            "Obesity level estimation from eating habits and physical condition",
            TriageTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_status_panels(
    f: &mut Frame,
    area: Rect,
    model: Result<&ModelArtifacts, &str>,
    dataset: Result<&ReportService, &str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Model
            Constraint::Length(4), // Dataset
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let mut model_lines = vec![format_status_item("Model", model.is_ok())];
    match model {
        Ok(artifacts) => {
            model_lines.push(detail("Layout", artifacts.layout().id().to_string()));
            model_lines.push(detail(
                "Manifest",
                artifacts.fingerprint().unwrap_or("unverified").to_string(),
            ));
            model_lines.push(detail(
                "Scaler",
                if artifacts.has_scaler() { "yes" } else { "no" }.to_string(),
            ));
            model_lines.push(detail(
                "Labels",
                artifacts
                    .labels()
                    .map_or_else(|| "from model".to_string(), |l| format!("{} classes", l.len())),
            ));
        }
        Err(reason) => model_lines.push(Line::from(Span::styled(
            format!("  {reason}"),
            TriageTheme::danger(),
        ))),
    }

    let model_panel = Paragraph::new(model_lines)
        .wrap(Wrap { trim: true })
        .block(panel(" Model "));
    f.render_widget(model_panel, chunks[0]);

    let mut dataset_lines = vec![format_status_item("Dataset", dataset.is_ok())];
    match dataset {
        Ok(report) => dataset_lines.push(detail("Records", report.len().to_string())),
        Err(reason) => dataset_lines.push(Line::from(Span::styled(
            format!("  {reason}"),
            TriageTheme::warning(),
        ))),
    }
    let dataset_panel = Paragraph::new(dataset_lines)
        .wrap(Wrap { trim: true })
        .block(panel(" Dataset "));
    f.render_widget(dataset_panel, chunks[1]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", TriageTheme::key_hint()),
            Span::styled("New Prediction", TriageTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[R] ", TriageTheme::key_hint()),
            Span::styled("Dataset Report", TriageTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", TriageTheme::key_hint()),
            Span::styled("Quit", TriageTheme::key_desc()),
        ]),
    ];

    let actions_list = Paragraph::new(actions).block(panel(" Quick Actions "));
    f.render_widget(actions_list, chunks[2]);
}

fn panel(title: &'static str) -> Block<'static> {
    Block::default()
        .title(Span::styled(title, TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border())
}

fn detail(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), TriageTheme::text_secondary()),
        Span::styled(value, TriageTheme::text()),
    ])
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", TriageTheme::success())
    } else {
        ("FAIL", TriageTheme::danger())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), TriageTheme::text()),
    ])
}

fn render_session_summary(f: &mut Frame, area: Rect, session: &SessionSummary) {
    let block = panel(" This Session ");

    if session.total == 0 {
        let empty_msg = Paragraph::new(Line::from(vec![Span::styled(
            "No predictions yet. Press [N] to start.",
            TriageTheme::text_muted(),
        )]))
        .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Predictions: ", TriageTheme::text_secondary()),
            Span::styled(session.total.to_string(), TriageTheme::text()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Low: ", TriageTheme::text_secondary()),
            Span::styled(session.low.to_string(), TriageTheme::severity(Severity::Low)),
            Span::styled("  Moderate: ", TriageTheme::text_secondary()),
            Span::styled(
                session.moderate.to_string(),
                TriageTheme::severity(Severity::Moderate),
            ),
            Span::styled("  High: ", TriageTheme::text_secondary()),
            Span::styled(session.high.to_string(), TriageTheme::severity(Severity::High)),
        ]),
    ];
    if let Some(label) = &session.last_label {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Last: ", TriageTheme::text_secondary()),
            Span::styled(
                label.clone(),
                ratatui::style::Style::default().fg(TriageTheme::category_color(label)),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Answers are discarded after each prediction.",
        TriageTheme::text_muted(),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DerivedFeatures, FeatureLayout};

    fn prediction(label: &str, bmi: f64) -> Prediction {
        let derived = DerivedFeatures {
            bmi,
            behavioral_risk: 0,
            sedentary_risk: 0,
            social_risk: 0,
            water_per_kg: 0.03,
            active_vs_sedentary: 0.0,
        };
        Prediction::new(label, None, None, derived, FeatureLayout::CompactV1)
    }

    #[test]
    fn test_session_summary_counts() {
        let mut session = SessionSummary::default();
        session.record(&prediction("Normal_Weight", 22.0));
        session.record(&prediction("Obesity_Type_II", 37.0));
        session.record(&prediction("custom", 27.0));

        assert_eq!(session.total, 3);
        assert_eq!(session.low, 1);
        assert_eq!(session.moderate, 1);
        assert_eq!(session.high, 1);
        assert_eq!(session.last_label.as_deref(), Some("custom"));
    }
}
