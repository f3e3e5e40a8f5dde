//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::features::SCORE_MAX;
use crate::domain::{Prediction, Severity};
use crate::tui::styles::TriageTheme;

/// Outcome of the last submission
#[derive(Debug, Clone)]
pub enum ResultState {
    Complete { prediction: Prediction },
    Error { message: String },
}

/// Gauge percent for a probability, clamped to 0-100.
fn percent(probability: f64) -> u16 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u16
}

pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Complete { prediction } => render_prediction(f, chunks[1], prediction),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Prediction", TriageTheme::title()),
        Span::styled(" │ Estimated obesity level", TriageTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_prediction(f: &mut Frame, area: Rect, prediction: &Prediction) {
    let block = Block::default()
        .title(Span::styled(" Result ", TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Class
            Constraint::Length(3), // Probability
            Constraint::Length(3), // BMI
            Constraint::Length(5), // Scores
            Constraint::Min(0),    // Metadata
        ])
        .margin(1)
        .split(inner);

    let severity = prediction.severity();
    let severity_style = TriageTheme::severity(severity);
    let icon = match severity {
        Severity::Low => "OK",
        Severity::Moderate | Severity::High => "!",
    };
    let description = prediction
        .category
        .map_or("Label not among the known dataset classes", |c| c.description());

    let class_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {}", prediction.label),
            severity_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(description, TriageTheme::text_secondary())),
        Line::from(Span::styled(
            format!("Severity: {severity}"),
            TriageTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(class_display, chunks[0]);

    match prediction.probability {
        Some(p) => {
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(Span::styled(" Class probability ", TriageTheme::text_secondary()))
                        .borders(Borders::ALL)
                        .border_style(TriageTheme::border()),
                )
                .gauge_style(severity_style)
                .percent(percent(p))
                .label(format!("{:.1}%", p * 100.0));
            f.render_widget(gauge, chunks[1]);
        }
        None => {
            let missing = Paragraph::new(Span::styled(
                "Model does not report probabilities",
                TriageTheme::text_muted(),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(TriageTheme::border()));
            f.render_widget(missing, chunks[1]);
        }
    }

    let band = prediction.bmi_band();
    let bmi = Paragraph::new(Line::from(vec![
        Span::styled("BMI ", TriageTheme::text_secondary()),
        Span::styled(
            format!("{:.1}", prediction.derived.bmi),
            TriageTheme::bmi_band(band).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  │  ", TriageTheme::text_muted()),
        Span::styled(band.label(), TriageTheme::bmi_band(band)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(TriageTheme::border()));
    f.render_widget(bmi, chunks[2]);

    let derived = &prediction.derived;
    let score_line = |name: &'static str, score: u8| {
        Line::from(vec![
            Span::styled(format!("{name:<12}"), TriageTheme::text_secondary()),
            Span::styled(format!("{score}/{SCORE_MAX}"), TriageTheme::score(score)),
        ])
    };
    let scores = Paragraph::new(vec![
        score_line("Behavioral", derived.behavioral_risk),
        score_line("Sedentary", derived.sedentary_risk),
        score_line("Social", derived.social_risk),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Risk scores ", TriageTheme::text_secondary()))
            .borders(Borders::ALL)
            .border_style(TriageTheme::border()),
    );
    f.render_widget(scores, chunks[3]);

    let short_id: String = prediction.id.chars().take(8).collect();
    let meta = Paragraph::new(Line::from(vec![
        Span::styled("Layout ", TriageTheme::text_muted()),
        Span::styled(prediction.layout.id(), TriageTheme::text_secondary()),
        Span::styled("  Id ", TriageTheme::text_muted()),
        Span::styled(short_id, TriageTheme::text_secondary()),
        Span::styled("  At ", TriageTheme::text_muted()),
        Span::styled(
            prediction.created_at.format("%H:%M:%S").to_string(),
            TriageTheme::text_secondary(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(meta, chunks[4]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", TriageTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, TriageTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(TriageTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match state {
        ResultState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", TriageTheme::key_hint()),
            Span::styled("Dashboard ", TriageTheme::key_desc()),
            Span::styled("[N] ", TriageTheme::key_hint()),
            Span::styled("New Prediction", TriageTheme::key_desc()),
        ]),
        ResultState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", TriageTheme::key_hint()),
            Span::styled("Edit Answers ", TriageTheme::key_desc()),
            Span::styled("[Esc] ", TriageTheme::key_hint()),
            Span::styled("Dashboard", TriageTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(footer, area);
}
