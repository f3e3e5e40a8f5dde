//! UI module: View components for the TUI.

pub mod dashboard;
pub mod patient;
pub mod report;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::TriageTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "DISCLAIMER: Estimates come from a statistical model trained on survey data and do not replace clinical assessment.",
            TriageTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Part of the training data is synthetic.",
            TriageTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(TriageTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
