//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Dashboard with model and dataset status
//! - Questionnaire input
//! - Prediction result
//! - Dataset report

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::TriageTheme;
