//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration (model artifacts and survey report)

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::dataset::CsvDataset;
use crate::application::report::importances;
use crate::application::{ModelArtifacts, PredictionService, ReportService};
use crate::config::AppConfig;
use crate::ObesitrackError;

use super::ui::{
    dashboard::{render_dashboard, SessionSummary},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
    report::{render_report, ReportState, ReportTab},
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Result,
    Report,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    /// Prediction service, or why the model could not be loaded
    predictions: std::result::Result<PredictionService, String>,

    /// Survey report, or why the dataset could not be read
    report: std::result::Result<ReportService, String>,

    patient_form_state: PatientFormState,
    result_state: Option<ResultState>,
    report_state: ReportState,
    session: SessionSummary,
}

impl App {
    /// Load the model bundle and dataset named by `config`.
    ///
    /// Neither is required to start: a missing model disables prediction and
    /// a missing dataset disables the report, each with the reason shown on
    /// the dashboard.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let predictions = ModelArtifacts::load(&config.model_path, config.expected_layout)
            .map(|artifacts| PredictionService::new(Arc::new(artifacts)))
            .map_err(|e| {
                tracing::error!("Model unavailable: {e}");
                e.to_string()
            });

        let report = ReportService::load(&CsvDataset::new(&config.dataset_path)).map_err(|e| {
            tracing::warn!("Dataset unavailable: {e}");
            e.to_string()
        });

        Self::with_services(predictions, report)
    }

    /// Create application with already-built services.
    #[must_use]
    pub fn with_services(
        predictions: std::result::Result<PredictionService, String>,
        report: std::result::Result<ReportService, String>,
    ) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            predictions,
            report,
            patient_form_state: PatientFormState::default(),
            result_state: None,
            report_state: ReportState::default(),
            session: SessionSummary::default(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];

        match self.screen {
            Screen::Dashboard => render_dashboard(
                f,
                content_area,
                self.predictions
                    .as_ref()
                    .map(PredictionService::artifacts)
                    .map_err(String::as_str),
                self.report.as_ref().map_err(String::as_str),
                &self.session,
            ),
            Screen::PatientForm => render_patient_form(f, content_area, &self.patient_form_state),
            Screen::Result => {
                if let Some(state) = &self.result_state {
                    render_result(f, content_area, state);
                }
            }
            Screen::Report => {
                let artifacts = self.predictions.as_ref().ok().map(PredictionService::artifacts);
                render_report(
                    f,
                    content_area,
                    &self.report_state,
                    self.report.as_ref().map_err(String::as_str),
                    &importances(artifacts),
                );
            }
        }

        render_disclaimer(f, chunks[1]);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::Report => self.handle_report_key(key),
        }
    }

    fn open_form(&mut self) {
        self.patient_form_state = PatientFormState::default();
        self.screen = Screen::PatientForm;
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => self.open_form(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.report_state = ReportState::default();
                self.screen = Screen::Report;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.patient_form_state.clear_sensitive();
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up | KeyCode::BackTab => self.patient_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.patient_form_state.next_field(),
            KeyCode::Left => self.patient_form_state.cycle_choice(false),
            KeyCode::Right => self.patient_form_state.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.patient_form_state.load_sample_data(),
            KeyCode::Char(c) => self.patient_form_state.input_char(c),
            KeyCode::Backspace => self.patient_form_state.delete_char(),
            KeyCode::Delete => self.patient_form_state.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match &self.result_state {
            Some(ResultState::Complete { .. }) => match key {
                KeyCode::Enter | KeyCode::Esc => self.screen = Screen::Dashboard,
                KeyCode::Char('n') | KeyCode::Char('N') => self.open_form(),
                _ => {}
            },
            Some(ResultState::Error { .. }) => match key {
                // Answers are kept on failure so they can be corrected.
                KeyCode::Enter => self.screen = Screen::PatientForm,
                KeyCode::Esc => {
                    self.patient_form_state.clear_sensitive();
                    self.screen = Screen::Dashboard;
                }
                _ => {}
            },
            None => self.screen = Screen::Dashboard,
        }
    }

    fn handle_report_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Dashboard,
            KeyCode::Right | KeyCode::Tab => self.report_state.next_tab(),
            KeyCode::Left | KeyCode::BackTab => self.report_state.prev_tab(),
            KeyCode::Up | KeyCode::Down
                if matches!(
                    self.report_state.tab,
                    ReportTab::Distribution | ReportTab::Scatter
                ) =>
            {
                self.report_state.cycle_column(key == KeyCode::Down);
            }
            KeyCode::Char('x') | KeyCode::Char('X') if self.report_state.tab == ReportTab::Scatter => {
                self.report_state.cycle_scatter_x();
            }
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        let service = match &self.predictions {
            Ok(service) => service,
            Err(reason) => {
                self.patient_form_state.error_message = Some(format!("Model unavailable: {reason}"));
                return;
            }
        };

        let raw = match self.patient_form_state.to_raw_answers() {
            Ok(raw) => raw,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        match service.predict_raw(&raw) {
            Ok(prediction) => {
                self.session.record(&prediction);
                self.result_state = Some(ResultState::Complete { prediction });
                self.screen = Screen::Result;
                // Drop the answers as soon as they are no longer needed.
                self.patient_form_state.clear_sensitive();
            }
            Err(e @ (ObesitrackError::Validation(_) | ObesitrackError::Encoding(_))) => {
                self.patient_form_state.error_message = Some(e.to_string());
            }
            Err(e) => {
                self.result_state = Some(ResultState::Error {
                    message: e.to_string(),
                });
                self.screen = Screen::Result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::fixtures::compact_dir;
    use crate::adapters::dataset::fixtures::SURVEY_CSV;

    fn app_with_model() -> (tempfile::TempDir, App) {
        let dir = compact_dir();
        let artifacts = ModelArtifacts::load(dir.path(), None).expect("load");
        let report = ReportService::new(CsvDataset::read_from(SURVEY_CSV.as_bytes()).expect("csv"));
        let app = App::with_services(
            Ok(PredictionService::new(Arc::new(artifacts))),
            Ok(report),
        );
        (dir, app)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    #[test]
    fn test_sample_submission_shows_result() {
        let (_dir, mut app) = app_with_model();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::PatientForm);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Result);
        match &app.result_state {
            Some(ResultState::Complete { prediction }) => {
                assert_eq!(prediction.label, "Normal_Weight");
            }
            other => panic!("unexpected result state: {other:?}"),
        }
        assert_eq!(app.session.total, 1);
        assert!(app.patient_form_state.fields[1].text().is_empty());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_out_of_range_answer_stays_on_form() {
        let (_dir, mut app) = app_with_model();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('s'));
        // Age field: replace 25 with 5
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        let err = app.patient_form_state.error_message.clone().expect("error");
        assert!(err.contains("Age"));
        assert_eq!(app.session.total, 0);
    }

    #[test]
    fn test_missing_model_reported_on_submit() {
        let mut app = App::with_services(Err("manifest.json not found".into()), Err("no data".into()));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app
            .patient_form_state
            .error_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Model unavailable")));
    }

    #[test]
    fn test_report_navigation() {
        let (_dir, mut app) = app_with_model();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.screen, Screen::Report);

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.report_state.tab, ReportTab::Scatter);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.report_state.scatter_x, crate::ports::NumericColumn::Weight);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_ctrl_q_quits_anywhere() {
        let (_dir, mut app) = app_with_model();
        press(&mut app, KeyCode::Char('n'));
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
