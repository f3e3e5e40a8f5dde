//! Patient questionnaire form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::patient::{
    AGE_RANGE, CH2O_RANGE, FAF_RANGE, FCVC_RANGE, HEIGHT_RANGE, NCP_RANGE, TUE_RANGE,
    WEIGHT_RANGE,
};
use crate::domain::{Frequency, Gender, PatientAnswers, RawAnswers, TransportMode, YesNo};
use crate::tui::styles::TriageTheme;

/// Input widget behind a form field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free numeric text
    Numeric { value: String },
    /// One of a fixed set of answers, cycled with the arrow keys
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: String,
    pub kind: FieldKind,
}

impl FormField {
    fn numeric(label: &'static str, hint: String) -> Self {
        Self {
            label,
            hint,
            kind: FieldKind::Numeric {
                value: String::new(),
            },
        }
    }

    fn choice(label: &'static str, hint: &str, options: Vec<&'static str>) -> Self {
        Self {
            label,
            hint: hint.to_string(),
            kind: FieldKind::Choice {
                options,
                selected: 0,
            },
        }
    }

    /// Current text: typed value or the selected option.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.kind {
            FieldKind::Numeric { value } => value.as_str(),
            FieldKind::Choice { options, selected } => options.get(*selected).copied().unwrap_or(""),
        }
    }

    fn set_text(&mut self, text: &str) {
        match &mut self.kind {
            FieldKind::Numeric { value } => *value = text.to_string(),
            FieldKind::Choice { options, selected } => {
                if let Some(i) = options.iter().position(|o| *o == text) {
                    *selected = i;
                }
            }
        }
    }
}

// Field order, also the order `to_raw_answers` reads them in.
const GENDER: usize = 0;
const AGE: usize = 1;
const HEIGHT: usize = 2;
const WEIGHT: usize = 3;
const FAMILY: usize = 4;
const FAVC: usize = 5;
const FCVC: usize = 6;
const NCP: usize = 7;
const CAEC: usize = 8;
const SMOKE: usize = 9;
const CH2O: usize = 10;
const SCC: usize = 11;
const FAF: usize = 12;
const TUE: usize = 13;
const CALC: usize = 14;
const MTRANS: usize = 15;

fn range_hint(unit: &str, (min, max): (f64, f64)) -> String {
    format!("{unit} ({min}-{max})")
}

/// Form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        let yes_no: Vec<&'static str> = YesNo::ALL.iter().map(|v| v.as_str()).collect();
        let frequency: Vec<&'static str> = Frequency::ALL.iter().map(|v| v.as_str()).collect();

        let fields = vec![
            FormField::choice(
                "Gender",
                "",
                Gender::ALL.iter().map(|g| g.as_str()).collect(),
            ),
            FormField::numeric("Age", format!("years ({}-{})", AGE_RANGE.0, AGE_RANGE.1)),
            FormField::numeric("Height", range_hint("m", HEIGHT_RANGE)),
            FormField::numeric("Weight", range_hint("kg", WEIGHT_RANGE)),
            FormField::choice("Family history", "overweight relatives", yes_no.clone()),
            FormField::choice("FAVC", "high-calorie food often", yes_no.clone()),
            FormField::numeric("FCVC", range_hint("vegetables", FCVC_RANGE)),
            FormField::numeric("NCP", range_hint("main meals/day", NCP_RANGE)),
            FormField::choice("CAEC", "snacking between meals", frequency.clone()),
            FormField::choice("SMOKE", "smokes", yes_no.clone()),
            FormField::numeric("CH2O", range_hint("litres water/day", CH2O_RANGE)),
            FormField::choice("SCC", "monitors calories", yes_no),
            FormField::numeric("FAF", range_hint("activity frequency", FAF_RANGE)),
            FormField::numeric("TUE", range_hint("hours on devices", TUE_RANGE)),
            FormField::choice("CALC", "alcohol", frequency),
            FormField::choice(
                "MTRANS",
                "usual transport",
                TransportMode::ALL.iter().map(|t| t.as_str()).collect(),
            ),
        ];

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Type into the current field; ignored on choice fields.
    pub fn input_char(&mut self, c: char) {
        if let FieldKind::Numeric { value } = &mut self.fields[self.selected_field].kind {
            if c.is_ascii_digit() || c == '.' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldKind::Numeric { value } = &mut self.fields[self.selected_field].kind {
            value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let FieldKind::Numeric { value } = &mut self.fields[self.selected_field].kind {
            value.zeroize();
        }
    }

    /// Step the current choice field forward or back, wrapping.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldKind::Choice { options, selected } = &mut self.fields[self.selected_field].kind {
            let n = options.len();
            *selected = if forward {
                (*selected + 1) % n
            } else {
                (*selected + n - 1) % n
            };
            self.error_message = None;
        }
    }

    /// Wipe typed values and reset every choice.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            match &mut field.kind {
                FieldKind::Numeric { value } => value.zeroize(),
                FieldKind::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    fn number(&self, idx: usize) -> Result<f64, String> {
        let field = &self.fields[idx];
        field
            .text()
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{}: Invalid number", field.label))
    }

    /// Collect the answers; numbers are parsed here, ranges are checked by
    /// the prediction service.
    pub fn to_raw_answers(&self) -> Result<RawAnswers, String> {
        let age_field = &self.fields[AGE];
        let age = age_field
            .text()
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("{}: Whole years expected", age_field.label))?;

        let text = |idx: usize| self.fields[idx].text().to_string();

        Ok(RawAnswers {
            gender: text(GENDER),
            age,
            height_m: self.number(HEIGHT)?,
            weight_kg: self.number(WEIGHT)?,
            favc: text(FAVC),
            fcvc: self.number(FCVC)?,
            ncp: self.number(NCP)?,
            caec: text(CAEC),
            smoke: text(SMOKE),
            scc: text(SCC),
            calc: text(CALC),
            ch2o: self.number(CH2O)?,
            faf: self.number(FAF)?,
            tue: self.number(TUE)?,
            family_history: text(FAMILY),
            mtrans: text(MTRANS),
        })
    }

    /// Fill every field from a typical respondent.
    pub fn load_sample_data(&mut self) {
        let sample = RawAnswers::from(&PatientAnswers::sample());
        let values: [(usize, String); 16] = [
            (GENDER, sample.gender),
            (AGE, sample.age.to_string()),
            (HEIGHT, sample.height_m.to_string()),
            (WEIGHT, sample.weight_kg.to_string()),
            (FAMILY, sample.family_history),
            (FAVC, sample.favc),
            (FCVC, sample.fcvc.to_string()),
            (NCP, sample.ncp.to_string()),
            (CAEC, sample.caec),
            (SMOKE, sample.smoke),
            (CH2O, sample.ch2o.to_string()),
            (SCC, sample.scc),
            (FAF, sample.faf.to_string()),
            (TUE, sample.tue.to_string()),
            (CALC, sample.calc),
            (MTRANS, sample.mtrans),
        ];
        for (idx, value) in values {
            self.fields[idx].set_text(&value);
        }
        self.error_message = None;
    }
}

pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Lifestyle Questionnaire", TriageTheme::title()),
        Span::styled(" │ Eating habits and physical condition", TriageTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = state.fields.len().div_ceil(2);
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.selected_field);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (TriageTheme::border_focused(), TriageTheme::focused())
        } else {
            (TriageTheme::border(), TriageTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut spans = vec![Span::raw(" ")];
        match &field.kind {
            FieldKind::Numeric { value } => {
                if value.is_empty() {
                    spans.push(Span::styled(field.hint.as_str(), TriageTheme::text_muted()));
                } else {
                    spans.push(Span::styled(value.as_str(), TriageTheme::text()));
                }
                if is_selected {
                    spans.push(Span::styled("▌", TriageTheme::cursor()));
                }
            }
            FieldKind::Choice { .. } => {
                let arrows = if is_selected { "◀ " } else { "  " };
                spans.push(Span::styled(arrows, TriageTheme::cursor()));
                spans.push(Span::styled(field.text(), TriageTheme::text()));
                if is_selected {
                    spans.push(Span::styled(" ▶", TriageTheme::cursor()));
                }
                if !field.hint.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", field.hint),
                        TriageTheme::text_muted(),
                    ));
                }
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", TriageTheme::danger()),
            Span::styled(err.clone(), TriageTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", TriageTheme::key_hint()),
            Span::styled("Navigate ", TriageTheme::key_desc()),
            Span::styled("[←→] ", TriageTheme::key_hint()),
            Span::styled("Choose ", TriageTheme::key_desc()),
            Span::styled("[Enter] ", TriageTheme::key_hint()),
            Span::styled("Predict ", TriageTheme::key_desc()),
            Span::styled("[S] ", TriageTheme::key_hint()),
            Span::styled("Sample ", TriageTheme::key_desc()),
            Span::styled("[Esc] ", TriageTheme::key_hint()),
            Span::styled("Cancel", TriageTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(footer, area);
}
