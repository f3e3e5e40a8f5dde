//! Dataset report view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, Tabs,
    },
    Frame,
};

use crate::application::report::{CrossTab, Importances, ScatterPoint};
use crate::application::ReportService;
use crate::ports::NumericColumn;
use crate::tui::styles::TriageTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTab {
    Overview,
    Gender,
    CategoryByGender,
    Favc,
    Correlation,
    Distribution,
    Scatter,
    Importances,
}

impl ReportTab {
    pub const ALL: [Self; 8] = [
        Self::Overview,
        Self::Gender,
        Self::CategoryByGender,
        Self::Favc,
        Self::Correlation,
        Self::Distribution,
        Self::Scatter,
        Self::Importances,
    ];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Gender => "Gender",
            Self::CategoryByGender => "Class x Gender",
            Self::Favc => "FAVC",
            Self::Correlation => "Correlation",
            Self::Distribution => "Distribution",
            Self::Scatter => "Scatter",
            Self::Importances => "Importances",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

/// Report screen state
pub struct ReportState {
    pub tab: ReportTab,
    /// Column summarised on the distribution tab and plotted on the scatter y axis
    pub column: NumericColumn,
    /// Scatter x axis
    pub scatter_x: NumericColumn,
}

impl Default for ReportState {
    fn default() -> Self {
        Self {
            tab: ReportTab::Overview,
            column: NumericColumn::Faf,
            scatter_x: NumericColumn::Height,
        }
    }
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let n = all.len();
    let i = all.iter().position(|x| *x == current).unwrap_or(0);
    if forward {
        all[(i + 1) % n]
    } else {
        all[(i + n - 1) % n]
    }
}

impl ReportState {
    pub fn next_tab(&mut self) {
        self.tab = step(&ReportTab::ALL, self.tab, true);
    }

    pub fn prev_tab(&mut self) {
        self.tab = step(&ReportTab::ALL, self.tab, false);
    }

    pub fn cycle_column(&mut self, forward: bool) {
        self.column = step(&NumericColumn::ALL, self.column, forward);
    }

    pub fn cycle_scatter_x(&mut self) {
        self.scatter_x = step(&NumericColumn::ALL, self.scatter_x, true);
    }
}

/// Axis bounds padded by 5%, widened when every value is equal.
fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return [0.0, 1.0];
    }
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    [min - pad, max + pad]
}

/// Points grouped by category, keeping first-seen order.
fn group_points(points: &[ScatterPoint]) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut groups: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for p in points {
        match groups.iter_mut().find(|(c, _)| *c == p.category) {
            Some((_, pts)) => pts.push((p.x, p.y)),
            None => groups.push((p.category.clone(), vec![(p.x, p.y)])),
        }
    }
    groups
}

pub fn render_report(
    f: &mut Frame,
    area: Rect,
    state: &ReportState,
    report: Result<&ReportService, &str>,
    importances: &Importances<'_>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Tabs
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_report_header(f, chunks[0]);
    render_tabs(f, chunks[1], state.tab);

    let content = chunks[2];
    if state.tab == ReportTab::Importances {
        render_importances(f, content, importances);
    } else {
        match report {
            Ok(report) if !report.is_empty() => match state.tab {
                ReportTab::Overview => render_overview(f, content, report),
                ReportTab::Gender => render_gender(f, content, report),
                ReportTab::CategoryByGender => render_crosstab(
                    f,
                    content,
                    " Class by gender ",
                    &report.category_by_gender(),
                ),
                ReportTab::Favc => render_crosstab(
                    f,
                    content,
                    " High-calorie food by class ",
                    &report.favc_by_category(),
                ),
                ReportTab::Correlation => render_correlation(f, content, report),
                ReportTab::Distribution => render_distribution(f, content, report, state.column),
                ReportTab::Scatter => render_scatter(f, content, report, state),
                ReportTab::Importances => {}
            },
            Ok(_) => render_unavailable(f, content, "Dataset has no records"),
            Err(reason) => render_unavailable(f, content, reason),
        }
    }

    render_report_footer(f, chunks[3], state.tab);
}

fn render_report_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Dataset Report", TriageTheme::title()),
        Span::styled(" │ Historical survey", TriageTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_tabs(f: &mut Frame, area: Rect, tab: ReportTab) {
    let titles: Vec<Line> = ReportTab::ALL.iter().map(|t| Line::from(t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .style(TriageTheme::text_secondary())
        .highlight_style(TriageTheme::selected())
        .divider("│");
    f.render_widget(tabs, area);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(title, TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border())
}

fn render_unavailable(f: &mut Frame, area: Rect, reason: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Dataset unavailable", TriageTheme::warning())),
        Line::from(""),
        Line::from(Span::styled(reason, TriageTheme::text_secondary())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(TriageTheme::warning()),
    );

    f.render_widget(content, area);
}

fn render_overview(f: &mut Frame, area: Rect, report: &ReportService) {
    let overview = report.overview();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);

    let summary = Paragraph::new(Line::from(vec![
        Span::styled("Records ", TriageTheme::text_secondary()),
        Span::styled(overview.records.to_string(), TriageTheme::focused()),
        Span::styled("   Columns ", TriageTheme::text_secondary()),
        Span::styled(overview.columns.to_string(), TriageTheme::focused()),
        Span::styled("   Classes ", TriageTheme::text_secondary()),
        Span::styled(overview.categories.to_string(), TriageTheme::focused()),
    ]))
    .alignment(Alignment::Center)
    .block(bordered(" Summary "));
    f.render_widget(summary, chunks[0]);

    let bars: Vec<Bar> = overview
        .category_counts
        .iter()
        .map(|(label, count)| {
            Bar::default()
                .value(*count as u64)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(TriageTheme::category_color(label)))
        })
        .collect();
    let chart = BarChart::default()
        .block(bordered(" Records per class "))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .value_style(TriageTheme::text());
    f.render_widget(chart, chunks[1]);

    let header = Row::new(["Gender", "Age", "Height", "Weight", "FAVC", "MTRANS", "Class"])
        .style(TriageTheme::header());
    let rows: Vec<Row> = report
        .head(5)
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.gender.clone()),
                Cell::from(format!("{:.0}", r.age)),
                Cell::from(format!("{:.2}", r.height)),
                Cell::from(format!("{:.1}", r.weight)),
                Cell::from(r.favc.clone()),
                Cell::from(r.mtrans.clone()),
                Cell::from(r.category.clone())
                    .style(Style::default().fg(TriageTheme::category_color(&r.category))),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(22),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(bordered(" First records "));
    f.render_widget(table, chunks[2]);
}

fn render_gender(f: &mut Frame, area: Rect, report: &ReportService) {
    let distribution = report.gender_distribution();
    let bars: Vec<Bar> = distribution
        .iter()
        .map(|(gender, count)| {
            Bar::default()
                .value(*count as u64)
                .label(Line::from(gender.clone()))
                .style(TriageTheme::info())
        })
        .collect();

    let chart = BarChart::default()
        .block(bordered(" Records per gender "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(4)
        .value_style(TriageTheme::selected());
    f.render_widget(chart, area);
}

fn render_crosstab(f: &mut Frame, area: Rect, title: &str, tab: &CrossTab) {
    let header = Row::new(
        std::iter::once(Cell::from("Class"))
            .chain(tab.columns.iter().map(|c| Cell::from(c.clone())))
            .collect::<Vec<_>>(),
    )
    .style(TriageTheme::header());

    let rows: Vec<Row> = tab
        .rows
        .iter()
        .zip(&tab.counts)
        .map(|(label, counts)| {
            let label_cell = Cell::from(label.clone())
                .style(Style::default().fg(TriageTheme::category_color(label)));
            Row::new(
                std::iter::once(label_cell)
                    .chain(counts.iter().map(|n| Cell::from(n.to_string())))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(22))
        .chain(tab.columns.iter().map(|_| Constraint::Length(10)))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(title));
    f.render_widget(table, area);
}

fn correlation_style(value: Option<f64>) -> Style {
    match value {
        None => TriageTheme::text_muted(),
        Some(v) if v.abs() >= 0.7 => TriageTheme::danger().add_modifier(Modifier::BOLD),
        Some(v) if v.abs() >= 0.4 => TriageTheme::warning(),
        Some(_) => TriageTheme::text(),
    }
}

fn render_correlation(f: &mut Frame, area: Rect, report: &ReportService) {
    let matrix = report.correlation_matrix(&NumericColumn::ALL);

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(matrix.columns.iter().map(|c| Cell::from(c.name())))
            .collect::<Vec<_>>(),
    )
    .style(TriageTheme::header());

    let rows: Vec<Row> = matrix
        .columns
        .iter()
        .zip(&matrix.values)
        .map(|(column, values)| {
            Row::new(
                std::iter::once(Cell::from(column.name()).style(TriageTheme::text_secondary()))
                    .chain(values.iter().map(|v| {
                        let text = v.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}"));
                        Cell::from(text).style(correlation_style(*v))
                    }))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(8))
        .chain(matrix.columns.iter().map(|_| Constraint::Length(8)))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(" Pearson correlation "));
    f.render_widget(table, area);
}

fn render_distribution(f: &mut Frame, area: Rect, report: &ReportService, column: NumericColumn) {
    let summary = report.box_summary(column);

    let header = Row::new(["Class", "Min", "Q1", "Median", "Q3", "Max"]).style(TriageTheme::header());
    let rows: Vec<Row> = summary
        .iter()
        .map(|(label, s)| {
            Row::new(vec![
                Cell::from(label.clone())
                    .style(Style::default().fg(TriageTheme::category_color(label))),
                Cell::from(format!("{:.2}", s.min)),
                Cell::from(format!("{:.2}", s.q1)),
                Cell::from(format!("{:.2}", s.median)).style(TriageTheme::focused()),
                Cell::from(format!("{:.2}", s.q3)),
                Cell::from(format!("{:.2}", s.max)),
            ])
        })
        .collect();

    let title = format!(" {} by class ", column.name());
    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(bordered(&title));
    f.render_widget(table, area);
}

fn render_scatter(f: &mut Frame, area: Rect, report: &ReportService, state: &ReportState) {
    let points = report.scatter(state.scatter_x, state.column);
    let groups = group_points(&points);
    let x_bounds = axis_bounds(points.iter().map(|p| p.x));
    let y_bounds = axis_bounds(points.iter().map(|p| p.y));

    let datasets: Vec<Dataset> = groups
        .iter()
        .map(|(label, pts)| {
            Dataset::default()
                .name(label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(TriageTheme::category_color(label)))
                .data(pts)
        })
        .collect();

    let axis_labels = |[lo, hi]: [f64; 2]| {
        vec![
            format!("{lo:.1}"),
            format!("{:.1}", (lo + hi) / 2.0),
            format!("{hi:.1}"),
        ]
    };

    let title = format!(" {} vs {} ", state.column.name(), state.scatter_x.name());
    let chart = Chart::new(datasets)
        .block(bordered(&title))
        .x_axis(
            Axis::default()
                .title(state.scatter_x.name())
                .style(TriageTheme::text_muted())
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(state.column.name())
                .style(TriageTheme::text_muted())
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );
    f.render_widget(chart, area);
}

fn render_importances(f: &mut Frame, area: Rect, importances: &Importances<'_>) {
    match importances {
        Importances::Unavailable { warning } => {
            let content = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("! Feature importances unavailable", TriageTheme::warning())),
                Line::from(""),
                Line::from(Span::styled(warning.as_str(), TriageTheme::text_secondary())),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(TriageTheme::warning()),
            );
            f.render_widget(content, area);
        }
        Importances::Available(rows) => {
            let bars: Vec<Bar> = rows
                .iter()
                .map(|r| {
                    Bar::default()
                        .value((r.importance.max(0.0) * 1000.0).round() as u64)
                        .text_value(format!("{:.3}", r.importance))
                        .label(Line::from(r.feature.clone()))
                        .style(TriageTheme::info())
                })
                .collect();
            let chart = BarChart::default()
                .block(bordered(" Feature importance "))
                .direction(Direction::Horizontal)
                .data(BarGroup::default().bars(&bars))
                .bar_width(1)
                .bar_gap(0)
                .value_style(TriageTheme::text());
            f.render_widget(chart, area);
        }
    }
}

fn render_report_footer(f: &mut Frame, area: Rect, tab: ReportTab) {
    let mut spans = vec![
        Span::styled("[←→] ", TriageTheme::key_hint()),
        Span::styled("Tab ", TriageTheme::key_desc()),
    ];
    match tab {
        ReportTab::Distribution => {
            spans.push(Span::styled("[↑↓] ", TriageTheme::key_hint()));
            spans.push(Span::styled("Column ", TriageTheme::key_desc()));
        }
        ReportTab::Scatter => {
            spans.push(Span::styled("[↑↓] ", TriageTheme::key_hint()));
            spans.push(Span::styled("Y axis ", TriageTheme::key_desc()));
            spans.push(Span::styled("[X] ", TriageTheme::key_hint()));
            spans.push(Span::styled("X axis ", TriageTheme::key_desc()));
        }
        _ => {}
    }
    spans.push(Span::styled("[Esc] ", TriageTheme::key_hint()));
    spans.push(Span::styled("Back", TriageTheme::key_desc()));

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_wrap() {
        let mut state = ReportState::default();
        state.prev_tab();
        assert_eq!(state.tab, ReportTab::Importances);
        state.next_tab();
        assert_eq!(state.tab, ReportTab::Overview);
    }

    #[test]
    fn test_column_cycle() {
        let mut state = ReportState::default();
        state.cycle_column(true);
        assert_eq!(state.column, NumericColumn::Tue);
        state.cycle_column(true);
        assert_eq!(state.column, NumericColumn::Age);
        state.scatter_x = NumericColumn::Tue;
        state.cycle_scatter_x();
        assert_eq!(state.scatter_x, NumericColumn::Age);
    }

    #[test]
    fn test_axis_bounds() {
        assert_eq!(axis_bounds([10.0, 30.0].into_iter()), [9.0, 31.0]);
        assert_eq!(axis_bounds([5.0, 5.0].into_iter()), [4.0, 6.0]);
        assert_eq!(axis_bounds(std::iter::empty()), [0.0, 1.0]);
    }

    #[test]
    fn test_group_points_by_category() {
        let point = |x: f64, category: &str| ScatterPoint {
            x,
            y: x,
            category: category.to_string(),
        };
        let groups = group_points(&[
            point(1.0, "Normal_Weight"),
            point(2.0, "Obesity_Type_I"),
            point(3.0, "Normal_Weight"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Normal_Weight");
        assert_eq!(groups[0].1, vec![(1.0, 1.0), (3.0, 3.0)]);
    }
}
