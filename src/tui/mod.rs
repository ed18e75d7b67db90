//! Ratatui-based terminal UI.
//!
//! The TUI lets the user pick data files, enter a target point, run the
//! analysis and browse the ranked fits with a chart of the selected entry.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::advisor::{Advisor, ChatAdvisor};
use crate::app::pipeline::{AnalysisOutput, run_analysis};
use crate::cli::TuiArgs;
use crate::cli::picker::{discover_data_files, pretty_path, validate_data_path};
use crate::domain::{AnalysisConfig, FitResult, Target};
use crate::error::AppError;
use crate::report::{
    NO_RESULTS_SUMMARY, NO_RESULTS_TABLE, format_file_issues, format_ranked_table, format_summary,
};

mod plotters_chart;

use plotters_chart::FitPlottersChart;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Files,
    Candidates,
    TargetX,
    TargetY,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Files => Focus::Candidates,
            Focus::Candidates => Focus::TargetX,
            Focus::TargetX => Focus::TargetY,
            Focus::TargetY => Focus::Files,
        }
    }

    fn is_input(self) -> bool {
        matches!(self, Focus::TargetX | Focus::TargetY)
    }
}

struct App {
    config: AnalysisConfig,
    advisor: Option<ChatAdvisor>,
    /// Files chosen for analysis, in insertion order, without duplicates.
    files: Vec<PathBuf>,
    file_cursor: usize,
    candidates: Vec<PathBuf>,
    candidate_cursor: usize,
    target_x: String,
    target_y: String,
    focus: Focus,
    status: String,
    output: Option<AnalysisOutput>,
    /// Index into the ranked entries shown in the chart.
    charted: usize,
}

impl App {
    fn new(args: TuiArgs) -> Result<Self, AppError> {
        let advisor = if args.no_advice {
            None
        } else {
            Some(ChatAdvisor::from_env()?)
        };

        let mut app = Self {
            config: args.fit.analysis_config(),
            advisor,
            files: Vec::new(),
            file_cursor: 0,
            candidates: discover_data_files(),
            candidate_cursor: 0,
            target_x: args.target_x.unwrap_or_default(),
            target_y: args.target_y.unwrap_or_default(),
            focus: Focus::Candidates,
            status: "Tab to switch panels, Enter to add a file.".to_string(),
            output: None,
            charted: 0,
        };
        let mut rejected = Vec::new();
        for path in args.files {
            match validate_data_path(&path) {
                Ok(path) => app.add_file(path),
                Err(err) => rejected.push(err.message().to_string()),
            }
        }
        if !rejected.is_empty() {
            app.status = format!("Skipped: {}", rejected.join("; "));
        }
        if !app.files.is_empty() {
            app.focus = Focus::TargetX;
        }
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::Tab {
            self.focus = self.focus.next();
            return false;
        }
        if self.focus.is_input() {
            self.handle_input_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('a') => self.analyse(),
            KeyCode::Char('n') => self.cycle_chart(1),
            KeyCode::Char('p') => self.cycle_chart(-1),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Enter => match self.focus {
                Focus::Candidates => {
                    if let Some(path) = self.candidates.get(self.candidate_cursor).cloned() {
                        self.add_file(path);
                    }
                }
                _ => self.analyse(),
            },
            KeyCode::Delete | KeyCode::Backspace if self.focus == Focus::Files => self.remove_selected(),
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        let input = match self.focus {
            Focus::TargetX => &mut self.target_x,
            _ => &mut self.target_y,
        };
        match code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => self.analyse(),
            KeyCode::Esc => self.focus = Focus::Files,
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.focus {
            Focus::Files => (&mut self.file_cursor, self.files.len()),
            Focus::Candidates => (&mut self.candidate_cursor, self.candidates.len()),
            _ => return,
        };
        if len == 0 {
            return;
        }
        *cursor = (*cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn add_file(&mut self, path: PathBuf) {
        if self.files.contains(&path) {
            self.status = format!("Already selected: {}", pretty_path(&path));
            return;
        }
        self.status = format!("Added {}", pretty_path(&path));
        self.files.push(path);
    }

    fn remove_selected(&mut self) {
        if self.file_cursor >= self.files.len() {
            return;
        }
        let removed = self.files.remove(self.file_cursor);
        self.status = format!("Removed {}", pretty_path(&removed));
        if self.file_cursor > 0 && self.file_cursor >= self.files.len() {
            self.file_cursor -= 1;
        }
    }

    fn analyse(&mut self) {
        if self.files.is_empty() {
            self.status = "Select at least one file first.".to_string();
            return;
        }
        let target = match Target::parse(&self.target_x, &self.target_y) {
            Ok(t) => t,
            Err(err) => {
                self.status = err.message().to_string();
                return;
            }
        };

        let advisor = self.advisor.as_ref().map(|a| a as &dyn Advisor);
        let output = run_analysis(&self.files, target, &self.config, advisor);

        let n_results = output.report.as_ref().map_or(0, |r| r.entries.len());
        self.status = format!(
            "Analysed {} file(s): {} ranked group(s), {} skipped file(s).",
            output.files_read,
            n_results,
            output.issues.len()
        );
        self.output = Some(output);
        self.charted = 0;
    }

    fn ranked(&self) -> &[FitResult] {
        self.output
            .as_ref()
            .and_then(|o| o.report.as_ref())
            .map(|r| r.entries.as_slice())
            .unwrap_or(&[])
    }

    fn cycle_chart(&mut self, delta: isize) {
        let n = self.ranked().len();
        if n == 0 {
            return;
        }
        self.charted = (self.charted as isize + delta).rem_euclid(n as isize) as usize;
        self.status = format!("Charting rank {} of {n}", self.charted + 1);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("fitrank", Style::default().fg(Color::Cyan)),
            Span::raw(" | best-fit ranking against a target point"),
            Span::styled(
                format!(
                    " | files: {} | max evals: {} | advice: {}",
                    self.files.len(),
                    self.config.max_evals,
                    if self.advisor.is_some() { "on" } else { "off" }
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(cols[0]);

        self.draw_file_list(frame, left[0]);
        self.draw_candidates(frame, left[1]);
        self.draw_input(frame, left[2], "Target X", &self.target_x, Focus::TargetX);
        self.draw_input(frame, left[3], "Target Y", &self.target_y, Focus::TargetY);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(25),
                Constraint::Min(8),
            ])
            .split(cols[1]);

        self.draw_table(frame, right[0]);
        self.draw_summary(frame, right[1]);
        self.draw_chart(frame, right[2]);
    }

    fn panel(&self, title: &str, focus: Focus) -> Block<'static> {
        let style = if self.focus == focus {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(style)
    }

    fn draw_file_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = if self.files.is_empty() {
            vec![ListItem::new("(none)")]
        } else {
            self.files.iter().map(|p| ListItem::new(pretty_path(p))).collect()
        };
        let list = List::new(items)
            .block(self.panel("Selected files", Focus::Files))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if self.focus == Focus::Files && !self.files.is_empty() {
            state.select(Some(self.file_cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_candidates(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = if self.candidates.is_empty() {
            vec![ListItem::new("(no .csv/.xlsx/.xls files found)")]
        } else {
            self.candidates
                .iter()
                .map(|p| {
                    let mark = if self.files.contains(p) { "✓ " } else { "  " };
                    ListItem::new(format!("{mark}{}", pretty_path(p)))
                })
                .collect()
        };
        let list = List::new(items)
            .block(self.panel("Data files", Focus::Candidates))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if self.focus == Focus::Candidates && !self.candidates.is_empty() {
            state.select(Some(self.candidate_cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_input(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, value: &str, focus: Focus) {
        let text = if self.focus == focus {
            format!("{value}_")
        } else {
            value.to_string()
        };
        let p = Paragraph::new(text).block(self.panel(title, focus));
        frame.render_widget(p, area);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Ranking").borders(Borders::ALL);
        let text = match self.output.as_ref().map(|o| o.report.as_ref()) {
            None => Text::from(Span::styled(
                "Press `a` to analyse the selected files.",
                Style::default().fg(Color::Gray),
            )),
            Some(None) => Text::from(NO_RESULTS_TABLE),
            Some(Some(report)) => {
                let table = format_ranked_table(report);
                let lines: Vec<Line> = table
                    .lines()
                    .enumerate()
                    .map(|(i, line)| {
                        // Two header lines precede the first ranked row.
                        if i >= 2 && i - 2 == self.charted {
                            Line::styled(line.to_string(), Style::default().add_modifier(Modifier::REVERSED))
                        } else {
                            Line::raw(line.to_string())
                        }
                    })
                    .collect();
                Text::from(lines)
            }
        };

        // Keep the charted row on screen.
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = (self.charted + 3).saturating_sub(visible) as u16;
        let p = Paragraph::new(text).block(block).scroll((scroll, 0));
        frame.render_widget(p, area);
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Summary").borders(Borders::ALL);
        let body = match &self.output {
            None => String::new(),
            Some(out) => {
                let mut text = match &out.report {
                    Some(report) => format_summary(report, out.advisory.as_deref()),
                    None => format!("{NO_RESULTS_SUMMARY}\n"),
                };
                let issues = format_file_issues(&out.issues);
                if !issues.is_empty() {
                    text.push('\n');
                    text.push_str(&issues);
                }
                text
            }
        };
        let p = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let ranked = self.ranked();
        let title = match ranked.get(self.charted) {
            Some(entry) => format!(
                "Rank {}: {} group {} ({})",
                self.charted + 1,
                entry.source_name(),
                entry.group + 1,
                entry.model.display_name()
            ),
            None => "Chart".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (Some(entry), Some(report)) = (
            ranked.get(self.charted),
            self.output.as_ref().and_then(|o| o.report.as_ref()),
        ) else {
            let msg = Paragraph::new("No fit to chart yet.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(entry, report.target);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = FitPlottersChart {
            curve: &series.curve,
            points: &series.points,
            target: (report.target.x, report.target.y),
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "x",
            y_label: "y",
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.focus.is_input() {
            "type value  Enter analyse  Esc/Tab leave"
        } else {
            "Tab focus  ↑/↓ move  Enter add/analyse  Del remove  a analyse  n/p chart  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[derive(Debug, Clone)]
struct ChartSeries {
    curve: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Observations, a sampled fitted curve and bounds that include the target.
fn chart_series(entry: &FitResult, target: Target) -> ChartSeries {
    let points: Vec<(f64, f64)> = entry.points.iter().map(|p| (p.x, p.y)).collect();

    let (mut x0, mut x1) = (target.x, target.x);
    for &(x, _) in &points {
        x0 = x0.min(x);
        x1 = x1.max(x);
    }
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        x0 -= 1.0;
        x1 += 1.0;
    }

    let n = 200usize;
    let curve: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x0 + u * (x1 - x0);
            (x, entry.predict(x))
        })
        .filter(|(_, y)| y.is_finite())
        .collect();

    let (mut y0, mut y1) = (target.y, target.y);
    for &(_, y) in points.iter().chain(curve.iter()) {
        y0 = y0.min(y);
        y1 = y1.max(y);
    }
    if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
        y0 -= 1.0;
        y1 += 1.0;
    }

    let x_pad = (x1 - x0) * 0.02;
    let y_pad = ((y1 - y0) * 0.05).max(1e-12);

    ChartSeries {
        curve,
        points,
        x_bounds: [x0 - x_pad, x1 + x_pad],
        y_bounds: [y0 - y_pad, y1 + y_pad],
    }
}

fn fmt_axis(v: f64) -> String {
    if v.abs() >= 1e4 || (v != 0.0 && v.abs() < 1e-2) {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("x")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}
