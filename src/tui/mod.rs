//! Ratatui-based terminal UI.
//!
//! One screen: the entry form on top, the record tables below it, the GST
//! totals in the header, and a status line at the bottom. All updates flow
//! through [`crate::session::apply`]; this module only translates key
//! presses into actions and runs the effects the session asks for.
//!
//! API calls block. The loop draws once before each call so the busy
//! status is visible while the request runs, and input is simply not read
//! until the call returns.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs},
    Terminal,
};

use crate::cli::ApiArgs;
use crate::data::api::TaxApiClient;
use crate::domain::types::RecordDraft;
use crate::error::AppError;
use crate::report::format::fmt_amount;
use crate::session::{self, Action, Effect, SessionState};

/// Form rows, top to bottom.
const ROW_FROM_DATE: usize = 0;
const ROW_TO_DATE: usize = 1;
const ROW_FROM_VALUE: usize = 2;
const ROW_TO_VALUE: usize = 3;
const ROW_TAX_TYPE: usize = 4;
const ROW_TAX_RATE: usize = 5;
const ROW_SUBMIT: usize = 6;
const FORM_ROWS: usize = 7;

/// Start the TUI.
pub fn run(args: ApiArgs) -> Result<(), AppError> {
    let client = crate::app::client_from(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(client);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!(
                "Failed to enter alternate screen: {e}"
            )));
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
    Form,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Records,
    ByDate,
}

struct FormState {
    draft: RecordDraft,
    selected: usize,
    editing: bool,
}

impl FormState {
    fn new() -> Self {
        Self {
            draft: RecordDraft::default(),
            selected: 0,
            editing: false,
        }
    }

    fn reset(&mut self) {
        self.draft = RecordDraft::default();
        self.editing = false;
    }

    /// The editable text buffer behind the selected row, if it has one.
    fn selected_text(&mut self) -> Option<&mut String> {
        match self.selected {
            ROW_FROM_DATE => Some(&mut self.draft.from_date),
            ROW_TO_DATE => Some(&mut self.draft.to_date),
            ROW_FROM_VALUE => Some(&mut self.draft.from_value),
            ROW_TO_VALUE => Some(&mut self.draft.to_value),
            ROW_TAX_RATE => Some(&mut self.draft.tax_rate),
            _ => None,
        }
    }
}

struct App {
    client: TaxApiClient,
    session: SessionState,
    form: FormState,
    focus: Focus,
    tab: Tab,
    record_cursor: usize,
    aggregate_cursor: usize,
    /// Detail pane open for the selected date aggregate.
    expanded: bool,
    /// Record id awaiting delete confirmation.
    confirm_delete: Option<String>,
    /// API work queued by the session, executed between draws.
    pending: VecDeque<Effect>,
}

impl App {
    fn new(client: TaxApiClient) -> Self {
        let mut app = Self {
            client,
            session: SessionState::new(),
            form: FormState::new(),
            focus: Focus::Form,
            tab: Tab::Records,
            record_cursor: 0,
            aggregate_cursor: 0,
            expanded: false,
            confirm_delete: None,
            pending: VecDeque::new(),
        };
        // Fetch on startup so the tables populate without a keypress.
        app.dispatch(Action::Refresh);
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            // Queued API work runs before we wait on input. Draw first so
            // the busy label is on screen during the blocking call.
            if let Some(effect) = self.pending.pop_front() {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                self.run_effect(effect);
                needs_redraw = true;
                continue;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Feed one action through the session and queue whatever it asks for.
    fn dispatch(&mut self, action: Action) {
        let effects = session::apply(&mut self.session, action);
        self.pending.extend(effects);
        self.clamp_cursors();
    }

    fn run_effect(&mut self, effect: Effect) {
        let action = match effect {
            Effect::FetchRecords => Action::FetchFinished(self.client.list()),
            Effect::CreateRecord(record) => {
                let result = self.client.create(&record);
                if result.is_ok() {
                    self.form.reset();
                }
                Action::SubmitFinished(result)
            }
            Effect::DeleteRecord(id) => Action::DeleteFinished(self.client.delete(&id)),
        };
        self.dispatch(action);
    }

    /// Keep table cursors valid after the record list changes size.
    fn clamp_cursors(&mut self) {
        let records = self.session.records.len();
        if self.record_cursor >= records {
            self.record_cursor = records.saturating_sub(1);
        }
        let aggregates = self.session.aggregates.len();
        if self.aggregate_cursor >= aggregates {
            self.aggregate_cursor = aggregates.saturating_sub(1);
        }
        if aggregates == 0 {
            self.expanded = false;
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(id) = self.confirm_delete.clone() {
            match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete = None;
                    self.dispatch(Action::Delete(id));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_delete = None;
                }
                _ => {}
            }
            return false;
        }

        if self.form.editing {
            self.handle_field_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Form => Focus::Table,
                    Focus::Table => Focus::Form,
                };
            }
            KeyCode::Char('1') => self.tab = Tab::Records,
            KeyCode::Char('2') => self.tab = Tab::ByDate,
            KeyCode::Char('r') => self.dispatch(Action::Refresh),
            KeyCode::Esc => {
                if self.expanded {
                    self.expanded = false;
                } else {
                    self.dispatch(Action::Dismiss);
                }
            }
            _ => match self.focus {
                Focus::Form => self.handle_form_key(code),
                Focus::Table => self.handle_table_key(code),
            },
        }

        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                if self.form.selected > 0 {
                    self.form.selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.form.selected + 1 < FORM_ROWS {
                    self.form.selected += 1;
                }
            }
            KeyCode::Left => {
                if self.form.selected == ROW_TAX_TYPE {
                    self.form.draft.tax_type = self.form.draft.tax_type.prev();
                }
            }
            KeyCode::Right => {
                if self.form.selected == ROW_TAX_TYPE {
                    self.form.draft.tax_type = self.form.draft.tax_type.next();
                }
            }
            KeyCode::Enter => match self.form.selected {
                ROW_TAX_TYPE => {
                    self.form.draft.tax_type = self.form.draft.tax_type.next();
                }
                ROW_SUBMIT => {
                    self.dispatch(Action::Submit(self.form.draft.clone()));
                }
                _ => {
                    self.form.editing = true;
                }
            },
            _ => {}
        }
    }

    fn handle_table_key(&mut self, code: KeyCode) {
        match (self.tab, code) {
            (Tab::Records, KeyCode::Up) => {
                self.record_cursor = self.record_cursor.saturating_sub(1);
            }
            (Tab::Records, KeyCode::Down) => {
                if self.record_cursor + 1 < self.session.records.len() {
                    self.record_cursor += 1;
                }
            }
            (Tab::Records, KeyCode::Char('d') | KeyCode::Delete) => {
                if let Some(record) = self.session.records.get(self.record_cursor) {
                    self.confirm_delete = Some(record.id.clone());
                }
            }
            (Tab::ByDate, KeyCode::Up) => {
                self.aggregate_cursor = self.aggregate_cursor.saturating_sub(1);
            }
            (Tab::ByDate, KeyCode::Down) => {
                if self.aggregate_cursor + 1 < self.session.aggregates.len() {
                    self.aggregate_cursor += 1;
                }
            }
            (Tab::ByDate, KeyCode::Enter) => {
                if !self.session.aggregates.is_empty() {
                    self.expanded = !self.expanded;
                }
            }
            _ => {}
        }
    }

    fn handle_field_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.form.editing = false;
            }
            KeyCode::Backspace => {
                if let Some(text) = self.form.selected_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                // Dates take digits and '-', amounts digits and '.'.
                if c.is_ascii_digit() || c == '-' || c == '.' {
                    if let Some(text) = self.form.selected_text() {
                        text.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(9),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_form(frame, chunks[1]);
        self.draw_tables(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);

        if self.confirm_delete.is_some() {
            self.draw_confirm(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gst", Style::default().fg(Color::Cyan)),
            Span::raw(" - GST tax entry console"),
        ]));
        lines.push(Line::from(Span::styled(
            format!("api: {}/tax", self.client.base_url()),
            Style::default().fg(Color::Gray),
        )));

        let summary = &self.session.summary;
        let totals = if self.session.loaded {
            format!(
                "records: {} | CGST: \u{20b9}{} | SGST: \u{20b9}{} | IGST: \u{20b9}{} | total tax: \u{20b9}{}",
                summary.record_count,
                fmt_amount(summary.by_type.cgst),
                fmt_amount(summary.by_type.sgst),
                fmt_amount(summary.by_type.igst),
                fmt_amount(summary.total_tax),
            )
        } else {
            "records: -".to_string()
        };
        lines.push(Line::from(Span::styled(
            totals,
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let draft = &self.form.draft;
        let editing = self.form.editing;
        let text_row = |label: &str, value: &str, row: usize| {
            let cursor = if editing && self.form.selected == row {
                "_"
            } else {
                ""
            };
            let shown = if value.is_empty() && !(editing && self.form.selected == row) {
                String::from("(empty)")
            } else {
                format!("{value}{cursor}")
            };
            ListItem::new(format!("{label:<11} {shown}"))
        };

        let items = vec![
            text_row("From date:", &draft.from_date, ROW_FROM_DATE),
            text_row("To date:", &draft.to_date, ROW_TO_DATE),
            text_row("From value:", &draft.from_value, ROW_FROM_VALUE),
            text_row("To value:", &draft.to_value, ROW_TO_VALUE),
            ListItem::new(format!("{:<11} < {} >", "Tax type:", draft.tax_type)),
            text_row("Tax rate:", &draft.tax_rate, ROW_TAX_RATE),
            ListItem::new("[ Submit ]"),
        ];

        let highlight = if self.focus == Focus::Form {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let list = List::new(items)
            .block(Block::default().title("New Tax Calculation").borders(Borders::ALL))
            .highlight_style(highlight)
            .highlight_symbol("\u{bb} ");

        let mut state = ListState::default();
        state.select(Some(self.form.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tables(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Tax Records").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let tabs = Tabs::new(vec!["Individual Records", "Aggregated by Date"])
            .select(match self.tab {
                Tab::Records => 0,
                Tab::ByDate => 1,
            })
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        if !self.session.loaded {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, chunks[1]);
            return;
        }

        match self.tab {
            Tab::Records => self.draw_records_table(frame, chunks[1]),
            Tab::ByDate => self.draw_aggregates(frame, chunks[1]),
        }
    }

    fn draw_records_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.session.records.is_empty() {
            let msg = Paragraph::new("No tax records yet. Submit the form to add one.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, area);
            return;
        }

        let rows: Vec<Row> = self
            .session
            .records
            .iter()
            .map(|r| {
                Row::new(vec![
                    r.from_date.to_string(),
                    r.to_date.to_string(),
                    fmt_amount(r.from_value),
                    fmt_amount(r.to_value),
                    r.tax_type.to_string(),
                    fmt_amount(r.tax_rate),
                    fmt_amount(r.tax_amount),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["from", "to", "from_value", "to_value", "type", "rate", "tax"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .row_highlight_style(self.table_highlight())
            .highlight_symbol("\u{bb} ");

        let mut state = TableState::default();
        state.select(Some(self.record_cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_aggregates(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.session.aggregates.is_empty() {
            let msg = Paragraph::new("No tax records yet. Submit the form to add one.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, area);
            return;
        }

        let table_area = if self.expanded {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(area);
            self.draw_date_detail(frame, chunks[1]);
            chunks[0]
        } else {
            area
        };

        let rows: Vec<Row> = self
            .session
            .aggregates
            .iter()
            .map(|a| {
                Row::new(vec![
                    a.date.to_string(),
                    a.record_count().to_string(),
                    fmt_amount(a.by_type.cgst),
                    fmt_amount(a.by_type.sgst),
                    fmt_amount(a.by_type.igst),
                    fmt_amount(a.total_tax),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["date", "records", "CGST", "SGST", "IGST", "total_tax"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .row_highlight_style(self.table_highlight())
            .highlight_symbol("\u{bb} ");

        let mut state = TableState::default();
        state.select(Some(self.aggregate_cursor));
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    /// Per-record breakdown of the selected date aggregate.
    fn draw_date_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(aggregate) = self.session.aggregates.get(self.aggregate_cursor) else {
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        for r in &aggregate.records {
            lines.push(Line::from(format!(
                "{} {} -> {} @ {}% = {}",
                r.tax_type,
                fmt_amount(r.from_value),
                fmt_amount(r.to_value),
                fmt_amount(r.tax_rate),
                fmt_amount(r.tax_amount),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "values: {} -> {}",
                fmt_amount(aggregate.total_from_value),
                fmt_amount(aggregate.total_to_value),
            ),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "CGST {} | SGST {} | IGST {} | total {}",
                fmt_amount(aggregate.by_type.cgst),
                fmt_amount(aggregate.by_type.sgst),
                fmt_amount(aggregate.by_type.igst),
                fmt_amount(aggregate.total_tax),
            ),
            Style::default().fg(Color::Gray),
        )));

        let block = Block::default()
            .title(format!("Records on {}", aggregate.date))
            .borders(Borders::ALL);
        let p = Paragraph::new(Text::from(lines)).block(block);
        frame.render_widget(p, area);
    }

    fn table_highlight(&self) -> Style {
        if self.focus == Focus::Table {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.confirm_delete.is_some() {
            "y delete  n cancel"
        } else if self.form.editing {
            "type value  Enter apply  Esc cancel"
        } else if self.focus == Focus::Form {
            "\u{2191}/\u{2193} field  \u{2190}/\u{2192} type  Enter edit/submit  Tab tables  r refresh  q quit"
        } else {
            "\u{2191}/\u{2193} row  1/2 tab  d delete  Enter detail  Tab form  r refresh  q quit"
        };

        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            self.status_span(),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    /// One status fragment, highest priority first: in-flight request,
    /// error banner, success banner, skipped-record note, idle.
    fn status_span(&self) -> Span<'_> {
        if let Some(busy) = self.session.busy {
            return Span::styled(busy.label(), Style::default().fg(Color::Yellow));
        }
        if let Some(error) = &self.session.error {
            return Span::styled(error.as_str(), Style::default().fg(Color::Red));
        }
        if let Some(notice) = &self.session.notice {
            return Span::styled(notice.as_str(), Style::default().fg(Color::Green));
        }
        if !self.session.skipped.is_empty() {
            return Span::styled(
                format!("Skipped {} malformed record(s).", self.session.skipped.len()),
                Style::default().fg(Color::Magenta),
            );
        }
        Span::styled("Ready", Style::default().fg(Color::Gray))
    }

    fn draw_confirm(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(id) = &self.confirm_delete else {
            return;
        };
        let rect = centered_rect(52, 7, area);
        frame.render_widget(Clear, rect);

        let detail = self
            .session
            .records
            .iter()
            .find(|r| &r.id == id)
            .map(|r| {
                format!(
                    "{} on {} for \u{20b9}{}",
                    r.tax_type,
                    r.from_date,
                    fmt_amount(r.tax_amount)
                )
            })
            .unwrap_or_else(|| id.clone());

        let lines = vec![
            Line::from("Delete this tax calculation?"),
            Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(Span::styled(
                "y: delete    n: cancel",
                Style::default().fg(Color::Yellow),
            )),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Confirm").borders(Borders::ALL));
        frame.render_widget(p, rect);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_small_areas() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 5,
        };
        let rect = centered_rect(52, 7, area);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
        assert_eq!(rect.x, 0);
    }

    #[test]
    fn form_rows_expose_the_right_buffers() {
        let mut form = FormState::new();
        form.selected = ROW_FROM_VALUE;
        form.selected_text().unwrap().push('7');
        assert_eq!(form.draft.from_value, "7");

        form.selected = ROW_TAX_TYPE;
        assert!(form.selected_text().is_none());
        form.selected = ROW_SUBMIT;
        assert!(form.selected_text().is_none());
    }

    #[test]
    fn reset_restores_the_default_rate() {
        let mut form = FormState::new();
        form.draft.from_date = "2024-01-01".to_string();
        form.draft.tax_rate = "5".to_string();
        form.reset();
        assert_eq!(form.draft.from_date, "");
        assert_eq!(form.draft.tax_rate, "18");
    }
}
