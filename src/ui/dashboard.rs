use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::ClientService;
use crate::dashboard::{Dashboard, FormField};
use crate::models::{Client, ClientId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    Clients,
    Inactive,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Form => Focus::Clients,
            Focus::Clients => Focus::Inactive,
            Focus::Inactive => Focus::Form,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    Quit,
    Submit,
    Delete(ClientId),
    Refresh,
}

// Screen-only state; everything the API cares about lives in `Dashboard`
pub struct DashboardScreenState {
    focus: Focus,
    current_field: FormField,
    editing: bool,
    selected_client: Option<usize>,
    selected_inactive: Option<usize>,
    clients_table: TableState,
    inactive_table: TableState,
    status: Option<String>,
    status_is_error: bool,
}

impl Default for DashboardScreenState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreenState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Form,
            current_field: FormField::Name,
            editing: false,
            selected_client: None,
            selected_inactive: None,
            clients_table: TableState::default(),
            inactive_table: TableState::default(),
            status: None,
            status_is_error: false,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn current_field(&self) -> FormField {
        self.current_field
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn selected_client(&self) -> Option<usize> {
        self.selected_client
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn status_is_error(&self) -> bool {
        self.status_is_error
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_is_error = false;
    }

    /// Same line as the status, shown in red
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.status_is_error = true;
    }

    /// Keep selections inside the lists after they change size
    pub fn clamp_selection(&mut self, clients: usize, inactive: usize) {
        self.selected_client = clamp(self.selected_client, clients);
        self.selected_inactive = clamp(self.selected_inactive, inactive);
    }

    fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }
}

fn clamp(selected: Option<usize>, len: usize) -> Option<usize> {
    match (selected, len) {
        (_, 0) => None,
        (None, _) => Some(0),
        (Some(i), len) => Some(i.min(len - 1)),
    }
}

fn step(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    })
}

pub fn render_dashboard<B: Backend, S: ClientService>(
    frame: &mut Frame<B>,
    dashboard: &Dashboard<S>,
    state: &mut DashboardScreenState,
) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(FormField::ALL.len() as u16 + 2),
                Constraint::Min(6),
                Constraint::Length(8),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    let title = Paragraph::new("Dashboard cliente BMG")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, dashboard, state, chunks[1]);
    render_clients_table(frame, dashboard, state, chunks[2]);
    render_inactive_table(frame, dashboard, state, chunks[3]);
    render_help(frame, state, chunks[4]);
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(Span::styled(title, style))
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_form<B: Backend, S: ClientService>(
    frame: &mut Frame<B>,
    dashboard: &Dashboard<S>,
    state: &DashboardScreenState,
    area: Rect,
) {
    let form_focused = state.focus == Focus::Form;

    let items: Vec<ListItem> = FormField::ALL
        .iter()
        .map(|&field| {
            let value = dashboard.form().value(field);
            let is_current = form_focused && field == state.current_field;

            let label_style = if is_current {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let shown = match field {
                FormField::State if value.is_empty() => "Selecione UF".to_string(),
                _ if is_current && state.editing => format!("{}|", value),
                _ => value.to_string(),
            };

            let value_style = if is_current && state.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                Span::styled(shown, value_style),
            ];
            if let Some(message) = dashboard.error_for(field) {
                spans.push(Span::styled(
                    format!("  {}", message),
                    Style::default().fg(Color::Red),
                ));
            }

            ListItem::new(Spans::from(spans))
        })
        .collect();

    let form = List::new(items).block(focused_block("Novo cliente", form_focused));
    frame.render_widget(form, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    Row::new(cells).height(1).bottom_margin(1)
}

fn summary_cells(client: &Client) -> Vec<Cell<'_>> {
    vec![
        Cell::from(client.name.as_str()),
        Cell::from(client.email.as_str()),
        Cell::from(client.phone.as_str()),
    ]
}

fn detail_row(client: &Client) -> Row<'static> {
    let detail_style = Style::default().fg(Color::Gray);
    Row::new(vec![
        Cell::from(format!("CEP: {}\nNúmero: {}", client.postal_code, client.number)),
        Cell::from(format!(
            "Logradouro: {}\nBairro: {}",
            client.street, client.neighborhood
        )),
        Cell::from(format!(
            "Complemento: {}\nCidade: {}",
            client.complement, client.city
        )),
        Cell::from(""),
    ])
    .style(detail_style)
    .height(2)
}

fn render_clients_table<B: Backend, S: ClientService>(
    frame: &mut Frame<B>,
    dashboard: &Dashboard<S>,
    state: &mut DashboardScreenState,
    area: Rect,
) {
    let expanded = dashboard.expanded();
    let mut rows = Vec::new();

    for (index, client) in dashboard.clients().iter().enumerate() {
        let actions = if client.is_active() { "[+] [d]" } else { "[+]" };
        let mut cells = summary_cells(client);
        cells.push(Cell::from(actions));
        rows.push(Row::new(cells).height(1));

        if expanded == Some(index) {
            rows.push(detail_row(client));
        }
    }

    // The detail row shifts every record below it down by one table row
    let table_index = state.selected_client.map(|i| match expanded {
        Some(e) if e < i => i + 1,
        _ => i,
    });
    state.clients_table.select(if state.focus == Focus::Clients {
        table_index
    } else {
        None
    });

    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Percentage(15),
    ];
    let table = Table::new(rows)
        .header(header_row(&["Nome", "Email", "Telefone", "Ações"]))
        .block(focused_block("Todos os Clientes", state.focus == Focus::Clients))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&widths);

    frame.render_stateful_widget(table, area, &mut state.clients_table);
}

fn render_inactive_table<B: Backend, S: ClientService>(
    frame: &mut Frame<B>,
    dashboard: &Dashboard<S>,
    state: &mut DashboardScreenState,
    area: Rect,
) {
    let rows: Vec<Row> = dashboard
        .inactive_clients()
        .into_iter()
        .map(|client| Row::new(summary_cells(client)).height(1))
        .collect();

    state.inactive_table.select(if state.focus == Focus::Inactive {
        state.selected_inactive
    } else {
        None
    });

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
    ];
    let table = Table::new(rows)
        .header(header_row(&["Nome", "Email", "Telefone"]))
        .block(focused_block("Clientes Inativos", state.focus == Focus::Inactive))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .widths(&widths);

    frame.render_stateful_widget(table, area, &mut state.inactive_table);
}

fn render_help<B: Backend>(frame: &mut Frame<B>, state: &DashboardScreenState, area: Rect) {
    let help_text = match (state.focus, state.editing) {
        (Focus::Form, true) => "Enter/Esc - Done editing",
        (Focus::Form, false) if state.current_field == FormField::State => {
            "Left/Right - Choose UF | Up/Down - Navigate | S - Criar | Tab - Lists | Q - Quit"
        }
        (Focus::Form, false) => {
            "Enter - Edit field | Up/Down - Navigate | S - Criar | Tab - Lists | Q - Quit"
        }
        (Focus::Clients, _) => {
            "Up/Down - Select | Enter/+ - Details | D - Delete | R - Refresh | Tab - Next | Q - Quit"
        }
        (Focus::Inactive, _) => "Up/Down - Select | R - Refresh | Tab - Form | Q - Quit",
    };

    let mut lines = vec![Spans::from(help_text)];
    if let Some(status) = &state.status {
        let color = if state.status_is_error { Color::Red } else { Color::Green };
        lines.insert(0, Spans::from(Span::styled(status.as_str(), Style::default().fg(color))));
    }

    let help = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, area);
}

pub fn handle_input<S: ClientService>(
    dashboard: &mut Dashboard<S>,
    state: &mut DashboardScreenState,
) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            return Ok(handle_key(dashboard, state, key));
        }
    }
    Ok(None)
}

pub fn handle_key<S: ClientService>(
    dashboard: &mut Dashboard<S>,
    state: &mut DashboardScreenState,
    key: KeyEvent,
) -> Option<DashboardAction> {
    if state.editing {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
            KeyCode::Char(c) => dashboard.form_mut().push_char(state.current_field, c),
            KeyCode::Backspace => dashboard.form_mut().pop_char(state.current_field),
            _ => {}
        }
        return None;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(DashboardAction::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Quit),
        KeyCode::Tab => {
            state.focus = state.focus.next();
            let inactive = dashboard.inactive_clients().len();
            state.clamp_selection(dashboard.clients().len(), inactive);
            return None;
        }
        _ => {}
    }

    match state.focus {
        Focus::Form => handle_form_key(dashboard, state, key.code),
        Focus::Clients => handle_clients_key(dashboard, state, key.code),
        Focus::Inactive => {
            match key.code {
                KeyCode::Down => {
                    let len = dashboard.inactive_clients().len();
                    state.selected_inactive = step(state.selected_inactive, len, true);
                }
                KeyCode::Up => {
                    let len = dashboard.inactive_clients().len();
                    state.selected_inactive = step(state.selected_inactive, len, false);
                }
                KeyCode::Char('r') => return Some(DashboardAction::Refresh),
                _ => {}
            }
            None
        }
    }
}

fn handle_form_key<S: ClientService>(
    dashboard: &mut Dashboard<S>,
    state: &mut DashboardScreenState,
    code: KeyCode,
) -> Option<DashboardAction> {
    match code {
        KeyCode::Up => state.current_field = state.current_field.previous(),
        KeyCode::Down => state.current_field = state.current_field.next(),
        KeyCode::Left if state.current_field == FormField::State => {
            dashboard.form_mut().cycle_state(false)
        }
        KeyCode::Right if state.current_field == FormField::State => {
            dashboard.form_mut().cycle_state(true)
        }
        KeyCode::Enter if state.current_field != FormField::State => state.toggle_editing(),
        KeyCode::Char('s') => return Some(DashboardAction::Submit),
        _ => {}
    }
    None
}

fn handle_clients_key<S: ClientService>(
    dashboard: &mut Dashboard<S>,
    state: &mut DashboardScreenState,
    code: KeyCode,
) -> Option<DashboardAction> {
    let len = dashboard.clients().len();
    match code {
        KeyCode::Down => state.selected_client = step(state.selected_client, len, true),
        KeyCode::Up => state.selected_client = step(state.selected_client, len, false),
        KeyCode::Enter | KeyCode::Char('+') => {
            if let Some(index) = state.selected_client.filter(|i| *i < len) {
                dashboard.toggle_expanded(index);
            }
        }
        KeyCode::Char('d') => {
            // Only active records offer the delete action
            let target = state
                .selected_client
                .and_then(|i| dashboard.clients().get(i))
                .filter(|c| c.is_active())
                .map(|c| c.id.clone());
            if let Some(id) = target {
                return Some(DashboardAction::Delete(id));
            }
        }
        KeyCode::Char('r') => return Some(DashboardAction::Refresh),
        _ => {}
    }
    None
}
