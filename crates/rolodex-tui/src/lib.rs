// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use rolodex_app::{
    ADD_USER_FIELDS, AppCommand, AppEvent, AppMode, AppState, ColumnHeader, DETAIL_HEADING,
    FieldGroup, FormFieldSpec, InputKind, LoadState, SORTABLE_FIELDS, SUCCESS_NOTICE_TTL,
    SelectionCommand, SortDirection, SubmitOutcome, TabKind, TableCommand, User, UserSnapshot,
    detail_lines, field_groups, website_link,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;

const STATUS_TTL: Duration = Duration::from_secs(4);
const HALF_PAGE_ROWS: isize = 10;
const INPUT_CURSOR: &str = "▏";

pub trait AppRuntime {
    fn load_users(&mut self) -> Result<UserSnapshot>;
    fn begin_fetch(&mut self) -> Result<()>;
    fn fetch_users(&mut self) -> Result<Vec<User>>;
    fn spawn_fetch_users(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.fetch_users().map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::UsersFetched { request_id, result })
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }
    fn apply_fetch_result(&mut self, result: Result<Vec<User>, String>) -> Result<()>;
    fn append_user(&mut self, draft: &User) -> Result<User>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    ClearFormNotice {
        token: u64,
    },
    UsersFetched {
        request_id: u64,
        result: Result<Vec<User>, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    snapshot: UserSnapshot,
    selected_row: usize,
    selected_col: usize,
    search_input: String,
    form_field: usize,
    help_visible: bool,
    status_token: u64,
    fetch_request_id: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    refresh_snapshot(state, runtime, &mut view_data, &internal_tx);
    if view_data.snapshot.state == LoadState::Pending {
        start_fetch(state, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ClearFormNotice { token } => {
                state.form.expire_notice(token);
            }
            InternalEvent::UsersFetched { request_id, result } => {
                if request_id != view_data.fetch_request_id {
                    log::debug!("dropping stale fetch result {request_id}");
                    continue;
                }
                handle_fetch_result(state, runtime, view_data, tx, result);
            }
        }
    }
}

fn handle_fetch_result<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    result: Result<Vec<User>, String>,
) {
    if let Err(error) = runtime.apply_fetch_result(result) {
        emit_status(state, view_data, tx, format!("fetch not applied: {error:#}"));
        return;
    }
    refresh_snapshot(state, runtime, view_data, tx);
    let message = match &view_data.snapshot.state {
        LoadState::Ready { .. } => format!("loaded {} users", view_data.snapshot.users.len()),
        LoadState::Failed(_) => "fetch failed; press r to retry".to_owned(),
        LoadState::Pending => return,
    };
    emit_status(state, view_data, tx, message);
}

fn start_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    view_data.fetch_request_id = view_data.fetch_request_id.saturating_add(1);
    let request_id = view_data.fetch_request_id;

    if let Err(error) = runtime.begin_fetch() {
        emit_status(state, view_data, tx, format!("fetch failed: {error:#}"));
        return;
    }
    refresh_snapshot(state, runtime, view_data, tx);

    if let Err(error) = runtime.spawn_fetch_users(request_id, tx.clone()) {
        log::warn!("spawn fetch {request_id}: {error:#}");
        emit_status(state, view_data, tx, format!("fetch failed: {error:#}"));
    }
}

fn refresh_snapshot<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    match runtime.load_users() {
        Ok(snapshot) => {
            view_data.snapshot = snapshot;
            clamp_row_cursor(state, view_data);
        }
        Err(error) => emit_status(state, view_data, tx, format!("load failed: {error:#}")),
    }
}

fn schedule_internal_event(internal_tx: &Sender<InternalEvent>, delay: Duration, event: InternalEvent) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(event);
    });
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    schedule_internal_event(internal_tx, STATUS_TTL, InternalEvent::ClearStatus { token });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_command(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

/// Dispatches `command` and arms the status clear when it produced a status.
fn dispatch_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    events
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.selection.is_open() {
        handle_modal_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::Form => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_modal_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('x') => {
            dispatch_command(
                state,
                view_data,
                internal_tx,
                AppCommand::Selection(SelectionCommand::CloseRequested),
            );
        }
        KeyCode::Char('j') | KeyCode::Down => {
            move_row_cursor(state, view_data, 1);
            open_selected_row(state, view_data, internal_tx);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_row_cursor(state, view_data, -1);
            open_selected_row(state, view_data, internal_tx);
        }
        _ => {}
    }
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.search_input = state.table.query.clone();
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
        }
        (KeyCode::Enter, _) => {
            let query = std::mem::take(&mut view_data.search_input);
            dispatch_command(
                state,
                view_data,
                internal_tx,
                AppCommand::Table(TableCommand::SubmitSearch(query)),
            );
            view_data.search_input = state.table.query.clone();
            view_data.selected_row = 0;
            clamp_row_cursor(state, view_data);
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
            let status = if state.table.query.is_empty() {
                "search cleared".to_owned()
            } else {
                format!("search: {}", state.table.query)
            };
            emit_status(state, view_data, internal_tx, status);
        }
        (KeyCode::Backspace, _) => {
            view_data.search_input.pop();
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search_input.clear();
        }
        (KeyCode::Char(ch), modifiers) if is_text_input(modifiers) => {
            view_data.search_input.push(ch);
        }
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let path = ADD_USER_FIELDS[view_data.form_field].path;
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToNav);
        }
        (KeyCode::Tab, _) | (KeyCode::Down, _) => move_form_field(view_data, 1),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => move_form_field(view_data, -1),
        (KeyCode::Enter, _) => submit_form(state, runtime, view_data, internal_tx),
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Backspace, _) => state.form.pop_char(path),
        (KeyCode::Char(ch), modifiers) if is_text_input(modifiers) => {
            state.form.push_char(path, ch);
        }
        _ => {}
    }
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let mut added = None;
    let outcome = state.form.submit(|draft| {
        added = Some(runtime.append_user(&draft)?);
        Ok(())
    });

    match outcome {
        Ok(SubmitOutcome::Submitted { notice_token }) => {
            schedule_internal_event(
                internal_tx,
                SUCCESS_NOTICE_TTL,
                InternalEvent::ClearFormNotice {
                    token: notice_token,
                },
            );
            view_data.form_field = 0;
            refresh_snapshot(state, runtime, view_data, internal_tx);
            let status = match added {
                Some(user) => format!("added user {}", user.id),
                None => "user added".to_owned(),
            };
            emit_status(state, view_data, internal_tx, status);
        }
        Ok(SubmitOutcome::Rejected { invalid_fields }) => {
            if let Some(index) = ADD_USER_FIELDS
                .iter()
                .position(|spec| state.form.error(spec.path).is_some())
            {
                view_data.form_field = index;
            }
            let noun = if invalid_fields == 1 {
                "field needs"
            } else {
                "fields need"
            };
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{invalid_fields} {noun} attention"),
            );
        }
        Err(error) => {
            log::warn!("add user failed: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("add user failed: {error:#}"),
            );
        }
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, _) => {
            switch_tab(state, view_data, internal_tx, AppCommand::NextTab);
            return false;
        }
        (KeyCode::BackTab, _) => {
            switch_tab(state, view_data, internal_tx, AppCommand::PrevTab);
            return false;
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        _ => {}
    }

    match state.active_tab {
        TabKind::Users => handle_users_key(state, runtime, view_data, internal_tx, key),
        TabKind::AddUser => {
            if matches!(key.code, KeyCode::Char('i') | KeyCode::Enter) {
                dispatch_command(state, view_data, internal_tx, AppCommand::EnterForm);
            }
        }
    }
    false
}

fn switch_tab(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    dispatch_command(state, view_data, internal_tx, command);
    if state.active_tab == TabKind::AddUser {
        view_data.form_field = 0;
    }
}

fn handle_users_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('/'), _) => {
            view_data.search_input = state.table.query.clone();
            dispatch_command(state, view_data, internal_tx, AppCommand::EnterSearch);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            start_fetch(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row_cursor(state, view_data, HALF_PAGE_ROWS);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            move_row_cursor(state, view_data, -HALF_PAGE_ROWS);
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row_cursor(state, view_data, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row_cursor(state, view_data, -1),
        (KeyCode::Char('g'), _) => view_data.selected_row = 0,
        (KeyCode::Char('G'), _) => {
            view_data.selected_row = visible_row_count(state, view_data).saturating_sub(1);
        }
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_column_cursor(view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_column_cursor(view_data, 1),
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            activate_column(state, view_data, internal_tx, view_data.selected_col);
        }
        (KeyCode::Char(digit @ '1'..='9'), _) => {
            let index = (digit as usize) - ('1' as usize);
            if index < SORTABLE_FIELDS.len() {
                view_data.selected_col = index;
                activate_column(state, view_data, internal_tx, index);
            }
        }
        (KeyCode::Enter, _) => open_selected_row(state, view_data, internal_tx),
        _ => {}
    }
}

fn activate_column(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let Some(field) = SORTABLE_FIELDS.get(index) else {
        return;
    };
    dispatch_command(
        state,
        view_data,
        internal_tx,
        AppCommand::Table(TableCommand::ActivateColumn(field.path)),
    );
    clamp_row_cursor(state, view_data);
}

fn open_selected_row(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    // Rows kept across a reload are not on screen.
    if !view_data.snapshot.state.is_ready() {
        return;
    }
    let selected = state
        .table
        .rows(&view_data.snapshot.users)
        .get(view_data.selected_row)
        .map(|user| (*user).clone());
    let Some(user) = selected else {
        return;
    };
    dispatch_command(
        state,
        view_data,
        internal_tx,
        AppCommand::Selection(SelectionCommand::RowActivated(user)),
    );
}

fn is_text_input(modifiers: KeyModifiers) -> bool {
    !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn visible_row_count(state: &AppState, view_data: &ViewData) -> usize {
    if !view_data.snapshot.state.is_ready() {
        return 0;
    }
    state.table.rows(&view_data.snapshot.users).len()
}

fn move_row_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let count = visible_row_count(state, view_data);
    if count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = (view_data.selected_row as isize + delta).clamp(0, count as isize - 1);
    view_data.selected_row = next as usize;
}

fn clamp_row_cursor(state: &AppState, view_data: &mut ViewData) {
    let count = visible_row_count(state, view_data);
    view_data.selected_row = view_data.selected_row.min(count.saturating_sub(1));
}

fn move_column_cursor(view_data: &mut ViewData, delta: isize) {
    let last = SORTABLE_FIELDS.len() as isize - 1;
    view_data.selected_col = (view_data.selected_col as isize + delta).clamp(0, last) as usize;
}

fn move_form_field(view_data: &mut ViewData, delta: isize) {
    let len = ADD_USER_FIELDS.len() as isize;
    view_data.form_field = (view_data.form_field as isize + delta).rem_euclid(len) as usize;
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(TabKind::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .block(Block::default().title("rolodex").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_tab {
        TabKind::Users => render_users(frame, layout[1], state, view_data),
        TabKind::AddUser => render_form(frame, layout[1], state, view_data),
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(user) = state.selection.record() {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        let modal = Paragraph::new(render_detail_text(user))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(DETAIL_HEADING)
                    .title_bottom("esc/x close")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(modal, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_users(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search_style = if state.mode == AppMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line_text(state, view_data))
        .style(search_style)
        .block(Block::default().title("search").borders(Borders::ALL));
    frame.render_widget(search, layout[0]);

    let title = table_title(state, view_data);
    if let Some(message) = table_placeholder(state, view_data) {
        let style = match view_data.snapshot.state {
            LoadState::Failed(_) => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::DarkGray),
        };
        let placeholder = Paragraph::new(message)
            .style(style)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(placeholder, layout[1]);
        return;
    }

    let projection = state.table.project(&view_data.snapshot.users);
    let widths = vec![Constraint::Min(8); projection.columns.len()];
    let header = Row::new(projection.columns.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.selected_col {
            style = style.fg(Color::Cyan);
        }
        Cell::from(header_label(column)).style(style)
    }));

    let rows = projection.rows.iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(column_index, text)| {
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && column_index == view_data.selected_col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(text.clone()).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    let mut table_state = TableState::default().with_selected(Some(view_data.selected_row));
    frame.render_stateful_widget(table, layout[1], &mut table_state);
}

fn render_form(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let outer = Block::default().title("add user").borders(Borders::ALL);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let groups = field_groups();
    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(groups.iter().map(|group| {
        let border = if group.section.is_some() { 2 } else { 0 };
        Constraint::Length(form_group_height(state, group) + border)
    }));
    constraints.push(Constraint::Min(0));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let notice = Paragraph::new(form_notice_text(state)).style(
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(notice, layout[0]);

    let mut start = 0;
    for (index, group) in groups.iter().enumerate() {
        let mut body = Paragraph::new(form_group_text(state, view_data, group, start));
        if let Some(section) = group.section {
            body = body.block(Block::default().title(section.title()).borders(Borders::ALL));
        }
        frame.render_widget(body, layout[index + 1]);
        start += group.fields.len();
    }
}

fn form_group_height(state: &AppState, group: &FieldGroup) -> u16 {
    group
        .fields
        .iter()
        .map(|spec| {
            if state.form.error(spec.path).is_some() {
                2
            } else {
                1
            }
        })
        .sum()
}

fn form_notice_text(state: &AppState) -> String {
    state.form.success_message().unwrap_or_default().to_owned()
}

/// Lines for one run of fields; `start` is the index of its first field in
/// the full descriptor list.
fn form_group_text(state: &AppState, view_data: &ViewData, group: &FieldGroup, start: usize) -> String {
    group
        .fields
        .iter()
        .enumerate()
        .map(|(offset, spec)| form_field_text(state, view_data, start + offset, spec))
        .collect::<Vec<_>>()
        .join("\n")
}

fn form_field_text(
    state: &AppState,
    view_data: &ViewData,
    index: usize,
    spec: &FormFieldSpec,
) -> String {
    let editing = state.mode == AppMode::Form && view_data.form_field == index;
    let marker = if editing { ">" } else { " " };
    let required = if spec.required.is_some() { "*" } else { "" };
    let value = state.form.value(spec.path);
    let display = if value.is_empty() && !editing {
        input_placeholder(spec.input).to_owned()
    } else {
        value.to_owned()
    };
    let cursor = if editing { INPUT_CURSOR } else { "" };
    let mut text = format!("{marker} {}{required}: {display}{cursor}", spec.label);
    if let Some(error) = state.form.error(spec.path) {
        text.push_str(&format!("\n    ! {error}"));
    }
    text
}

fn input_placeholder(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Text => "",
        InputKind::Email => "name@example.com",
        InputKind::Tel => "555-123-4567",
        InputKind::Url => "https://example.com",
    }
}

fn search_line_text(state: &AppState, view_data: &ViewData) -> String {
    if state.mode == AppMode::Search {
        return format!("/{}{INPUT_CURSOR}", view_data.search_input);
    }
    if state.table.query.is_empty() {
        "press / to search name, username, email, city, company".to_owned()
    } else {
        format!("filter: {}", state.table.query)
    }
}

/// Text shown in place of the table body, if any.
fn table_placeholder(state: &AppState, view_data: &ViewData) -> Option<String> {
    match &view_data.snapshot.state {
        LoadState::Pending => Some("Loading users...".to_owned()),
        LoadState::Failed(message) => Some(format!("Error: {message}")),
        LoadState::Ready { .. } => state
            .table
            .project(&view_data.snapshot.users)
            .empty_message()
            .map(str::to_owned),
    }
}

fn table_title(state: &AppState, view_data: &ViewData) -> String {
    let LoadState::Ready { fetched_at } = &view_data.snapshot.state else {
        return "users".to_owned();
    };
    let total = view_data.snapshot.users.len();
    let shown = visible_row_count(state, view_data);
    let mut title = if shown == total {
        format!("users ({total})")
    } else {
        format!("users ({shown} of {total})")
    };
    if let Ok(stamp) = fetched_at.format(format_description!("[hour]:[minute]:[second]")) {
        title.push_str(&format!(" @ {stamp}"));
    }
    title
}

fn header_label(column: &ColumnHeader) -> String {
    let suffix = match column.sort {
        Some(SortDirection::Asc) => " ↑",
        Some(SortDirection::Desc) => " ↓",
        None => "",
    };
    format!("{}{suffix}", column.label)
}

fn render_detail_text(user: &User) -> String {
    let mut lines = Vec::new();
    for line in detail_lines(user) {
        let mut values = line.value.lines();
        let first = values.next().unwrap_or_default();
        if line.label == "Website"
            && let Some(link) = website_link(user)
            && link != first
        {
            lines.push(format!("{}: {first} <{link}>", line.label));
            continue;
        }
        lines.push(format!("{}: {first}", line.label));
        for rest in values {
            lines.push(format!("  {rest}"));
        }
    }
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Form => "FORM",
    };
    let hints = if state.selection.is_open() {
        "j/k next/prev | esc/x close | ctrl+q"
    } else {
        match (state.mode, state.active_tab) {
            (AppMode::Search, _) => "type query | enter search | esc cancel",
            (AppMode::Form, _) => "type | tab/up/down field | enter submit | esc nav",
            (AppMode::Nav, TabKind::Users) => {
                "j/k/h/l g/G | s/1-6 sort | / search | enter open | r reload | tab | ? | q"
            }
            (AppMode::Nav, TabKind::AddUser) => "i edit form | tab | ? help | q quit",
        }
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: tab/shift+tab switch tabs | q quit\n\
users: j/k rows | h/l columns | g/G first/last | ctrl+d/u half page\n\
users: s sort by column | 1-6 sort by column n | / search | enter details | r reload\n\
search: type | enter apply | esc cancel | ctrl+u clear\n\
details: j/k next/prev row | esc/x close\n\
add user: i or enter edit | tab/up/down field | enter or ctrl+s submit | esc nav"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, field_groups, form_field_text, form_group_text,
        form_notice_text, handle_key_event, header_label, process_internal_events,
        render_detail_text, search_line_text, start_fetch, status_text, table_placeholder,
        table_title,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rolodex_app::{
        ADD_USER_FIELDS, AppMode, AppState, FieldPath, LoadState, SUCCESS_MESSAGE,
        SortDirection, TabKind, User, UserId, UserSnapshot,
    };
    use rolodex_testkit::sample_users;
    use std::sync::mpsc;
    use time::OffsetDateTime;

    #[derive(Debug)]
    struct TestRuntime {
        users: Vec<User>,
        state: LoadState,
        remote: Result<Vec<User>, String>,
        append_calls: usize,
        fail_append: bool,
    }

    impl Default for TestRuntime {
        fn default() -> Self {
            Self {
                users: sample_users(),
                state: LoadState::Ready {
                    fetched_at: OffsetDateTime::UNIX_EPOCH,
                },
                remote: Ok(sample_users()),
                append_calls: 0,
                fail_append: false,
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_users(&mut self) -> Result<UserSnapshot> {
            Ok(UserSnapshot {
                state: self.state.clone(),
                users: self.users.clone(),
            })
        }

        fn begin_fetch(&mut self) -> Result<()> {
            self.state = LoadState::Pending;
            Ok(())
        }

        fn fetch_users(&mut self) -> Result<Vec<User>> {
            self.remote.clone().map_err(|error| anyhow!(error))
        }

        fn apply_fetch_result(&mut self, result: Result<Vec<User>, String>) -> Result<()> {
            match result {
                Ok(users) => {
                    self.users = users;
                    self.state = LoadState::Ready {
                        fetched_at: OffsetDateTime::UNIX_EPOCH,
                    };
                }
                Err(error) => {
                    self.users.clear();
                    self.state = LoadState::Failed(error);
                }
            }
            Ok(())
        }

        fn append_user(&mut self, draft: &User) -> Result<User> {
            self.append_calls += 1;
            if self.fail_append {
                return Err(anyhow!("collection is read-only"));
            }
            let next = self
                .users
                .iter()
                .map(|user| user.id.get())
                .max()
                .unwrap_or(0)
                + 1;
            let mut user = draft.clone();
            user.id = UserId::new(next);
            self.users.push(user.clone());
            Ok(user)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn chars(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    fn loaded_view_data(runtime: &mut TestRuntime) -> ViewData {
        ViewData {
            snapshot: runtime.load_users().expect("load users"),
            ..ViewData::default()
        }
    }

    fn internal_channel() -> (
        mpsc::Sender<InternalEvent>,
        mpsc::Receiver<InternalEvent>,
    ) {
        mpsc::channel()
    }

    fn run_key_script(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        tx: &mpsc::Sender<InternalEvent>,
        rx: &mpsc::Receiver<InternalEvent>,
        keys: &[KeyEvent],
    ) {
        for key in keys {
            let _ = handle_key_event(state, runtime, view_data, tx, *key);
            process_internal_events(state, runtime, view_data, tx, rx);
        }
    }

    fn visible_names(state: &AppState, view_data: &ViewData) -> Vec<String> {
        state
            .table
            .rows(&view_data.snapshot.users)
            .into_iter()
            .map(|user| user.name.clone())
            .collect()
    }

    fn fill_form(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        tx: &mpsc::Sender<InternalEvent>,
        rx: &mpsc::Receiver<InternalEvent>,
        email: &str,
    ) {
        let values = [
            "Test User",
            "testuser",
            email,
            "123 Main St",
            "Suite 100",
            "Test City",
            "12345",
            "123-456-7890",
            "Test Co",
            "https://example.com",
        ];
        run_key_script(state, runtime, view_data, tx, rx, &[key(KeyCode::Char('i'))]);
        for value in values {
            let mut keys = chars(value);
            keys.push(key(KeyCode::Down));
            run_key_script(state, runtime, view_data, tx, rx, &keys);
        }
    }

    #[test]
    fn ctrl_q_quits_from_any_mode() {
        let mut state = AppState {
            mode: AppMode::Form,
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, _rx) = internal_channel();

        let should_quit = handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        assert!(should_quit);
    }

    #[test]
    fn q_quits_in_nav_but_types_in_form() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, _rx) = internal_channel();

        assert!(handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('q')),
        ));

        state.dispatch(rolodex_app::AppCommand::EnterForm);
        assert!(!handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('q')),
        ));
        assert_eq!(state.form.value(FieldPath::Name), "q");
    }

    #[test]
    fn tab_key_cycles_tabs() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Tab)],
        );
        assert_eq!(state.active_tab, TabKind::AddUser);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::BackTab)],
        );
        assert_eq!(state.active_tab, TabKind::Users);
    }

    #[test]
    fn sort_key_toggles_active_column_and_marks_header() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        assert_eq!(
            visible_names(&state, &view_data),
            vec!["Alice Johnson", "Bob Smith"]
        );

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('s'))],
        );
        assert_eq!(state.table.sort.direction, SortDirection::Desc);
        assert_eq!(
            visible_names(&state, &view_data),
            vec!["Bob Smith", "Alice Johnson"]
        );
        let projection = state.table.project(&view_data.snapshot.users);
        assert_eq!(header_label(&projection.columns[0]), "Name ↓");
        assert_eq!(header_label(&projection.columns[1]), "Username");
        assert_eq!(state.status_line.as_deref(), Some("sort name desc"));
    }

    #[test]
    fn digit_keys_sort_by_that_column() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('4'))],
        );
        assert_eq!(state.table.sort.key, FieldPath::AddressCity);
        assert_eq!(state.table.sort.direction, SortDirection::Asc);
        assert_eq!(view_data.selected_col, 3);
        assert_eq!(
            visible_names(&state, &view_data),
            vec!["Alice Johnson", "Bob Smith"]
        );

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('9'))],
        );
        assert_eq!(state.table.sort.key, FieldPath::AddressCity);
    }

    #[test]
    fn search_applies_only_on_enter() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        let mut keys = vec![key(KeyCode::Char('/'))];
        keys.extend(chars("ali"));
        run_key_script(&mut state, &mut runtime, &mut view_data, &tx, &rx, &keys);
        assert_eq!(state.mode, AppMode::Search);
        assert_eq!(search_line_text(&state, &view_data), "/ali▏");
        assert_eq!(visible_names(&state, &view_data).len(), 2);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter)],
        );
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.table.query, "ali");
        assert_eq!(visible_names(&state, &view_data), vec!["Alice Johnson"]);
        assert_eq!(search_line_text(&state, &view_data), "filter: ali");
    }

    #[test]
    fn escape_abandons_search_edit() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        let mut keys = vec![key(KeyCode::Char('/'))];
        keys.extend(chars("bob"));
        keys.push(key(KeyCode::Esc));
        run_key_script(&mut state, &mut runtime, &mut view_data, &tx, &rx, &keys);

        assert_eq!(state.mode, AppMode::Nav);
        assert!(state.table.query.is_empty());
        assert!(view_data.search_input.is_empty());
    }

    #[test]
    fn unmatched_search_shows_no_users_found() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        let mut keys = vec![key(KeyCode::Char('/'))];
        keys.extend(chars("zzz"));
        keys.push(key(KeyCode::Enter));
        run_key_script(&mut state, &mut runtime, &mut view_data, &tx, &rx, &keys);

        assert_eq!(
            table_placeholder(&state, &view_data).as_deref(),
            Some("No users found")
        );
        assert_eq!(table_title(&state, &view_data), "users (0 of 2) @ 00:00:00");
    }

    #[test]
    fn enter_opens_details_and_x_or_esc_closes() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('j')), key(KeyCode::Enter)],
        );
        assert_eq!(
            state.selection.record().map(|user| user.name.as_str()),
            Some("Bob Smith")
        );

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('x'))],
        );
        assert!(!state.selection.is_open());

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter), key(KeyCode::Esc)],
        );
        assert!(!state.selection.is_open());
    }

    #[test]
    fn moving_while_modal_open_replaces_record() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter), key(KeyCode::Char('j'))],
        );
        assert_eq!(
            state.selection.record().map(|user| user.id),
            Some(UserId::new(2))
        );
        assert!(status_text(&state, &view_data).contains("esc/x close"));
    }

    #[test]
    fn enter_during_reload_does_not_open_hidden_row() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        for code in [KeyCode::Char('r'), KeyCode::Enter] {
            let _ = handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(code));
        }
        assert_eq!(
            table_placeholder(&state, &view_data).as_deref(),
            Some("Loading users...")
        );
        assert!(!state.selection.is_open());

        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter)],
        );
        assert_eq!(
            state.selection.record().map(|user| user.name.as_str()),
            Some("Alice Johnson")
        );
    }

    #[test]
    fn detail_text_lists_every_field() {
        let users = sample_users();
        let text = render_detail_text(&users[1]);
        assert_eq!(
            text,
            "Name: Bob Smith\n\
User ID: 2\n\
Username: bobsmith\n\
Email: bob@example.com\n\
Address: 202 Oak St\n  Apt. 4\n  Townsville, 54321\n\
Phone #: 987-654-3210\n\
Company Name: Beta LLC\n\
Website: bobsmith.io <https://bobsmith.io>"
        );
    }

    #[test]
    fn valid_form_submit_appends_and_shows_notice() {
        let mut state = AppState {
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        fill_form(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            "test@example.com",
        );
        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter)],
        );

        assert_eq!(runtime.append_calls, 1);
        let added = view_data.snapshot.users.last().expect("added user");
        assert_eq!(added.id, UserId::new(3));
        assert_eq!(added.name, "Test User");
        assert_eq!(added.address.suite.as_deref(), Some("Suite 100"));
        assert!(state.form.errors().is_empty());
        assert_eq!(state.form.value(FieldPath::Name), "");
        assert_eq!(view_data.form_field, 0);
        assert_eq!(form_notice_text(&state), SUCCESS_MESSAGE);
        assert_eq!(state.status_line.as_deref(), Some("added user 3"));
    }

    #[test]
    fn notice_clears_only_with_matching_token() {
        let mut state = AppState {
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        fill_form(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            "test@example.com",
        );
        let outcome = state.form.submit(|_| Ok(()));
        let Ok(rolodex_app::SubmitOutcome::Submitted { notice_token }) = outcome else {
            panic!("expected submit to succeed");
        };

        tx.send(InternalEvent::ClearFormNotice {
            token: notice_token + 7,
        })
        .expect("send stale clear");
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        assert_eq!(form_notice_text(&state), SUCCESS_MESSAGE);

        tx.send(InternalEvent::ClearFormNotice {
            token: notice_token,
        })
        .expect("send clear");
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        assert_eq!(form_notice_text(&state), "");
    }

    #[test]
    fn leaving_form_tab_cancels_pending_notice() {
        let mut state = AppState {
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        fill_form(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            "test@example.com",
        );
        let outcome = state.form.submit(|_| Ok(()));
        let Ok(rolodex_app::SubmitOutcome::Submitted { notice_token }) = outcome else {
            panic!("expected submit to succeed");
        };

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Esc), key(KeyCode::Tab)],
        );
        assert_eq!(state.active_tab, TabKind::Users);
        assert_eq!(form_notice_text(&state), "");

        assert!(!state.form.expire_notice(notice_token));
    }

    #[test]
    fn invalid_email_blocks_submit_and_focuses_field() {
        let mut state = AppState {
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        fill_form(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            "not-an-email",
        );
        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter)],
        );

        assert_eq!(runtime.append_calls, 0);
        assert_eq!(view_data.form_field, 2);
        assert_eq!(state.form.value(FieldPath::Name), "Test User");
        assert_eq!(state.status_line.as_deref(), Some("1 field needs attention"));
        let email = form_field_text(&state, &view_data, 2, &ADD_USER_FIELDS[2]);
        assert_eq!(
            email,
            "> Email*: not-an-email▏\n    ! Invalid email format"
        );
    }

    #[test]
    fn failed_append_keeps_draft() {
        let mut state = AppState {
            active_tab: TabKind::AddUser,
            ..AppState::default()
        };
        let mut runtime = TestRuntime {
            fail_append: true,
            ..TestRuntime::default()
        };
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        fill_form(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            "test@example.com",
        );
        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Enter)],
        );

        assert_eq!(runtime.append_calls, 1);
        assert_eq!(state.form.value(FieldPath::Email), "test@example.com");
        assert_eq!(form_notice_text(&state), "");
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("collection is read-only"))
        );
    }

    #[test]
    fn address_fields_render_in_their_own_group() {
        let state = AppState::default();
        let view_data = ViewData::default();
        let groups = field_groups();

        let address = form_group_text(&state, &view_data, &groups[1], 3);
        assert_eq!(
            address,
            "  Street*: \n  Suite: \n  City*: \n  Zipcode*: "
        );
        let top = form_group_text(&state, &view_data, &groups[0], 0);
        assert!(top.contains("  Email*: name@example.com"));
    }

    #[test]
    fn reload_fetches_and_populates() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            users: Vec::new(),
            state: LoadState::Pending,
            ..TestRuntime::default()
        };
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();
        assert_eq!(
            table_placeholder(&state, &view_data).as_deref(),
            Some("Loading users...")
        );

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('r'))],
        );

        assert!(view_data.snapshot.state.is_ready());
        assert_eq!(view_data.snapshot.users.len(), 2);
        assert_eq!(state.status_line.as_deref(), Some("loaded 2 users"));
    }

    #[test]
    fn failed_fetch_renders_error_message() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            remote: Err("cannot reach http://127.0.0.1:1/users".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        start_fetch(&mut state, &mut runtime, &mut view_data, &tx);
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);

        assert_eq!(
            table_placeholder(&state, &view_data).as_deref(),
            Some("Error: cannot reach http://127.0.0.1:1/users")
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("fetch failed; press r to retry")
        );
    }

    #[test]
    fn stale_fetch_results_are_ignored() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        start_fetch(&mut state, &mut runtime, &mut view_data, &tx);
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        assert_eq!(view_data.fetch_request_id, 1);

        tx.send(InternalEvent::UsersFetched {
            request_id: 0,
            result: Err("late failure".to_owned()),
        })
        .expect("send stale result");
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);

        assert!(view_data.snapshot.state.is_ready());
        assert_eq!(view_data.snapshot.users.len(), 2);
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('s')), key(KeyCode::Char('s'))],
        );
        let current = view_data.status_token;

        tx.send(InternalEvent::ClearStatus {
            token: current - 1,
        })
        .expect("send stale clear");
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus { token: current })
            .expect("send clear");
        process_internal_events(&mut state, &mut runtime, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn help_toggles_and_swallows_keys() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = loaded_view_data(&mut runtime);
        let (tx, rx) = internal_channel();

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('?')), key(KeyCode::Char('s'))],
        );
        assert!(view_data.help_visible);
        assert_eq!(state.table.sort.direction, SortDirection::Asc);
        assert_eq!(status_text(&state, &view_data), "");

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Esc)],
        );
        assert!(!view_data.help_visible);
    }
}
