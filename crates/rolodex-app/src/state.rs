// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    AppMode, Selection, SelectionCommand, SelectionEvent, TabKind, TableCommand, TableEvent,
    TableView, UserForm,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub status_line: Option<String>,
    pub table: TableView,
    pub selection: Selection,
    pub form: UserForm,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: TabKind::Users,
            status_line: None,
            table: TableView::default(),
            selection: Selection::default(),
            form: UserForm::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    EnterSearch,
    EnterForm,
    ExitToNav,
    Table(TableCommand),
    Selection(SelectionCommand),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    Table(TableEvent),
    Selection(SelectionEvent),
    FormDiscarded,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::EnterSearch => {
                if self.active_tab != TabKind::Users {
                    return vec![self.set_status("search lives on the users tab")];
                }
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::EnterForm => {
                let mut events = Vec::new();
                if self.active_tab != TabKind::AddUser {
                    events.extend(self.leave_tab());
                    self.active_tab = TabKind::AddUser;
                    events.push(AppEvent::TabChanged(self.active_tab));
                }
                self.mode = AppMode::Form;
                events.push(AppEvent::ModeChanged(self.mode));
                events
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::Table(command) => {
                let event = self.table.dispatch(command);
                let mut events = vec![AppEvent::Table(event.clone())];
                match event {
                    TableEvent::SortChanged(sort) => {
                        let label = crate::sortable_field(sort.key)
                            .map_or(sort.key.as_str(), |field| field.label);
                        events.push(self.set_status(&format!(
                            "sort {} {}",
                            label.to_lowercase(),
                            sort.direction.label()
                        )));
                    }
                    TableEvent::SortUnavailable(key) => {
                        events.push(self.set_status(&format!("{} is not sortable", key.as_str())));
                    }
                    TableEvent::QueryChanged(_) => {}
                }
                events
            }
            AppCommand::Selection(command) => {
                vec![AppEvent::Selection(self.selection.dispatch(command))]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let mut events = self.leave_tab();
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        if self.mode != AppMode::Nav {
            self.mode = AppMode::Nav;
            events.push(AppEvent::ModeChanged(self.mode));
        }
        events.push(AppEvent::TabChanged(self.active_tab));
        events
    }

    /// Tears down whatever the current tab owns before switching away.
    fn leave_tab(&mut self) -> Vec<AppEvent> {
        match self.active_tab {
            TabKind::Users if self.selection.is_open() => {
                let event = self.selection.dispatch(SelectionCommand::CloseRequested);
                vec![AppEvent::Selection(event)]
            }
            TabKind::Users => Vec::new(),
            TabKind::AddUser => {
                self.form.discard();
                vec![AppEvent::FormDiscarded]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
