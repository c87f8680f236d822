// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FieldPath, SortDirection, User, UserId, filter_rows, sort_rows};

pub const NO_USERS_MESSAGE: &str = "No users found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortableField {
    pub path: FieldPath,
    pub label: &'static str,
}

/// Table columns, in display order. Each one is also a sort key.
pub const SORTABLE_FIELDS: [SortableField; 6] = [
    SortableField {
        path: FieldPath::Name,
        label: "Name",
    },
    SortableField {
        path: FieldPath::Username,
        label: "Username",
    },
    SortableField {
        path: FieldPath::Email,
        label: "Email",
    },
    SortableField {
        path: FieldPath::AddressCity,
        label: "City",
    },
    SortableField {
        path: FieldPath::Phone,
        label: "Phone",
    },
    SortableField {
        path: FieldPath::CompanyName,
        label: "Company",
    },
];

pub fn sortable_field(path: FieldPath) -> Option<&'static SortableField> {
    SORTABLE_FIELDS.iter().find(|field| field.path == path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: FieldPath,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: FieldPath::Name,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    ActivateColumn(FieldPath),
    SubmitSearch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    SortChanged(SortState),
    SortUnavailable(FieldPath),
    QueryChanged(String),
}

/// Sort and search state for the user table. The visible rows are always
/// recomputed from the source collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub sort: SortState,
    pub query: String,
}

impl TableView {
    pub fn dispatch(&mut self, command: TableCommand) -> TableEvent {
        match command {
            TableCommand::ActivateColumn(key) => {
                if sortable_field(key).is_none() {
                    return TableEvent::SortUnavailable(key);
                }
                self.sort = if self.sort.key == key {
                    SortState {
                        key,
                        direction: self.sort.direction.flipped(),
                    }
                } else {
                    SortState {
                        key,
                        direction: SortDirection::Asc,
                    }
                };
                TableEvent::SortChanged(self.sort)
            }
            TableCommand::SubmitSearch(query) => {
                self.query = query.trim().to_owned();
                TableEvent::QueryChanged(self.query.clone())
            }
        }
    }

    pub fn rows<'a>(&self, source: &'a [User]) -> Vec<&'a User> {
        let filtered = filter_rows(source, &self.query);
        sort_rows(&filtered, self.sort.key, self.sort.direction)
    }

    pub fn project(&self, source: &[User]) -> TableProjection {
        let columns = SORTABLE_FIELDS
            .iter()
            .map(|field| ColumnHeader {
                path: field.path,
                label: field.label,
                sort: (field.path == self.sort.key).then_some(self.sort.direction),
            })
            .collect();
        let rows = self
            .rows(source)
            .into_iter()
            .map(|user| RowProjection {
                id: user.id,
                cells: SORTABLE_FIELDS
                    .iter()
                    .map(|field| field.path.text(user).to_owned())
                    .collect(),
            })
            .collect();
        TableProjection { columns, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub path: FieldPath,
    pub label: &'static str,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowProjection {
    pub id: UserId,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProjection {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<RowProjection>,
}

impl TableProjection {
    /// Text shown in place of the table body when nothing survived the filter.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(NO_USERS_MESSAGE)
    }
}
