// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{User, UserId};

/// The record currently shown in the detail modal, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    Open(User),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    RowActivated(User),
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Opened(UserId),
    Closed,
}

impl Selection {
    pub fn dispatch(&mut self, command: SelectionCommand) -> SelectionEvent {
        match command {
            SelectionCommand::RowActivated(user) => {
                let id = user.id;
                *self = Self::Open(user);
                SelectionEvent::Opened(id)
            }
            SelectionCommand::CloseRequested => {
                *self = Self::Closed;
                SelectionEvent::Closed
            }
        }
    }

    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn record(&self) -> Option<&User> {
        match self {
            Self::Open(user) => Some(user),
            Self::Closed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: &'static str,
    pub value: String,
}

pub const DETAIL_HEADING: &str = "User Details";

/// Label/value pairs for the detail view. Address spans several lines.
pub fn detail_lines(user: &User) -> Vec<DetailLine> {
    let line = |label, value: &str| DetailLine {
        label,
        value: value.to_owned(),
    };
    vec![
        line("Name", &user.name),
        line("User ID", &user.id.to_string()),
        line("Username", &user.username),
        line("Email", &user.email),
        DetailLine {
            label: "Address",
            value: [
                user.address.street.clone(),
                user.address.suite.clone().unwrap_or_default(),
                format!("{}, {}", user.address.city, user.address.zipcode),
            ]
            .join("\n"),
        },
        line("Phone #", &user.phone),
        line("Company Name", &user.company.name),
        line("Website", &user.website),
    ]
}

/// Link target for the website line. Bare hosts get an `https://` scheme.
pub fn website_link(user: &User) -> Option<String> {
    let site = user.website.trim();
    if site.is_empty() {
        return None;
    }
    if site.starts_with("http://") || site.starts_with("https://") {
        return Some(site.to_owned());
    }
    Some(format!("https://{site}"))
}
