// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zipcode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// One row of the directory, in the shape the remote endpoint serves.
///
/// Missing or `null` keys decode to empty values so a partial record still
/// renders, sorts, and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: Company,
}

impl User {
    /// The all-empty record a new form starts from.
    pub fn empty() -> Self {
        Self {
            id: UserId::UNASSIGNED,
            name: String::new(),
            username: String::new(),
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            address: Address {
                street: String::new(),
                suite: Some(String::new()),
                city: String::new(),
                zipcode: String::new(),
            },
            company: Company::default(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Users,
    AddUser,
}

impl TabKind {
    pub const ALL: [Self; 2] = [Self::Users, Self::AddUser];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::AddUser => "add user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Outcome of the single outstanding fetch of the working collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Failed(String),
    Ready { fetched_at: OffsetDateTime },
}

impl LoadState {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub state: LoadState,
    pub users: Vec<User>,
}

impl Default for UserSnapshot {
    fn default() -> Self {
        Self {
            state: LoadState::Pending,
            users: Vec::new(),
        }
    }
}
