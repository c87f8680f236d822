// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;

use anyhow::{Context, Result, anyhow, bail};
use rolodex_app::{LoadState, User, UserId, UserSnapshot};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::PathBuf;
use time::OffsetDateTime;

pub use demo::demo_users;

pub const APP_NAME: &str = "rolodex";

/// The working collection: users in canonical (append) order plus the
/// outcome of the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCache {
    users: Vec<User>,
    state: LoadState,
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl UserCache {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            state: LoadState::Pending,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            state: self.state.clone(),
            users: self.users.clone(),
        }
    }

    pub fn begin_fetch(&mut self) {
        log::debug!("user fetch started");
        self.state = LoadState::Pending;
    }

    /// Records the fetch outcome. A failure clears the rows and keeps only the
    /// message; a success replaces the whole collection.
    pub fn finish_fetch(&mut self, result: Result<Vec<User>>) {
        match result.and_then(|users| {
            ensure_unique_ids(&users)?;
            Ok(users)
        }) {
            Ok(users) => {
                log::info!("loaded {} users", users.len());
                self.users = users;
                self.state = LoadState::Ready {
                    fetched_at: OffsetDateTime::now_utc(),
                };
            }
            Err(error) => {
                let message = format!("{error:#}");
                log::warn!("user fetch failed: {message}");
                self.users.clear();
                self.state = LoadState::Failed(message);
            }
        }
    }

    pub fn next_id(&self) -> UserId {
        self.users
            .iter()
            .map(|user| user.id)
            .max()
            .map_or(UserId::new(1), UserId::next)
    }

    /// Appends `draft` under the next free id, ignoring whatever id it carries.
    pub fn append(&mut self, draft: User) -> User {
        let mut user = draft;
        user.id = self.next_id();
        log::info!("appended user {} ({})", user.id, user.username);
        self.users.push(user.clone());
        if !self.state.is_ready() {
            self.state = LoadState::Ready {
                fetched_at: OffsetDateTime::now_utc(),
            };
        }
        user
    }

    pub fn seed_demo_users(&mut self) {
        self.finish_fetch(Ok(demo_users()));
    }
}

fn ensure_unique_ids(users: &[User]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for user in users {
        if !seen.insert(user.id) {
            bail!(
                "duplicate user id {} in fetched data -- each user needs a unique id",
                user.id
            );
        }
    }
    Ok(())
}

pub fn default_log_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("ROLODEX_LOG_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set ROLODEX_LOG_PATH to a writable log path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("rolodex.log"))
}
