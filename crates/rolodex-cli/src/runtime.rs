// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rolodex_api::Client;
use rolodex_app::{User, UserSnapshot};
use rolodex_store::{UserCache, demo_users};
use rolodex_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;

/// Backs the TUI with the in-memory collection. Without a client the
/// collection is served from the built-in demo users.
pub struct CacheRuntime {
    cache: UserCache,
    client: Option<Client>,
}

impl CacheRuntime {
    pub fn new(client: Client) -> Self {
        Self {
            cache: UserCache::new(),
            client: Some(client),
        }
    }

    pub fn demo() -> Self {
        let mut cache = UserCache::new();
        cache.seed_demo_users();
        Self {
            cache,
            client: None,
        }
    }
}

impl rolodex_tui::AppRuntime for CacheRuntime {
    fn load_users(&mut self) -> Result<UserSnapshot> {
        Ok(self.cache.snapshot())
    }

    fn begin_fetch(&mut self) -> Result<()> {
        self.cache.begin_fetch();
        Ok(())
    }

    fn fetch_users(&mut self) -> Result<Vec<User>> {
        match &self.client {
            Some(client) => client.fetch_users(),
            None => Ok(demo_users()),
        }
    }

    fn spawn_fetch_users(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let Some(client) = self.client.clone() else {
            let result = self.fetch_users().map_err(|error| format!("{error:#}"));
            tx.send(InternalEvent::UsersFetched { request_id, result })
                .map_err(|_| anyhow!("fetch event channel closed"))?;
            return Ok(());
        };

        log::info!("fetch {request_id}: GET {}", client.url());
        thread::Builder::new()
            .name(format!("rolodex-fetch-{request_id}"))
            .spawn(move || {
                let result = client.fetch_users().map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::UsersFetched { request_id, result });
            })
            .map_err(|error| anyhow!("spawn fetch thread: {error}"))?;
        Ok(())
    }

    fn apply_fetch_result(&mut self, result: Result<Vec<User>, String>) -> Result<()> {
        match &result {
            Ok(users) => log::info!("fetched {} users", users.len()),
            Err(error) => log::warn!("fetch failed: {error}"),
        }
        self.cache.finish_fetch(result.map_err(|error| anyhow!(error)));
        Ok(())
    }

    fn append_user(&mut self, draft: &User) -> Result<User> {
        Ok(self.cache.append(draft.clone()))
    }
}
