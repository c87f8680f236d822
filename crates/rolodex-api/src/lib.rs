// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use rolodex_app::User;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Fetches the user collection from a JSON endpoint serving an array of
/// user objects. One request per call; retries are the caller's business.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = validate_source_url(url)?;
        if timeout.is_zero() {
            bail!("source.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fetch_users(&self) -> Result<Vec<User>> {
        log::debug!("GET {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|error| connection_error(&self.url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read user list")?;
        let users: Vec<User> = serde_json::from_str(&body).context("decode user list")?;
        log::debug!("fetched {} users from {}", users.len(), self.url);
        Ok(users)
    }
}

pub fn validate_source_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("source.url must not be empty");
    }
    let parsed = Url::parse(trimmed)
        .with_context(|| format!("source.url {trimmed:?} is not a valid URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => bail!("source.url must use http or https, got {other:?}"),
    }
}

fn connection_error(url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [source].url and your network ({})",
        url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}
