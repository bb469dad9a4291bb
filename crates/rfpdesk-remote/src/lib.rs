// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rfpdesk_app::{FetchOutcome, Rfp, sort_newest_first};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const RFP_TABLE: &str = "rfps";

/// Read-only client for the hosted `rfps` table behind PostgREST.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("remote.url must not be empty -- set it in the config file or SUPABASE_URL");
        }
        url::Url::parse(&base_url)
            .with_context(|| format!("remote.url {base_url:?} is not a valid URL"))?;
        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            bail!(
                "remote.anon_key must not be empty -- set it in the config file or SUPABASE_ANON_KEY"
            );
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key).context("remote.anon_key is not a valid header value")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {anon_key}"))
                .context("remote.anon_key is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rfps_url(&self) -> String {
        format!(
            "{}/rest/v1/{RFP_TABLE}?select=*&order=created_at.desc",
            self.base_url
        )
    }

    pub fn list_rfps(&self) -> Result<Vec<Rfp>> {
        let response = self
            .http
            .get(self.rfps_url())
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let mut rows: Vec<Rfp> = response.json().context("decode rfps rows")?;
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    /// One attempt, no retry. Failures are logged and come back with no rows.
    pub fn fetch_rfps(&self) -> FetchOutcome {
        match self.list_rfps() {
            Ok(rows) => {
                tracing::info!(count = rows.len(), base_url = %self.base_url, "loaded rfps");
                FetchOutcome::Loaded(rows)
            }
            Err(error) => {
                let message = format!("{error:#}");
                tracing::error!(error = %message, base_url = %self.base_url, "error fetching rfps");
                FetchOutcome::Failed(message)
            }
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check remote.url and your network connection ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<PostgrestError>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        let hint = parsed
            .hint
            .filter(|hint| !hint.is_empty())
            .map(|hint| format!(" (hint: {hint})"))
            .unwrap_or_default();
        return anyhow!("server error ({}): {}{}", status.as_u16(), message, hint);
    }

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return anyhow!(
            "server rejected credentials ({}) -- check remote.anon_key",
            status.as_u16()
        );
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    hint: Option<String>,
}
