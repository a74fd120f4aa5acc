//! Per-run state shared explicitly by the extraction components.

use crate::config::ExtractConfig;
use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use std::time::Duration;

const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Everything a run hands to the resolver, fetcher and orchestrator.
///
/// Built once at startup. The HTTP client carries the per-call timeout, and
/// `run_stamp` is the fetch-time label embedded in every artifact name of the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    http: Client,
    started_at: DateTime<Utc>,
    run_stamp: String,
    rate_limit: Duration,
}

impl RunContext {
    /// Builds a context with a fresh client bounded by `request_timeout`.
    pub fn new(request_timeout: Duration, rate_limit: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(http, rate_limit))
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.request_timeout, config.rate_limit)
    }

    /// Uses an existing client as-is; its timeout settings are not changed.
    pub fn with_client(http: Client, rate_limit: Duration) -> Self {
        let now = Local::now();
        Self {
            http,
            started_at: now.with_timezone(&Utc),
            run_stamp: format_run_stamp(now),
            rate_limit,
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    /// Pause after each dataset request.
    pub fn rate_limit(&self) -> Duration {
        self.rate_limit
    }
}

/// `%Y%m%d_%H%M%S` in local time.
pub fn format_run_stamp(at: DateTime<Local>) -> String {
    at.format(RUN_STAMP_FORMAT).to_string()
}
