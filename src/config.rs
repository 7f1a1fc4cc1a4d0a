//! Upstream connection settings read from the environment.
//!
//! `.env` files are loaded by the binary through `dotenvy` before this runs.
//!
//! | Variable                  | Default | Meaning                              |
//! |---------------------------|---------|--------------------------------------|
//! | `DTAKO_UPSTREAM_URL`      | —       | base URL of the row store (required) |
//! | `DTAKO_UPSTREAM_TOKEN`    | none    | bearer token sent with every read    |
//! | `DTAKO_BATCH_SIZE`        | 1000    | rows per upstream read               |
//! | `DTAKO_ORDER_BY`          | natural | order clause passed upstream         |
//! | `DTAKO_HTTP_TIMEOUT_SECS` | 30      | per-request timeout                  |

use anyhow::{Context, Result, anyhow};
use std::time::Duration;

use crate::fetch::OrderBy;
use crate::query::DEFAULT_BATCH_SIZE;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub batch_size: usize,
    pub order_by: OrderBy,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("DTAKO_UPSTREAM_URL")
            .ok_or_else(|| anyhow!("DTAKO_UPSTREAM_URL must be set"))?;

        let batch_size = match get("DTAKO_BATCH_SIZE") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("DTAKO_BATCH_SIZE must be a positive integer, got '{v}'"))?,
            None => DEFAULT_BATCH_SIZE,
        };

        let timeout_secs = match get("DTAKO_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("DTAKO_HTTP_TIMEOUT_SECS must be a number, got '{v}'"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            token: get("DTAKO_UPSTREAM_TOKEN"),
            batch_size,
            order_by: get("DTAKO_ORDER_BY")
                .map(|v| OrderBy::parse(&v))
                .unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
