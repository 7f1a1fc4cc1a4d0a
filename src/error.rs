//! Error taxonomy for queries and reports.
//!
//! Callers see a closed set of kinds: bad input is rejected before any
//! upstream call, upstream failures abort the scan and may be retried by the
//! caller, and cancellation discards whatever the scan had collected.

use thiserror::Error;

/// Failure of a single batch read against the upstream row store.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode upstream batch: {0}")]
    Decode(String),

    #[error("upstream error: {0}")]
    Other(String),
}

/// Errors surfaced by [`crate::query::RowQuery`] and [`crate::analyzers::report::Reports`].
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Lookup of a single entity found nothing. Empty scans are not errors.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("failed to render export: {0}")]
    Export(String),
}

impl QueryError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        QueryError::InvalidInput(msg.into())
    }

    /// Only upstream failures are worth retrying; the engine never retries itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_upstream_is_retryable() {
        assert!(QueryError::from(UpstreamError::Other("boom".into())).is_retryable());
        assert!(!QueryError::invalid_input("car_cc is required").is_retryable());
        assert!(!QueryError::NotFound("row".into()).is_retryable());
        assert!(!QueryError::Cancelled.is_retryable());
    }

    #[test]
    fn test_status_error_message() {
        let err = UpstreamError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "upstream returned status 503: unavailable");
    }
}
