//! Error types for exchange access and record parsing.

use thiserror::Error;

/// A raw API record could not be turned into a typed model.
///
/// Raised during conversion; missing fields are never replaced with defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("{record} record is missing field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{record} record has unparseable timestamp {value:?}")]
    InvalidTimestamp { record: &'static str, value: String },

    #[error("{record} record has unknown side {value:?}")]
    InvalidSide { record: &'static str, value: String },
}

impl MalformedRecordError {
    pub fn missing(record: &'static str, field: &'static str) -> Self {
        Self::MissingField { record, field }
    }
}

/// Failures talking to the exchange REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request rejected by exchange: {message}")]
    Rejected { message: String },

    #[error("response envelope has no result")]
    MissingResult,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid credentials: {0}")]
    Credentials(String),
}

impl ApiError {
    /// HTTP 429, the only failure worth waiting out.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::Http { status: 429, .. })
    }
}
