//! Payee lookup options and errors.

use std::time::Duration;

use thiserror::Error;

use crate::conf::{C_URL_PAYEE_DEFAULT, DUR_TIMEOUT_DEFAULT};

/// Options for one payee lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPayeeRequestOptions {
    /// Form endpoint URL.
    pub url_endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for SpecPayeeRequestOptions {
    fn default() -> Self {
        Self {
            url_endpoint: C_URL_PAYEE_DEFAULT.to_string(),
            timeout: DUR_TIMEOUT_DEFAULT,
        }
    }
}

/// Payee lookup failures. None of them is retried.
#[derive(Debug, Error)]
pub enum PayeeRequestError {
    /// No complete answer within the timeout.
    #[error("Server did not answer within {} ms.", .0.as_millis())]
    Timeout(Duration),
    /// Server answered with a non-200 status.
    #[error("Request failed with HTTP status {0}.")]
    RequestFailed(u16),
    /// Connection, TLS or client setup failure.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// 200 body is not JSON.
    #[error("Response body is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    /// 200 body lacks the expected key.
    #[error("Response has no `{0}` field.")]
    MissingKey(String),
}

impl PayeeRequestError {
    /// Short failure category for top-level logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::RequestFailed(_) | Self::Transport(_) => "request",
            Self::Decode(_) | Self::MissingKey(_) => "parse",
        }
    }
}
