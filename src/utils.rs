use std::env;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    scanned_cases::{BatchPolicy, CaseError},
    stores::StoreError,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub port: u16,
    pub redis_url: Option<String>,
    pub batch_policy: BatchPolicy,
    pub request_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            redis_url: None,
            batch_policy: BatchPolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GlobalConfig {
    /// Reads the configuration from the environment, falling back to the defaults for unset variables.
    ///
    /// # Errors
    /// Returns an error naming the variable if a set variable cannot be parsed.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// # Errors
    /// Returns an error naming the variable if a set variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|e| eyre::eyre!("invalid `PORT` environment variable {port:?}: {e}"))?,
            None => defaults.port,
        };

        let batch_policy = match lookup("VALIDATE_BATCH_ID").as_deref().map(str::trim) {
            None => defaults.batch_policy,
            Some("true") => BatchPolicy::RejectSentinel,
            Some("false") => BatchPolicy::AcceptAll,
            Some(other) => eyre::bail!("invalid `VALIDATE_BATCH_ID` environment variable: {other}"),
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs.trim().parse::<u64>().map_err(|e| {
                eyre::eyre!("invalid `REQUEST_TIMEOUT_SECS` environment variable {secs:?}: {e}")
            })?,
            None => defaults.request_timeout_secs,
        };

        let redis_url = lookup("REDIS_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            port,
            redis_url,
            batch_policy,
            request_timeout_secs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    InternalServerError,
}

impl ErrorCode {
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::InternalServerError => write!(f, "internal_server_error"),
        }
    }
}

/// Error returned by every route; rendered as `{"code": ..., "details": ...}`.
#[derive(Debug, Serialize)]
pub struct RequestError {
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl RequestError {
    #[must_use]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            details: Some(details.into()),
        }
    }

    #[must_use]
    pub fn not_found(details: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            details: Some(details.into()),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {details}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for RequestError {}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.code.status_code(), Json(self)).into_response()
    }
}

impl aide::OperationOutput for RequestError {
    type Inner = Self;
}

impl From<StoreError> for RequestError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = ?e, "store operation failed");
        Self {
            code: ErrorCode::InternalServerError,
            details: Some(e.to_string()),
        }
    }
}

// Anything going wrong while creating a case is fatal for the request.
impl From<CaseError> for RequestError {
    fn from(e: CaseError) -> Self {
        tracing::error!(error = ?e, "error creating scanned case");
        Self {
            code: ErrorCode::InternalServerError,
            details: Some(e.to_string()),
        }
    }
}
