//! Stub of the Sirius "create scanned case" endpoint.
//!
//! Every accepted request is given the UID `CASE_UID_BASE + counter`, where the
//! counter lives in the `lpaIdStore` store and starts at 100. Rejected requests
//! never touch the counter.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scanned_cases_types::{CaseUid, CaseUidError, ScannedCaseResponse};
use serde_json::{json, Value};
use thiserror::Error;

use crate::stores::{Store, StoreError, Stores};

pub const COUNTER_STORE: &str = "lpaIdStore";
pub const COUNTER_KEY: &str = "counter";
pub const DEFAULT_COUNTER: u64 = 100;
pub const BAD_BATCH_ID: &str = "bad-batch";

/// Decides which requests are given a UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Every request is accepted; the body is never read.
    AcceptAll,
    /// Requests whose `batchId` is `"bad-batch"` are rejected.
    #[default]
    RejectSentinel,
}

impl BatchPolicy {
    /// Returns whether a request with this body should be given a UID.
    ///
    /// # Errors
    /// Returns `CaseError::MalformedBody` if the policy needs the body and it is not valid JSON
    /// (an empty body included), or `CaseError::NullBody` if it is `null`.
    pub fn admits(self, body: &[u8]) -> Result<bool, CaseError> {
        match self {
            Self::AcceptAll => Ok(true),
            Self::RejectSentinel => {
                let body: Value = serde_json::from_slice(body).map_err(CaseError::MalformedBody)?;
                if body.is_null() {
                    return Err(CaseError::NullBody);
                }

                Ok(body.get("batchId").and_then(Value::as_str) != Some(BAD_BATCH_ID))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("request body is null")]
    NullBody,

    #[error("stored counter is not a non-negative whole number: {0}")]
    InvalidCounter(Value),

    #[error(transparent)]
    Uid(#[from] CaseUidError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a single "create scanned case" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Created(CaseUid),
    Rejected,
}

impl IntoResponse for CaseOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Created(uid) => {
                (StatusCode::CREATED, Json(ScannedCaseResponse::from(uid))).into_response()
            }
            Self::Rejected => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
        }
    }
}

impl aide::OperationOutput for CaseOutcome {
    type Inner = ScannedCaseResponse;
}

/// Handles one "create scanned case" request against the session's stores.
///
/// # Errors
/// Returns a `CaseError` if the body is malformed (only under `BatchPolicy::RejectSentinel`) or
/// the counter cannot be read or written.
pub async fn create_scanned_case(
    stores: &Stores,
    policy: BatchPolicy,
    body: &[u8],
) -> Result<CaseOutcome, CaseError> {
    if !policy.admits(body)? {
        tracing::info!(batch_id = BAD_BATCH_ID, "rejecting scanned case");
        return Ok(CaseOutcome::Rejected);
    }

    let uid = issue_uid(&stores.open(COUNTER_STORE)).await?;
    tracing::info!(uid = %uid, "created scanned case");

    Ok(CaseOutcome::Created(uid))
}

/// Reads the counter (100 when unset), derives the UID from it and saves the counter plus one.
///
/// # Errors
/// Returns a `CaseError` if the stored counter is not a non-negative integer or the store fails.
pub async fn issue_uid(store: &Store) -> Result<CaseUid, CaseError> {
    let counter = match store.load(COUNTER_KEY).await? {
        None => DEFAULT_COUNTER,
        Some(value) => counter_value(&value).ok_or(CaseError::InvalidCounter(value))?,
    };

    let uid = CaseUid::from_counter(counter)?;
    store.save(COUNTER_KEY, json!(counter + 1)).await?;

    Ok(uid)
}

/// Whole numbers count as counters even when stored as floats (`100.0`).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn counter_value(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n < u64::MAX as f64)
            .map(|n| n as u64)
    })
}
