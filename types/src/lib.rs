#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every case UID is offset from this base; the remainder is the stub's counter.
pub const CASE_UID_BASE: u64 = 700_000_000_000;

/// Body of a "create scanned case" request as sent by the ingestion service.
///
/// The stub only ever looks at `batch_id`; the rest is here so consumers and the
/// generated OpenAPI document share one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScannedCaseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

/// Body of a successful "create scanned case" response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScannedCaseResponse {
    pub uid: String,
}

impl From<CaseUid> for ScannedCaseResponse {
    fn from(uid: CaseUid) -> Self {
        Self {
            uid: uid.to_string(),
        }
    }
}

/// A case UID as handed out by the stub: `CASE_UID_BASE + counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseUid(u64);

impl CaseUid {
    /// Builds the UID for a given counter value.
    ///
    /// # Errors
    /// Returns `CaseUidError::Overflow` if the counter would push the UID past `u64::MAX`.
    pub const fn from_counter(counter: u64) -> Result<Self, CaseUidError> {
        match CASE_UID_BASE.checked_add(counter) {
            Some(value) => Ok(Self(value)),
            None => Err(CaseUidError::Overflow(counter)),
        }
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The counter value this UID was derived from.
    #[must_use]
    pub const fn counter(self) -> u64 {
        self.0 - CASE_UID_BASE
    }
}

impl fmt::Display for CaseUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseUid {
    type Err = CaseUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CaseUidError::NotNumeric(s.to_owned()));
        }

        let value: u64 = s
            .parse()
            .map_err(|_| CaseUidError::NotNumeric(s.to_owned()))?;

        if value < CASE_UID_BASE {
            return Err(CaseUidError::BelowBase(value));
        }

        Ok(Self(value))
    }
}

impl TryFrom<&ScannedCaseResponse> for CaseUid {
    type Error = CaseUidError;

    fn try_from(response: &ScannedCaseResponse) -> Result<Self, Self::Error> {
        response.uid.parse()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaseUidError {
    #[error("case uid is not a decimal number: {0:?}")]
    NotNumeric(String),

    #[error("case uid {0} is below the base {base}", base = CASE_UID_BASE)]
    BelowBase(u64),

    #[error("counter {0} overflows the case uid range")]
    Overflow(u64),
}
