use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    Extension,
};
use tracing::Instrument;

use crate::{
    scanned_cases::{create_scanned_case, CaseOutcome},
    stores::Stores,
    utils::{GlobalConfig, RequestError},
};

/// The request body, unparsed. Whether it must be JSON depends on the batch policy.
pub struct RawBody(pub Bytes);

impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Bytes::from_request(req, state)
            .await
            .map(Self)
            .map_err(|e| RequestError::bad_request(e.body_text()))
    }
}

impl aide::OperationInput for RawBody {}

pub async fn handler(
    Extension(stores): Extension<Stores>,
    Extension(global_config): Extension<GlobalConfig>,
    RawBody(body): RawBody,
) -> Result<CaseOutcome, RequestError> {
    let span = tracing::debug_span!(
        "create_scanned_case",
        policy = ?global_config.batch_policy
    );

    Ok(create_scanned_case(&stores, global_config.batch_policy, &body)
        .instrument(span)
        .await?)
}

// NOTE: Integration tests for route handlers are in the `/tests` module
