use axum::{extract::Path, http::StatusCode, Extension, Json};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::scanned_cases::RawBody;
use crate::{stores::Stores, utils::RequestError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StorePath {
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StoreItemPath {
    pub name: String,
    pub key: String,
}

pub async fn load_all(
    Extension(stores): Extension<Stores>,
    Path(path): Path<StorePath>,
) -> Result<Json<Map<String, Value>>, RequestError> {
    Ok(Json(stores.open(&path.name).load_all().await?))
}

pub async fn load(
    Extension(stores): Extension<Stores>,
    Path(path): Path<StoreItemPath>,
) -> Result<Json<Value>, RequestError> {
    stores
        .open(&path.name)
        .load(&path.key)
        .await?
        .map(Json)
        .ok_or_else(|| {
            RequestError::not_found(format!("no item `{}` in store `{}`", path.key, path.name))
        })
}

pub async fn save(
    Extension(stores): Extension<Stores>,
    Path(path): Path<StoreItemPath>,
    RawBody(body): RawBody,
) -> Result<StatusCode, RequestError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| RequestError::bad_request(format!("store item is not valid JSON: {e}")))?;

    stores.open(&path.name).save(&path.key, value).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear(
    Extension(stores): Extension<Stores>,
    Path(path): Path<StorePath>,
) -> Result<StatusCode, RequestError> {
    stores.open(&path.name).clear().await?;

    Ok(StatusCode::NO_CONTENT)
}
