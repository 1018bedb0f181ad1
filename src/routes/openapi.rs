use aide::{axum::IntoApiResponse, openapi::OpenApi};
use axum::{Extension, Json};

pub async fn handler(Extension(api): Extension<OpenApi>) -> impl IntoApiResponse {
    Json(api)
}
