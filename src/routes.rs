use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use tower_http::trace::TraceLayer;

mod health;
mod openapi;
pub mod scanned_cases;
mod stores;

pub const SCANNED_CASES_PATH: &str = "/api/public/v1/scanned-cases";

pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route(SCANNED_CASES_PATH, post(scanned_cases::handler))
        .api_route("/health", get(health::handler))
        .api_route(
            "/system/store/{name}",
            get(stores::load_all).delete(stores::clear),
        )
        .api_route(
            "/system/store/{name}/{key}",
            get(stores::load).put(stores::save),
        )
        .route("/openapi.json", get(openapi::handler))
        // adds HTTP tracing & context to all routes
        .layer(TraceLayer::new_for_http())
}
