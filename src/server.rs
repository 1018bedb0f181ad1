use std::{net::SocketAddr, time::Duration};

use aide::openapi::{Info, OpenApi};
use axum::{http::StatusCode, Extension, Router};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{routes, stores::Stores, utils::GlobalConfig};

#[must_use]
pub fn get_timeout_layer(timeout: Option<u64>) -> TimeoutLayer {
    let timeout = timeout.map_or(Duration::from_secs(5), Duration::from_secs);
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Builds the full application: routes, OpenAPI document, shared state and layers.
pub fn app(stores: Stores, global_config: GlobalConfig) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Scanned Cases Stub".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    let timeout_layer = get_timeout_layer(Some(global_config.request_timeout_secs));

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(stores))
        .layer(Extension(global_config))
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(true)),
        )
        .layer(timeout_layer)
}

/// Binds `0.0.0.0:<port>` and serves the application until the process stops.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn start(stores: Stores, global_config: GlobalConfig) -> eyre::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], global_config.port));
    let backend = stores.backend_name();
    let policy = global_config.batch_policy;

    let listener = TcpListener::bind(&address).await?;

    tracing::info!(%address, backend, ?policy, "😈 Scanned cases stub started");

    axum::serve(
        listener,
        app(stores, global_config).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
