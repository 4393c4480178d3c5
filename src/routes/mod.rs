pub mod api;

use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/pods", get(api::handle_list_pods))
        .route("/api/pods/{namespace}/{name}", get(api::handle_get_pod))
        .route(
            "/api/pods/{namespace}/{name}/logs",
            get(api::handle_get_pod_logs),
        )
        .route("/healthz", get(api::handle_healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
