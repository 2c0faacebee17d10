use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::AppState,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
};

pub mod search;
pub mod streams;
pub mod suggestions;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            // Outermost first: the request id must exist before the trace span is made
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", post(search::start_search))
        .route(
            "/search/:session_id",
            get(search::session_status).delete(search::close_session),
        )
        .route("/search/:session_id/next", post(search::next_page))
        .route("/suggestions", get(suggestions::suggest))
        .route("/streams", get(streams::resolve))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
