use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    api::AppState,
    error::AppResult,
    models::{ServiceId, StreamMetadata},
    services::stream_resolver,
};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    url: String,
    #[serde(default)]
    service_id: ServiceId,
}

/// Handler resolving a video URL into stream metadata
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StreamQuery>,
) -> AppResult<Json<StreamMetadata>> {
    let metadata =
        stream_resolver::resolve_stream(state.provider.clone(), params.service_id, &params.url)
            .await?;
    Ok(Json(metadata))
}
