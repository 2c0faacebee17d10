use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{api::AppState, error::AppResult, models::ServiceId, services::suggestions};

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    q: String,
    #[serde(default)]
    service_id: ServiceId,
}

/// Handler for query autocompletion
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionQuery>,
) -> AppResult<Json<Vec<String>>> {
    let suggestions =
        suggestions::fetch_suggestions(state.provider.clone(), params.service_id, &params.q)
            .await?;
    Ok(Json(suggestions))
}
