use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::request_id::{record_session_id, RequestId},
    models::{ResultPage, ServiceId},
    services::{SearchSession, SessionStatus},
};

#[derive(Debug, Deserialize)]
pub struct StartSearchRequest {
    pub query: String,
    #[serde(default)]
    pub service_id: ServiceId,
}

#[derive(Debug, Serialize)]
pub struct SearchPageResponse {
    pub session_id: Uuid,
    pub page: ResultPage,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub service_id: ServiceId,
    pub query: String,
    #[serde(flatten)]
    pub status: SessionStatus,
}

/// Handler that opens a search session and returns its first page
pub async fn start_search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<StartSearchRequest>,
) -> AppResult<(StatusCode, Json<SearchPageResponse>)> {
    let session = Arc::new(SearchSession::new(
        state.provider.clone(),
        request.service_id,
        &request.query,
    )?);

    tracing::info!(
        request_id = %request_id,
        query = %session.query(),
        service_id = %session.service_id(),
        "Starting search session"
    );

    // Refuse before spending an upstream round-trip; only sessions with a
    // first page are registered
    state.sessions.ensure_capacity().await?;
    let page = session.spawn_start().await?;
    let session_id = state.sessions.insert(session).await?;
    record_session_id(&session_id);

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        streams = page.streams().len(),
        "Search session opened"
    );

    Ok((
        StatusCode::CREATED,
        Json(SearchPageResponse { session_id, page }),
    ))
}

/// Handler that fetches the next page of an open session
pub async fn next_page(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SearchPageResponse>> {
    record_session_id(&session_id);
    let session = state.sessions.get(&session_id).await?;

    let page = session.spawn_next().await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        page_number = page.page_number(),
        "Search page served"
    );

    Ok(Json(SearchPageResponse { session_id, page }))
}

/// Handler reporting pagination state of an open session
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionStatusResponse>> {
    record_session_id(&session_id);
    let session = state.sessions.get(&session_id).await?;

    Ok(Json(SessionStatusResponse {
        session_id,
        service_id: session.service_id(),
        query: session.query().to_string(),
        status: session.status(),
    }))
}

/// Handler that discards an open session
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    record_session_id(&session_id);
    if state.sessions.remove(&session_id).await {
        tracing::debug!(session_id = %session_id, "Search session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("search session {}", session_id)))
    }
}
