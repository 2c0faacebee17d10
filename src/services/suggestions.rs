use crate::{
    error::{AppError, AppResult},
    models::ServiceId,
    services::providers::ExtractionProvider,
};
use std::sync::Arc;

/// Autocomplete suggestions for a partial query
///
/// Blank input is rejected before the provider is consulted; provider failures
/// surface as `SearchFailed` with the cause attached.
pub async fn fetch_suggestions(
    provider: Arc<dyn ExtractionProvider>,
    service_id: ServiceId,
    query: &str,
) -> AppResult<Vec<String>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidArgument(
            "Suggestion query cannot be empty".to_string(),
        ));
    }

    provider
        .suggestions(service_id, query)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, query = %query, provider = provider.name(), "Suggestion lookup failed");
            AppError::SearchFailed(e)
        })
}
