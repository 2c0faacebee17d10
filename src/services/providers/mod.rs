/// Extraction provider abstraction
///
/// A provider performs the platform-specific network fetch and parsing behind
/// search, suggestions and stream resolution. Sessions and services only ever
/// talk to the trait, so a different backend can be swapped in without
/// touching pagination logic.
use crate::models::{ContinuationToken, ProviderPage, ServiceId, StreamMetadata};

pub mod piped;

pub use piped::PipedProvider;

/// Failures raised by an extraction provider
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    #[error("Service {0} is not supported by this provider")]
    UnsupportedService(ServiceId),

    #[error("Unrecognised video URL: {0}")]
    InvalidUrl(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for extraction backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Fetch the first page of results for a query
    async fn fetch_initial_page(
        &self,
        service_id: ServiceId,
        query: &str,
    ) -> ProviderResult<ProviderPage>;

    /// Fetch the page a continuation token points at
    async fn fetch_page(
        &self,
        service_id: ServiceId,
        token: &ContinuationToken,
    ) -> ProviderResult<ProviderPage>;

    /// Autocomplete suggestions for a partial query
    async fn suggestions(&self, service_id: ServiceId, query: &str) -> ProviderResult<Vec<String>>;

    /// Resolve a video URL into playable stream metadata
    async fn resolve_stream(&self, service_id: ServiceId, url: &str)
        -> ProviderResult<StreamMetadata>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
