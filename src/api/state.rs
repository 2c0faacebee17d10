use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    services::{
        providers::{ExtractionProvider, PipedProvider},
        SessionRegistry,
    },
};

/// Shared application state
pub struct AppState {
    pub provider: Arc<dyn ExtractionProvider>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Creates state around an already constructed provider
    pub fn new(
        provider: Arc<dyn ExtractionProvider>,
        max_sessions: usize,
        session_idle_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            sessions: SessionRegistry::new(max_sessions, session_idle_ttl),
        }
    }

    /// Builds the Piped-backed state described by the configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = PipedProvider::new(config.piped_api_url.clone(), config.request_timeout())?;

        tracing::info!(
            provider = provider.name(),
            api_url = %config.piped_api_url,
            max_sessions = config.max_sessions,
            session_idle_ttl_secs = config.session_idle_ttl_secs,
            "Extraction provider configured"
        );

        Ok(Self::new(
            Arc::new(provider),
            config.max_sessions,
            config.session_idle_ttl(),
        ))
    }
}
