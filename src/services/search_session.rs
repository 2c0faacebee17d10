use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::{ContinuationToken, ProviderPage, ResultPage, ServiceId},
    services::{bridge::FetchTask, providers::ExtractionProvider},
};

/// Lifecycle of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No page fetched yet, including after a failed start
    NotStarted,
    /// At least one page fetched and a continuation is held
    Ready,
    /// The last fetch returned no continuation
    Exhausted,
}

/// Point-in-time view of a session's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub page_number: u32,
    pub has_more: bool,
    pub total_streams: usize,
}

/// Pagination state. Replaced wholesale, only after a fetch succeeds.
#[derive(Debug, Clone, Default)]
struct Cursor {
    continuation: Option<ContinuationToken>,
    page_number: u32,
    stream_count: usize,
}

impl Cursor {
    fn phase(&self) -> SessionPhase {
        match (self.page_number, &self.continuation) {
            (0, _) => SessionPhase::NotStarted,
            (_, Some(_)) => SessionPhase::Ready,
            (_, None) => SessionPhase::Exhausted,
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase(),
            page_number: self.page_number,
            has_more: self.continuation.is_some(),
            total_streams: self.stream_count,
        }
    }

    /// Computes the cursor and page that follow a successful fetch
    fn advance(&self, fetched: ProviderPage) -> (Cursor, ResultPage) {
        let page_number = self.page_number + 1;
        let has_more = fetched.continuation.is_some();

        let page = ResultPage::new(fetched.items, page_number, has_more, self.stream_count)
            .with_suggestion(fetched.search_suggestion, fetched.corrected_search);

        let next = Cursor {
            continuation: fetched.continuation,
            page_number,
            stream_count: page.total_streams(),
        };

        (next, page)
    }
}

/// Paginated search over one query on one platform.
///
/// At most one fetch runs per session: the cursor lock is taken with
/// `try_lock`, so an overlapping `start`/`next` fails with
/// [`AppError::ConcurrentAccess`] instead of racing on the continuation token.
/// The cursor is written only after the provider call has returned, which
/// makes dropping an in-flight future a clean cancellation.
///
/// Readers never touch the cursor lock. Each commit publishes a
/// [`SessionStatus`] snapshot that `status` and `has_more_results` copy out.
pub struct SearchSession {
    service_id: ServiceId,
    query: String,
    provider: Arc<dyn ExtractionProvider>,
    cursor: Mutex<Cursor>,
    snapshot: RwLock<SessionStatus>,
}

impl SearchSession {
    pub fn new(
        provider: Arc<dyn ExtractionProvider>,
        service_id: ServiceId,
        query: &str,
    ) -> AppResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidArgument(
                "Search query cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            service_id,
            query: query.to_string(),
            provider,
            cursor: Mutex::new(Cursor::default()),
            snapshot: RwLock::new(Cursor::default().status()),
        })
    }

    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the last successful fetch left a continuation behind.
    /// Never waits on an in-flight fetch.
    pub fn has_more_results(&self) -> bool {
        self.status().has_more
    }

    /// Committed state as of the last successful fetch. Never waits on an
    /// in-flight fetch and never contends with `start`/`next`.
    pub fn status(&self) -> SessionStatus {
        *self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the first page. Fails with `InvalidState` once a start has succeeded.
    #[tracing::instrument(skip(self), fields(query = %self.query, service_id = %self.service_id))]
    pub async fn start(&self) -> AppResult<ResultPage> {
        let mut cursor = self.acquire()?;

        if cursor.phase() != SessionPhase::NotStarted {
            return Err(AppError::InvalidState(
                "search session has already been started".to_string(),
            ));
        }

        let fetched = self
            .provider
            .fetch_initial_page(self.service_id, &self.query)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, provider = self.provider.name(), "Initial search fetch failed");
                AppError::SearchFailed(e)
            })?;

        Ok(self.commit(&mut cursor, fetched))
    }

    /// Fetches the page after the last one. Fails with `NoMoreResults`, without
    /// touching the network, when no continuation is held.
    #[tracing::instrument(skip(self), fields(query = %self.query, service_id = %self.service_id))]
    pub async fn next(&self) -> AppResult<ResultPage> {
        let mut cursor = self.acquire()?;

        let token = cursor
            .continuation
            .clone()
            .ok_or(AppError::NoMoreResults)?;

        let fetched = self
            .provider
            .fetch_page(self.service_id, &token)
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    page_number = cursor.page_number,
                    provider = self.provider.name(),
                    "Search page fetch failed"
                );
                AppError::SearchFailed(e)
            })?;

        Ok(self.commit(&mut cursor, fetched))
    }

    /// Runs [`SearchSession::start`] on the worker pool
    pub fn spawn_start(self: &Arc<Self>) -> FetchTask<ResultPage> {
        let session = Arc::clone(self);
        FetchTask::spawn(async move { session.start().await })
    }

    /// Runs [`SearchSession::next`] on the worker pool
    pub fn spawn_next(self: &Arc<Self>) -> FetchTask<ResultPage> {
        let session = Arc::clone(self);
        FetchTask::spawn(async move { session.next().await })
    }

    fn acquire(&self) -> AppResult<MutexGuard<'_, Cursor>> {
        self.cursor.try_lock().map_err(|_| {
            tracing::debug!(query = %self.query, "Rejected overlapping fetch");
            AppError::ConcurrentAccess
        })
    }

    fn commit(&self, cursor: &mut Cursor, fetched: ProviderPage) -> ResultPage {
        let (next, page) = cursor.advance(fetched);
        *cursor = next;
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = cursor.status();

        tracing::info!(
            page_number = page.page_number(),
            streams = page.streams().len(),
            items = page.items().len(),
            total_streams = page.total_streams(),
            has_more = page.has_more(),
            "Search page ready"
        );

        page
    }
}
