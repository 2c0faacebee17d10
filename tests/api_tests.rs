use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use streamseek::{
    api::AppState,
    models::{
        ChannelItem, ContinuationToken, ProviderPage, RawItem, ServiceId, StreamItem,
        StreamMetadata,
    },
    routes::create_router,
    services::providers::{ExtractionProvider, ProviderError, ProviderResult},
};

/// In-memory provider serving a fixed two-page search
#[derive(Default)]
struct StubProvider {
    initial_fetches: AtomicUsize,
}

fn stream(title: &str) -> RawItem {
    RawItem::Stream(StreamItem {
        url: format!("/watch?v={}", title),
        title: title.to_string(),
        thumbnail: None,
        uploader_name: Some("Uploader".to_string()),
        uploader_url: None,
        uploaded_at: None,
        duration_secs: Some(120),
        view_count: Some(1000),
        is_short: false,
    })
}

fn channel(name: &str) -> RawItem {
    RawItem::Channel(ChannelItem {
        url: format!("/channel/{}", name),
        name: name.to_string(),
        thumbnail: None,
        description: None,
        subscriber_count: Some(10),
        video_count: Some(3),
        verified: true,
    })
}

#[async_trait::async_trait]
impl ExtractionProvider for StubProvider {
    async fn fetch_initial_page(
        &self,
        service_id: ServiceId,
        query: &str,
    ) -> ProviderResult<ProviderPage> {
        self.initial_fetches.fetch_add(1, Ordering::SeqCst);
        if service_id != ServiceId::YOUTUBE {
            return Err(ProviderError::UnsupportedService(service_id));
        }
        if query == "broken" {
            return Err(ProviderError::Status {
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }

        Ok(ProviderPage {
            items: vec![stream("a1"), channel("c1"), stream("a2")],
            continuation: Some(ContinuationToken::new("page-2")),
            search_suggestion: None,
            corrected_search: false,
        })
    }

    async fn fetch_page(
        &self,
        _service_id: ServiceId,
        token: &ContinuationToken,
    ) -> ProviderResult<ProviderPage> {
        assert_eq!(token.as_str(), "page-2");
        Ok(ProviderPage {
            items: vec![stream("b1")],
            continuation: None,
            ..Default::default()
        })
    }

    async fn suggestions(&self, _service_id: ServiceId, query: &str) -> ProviderResult<Vec<String>> {
        Ok(vec![format!("{} tutorial", query), format!("{} news", query)])
    }

    async fn resolve_stream(
        &self,
        _service_id: ServiceId,
        url: &str,
    ) -> ProviderResult<StreamMetadata> {
        if !url.contains("youtu") {
            return Err(ProviderError::InvalidUrl(url.to_string()));
        }

        Ok(StreamMetadata {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Stub video".to_string(),
            description: None,
            uploader: None,
            uploader_url: None,
            thumbnail_url: None,
            duration_secs: Some(212),
            view_count: None,
            upload_date: None,
            hls_url: Some("https://stub/hls.m3u8".to_string()),
            dash_url: None,
            video_streams: vec![],
            audio_streams: vec![],
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server_with(max_sessions: usize) -> (TestServer, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider::default());
    let state = Arc::new(AppState::new(
        provider.clone(),
        max_sessions,
        Duration::from_secs(600),
    ));
    let app = create_router(state);
    (TestServer::new(app).unwrap(), provider)
}

fn create_test_server() -> TestServer {
    create_test_server_with(8).0
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_search_pagination_flow() {
    let server = create_test_server();

    // Open a session
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "  rust  " }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: Value = response.json();
    let session_id = created["session_id"].as_str().unwrap().to_string();
    assert_eq!(created["page"]["page_number"], 1);
    assert_eq!(created["page"]["has_more"], true);
    assert_eq!(created["page"]["total_streams"], 2);
    assert_eq!(created["page"]["streams"].as_array().unwrap().len(), 2);
    assert_eq!(created["page"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(created["page"]["items"][1]["type"], "channel");

    // Status reflects the first page
    let response = server.get(&format!("/api/v1/search/{}", session_id)).await;
    response.assert_status_ok();
    let status: Value = response.json();
    assert_eq!(status["query"], "rust");
    assert_eq!(status["phase"], "ready");
    assert_eq!(status["page_number"], 1);

    // Second and final page
    let response = server
        .post(&format!("/api/v1/search/{}/next", session_id))
        .await;
    response.assert_status_ok();
    let second: Value = response.json();
    assert_eq!(second["page"]["page_number"], 2);
    assert_eq!(second["page"]["has_more"], false);
    assert_eq!(second["page"]["total_streams"], 3);

    // Paging past the end
    let response = server
        .post(&format!("/api/v1/search/{}/next", session_id))
        .await;
    response.assert_status(StatusCode::GONE);

    let status: Value = server
        .get(&format!("/api/v1/search/{}", session_id))
        .await
        .json();
    assert_eq!(status["phase"], "exhausted");
    assert_eq!(status["page_number"], 2);

    // Close the session
    let response = server
        .delete(&format!("/api/v1/search/{}", session_id))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/v1/search/{}", session_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_search_query_rejected() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_provider_failure_maps_to_bad_gateway() {
    let server = create_test_server();
    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "broken" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "rust", "service_id": 3 }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_full_registry_skips_upstream_fetch() {
    let (server, provider) = create_test_server_with(1);

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "rust" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/search")
        .json(&json!({ "query": "go" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(provider.initial_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_status_poll_does_not_block_next_page() {
    let server = create_test_server();

    let created: Value = server
        .post("/api/v1/search")
        .json(&json!({ "query": "rust" }))
        .await
        .json();
    let session_id = created["session_id"].as_str().unwrap().to_string();

    server
        .get(&format!("/api/v1/search/{}", session_id))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/v1/search/{}/next", session_id))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let server = create_test_server();
    let response = server
        .post(&format!("/api/v1/search/{}/next", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggestions() {
    let server = create_test_server();

    let response = server.get("/api/v1/suggestions?q=rust").await;
    response.assert_status_ok();
    let suggestions: Vec<String> = response.json();
    assert_eq!(suggestions, vec!["rust tutorial", "rust news"]);

    let response = server.get("/api/v1/suggestions?q=%20%20").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_resolution() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/streams?url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ")
        .await;
    response.assert_status_ok();
    let metadata: Value = response.json();
    assert_eq!(metadata["id"], "dQw4w9WgXcQ");
    assert_eq!(metadata["duration_secs"], 212);

    let response = server
        .get("/api/v1/streams?url=https%3A%2F%2Fvimeo.com%2F1")
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let response = server.get("/api/v1/streams?url=").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            "x-request-id".parse::<axum::http::HeaderName>().unwrap(),
            request_id.parse::<axum::http::HeaderValue>().unwrap(),
        )
        .await;

    let echoed = response.headers().get("x-request-id").unwrap();
    assert_eq!(echoed.to_str().unwrap(), request_id);
}
