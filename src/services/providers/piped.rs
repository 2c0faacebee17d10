/// Piped API provider
///
/// Speaks the JSON API exposed by Piped instances, which front YouTube.
///
/// API Flow:
/// 1. Initial search: /search?q=...&filter=all → items + `nextpage` cursor
/// 2. Further pages: /nextpage/search?nextpage=...&q=...&filter=all
/// 3. Suggestions: /suggestions?query=... → array of strings
/// 4. Streams: /streams/{videoId} → stream details
///
/// The next-page request URL is what travels inside a `ContinuationToken`, so the
/// session never needs to know about the query string or Piped's cursor format.
use crate::{
    models::{
        ContinuationToken, PipedSearchResponse, PipedStreamDetails, ProviderPage, RawItem,
        ServiceId, StreamMetadata,
    },
    services::providers::{ExtractionProvider, ProviderError, ProviderResult},
};
use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const SEARCH_FILTER: &str = "all";
const YOUTUBE_BASE: &str = "https://www.youtube.com";

#[derive(Clone)]
pub struct PipedProvider {
    http_client: HttpClient,
    api_url: String,
}

impl PipedProvider {
    pub fn new(api_url: String, timeout: Duration) -> ProviderResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("streamseek/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn ensure_supported(&self, service_id: ServiceId) -> ProviderResult<()> {
        if service_id == ServiceId::YOUTUBE {
            Ok(())
        } else {
            Err(ProviderError::UnsupportedService(service_id))
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> ProviderResult<Url> {
        let raw = format!("{}{}", self.api_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| ProviderError::Parse(format!("Invalid Piped API URL: {}", e)))
    }

    /// Builds the opaque token for the page after `nextpage`, if Piped returned one
    fn continuation_for(
        &self,
        query: &str,
        nextpage: Option<String>,
    ) -> ProviderResult<Option<ContinuationToken>> {
        match nextpage.filter(|cursor| !cursor.is_empty()) {
            Some(cursor) => {
                let url = self.endpoint(
                    "/nextpage/search",
                    &[
                        ("nextpage", cursor.as_str()),
                        ("q", query),
                        ("filter", SEARCH_FILTER),
                    ],
                )?;
                Ok(Some(ContinuationToken::new(url.as_str())))
            }
            None => Ok(None),
        }
    }

    /// Recovers the search query a continuation URL was built for
    fn query_of(token: &ContinuationToken) -> ProviderResult<String> {
        let url = Url::parse(token.as_str())
            .map_err(|e| ProviderError::Parse(format!("Malformed continuation token: {}", e)))?;

        url.query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| ProviderError::Parse("Continuation token carries no query".to_string()))
    }

    fn into_page(
        &self,
        query: &str,
        response: PipedSearchResponse,
    ) -> ProviderResult<ProviderPage> {
        let continuation = self.continuation_for(query, response.nextpage)?;

        Ok(ProviderPage {
            items: response.items.into_iter().map(RawItem::from).collect(),
            continuation,
            search_suggestion: response.suggestion.filter(|s| !s.is_empty()),
            corrected_search: response.corrected,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ProviderResult<T> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;
        tracing::debug!(bytes = response_text.len(), "Raw Piped API response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, "Failed to deserialize Piped response");
            ProviderError::Parse(e.to_string())
        })
    }
}

/// Extracts the YouTube video id from a watch, short, embed, live or youtu.be URL.
/// Relative Piped-style paths such as `/watch?v=...` are accepted too.
pub fn video_id_from_url(raw: &str) -> ProviderResult<String> {
    let invalid = || ProviderError::InvalidUrl(raw.to_string());

    let url = if raw.starts_with('/') {
        Url::parse(YOUTUBE_BASE).and_then(|base| base.join(raw))
    } else {
        Url::parse(raw)
    }
    .map_err(|_| invalid())?;

    let host = url.host_str().ok_or_else(invalid)?.trim_start_matches("www.");
    let mut segments = url.path_segments().ok_or_else(invalid)?;

    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("shorts") | Some("embed") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    };

    id.filter(|id| is_valid_video_id(id)).ok_or_else(invalid)
}

fn is_valid_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait::async_trait]
impl ExtractionProvider for PipedProvider {
    async fn fetch_initial_page(
        &self,
        service_id: ServiceId,
        query: &str,
    ) -> ProviderResult<ProviderPage> {
        self.ensure_supported(service_id)?;

        let url = self.endpoint("/search", &[("q", query), ("filter", SEARCH_FILTER)])?;
        let response: PipedSearchResponse = self.get_json(url).await?;
        let page = self.into_page(query, response)?;

        tracing::info!(
            query = %query,
            results = page.items.len(),
            has_more = page.continuation.is_some(),
            provider = "piped",
            "Initial search page fetched"
        );

        Ok(page)
    }

    async fn fetch_page(
        &self,
        service_id: ServiceId,
        token: &ContinuationToken,
    ) -> ProviderResult<ProviderPage> {
        self.ensure_supported(service_id)?;

        let query = Self::query_of(token)?;
        let url = Url::parse(token.as_str())
            .map_err(|e| ProviderError::Parse(format!("Malformed continuation token: {}", e)))?;

        let response: PipedSearchResponse = self.get_json(url).await?;
        let page = self.into_page(&query, response)?;

        tracing::info!(
            query = %query,
            results = page.items.len(),
            has_more = page.continuation.is_some(),
            provider = "piped",
            "Search page fetched"
        );

        Ok(page)
    }

    async fn suggestions(&self, service_id: ServiceId, query: &str) -> ProviderResult<Vec<String>> {
        self.ensure_supported(service_id)?;

        let url = self.endpoint("/suggestions", &[("query", query)])?;
        let suggestions: Vec<String> = self.get_json(url).await?;

        tracing::info!(
            query = %query,
            results = suggestions.len(),
            provider = "piped",
            "Suggestions fetched"
        );

        Ok(suggestions)
    }

    async fn resolve_stream(
        &self,
        service_id: ServiceId,
        url: &str,
    ) -> ProviderResult<StreamMetadata> {
        self.ensure_supported(service_id)?;

        let video_id = video_id_from_url(url)?;
        let endpoint = self.endpoint(&format!("/streams/{}", video_id), &[])?;
        let details: PipedStreamDetails = self.get_json(endpoint).await?;
        let metadata = details.into_metadata(video_id);

        tracing::info!(
            video_id = %metadata.id,
            video_streams = metadata.video_streams.len(),
            audio_streams = metadata.audio_streams.len(),
            provider = "piped",
            "Stream resolved"
        );

        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        "piped"
    }
}
