use crate::{
    error::{AppError, AppResult},
    models::{ServiceId, StreamMetadata},
    services::providers::ExtractionProvider,
};
use std::sync::Arc;

/// Resolves a video URL into playable stream metadata
pub async fn resolve_stream(
    provider: Arc<dyn ExtractionProvider>,
    service_id: ServiceId,
    url: &str,
) -> AppResult<StreamMetadata> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::InvalidArgument(
            "Stream URL cannot be empty".to_string(),
        ));
    }

    provider.resolve_stream(service_id, url).await.map_err(|e| {
        tracing::warn!(error = %e, url = %url, provider = provider.name(), "Stream resolution failed");
        AppError::SearchFailed(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockExtractionProvider, ProviderError};

    fn metadata(id: &str) -> StreamMetadata {
        StreamMetadata {
            id: id.to_string(),
            title: "Video".to_string(),
            description: None,
            uploader: None,
            uploader_url: None,
            thumbnail_url: None,
            duration_secs: Some(10),
            view_count: None,
            upload_date: None,
            hls_url: Some("https://piped.local/hls.m3u8".to_string()),
            dash_url: None,
            video_streams: vec![],
            audio_streams: vec![],
        }
    }

    #[tokio::test]
    async fn test_blank_url_never_reaches_provider() {
        let mut mock = MockExtractionProvider::new();
        mock.expect_resolve_stream().never();

        let result = resolve_stream(Arc::new(mock), ServiceId::YOUTUBE, "\t ").await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_delegates_to_provider() {
        let mut mock = MockExtractionProvider::new();
        mock.expect_resolve_stream()
            .times(1)
            .returning(|_, _| Ok(metadata("dQw4w9WgXcQ")));

        let resolved = resolve_stream(
            Arc::new(mock),
            ServiceId::YOUTUBE,
            "https://youtu.be/dQw4w9WgXcQ",
        )
        .await
        .unwrap();
        assert_eq!(resolved.id, "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_provider_failure_wrapped() {
        let mut mock = MockExtractionProvider::new();
        mock.expect_resolve_stream()
            .returning(|_, url| Err(ProviderError::InvalidUrl(url.to_string())));
        mock.expect_name().return_const("mock");

        let result = resolve_stream(Arc::new(mock), ServiceId::YOUTUBE, "https://vimeo.com/1").await;
        match result {
            Err(AppError::SearchFailed(ProviderError::InvalidUrl(url))) => {
                assert_eq!(url, "https://vimeo.com/1")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
