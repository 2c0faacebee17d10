use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod result_page;

pub use result_page::ResultPage;

/// Identifier of the video platform a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u32);

impl ServiceId {
    pub const YOUTUBE: ServiceId = ServiceId(0);
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::YOUTUBE
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque cursor pointing at the next page of a search.
///
/// Only providers construct tokens; sessions hand them back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single search result as returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawItem {
    Stream(StreamItem),
    Channel(ChannelItem),
    Playlist(PlaylistItem),
    Other,
}

impl RawItem {
    pub fn as_stream(&self) -> Option<&StreamItem> {
        match self {
            RawItem::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

/// A playable video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamItem {
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub uploader_name: Option<String>,
    pub uploader_url: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub is_short: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelItem {
    pub url: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistItem {
    pub url: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub uploader_name: Option<String>,
    pub video_count: Option<u64>,
}

/// One page of raw results as handed over by a provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderPage {
    pub items: Vec<RawItem>,
    pub continuation: Option<ContinuationToken>,
    /// "Did you mean" text reported alongside the initial page
    pub search_suggestion: Option<String>,
    pub corrected_search: bool,
}

/// Playable stream metadata for a single video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamMetadata {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub uploader_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    pub hls_url: Option<String>,
    pub dash_url: Option<String>,
    pub video_streams: Vec<StreamVariant>,
    pub audio_streams: Vec<StreamVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamVariant {
    pub url: String,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub mime_type: Option<String>,
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub video_only: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

// ============================================================================
// Piped API Types
// ============================================================================

/// Response from GET /search and GET /nextpage/search
#[derive(Debug, Clone, Deserialize)]
pub struct PipedSearchResponse {
    #[serde(default)]
    pub items: Vec<PipedItem>,
    #[serde(default)]
    pub nextpage: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub corrected: bool,
}

/// Search result item, discriminated by its "type" field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PipedItem {
    Stream(PipedStream),
    Channel(PipedChannel),
    Playlist(PipedPlaylist),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedStream {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub uploader_name: Option<String>,
    #[serde(default)]
    pub uploader_url: Option<String>,
    /// Upload time in epoch milliseconds, -1 when unknown
    #[serde(default)]
    pub uploaded: Option<i64>,
    /// Duration in seconds, -1 for live streams
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub is_short: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipedChannel {
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subscribers: Option<i64>,
    #[serde(default)]
    pub videos: Option<i64>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedPlaylist {
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub uploader_name: Option<String>,
    #[serde(default)]
    pub videos: Option<i64>,
}

/// Piped reports unknown counters as negative numbers
fn non_negative(value: Option<i64>) -> Option<u64> {
    value.and_then(|v| u64::try_from(v).ok())
}

impl From<PipedItem> for RawItem {
    fn from(item: PipedItem) -> Self {
        match item {
            PipedItem::Stream(stream) => RawItem::Stream(StreamItem {
                url: stream.url,
                title: stream.title,
                thumbnail: stream.thumbnail,
                uploader_name: stream.uploader_name,
                uploader_url: stream.uploader_url,
                uploaded_at: stream
                    .uploaded
                    .filter(|millis| *millis > 0)
                    .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
                duration_secs: non_negative(stream.duration),
                view_count: non_negative(stream.views),
                is_short: stream.is_short,
            }),
            PipedItem::Channel(channel) => RawItem::Channel(ChannelItem {
                url: channel.url,
                name: channel.name,
                thumbnail: channel.thumbnail,
                description: channel.description,
                subscriber_count: non_negative(channel.subscribers),
                video_count: non_negative(channel.videos),
                verified: channel.verified,
            }),
            PipedItem::Playlist(playlist) => RawItem::Playlist(PlaylistItem {
                url: playlist.url,
                name: playlist.name,
                thumbnail: playlist.thumbnail,
                uploader_name: playlist.uploader_name,
                video_count: non_negative(playlist.videos),
            }),
            PipedItem::Unknown => RawItem::Other,
        }
    }
}

/// Response from GET /streams/{videoId}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedStreamDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub views: Option<i64>,
    #[serde(default)]
    pub hls: Option<String>,
    #[serde(default)]
    pub dash: Option<String>,
    #[serde(default)]
    pub video_streams: Vec<PipedStreamVariant>,
    #[serde(default)]
    pub audio_streams: Vec<PipedStreamVariant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedStreamVariant {
    pub url: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub bitrate: Option<i64>,
    #[serde(default)]
    pub video_only: bool,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<u32>,
}

impl From<PipedStreamVariant> for StreamVariant {
    fn from(variant: PipedStreamVariant) -> Self {
        StreamVariant {
            url: variant.url,
            format: variant.format,
            quality: variant.quality,
            mime_type: variant.mime_type,
            codec: variant.codec,
            bitrate: non_negative(variant.bitrate),
            video_only: variant.video_only,
            width: variant.width.filter(|w| *w > 0),
            height: variant.height.filter(|h| *h > 0),
            fps: variant.fps.filter(|f| *f > 0),
        }
    }
}

impl PipedStreamDetails {
    pub fn into_metadata(self, id: String) -> StreamMetadata {
        StreamMetadata {
            id,
            title: self.title,
            description: self.description,
            uploader: self.uploader,
            uploader_url: self.uploader_url,
            thumbnail_url: self.thumbnail_url,
            duration_secs: non_negative(self.duration),
            view_count: non_negative(self.views),
            upload_date: self.upload_date,
            hls_url: self.hls.filter(|url| !url.is_empty()),
            dash_url: self.dash.filter(|url| !url.is_empty()),
            video_streams: self.video_streams.into_iter().map(StreamVariant::from).collect(),
            audio_streams: self.audio_streams.into_iter().map(StreamVariant::from).collect(),
        }
    }
}
