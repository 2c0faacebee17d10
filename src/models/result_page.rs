use serde::Serialize;

use super::{RawItem, StreamItem};

/// Immutable outcome of one successful search fetch.
///
/// Built by the search session only; callers get read access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    streams: Vec<StreamItem>,
    items: Vec<RawItem>,
    page_number: u32,
    has_more: bool,
    total_streams: usize,
    search_suggestion: Option<String>,
    corrected_search: bool,
}

impl ResultPage {
    pub(crate) fn new(
        items: Vec<RawItem>,
        page_number: u32,
        has_more: bool,
        previous_streams: usize,
    ) -> Self {
        let streams = filter_streams(&items);
        let total_streams = previous_streams + streams.len();

        Self {
            streams,
            items,
            page_number,
            has_more,
            total_streams,
            search_suggestion: None,
            corrected_search: false,
        }
    }

    pub(crate) fn with_suggestion(mut self, suggestion: Option<String>, corrected: bool) -> Self {
        self.search_suggestion = suggestion;
        self.corrected_search = corrected;
        self
    }

    /// Stream items of this page, in provider order
    pub fn streams(&self) -> &[StreamItem] {
        &self.streams
    }

    /// Every raw item of this page, streams included
    pub fn items(&self) -> &[RawItem] {
        &self.items
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Stream items counted across all pages fetched so far
    pub fn total_streams(&self) -> usize {
        self.total_streams
    }

    pub fn search_suggestion(&self) -> Option<&str> {
        self.search_suggestion.as_deref()
    }

    pub fn is_corrected_search(&self) -> bool {
        self.corrected_search
    }
}

/// Keeps the stream items of a page, preserving their relative order
fn filter_streams(items: &[RawItem]) -> Vec<StreamItem> {
    items.iter().filter_map(RawItem::as_stream).cloned().collect()
}
