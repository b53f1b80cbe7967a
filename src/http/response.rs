use crate::core::retry::RetryCategory;
use crate::http::PageRequest;
use chrono::prelude::*;
use std::collections::HashMap;
use url::Url;

/// A rendered page as captured by a fetcher.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url: Url,
    pub status: u16,
    pub content: String,
    /// Further captures taken while paginating, in the order they were taken.
    pub pages: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub retry_count: usize,
    pub retry_history: HashMap<RetryCategory, usize>,
    pub from_request: Box<PageRequest>,
}

impl PageResponse {
    pub fn new(request: &PageRequest, status: u16, content: String) -> Self {
        Self {
            url: request.url.clone(),
            status,
            content,
            pages: Vec::new(),
            timestamp: Utc::now(),
            retry_count: 0,
            retry_history: HashMap::new(),
            from_request: Box::new(request.clone()),
        }
    }

    /// Every capture, starting with the first load.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.content.as_str()).chain(self.pages.iter().map(String::as_str))
    }

    pub fn capture_count(&self) -> usize {
        1 + self.pages.len()
    }

    pub fn last_capture(&self) -> &str {
        self.pages.last().unwrap_or(&self.content)
    }

    pub fn size(&self) -> usize {
        self.captures().map(str::len).sum()
    }
}
