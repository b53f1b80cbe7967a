use crate::core::spider::SpiderCallback;
use crate::parser::listing;
use crate::ScraperResult;
use scraper::Html;
use serde_json::Value;
use url::Url;

/// Something to do on a loaded page before its content is captured.
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    /// Click the first element matching the selector, then let the page settle.
    Click { selector: String },
    /// Scroll the window to a vertical offset in pixels.
    ScrollTo { y: i32 },
}

/// Steps back through a paged view inside one page session, capturing the
/// page after every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Control clicked to move one page back.
    pub control: String,
    /// Class marking the control as disabled.
    pub disabled_class: String,
    /// Control title shown once there is nothing further back.
    pub exhausted_title: String,
    /// Captures to take in total, the first one included.
    pub max_pages: usize,
}

impl Pagination {
    /// Whether the control in `content` leads to another page.
    pub fn can_advance(&self, content: &str) -> ScraperResult<bool> {
        let document = Html::parse_document(content);
        let state = listing::pager_state(
            &document,
            &self.control,
            &self.disabled_class,
            &self.exhausted_title,
        )?;
        Ok(state.can_paginate())
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: Url,
    pub callback: SpiderCallback,
    pub actions: Vec<PageAction>,
    /// Selector that must be present before the page counts as loaded.
    pub wait_for: Option<String>,
    pub pagination: Option<Pagination>,
    pub meta: Option<Value>,
    pub depth: usize,
}

impl PageRequest {
    pub fn new(url: Url, callback: SpiderCallback, depth: usize) -> Self {
        Self {
            url,
            callback,
            actions: Vec::new(),
            wait_for: None,
            pagination: None,
            meta: None,
            depth,
        }
    }

    pub fn with_wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    pub fn with_actions(mut self, actions: Vec<PageAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_action(mut self, action: PageAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_meta<T: serde::Serialize>(mut self, meta: T) -> ScraperResult<Self> {
        self.meta = Some(serde_json::to_value(meta)?);
        Ok(self)
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key)?.as_str()
    }

    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.meta.as_ref()?.get(key)?.as_u64()
    }

    /// Identity used for dedup and retry bookkeeping. Two requests for the
    /// same URL differ when they are parsed differently or when the page is
    /// driven into a different state before capture.
    pub fn fingerprint(&self) -> String {
        if self.actions.is_empty() {
            format!("{:?} {}", self.callback, self.url)
        } else {
            format!("{:?} {} {:?}", self.callback, self.url, self.actions)
        }
    }
}
