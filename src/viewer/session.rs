//! Viewer session state
//!
//! Everything the viewer knows about the current visit: which link is being
//! viewed, the analytics session it belongs to, and which pages were seen.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Placeholder values the server template renders when no session exists
const SESSION_SENTINELS: [&str; 3] = ["", "None", "null"];

/// Analytics session id. Only constructed from a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Normalize the raw `data-session-id` value. Missing values and the
    /// template placeholders disable analytics for the whole visit.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        if SESSION_SENTINELS.contains(&raw) {
            return None;
        }
        Some(SessionId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw data attributes of the `#viewerData` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerAttributes {
    pub link_code: String,
    pub session_id: Option<String>,
    pub page_count: Option<String>,
    pub csrf_token: String,
}

/// Leading-digit integer parse with a 0 fallback
pub fn parse_page_count(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else { return 0 };
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Analytics body posted to the tracking endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsPayload {
    pub session_id: SessionId,
    pub current_page: u32,
    pub pages_viewed: Vec<u32>,
    pub duration_seconds: u64,
    pub is_final: bool,
}

#[derive(Debug, Clone)]
pub struct ViewerSession {
    link_code: String,
    session_id: Option<SessionId>,
    csrf_token: String,
    total_pages: u32,
    current_page: u32,
    pages_viewed: BTreeSet<u32>,
    session_start_ms: f64,
    page_start_ms: f64,
}

impl ViewerSession {
    pub fn from_attributes(attributes: ViewerAttributes, now_ms: f64) -> Self {
        Self {
            session_id: SessionId::parse(attributes.session_id.as_deref()),
            total_pages: parse_page_count(attributes.page_count.as_deref()),
            link_code: attributes.link_code,
            csrf_token: attributes.csrf_token,
            current_page: 1,
            pages_viewed: BTreeSet::new(),
            session_start_ms: now_ms,
            page_start_ms: now_ms,
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn pages_viewed(&self) -> &BTreeSet<u32> {
        &self.pages_viewed
    }

    pub fn page_start_ms(&self) -> f64 {
        self.page_start_ms
    }

    /// `/v/{link}/document.pdf`
    pub fn document_url(&self) -> String {
        format!("/v/{}/document.pdf", urlencoding::encode(&self.link_code))
    }

    /// The loaded document's page count replaces the attribute value
    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total;
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page;
    }

    pub fn record_view(&mut self, page: u32, now_ms: f64) {
        self.pages_viewed.insert(page);
        self.page_start_ms = now_ms;
    }

    pub fn reset_page_timer(&mut self, now_ms: f64) {
        self.page_start_ms = now_ms;
    }

    pub fn elapsed_seconds(&self, now_ms: f64) -> u64 {
        ((now_ms - self.session_start_ms) / 1000.0).floor().max(0.0) as u64
    }

    /// `None` when analytics are disabled for this visit
    pub fn payload(&self, is_final: bool, now_ms: f64) -> Option<AnalyticsPayload> {
        let session_id = self.session_id.clone()?;
        Some(AnalyticsPayload {
            session_id,
            current_page: self.current_page,
            pages_viewed: self.pages_viewed.iter().copied().collect(),
            duration_seconds: self.elapsed_seconds(now_ms),
            is_final,
        })
    }
}
