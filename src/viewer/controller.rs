//! Viewer state machine
//!
//! Owns the session and the render scheduler. Every method is driven by a
//! browser event and returns what the page should do next, so the whole flow
//! can be exercised without a DOM.

use tracing::{debug, error, warn};

use super::scheduler::RenderScheduler;
use super::session::{AnalyticsPayload, ViewerSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Idle,
    Loading,
    Ready,
    Rendering,
    /// The document never loaded; the viewer stays inert
    Failed,
    Terminated,
}

/// Result of a prev/next click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// At a boundary or not navigable yet
    Unchanged,
    /// Start rendering this page now
    Render(u32),
    /// A render is busy; this page waits in the pending slot
    Queued(u32),
}

/// Page counter label and button state after a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub label: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PageControls {
    pub fn for_page(page: u32, total: u32) -> Self {
        Self {
            label: format!("Page {} of {}", page, total),
            prev_disabled: page <= 1,
            next_disabled: page >= total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Pending page to start rendering immediately
    pub next: Option<u32>,
    /// Only set when the settled render succeeded
    pub controls: Option<PageControls>,
}

#[derive(Debug)]
pub struct ViewerController {
    session: ViewerSession,
    scheduler: RenderScheduler,
    phase: ViewerPhase,
}

impl ViewerController {
    pub fn new(session: ViewerSession) -> Self {
        if session.session_id().is_none() {
            debug!("Analytics disabled: no session for this view");
        }
        Self {
            session,
            scheduler: RenderScheduler::new(),
            phase: ViewerPhase::Idle,
        }
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn phase(&self) -> ViewerPhase {
        match self.phase {
            ViewerPhase::Ready if self.scheduler.is_busy() => ViewerPhase::Rendering,
            phase => phase,
        }
    }

    /// Idle → Loading. Returns the document URL to open.
    pub fn begin_loading(&mut self) -> String {
        self.phase = ViewerPhase::Loading;
        self.session.document_url()
    }

    /// Loading → Ready. Returns the first page to render.
    pub fn document_loaded(&mut self, page_count: u32, now_ms: f64) -> Option<u32> {
        if self.phase != ViewerPhase::Loading {
            warn!(phase = ?self.phase, "Document resolved outside of loading");
            return None;
        }

        self.session.set_total_pages(page_count);
        self.phase = ViewerPhase::Ready;

        let first = self.session.current_page();
        let start = self.scheduler.request(first);
        self.session.record_view(first, now_ms);
        start
    }

    pub fn document_failed(&mut self, reason: &str) {
        error!(reason, "Error loading PDF");
        self.phase = ViewerPhase::Failed;
    }

    fn navigable(&self) -> bool {
        self.phase == ViewerPhase::Ready
    }

    pub fn prev_page(&mut self, now_ms: f64) -> Navigation {
        let page = self.session.current_page();
        if !self.navigable() || page <= 1 {
            return Navigation::Unchanged;
        }
        self.go_to(page - 1, now_ms)
    }

    pub fn next_page(&mut self, now_ms: f64) -> Navigation {
        let page = self.session.current_page();
        if !self.navigable() || page >= self.session.total_pages() {
            return Navigation::Unchanged;
        }
        self.go_to(page + 1, now_ms)
    }

    /// The view counts from the click, not from render completion
    fn go_to(&mut self, page: u32, now_ms: f64) -> Navigation {
        self.session.set_current_page(page);
        let navigation = match self.scheduler.request(page) {
            Some(page) => Navigation::Render(page),
            None => Navigation::Queued(page),
        };
        self.session.record_view(page, now_ms);
        navigation
    }

    /// A render of `page` settled, successfully or not
    pub fn render_finished(&mut self, page: u32, succeeded: bool) -> RenderOutcome {
        let next = self.scheduler.finish();
        let total = self.session.total_pages();
        let controls = succeeded.then(|| PageControls::for_page(page, total));
        RenderOutcome { next, controls }
    }

    /// Heartbeat tick; only visible tabs report
    pub fn heartbeat(&self, visible: bool, now_ms: f64) -> Option<AnalyticsPayload> {
        if !visible || self.phase == ViewerPhase::Terminated {
            return None;
        }
        self.analytics(false, now_ms)
    }

    /// Tab hidden or shown. Hiding reports; showing restarts the page timer.
    pub fn visibility_changed(&mut self, hidden: bool, now_ms: f64) -> Option<AnalyticsPayload> {
        if self.phase == ViewerPhase::Terminated {
            return None;
        }
        if hidden {
            return self.analytics(false, now_ms);
        }
        self.session.reset_page_timer(now_ms);
        None
    }

    /// Page teardown. Returns the final update, if analytics are enabled.
    pub fn unload(&mut self, now_ms: f64) -> Option<AnalyticsPayload> {
        if self.phase == ViewerPhase::Terminated {
            return None;
        }
        let payload = self.analytics(true, now_ms);
        self.phase = ViewerPhase::Terminated;
        payload
    }

    fn analytics(&self, is_final: bool, now_ms: f64) -> Option<AnalyticsPayload> {
        let payload = self.session.payload(is_final, now_ms);
        if payload.is_none() {
            warn!("No valid session ID for analytics tracking");
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::session::ViewerAttributes;
    use crate::viewer::telemetry::testing::RecordingTransport;
    use crate::viewer::telemetry::{Reporter, TrackRequest};

    fn controller(session_id: &str) -> ViewerController {
        let session = ViewerSession::from_attributes(
            ViewerAttributes {
                link_code: "abc123".to_string(),
                session_id: Some(session_id.to_string()),
                page_count: Some("3".to_string()),
                csrf_token: "tok".to_string(),
            },
            0.0,
        );
        ViewerController::new(session)
    }

    /// Loaded with `pages` pages and the first render settled
    fn ready(session_id: &str, pages: u32) -> ViewerController {
        let mut viewer = controller(session_id);
        viewer.begin_loading();
        assert_eq!(viewer.document_loaded(pages, 0.0), Some(1));
        viewer.render_finished(1, true);
        viewer
    }

    #[test]
    fn test_load_flow() {
        let mut viewer = controller("s1");
        assert_eq!(viewer.phase(), ViewerPhase::Idle);
        assert_eq!(viewer.begin_loading(), "/v/abc123/document.pdf");
        assert_eq!(viewer.phase(), ViewerPhase::Loading);

        // Attribute said 3, the document says 10
        assert_eq!(viewer.document_loaded(10, 100.0), Some(1));
        assert_eq!(viewer.session().total_pages(), 10);
        assert_eq!(viewer.phase(), ViewerPhase::Rendering);
        assert!(viewer.session().pages_viewed().contains(&1));

        let outcome = viewer.render_finished(1, true);
        assert_eq!(outcome.next, None);
        assert_eq!(
            outcome.controls,
            Some(PageControls {
                label: "Page 1 of 10".to_string(),
                prev_disabled: true,
                next_disabled: false,
            })
        );
        assert_eq!(viewer.phase(), ViewerPhase::Ready);
    }

    #[test]
    fn test_failed_load_is_inert() {
        let mut viewer = controller("s1");
        viewer.begin_loading();
        viewer.document_failed("404");
        assert_eq!(viewer.phase(), ViewerPhase::Failed);
        assert_eq!(viewer.next_page(0.0), Navigation::Unchanged);
        assert!(viewer.session().pages_viewed().is_empty());
    }

    #[test]
    fn test_navigation_before_load_ignored() {
        let mut viewer = controller("s1");
        viewer.begin_loading();
        assert_eq!(viewer.next_page(0.0), Navigation::Unchanged);
        assert_eq!(viewer.session().current_page(), 1);
    }

    #[test]
    fn test_rapid_navigation_renders_latest_only() {
        let mut viewer = controller("s1");
        viewer.begin_loading();
        assert_eq!(viewer.document_loaded(5, 0.0), Some(1));

        // Page 1 still rendering
        assert_eq!(viewer.next_page(1.0), Navigation::Queued(2));
        assert_eq!(viewer.next_page(2.0), Navigation::Queued(3));
        assert_eq!(viewer.next_page(3.0), Navigation::Queued(4));

        let outcome = viewer.render_finished(1, true);
        assert_eq!(outcome.next, Some(4));
        assert_eq!(outcome.controls.unwrap().label, "Page 1 of 5");

        let outcome = viewer.render_finished(4, true);
        assert_eq!(outcome.next, None);
        assert_eq!(outcome.controls.unwrap().label, "Page 4 of 5");

        // Views count on click, even for pages never drawn
        let viewed: Vec<u32> = viewer.session().pages_viewed().iter().copied().collect();
        assert_eq!(viewed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_revisits_do_not_grow_views() {
        let mut viewer = ready("s1", 3);
        assert_eq!(viewer.next_page(1.0), Navigation::Render(2));
        viewer.render_finished(2, true);
        assert_eq!(viewer.prev_page(2.0), Navigation::Render(1));
        viewer.render_finished(1, true);
        assert_eq!(viewer.next_page(3.0), Navigation::Render(2));
        viewer.render_finished(2, true);
        assert_eq!(viewer.next_page(4.0), Navigation::Render(3));
        viewer.render_finished(3, true);

        assert_eq!(viewer.session().pages_viewed().len(), 3);
        assert_eq!(viewer.session().page_start_ms(), 4.0);
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut viewer = ready("s1", 2);
        let before = viewer.session().page_start_ms();
        assert_eq!(viewer.prev_page(50.0), Navigation::Unchanged);
        assert_eq!(viewer.session().current_page(), 1);
        assert_eq!(viewer.session().page_start_ms(), before);
        assert_eq!(viewer.phase(), ViewerPhase::Ready);

        assert_eq!(viewer.next_page(60.0), Navigation::Render(2));
        let outcome = viewer.render_finished(2, true);
        let controls = outcome.controls.unwrap();
        assert!(!controls.prev_disabled);
        assert!(controls.next_disabled);

        assert_eq!(viewer.next_page(70.0), Navigation::Unchanged);
        assert_eq!(viewer.session().current_page(), 2);
        assert_eq!(viewer.session().page_start_ms(), 60.0);
        assert_eq!(viewer.phase(), ViewerPhase::Ready);
    }

    #[test]
    fn test_failed_render_releases_slot() {
        let mut viewer = controller("s1");
        viewer.begin_loading();
        viewer.document_loaded(3, 0.0);
        viewer.next_page(1.0);

        let outcome = viewer.render_finished(1, false);
        assert_eq!(outcome.controls, None);
        assert_eq!(outcome.next, Some(2));
    }

    #[test]
    fn test_heartbeat_only_when_visible() {
        let viewer = ready("s1", 3);
        assert!(viewer.heartbeat(false, 5000.0).is_none());

        let payload = viewer.heartbeat(true, 5000.0).unwrap();
        assert!(!payload.is_final);
        assert_eq!(payload.duration_seconds, 5);
        assert_eq!(payload.current_page, 1);
    }

    #[test]
    fn test_visibility_changes() {
        let mut viewer = ready("s1", 3);
        let payload = viewer.visibility_changed(true, 2000.0).unwrap();
        assert!(!payload.is_final);

        assert!(viewer.visibility_changed(false, 9000.0).is_none());
        assert_eq!(viewer.session().page_start_ms(), 9000.0);
    }

    #[test]
    fn test_unload_sends_final_once() {
        let mut viewer = ready("s1", 3);
        let payload = viewer.unload(12_345.0).unwrap();
        assert!(payload.is_final);
        assert_eq!(payload.duration_seconds, 12);
        assert_eq!(viewer.phase(), ViewerPhase::Terminated);

        assert!(viewer.unload(13_000.0).is_none());
        assert!(viewer.heartbeat(true, 14_000.0).is_none());
    }

    #[test]
    fn test_visibility_after_unload_is_silent() {
        let mut viewer = ready("s1", 3);
        viewer.unload(5000.0).unwrap();

        // The tab is hidden while the page tears down
        assert!(viewer.visibility_changed(true, 5100.0).is_none());
        assert!(viewer.visibility_changed(false, 5200.0).is_none());
        assert_eq!(viewer.session().page_start_ms(), 0.0);
        assert_eq!(viewer.phase(), ViewerPhase::Terminated);
    }

    #[test]
    fn test_placeholder_session_never_reports() {
        for placeholder in ["None", "null", ""] {
            let transport = RecordingTransport {
                beacon: true,
                ..Default::default()
            };
            let reporter = Reporter::new(transport.clone(), "/api/track/view", "tok");
            let report = |payload: Option<AnalyticsPayload>| {
                if let Some(payload) = payload {
                    reporter.report(&payload);
                }
            };

            let mut viewer = controller(placeholder);
            viewer.begin_loading();

            // The first render still happens
            assert_eq!(viewer.document_loaded(3, 0.0), Some(1));
            viewer.render_finished(1, true);
            assert_eq!(viewer.next_page(1000.0), Navigation::Render(2));
            viewer.render_finished(2, true);

            report(viewer.heartbeat(true, 5000.0));
            report(viewer.heartbeat(true, 10_000.0));
            report(viewer.visibility_changed(true, 11_000.0));
            report(viewer.visibility_changed(false, 11_500.0));
            report(viewer.unload(12_000.0));

            assert!(transport.sent.borrow().is_empty(), "{placeholder:?} reported");
        }
    }

    #[test]
    fn test_real_session_reaches_transport() {
        let transport = RecordingTransport {
            beacon: true,
            ..Default::default()
        };
        let reporter = Reporter::new(transport.clone(), "/api/track/view", "tok");

        let mut viewer = ready("s1", 3);
        for payload in [viewer.heartbeat(true, 5000.0), viewer.unload(6000.0)]
            .into_iter()
            .flatten()
        {
            reporter.report(&payload);
        }

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], TrackRequest::Json { .. }));
        assert!(matches!(sent[1], TrackRequest::Beacon { .. }));
    }
}
