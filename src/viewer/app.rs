//! Viewer page wiring
//!
//! Binds [`ViewerController`] to the canvas, the navigation buttons, PDF.js,
//! the heartbeat timer and the page lifecycle events.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use tracing::{debug, error, info};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement, HtmlCanvasElement};

use super::controller::{Navigation, PageControls, ViewerController};
use super::pdfjs::{self, PdfDocument};
use super::session::{AnalyticsPayload, ViewerAttributes, ViewerSession};
use super::telemetry::{BrowserTransport, Reporter};
use crate::config::ViewerConfig;
use crate::dom;
use crate::error::{ClientError, Result};

const DATA_ELEMENT: &str = "viewerData";

pub struct ViewerApp {
    controller: RefCell<ViewerController>,
    document: RefCell<Option<PdfDocument>>,
    config: ViewerConfig,
    page: Document,
    canvas: HtmlCanvasElement,
    context: JsValue,
    page_info: Element,
    prev_button: HtmlButtonElement,
    next_button: HtmlButtonElement,
    reporter: Reporter<BrowserTransport>,
    heartbeat: RefCell<Option<Interval>>,
}

/// Read the `#viewerData` attributes once
fn read_attributes(page: &Document) -> Result<ViewerAttributes> {
    let element: Element = dom::element(page, DATA_ELEMENT)?;
    Ok(ViewerAttributes {
        link_code: element.get_attribute("data-link-code").unwrap_or_default(),
        session_id: element.get_attribute("data-session-id"),
        page_count: element.get_attribute("data-page-count"),
        csrf_token: element.get_attribute("data-csrf-token").unwrap_or_default(),
    })
}

impl ViewerApp {
    /// Set up the viewer and start loading the document
    pub fn mount(config: &ViewerConfig) -> Result<Rc<Self>> {
        let page = dom::document()?;
        let session = ViewerSession::from_attributes(read_attributes(&page)?, dom::now_ms());

        let canvas: HtmlCanvasElement = dom::element(&page, "pdfCanvas")?;
        let context = canvas
            .get_context("2d")?
            .ok_or(ClientError::Unavailable("2d canvas context"))?;

        let reporter = Reporter::new(
            BrowserTransport,
            config.track_endpoint.clone(),
            session.csrf_token().to_string(),
        );

        let app = Rc::new(Self {
            controller: RefCell::new(ViewerController::new(session)),
            document: RefCell::new(None),
            config: config.clone(),
            page_info: dom::element(&page, "pageInfo")?,
            prev_button: dom::element(&page, "prevPage")?,
            next_button: dom::element(&page, "nextPage")?,
            canvas,
            context: context.into(),
            page,
            reporter,
            heartbeat: RefCell::new(None),
        });

        app.attach_listeners()?;

        if let Err(e) = pdfjs::set_worker_src(&app.config.worker_src) {
            error!(error = %e, "Could not configure PDF.js worker");
        }

        let url = app.controller.borrow_mut().begin_loading();
        spawn_local(Rc::clone(&app).load(url));

        Ok(app)
    }

    fn attach_listeners(self: &Rc<Self>) -> Result<()> {
        let this = Rc::clone(self);
        dom::listen(&self.prev_button, "click", move |_| {
            let navigation = this.controller.borrow_mut().prev_page(dom::now_ms());
            this.navigate(navigation);
        })?;

        let this = Rc::clone(self);
        dom::listen(&self.next_button, "click", move |_| {
            let navigation = this.controller.borrow_mut().next_page(dom::now_ms());
            this.navigate(navigation);
        })?;

        let this = Rc::clone(self);
        dom::listen(&self.page, "visibilitychange", move |_| {
            let hidden = this.page.hidden();
            let payload = this
                .controller
                .borrow_mut()
                .visibility_changed(hidden, dom::now_ms());
            this.report(payload);
        })?;

        let window = dom::window()?;
        let this = Rc::clone(self);
        dom::listen(&window, "beforeunload", move |_| {
            let payload = this.controller.borrow_mut().unload(dom::now_ms());
            this.report(payload);
        })?;

        Ok(())
    }

    async fn load(self: Rc<Self>, url: String) {
        debug!(%url, "Loading document");
        let document = match pdfjs::open(&url).await {
            Ok(document) => document,
            Err(e) => {
                self.controller.borrow_mut().document_failed(&e.to_string());
                return;
            }
        };

        let page_count = document.num_pages();
        *self.document.borrow_mut() = Some(document);
        info!(pages = page_count, "Document loaded");

        let first = self
            .controller
            .borrow_mut()
            .document_loaded(page_count, dom::now_ms());
        if let Some(page) = first {
            self.start_render(page);
        }
        self.start_heartbeat();
    }

    fn navigate(self: &Rc<Self>, navigation: Navigation) {
        match navigation {
            Navigation::Render(page) => self.start_render(page),
            Navigation::Queued(page) => debug!(page, "Render busy, page queued"),
            Navigation::Unchanged => {}
        }
    }

    fn start_render(self: &Rc<Self>, page: u32) {
        let this = Rc::clone(self);
        spawn_local(async move {
            let result = this.draw(page).await;
            if let Err(e) = &result {
                error!(page, error = %e, "Page render failed");
            }

            let outcome = this
                .controller
                .borrow_mut()
                .render_finished(page, result.is_ok());
            if let Some(next) = outcome.next {
                this.start_render(next);
            }
            if let Some(controls) = outcome.controls {
                this.apply_controls(&controls);
            }
        });
    }

    async fn draw(&self, number: u32) -> Result<()> {
        let document = self
            .document
            .borrow()
            .clone()
            .ok_or(ClientError::DocumentNotLoaded)?;

        let page = document.page(number).await?;
        let viewport = page.viewport(self.config.render_scale)?;
        self.canvas.set_height(viewport.height() as u32);
        self.canvas.set_width(viewport.width() as u32);

        page.draw(&self.context, &viewport).await
    }

    fn apply_controls(&self, controls: &PageControls) {
        self.page_info.set_text_content(Some(&controls.label));
        self.prev_button.set_disabled(controls.prev_disabled);
        self.next_button.set_disabled(controls.next_disabled);
    }

    fn start_heartbeat(self: &Rc<Self>) {
        let this = Rc::clone(self);
        let interval = Interval::new(self.config.heartbeat_interval_ms, move || {
            let visible = !this.page.hidden();
            let payload = this.controller.borrow().heartbeat(visible, dom::now_ms());
            this.report(payload);
        });
        *self.heartbeat.borrow_mut() = Some(interval);
    }

    fn report(&self, payload: Option<AnalyticsPayload>) {
        if let Some(payload) = payload {
            self.reporter.report(&payload);
        }
    }
}
