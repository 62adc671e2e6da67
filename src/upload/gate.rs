//! Upload form wiring
//!
//! Connects the drop zone, the native file picker and the submit button to
//! [`UploadPolicy`]. The form itself still submits natively.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    DragEvent, Element, Event, File, FileList, HtmlButtonElement, HtmlElement, HtmlInputElement,
};

use super::policy::{FileDescriptor, UploadPolicy, Verdict};
use super::progress::{bar_width, SyntheticProgress};
use crate::config::{ProgressConfig, UploadConfig};
use crate::dom;
use crate::error::{js_error_message, Result};

const DRAG_EVENTS: [&str; 4] = ["dragenter", "dragover", "dragleave", "drop"];
const HIGHLIGHT_CLASSES: [&str; 2] = ["border-primary-500", "bg-primary-50"];

const UPLOADING_LABEL: &str = concat!(
    r#"<svg class="animate-spin h-5 w-5 inline-block mr-2" fill="none" viewBox="0 0 24 24">"#,
    r#"<circle class="opacity-25" cx="12" cy="12" r="10" stroke="currentColor" stroke-width="4"></circle>"#,
    r#"<path class="opacity-75" fill="currentColor" d="M4 12a8 8 0 018-8V0C5.373 0 0 5.373 0 12h4zm2 5.291A7.962 7.962 0 014 12H0c0 3.042 1.135 5.824 3 7.938l3-2.647z"></path>"#,
    r#"</svg> Uploading..."#,
);

pub struct UploadGate {
    policy: UploadPolicy,
    progress_config: ProgressConfig,
    drop_zone: HtmlElement,
    file_input: HtmlInputElement,
    feedback: HtmlElement,
    submit_button: HtmlButtonElement,
    progress_panel: HtmlElement,
    progress_bar: HtmlElement,
    progress_label: HtmlElement,
    ticker: RefCell<Option<Interval>>,
}

impl UploadGate {
    /// Find the form elements and attach all listeners
    pub fn mount(config: &UploadConfig) -> Result<Rc<Self>> {
        let document = dom::document()?;

        let gate = Rc::new(Self {
            policy: UploadPolicy::from(config),
            progress_config: config.progress.clone(),
            drop_zone: dom::element(&document, "dropZone")?,
            file_input: dom::element(&document, "file")?,
            feedback: dom::element(&document, "fileName")?,
            submit_button: dom::element(&document, "submitBtn")?,
            progress_panel: dom::element(&document, "uploadProgress")?,
            progress_bar: dom::element(&document, "progressBar")?,
            progress_label: dom::element(&document, "progressPercent")?,
            ticker: RefCell::new(None),
        });

        let form: Element = dom::element(&document, "uploadForm")?;
        let body = dom::body()?;

        for event in DRAG_EVENTS {
            dom::listen(&gate.drop_zone, event, suppress_default)?;
            dom::listen(&body, event, suppress_default)?;
        }

        for event in ["dragenter", "dragover"] {
            let this = Rc::clone(&gate);
            dom::listen(&gate.drop_zone, event, move |_| this.set_highlight(true))?;
        }
        for event in ["dragleave", "drop"] {
            let this = Rc::clone(&gate);
            dom::listen(&gate.drop_zone, event, move |_| this.set_highlight(false))?;
        }

        let this = Rc::clone(&gate);
        dom::listen(&gate.drop_zone, "drop", move |event| this.on_drop(&event))?;

        let this = Rc::clone(&gate);
        dom::listen(&gate.file_input, "change", move |_| {
            if let Some(file) = this.file_input.files().as_ref().and_then(first_file) {
                this.select(&file);
            }
        })?;

        let this = Rc::clone(&gate);
        dom::listen(&form, "submit", move |_| this.on_submit())?;

        debug!("Upload gate mounted");
        Ok(gate)
    }

    fn set_highlight(&self, on: bool) {
        let classes = self.drop_zone.class_list();
        let result = if on {
            classes.add_2(HIGHLIGHT_CLASSES[0], HIGHLIGHT_CLASSES[1])
        } else {
            classes.remove_2(HIGHLIGHT_CLASSES[0], HIGHLIGHT_CLASSES[1])
        };
        if let Err(e) = result {
            warn!(cause = %js_error_message(&e), "Could not toggle drop zone highlight");
        }
    }

    fn on_drop(&self, event: &Event) {
        let Some(files) = event
            .dyn_ref::<DragEvent>()
            .and_then(|e| e.data_transfer())
            .and_then(|dt| dt.files())
        else {
            return;
        };

        if let Some(file) = first_file(&files) {
            self.file_input.set_files(Some(&files));
            self.select(&file);
        }
    }

    /// Validate the chosen file and reflect the verdict in the form
    fn select(&self, file: &File) {
        let descriptor = FileDescriptor {
            name: file.name(),
            size_bytes: file.size() as u64,
            mime_type: file.type_(),
        };

        let verdict = self.policy.evaluate(&descriptor);
        debug!(file = %descriptor.name, allowed = verdict.allows_submit(), "File selected");

        if let Err(e) = self.show_verdict(&verdict) {
            warn!(error = %e, "Could not update file feedback");
        }
        self.submit_button.set_disabled(!verdict.allows_submit());
    }

    fn show_verdict(&self, verdict: &Verdict) -> Result<()> {
        self.feedback.set_text_content(Some(&verdict.message()));

        let classes = self.feedback.class_list();
        let (remove, add) = verdict.tone().class_changes();
        for class in remove {
            classes.remove_1(class)?;
        }
        for class in add {
            classes.add_1(class)?;
        }
        Ok(())
    }

    fn on_submit(self: &Rc<Self>) {
        let has_file = self
            .file_input
            .files()
            .map(|files| files.length() > 0)
            .unwrap_or(false);
        if !has_file {
            return;
        }

        if let Err(e) = self.progress_panel.class_list().remove_1("hidden") {
            warn!(cause = %js_error_message(&e), "Could not reveal upload progress");
        }
        self.submit_button.set_disabled(true);
        self.submit_button.set_inner_html(UPLOADING_LABEL);

        self.start_progress();
    }

    fn start_progress(self: &Rc<Self>) {
        let mut progress = SyntheticProgress::new(&self.progress_config);
        let this = Rc::clone(self);

        // Ticks past the ceiling are no-ops; page navigation ends the interval
        let interval = Interval::new(self.progress_config.interval_ms, move || {
            if let Some(percent) = progress.tick() {
                this.show_progress(percent);
            }
        });

        // Replacing a previous ticker cancels it
        *self.ticker.borrow_mut() = Some(interval);
    }

    fn show_progress(&self, percent: u8) {
        let width = bar_width(percent);
        if let Err(e) = self.progress_bar.style().set_property("width", &width) {
            warn!(cause = %js_error_message(&e), "Could not update progress bar");
        }
        self.progress_label.set_text_content(Some(&width));
    }
}

fn suppress_default(event: Event) {
    event.prevent_default();
    event.stop_propagation();
}

/// Only the first file of a multi-file selection is considered
fn first_file(files: &FileList) -> Option<File> {
    files.get(0)
}
