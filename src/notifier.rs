//! Toast notifications and clipboard copy
//!
//! Toasts are fire-and-forget: each one schedules its own fade and removal and
//! nothing deduplicates or limits them.

use gloo_timers::callback::Timeout;
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::config::NotificationConfig;
use crate::dom;
use crate::error::{js_error_message, Result};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["navigator", "clipboard"], js_name = writeText, catch)]
    async fn clipboard_write_text(text: &str) -> std::result::Result<JsValue, JsValue>;
}

const TOAST_BASE_CLASS: &str =
    "fixed top-4 right-4 px-6 py-3 rounded-lg shadow-lg text-white z-50 transition-opacity duration-300";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    /// Anything other than `"success"` is shown as an error
    pub fn parse(kind: &str) -> Self {
        if kind == "success" {
            NotificationKind::Success
        } else {
            NotificationKind::Error
        }
    }

    pub fn background_class(self) -> &'static str {
        match self {
            NotificationKind::Success => "bg-green-500",
            NotificationKind::Error => "bg-red-500",
        }
    }

    pub fn toast_class(self) -> String {
        format!("{} {}", TOAST_BASE_CLASS, self.background_class())
    }
}

/// Two-stage dismissal schedule for a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimings {
    /// Delay before the toast turns transparent
    pub fade_after_ms: u32,
    /// Delay after fading before it is detached
    pub remove_after_ms: u32,
}

impl From<&NotificationConfig> for ToastTimings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            fade_after_ms: config.display_ms,
            remove_after_ms: config.fade_ms,
        }
    }
}

pub struct Notifier {
    config: NotificationConfig,
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    /// Append a toast to the body and schedule its removal
    pub fn show(&self, message: &str, kind: NotificationKind) -> Result<()> {
        let document = dom::document()?;
        let body = dom::body()?;

        let toast: HtmlElement = document.create_element("div")?.unchecked_into();
        toast.set_class_name(&kind.toast_class());
        toast.set_text_content(Some(message));
        body.append_child(&toast)?;

        let timings = ToastTimings::from(&self.config);
        Timeout::new(timings.fade_after_ms, move || {
            if let Err(e) = toast.style().set_property("opacity", "0") {
                warn!(cause = %js_error_message(&e), "Could not fade notification");
            }
            Timeout::new(timings.remove_after_ms, move || toast.remove()).forget();
        })
        .forget();

        Ok(())
    }

    /// Write `text` to the system clipboard and report the outcome with a toast
    pub async fn copy_to_clipboard(&self, text: &str) {
        let (message, kind) = match clipboard_write_text(text).await {
            Ok(_) => (&self.config.copy_success_message, NotificationKind::Success),
            Err(e) => {
                error!(cause = %js_error_message(&e), "Could not copy text");
                (&self.config.copy_failure_message, NotificationKind::Error)
            }
        };

        if let Err(e) = self.show(message, kind) {
            error!(error = %e, "Could not show notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(NotificationKind::parse("success"), NotificationKind::Success);
        assert_eq!(NotificationKind::parse("error"), NotificationKind::Error);
        assert_eq!(NotificationKind::parse("Success"), NotificationKind::Error);
        assert_eq!(NotificationKind::parse(""), NotificationKind::Error);
    }

    #[test]
    fn test_toast_class() {
        let class = NotificationKind::Success.toast_class();
        assert!(class.starts_with("fixed top-4 right-4"));
        assert!(class.ends_with("bg-green-500"));
        assert!(NotificationKind::Error.toast_class().contains("bg-red-500"));
        assert!(!NotificationKind::Error.toast_class().contains("bg-green-500"));
    }

    #[test]
    fn test_timings_follow_config() {
        let timings = ToastTimings::from(&NotificationConfig::default());
        assert_eq!(timings.fade_after_ms, 3000);
        assert_eq!(timings.remove_after_ms, 300);
    }
}
