//! DocOne web client
//!
//! A WASM module that provides the interactive parts of the DocOne pages:
//! - Toast notifications and copy-link-to-clipboard on the dashboard
//! - Drag-and-drop upload with client-side type and size checks
//! - A PDF.js page viewer that reports view analytics
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mountViewer, mountUploadGate, copyToClipboard } from './pkg/docone_web.js';
//!
//! await init();
//!
//! // Viewer page (expects pdfjsLib to be loaded)
//! mountViewer();
//!
//! // Upload page, with a stricter limit
//! mountUploadGate({ upload: { maxFileSize: 10 * 1024 * 1024 } });
//!
//! // Dashboard
//! button.onclick = () => copyToClipboard(shareUrl);
//! ```

use wasm_bindgen::prelude::*;

pub mod config;
pub mod dom;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod upload;
pub mod viewer;

// Re-export common types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use notifier::{NotificationKind, Notifier};
pub use upload::{FileDescriptor, UploadGate, UploadPolicy, Verdict};
pub use viewer::{ViewerApp, ViewerController, ViewerSession};

/// Initialize the WASM module
/// Runs automatically when the module is instantiated
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in debug mode
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if let Err(e) = logging::init(config::DEFAULT_LOG_FILTER) {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
    }
}

/// Apply a config object passed from JS and return it
fn load_config(config: JsValue) -> Result<ClientConfig> {
    let config = ClientConfig::from_js(config)?;
    logging::apply(config.log_filter.as_deref())?;
    Ok(config)
}

/// Change the console log filter, e.g. `"docone_web=debug"`
#[wasm_bindgen(js_name = "setLogFilter")]
pub fn set_log_filter(directive: &str) -> std::result::Result<(), JsValue> {
    logging::set_filter(directive).map_err(JsValue::from)
}

/// The console log filter currently in effect
#[wasm_bindgen(js_name = "getLogFilter")]
pub fn get_log_filter() -> Option<String> {
    logging::current_filter()
}

/// Copy text to the clipboard and confirm with a toast
#[wasm_bindgen(js_name = "copyToClipboard")]
pub async fn copy_to_clipboard(
    text: String,
    config: JsValue,
) -> std::result::Result<(), JsValue> {
    let config = load_config(config)?;
    Notifier::new(config.notifications).copy_to_clipboard(&text).await;
    Ok(())
}

/// Show a toast. `kind` is `"success"` or `"error"`.
#[wasm_bindgen(js_name = "showNotification")]
pub fn show_notification(
    message: &str,
    kind: &str,
    config: JsValue,
) -> std::result::Result<(), JsValue> {
    let config = load_config(config)?;
    Notifier::new(config.notifications)
        .show(message, NotificationKind::parse(kind))
        .map_err(JsValue::from)
}

/// Human readable file size, as shown in the upload form
#[wasm_bindgen(js_name = "formatFileSize")]
pub fn format_file_size(bytes: f64) -> String {
    upload::format_file_size(bytes.max(0.0) as u64)
}

/// Attach drag-and-drop, validation and progress handling to the upload form
#[wasm_bindgen(js_name = "mountUploadGate")]
pub fn mount_upload_gate(config: JsValue) -> std::result::Result<(), JsValue> {
    let config = load_config(config)?;
    UploadGate::mount(&config.upload)?;
    Ok(())
}

/// Start the PDF viewer on the current page
#[wasm_bindgen(js_name = "mountViewer")]
pub fn mount_viewer(config: JsValue) -> std::result::Result<(), JsValue> {
    let config = load_config(config)?;
    ViewerApp::mount(&config.viewer)?;
    Ok(())
}

/// Get the library version
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
