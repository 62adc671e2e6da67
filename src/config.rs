//! Configuration for the DocOne client
//!
//! Every JS entry point accepts an optional config object. Missing fields fall
//! back to the defaults below, which match what the server-rendered pages expect.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::{ClientError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Maximum upload size: 50MB
pub const MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// MIME types accepted by the upload form
pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Analytics ingestion endpoint
pub const TRACK_ENDPOINT: &str = "/api/track/view";

/// PDF.js worker script matching the library version loaded by the viewer page
pub const PDFJS_WORKER_SRC: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.11.174/pdf.worker.min.js";

/// Default tracing filter directive
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Config Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// `tracing` filter directive, e.g. `docone_web=debug`.
    /// When absent the active filter is left as it is.
    pub log_filter: Option<String>,
    pub notifications: NotificationConfig,
    pub upload: UploadConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationConfig {
    /// How long a toast stays fully visible
    pub display_ms: u32,
    /// Delay between fading out and detaching the toast
    pub fade_ms: u32,
    pub copy_success_message: String,
    pub copy_failure_message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_mime_types: Vec<String>,
    pub progress: ProgressConfig,
}

/// Synthetic upload progress animation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressConfig {
    pub step_percent: u8,
    pub interval_ms: u32,
    /// The bar never passes this value on its own
    pub ceiling_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub render_scale: f64,
    pub heartbeat_interval_ms: u32,
    pub track_endpoint: String,
    pub worker_src: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            log_filter: None,
            notifications: NotificationConfig::default(),
            upload: UploadConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            display_ms: 3000,
            fade_ms: 300,
            copy_success_message: "Link copied to clipboard!".to_string(),
            copy_failure_message: "Failed to copy link".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_size: MAX_UPLOAD_SIZE,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
            progress: ProgressConfig::default(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig {
            step_percent: 10,
            interval_ms: 200,
            ceiling_percent: 90,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            render_scale: 1.5,
            heartbeat_interval_ms: 5000,
            track_endpoint: TRACK_ENDPOINT.to_string(),
            worker_src: PDFJS_WORKER_SRC.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read a config object passed from JavaScript.
    /// `undefined` and `null` yield the defaults.
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: ClientConfig = serde_wasm_bindgen::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(ClientError::Config(msg.to_string()));

        if self.notifications.display_ms == 0 {
            return fail("notifications.displayMs must be positive");
        }
        if self.upload.max_file_size == 0 {
            return fail("upload.maxFileSize must be positive");
        }
        if self.upload.allowed_mime_types.is_empty() {
            return fail("upload.allowedMimeTypes must not be empty");
        }
        let progress = &self.upload.progress;
        if progress.step_percent == 0 || progress.interval_ms == 0 {
            return fail("upload.progress step and interval must be positive");
        }
        if progress.ceiling_percent > 100 {
            return fail("upload.progress.ceilingPercent must be at most 100");
        }
        if !(self.viewer.render_scale.is_finite() && self.viewer.render_scale > 0.0) {
            return fail("viewer.renderScale must be a positive number");
        }
        if self.viewer.heartbeat_interval_ms == 0 {
            return fail("viewer.heartbeatIntervalMs must be positive");
        }
        Ok(())
    }
}
