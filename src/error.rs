//! Client error types
//!
//! Unified error handling for the browser glue. Everything that crosses the
//! `#[wasm_bindgen]` boundary is converted to a `JsValue` string.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Unified client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// A global browser object (window, document, body) is missing
    #[error("Browser API unavailable: {0}")]
    Unavailable(&'static str),

    /// Required element missing from the page
    #[error("Element not found: #{0}")]
    MissingElement(String),

    /// Element exists but is not of the expected type
    #[error("Element #{0} has an unexpected type")]
    ElementType(String),

    /// Exception raised by a JavaScript API
    #[error("JavaScript error: {0}")]
    Js(String),

    /// JSON encoding of an analytics payload failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Conversion between Rust and JS values failed
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Log filter directive could not be parsed or applied
    #[error("Invalid log filter: {0}")]
    LogFilter(String),

    /// A page was requested before the document finished loading
    #[error("PDF document is not loaded")]
    DocumentNotLoaded,
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        ClientError::Js(js_error_message(&value))
    }
}

impl From<serde_wasm_bindgen::Error> for ClientError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ClientError::Conversion(err.to_string())
    }
}

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort human readable message for a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
