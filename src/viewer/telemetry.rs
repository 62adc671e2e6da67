//! View analytics delivery
//!
//! Delivery is best effort. Failures are logged and dropped, never retried.
//! The final update goes out as a beacon so it survives page teardown.

use tracing::{debug, error, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{FormData, Headers, Request, RequestInit, Response};

use super::session::AnalyticsPayload;
use crate::dom;
use crate::error::{js_error_message, ClientError, Result};

/// Header carrying the anti-forgery token on JSON posts
pub const CSRF_HEADER: &str = "X-CSRFToken";
/// Form field carrying the anti-forgery token on beacons
pub const CSRF_FIELD: &str = "csrf_token";
/// Form field carrying the serialized payload on beacons
pub const DATA_FIELD: &str = "data";

/// A fully prepared analytics request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackRequest {
    /// `application/json` POST with the token in a header
    Json {
        endpoint: String,
        csrf_token: String,
        body: String,
    },
    /// `multipart/form-data` beacon with the token as a field
    Beacon {
        endpoint: String,
        csrf_token: String,
        data: String,
    },
}

impl TrackRequest {
    /// Final updates use a beacon when the browser has one
    pub fn build(
        payload: &AnalyticsPayload,
        endpoint: &str,
        csrf_token: &str,
        beacon_available: bool,
    ) -> Result<Self> {
        let body = serde_json::to_string(payload)?;
        let request = if payload.is_final && beacon_available {
            TrackRequest::Beacon {
                endpoint: endpoint.to_string(),
                csrf_token: csrf_token.to_string(),
                data: body,
            }
        } else {
            TrackRequest::Json {
                endpoint: endpoint.to_string(),
                csrf_token: csrf_token.to_string(),
                body,
            }
        };
        Ok(request)
    }
}

/// Network side of analytics delivery
pub trait AnalyticsTransport {
    fn beacon_available(&self) -> bool;

    /// Dispatch without waiting for a response
    fn send(&self, request: TrackRequest) -> Result<()>;
}

/// Builds requests for payloads and hands them to a transport
pub struct Reporter<T> {
    transport: T,
    endpoint: String,
    csrf_token: String,
}

impl<T: AnalyticsTransport> Reporter<T> {
    pub fn new(
        transport: T,
        endpoint: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            csrf_token: csrf_token.into(),
        }
    }

    pub fn report(&self, payload: &AnalyticsPayload) {
        let request = match TrackRequest::build(
            payload,
            &self.endpoint,
            &self.csrf_token,
            self.transport.beacon_available(),
        ) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "Analytics error");
                return;
            }
        };

        debug!(
            page = payload.current_page,
            is_final = payload.is_final,
            "Sending analytics update"
        );
        if let Err(e) = self.transport.send(request) {
            error!(error = %e, "Analytics error");
        }
    }
}

// ============================================================================
// Browser transport
// ============================================================================

/// `fetch` for regular updates, `navigator.sendBeacon` for the final one
pub struct BrowserTransport;

impl AnalyticsTransport for BrowserTransport {
    fn beacon_available(&self) -> bool {
        let Ok(window) = dom::window() else {
            return false;
        };
        js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("sendBeacon"))
            .unwrap_or(false)
    }

    fn send(&self, request: TrackRequest) -> Result<()> {
        match request {
            TrackRequest::Json {
                endpoint,
                csrf_token,
                body,
            } => post_json(&endpoint, &csrf_token, &body),
            TrackRequest::Beacon {
                endpoint,
                csrf_token,
                data,
            } => send_beacon(&endpoint, &csrf_token, &data),
        }
    }
}

fn post_json(endpoint: &str, csrf_token: &str, body: &str) -> Result<()> {
    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;
    headers.set(CSRF_HEADER, csrf_token)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(endpoint, &init)?;
    let promise = dom::window()?.fetch_with_request(&request);

    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(value) => {
                if let Ok(response) = value.dyn_into::<Response>() {
                    if !response.ok() {
                        warn!(status = response.status(), "Analytics update rejected");
                    }
                }
            }
            Err(e) => error!(cause = %js_error_message(&e), "Analytics error"),
        }
    });
    Ok(())
}

fn send_beacon(endpoint: &str, csrf_token: &str, data: &str) -> Result<()> {
    let form = FormData::new()?;
    form.append_with_str(CSRF_FIELD, csrf_token)?;
    form.append_with_str(DATA_FIELD, data)?;

    let queued = dom::window()?
        .navigator()
        .send_beacon_with_opt_form_data(endpoint, Some(&form))?;
    if !queued {
        return Err(ClientError::Js("sendBeacon refused the final update".to_string()));
    }
    Ok(())
}
