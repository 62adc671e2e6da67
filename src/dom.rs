//! Small helpers over `web-sys` shared by the three page behaviours

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement, Window};

use crate::error::{ClientError, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(ClientError::Unavailable("window"))
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(ClientError::Unavailable("document"))
}

pub fn body() -> Result<HtmlElement> {
    document()?.body().ok_or(ClientError::Unavailable("document.body"))
}

/// Look up an element by id and cast it to the expected type
pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| ClientError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| ClientError::ElementType(id.to_string()))
}

/// Attach a listener that lives as long as the page
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<()>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Milliseconds since the epoch, as `Date.now()`
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
