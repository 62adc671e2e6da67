//! JavaScript bindings for PDF.js
//!
//! The page loads `pdfjsLib` globally; these bindings cover the four calls the
//! viewer needs: open a document, fetch a page, size a viewport, draw it.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{ClientError, Result};

#[wasm_bindgen]
extern "C" {
    pub type PdfLoadingTask;

    /// `pdfjsLib.getDocument(url)`
    #[wasm_bindgen(js_namespace = pdfjsLib, js_name = getDocument, catch)]
    fn get_document(src: &str) -> std::result::Result<PdfLoadingTask, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &PdfLoadingTask) -> js_sys::Promise;

    #[derive(Clone)]
    pub type PdfDocument;

    #[wasm_bindgen(method, getter, js_name = numPages)]
    pub fn num_pages(this: &PdfDocument) -> u32;

    #[wasm_bindgen(method, js_name = getPage)]
    fn get_page(this: &PdfDocument, number: u32) -> js_sys::Promise;

    pub type PdfPage;

    #[wasm_bindgen(method, js_name = getViewport)]
    fn get_viewport(this: &PdfPage, params: &JsValue) -> PdfViewport;

    #[wasm_bindgen(method)]
    fn render(this: &PdfPage, params: &JsValue) -> PdfRenderTask;

    pub type PdfViewport;

    #[wasm_bindgen(method, getter)]
    pub fn width(this: &PdfViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn height(this: &PdfViewport) -> f64;

    pub type PdfRenderTask;

    #[wasm_bindgen(method, getter = promise)]
    fn render_promise(this: &PdfRenderTask) -> js_sys::Promise;
}

#[derive(Serialize)]
struct ViewportParams {
    scale: f64,
}

/// Point PDF.js at its worker script
pub fn set_worker_src(src: &str) -> Result<()> {
    let lib = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("pdfjsLib"))?;
    if lib.is_undefined() {
        return Err(ClientError::Unavailable("pdfjsLib"));
    }
    let options = js_sys::Reflect::get(&lib, &JsValue::from_str("GlobalWorkerOptions"))?;
    js_sys::Reflect::set(
        &options,
        &JsValue::from_str("workerSrc"),
        &JsValue::from_str(src),
    )?;
    Ok(())
}

/// Load a document by URL
pub async fn open(url: &str) -> Result<PdfDocument> {
    let task = get_document(url)?;
    let document = JsFuture::from(task.promise()).await?;
    Ok(document.unchecked_into())
}

impl PdfDocument {
    pub async fn page(&self, number: u32) -> Result<PdfPage> {
        let page = JsFuture::from(self.get_page(number)).await?;
        Ok(page.unchecked_into())
    }
}

impl PdfPage {
    pub fn viewport(&self, scale: f64) -> Result<PdfViewport> {
        let params = serde_wasm_bindgen::to_value(&ViewportParams { scale })?;
        Ok(self.get_viewport(&params))
    }

    /// Draw into a 2D canvas context and wait for PDF.js to finish
    pub async fn draw(&self, canvas_context: &JsValue, viewport: &PdfViewport) -> Result<()> {
        let params = js_sys::Object::new();
        js_sys::Reflect::set(
            &params,
            &JsValue::from_str("canvasContext"),
            canvas_context,
        )?;
        js_sys::Reflect::set(&params, &JsValue::from_str("viewport"), viewport)?;

        JsFuture::from(self.render(&params).render_promise()).await?;
        Ok(())
    }
}
