//! JS-backed collaborators for the loader
//!
//! Page rendering stays in pdf.js: Rust calls a JS function per page and
//! awaits the promise it returns.

use js_sys::{Function, Promise};
use toolverse_core::{PageRasterizer, ProgressSink};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Calls `render(pageNumber, scale) => Promise<string>` for every page
pub struct JsRasterizer {
    render: Function,
}

impl JsRasterizer {
    pub fn new(render: Function) -> Self {
        Self { render }
    }
}

impl PageRasterizer for JsRasterizer {
    async fn render_page(&mut self, page_number: u32, scale: f32) -> Result<String, String> {
        let value = self
            .render
            .call2(
                &JsValue::NULL,
                &JsValue::from(page_number),
                &JsValue::from(scale),
            )
            .map_err(js_error_message)?;

        let image = JsFuture::from(Promise::resolve(&value))
            .await
            .map_err(js_error_message)?;

        image
            .as_string()
            .ok_or_else(|| format!("Renderer returned no image for page {}", page_number))
    }
}

/// Forwards progress as `callback(percent, stage)`
pub struct JsProgress<'a> {
    callback: Option<&'a Function>,
    stage: &'static str,
}

impl<'a> JsProgress<'a> {
    pub fn new(callback: Option<&'a Function>, stage: &'static str) -> Self {
        Self { callback, stage }
    }
}

impl ProgressSink for JsProgress<'_> {
    fn report(&mut self, percent: u8) {
        if let Some(callback) = self.callback {
            let _ = callback.call2(
                &JsValue::NULL,
                &JsValue::from(percent),
                &JsValue::from_str(self.stage),
            );
        }
    }
}

fn js_error_message(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "Page render failed".to_string())
}
