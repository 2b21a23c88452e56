use toolverse_core::Download;
use wasm_bindgen::prelude::*;

/// A file ready to be saved by the browser
#[wasm_bindgen]
pub struct DownloadFile {
    inner: Download,
}

#[wasm_bindgen]
impl DownloadFile {
    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.inner.mime.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.inner.bytes.len()
    }

    /// File contents as a Uint8Array
    pub fn bytes(&self) -> js_sys::Uint8Array {
        let array = js_sys::Uint8Array::new_with_length(self.inner.bytes.len() as u32);
        array.copy_from(&self.inner.bytes);
        array
    }
}

impl From<Download> for DownloadFile {
    fn from(inner: Download) -> Self {
        Self { inner }
    }
}
