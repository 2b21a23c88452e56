//! Image converter and image-to-PDF sessions

use toolverse_core::Download;
use toolverse_image::{ImageConverter, ImagePdfOptions, ImageToPdf, TargetFormat};
use wasm_bindgen::prelude::*;

use crate::download::DownloadFile;
use crate::preview::JsProgress;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct ImageConvertSession {
    converter: ImageConverter,
    progress_callback: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl ImageConvertSession {
    /// `target` is a format name such as `"png"`, `"jpg"` or `"webp"`
    #[wasm_bindgen(constructor)]
    pub fn new(target: &str) -> Result<ImageConvertSession, JsValue> {
        let target: TargetFormat = target.parse().map_err(js_err)?;
        Ok(Self {
            converter: ImageConverter::new(target),
            progress_callback: None,
        })
    }

    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    #[wasm_bindgen(js_name = setTarget)]
    pub fn set_target(&mut self, target: &str) -> Result<(), JsValue> {
        self.converter.set_target(target.parse().map_err(js_err)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, name: &str, bytes: Vec<u8>) {
        self.converter.add(name, bytes);
    }

    #[wasm_bindgen(js_name = removeImage)]
    pub fn remove_image(&mut self, index: usize) -> Result<(), JsValue> {
        self.converter.remove(index).map(|_| ()).map_err(js_err)
    }

    pub fn clear(&mut self) {
        self.converter.clear();
    }

    /// Convert every image; returns how many succeeded
    #[wasm_bindgen(js_name = convertAll)]
    pub fn convert_all(&mut self) -> Result<usize, JsValue> {
        let mut sink = JsProgress::new(self.progress_callback.as_ref(), "convert");
        self.converter.convert_all(&mut sink).map_err(js_err)
    }

    /// Per-item `{ name, status, output_name, error }`
    pub fn states(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.converter.states()).map_err(js_err)
    }

    /// Download one converted item by index
    #[wasm_bindgen(js_name = downloadItem)]
    pub fn download_item(&self, index: usize) -> Result<DownloadFile, JsValue> {
        let output = self
            .converter
            .items()
            .get(index)
            .and_then(|item| item.output.clone())
            .ok_or_else(|| JsValue::from_str("Image is not converted yet"))?;
        Ok(DownloadFile::from(Download::from(output)))
    }

    /// All converted items, zipped when there is more than one
    pub fn bundle(&self) -> Result<DownloadFile, JsValue> {
        self.converter.bundle().map(DownloadFile::from).map_err(js_err)
    }
}

#[wasm_bindgen]
pub struct ImagePdfSession {
    packer: ImageToPdf,
    progress_callback: Option<js_sys::Function>,
}

impl Default for ImagePdfSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ImagePdfSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            packer: ImageToPdf::new(),
            progress_callback: None,
        }
    }

    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, name: &str, bytes: Vec<u8>) {
        self.packer.add(name, bytes);
    }

    #[wasm_bindgen(js_name = moveImage)]
    pub fn move_image(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.packer.move_image(from, to).map_err(js_err)
    }

    #[wasm_bindgen(js_name = removeImage)]
    pub fn remove_image(&mut self, index: usize) -> Result<(), JsValue> {
        self.packer.remove(index).map_err(js_err)
    }

    #[wasm_bindgen(js_name = imageCount)]
    pub fn image_count(&self) -> usize {
        self.packer.len()
    }

    /// Options: `{ page_size: "Auto"|"A4"|"Letter", quality, resize_ratio, file_name }`,
    /// any field may be omitted
    #[wasm_bindgen(js_name = estimatedSize)]
    pub fn estimated_size(&self, options: JsValue) -> Result<f64, JsValue> {
        let options = parse_options(options)?;
        Ok(self.packer.estimated_size_bytes(&options) as f64)
    }

    pub fn build(&self, options: JsValue) -> Result<DownloadFile, JsValue> {
        let options = parse_options(options)?;
        let mut sink = JsProgress::new(self.progress_callback.as_ref(), "pdf");
        let artifact = self.packer.build(&options, &mut sink).map_err(js_err)?;
        Ok(DownloadFile::from(Download::from(artifact)))
    }
}

fn parse_options(options: JsValue) -> Result<ImagePdfOptions, JsValue> {
    let options: Option<ImagePdfOptions> = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;
    resolve_options(options).map_err(|e| JsValue::from_str(&e))
}

/// Defaults for a missing options object, then range checks
fn resolve_options(options: Option<ImagePdfOptions>) -> Result<ImagePdfOptions, String> {
    let options = options.unwrap_or_default();
    options.validate().map_err(|e| e.to_string())?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use toolverse_image::PageSize;

    #[test]
    fn test_missing_options_use_defaults() {
        let options = resolve_options(None).unwrap();
        assert_eq!(options, ImagePdfOptions::default());
        assert_eq!(options.quality, 90);
        assert_eq!(options.resize_ratio, 100);
        assert_eq!(options.file_name, "converted");
    }

    #[test]
    fn test_partial_options_keep_other_defaults() {
        let partial: ImagePdfOptions =
            serde_json::from_str(r#"{"page_size":"A4","quality":70}"#).unwrap();
        let options = resolve_options(Some(partial)).unwrap();

        assert_eq!(options.page_size, PageSize::A4);
        assert_eq!(options.quality, 70);
        assert_eq!(options.resize_ratio, 100);
        assert_eq!(options.file_name, "converted");
    }

    #[test]
    fn test_out_of_range_quality_rejected() {
        let options = ImagePdfOptions {
            quality: 0,
            ..ImagePdfOptions::default()
        };
        assert!(resolve_options(Some(options)).unwrap_err().contains("quality"));
    }
}
