//! Batch image format conversion

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;
use toolverse_core::package::{package, Download, OutputArtifact};
use toolverse_core::progress::{ProgressSink, ProgressTracker};

use crate::error::ImageToolError;
use crate::format::TargetFormat;

pub const CONVERTED_BUNDLE_NAME: &str = "converted_images.zip";

/// JPEG quality used for format conversion (matches canvas `toBlob`)
const CONVERT_JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertStatus {
    Pending,
    Converting,
    Done,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConvertItem {
    pub name: String,
    pub bytes: Vec<u8>,
    pub status: ConvertStatus,
    pub output: Option<OutputArtifact>,
    pub error: Option<String>,
}

impl ConvertItem {
    fn new(name: String, bytes: Vec<u8>) -> Self {
        Self {
            name,
            bytes,
            status: ConvertStatus::Pending,
            output: None,
            error: None,
        }
    }

    fn reset(&mut self) {
        self.status = ConvertStatus::Pending;
        self.output = None;
        self.error = None;
    }
}

/// Per-item view handed to the UI
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemState {
    pub name: String,
    pub status: ConvertStatus,
    pub output_name: Option<String>,
    pub error: Option<String>,
}

/// A list of images and the format they should all be converted to
#[derive(Debug)]
pub struct ImageConverter {
    items: Vec<ConvertItem>,
    target: TargetFormat,
}

impl ImageConverter {
    pub fn new(target: TargetFormat) -> Self {
        Self {
            items: Vec::new(),
            target,
        }
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    /// Change the target; earlier results no longer apply
    pub fn set_target(&mut self, target: TargetFormat) {
        if self.target != target {
            self.target = target;
            self.items.iter_mut().for_each(ConvertItem::reset);
        }
    }

    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.items.push(ConvertItem::new(name.into(), bytes));
    }

    pub fn remove(&mut self, index: usize) -> Result<ConvertItem, ImageToolError> {
        if index >= self.items.len() {
            return Err(ImageToolError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ConvertItem] {
        &self.items
    }

    pub fn states(&self) -> Vec<ItemState> {
        self.items
            .iter()
            .map(|item| ItemState {
                name: item.name.clone(),
                status: item.status,
                output_name: item.output.as_ref().map(|o| o.name.clone()),
                error: item.error.clone(),
            })
            .collect()
    }

    /// Convert every item in order. A failing item is marked and skipped;
    /// the rest of the batch still runs. Returns the number converted.
    pub fn convert_all(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<usize, ImageToolError> {
        if self.items.is_empty() {
            return Err(ImageToolError::NoImages);
        }

        let target = self.target;
        let mut tracker = ProgressTracker::start(self.items.len(), progress);
        let mut converted = 0;

        for item in &mut self.items {
            item.reset();
            item.status = ConvertStatus::Converting;
            match convert_image(&item.bytes, target) {
                Ok(bytes) => {
                    item.output = Some(OutputArtifact {
                        name: output_name(&item.name, target),
                        mime: target.mime().to_string(),
                        bytes,
                    });
                    item.status = ConvertStatus::Done;
                    converted += 1;
                }
                Err(err) => {
                    tracing::warn!(name = %item.name, error = %err, "conversion failed");
                    item.error = Some(err.to_string());
                    item.status = ConvertStatus::Error;
                }
            }
            tracker.advance();
        }
        tracker.finish();

        tracing::info!(format = %target, converted, total = self.items.len(), "batch converted");
        Ok(converted)
    }

    /// Every finished output, one file directly or several as a zip
    pub fn bundle(&self) -> Result<Download, ImageToolError> {
        let outputs: Vec<OutputArtifact> = self
            .items
            .iter()
            .filter(|item| item.status == ConvertStatus::Done)
            .filter_map(|item| item.output.clone())
            .collect();
        Ok(package(outputs, CONVERTED_BUNDLE_NAME)?)
    }
}

/// Decode `bytes` (any supported format) and re-encode as `target`
pub fn convert_image(bytes: &[u8], target: TargetFormat) -> Result<Vec<u8>, ImageToolError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ImageToolError::Decode(e.to_string()))?;

    let mut output = Vec::new();
    if target.drops_alpha() {
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(
            &mut output,
            CONVERT_JPEG_QUALITY,
        ))
        .map_err(|e| ImageToolError::Encode(e.to_string()))?;
    } else {
        DynamicImage::ImageRgba8(decoded.to_rgba8())
            .write_to(&mut Cursor::new(&mut output), target.image_format())
            .map_err(|e| ImageToolError::Encode(e.to_string()))?;
    }
    Ok(output)
}

/// Original base name (last extension stripped) plus the target extension
pub fn output_name(name: &str, target: TargetFormat) -> String {
    let base = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    format!("{}.{}", base, target.extension())
}
