//! Pack images into a PDF, one image per page
//!
//! Every image is re-encoded as baseline JPEG and embedded unchanged as a
//! `DCTDecode` image XObject, so the JPEG quality option directly controls
//! the output size.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};
use toolverse_core::package::OutputArtifact;
use toolverse_core::progress::{ProgressSink, ProgressTracker};

use crate::error::ImageToolError;

pub const DEFAULT_FILE_NAME: &str = "converted";
pub const DEFAULT_QUALITY: u8 = 90;

/// Points per CSS pixel
const POINTS_PER_PIXEL: f32 = 0.75;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    /// Each page takes the size of its image
    #[default]
    Auto,
    A4,
    Letter,
}

impl PageSize {
    /// Fixed page size in points, if any
    pub fn dimensions(self) -> Option<(f32, f32)> {
        match self {
            PageSize::Auto => None,
            PageSize::A4 => Some((595.28, 841.89)),
            PageSize::Letter => Some((612.0, 792.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePdfOptions {
    pub page_size: PageSize,
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// Drawn image width as a percentage of the page (or image) width, 1..=100
    pub resize_ratio: u8,
    /// Output base name without extension
    pub file_name: String,
}

impl Default for ImagePdfOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::Auto,
            quality: DEFAULT_QUALITY,
            resize_ratio: 100,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl ImagePdfOptions {
    pub fn validate(&self) -> Result<(), ImageToolError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ImageToolError::InvalidOption(format!(
                "quality must be 1-100, got {}",
                self.quality
            )));
        }
        if !(1..=100).contains(&self.resize_ratio) {
            return Err(ImageToolError::InvalidOption(format!(
                "resize ratio must be 1-100, got {}",
                self.resize_ratio
            )));
        }
        Ok(())
    }

    /// `{file_name}.pdf`, falling back to `converted.pdf`
    pub fn output_file_name(&self) -> String {
        let base = self.file_name.trim();
        let base = if base.is_empty() { DEFAULT_FILE_NAME } else { base };
        format!("{}.pdf", base)
    }

    fn scale(&self) -> f32 {
        self.resize_ratio as f32 / 100.0
    }
}

#[derive(Debug, Clone)]
struct ImageEntry {
    name: String,
    bytes: Vec<u8>,
}

/// Ordered list of images to pack
#[derive(Debug, Default)]
pub struct ImageToPdf {
    images: Vec<ImageEntry>,
}

impl ImageToPdf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.images.push(ImageEntry {
            name: name.into(),
            bytes,
        });
    }

    pub fn remove(&mut self, index: usize) -> Result<(), ImageToolError> {
        self.check_index(index)?;
        self.images.remove(index);
        Ok(())
    }

    /// Move the image at `from` to position `to`
    pub fn move_image(&mut self, from: usize, to: usize) -> Result<(), ImageToolError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let entry = self.images.remove(from);
        self.images.insert(to, entry);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.images.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn total_input_bytes(&self) -> u64 {
        self.images.iter().map(|e| e.bytes.len() as u64).sum()
    }

    /// Rough output size: input bytes scaled by ratio and quality
    pub fn estimated_size_bytes(&self, options: &ImagePdfOptions) -> u64 {
        let factor = (options.resize_ratio as f64 / 100.0) * (options.quality as f64 / 100.0);
        (self.total_input_bytes() as f64 * factor).round() as u64
    }

    /// Build the PDF, reporting progress after each image
    pub fn build(
        &self,
        options: &ImagePdfOptions,
        progress: &mut dyn ProgressSink,
    ) -> Result<OutputArtifact, ImageToolError> {
        options.validate()?;
        if self.images.is_empty() {
            return Err(ImageToolError::NoImages);
        }

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(self.images.len());
        let mut tracker = ProgressTracker::start(self.images.len(), progress);

        for entry in &self.images {
            let page_id = add_image_page(&mut doc, pages_id, entry, options)?;
            kids.push(Object::Reference(page_id));
            tracker.advance();
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ImageToolError::Encode(format!("Save failed: {}", e)))?;
        tracker.finish();

        let name = options.output_file_name();
        tracing::info!(file = %name, pages = count, size = bytes.len(), "images packed into PDF");
        Ok(OutputArtifact::pdf(name, bytes))
    }

    fn check_index(&self, index: usize) -> Result<(), ImageToolError> {
        if index >= self.images.len() {
            return Err(ImageToolError::IndexOutOfBounds {
                index,
                len: self.images.len(),
            });
        }
        Ok(())
    }
}

fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    entry: &ImageEntry,
    options: &ImagePdfOptions,
) -> Result<ObjectId, ImageToolError> {
    let decoded = image::load_from_memory(&entry.bytes)
        .map_err(|e| ImageToolError::Decode(format!("{}: {}", entry.name, e)))?;
    let (px_width, px_height) = (decoded.width(), decoded.height());

    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(decoded.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, options.quality))
        .map_err(|e| ImageToolError::Encode(e.to_string()))?;

    let scale = options.scale();
    let fixed = options.page_size.dimensions();
    let (page_width, page_height, draw_width, draw_height) = match fixed {
        Some((page_width, page_height)) => {
            let draw_width = page_width * scale;
            let draw_height = px_height as f32 * draw_width / px_width as f32;
            (page_width, page_height, draw_width, draw_height)
        }
        None => {
            let width = px_width as f32 * POINTS_PER_PIXEL * scale;
            let height = px_height as f32 * POINTS_PER_PIXEL * scale;
            (width, height, width, height)
        }
    };

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => px_width as i64,
            "Height" => px_height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    // Anchored to the top-left corner; PDF y grows upwards
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(draw_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(draw_height),
                    Object::Integer(0),
                    Object::Real(page_height - draw_height),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width),
            Object::Real(page_height),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => Object::Reference(image_id),
            },
        },
    });

    tracing::debug!(name = %entry.name, px_width, px_height, "added image page");
    Ok(page_id)
}
