//! Image tools
//!
//! - [`convert`]: batch conversion between raster formats
//! - [`pdf`]: pack an ordered list of images into one PDF, one image per page

pub mod convert;
pub mod error;
pub mod format;
pub mod pdf;

pub use convert::{
    convert_image, output_name, ConvertItem, ConvertStatus, ImageConverter,
    CONVERTED_BUNDLE_NAME,
};
pub use error::ImageToolError;
pub use format::TargetFormat;
pub use pdf::{ImagePdfOptions, ImageToPdf, PageSize};
