//! Per-page handles extracted while loading a document

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::error::PdfToolError;

/// One page of a loaded document
#[derive(Debug, Clone, Serialize)]
pub struct PageHandle {
    /// Page number (1-indexed)
    pub number: u32,
    #[serde(skip)]
    pub object_id: ObjectId,
    /// Width in points (1 point = 1/72 inch)
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

impl PageHandle {
    /// Collect handles for every page, in page order
    pub fn all_from_document(doc: &Document) -> Result<Vec<Self>, PdfToolError> {
        doc.get_pages()
            .into_iter()
            .map(|(number, object_id)| Self::from_page(doc, number, object_id))
            .collect()
    }

    fn from_page(doc: &Document, number: u32, object_id: ObjectId) -> Result<Self, PdfToolError> {
        let page = doc.get_dictionary(object_id).map_err(|_| {
            PdfToolError::ParseError(format!("Page {} is not a dictionary", number))
        })?;

        let media_box = inherited(doc, page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|array| parse_box(array))
            // US Letter when the page tree does not say
            .unwrap_or([0.0, 0.0, 612.0, 792.0]);
        let width = (media_box[2] - media_box[0]).abs();
        let height = (media_box[3] - media_box[1]).abs();

        let rotation = inherited(doc, page, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(normalize_rotation)
            .unwrap_or(0);

        let (effective_width, effective_height) = if rotation == 90 || rotation == 270 {
            (height, width)
        } else {
            (width, height)
        };

        let orientation = if (effective_width - effective_height).abs() < 1.0 {
            PageOrientation::Square
        } else if effective_width > effective_height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };

        Ok(Self {
            number,
            object_id,
            width: width as f32,
            height: height as f32,
            rotation,
            orientation,
        })
    }
}

/// Look up an inheritable page attribute, walking up the `Parent` chain,
/// and resolve it if it is a reference
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    inherited_raw(doc, page, key).map(|value| resolve(doc, value))
}

/// Same as [`inherited`] but returns the attribute exactly as stored
pub(crate) fn inherited_raw<'a>(
    doc: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page;
    // Bounded walk; malformed files can contain Parent cycles
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn parse_box(array: &[Object]) -> Option<[f64; 4]> {
    if array.len() != 4 {
        return None;
    }
    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => return None,
        };
    }
    Some(result)
}

/// Snap a `/Rotate` value to the nearest quarter turn: 0, 90, 180 or 270
fn normalize_rotation(angle: i64) -> i32 {
    match (angle.rem_euclid(360) + 45) / 90 % 4 {
        1 => 90,
        2 => 180,
        3 => 270,
        _ => 0,
    }
}
