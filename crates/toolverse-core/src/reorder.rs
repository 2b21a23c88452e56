//! Drag-and-drop page ordering
//!
//! The board tracks the on-screen order of thumbnails as original 1-based
//! page numbers. Its [`ReorderBoard::pages_order`] is exactly what the
//! server-assisted reorder endpoint expects in its `pagesOrder` field.

use crate::error::PdfToolError;
use crate::selection::PageSelection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderBoard {
    order: Vec<u32>,
}

impl ReorderBoard {
    /// Natural order `1..=page_count`
    pub fn new(page_count: u32) -> Self {
        Self {
            order: (1..=page_count).collect(),
        }
    }

    /// Move the thumbnail at `from` to position `to`, shifting the ones in
    /// between (array-move semantics)
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), PdfToolError> {
        let len = self.order.len();
        if from >= len || to >= len {
            return Err(PdfToolError::InvalidRange(format!(
                "Cannot move position {} to {} ({} pages)",
                from, to, len
            )));
        }
        let page = self.order.remove(from);
        self.order.insert(to, page);
        Ok(())
    }

    /// Drop the thumbnail at `position`; returns its original page number
    pub fn remove_page(&mut self, position: usize) -> Result<u32, PdfToolError> {
        if position >= self.order.len() {
            return Err(PdfToolError::InvalidRange(format!(
                "No page at position {}",
                position
            )));
        }
        Ok(self.order.remove(position))
    }

    /// Current order as original 1-based page numbers
    pub fn pages_order(&self) -> &[u32] {
        &self.order
    }

    /// `pagesOrder` form field value, e.g. `[3,1,2]`
    pub fn pages_order_json(&self) -> String {
        serde_json::to_string(&self.order).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn to_selection(&self) -> PageSelection {
        PageSelection::Reorder {
            order: self.order.iter().map(|page| *page as usize - 1).collect(),
        }
    }
}

/// Parse a `pagesOrder` value (JSON array of 1-based page numbers) into
/// zero-based indices, checking each against the page count
pub fn parse_pages_order(json: &str, page_count: usize) -> Result<Vec<usize>, PdfToolError> {
    let pages: Vec<i64> = serde_json::from_str(json)
        .map_err(|e| PdfToolError::InvalidRange(format!("Invalid pagesOrder: {}", e)))?;
    if pages.is_empty() {
        return Err(PdfToolError::EmptySelection);
    }

    pages
        .into_iter()
        .map(|page| {
            if page < 1 || page as usize > page_count {
                Err(PdfToolError::PageOutOfRange {
                    page: page.max(0) as usize,
                    page_count,
                })
            } else {
                Ok(page as usize - 1)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_move_forward_and_back() {
        let mut board = ReorderBoard::new(5);
        board.move_page(0, 3).unwrap();
        assert_eq!(board.pages_order(), &[2, 3, 4, 1, 5]);
        board.move_page(4, 0).unwrap();
        assert_eq!(board.pages_order(), &[5, 2, 3, 4, 1]);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let mut board = ReorderBoard::new(2);
        assert!(board.move_page(0, 2).is_err());
        assert_eq!(board.pages_order(), &[1, 2]);
    }

    #[test]
    fn test_remove_page() {
        let mut board = ReorderBoard::new(3);
        assert_eq!(board.remove_page(1).unwrap(), 2);
        assert_eq!(board.pages_order(), &[1, 3]);
        assert!(board.remove_page(5).is_err());
    }

    #[test]
    fn test_pages_order_matches_final_thumbnail_order() {
        let mut board = ReorderBoard::new(4);
        board.move_page(3, 0).unwrap();
        board.move_page(2, 1).unwrap();
        assert_eq!(board.pages_order_json(), "[4,2,1,3]");
        assert_eq!(
            board.to_selection(),
            PageSelection::Reorder {
                order: vec![3, 1, 0, 2]
            }
        );
        assert_eq!(
            parse_pages_order(&board.pages_order_json(), 4).unwrap(),
            vec![3, 1, 0, 2]
        );
    }

    #[test]
    fn test_parse_pages_order_rejects_bad_input() {
        assert!(matches!(
            parse_pages_order("[]", 3),
            Err(PdfToolError::EmptySelection)
        ));
        assert!(matches!(
            parse_pages_order("[1,4]", 3),
            Err(PdfToolError::PageOutOfRange { page: 4, .. })
        ));
        assert!(parse_pages_order("[0]", 3).is_err());
        assert!(parse_pages_order("not json", 3).is_err());
    }
}
