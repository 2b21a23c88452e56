//! Page selection resolver
//!
//! Maps a selection mode and the page count to concrete zero-based indices,
//! then to the list of documents to build.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PdfToolError;
use crate::range::parse_range_groups;

pub const MERGED_FILE_NAME: &str = "merged.pdf";

/// How a range expression turns into output files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOutput {
    /// Every selected page in one `merged.pdf`
    #[default]
    Group,
    /// One file per selected page
    Each,
}

/// Which pages to operate on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PageSelection {
    /// Every page, natural order, one file per page
    All,
    /// A range expression such as `"1-3, 5"`
    Range {
        expression: String,
        #[serde(default)]
        output: RangeOutput,
    },
    /// Checked pages (zero-based), always taken in ascending order
    Manual { pages: BTreeSet<usize> },
    /// A user-defined order of zero-based indices, built into one file
    Reorder { order: Vec<usize> },
}

/// One output document to build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkUnit {
    pub name: String,
    /// Zero-based page indices, in output order
    pub pages: Vec<usize>,
}

impl WorkUnit {
    pub fn new(name: impl Into<String>, pages: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    /// Single-page output named after its original 1-based page number
    pub fn single_page(index: usize) -> Self {
        Self::new(page_file_name(index), vec![index])
    }
}

impl PageSelection {
    /// Resolve to groups of zero-based indices.
    ///
    /// Out-of-range entries of a range expression are dropped; for manual and
    /// reorder selections they are an error, as is an empty selection.
    pub fn resolve(&self, page_count: usize) -> Result<Vec<Vec<usize>>, PdfToolError> {
        match self {
            PageSelection::All => Ok(vec![(0..page_count).collect()]),
            PageSelection::Range { expression, .. } => {
                parse_range_groups(expression, page_count)
            }
            PageSelection::Manual { pages } => {
                if pages.is_empty() {
                    return Err(PdfToolError::EmptySelection);
                }
                check_bounds(pages.iter().copied(), page_count)?;
                Ok(vec![pages.iter().copied().collect()])
            }
            PageSelection::Reorder { order } => {
                if order.is_empty() {
                    return Err(PdfToolError::EmptySelection);
                }
                check_bounds(order.iter().copied(), page_count)?;
                Ok(vec![order.clone()])
            }
        }
    }

    /// Resolve and plan the output documents
    pub fn work_units(&self, page_count: usize) -> Result<Vec<WorkUnit>, PdfToolError> {
        self.work_units_at(page_count, Utc::now())
    }

    /// Same as [`PageSelection::work_units`] with an explicit clock for the
    /// reorder file name
    pub fn work_units_at(
        &self,
        page_count: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkUnit>, PdfToolError> {
        let groups = self.resolve(page_count)?;
        let units = match self {
            PageSelection::Range {
                output: RangeOutput::Group,
                ..
            } => vec![WorkUnit::new(MERGED_FILE_NAME, groups.concat())],
            PageSelection::Reorder { .. } => {
                vec![WorkUnit::new(reordered_file_name(now), groups.concat())]
            }
            PageSelection::All
            | PageSelection::Manual { .. }
            | PageSelection::Range {
                output: RangeOutput::Each,
                ..
            } => groups
                .into_iter()
                .flatten()
                .map(WorkUnit::single_page)
                .collect(),
        };
        // A group always yields its merged file, even an empty one
        if units.is_empty() {
            return Err(PdfToolError::EmptySelection);
        }
        Ok(units)
    }
}

/// Click-order-independent set of checked pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualPicker {
    checked: BTreeSet<usize>,
}

impl ManualPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the checkbox of `index`; returns whether it is now checked
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.checked.remove(&index) {
            false
        } else {
            self.checked.insert(index);
            true
        }
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.contains(&index)
    }

    pub fn clear(&mut self) {
        self.checked.clear();
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn to_selection(&self) -> PageSelection {
        PageSelection::Manual {
            pages: self.checked.clone(),
        }
    }
}

/// `page-{n}.pdf` for zero-based `index`
pub fn page_file_name(index: usize) -> String {
    format!("page-{}.pdf", index + 1)
}

/// `toolverse-reordered_{unix millis}.pdf`
pub fn reordered_file_name(now: DateTime<Utc>) -> String {
    format!("toolverse-reordered_{}.pdf", now.timestamp_millis())
}

fn check_bounds(
    indices: impl IntoIterator<Item = usize>,
    page_count: usize,
) -> Result<(), PdfToolError> {
    for index in indices {
        if index >= page_count {
            return Err(PdfToolError::PageOutOfRange {
                page: index + 1,
                page_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn names(units: &[WorkUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_all_is_one_file_per_page() {
        let units = PageSelection::All.work_units(3).unwrap();
        assert_eq!(names(&units), vec!["page-1.pdf", "page-2.pdf", "page-3.pdf"]);
        assert_eq!(units[2].pages, vec![2]);
    }

    #[test]
    fn test_range_group_mode_merges_in_token_order() {
        let selection = PageSelection::Range {
            expression: "1-2,4".into(),
            output: RangeOutput::Group,
        };
        let units = selection.work_units(5).unwrap();
        assert_eq!(units, vec![WorkUnit::new("merged.pdf", vec![0, 1, 3])]);
    }

    #[test]
    fn test_range_each_mode_one_file_per_page() {
        let selection = PageSelection::Range {
            expression: "1-2,4".into(),
            output: RangeOutput::Each,
        };
        let units = selection.work_units(5).unwrap();
        assert_eq!(names(&units), vec!["page-1.pdf", "page-2.pdf", "page-4.pdf"]);
    }

    #[test]
    fn test_out_of_bounds_range_contributes_nothing() {
        let selection = PageSelection::Range {
            expression: "7, 2".into(),
            output: RangeOutput::Each,
        };
        assert_eq!(names(&selection.work_units(5).unwrap()), vec!["page-2.pdf"]);
    }

    #[test]
    fn test_each_mode_selecting_nothing_is_empty_selection() {
        let selection = PageSelection::Range {
            expression: "7".into(),
            output: RangeOutput::Each,
        };
        assert!(selection.resolve(5).unwrap().concat().is_empty());
        assert!(matches!(
            selection.work_units(5),
            Err(PdfToolError::EmptySelection)
        ));
    }

    #[test]
    fn test_group_mode_selecting_nothing_builds_empty_merged_file() {
        let selection = PageSelection::Range {
            expression: "7".into(),
            output: RangeOutput::Group,
        };
        let units = selection.work_units(5).unwrap();
        assert_eq!(units, vec![WorkUnit::new("merged.pdf", vec![])]);
    }

    #[test]
    fn test_manual_is_ascending_regardless_of_clicks() {
        let mut picker = ManualPicker::new();
        picker.toggle(4);
        picker.toggle(0);
        picker.toggle(2);
        picker.toggle(3);
        picker.toggle(3);

        let units = picker.to_selection().work_units(5).unwrap();
        assert_eq!(names(&units), vec!["page-1.pdf", "page-3.pdf", "page-5.pdf"]);
    }

    #[test]
    fn test_empty_manual_rejected() {
        let err = ManualPicker::new().to_selection().resolve(5).unwrap_err();
        assert!(matches!(err, PdfToolError::EmptySelection));
    }

    #[test]
    fn test_manual_out_of_bounds_rejected() {
        let selection = PageSelection::Manual {
            pages: [1, 9].into_iter().collect(),
        };
        assert!(matches!(
            selection.resolve(5),
            Err(PdfToolError::PageOutOfRange { page: 10, .. })
        ));
    }

    #[test]
    fn test_reorder_single_timestamped_file() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let selection = PageSelection::Reorder {
            order: vec![2, 0, 1],
        };
        let units = selection.work_units_at(3, now).unwrap();
        assert_eq!(
            units,
            vec![WorkUnit::new(
                "toolverse-reordered_1700000000123.pdf",
                vec![2, 0, 1]
            )]
        );
    }

    #[test]
    fn test_selection_json_shape() {
        let selection: PageSelection =
            serde_json::from_str(r#"{"mode":"range","expression":"1-3","output":"each"}"#)
                .unwrap();
        assert_eq!(
            selection,
            PageSelection::Range {
                expression: "1-3".into(),
                output: RangeOutput::Each
            }
        );

        let selection: PageSelection =
            serde_json::from_str(r#"{"mode":"range","expression":"2"}"#).unwrap();
        assert!(matches!(
            selection,
            PageSelection::Range {
                output: RangeOutput::Group,
                ..
            }
        ));

        let selection: PageSelection = serde_json::from_str(r#"{"mode":"all"}"#).unwrap();
        assert_eq!(selection, PageSelection::All);
    }
}
