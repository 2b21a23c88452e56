//! Range expression parsing
//!
//! A range expression is a comma-separated list of 1-based page numbers and
//! inclusive dash-ranges, e.g. `"1-3, 5, 8-10"`. Parsing yields one group of
//! zero-based indices per token, in token order, clipped to the page count.

use crate::error::PdfToolError;

/// Parse a range expression into groups of zero-based page indices.
///
/// * `a-b` produces the group `max(a,1)-1 ..= min(b,page_count)-1`, which may
///   be empty when the whole range lies past the end of the document.
/// * `n` produces `[n-1]` only when `1 <= n <= page_count`; otherwise nothing.
/// * Empty tokens (`"1,,2"`, trailing commas) are skipped.
///
/// Non-numeric bounds, extra dashes and inverted ranges are rejected.
///
/// ```
/// use toolverse_core::range::parse_range_groups;
///
/// let groups = parse_range_groups("1-2,4", 5).unwrap();
/// assert_eq!(groups, vec![vec![0, 1], vec![3]]);
/// ```
pub fn parse_range_groups(
    input: &str,
    page_count: usize,
) -> Result<Vec<Vec<usize>>, PdfToolError> {
    let mut groups = Vec::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once('-') {
            if end.contains('-') {
                return Err(PdfToolError::InvalidRange(format!(
                    "Too many dashes in '{}'",
                    token
                )));
            }
            let start = parse_bound(start, token)?;
            let end = parse_bound(end, token)?;

            if start > end {
                return Err(PdfToolError::InvalidRange(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }

            let first = start.max(1);
            let last = end.min(page_count);
            groups.push((first..=last).map(|page| page - 1).collect());
        } else {
            let page = parse_bound(token, token)?;
            if page >= 1 && page <= page_count {
                groups.push(vec![page - 1]);
            }
        }
    }

    Ok(groups)
}

/// Parse a range expression into one flat, token-ordered list of indices
pub fn parse_range_flat(input: &str, page_count: usize) -> Result<Vec<usize>, PdfToolError> {
    Ok(parse_range_groups(input, page_count)?
        .into_iter()
        .flatten()
        .collect())
}

fn parse_bound(raw: &str, token: &str) -> Result<usize, PdfToolError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| PdfToolError::InvalidRange(format!("Invalid page number in '{}'", token)))
}
