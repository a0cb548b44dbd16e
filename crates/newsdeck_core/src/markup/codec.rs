//! Two-column storage codec.
//!
//! # Responsibility
//! - Serialize a left/right column pair into one canonical string.
//! - Recover the column pair from a stored string.
//!
//! # Invariants
//! - `parse_columns(serialize_columns(l, r, true)) == (l, r, split)` for any
//!   `l`, `r` free of the sentinel.
//! - `serialize_columns(l, _, false) == l`.
//! - Parsing is total: there is no malformed input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Reserved boundary token between the two stored columns.
///
/// A comment token so the renderer never displays it, and so it cannot be
/// typed into a surface as ordinary content.
pub const COLUMN_SPLIT_MARK: &str = "<!--COLUMN_SPLIT-->";

/// Line break appended before the sentinel when serializing the split form.
pub const COLUMN_BREAK: &str = "<br/>";

// One trailing line break, in any of the spellings a surface may produce.
static TRAILING_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>\s*$").expect("valid trailing break regex"));

/// Decoded column state of one stored description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnText {
    /// Left (primary) column markup.
    pub left: String,
    /// Right column markup. Empty whenever `is_split` is false.
    pub right: String,
    /// Whether the stored string carried the sentinel.
    pub is_split: bool,
}

/// Encodes a column pair into the canonical stored string.
///
/// Unsplit content is stored verbatim; `right` is ignored in that case and
/// callers must not rely on it surviving a round trip. The split form gets
/// one synthetic trailing break before the sentinel, which `parse_columns`
/// strips again.
pub fn serialize_columns(left: &str, right: &str, is_split: bool) -> String {
    if !is_split {
        return left.to_string();
    }
    format!("{left}{COLUMN_BREAK}{COLUMN_SPLIT_MARK}{right}")
}

/// Decodes a stored description into its column state.
///
/// Total over all strings: without the sentinel the whole input is the left
/// column. With the sentinel, exactly one trailing line break immediately
/// before it is stripped from the left part, so split -> unsplit -> split
/// toggling is lossless up to the break the codec itself inserted.
pub fn parse_columns(raw: &str) -> ColumnText {
    match raw.find(COLUMN_SPLIT_MARK) {
        None => ColumnText {
            left: raw.to_string(),
            right: String::new(),
            is_split: false,
        },
        Some(index) => {
            let left = TRAILING_BREAK_RE.replace(&raw[..index], "").into_owned();
            let right = raw[index + COLUMN_SPLIT_MARK.len()..].to_string();
            ColumnText {
                left,
                right,
                is_split: true,
            }
        }
    }
}
