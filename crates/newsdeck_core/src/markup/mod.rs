//! Rich-markup representation and the two-column storage codec.
//!
//! # Responsibility
//! - Hold the trusted markup an editing surface contains as a node tree.
//! - Convert between the two-column draft shape and the single canonical
//!   stored string.
//!
//! # Invariants
//! - Both parsers are total: every input string produces a valid value.
//! - The sentinel token never occurs in legitimately authored markup.

pub mod codec;
pub mod node;

pub use codec::{parse_columns, serialize_columns, ColumnText, COLUMN_SPLIT_MARK};
pub use node::{Caret, MarkupDocument, NodeId, NodeKind, ROOT};
