//! Editing-surface capability contract and the headless implementation.
//!
//! # Responsibility
//! - Define the capability interface the formatting commands and the edit
//!   session are written against: selection access, selected-content
//!   extraction, insertion at the selection, whole-content read/replace.
//! - Provide [`HeadlessSurface`], a display-free implementation backing the
//!   session and the test suite.
//!
//! # Invariants
//! - No rendering technology is referenced anywhere in this contract.
//! - `Selection` endpoints are supplied in document order by callers.

use crate::markup::{Caret, MarkupDocument, NodeId, ROOT};

/// A selection over a surface's markup tree.
///
/// `start` must not come after `end` in document order; a collapsed
/// selection (`start == end`) is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Caret,
    pub end: Caret,
}

impl Selection {
    pub fn new(start: Caret, end: Caret) -> Self {
        Self { start, end }
    }

    /// Collapsed selection at one position.
    pub fn caret(at: Caret) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Capability interface over one user-editable markup region.
///
/// Hosts with a real display implement this against their rendering layer;
/// the core only ever talks through it.
pub trait EditingSurface {
    /// The markup tree currently held by the surface.
    fn document(&self) -> &MarkupDocument;

    /// Mutable tree access for structural command edits.
    fn document_mut(&mut self) -> &mut MarkupDocument;

    /// Current selection, if the surface has one.
    fn selection(&self) -> Option<Selection>;

    fn set_selection(&mut self, selection: Selection);

    fn clear_selection(&mut self);

    /// Detaches the selected content and collapses the selection at the
    /// extraction point. Empty when there is no selection.
    fn extract_selected_content(&mut self) -> Vec<NodeId>;

    /// Inserts detached nodes at the selection start (surface end when no
    /// selection exists) and returns the caret after the inserted run.
    fn insert_at_selection(&mut self, nodes: &[NodeId]) -> Caret;

    /// Serialized markup content of the surface.
    fn markup(&self) -> String;

    /// Replaces the whole content, dropping any selection.
    fn replace_markup(&mut self, markup: &str);

    /// Host-native unordered-list toggle at the current selection.
    fn toggle_unordered_list(&mut self);

    /// Whether a multi-keystroke input composition is in progress.
    fn is_composing(&self) -> bool;
}

/// In-memory surface without a display.
///
/// List-toggle semantics: a caret inside a `ul` unwraps the list, items
/// re-joined with `<br/>`; otherwise the covered run is wrapped in
/// `<ul><li>…</li></ul>`.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    doc: MarkupDocument,
    selection: Option<Selection>,
    composing: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markup(markup: &str) -> Self {
        Self {
            doc: MarkupDocument::parse(markup),
            selection: None,
            composing: false,
        }
    }

    /// Host-side composition state, normally driven by input events.
    pub fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    fn unwrap_list(&mut self, list: NodeId) {
        let Some(parent) = self.doc.parent(list) else {
            return;
        };
        let Some(index) = self.doc.index_in_parent(list) else {
            return;
        };
        let (_, at) = self
            .doc
            .extract_range(Caret::new(parent, index), Caret::new(parent, index + 1));

        let mut replacement = Vec::new();
        let mut first_item = true;
        for child in self.doc.take_children(list) {
            if self.doc.tag(child) == Some("li") {
                if !first_item {
                    let br = self.doc.new_element("br", Vec::new());
                    replacement.push(br);
                }
                first_item = false;
                replacement.extend(self.doc.take_children(child));
            } else {
                replacement.push(child);
            }
        }
        self.doc.insert_fragment(at, &replacement);
        self.selection = Some(Selection::caret(Caret::new(parent, index)));
    }

    fn wrap_in_list(&mut self, selection: Selection) {
        let (start, end) = if selection.is_collapsed() {
            // A caret widens to the node it sits in.
            match self.doc.text(selection.start.node) {
                Some(text) => (
                    Caret::new(selection.start.node, 0),
                    Caret::new(selection.start.node, text.len()),
                ),
                None => (selection.start, selection.end),
            }
        } else {
            (selection.start, selection.end)
        };

        let (fragment, at) = self.doc.extract_range(start, end);
        let list = self.doc.new_element("ul", Vec::new());
        let item = self.doc.new_element("li", Vec::new());
        self.doc.append_child(list, item);
        for node in fragment {
            self.doc.append_child(item, node);
        }
        self.doc.insert_fragment(at, &[list]);
        let item_end = self.doc.children(item).len();
        self.selection = Some(Selection::caret(Caret::new(item, item_end)));
    }
}

impl EditingSurface for HeadlessSurface {
    fn document(&self) -> &MarkupDocument {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut MarkupDocument {
        &mut self.doc
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn extract_selected_content(&mut self) -> Vec<NodeId> {
        let Some(selection) = self.selection else {
            return Vec::new();
        };
        let (fragment, at) = self.doc.extract_range(selection.start, selection.end);
        self.selection = Some(Selection::caret(at));
        fragment
    }

    fn insert_at_selection(&mut self, nodes: &[NodeId]) -> Caret {
        let at = self.selection.map_or_else(
            || Caret::new(ROOT, self.doc.children(ROOT).len()),
            |selection| selection.start,
        );
        let after = self.doc.insert_fragment(at, nodes);
        self.selection = Some(Selection::caret(after));
        after
    }

    fn markup(&self) -> String {
        self.doc.to_markup()
    }

    fn replace_markup(&mut self, markup: &str) {
        self.doc = MarkupDocument::parse(markup);
        self.selection = None;
    }

    fn toggle_unordered_list(&mut self) {
        let Some(selection) = self.selection else {
            return;
        };
        match self.doc.closest_with_tag(selection.start.node, "ul") {
            Some(list) => self.unwrap_list(list),
            None => self.wrap_in_list(selection),
        }
    }

    fn is_composing(&self) -> bool {
        self.composing
    }
}
