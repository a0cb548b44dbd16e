//! Inline formatting commands.
//!
//! # Responsibility
//! - Toggle the emphasis mark (bold weight + accent color) over the
//!   focused surface's selection.
//! - Toggle an unordered list via the surface's native semantics.
//!
//! # Invariants
//! - Emphasis marks never nest: a selection starting inside one unwraps it.
//! - An absent or collapsed selection makes the emphasis toggle a silent
//!   no-op; the list toggle accepts a caret.
//! - Command mutations are synchronous; the read-back into the draft is the
//!   session's deferred reconcile step.

use crate::editor::surface::{EditingSurface, Selection};
use crate::markup::Caret;

/// Attribute marking an emphasis span.
pub const EMPHASIS_ATTR: &str = "data-emphasis";
/// Attribute value carried by every emphasis span.
pub const EMPHASIS_ATTR_VALUE: &str = "1";
/// Fixed emphasis styling: bold weight plus the accent color.
pub const EMPHASIS_STYLE: &str = "font-weight:700;color:var(--accent-blue)";

/// One selection-scoped formatting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    ToggleEmphasis,
    ToggleBulletList,
}

/// Runs one command against the given surface.
pub fn apply_command(surface: &mut dyn EditingSurface, command: FormatCommand) {
    match command {
        FormatCommand::ToggleEmphasis => toggle_emphasis(surface),
        FormatCommand::ToggleBulletList => toggle_bullet_list(surface),
    }
}

/// Wraps the selection in an emphasis span, or unwraps the span the
/// selection starts in.
pub fn toggle_emphasis(surface: &mut dyn EditingSurface) {
    let Some(selection) = surface.selection() else {
        return;
    };
    if selection.is_collapsed() {
        return;
    }

    let enclosing =
        surface
            .document()
            .closest_with_attr(selection.start.node, EMPHASIS_ATTR, EMPHASIS_ATTR_VALUE);
    if let Some(mark) = enclosing {
        let parent = surface.document_mut().unwrap_element(mark);
        // Legacy caret behavior: collapse to the parent's leading edge, not
        // the original offset.
        surface.set_selection(Selection::caret(Caret::new(parent, 0)));
        return;
    }

    let fragment = surface.extract_selected_content();
    let mark = {
        let doc = surface.document_mut();
        let mark = doc.new_element(
            "span",
            vec![
                (EMPHASIS_ATTR.to_string(), EMPHASIS_ATTR_VALUE.to_string()),
                ("style".to_string(), EMPHASIS_STYLE.to_string()),
            ],
        );
        for node in fragment {
            doc.append_child(mark, node);
        }
        mark
    };
    let after = surface.insert_at_selection(&[mark]);
    surface.set_selection(Selection::caret(after));
}

/// Toggles an unordered list at the selection, deferring to the surface's
/// native list semantics.
pub fn toggle_bullet_list(surface: &mut dyn EditingSurface) {
    if surface.selection().is_none() {
        return;
    }
    surface.toggle_unordered_list();
}
