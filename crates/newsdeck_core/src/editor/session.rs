//! Editing-session context: column-mode state machine plus the surface
//! synchronizer.
//!
//! # Responsibility
//! - Own one card's draft buffer, split flag and editing surfaces for the
//!   duration of an editing session.
//! - Keep the draft approximately current during editing and exactly
//!   current at flush time.
//!
//! # Invariants
//! - The draft buffer and split flag live only between session begin and
//!   end; every session re-derives them from the stored description.
//! - `flush()` is the only path guaranteed to reflect the literal latest
//!   surface content.
//! - The split flag changes only through `toggle_columns`.

use crate::editor::commands::{apply_command, FormatCommand};
use crate::editor::surface::{EditingSurface, HeadlessSurface};
use crate::markup::codec::COLUMN_BREAK;
use crate::markup::{parse_columns, serialize_columns};
use crate::model::card::CardId;
use log::{debug, info};

/// Column layout of the description being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMode {
    Unsplit,
    Split,
}

/// One of the two editing surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

/// Transient per-session column text, synchronized from the surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftBuffer {
    pub left: String,
    pub right: String,
}

/// Active editing session for one card.
///
/// Created on begin-edit, destroyed on end-edit (commit or cancel); there
/// is no ambient session state anywhere else.
#[derive(Debug)]
pub struct EditSession<S: EditingSurface> {
    card_id: CardId,
    description: String,
    mode: ColumnMode,
    draft: DraftBuffer,
    left: S,
    right: S,
    focused: Column,
    pending_reconcile: bool,
}

impl EditSession<HeadlessSurface> {
    /// Session over headless surfaces, the default for hosts without their
    /// own surface implementation.
    pub fn headless(card_id: CardId, stored_description: &str) -> Self {
        Self::begin(
            card_id,
            stored_description,
            HeadlessSurface::new(),
            HeadlessSurface::new(),
        )
    }
}

impl<S: EditingSurface> EditSession<S> {
    /// Begins editing: parses the stored description, populates the draft
    /// and pushes it into the surfaces.
    pub fn begin(card_id: CardId, stored_description: &str, left: S, right: S) -> Self {
        let parsed = parse_columns(stored_description);
        let mode = if parsed.is_split {
            ColumnMode::Split
        } else {
            ColumnMode::Unsplit
        };
        let mut session = Self {
            card_id,
            description: stored_description.to_string(),
            mode,
            draft: DraftBuffer {
                left: parsed.left,
                right: parsed.right,
            },
            left,
            right,
            focused: Column::Left,
            pending_reconcile: false,
        };
        session.push_draft_to_surfaces();
        info!(
            "event=edit_begin module=editor status=ok card_id={} split={}",
            card_id,
            parsed.is_split
        );
        session
    }

    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn mode(&self) -> ColumnMode {
        self.mode
    }

    pub fn draft(&self) -> &DraftBuffer {
        &self.draft
    }

    /// The session's authoritative working copy of the card description.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn focused(&self) -> Column {
        self.focused
    }

    pub fn focus(&mut self, column: Column) {
        self.focused = column;
    }

    pub fn surface(&self, column: Column) -> &S {
        match column {
            Column::Left => &self.left,
            Column::Right => &self.right,
        }
    }

    /// Direct surface access; the user edits surfaces out of band from the
    /// state machine, the host reports it back via [`Self::notify_input`].
    pub fn surface_mut(&mut self, column: Column) -> &mut S {
        match column {
            Column::Left => &mut self.left,
            Column::Right => &mut self.right,
        }
    }

    /// Input event on one surface: pull its content into the draft and,
    /// while unsplit, propagate the left column to the working description.
    ///
    /// Propagation is suppressed while the surface reports an input
    /// composition in progress, so intermediate character sequences never
    /// land in the description.
    pub fn notify_input(&mut self, column: Column) {
        let content = self.surface(column).markup();
        let composing = self.surface(column).is_composing();
        match column {
            Column::Left => self.draft.left = content.clone(),
            Column::Right => self.draft.right = content.clone(),
        }
        if self.mode == ColumnMode::Unsplit && column == Column::Left && !composing {
            self.description = content;
        }
    }

    /// Composition ended on a surface: resume suppressed propagation.
    ///
    /// The host clears the surface's composing flag before calling this.
    pub fn notify_composition_end(&mut self, column: Column) {
        self.notify_input(column);
    }

    /// Runs one formatting command against the focused surface.
    ///
    /// The mutation is synchronous; the read-back is deferred — the host
    /// must call [`Self::reconcile`] after the current input batch and
    /// before any subsequent input.
    pub fn apply(&mut self, command: FormatCommand) {
        let surface = match self.focused {
            Column::Left => &mut self.left,
            Column::Right => &mut self.right,
        };
        apply_command(surface, command);
        self.pending_reconcile = true;
        debug!(
            "event=format_command module=editor card_id={} command={:?}",
            self.card_id, command
        );
    }

    pub fn has_pending_reconcile(&self) -> bool {
        self.pending_reconcile
    }

    /// Deferred read-back phase of the command contract: surfaces into the
    /// draft, and the left column into the description while unsplit.
    pub fn reconcile(&mut self) {
        if !self.pending_reconcile {
            return;
        }
        self.pending_reconcile = false;
        self.draft.left = self.left.markup();
        self.draft.right = self.right.markup();
        if self.mode == ColumnMode::Unsplit && !self.left.is_composing() {
            self.description = self.draft.left.clone();
        }
    }

    /// Toggles between one and two columns.
    ///
    /// Leaving split mode merges `left + "<br/>" + right` (no break when
    /// the right column is empty) into the new left column and commits the
    /// merge to the description synchronously — no further input is pending
    /// at the moment of the toggle. Entering split mode starts the right
    /// column empty; a previously merged right column is never recovered.
    pub fn toggle_columns(&mut self) {
        self.draft.left = self.left.markup();
        self.draft.right = self.right.markup();

        match self.mode {
            ColumnMode::Split => {
                let merged = if self.draft.right.is_empty() {
                    self.draft.left.clone()
                } else {
                    format!("{}{}{}", self.draft.left, COLUMN_BREAK, self.draft.right)
                };
                self.draft.left = merged.clone();
                self.draft.right.clear();
                self.description = merged;
                self.mode = ColumnMode::Unsplit;
            }
            ColumnMode::Unsplit => {
                self.mode = ColumnMode::Split;
            }
        }

        self.push_draft_to_surfaces();
        debug!(
            "event=column_toggle module=editor card_id={} mode={:?}",
            self.card_id, self.mode
        );
    }

    /// One-shot commit read: both surfaces are read literally, the draft is
    /// updated, and the canonical stored string is returned.
    pub fn flush(&mut self) -> String {
        self.draft.left = self.left.markup();
        self.draft.right = self.right.markup();
        let canonical = serialize_columns(
            &self.draft.left,
            &self.draft.right,
            self.mode == ColumnMode::Split,
        );
        self.description = canonical.clone();
        info!(
            "event=edit_flush module=editor status=ok card_id={} split={}",
            self.card_id,
            self.mode == ColumnMode::Split
        );
        canonical
    }

    fn push_draft_to_surfaces(&mut self) {
        self.left.replace_markup(&self.draft.left);
        self.right.replace_markup(&self.draft.right);
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnMode, EditSession};
    use crate::editor::surface::EditingSurface;
    use crate::markup::COLUMN_SPLIT_MARK;

    #[test]
    fn begin_restores_split_state_from_storage() {
        let stored = format!("Hello<br/>{COLUMN_SPLIT_MARK}World");
        let session = EditSession::headless(1, &stored);
        assert_eq!(session.mode(), ColumnMode::Split);
        assert_eq!(session.draft().left, "Hello");
        assert_eq!(session.draft().right, "World");
    }

    #[test]
    fn merge_with_empty_right_adds_no_break() {
        let stored = format!("solo<br/>{COLUMN_SPLIT_MARK}");
        let mut session = EditSession::headless(2, &stored);
        session.toggle_columns();
        assert_eq!(session.mode(), ColumnMode::Unsplit);
        assert_eq!(session.draft().left, "solo");
        assert_eq!(session.description(), "solo");
    }

    #[test]
    fn resplitting_starts_the_right_column_empty() {
        let stored = format!("A<br/>{COLUMN_SPLIT_MARK}B");
        let mut session = EditSession::headless(3, &stored);
        session.toggle_columns();
        assert_eq!(session.draft().left, "A<br/>B");
        session.toggle_columns();
        assert_eq!(session.mode(), ColumnMode::Split);
        assert_eq!(session.draft().left, "A<br/>B");
        assert_eq!(session.draft().right, "");
    }

    #[test]
    fn typing_while_unsplit_propagates_immediately() {
        let mut session = EditSession::headless(4, "old");
        session.surface_mut(Column::Left).replace_markup("new text");
        session.notify_input(Column::Left);
        assert_eq!(session.description(), "new text");
    }
}
