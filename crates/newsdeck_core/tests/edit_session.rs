use newsdeck_core::{
    Column, ColumnMode, EditSession, EditingSurface, FormatCommand, COLUMN_SPLIT_MARK,
};

#[test]
fn begin_restores_draft_and_split_flag_from_storage() {
    let stored = format!("Hello<br/>{COLUMN_SPLIT_MARK}World");
    let session = EditSession::headless(1, &stored);

    assert_eq!(session.mode(), ColumnMode::Split);
    assert_eq!(session.draft().left, "Hello");
    assert_eq!(session.draft().right, "World");
    assert_eq!(session.surface(Column::Left).markup(), "Hello");
    assert_eq!(session.surface(Column::Right).markup(), "World");
}

#[test]
fn begin_without_sentinel_starts_unsplit() {
    let session = EditSession::headless(1, "single column body");
    assert_eq!(session.mode(), ColumnMode::Unsplit);
    assert_eq!(session.draft().left, "single column body");
    assert_eq!(session.draft().right, "");
}

#[test]
fn typing_while_unsplit_updates_the_description_without_a_flush() {
    let mut session = EditSession::headless(1, "old content");
    session
        .surface_mut(Column::Left)
        .replace_markup("new keystrokes");
    session.notify_input(Column::Left);

    assert_eq!(session.description(), "new keystrokes");
    assert_eq!(session.draft().left, "new keystrokes");
}

#[test]
fn right_surface_input_never_touches_the_description_directly() {
    let stored = format!("L<br/>{COLUMN_SPLIT_MARK}R");
    let mut session = EditSession::headless(1, &stored);
    session.surface_mut(Column::Right).replace_markup("edited");
    session.notify_input(Column::Right);

    assert_eq!(session.draft().right, "edited");
    assert_eq!(session.description(), stored);
}

#[test]
fn split_type_then_unsplit_merges_with_one_break_and_no_sentinel() {
    let mut session = EditSession::headless(1, "Hello");
    session.toggle_columns();
    assert_eq!(session.mode(), ColumnMode::Split);

    session.surface_mut(Column::Right).replace_markup("World");
    session.notify_input(Column::Right);
    session.toggle_columns();

    assert_eq!(session.mode(), ColumnMode::Unsplit);
    let canonical = session.flush();
    assert_eq!(canonical, "Hello<br/>World");
    assert!(!canonical.contains(COLUMN_SPLIT_MARK));
}

#[test]
fn unsplit_merge_with_empty_right_column_inserts_no_break() {
    let stored = format!("alone<br/>{COLUMN_SPLIT_MARK}");
    let mut session = EditSession::headless(1, &stored);
    session.toggle_columns();

    assert_eq!(session.draft().left, "alone");
    assert_eq!(session.description(), "alone");
}

#[test]
fn mode_round_trip_merges_then_resplits_with_an_empty_right() {
    // Splitting never recovers a previously merged right column.
    let stored = format!("A{COLUMN_SPLIT_MARK}B");
    let mut session = EditSession::headless(1, &stored);
    assert_eq!(session.draft().left, "A");
    assert_eq!(session.draft().right, "B");

    session.toggle_columns();
    assert_eq!(session.draft().left, "A<br/>B");
    assert_eq!(session.description(), "A<br/>B");

    session.toggle_columns();
    assert_eq!(session.mode(), ColumnMode::Split);
    assert_eq!(session.draft().left, "A<br/>B");
    assert_eq!(session.draft().right, "");
    assert_eq!(session.surface(Column::Right).markup(), "");
}

#[test]
fn flush_reads_literal_surface_content_over_a_lagging_draft() {
    let mut session = EditSession::headless(1, "stale");
    // Surface edited out of band, with no input notification.
    session
        .surface_mut(Column::Left)
        .replace_markup("latest surface content");

    assert_eq!(session.draft().left, "stale");
    let canonical = session.flush();
    assert_eq!(canonical, "latest surface content");
    assert_eq!(session.draft().left, "latest surface content");
}

#[test]
fn flush_while_split_serializes_with_the_sentinel() {
    let mut session = EditSession::headless(1, "left side");
    session.toggle_columns();
    session.surface_mut(Column::Right).replace_markup("right side");

    let canonical = session.flush();
    assert_eq!(
        canonical,
        format!("left side<br/>{COLUMN_SPLIT_MARK}right side")
    );
    assert_eq!(session.description(), canonical);
}

#[test]
fn command_read_back_is_deferred_until_reconcile() {
    let mut session = EditSession::headless(1, "format me");
    let text = session.surface(Column::Left).document().children(
        newsdeck_core::markup::ROOT,
    )[0];
    session.surface_mut(Column::Left).set_selection(
        newsdeck_core::Selection::new(
            newsdeck_core::markup::Caret::new(text, 0),
            newsdeck_core::markup::Caret::new(text, 6),
        ),
    );

    session.apply(FormatCommand::ToggleEmphasis);
    assert!(session.has_pending_reconcile());
    // The surface mutated synchronously; the draft has not caught up yet.
    assert_eq!(session.draft().left, "format me");
    assert_eq!(session.description(), "format me");

    session.reconcile();
    assert!(!session.has_pending_reconcile());
    assert!(session.draft().left.contains("data-emphasis"));
    assert_eq!(session.description(), session.draft().left);
}

#[test]
fn composition_suppresses_propagation_until_it_ends() {
    let mut session = EditSession::headless(1, "before");
    let surface = session.surface_mut(Column::Left);
    surface.set_composing(true);
    surface.replace_markup("partial sequ");
    session.notify_input(Column::Left);

    // The draft tracks, the description does not.
    assert_eq!(session.draft().left, "partial sequ");
    assert_eq!(session.description(), "before");

    let surface = session.surface_mut(Column::Left);
    surface.set_composing(false);
    surface.replace_markup("partial sequence done");
    session.notify_composition_end(Column::Left);

    assert_eq!(session.description(), "partial sequence done");
}

#[test]
fn a_fresh_session_rederives_state_from_storage() {
    let stored = format!("A<br/>{COLUMN_SPLIT_MARK}B");
    let mut session = EditSession::headless(1, &stored);
    session.toggle_columns();
    assert_eq!(session.mode(), ColumnMode::Unsplit);
    drop(session);

    let next = EditSession::headless(1, &stored);
    assert_eq!(next.mode(), ColumnMode::Split);
    assert_eq!(next.draft().left, "A");
    assert_eq!(next.draft().right, "B");
}
