//! Dual-column rich-text editing engine.
//!
//! # Responsibility
//! - Define the editing-surface capability contract and its headless
//!   implementation.
//! - Provide the selection-scoped formatting commands.
//! - Own the per-session state machine and synchronizer.
//!
//! # Invariants
//! - One session exists per card edit; nothing here is shared across
//!   sessions or cards.

pub mod commands;
pub mod session;
pub mod surface;

pub use commands::{apply_command, toggle_bullet_list, toggle_emphasis, FormatCommand};
pub use session::{Column, ColumnMode, DraftBuffer, EditSession};
pub use surface::{EditingSurface, HeadlessSurface, Selection};
