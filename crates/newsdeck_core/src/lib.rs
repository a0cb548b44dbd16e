//! Core engine for the newsdeck card authoring surface.
//! This crate is the single source of truth for the dual-column editing
//! invariants and the card deck's persistence contracts.

pub mod db;
pub mod editor;
pub mod export;
pub mod logging;
pub mod markup;
pub mod media;
pub mod model;
pub mod repo;
pub mod service;

pub use editor::{
    Column, ColumnMode, DraftBuffer, EditSession, EditingSurface, FormatCommand, HeadlessSurface,
    Selection,
};
pub use export::{ExportReport, PageFailure, PageRasterizer, RasterizeError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use markup::{parse_columns, serialize_columns, ColumnText, COLUMN_SPLIT_MARK};
pub use model::card::{seed_deck, CardContent, CardId, CardValidationError, WIDE_CARD_ID};
pub use repo::card_repo::{
    CardRepository, CardRow, MetaRepository, RepoError, RepoResult, SqliteCardRepository,
};
pub use service::card_service::{CardService, ServiceError, DEFAULT_INTRO};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
