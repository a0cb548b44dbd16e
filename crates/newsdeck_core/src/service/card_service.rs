//! Card deck use-case service.
//!
//! # Responsibility
//! - Load and save the deck (seed table overlaid with stored rows).
//! - Gate the single active editing session per process.
//! - Gate page export so it never runs mid-edit.
//!
//! # Invariants
//! - At most one editing session is active at a time.
//! - Store failures never corrupt the in-memory deck or draft state; the
//!   author may retry.

use crate::editor::session::EditSession;
use crate::editor::surface::{EditingSurface, HeadlessSurface};
use crate::export::{self, ExportError, ExportReport, PageRasterizer};
use crate::media::{self, MediaError};
use crate::model::card::{seed_deck, CardContent, CardId, CardValidationError};
use crate::repo::card_repo::{CardRepository, CardRow, MetaRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Intro text shown until an author saves one.
pub const DEFAULT_INTRO: &str = "Enter the introduction here.";

/// Service error for deck use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// A session for the given card is already active.
    EditAlreadyActive(CardId),
    /// Commit/cancel was called without a matching active session.
    NoActiveEdit,
    Validation(CardValidationError),
    /// Export requested while a session is active.
    ExportDuringEdit,
    Export(ExportError),
    Media(MediaError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::EditAlreadyActive(id) => {
                write!(f, "card {id} is already being edited")
            }
            Self::NoActiveEdit => write!(f, "no editing session is active"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ExportDuringEdit => write!(f, "cannot export while editing is active"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Media(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Media(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CardValidationError> for ServiceError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<MediaError> for ServiceError {
    fn from(value: MediaError) -> Self {
        Self::Media(value)
    }
}

/// Use-case facade over the card/meta store and the editing engine.
pub struct CardService<R: CardRepository + MetaRepository> {
    repo: R,
    active_card: Option<CardId>,
}

impl<R: CardRepository + MetaRepository> CardService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            active_card: None,
        }
    }

    /// The fixed deck with stored authored fields overlaid by card id.
    ///
    /// Cards without a stored row keep their seed defaults.
    pub fn load_deck(&self) -> Result<Vec<CardContent>, ServiceError> {
        let rows = self.repo.list_cards()?;
        let mut deck = seed_deck();
        for card in &mut deck {
            if let Some(row) = rows.iter().find(|row| row.card_id == card.id) {
                card.title = row.title.clone();
                card.description = row.content.clone();
                card.main_image = row.main_image.clone();
            }
        }
        Ok(deck)
    }

    /// The stored intro text, falling back to the placeholder.
    pub fn load_intro(&self) -> Result<String, ServiceError> {
        Ok(self
            .repo
            .load_intro()?
            .unwrap_or_else(|| DEFAULT_INTRO.to_string()))
    }

    /// Upserts every card row and the intro meta.
    pub fn save_deck(&mut self, cards: &[CardContent], intro: &str) -> Result<(), ServiceError> {
        for card in cards {
            card.validate()?;
        }
        let rows: Vec<CardRow> = cards.iter().map(CardRow::from_card).collect();
        self.repo.save_intro(intro)?;
        self.repo.upsert_cards(&rows)?;
        info!(
            "event=deck_save module=service status=ok cards={}",
            rows.len()
        );
        Ok(())
    }

    /// Begins the single editing session for one card.
    pub fn begin_editing(
        &mut self,
        card: &CardContent,
    ) -> Result<EditSession<HeadlessSurface>, ServiceError> {
        if let Some(active) = self.active_card {
            return Err(ServiceError::EditAlreadyActive(active));
        }
        card.validate()?;
        self.active_card = Some(card.id);
        Ok(EditSession::headless(card.id, &card.description))
    }

    /// Commits the active session: flushes it and returns the canonical
    /// description for the session's card. The caller persists the updated
    /// deck via [`Self::save_deck`].
    pub fn commit_editing<S: EditingSurface>(
        &mut self,
        mut session: EditSession<S>,
    ) -> Result<String, ServiceError> {
        if self.active_card != Some(session.card_id()) {
            return Err(ServiceError::NoActiveEdit);
        }
        let canonical = session.flush();
        self.active_card = None;
        Ok(canonical)
    }

    /// Discards the active session without persisting anything.
    pub fn cancel_editing<S: EditingSurface>(&mut self, session: EditSession<S>) {
        if self.active_card == Some(session.card_id()) {
            self.active_card = None;
        }
    }

    /// Whether an editing session is outstanding.
    pub fn is_editing(&self) -> bool {
        self.active_card.is_some()
    }

    /// Embeds an image file as the card's main artwork.
    pub fn attach_card_image(
        &self,
        card: &mut CardContent,
        path: &Path,
    ) -> Result<(), ServiceError> {
        card.main_image = media::image_file_to_data_url(path)?;
        Ok(())
    }

    /// Exports all pages, refusing while an editing session is active.
    pub fn export_pages<P: PageRasterizer>(
        &self,
        rasterizer: &mut P,
        out_dir: &Path,
    ) -> Result<ExportReport, ServiceError> {
        if self.is_editing() {
            return Err(ServiceError::ExportDuringEdit);
        }
        Ok(export::export_pages(rasterizer, out_dir)?)
    }
}
