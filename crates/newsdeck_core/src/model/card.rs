//! Card domain model and the fixed seed deck.
//!
//! # Responsibility
//! - Define the canonical record for one authored card.
//! - Provide the fixed deck shape; the store only overlays authored fields
//!   (`title`, `description`, `main_image`) onto these seeds.
//!
//! # Invariants
//! - `id` is stable, positive, and never reused for another card.
//! - `description` is always a valid input to the column codec's parse.

use crate::markup::{parse_columns, ColumnText};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one card of the deck.
///
/// The deck is a fixed table keyed externally, so ids are small integers
/// rather than generated identities.
pub type CardId = i64;

/// The one card whose description supports dual-column editing.
pub const WIDE_CARD_ID: CardId = 1;

/// Placeholder title for cards never touched by an author.
pub const DEFAULT_TITLE: &str = "Section title";
/// Placeholder description for cards never touched by an author.
pub const DEFAULT_DESCRIPTION: &str = "Enter content here.";
/// Default artwork shown until an author attaches an image.
pub const DEFAULT_MAIN_IMAGE: &str = "default.png";

// id, lab label, background art, icon art.
const SEED_CARDS: &[(CardId, &str, &str, &str)] = &[
    (1, "University Hospital", "lab-bg_1-01.svg", "Zigzag.png"),
    (2, "Neuromechanics Lab", "lab-bg_2-01.svg", "Flower.png"),
    (3, "Applied Robotics Lab", "lab-bg_2-02.svg", "Peanut.png"),
    (4, "Interactive Robotics Lab", "lab-bg_2-03.svg", "Diagonal.png"),
    (5, "Intelligent Robot Systems Lab", "lab-bg_2-04.svg", "Zigzag.png"),
    (6, "Visual Intelligence Lab", "lab-bg_3-01.svg", "Flower.png"),
    (7, "Computer Vision Lab", "lab-bg_3-02.svg", "Peanut.png"),
    (8, "Medical AI Lab", "lab-bg_3-03.svg", "Diagonal.png"),
    (9, "Electronics Research Institute", "lab-bg_3-04.svg", "Zigzag.png"),
];

/// Validation failures for card records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    /// Card ids are positive by construction of the seed table.
    NonPositiveId(CardId),
    /// The lab label identifies the card to readers and must not be blank.
    BlankLab(CardId),
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "card id must be positive, got {id}"),
            Self::BlankLab(id) => write!(f, "card {id} has a blank lab label"),
        }
    }
}

impl Error for CardValidationError {}

/// One authored unit: a card with a rich-markup description.
///
/// `description` holds either plain markup (single column) or the canonical
/// two-column encoding produced by the column codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    /// Stable deck position and storage key.
    pub id: CardId,
    /// Lab label shown in the card header.
    pub lab: String,
    /// Header background asset name.
    pub bg_image: String,
    /// Main artwork: asset name or an embedded `data:` URL.
    pub main_image: String,
    /// Plain-text card title.
    pub title: String,
    /// Rich-markup body; always parseable by the column codec.
    pub description: String,
    /// Decorative icon asset name.
    pub icon: String,
}

impl CardContent {
    /// Creates a card with placeholder authored fields.
    pub fn new(id: CardId, lab: impl Into<String>, bg_image: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id,
            lab: lab.into(),
            bg_image: bg_image.into(),
            main_image: DEFAULT_MAIN_IMAGE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            icon: icon.into(),
        }
    }

    /// Checks the structural invariants of the record.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        if self.id <= 0 {
            return Err(CardValidationError::NonPositiveId(self.id));
        }
        if self.lab.trim().is_empty() {
            return Err(CardValidationError::BlankLab(self.id));
        }
        Ok(())
    }

    /// Whether this card's description supports dual-column editing.
    pub fn is_wide(&self) -> bool {
        self.id == WIDE_CARD_ID
    }

    /// Decodes the description into its column state for read-mode
    /// rendering: one block when unsplit, two when split.
    pub fn column_state(&self) -> ColumnText {
        parse_columns(&self.description)
    }
}

/// The fixed deck in reading order.
pub fn seed_deck() -> Vec<CardContent> {
    SEED_CARDS
        .iter()
        .map(|&(id, lab, bg_image, icon)| CardContent::new(id, lab, bg_image, icon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{seed_deck, CardContent, CardValidationError, WIDE_CARD_ID};

    #[test]
    fn seed_deck_is_fixed_and_valid() {
        let deck = seed_deck();
        assert_eq!(deck.len(), 9);
        for card in &deck {
            card.validate().expect("seed cards are valid");
        }
        assert!(deck[0].is_wide());
        assert_eq!(deck[0].id, WIDE_CARD_ID);
    }

    #[test]
    fn seed_ids_are_unique_and_ordered() {
        let deck = seed_deck();
        for window in deck.windows(2) {
            assert!(window[0].id < window[1].id);
        }
    }

    #[test]
    fn seed_descriptions_read_as_a_single_column() {
        for card in seed_deck() {
            let state = card.column_state();
            assert!(!state.is_split);
            assert_eq!(state.left, card.description);
        }
    }

    #[test]
    fn validate_rejects_bad_records() {
        let mut card = CardContent::new(0, "Lab", "bg.svg", "icon.png");
        assert_eq!(
            card.validate(),
            Err(CardValidationError::NonPositiveId(0))
        );
        card.id = 3;
        card.lab = "   ".to_string();
        assert_eq!(card.validate(), Err(CardValidationError::BlankLab(3)));
    }
}
