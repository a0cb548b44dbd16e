//! Domain model for the newsletter card deck.
//!
//! # Responsibility
//! - Define the canonical card record shared by editing, persistence and
//!   rendering callers.
//! - Provide the fixed seed deck the store overlays.
//!
//! # Invariants
//! - Every card is identified by a stable positive `CardId`.
//! - A card's `description` always parses through the column codec.

pub mod card;
