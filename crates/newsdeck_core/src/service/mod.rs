//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, editor and export calls into use-case APIs.
//! - Keep callers decoupled from storage and surface details.

pub mod card_service;
