//! Repository layer: persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the store contracts the service layer is written against.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Implementations validate schema readiness before accepting a
//!   connection.
//! - Write paths return semantic errors (`NotFound`, `Validation`) in
//!   addition to transport errors.

pub mod card_repo;
