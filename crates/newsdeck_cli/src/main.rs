//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `newsdeck_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("newsdeck_core version={}", newsdeck_core::core_version());
    println!("newsdeck_core seed_cards={}", newsdeck_core::seed_deck().len());
}
