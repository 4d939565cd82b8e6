//! BDD harness (cucumber-rs).
//!
//! This crate exists to keep scenario tests isolated from the production crates.
//! Scenarios live in `features/` and are driven by `tests/cucumber.rs`.
