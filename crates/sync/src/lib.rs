//! `scenesheet-sync` library crate.
//!
//! File-based driver around `scenesheet_core`. The binary entrypoint lives
//! in `main.rs`; modules are public for integration testing.

pub mod config;
pub mod error;
pub mod loader;
pub mod run;
