//! cursorfx Core - Foundational types for the cursor overlay effects
//!
//! This crate provides the types that all other cursorfx crates depend on:
//! - `Vec2` - 2D screen-space vector
//! - `Color` - RGBA color with hex parsing
//! - `settings` - typed extraction from flat TOML setting tables
//! - Error types and Result alias

mod error;
pub mod settings;
mod types;

pub use error::{FxError, Result};
pub use types::{Color, Vec2};
