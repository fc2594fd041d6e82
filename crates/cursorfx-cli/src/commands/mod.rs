//! CLI command implementations

pub mod defaults;
pub mod effects;
pub mod render;
pub mod script;
pub mod simulate;
