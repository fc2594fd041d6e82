//! Runtime system trait

use crate::input::FrameInput;
use cursorfx_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order. Fixed update runs at a constant
/// rate (simulation), while update runs once per real frame (compaction, upload).
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self) -> Result<()>;

    /// Called at a fixed rate (e.g. 60Hz) for deterministic simulation
    fn fixed_update(&mut self, input: &FrameInput) -> Result<()>;

    /// Called once per frame after all fixed steps
    fn update(&mut self, input: &FrameInput, dt: f64) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
