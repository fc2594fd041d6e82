//! cursorfx Runtime - Frame loop infrastructure
//!
//! Provides the building blocks that drive effect simulation:
//! - `FrameClock`: fixed-timestep accumulator with a frame-time cap
//! - `CursorTracker` / `FrameInput`: cursor position, velocity and button snapshots
//! - `RuntimeSystem`: trait for systems ticked by the frame loop
//! - `FrameLoop`: runs fixed steps then one render step per real frame

mod clock;
mod frame_loop;
mod input;
mod system;

pub use clock::FrameClock;
pub use frame_loop::{FrameLoop, FrameReport};
pub use input::{ButtonState, CursorTracker, FrameInput, MouseButton};
pub use system::RuntimeSystem;
