//! Single-threaded frame driver: zero or more fixed steps, then one render step

use crate::clock::FrameClock;
use crate::input::{CursorTracker, FrameInput};
use crate::system::RuntimeSystem;
use cursorfx_core::Result;
use tracing::trace;

/// What one call to `FrameLoop::frame` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Number of fixed simulation steps executed
    pub fixed_steps: u32,
    /// Clamped real frame time in seconds
    pub delta_time: f64,
}

/// Drives registered systems from a `FrameClock` and a `CursorTracker`.
///
/// Systems are borrowed per frame so the caller keeps ownership (and can read
/// draw data back out between frames).
pub struct FrameLoop {
    pub clock: FrameClock,
    last_input: FrameInput,
}

impl FrameLoop {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            last_input: FrameInput::default(),
        }
    }

    /// Initialize every system once, in order
    pub fn initialize(&mut self, systems: &mut [&mut dyn RuntimeSystem]) -> Result<()> {
        for system in systems.iter_mut() {
            system.initialize()?;
            trace!(system = system.name(), "initialized");
        }
        Ok(())
    }

    /// Run one real frame. `elapsed` overrides the wall clock when given.
    pub fn frame(
        &mut self,
        elapsed: Option<f64>,
        tracker: &mut CursorTracker,
        systems: &mut [&mut dyn RuntimeSystem],
    ) -> Result<FrameReport> {
        match elapsed {
            Some(e) => self.clock.advance(e),
            None => self.clock.tick(),
        }

        let step = self.clock.fixed_timestep as f32;
        let mut fixed_steps = 0;
        while self.clock.next_fixed_step() {
            let input = tracker.snapshot(step, self.clock.total_time as f32);
            for system in systems.iter_mut() {
                system.fixed_update(&input)?;
            }
            self.last_input = input;
            fixed_steps += 1;
        }

        let delta_time = self.clock.delta_time;
        for system in systems.iter_mut() {
            system.update(&self.last_input, delta_time)?;
        }

        Ok(FrameReport {
            fixed_steps,
            delta_time,
        })
    }

    /// Shut down every system in reverse registration order
    pub fn shutdown(&mut self, systems: &mut [&mut dyn RuntimeSystem]) -> Result<()> {
        for system in systems.iter_mut().rev() {
            system.shutdown()?;
        }
        Ok(())
    }

    /// Input seen by the most recent fixed step
    pub fn last_input(&self) -> &FrameInput {
        &self.last_input
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(FrameClock::new())
    }
}
