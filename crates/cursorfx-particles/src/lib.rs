//! cursorfx Particles - instance lifecycle engine and cursor effects
//!
//! Provides a generic per-effect simulation with:
//! - Fixed-capacity circular instance pools (oldest slot overwritten under load)
//! - Appear / disappear / pop animation state machines
//! - Distance, rate and edge-triggered spawn controllers with per-second budgets
//! - Compaction of live instances into dense GPU upload buffers
//! - Seven built-in effects behind one `EffectKind` trait

pub mod animation;
pub mod curves;
pub mod effect;
pub mod effects;
pub mod instance;
pub mod rand;
pub mod settings;
pub mod spawn;
pub mod stack;
pub mod upload;

use cursorfx_core::Result;
use cursorfx_runtime::{FrameInput, RuntimeSystem};
use tracing::info;

pub use animation::{
    AnimationConfig, AnimationState, AppearAnimation, AppearPhase, DisappearAnimation,
    DisappearPhase, Lifecycle,
};
pub use effect::{DynEffect, Effect, EffectKind, SpawnContext};
pub use effects::EffectId;
pub use instance::{Instance, InstancePool};
pub use settings::{OverlayOptions, OverlaySettings};
pub use stack::{EffectDrawData, EffectStack};
pub use upload::UploadBuffer;

/// Drives the effect stack from the frame loop
///
/// Effects simulate on fixed steps; compaction runs once per rendered frame.
pub struct OverlaySystem {
    pub stack: EffectStack,
    live: usize,
}

impl OverlaySystem {
    pub fn new(stack: EffectStack) -> Self {
        Self { stack, live: 0 }
    }

    pub fn from_settings(settings: &OverlaySettings) -> Self {
        Self::new(EffectStack::from_settings(settings))
    }

    /// Live instances packed by the last `update`
    pub fn packed_live(&self) -> usize {
        self.live
    }
}

impl Default for OverlaySystem {
    fn default() -> Self {
        Self::from_settings(&OverlaySettings::default())
    }
}

impl RuntimeSystem for OverlaySystem {
    fn initialize(&mut self) -> Result<()> {
        info!(effects = ?self.stack.names(), "overlay effects ready");
        Ok(())
    }

    fn fixed_update(&mut self, input: &FrameInput) -> Result<()> {
        self.stack.update(input);
        Ok(())
    }

    fn update(&mut self, _input: &FrameInput, _dt: f64) -> Result<()> {
        self.live = self.stack.pack();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stack.clear();
        info!("overlay effects stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "overlay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cursorfx_core::Vec2;
    use cursorfx_runtime::{CursorTracker, FrameClock, FrameLoop};

    #[test]
    fn frame_loop_drives_simulation_and_packing() {
        let mut system = OverlaySystem::default();
        let mut tracker = CursorTracker::new();
        let mut frame_loop = FrameLoop::new(FrameClock::with_fixed_timestep(60.0));
        frame_loop.initialize(&mut [&mut system]).unwrap();

        for i in 0..30 {
            tracker.process_cursor_moved(100.0 + i as f32 * 20.0, 300.0);
            frame_loop
                .frame(Some(1.0 / 60.0), &mut tracker, &mut [&mut system])
                .unwrap();
        }
        assert!(system.packed_live() > 0);
        assert_eq!(system.packed_live(), system.stack.total_live());

        frame_loop.shutdown(&mut [&mut system]).unwrap();
        assert_eq!(system.stack.total_live(), 0);
    }

    #[test]
    fn stationary_cursor_stays_empty() {
        let mut system = OverlaySystem::default();
        system.initialize().unwrap();
        for _ in 0..60 {
            system
                .fixed_update(&FrameInput::at(Vec2::new(10.0, 10.0), 1.0 / 60.0))
                .unwrap();
        }
        system.update(&FrameInput::default(), 1.0).unwrap();
        assert_eq!(system.packed_live(), 0);
    }
}
