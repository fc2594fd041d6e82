//! Scripted cursor input and the shared headless simulation run

use anyhow::{Context, Result};
use clap::ValueEnum;
use cursorfx_core::Vec2;
use cursorfx_particles::{EffectId, OverlaySettings, OverlaySystem};
use cursorfx_runtime::{CursorTracker, FrameClock, FrameLoop, MouseButton};
use std::f32::consts::TAU;
use std::path::PathBuf;
use tracing::{debug, info};

/// Shape of the scripted cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CursorPath {
    /// Circle around the screen center, one lap every four seconds
    Circle,
    /// Left to right across the middle, wrapping
    Line,
    /// Diagonal sweeps between the top and bottom thirds
    Zigzag,
    /// Parked at the screen center
    Still,
}

/// Frames a scripted click holds the button down
const CLICK_FRAMES: u32 = 3;

pub struct Script {
    pub path: CursorPath,
    pub width: f32,
    pub height: f32,
    pub fps: f32,
    /// Press `button` every this many frames
    pub click_every: Option<u32>,
    pub button: MouseButton,
}

impl Script {
    pub fn cursor(&self, frame: u32) -> Vec2 {
        let t = frame as f32 / self.fps.max(1.0);
        let center = Vec2::new(self.width * 0.5, self.height * 0.5);
        match self.path {
            CursorPath::Circle => {
                let radius = self.width.min(self.height) * 0.3;
                center + Vec2::from_angle(t * TAU / 4.0) * radius
            }
            CursorPath::Line => {
                let x = (t * 400.0) % self.width.max(1.0);
                Vec2::new(x, center.y)
            }
            CursorPath::Zigzag => {
                let x = (t * 300.0) % self.width.max(1.0);
                let phase = (t * 0.75).fract();
                let tri = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };
                Vec2::new(x, self.height * (1.0 / 3.0 + tri / 3.0))
            }
            CursorPath::Still => center,
        }
    }

    pub fn pressed(&self, frame: u32) -> bool {
        match self.click_every {
            Some(every) if every > 0 => frame % every < CLICK_FRAMES.min(every),
            _ => false,
        }
    }
}

pub struct SimulationArgs {
    pub settings: Option<PathBuf>,
    /// Replaces `[overlay] enabled` when not empty
    pub effects: Vec<String>,
    pub seed: Option<u64>,
    pub frames: u32,
    pub script: Script,
}

/// Per-effect counters after a run
pub struct EffectSummary {
    pub name: &'static str,
    pub live: usize,
    pub spawned: u64,
    pub capacity: usize,
}

pub struct Simulation {
    pub system: OverlaySystem,
    pub total_time: f64,
    pub fixed_steps: u64,
}

impl Simulation {
    pub fn summary(&self) -> Vec<EffectSummary> {
        let stack = &self.system.stack;
        stack
            .names()
            .into_iter()
            .filter_map(|name| stack.get(name))
            .map(|effect| EffectSummary {
                name: effect.name(),
                live: effect.live_count(),
                spawned: effect.spawned_total(),
                capacity: effect.hard_max(),
            })
            .collect()
    }
}

pub fn load_settings(args: &SimulationArgs) -> Result<OverlaySettings> {
    let mut settings = match &args.settings {
        Some(path) => OverlaySettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => OverlaySettings::default(),
    };
    if !args.effects.is_empty() {
        let mut enabled = Vec::new();
        for name in &args.effects {
            let id: EffectId = name.parse().context("Invalid --effect")?;
            if !enabled.contains(&id) {
                enabled.push(id);
            }
        }
        settings.overlay.enabled = enabled;
    }
    if let Some(seed) = args.seed {
        settings.overlay.seed = seed;
    }
    Ok(settings)
}

/// Run the overlay for `args.frames` frames of scripted input at a fixed
/// frame rate. Systems are left initialized so the caller can render the
/// final state.
pub fn run(args: &SimulationArgs) -> Result<Simulation> {
    let settings = load_settings(args)?;
    let script = &args.script;

    let mut clock = FrameClock::with_fixed_timestep(settings.overlay.fixed_hz);
    clock.max_frame_time = settings.overlay.max_frame_time;
    let mut frame_loop = FrameLoop::new(clock);
    let mut tracker = CursorTracker::new();
    tracker.set_screen_size(script.width, script.height);

    let mut system = OverlaySystem::from_settings(&settings);
    frame_loop
        .initialize(&mut [&mut system])
        .context("Failed to initialize overlay")?;

    info!(
        effects = ?system.stack.names(),
        frames = args.frames,
        path = ?script.path,
        "simulating"
    );

    let frame_time = 1.0 / f64::from(script.fps.max(1.0));
    let mut fixed_steps = 0u64;
    for frame in 0..args.frames {
        let cursor = script.cursor(frame);
        tracker.process_cursor_moved(cursor.x, cursor.y);
        tracker.process_button(script.button, script.pressed(frame));

        let report = frame_loop
            .frame(Some(frame_time), &mut tracker, &mut [&mut system])
            .with_context(|| format!("Simulation failed at frame {frame}"))?;
        fixed_steps += u64::from(report.fixed_steps);

        if frame % 60 == 0 {
            debug!(frame, live = system.packed_live(), "frame");
        }
    }

    Ok(Simulation {
        total_time: frame_loop.clock.total_time,
        fixed_steps,
        system,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(path: CursorPath) -> Script {
        Script {
            path,
            width: 800.0,
            height: 600.0,
            fps: 60.0,
            click_every: Some(30),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn paths_stay_on_screen() {
        for path in [CursorPath::Circle, CursorPath::Line, CursorPath::Zigzag, CursorPath::Still] {
            let s = script(path);
            for frame in 0..600 {
                let p = s.cursor(frame);
                assert!((0.0..=800.0).contains(&p.x), "{path:?} {p:?}");
                assert!((0.0..=600.0).contains(&p.y), "{path:?} {p:?}");
            }
        }
    }

    #[test]
    fn clicks_hold_for_a_few_frames() {
        let s = script(CursorPath::Still);
        let pressed: Vec<u32> = (0..60).filter(|f| s.pressed(*f)).collect();
        assert_eq!(pressed, vec![0, 1, 2, 30, 31, 32]);
    }

    #[test]
    fn run_reports_every_enabled_effect() {
        let args = SimulationArgs {
            settings: None,
            effects: vec!["trail".into(), "sigils".into()],
            seed: Some(3),
            frames: 120,
            script: Script {
                button: MouseButton::Right,
                ..script(CursorPath::Circle)
            },
        };
        let sim = run(&args).unwrap();
        let summary = sim.summary();
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|s| s.spawned > 0));
        assert_eq!(sim.fixed_steps, 120);
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let args = SimulationArgs {
            settings: None,
            effects: vec!["fireworks".into()],
            seed: None,
            frames: 1,
            script: script(CursorPath::Still),
        };
        assert!(run(&args).is_err());
    }
}
