//! Cursor input tracking
//!
//! The host (global mouse hook, winit window, scripted path) feeds raw events
//! into a `CursorTracker`; each simulation step takes a `FrameInput` snapshot.

use cursorfx_core::Vec2;
use serde::Serialize;
use winit::event::{ElementState, WindowEvent};

/// Mouse buttons the effects react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

impl std::str::FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(format!("unknown mouse button '{other}'")),
        }
    }
}

/// Level (held) state of each mouse button for one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pressed: [bool; 3],
}

impl ButtonState {
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed[button.index()]
    }

    pub fn set(&mut self, button: MouseButton, pressed: bool) {
        self.pressed[button.index()] = pressed;
    }
}

/// Everything an effect reads about the outside world for one simulation step
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Cursor position at the end of this step
    pub cursor: Vec2,
    /// Cursor position at the end of the previous step
    pub previous_cursor: Vec2,
    /// Smoothed cursor velocity in pixels per second
    pub velocity: Vec2,
    pub buttons: ButtonState,
    pub delta_time: f32,
    pub total_time: f32,
    /// Size of the overlay surface in pixels
    pub screen_size: Vec2,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            cursor: Vec2::ZERO,
            previous_cursor: Vec2::ZERO,
            velocity: Vec2::ZERO,
            buttons: ButtonState::default(),
            delta_time: 0.0,
            total_time: 0.0,
            screen_size: Vec2::new(1920.0, 1080.0),
        }
    }
}

impl FrameInput {
    /// Input for a stationary cursor, mostly useful for tests and scripted runs
    pub fn at(cursor: Vec2, delta_time: f32) -> Self {
        Self {
            cursor,
            previous_cursor: cursor,
            delta_time,
            ..Default::default()
        }
    }

    /// Cursor movement during this step
    pub fn displacement(&self) -> Vec2 {
        self.cursor - self.previous_cursor
    }

    /// Euclidean distance the cursor travelled during this step
    pub fn distance_moved(&self) -> f32 {
        self.displacement().length()
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.is_pressed(button)
    }
}

/// Accumulates host cursor events between simulation steps
pub struct CursorTracker {
    position: Vec2,
    snapshot_position: Vec2,
    velocity: Vec2,
    /// Exponential smoothing factor for velocity, in (0, 1]; 1 = raw per-step velocity
    pub velocity_smoothing: f32,
    buttons_down: ButtonState,
    /// Buttons pressed at any point since the last snapshot, so a press and
    /// release inside one frame still reaches the effects
    pressed_since_snapshot: ButtonState,
    screen_size: Vec2,
    has_position: bool,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorTracker {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            snapshot_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            velocity_smoothing: 0.35,
            buttons_down: ButtonState::default(),
            pressed_since_snapshot: ButtonState::default(),
            screen_size: Vec2::new(1920.0, 1080.0),
            has_position: false,
        }
    }

    /// Process an absolute cursor position in overlay pixels
    pub fn process_cursor_moved(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.position = Vec2::new(x, y);
        if !self.has_position {
            // First sample: no displacement from the origin
            self.snapshot_position = self.position;
            self.has_position = true;
        }
    }

    pub fn process_button(&mut self, button: MouseButton, pressed: bool) {
        self.buttons_down.set(button, pressed);
        if pressed {
            self.pressed_since_snapshot.set(button, true);
        }
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_size = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Feed a winit window event. Returns true if the event was consumed.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.process_cursor_moved(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return false,
                };
                self.process_button(button, *state == ElementState::Pressed);
                true
            }
            WindowEvent::Resized(size) => {
                self.set_screen_size(size.width as f32, size.height as f32);
                false
            }
            _ => false,
        }
    }

    /// Take the input snapshot for one simulation step of length `dt`.
    ///
    /// Displacement is measured from the previous snapshot, so a second step in
    /// the same frame sees a stationary cursor.
    pub fn snapshot(&mut self, dt: f32, total_time: f32) -> FrameInput {
        let previous = self.snapshot_position;
        let displacement = self.position - previous;

        if dt > 0.0 {
            let raw = displacement * (1.0 / dt);
            let k = self.velocity_smoothing.clamp(0.01, 1.0);
            self.velocity = self.velocity.lerp(&raw, k);
        }

        let mut buttons = self.buttons_down;
        for button in MouseButton::ALL {
            if self.pressed_since_snapshot.is_pressed(button) {
                buttons.set(button, true);
            }
        }
        self.pressed_since_snapshot = ButtonState::default();
        self.snapshot_position = self.position;

        FrameInput {
            cursor: self.position,
            previous_cursor: previous,
            velocity: self.velocity,
            buttons,
            delta_time: dt.max(0.0),
            total_time,
            screen_size: self.screen_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_between_snapshots() {
        let mut tracker = CursorTracker::new();
        tracker.process_cursor_moved(100.0, 100.0);
        let first = tracker.snapshot(1.0 / 60.0, 0.0);
        assert_eq!(first.distance_moved(), 0.0);

        tracker.process_cursor_moved(103.0, 104.0);
        let second = tracker.snapshot(1.0 / 60.0, 1.0 / 60.0);
        assert!((second.distance_moved() - 5.0).abs() < 1e-5);

        // Second step within the same frame: no new movement
        let third = tracker.snapshot(1.0 / 60.0, 2.0 / 60.0);
        assert_eq!(third.distance_moved(), 0.0);
    }

    #[test]
    fn test_velocity_follows_motion() {
        let mut tracker = CursorTracker::new();
        tracker.velocity_smoothing = 1.0;
        tracker.process_cursor_moved(0.0, 0.0);
        tracker.snapshot(0.1, 0.0);
        tracker.process_cursor_moved(10.0, 0.0);
        let input = tracker.snapshot(0.1, 0.1);
        assert!((input.velocity.x - 100.0).abs() < 1e-3);
        assert!(input.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_quick_click_survives_to_snapshot() {
        let mut tracker = CursorTracker::new();
        tracker.process_button(MouseButton::Left, true);
        tracker.process_button(MouseButton::Left, false);

        let input = tracker.snapshot(1.0 / 60.0, 0.0);
        assert!(input.is_pressed(MouseButton::Left));

        let next = tracker.snapshot(1.0 / 60.0, 0.0);
        assert!(!next.is_pressed(MouseButton::Left));
    }

    #[test]
    fn test_held_button_stays_pressed() {
        let mut tracker = CursorTracker::new();
        tracker.process_button(MouseButton::Right, true);
        assert!(tracker.snapshot(0.016, 0.0).is_pressed(MouseButton::Right));
        assert!(tracker.snapshot(0.016, 0.0).is_pressed(MouseButton::Right));
        assert!(!tracker.snapshot(0.016, 0.0).is_pressed(MouseButton::Left));
    }

    #[test]
    fn test_button_names_parse() {
        assert_eq!("middle".parse::<MouseButton>(), Ok(MouseButton::Middle));
        assert!("thumb".parse::<MouseButton>().is_err());
    }
}
