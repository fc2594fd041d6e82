//! The set of running effects and the per-effect draw data handed to the renderer

use crate::effect::{DynEffect, Effect, EffectKind};
use crate::effects::EffectId;
use crate::settings::OverlaySettings;
use cursorfx_runtime::FrameInput;
use tracing::{debug, warn};

/// Draw data for one effect, consumed by the renderer
pub struct EffectDrawData<'a> {
    pub name: &'static str,
    /// The whole upload buffer, `hard_max * record_size` bytes with a zeroed tail
    pub bytes: &'a [u8],
    pub record_size: usize,
    pub hard_max: usize,
    /// Records at the front of `bytes` that hold live instances
    pub live_count: usize,
}

/// Owns the enabled effects in draw order
#[derive(Default)]
pub struct EffectStack {
    effects: Vec<Box<dyn DynEffect>>,
}

impl EffectStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the enabled effects and apply their settings tables
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        let mut stack = Self::new();
        for (i, id) in settings.overlay.enabled.iter().enumerate() {
            let mut effect = id.create(settings.overlay.seed.wrapping_add(i as u64));
            if let Some(table) = settings.effect_table(*id) {
                effect.apply_settings(table);
                debug!(effect = id.name(), keys = table.len(), "applied settings");
            }
            stack.push(effect);
        }
        stack
    }

    pub fn push(&mut self, effect: Box<dyn DynEffect>) {
        if self.get(effect.name()).is_some() {
            warn!(effect = effect.name(), "effect already running, ignoring duplicate");
            return;
        }
        self.effects.push(effect);
    }

    /// Add a default instance of `id`
    pub fn enable(&mut self, id: EffectId, seed: u64) {
        self.push(id.create(seed));
    }

    /// Remove by name; returns whether anything was removed
    pub fn disable(&mut self, name: &str) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.name() != name);
        self.effects.len() != before
    }

    /// Simulate one fixed step for every effect
    pub fn update(&mut self, input: &FrameInput) {
        for effect in &mut self.effects {
            effect.update(input);
        }
    }

    /// Compact every effect into its upload buffer; returns total live instances
    pub fn pack(&mut self) -> usize {
        self.effects.iter_mut().map(|e| e.pack()).sum()
    }

    /// One entry per effect, in draw order. Effects with nothing live are
    /// included so the renderer can skip them itself.
    pub fn draw_data(&self) -> Vec<EffectDrawData<'_>> {
        self.effects
            .iter()
            .map(|e| EffectDrawData {
                name: e.name(),
                bytes: e.upload_bytes(),
                record_size: e.record_size(),
                hard_max: e.hard_max(),
                live_count: e.packed_count(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynEffect> {
        self.effects
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn DynEffect + 'static)> {
        self.effects
            .iter_mut()
            .find(|e| e.name() == name)
            .map(|e| e.as_mut())
    }

    /// Typed access to a running effect, e.g. to read the missile-command score
    pub fn effect<K: EffectKind>(&self) -> Option<&Effect<K>> {
        self.get(K::NAME)
            .and_then(|e| e.as_any().downcast_ref::<Effect<K>>())
    }

    pub fn effect_mut<K: EffectKind>(&mut self) -> Option<&mut Effect<K>> {
        self.get_mut(K::NAME)
            .and_then(|e| e.as_any_mut().downcast_mut::<Effect<K>>())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Total live instances across all effects
    pub fn total_live(&self) -> usize {
        self.effects.iter().map(|e| e.live_count()).sum()
    }

    /// Kill everything without removing the effects
    pub fn clear(&mut self) {
        for effect in &mut self.effects {
            effect.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{MissileCommand, Trail};
    use cursorfx_core::Vec2;

    fn moving() -> FrameInput {
        FrameInput {
            cursor: Vec2::new(200.0, 100.0),
            previous_cursor: Vec2::new(100.0, 100.0),
            delta_time: 1.0 / 60.0,
            ..Default::default()
        }
    }

    #[test]
    fn pack_reports_draw_data_per_effect() {
        let mut stack = EffectStack::new();
        stack.enable(EffectId::Trail, 1);
        stack.enable(EffectId::Bubbles, 2);
        stack.update(&moving());
        let live = stack.pack();

        let draws = stack.draw_data();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws.iter().map(|d| d.live_count).sum::<usize>(), live);
        for draw in &draws {
            assert_eq!(draw.bytes.len(), draw.hard_max * draw.record_size);
        }
        assert!(live > 0);
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut stack = EffectStack::new();
        stack.enable(EffectId::Sigils, 1);
        stack.enable(EffectId::Sigils, 2);
        assert_eq!(stack.len(), 1);
        assert!(stack.disable("sigils"));
        assert!(stack.is_empty());
    }

    #[test]
    fn typed_access_downcasts() {
        let mut stack = EffectStack::new();
        stack.enable(EffectId::MissileCommand, 1);
        stack.enable(EffectId::Trail, 2);
        assert!(stack.effect::<MissileCommand>().is_some());
        assert_eq!(stack.effect::<MissileCommand>().map(|e| e.kind.score), Some(0));
        assert!(stack.effect_mut::<Trail>().is_some());
    }

    #[test]
    fn settings_enable_and_configure() {
        let settings = OverlaySettings::from_toml_str(
            r#"
            [overlay]
            enabled = ["trail", "lightning"]

            [trail]
            max_points = 5
            "#,
        )
        .unwrap();
        let stack = EffectStack::from_settings(&settings);
        assert_eq!(stack.names(), vec!["trail", "lightning"]);
        let trail = stack.effect::<Trail>().map(|e| e.kind.config.max_points);
        assert_eq!(trail, Some(5));
    }

    #[test]
    fn clear_empties_every_effect() {
        let mut stack = EffectStack::new();
        stack.enable(EffectId::Trail, 1);
        stack.update(&moving());
        assert!(stack.total_live() > 0);
        stack.clear();
        assert_eq!(stack.total_live(), 0);
    }
}
