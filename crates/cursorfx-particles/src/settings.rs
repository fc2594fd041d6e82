//! Overlay settings file.
//!
//! One TOML document: an `[overlay]` table for the frame loop and the list of
//! enabled effects, plus one flat table per effect named after it:
//!
//! ```toml
//! [overlay]
//! enabled = ["trail", "bubbles"]
//! fixed_hz = 60.0
//!
//! [bubbles]
//! max_bubbles = 300
//! color = "#9fd8ffff"
//! ```
//!
//! Values are forgiving in the same way as effect settings. Only a missing
//! file or broken TOML syntax is an error.

use crate::effects::EffectId;
use cursorfx_core::settings::toml_f32;
use cursorfx_core::{FxError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Frame-loop and effect selection options from `[overlay]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayOptions {
    /// Effects to run, in draw order
    pub enabled: Vec<EffectId>,
    /// Fixed simulation rate in Hz
    pub fixed_hz: f64,
    /// Longest real frame fed to the accumulator, in seconds
    pub max_frame_time: f64,
    /// Base seed; each effect gets `seed + position in enabled`
    pub seed: u64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            enabled: vec![EffectId::Trail, EffectId::Bubbles],
            fixed_hz: 60.0,
            max_frame_time: 0.25,
            seed: 0x5EED,
        }
    }
}

impl OverlayOptions {
    fn apply(&mut self, table: &toml::value::Table) {
        if let Some(list) = table.get("enabled").and_then(|v| v.as_array()) {
            let mut enabled = Vec::new();
            for name in list.iter().filter_map(|v| v.as_str()) {
                match name.parse::<EffectId>() {
                    Ok(id) if !enabled.contains(&id) => enabled.push(id),
                    Ok(_) => warn!(effect = name, "effect listed twice, ignoring duplicate"),
                    Err(err) => warn!(%err, "skipping unknown effect"),
                }
            }
            self.enabled = enabled;
        }
        if let Some(v) = table.get("fixed_hz") {
            self.fixed_hz = f64::from(toml_f32(v, self.fixed_hz as f32).clamp(1.0, 1000.0));
        }
        if let Some(v) = table.get("max_frame_time") {
            self.max_frame_time =
                f64::from(toml_f32(v, self.max_frame_time as f32).clamp(0.001, 1.0));
        }
        if let Some(seed) = table.get("seed").and_then(|v| v.as_integer()) {
            self.seed = seed as u64;
        }
    }
}

/// Parsed settings document
#[derive(Debug, Clone, Default)]
pub struct OverlaySettings {
    pub overlay: OverlayOptions,
    effects: toml::value::Table,
}

impl OverlaySettings {
    /// Load and parse a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            effects = settings.overlay.enabled.len(),
            "loaded overlay settings"
        );
        Ok(settings)
    }

    pub fn from_toml_str(src: &str) -> Result<Self> {
        let mut root: toml::value::Table = toml::from_str(src)?;
        let mut overlay = OverlayOptions::default();
        if let Some(value) = root.remove("overlay") {
            let table = value.as_table().ok_or_else(|| {
                FxError::SettingsError("[overlay] must be a table".to_string())
            })?;
            overlay.apply(table);
        }

        let mut effects = toml::value::Table::new();
        for (key, value) in root {
            if key.parse::<EffectId>().is_err() {
                warn!(table = %key, "ignoring settings for unknown effect");
                continue;
            }
            match value {
                toml::Value::Table(table) => {
                    effects.insert(key, toml::Value::Table(table));
                }
                _ => warn!(table = %key, "effect settings must be a table, ignored"),
            }
        }
        Ok(Self { overlay, effects })
    }

    /// The settings table for `id`, if the document has one
    pub fn effect_table(&self, id: EffectId) -> Option<&toml::value::Table> {
        self.effects.get(id.name()).and_then(|v| v.as_table())
    }

    /// A complete document with every effect at its default values
    pub fn defaults_toml() -> Result<String> {
        let mut root = toml::value::Table::new();
        root.insert(
            "overlay".to_string(),
            toml::Value::try_from(OverlayOptions::default())?,
        );
        for id in EffectId::ALL {
            root.insert(id.name().to_string(), id.create(0).settings_toml());
        }
        Ok(toml::to_string_pretty(&root)?)
    }
}
