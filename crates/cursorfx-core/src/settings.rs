//! Typed extraction from flat TOML setting tables.
//!
//! Effect settings arrive as a key → value table. Reading is forgiving:
//! unknown keys are never looked at, missing keys leave the target untouched,
//! values of the wrong type are ignored and out-of-range numbers are clamped.

use crate::types::Color;
use std::str::FromStr;
use tracing::warn;

/// Coerce a TOML integer or float into `f32`
pub fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .filter(|f| f.is_finite())
        .unwrap_or(default)
}

/// Read a color from `"#RRGGBB"`, `"#RRGGBBAA"`, or an `[r, g, b]` / `[r, g, b, a]` array
pub fn toml_color(v: &toml::Value, default: Color) -> Color {
    if let Some(s) = v.as_str() {
        return Color::parse_hex(s).unwrap_or(default);
    }
    if let Some(arr) = v.as_array() {
        if arr.len() >= 3 {
            let alpha = arr.get(3).map(|a| toml_f32(a, default.a)).unwrap_or(1.0);
            return Color::new(
                toml_f32(&arr[0], default.r),
                toml_f32(&arr[1], default.g),
                toml_f32(&arr[2], default.b),
                alpha,
            )
            .clamped();
        }
    }
    default
}

/// `#[serde(serialize_with = "hex_color")]` writes a color in the same
/// `#RRGGBBAA` form `toml_color` reads back
pub fn hex_color<S: serde::Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_hex_string())
}

/// Borrowed view over one settings table with in-place typed setters
pub struct TableReader<'a> {
    table: &'a toml::value::Table,
}

impl<'a> TableReader<'a> {
    pub fn new(table: &'a toml::value::Table) -> Self {
        Self { table }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn f32(&self, key: &str, target: &mut f32) {
        if let Some(v) = self.table.get(key) {
            *target = toml_f32(v, *target);
        }
    }

    pub fn f32_clamped(&self, key: &str, target: &mut f32, min: f32, max: f32) {
        if let Some(v) = self.table.get(key) {
            let value = toml_f32(v, *target);
            let clamped = value.clamp(min, max);
            if clamped != value {
                warn!(key, value, clamped, "setting out of range, clamped");
            }
            *target = clamped;
        }
    }

    pub fn usize_clamped(&self, key: &str, target: &mut usize, min: usize, max: usize) {
        let Some(v) = self.table.get(key) else {
            return;
        };
        let value = v
            .as_integer()
            .or_else(|| v.as_float().filter(|f| f.is_finite()).map(|f| f as i64));
        if let Some(value) = value {
            let clamped = value.clamp(min as i64, max as i64) as usize;
            if clamped as i64 != value {
                warn!(key, value, clamped, "setting out of range, clamped");
            }
            *target = clamped;
        }
    }

    pub fn u32(&self, key: &str, target: &mut u32) {
        if let Some(i) = self.table.get(key).and_then(|v| v.as_integer()) {
            *target = i.clamp(0, u32::MAX as i64) as u32;
        }
    }

    pub fn bool(&self, key: &str, target: &mut bool) {
        if let Some(b) = self.table.get(key).and_then(|v| v.as_bool()) {
            *target = b;
        }
    }

    pub fn color(&self, key: &str, target: &mut Color) {
        if let Some(v) = self.table.get(key) {
            *target = toml_color(v, *target);
        }
    }

    /// Parse a string-valued enum; unrecognized strings keep the current value
    pub fn parse<T: FromStr>(&self, key: &str, target: &mut T) {
        let Some(s) = self.table.get(key).and_then(|v| v.as_str()) else {
            return;
        };
        match s.parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = s, "unrecognized setting value, ignored"),
        }
    }
}
