//! Print or write a settings file with every effect at its defaults

use anyhow::{Context, Result};
use cursorfx_particles::OverlaySettings;
use std::path::Path;

pub fn run(output: Option<&Path>) -> Result<()> {
    let text = OverlaySettings::defaults_toml().context("Failed to serialize default settings")?;
    match output {
        Some(path) => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default settings to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
