//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Example configuration written by `touchmidi init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../touchmidi.example.yaml");

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<TouchMidiConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: TouchMidiConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
