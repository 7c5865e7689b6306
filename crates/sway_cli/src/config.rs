//! Sway configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "sway.toml";

/// Top-level Sway configuration (sway.toml)
#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SwayConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How scenes are ticked
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct PlaybackConfig {
    /// Ticks per simulated second
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Multiplier applied to every tick
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Seconds to play; defaults to the scene's full duration
    #[serde(default)]
    pub seconds: Option<f32>,
    /// Play the same span backward afterwards
    #[serde(default)]
    pub rewind: bool,
}

fn default_fps() -> u32 {
    60
}

fn default_speed() -> f32 {
    1.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            speed: default_speed(),
            seconds: None,
            rewind: false,
        }
    }
}

/// What gets printed
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    /// Print one line every `every` ticks
    #[serde(default = "default_every")]
    pub every: u32,
    /// Decimal places for printed values
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_every() -> u32 {
    6
}

fn default_precision() -> usize {
    2
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            every: default_every(),
            precision: default_precision(),
        }
    }
}

impl SwayConfig {
    /// Load an explicit config file, or `sway.toml` from the working
    /// directory when present, or the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "No config found at {}. Run `sway init` to create one.",
                        path.display()
                    );
                }
                path.to_path_buf()
            }
            None => {
                let path = Path::new(CONFIG_FILE);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path.to_path_buf()
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
