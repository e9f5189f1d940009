//! Profile and palette loading, plus the CLI/file/default merge.
//!
//! Precedence, highest first: explicit CLI flags, a `--palette` JSON
//! file, a `--profile` TOML file, then the engine defaults. The merge
//! produces builder calls only for values that were actually supplied,
//! so validation stays in one place inside the engine.

use std::fs;
use std::path::Path;

use gradient::{GradientConfig, GradientConfigBuilder};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid profile {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid palette {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Optional overrides loaded from a TOML profile.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub amplitude: Option<f32>,
    pub colors: Option<Vec<String>>,
    pub density: Option<[f32; 2]>,
    pub fps: Option<u32>,
    pub seed: Option<f32>,
    pub speed: Option<f32>,
    pub time: Option<f64>,
    pub wireframe: Option<bool>,
}

pub fn load_profile(path: &Path) -> Result<Profile, ProfileError> {
    let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ProfileError::Toml {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a palette file: a JSON array of hex color strings.
pub fn load_palette(path: &Path) -> Result<Vec<String>, ProfileError> {
    let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ProfileError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Merges CLI flags over file-loaded settings over the defaults.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<GradientConfig> {
    let profile = match cli.profile.as_deref() {
        Some(path) => load_profile(path)?,
        None => Profile::default(),
    };
    let palette = match cli.palette.as_deref() {
        Some(path) => Some(load_palette(path)?),
        None => None,
    };

    let mut builder = GradientConfigBuilder::default();
    if let Some(colors) = cli
        .colors
        .clone()
        .or(palette)
        .or_else(|| profile.colors.clone())
    {
        builder = builder.colors(colors);
    }
    if let Some(density) = cli.density.or(profile.density) {
        builder = builder.density(density);
    }
    if let Some(fps) = cli.fps.or(profile.fps) {
        builder = builder.fps(fps);
    }
    if let Some(speed) = cli.speed.or(profile.speed) {
        builder = builder.speed(speed);
    }
    if let Some(amplitude) = cli.amplitude.or(profile.amplitude) {
        builder = builder.amplitude(amplitude);
    }
    if let Some(seed) = cli.seed.or(profile.seed) {
        builder = builder.seed(seed);
    }
    if let Some(time) = cli.time.or(profile.time) {
        builder = builder.time(time);
    }
    if let Some(wireframe) = cli.wireframe.or(profile.wireframe) {
        builder = builder.wireframe(wireframe);
    }
    Ok(builder.build()?)
}
