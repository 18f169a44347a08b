//! Launch configuration loaded from TOML.
//!
//! ```toml
//! [launch]
//! place = "device"
//! teams = [17, 16]
//! threads = [16, 16]
//! shared_words = 4096
//!
//! [device]            # optional, overrides individual limits
//! max_threads_per_block = 512
//! ```

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::Deserialize;

use crate::device::DeviceLimits;
use crate::error::LaunchError;
use crate::teams::{ExecPlace, Lanes, Resources, Teams, Threads, DEFAULT_SHARED_WORDS};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    launch: RawLaunch,
    #[serde(default)]
    device: Option<DeviceLimits>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLaunch {
    #[serde(default = "default_place")]
    place: String,
    #[serde(default = "default_extent")]
    teams: Vec<u32>,
    #[serde(default = "default_extent")]
    threads: Vec<u32>,
    #[serde(default)]
    lanes: u32,
    #[serde(default = "default_shared_words")]
    shared_words: usize,
}

impl Default for RawLaunch {
    fn default() -> Self {
        Self {
            place: default_place(),
            teams: default_extent(),
            threads: default_extent(),
            lanes: 0,
            shared_words: default_shared_words(),
        }
    }
}

fn default_place() -> String {
    "host".to_string()
}

fn default_extent() -> Vec<u32> {
    vec![1]
}

fn default_shared_words() -> usize {
    DEFAULT_SHARED_WORDS
}

/// A validated launch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub place: ExecPlace,
    pub resources: Resources,
    pub device: DeviceLimits,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            place: ExecPlace::Host,
            resources: Resources::default(),
            device: DeviceLimits::default(),
        }
    }
}

/// Pad a 1–3 element extent list with ones.
fn extent3(name: &str, values: &[u32]) -> Result<[u32; 3], LaunchError> {
    if values.is_empty() || values.len() > 3 {
        return Err(LaunchError::Config(format!(
            "'{name}' needs 1 to 3 extents, got {}",
            values.len()
        )));
    }
    let mut out = [1; 3];
    out[..values.len()].copy_from_slice(values);
    Ok(out)
}

impl LaunchConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LaunchError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), place = %config.place, "loaded launch config");
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self, LaunchError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| LaunchError::Config(e.to_string()))?;

        let place: ExecPlace = raw.launch.place.parse()?;
        let teams = extent3("teams", &raw.launch.teams)?;
        let threads = extent3("threads", &raw.launch.threads)?;
        let resources = Resources::new(
            Teams::xyz(teams[0], teams[1], teams[2]),
            Threads::xyz(threads[0], threads[1], threads[2]),
        )
        .with_lanes(Lanes::new(raw.launch.lanes))
        .with_shared_words(raw.launch.shared_words);
        resources.validate()?;

        let device = raw.device.unwrap_or_default();
        if device.max_threads_per_block == 0
            || device.max_block_dim.contains(&0)
            || device.max_grid_dim.contains(&0)
        {
            return Err(LaunchError::Config(format!(
                "device limits must be positive: {device:?}"
            )));
        }

        Ok(Self {
            place,
            resources,
            device,
        })
    }
}
