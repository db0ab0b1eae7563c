use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;

/// * `speed_factor` - Compression of simulated travel time into playback time (20 = 20x faster)
/// * `min_step_delay_ms` - (ms) Lower bound for the interval between two marker moves
/// * `clock_tick_ms` - (ms) Refresh interval of the race clock display
/// * `countdown_from` - First countdown label, counted down to "GO"
/// * `countdown_interval_ms` - (ms) Time between two countdown labels
/// * `default_travel_time_s` - (s) Travel time assumed when the backend reports none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub speed_factor: f64,
    pub min_step_delay_ms: u64,
    pub clock_tick_ms: u64,
    pub countdown_from: u32,
    pub countdown_interval_ms: u64,
    pub default_travel_time_s: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            speed_factor: 20.0,
            min_step_delay_ms: 10,
            clock_tick_ms: 37,
            countdown_from: 3,
            countdown_interval_ms: 1000,
            default_travel_time_s: 100.0,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            return Err(ConfigError::SpeedFactor(self.speed_factor));
        }
        if !(self.default_travel_time_s.is_finite() && self.default_travel_time_s > 0.0) {
            return Err(ConfigError::DefaultTravelTime(self.default_travel_time_s));
        }
        if self.min_step_delay_ms == 0 {
            return Err(ConfigError::ZeroInterval("min_step_delay_ms"));
        }
        if self.clock_tick_ms == 0 {
            return Err(ConfigError::ZeroInterval("clock_tick_ms"));
        }
        if self.countdown_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("countdown_interval_ms"));
        }
        Ok(())
    }

    pub fn min_step_delay(&self) -> Duration {
        Duration::from_millis(self.min_step_delay_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }
}

/// read_playback_config reads playback constants from a JSON file. Fields missing in the file
/// keep their default values.
pub fn read_playback_config(filepath: &Path) -> anyhow::Result<PlaybackConfig> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open playback config file {}!",
            filepath.display()
        ))?;
    let config: PlaybackConfig = serde_json::from_reader(&fh).context(format!(
        "Failed to parse playback config file {}!",
        filepath.display()
    ))?;
    config.validate()?;
    Ok(config)
}
