use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::exercise::ExerciseKind;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub http_port: u16,
    /// Exercise targeted by the parameterless endpoint variants.
    pub default_exercise: ExerciseKind,
    pub jpeg_quality: u8,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_channel_capacity: usize,
    pub event_channel_capacity: usize,
    /// Frames per full extend/contract cycle of the synthetic rig.
    pub synthetic_period_frames: u32,
    pub synthetic_frame_interval_ms: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            http_port: 5000,
            default_exercise: ExerciseKind::Squat,
            jpeg_quality: 80,
            frame_width: 640,
            frame_height: 480,
            frame_channel_capacity: 16,
            event_channel_capacity: 64,
            synthetic_period_frames: 90,
            synthetic_frame_interval_ms: 33,
        }
    }
}

impl Configuration {
    /// Layered load: defaults, then `repwatch.toml`, then `REPWATCH_*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("repwatch").required(false))
            .add_source(Environment::with_prefix("REPWATCH"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let configuration = Configuration::default();
        assert_eq!(configuration.default_exercise, ExerciseKind::Squat);
        assert!(configuration.jpeg_quality <= 100);
        assert!(configuration.frame_channel_capacity > 0);
    }
}
