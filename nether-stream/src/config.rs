//! Stream configuration (applied once, before the first render)
//!
//! A config can be built in code or loaded from TOML:
//!
//! ```toml
//! volume = 0.6
//! bpm = 140
//! ticks_per_row = 0   # 0 = module default
//! looping = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StreamError;
use crate::module::CompiledModule;
use crate::utils::{clamp_unit, samples_per_tick};
use crate::{BYTES_PER_FRAME, DEFAULT_BPM, DEFAULT_TICKS_PER_ROW, SUPPORTED_SAMPLE_RATE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Global volume scaling, clamped into [0, 1]
    pub volume: f64,
    /// Beats per minute, 0 = module default (then 120)
    pub bpm: u16,
    /// Ticks per pattern row, 0 = module default (then 6)
    ///
    /// Higher values make the song play slower.
    pub ticks_per_row: u16,
    /// Output sample rate, 0 = 44100 (the only supported rate)
    pub sample_rate: u32,
    /// Restart from the module's restart position instead of ending
    pub looping: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            volume: crate::DEFAULT_VOLUME,
            bpm: 0,
            ticks_per_row: 0,
            sample_rate: 0,
            looping: false,
        }
    }
}

impl StreamConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, StreamError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StreamError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve tempo and output settings against a module
    ///
    /// Zero values fall back to the module defaults, then to 120 BPM and
    /// 6 ticks per row.
    pub fn resolve(&self, module: &CompiledModule) -> Result<Timing, StreamError> {
        let sample_rate = match self.sample_rate {
            0 => SUPPORTED_SAMPLE_RATE,
            rate => rate,
        };
        if sample_rate != SUPPORTED_SAMPLE_RATE {
            return Err(StreamError::UnsupportedSampleRate(sample_rate));
        }

        let bpm = first_non_zero(self.bpm, module.default_bpm, DEFAULT_BPM);
        let ticks_per_row = first_non_zero(
            self.ticks_per_row,
            module.default_ticks_per_row,
            DEFAULT_TICKS_PER_ROW,
        );

        let samples_per_tick = samples_per_tick(bpm, sample_rate) as usize;
        let timing = Timing {
            sample_rate,
            bpm,
            ticks_per_row,
            samples_per_tick,
            bytes_per_tick: samples_per_tick * BYTES_PER_FRAME,
        };
        debug!(
            bpm,
            ticks_per_row,
            samples_per_tick,
            "resolved stream timing"
        );
        Ok(timing)
    }

    /// Effective global volume
    pub fn clamped_volume(&self) -> f64 {
        clamp_unit(self.volume)
    }
}

fn first_non_zero(value: u16, module_default: u16, fallback: u16) -> u16 {
    [value, module_default]
        .into_iter()
        .find(|&v| v != 0)
        .unwrap_or(fallback)
}

/// Tempo-derived playback timing of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Output sample rate (Hz)
    pub sample_rate: u32,
    /// Beats per minute
    pub bpm: u16,
    /// Ticks per pattern row
    pub ticks_per_row: u16,
    /// Stereo frames rendered per tick
    pub samples_per_tick: usize,
    /// PCM bytes rendered per tick (`samples_per_tick * 4`)
    pub bytes_per_tick: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn module_with_defaults(bpm: u16, speed: u16) -> CompiledModule {
        CompiledModule {
            num_channels: 1,
            default_bpm: bpm,
            default_ticks_per_row: speed,
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = StreamConfig::default();
        assert!((config.volume - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.bpm, 0);
        assert_eq!(config.ticks_per_row, 0);
        assert_eq!(config.sample_rate, 0);
        assert!(!config.looping);
    }

    #[test]
    fn test_resolve_falls_back_to_module_defaults() {
        let timing = StreamConfig::default()
            .resolve(&module_with_defaults(125, 4))
            .unwrap();
        assert_eq!(timing.bpm, 125);
        assert_eq!(timing.ticks_per_row, 4);
        assert_eq!(timing.sample_rate, 44100);
        assert_eq!(timing.samples_per_tick, 882);
        assert_eq!(timing.bytes_per_tick, 882 * 4);
    }

    #[test]
    fn test_resolve_falls_back_to_fixed_defaults() {
        let timing = StreamConfig::default()
            .resolve(&module_with_defaults(0, 0))
            .unwrap();
        assert_eq!(timing.bpm, 120);
        assert_eq!(timing.ticks_per_row, 6);
        assert_eq!(timing.samples_per_tick, 918);
    }

    #[test]
    fn test_resolve_overrides_module() {
        let config = StreamConfig {
            bpm: 150,
            ticks_per_row: 3,
            ..Default::default()
        };
        let timing = config.resolve(&module_with_defaults(125, 6)).unwrap();
        assert_eq!(timing.bpm, 150);
        assert_eq!(timing.ticks_per_row, 3);
        assert_eq!(timing.samples_per_tick, 735);
    }

    #[test]
    fn test_resolve_rejects_sample_rate() {
        for rate in [22050, 48000, 1] {
            let config = StreamConfig {
                sample_rate: rate,
                ..Default::default()
            };
            let result = config.resolve(&module_with_defaults(125, 6));
            assert!(matches!(result, Err(StreamError::UnsupportedSampleRate(r)) if r == rate));
        }

        let explicit = StreamConfig {
            sample_rate: 44100,
            ..Default::default()
        };
        assert!(explicit.resolve(&module_with_defaults(125, 6)).is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = StreamConfig::from_toml_str(
            r#"
            volume = 0.5
            bpm = 140
            looping = true
            "#,
        )
        .unwrap();
        assert!((config.volume - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.bpm, 140);
        assert_eq!(config.ticks_per_row, 0);
        assert!(config.looping);
    }

    #[test]
    fn test_parse_toml_invalid() {
        let result = StreamConfig::from_toml_str("bpm = \"fast\"");
        assert!(matches!(result, Err(StreamError::ConfigParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ticks_per_row = 8").unwrap();
        writeln!(file, "volume = 2.5").unwrap();

        let config = StreamConfig::load(file.path()).unwrap();
        assert_eq!(config.ticks_per_row, 8);
        assert_eq!(config.clamped_volume(), 1.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = StreamConfig::load(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(StreamError::ConfigRead { .. })));
    }
}
