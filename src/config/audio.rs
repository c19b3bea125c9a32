// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::time::Duration;

use duration_string::DurationString;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::audio::SampleFormat;

const DEFAULT_DEVICE: &str = "default";
const DEFAULT_SAMPLE_RATE: u32 = 44100;
const DEFAULT_BITS_PER_SAMPLE: u16 = 32;
const DEFAULT_MAX_VOICES: usize = 32;
const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(100);

/// A YAML representation of the audio configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Audio {
    /// The output device. "default" picks the host's default output.
    device: Option<String>,

    /// Target sample rate in Hz (default: 44100)
    sample_rate: Option<u32>,

    /// Target sample format (default: float)
    sample_format: Option<SampleFormat>,

    /// Target bits per sample when the format is int (default: 32)
    bits_per_sample: Option<u16>,

    /// Maximum number of voices sounding at once (default: 32)
    max_voices: Option<usize>,

    /// How long after a release command the envelope starts releasing.
    release_delay: Option<String>,
}

impl Audio {
    /// New will create a new Audio configuration for the given device.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: Some(device.to_string()),
            ..Default::default()
        }
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Overrides the configured device.
    pub fn set_device(&mut self, device: &str) {
        self.device = Some(device.to_string());
    }

    /// Returns the target sample rate (default: 44100)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Returns the target sample format (default: float)
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format.unwrap_or_default()
    }

    /// Returns the target bits per sample (default: 32)
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample.unwrap_or(DEFAULT_BITS_PER_SAMPLE)
    }

    /// Returns the polyphony limit (default: 32)
    pub fn max_voices(&self) -> usize {
        self.max_voices.unwrap_or(DEFAULT_MAX_VOICES)
    }

    /// Returns the release delay (default: 100ms)
    pub fn release_delay(&self) -> Result<Duration, ConfigError> {
        match &self.release_delay {
            Some(release_delay) => parse_duration("audio.release_delay", release_delay),
            None => Ok(DEFAULT_RELEASE_DELAY),
        }
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate() == 0 {
            return Err(ConfigError::invalid(
                "audio.sample_rate",
                "must be greater than 0",
            ));
        }
        if self.max_voices() == 0 {
            return Err(ConfigError::invalid("audio.max_voices", "must be at least 1"));
        }
        if self.sample_format() == SampleFormat::Int && ![16, 32].contains(&self.bits_per_sample())
        {
            return Err(ConfigError::invalid(
                "audio.bits_per_sample",
                format!("{} is not one of 16 or 32", self.bits_per_sample()),
            ));
        }
        self.release_delay()?;
        Ok(())
    }
}

/// Parses a duration string like "250ms" or "3.5s".
pub(super) fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    DurationString::from_string(value.to_string())
        .map(Duration::from)
        .or_else(|e| {
            // duration-string has no fractional units, so "3.5s" falls back to plain seconds.
            value
                .strip_suffix('s')
                .and_then(|secs| secs.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .ok_or_else(|| ConfigError::invalid(field, e.to_string()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let audio = Audio::default();
        assert_eq!(audio.device(), "default");
        assert_eq!(audio.sample_rate(), 44100);
        assert_eq!(audio.sample_format(), SampleFormat::Float);
        assert_eq!(audio.bits_per_sample(), 32);
        assert_eq!(audio.max_voices(), 32);
        assert_eq!(audio.release_delay().unwrap(), Duration::from_millis(100));
        assert!(audio.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(
            parse_duration("x", "250ms").unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            parse_duration("x", "3.5s").unwrap(),
            Duration::from_millis(3500)
        );
        assert_eq!(parse_duration("x", "2s").unwrap(), Duration::from_secs(2));
        assert!(parse_duration("x", "soon").is_err());
        assert!(parse_duration("x", "-1s").is_err());
    }

    #[test]
    fn test_invalid_values() {
        let mut audio = Audio::new("mock");
        audio.max_voices = Some(0);
        assert!(audio.validate().is_err());

        let mut audio = Audio::new("mock");
        audio.sample_format = Some(SampleFormat::Int);
        audio.bits_per_sample = Some(24);
        assert!(audio.validate().is_err());

        let mut audio = Audio::new("mock");
        audio.release_delay = Some("later".to_string());
        assert!(audio.validate().is_err());
    }
}
