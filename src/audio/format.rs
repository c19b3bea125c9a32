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
use std::fmt;

use serde::{Deserialize, Serialize};

use super::AudioError;

/// Sample format enumeration for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Integer samples (16 or 32 bit)
    Int,
    /// 32-bit floating point samples
    #[default]
    Float,
}

impl SampleFormat {
    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Float => "float",
            SampleFormat::Int => "int",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The format the output stream is opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Sample format (integer or float)
    pub sample_format: SampleFormat,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl TargetFormat {
    /// Creates a new TargetFormat
    pub fn new(
        sample_rate: u32,
        sample_format: SampleFormat,
        bits_per_sample: u16,
    ) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::UnsupportedFormat(
                "sample rate must be greater than 0".to_string(),
            ));
        }

        let bits_per_sample = match sample_format {
            SampleFormat::Float => 32,
            SampleFormat::Int if bits_per_sample == 16 || bits_per_sample == 32 => bits_per_sample,
            SampleFormat::Int => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{}-bit integer samples",
                    bits_per_sample
                )))
            }
        };

        Ok(TargetFormat {
            sample_rate,
            sample_format,
            bits_per_sample,
        })
    }

    /// The matching cpal sample format.
    pub fn cpal_format(&self) -> cpal::SampleFormat {
        match (self.sample_format, self.bits_per_sample) {
            (SampleFormat::Float, _) => cpal::SampleFormat::F32,
            (SampleFormat::Int, 16) => cpal::SampleFormat::I16,
            (SampleFormat::Int, _) => cpal::SampleFormat::I32,
        }
    }

    /// The stream configuration for `channels` interleaved channels.
    pub fn stream_config(&self, channels: u16) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz {}{}",
            self.sample_rate, self.sample_format, self.bits_per_sample
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_format() {
        let format = TargetFormat::new(44100, SampleFormat::Float, 16).unwrap();
        assert_eq!(format.bits_per_sample, 32);
        assert_eq!(format.cpal_format(), cpal::SampleFormat::F32);

        let format = TargetFormat::new(48000, SampleFormat::Int, 16).unwrap();
        assert_eq!(format.cpal_format(), cpal::SampleFormat::I16);
        assert_eq!(format.to_string(), "48000Hz int16");

        assert!(TargetFormat::new(0, SampleFormat::Float, 32).is_err());
        assert!(TargetFormat::new(44100, SampleFormat::Int, 24).is_err());
    }

    #[test]
    fn test_stream_config() {
        let format = TargetFormat::new(48000, SampleFormat::Int, 32).unwrap();
        let config = format.stream_config(2);
        assert_eq!(config.channels, 2);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, cpal::BufferSize::Default);
    }
}
