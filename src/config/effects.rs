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

use serde::{Deserialize, Serialize};

use super::audio::parse_duration;
use super::error::ConfigError;

/// The master effect chain: a feedback delay feeding a reverb.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Effects {
    #[serde(default)]
    delay: Delay,

    #[serde(default)]
    reverb: Reverb,
}

impl Effects {
    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    pub fn reverb(&self) -> &Reverb {
        &self.reverb
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        self.delay.validate()?;
        self.reverb.validate()
    }
}

/// A feedback delay. The default time is an eighth note at 120 BPM.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct Delay {
    time: String,
    feedback: f32,
    /// An even mix by default. At 1.0 only the delayed signal is heard, so
    /// every note starts one delay time late.
    wet: f32,
}

impl Default for Delay {
    fn default() -> Self {
        Delay {
            time: "250ms".to_string(),
            feedback: 0.3,
            wet: 0.5,
        }
    }
}

impl Delay {
    pub fn time(&self) -> Result<Duration, ConfigError> {
        parse_duration("effects.delay.time", &self.time)
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.time()?.is_zero() {
            return Err(ConfigError::invalid(
                "effects.delay.time",
                "must be longer than zero",
            ));
        }
        if !(0.0..1.0).contains(&self.feedback) {
            return Err(ConfigError::invalid(
                "effects.delay.feedback",
                format!("{} is outside [0, 1)", self.feedback),
            ));
        }
        validate_wet("effects.delay.wet", self.wet)
    }
}

/// A reverb with the given decay time.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct Reverb {
    decay: String,
    wet: f32,
}

impl Default for Reverb {
    fn default() -> Self {
        Reverb {
            decay: "3.5s".to_string(),
            wet: 0.5,
        }
    }
}

impl Reverb {
    pub fn decay(&self) -> Result<Duration, ConfigError> {
        parse_duration("effects.reverb.decay", &self.decay)
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.decay()?.is_zero() {
            return Err(ConfigError::invalid(
                "effects.reverb.decay",
                "must be longer than zero",
            ));
        }
        validate_wet("effects.reverb.wet", self.wet)
    }
}

fn validate_wet(field: &str, wet: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&wet) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} is outside [0, 1]", wet),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let effects = Effects::default();
        assert_eq!(effects.delay().time().unwrap(), Duration::from_millis(250));
        assert_eq!(effects.delay().feedback(), 0.3);
        assert_eq!(effects.delay().wet(), 0.5);
        assert_eq!(effects.reverb().decay().unwrap(), Duration::from_millis(3500));
        assert_eq!(effects.reverb().wet(), 0.5);
        assert!(effects.validate().is_ok());
    }

    #[test]
    fn test_feedback_must_decay() {
        let delay = Delay {
            feedback: 1.0,
            ..Default::default()
        };
        assert!(delay.validate().is_err());
    }

    #[test]
    fn test_wet_range() {
        let reverb = Reverb {
            wet: 1.5,
            ..Default::default()
        };
        assert!(reverb.validate().is_err());

        let reverb = Reverb {
            wet: 1.0,
            ..Default::default()
        };
        assert!(reverb.validate().is_ok());
    }

    #[test]
    fn test_zero_decay_rejected() {
        let reverb = Reverb {
            decay: "0s".to_string(),
            ..Default::default()
        };
        assert!(reverb.validate().is_err());
    }
}
