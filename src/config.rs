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
use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

mod audio;
mod effects;
mod error;
mod voice;

pub use self::audio::Audio;
pub use self::effects::{Delay, Effects, Reverb};
pub use self::error::ConfigError;
pub use self::voice::{
    AmPatch, Envelope, FmPatch, NoteOffBehavior, PluckPatch, RetriggerBehavior, VoicePatch,
    Voices, Waveform,
};

const DEFAULT_PARTICLE_COUNT: usize = 15;

/// Particle effect settings.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Particles {
    /// Particles spawned per note (default: 15)
    count: Option<usize>,
}

impl Particles {
    pub fn count(&self) -> usize {
        self.count.unwrap_or(DEFAULT_PARTICLE_COUNT)
    }
}

/// The top level settings file. Every section is optional.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    audio: Audio,

    #[serde(default)]
    effects: Effects,

    #[serde(default)]
    voices: Voices,

    #[serde(default)]
    particles: Particles,
}

impl Settings {
    /// Loads and validates settings from a YAML file.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Parses and validates settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from the given file, or returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Settings, ConfigError> {
        match path {
            Some(path) => Settings::load(path),
            None => Ok(Settings::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audio.validate()?;
        self.effects.validate()?;
        self.voices.validate()
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut Audio {
        &mut self.audio
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn voices(&self) -> &Voices {
        &self.voices
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }
}
