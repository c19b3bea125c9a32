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

use crate::config::{ConfigError, Settings};
use crate::instrument::InstrumentKind;

pub mod bridge;
pub mod cpal;
pub mod effects;
pub mod envelope;
pub mod format;
pub mod mock;
pub mod oscillator;
pub mod synth;
mod thread_priority;
pub mod voice;

pub use bridge::AudioBridge;
pub use format::{SampleFormat, TargetFormat};

/// Instructions sent from the bridge to whatever is producing sound.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the voice used by later attacks and releases.
    Select(InstrumentKind),
    /// Start a note on the current voice.
    Attack { note: String, frequency: f32 },
    /// Release a note on the current voice.
    Release { note: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no output device found with name {0}")]
    NoDevice(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error(transparent)]
    Devices(#[from] ::cpal::DevicesError),

    #[error(transparent)]
    DeviceName(#[from] ::cpal::DeviceNameError),

    #[error(transparent)]
    HostUnavailable(#[from] ::cpal::HostUnavailable),

    #[error(transparent)]
    SupportedConfigs(#[from] ::cpal::SupportedStreamConfigsError),

    #[error(transparent)]
    BuildStream(#[from] ::cpal::BuildStreamError),

    #[error(transparent)]
    PlayStream(#[from] ::cpal::PlayStreamError),

    #[error("audio engine has not been started")]
    NotStarted,

    #[error("audio engine has stopped")]
    ChannelClosed,

    #[error("audio engine start was interrupted: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Something that turns commands into sound.
pub trait Engine: fmt::Display + Send + 'static {
    /// Opens the output and starts producing sound. Blocks until the output is
    /// running or has failed. Starting a running engine does nothing.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Queues a command for the engine.
    fn send(&self, command: Command) -> Result<(), AudioError>;
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<cpal::DeviceInfo>, AudioError> {
    cpal::Engine::list()
}

/// Gets an engine for the configured device. Device names starting with
/// "mock" produce a mock engine.
pub fn get_engine(settings: &Settings) -> Box<dyn Engine> {
    let device = settings.audio().device();
    if device.starts_with("mock") {
        return Box::new(mock::Engine::get(device));
    }

    Box::new(cpal::Engine::new(settings.clone()))
}
