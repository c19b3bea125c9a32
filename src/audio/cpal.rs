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
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, span, Level};

use super::synth::Synth;
use super::thread_priority::CallbackPriority;
use super::{AudioError, Command, TargetFormat};
use crate::config::Settings;

/// The device name that selects the host's default output.
const DEFAULT_DEVICE: &str = "default";

/// An output device as shown by the `devices` command.
pub struct DeviceInfo {
    name: String,
    max_channels: u16,
    host_id: cpal::HostId,
}

impl DeviceInfo {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}) ({})",
            self.name,
            self.max_channels,
            self.host_id.name()
        )
    }
}

/// Plays the synthesizer through a cpal output device.
///
/// The stream is created on a dedicated output thread and lives there until
/// the engine is dropped. Commands reach the audio callback over a channel.
pub struct Engine {
    settings: Settings,
    commands: Option<Sender<Command>>,
    shutdown: Arc<AtomicBool>,
    output_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cpal)", self.settings.audio().device())
    }
}

/// Everything the audio callback owns.
struct Callback {
    synth: Synth,
    commands: Receiver<Command>,
    channels: usize,
    priority: CallbackPriority,
}

impl Callback {
    fn fill(&mut self, data: &mut [f32]) {
        self.priority.apply();
        while let Ok(command) = self.commands.try_recv() {
            self.synth.handle(command);
        }
        self.synth.render(data, self.channels);
    }
}

/// f32 callback: render straight into the cpal buffer.
fn create_f32_callback(
    mut callback: Callback,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        callback.fill(data);
    }
}

/// Integer callback: render into a scratch buffer and convert.
fn create_converting_callback<T: cpal::SizedSample + cpal::FromSample<f32>>(
    mut callback: Callback,
) -> impl FnMut(&mut [T], &cpal::OutputCallbackInfo) + Send + 'static {
    let mut scratch: Vec<f32> = Vec::new();
    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        // Only grows when the host hands us a larger buffer than before.
        if scratch.len() < data.len() {
            scratch.resize(data.len(), 0.0);
        }
        let scratch = &mut scratch[..data.len()];
        callback.fill(scratch);
        for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
            *dst = T::from_sample(src);
        }
    }
}

fn build_stream(
    device: &cpal::Device,
    format: &TargetFormat,
    channels: u16,
    callback: Callback,
) -> Result<cpal::Stream, AudioError> {
    let config = format.stream_config(channels);
    let on_error = |err: cpal::StreamError| error!("CPAL output stream error: {}", err);

    let stream = match format.cpal_format() {
        cpal::SampleFormat::F32 => {
            device.build_output_stream(&config, create_f32_callback(callback), on_error, None)?
        }
        cpal::SampleFormat::I16 => device.build_output_stream(
            &config,
            create_converting_callback::<i16>(callback),
            on_error,
            None,
        )?,
        cpal::SampleFormat::I32 => device.build_output_stream(
            &config,
            create_converting_callback::<i32>(callback),
            on_error,
            None,
        )?,
        other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
    };
    Ok(stream)
}

/// The largest channel count any output configuration of the device offers.
fn max_output_channels(device: &cpal::Device) -> Result<u16, AudioError> {
    Ok(device
        .supported_output_configs()?
        .map(|config| config.channels())
        .max()
        .unwrap_or(0))
}

impl Engine {
    pub fn new(settings: Settings) -> Engine {
        Engine {
            settings,
            commands: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            output_thread: None,
        }
    }

    /// Lists every output device of every available host.
    pub fn list() -> Result<Vec<DeviceInfo>, AudioError> {
        Ok(Engine::list_cpal_devices()?
            .into_iter()
            .map(|(info, _)| info)
            .collect())
    }

    fn list_cpal_devices() -> Result<Vec<(DeviceInfo, cpal::Device)>, AudioError> {
        // Suppress noisy output here.
        let _shh_stdout = shh::stdout()?;
        let _shh_stderr = shh::stderr()?;

        let mut devices = Vec::new();
        for host_id in cpal::available_hosts() {
            let host_devices = match cpal::host_from_id(host_id)?.devices() {
                Ok(host_devices) => host_devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in host_devices {
                let Ok(max_channels) = max_output_channels(&device) else {
                    continue;
                };
                if max_channels > 0 {
                    // Names stay the lookup key for the device setting.
                    #[allow(deprecated)]
                    let info = DeviceInfo {
                        name: device.name()?,
                        max_channels,
                        host_id,
                    };
                    devices.push((info, device));
                }
            }
        }

        devices.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));
        Ok(devices)
    }

    /// Finds the configured device.
    fn find_device(name: &str) -> Result<cpal::Device, AudioError> {
        if name == DEFAULT_DEVICE {
            return cpal::default_host()
                .default_output_device()
                .ok_or_else(|| AudioError::NoDevice(name.to_string()));
        }

        Engine::list_cpal_devices()?
            .into_iter()
            .find(|(info, _)| info.name.trim() == name)
            .map(|(_, device)| device)
            .ok_or_else(|| AudioError::NoDevice(name.to_string()))
    }
}

impl super::Engine for Engine {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.commands.is_some() {
            return Ok(());
        }

        let audio = self.settings.audio();
        let format = TargetFormat::new(
            audio.sample_rate(),
            audio.sample_format(),
            audio.bits_per_sample(),
        )?;
        let synth = Synth::new(&self.settings, format.sample_rate)?;
        let device = Engine::find_device(audio.device())?;
        let channels = max_output_channels(&device)?.clamp(1, 2);

        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), AudioError>>(1);
        let callback = Callback {
            synth,
            commands: command_rx,
            channels: channels as usize,
            priority: CallbackPriority::from_env(),
        };

        self.shutdown.store(false, Ordering::Relaxed);
        let shutdown = self.shutdown.clone();
        let name = audio.device().to_string();

        // Create the stream inside the output thread, which keeps it alive.
        let output_thread = thread::Builder::new()
            .name("sinfonia-output".to_string())
            .spawn(move || {
                let span = span!(Level::INFO, "audio output", device = name);
                let _enter = span.enter();

                let stream = match build_stream(&device, &format, channels, callback) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
                info!(format = %format, channels, "CPAL output stream started");
                let _ = ready_tx.send(Ok(()));

                while !shutdown.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(100));
                }
                info!("CPAL output stream stopped");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.commands = Some(command_tx);
                self.output_thread = Some(output_thread);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = output_thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = output_thread.join();
                Err(AudioError::ChannelClosed)
            }
        }
    }

    fn send(&self, command: Command) -> Result<(), AudioError> {
        self.commands
            .as_ref()
            .ok_or(AudioError::NotStarted)?
            .send(command)
            .map_err(|_| AudioError::ChannelClosed)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.commands = None;
        if let Some(thread) = self.output_thread.take() {
            let _ = thread.join();
        }
    }
}
