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
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use sinfonia::audio;
use sinfonia::config::Settings;
#[cfg(feature = "gui")]
use sinfonia::instrument::InstrumentKind;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A virtual instrument."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Opens the instrument window.
    #[cfg(feature = "gui")]
    Start {
        /// The path to the settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The audio device to play through. Overrides the settings file.
        #[arg(short, long)]
        device: Option<String>,
        /// The instrument to start with.
        #[arg(short, long, value_enum, default_value_t = InstrumentKind::Piano)]
        instrument: InstrumentKind,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the voice table in effect, built-in voices merged with any overrides.
    Voices {
        /// The path to the settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "gui")]
        Commands::Start {
            config,
            device,
            instrument,
        } => {
            let mut settings = Settings::load_or_default(config.as_deref())?;
            if let Some(device) = device {
                settings.audio_mut().set_device(&device);
            }

            let runtime = tokio::runtime::Handle::current();
            tokio::task::block_in_place(|| sinfonia::app::run(settings, runtime, instrument))?;
        }
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Voices { config } => {
            let settings = Settings::load_or_default(config.as_deref())?;
            print!("{}", serde_yml::to_string(&settings.voices().resolved())?);
        }
    };

    Ok(())
}
