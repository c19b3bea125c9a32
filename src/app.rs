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

//! The desktop shell: start screen, instrument picker and the playable canvas.

use crossbeam_channel::{Receiver, TryRecvError};
use eframe::egui;
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::audio::AudioError;
use crate::config::Settings;
use crate::instrument::InstrumentKind;
use crate::mapper::CanvasSize;
use crate::surface::InteractionSurface;

mod canvas;
mod input;

use input::PointerInput;

const TITLE: &str = "SINFONÍA IA";
const INIT_FAILED: &str =
    "Could not initialize the audio experience. Please check your audio device and try again.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("eframe error: {0}")]
    Eframe(#[from] eframe::Error),
}

type StartResult = (InteractionSurface, Result<(), AudioError>);

pub struct App {
    settings: Settings,
    runtime: Handle,
    /// Absent while audio is being started in the background.
    surface: Option<InteractionSurface>,
    starting: Option<Receiver<StartResult>>,
    instrument: InstrumentKind,
    input: PointerInput,
    error: Option<String>,
}

impl App {
    pub fn new(settings: Settings, runtime: Handle, instrument: InstrumentKind) -> App {
        let surface = App::new_surface(&settings, instrument);
        App {
            settings,
            runtime,
            surface: Some(surface),
            starting: None,
            instrument,
            input: PointerInput::default(),
            error: None,
        }
    }

    fn new_surface(settings: &Settings, instrument: InstrumentKind) -> InteractionSurface {
        let mut surface = InteractionSurface::from_settings(settings);
        if surface.instrument() != instrument {
            surface.set_instrument(instrument);
        }
        surface
    }

    fn is_initializing(&self) -> bool {
        self.starting.is_some()
    }

    fn is_ready(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_ready())
    }

    /// Starts audio on the runtime. The surface travels with the task and
    /// comes back through the channel.
    fn start(&mut self, ctx: &egui::Context) {
        if self.is_initializing() || self.is_ready() {
            return;
        }
        let Some(mut surface) = self.surface.take() else {
            return;
        };

        info!("Initializing audio");
        let (tx, rx) = crossbeam_channel::bounded(1);
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = surface.initialize().await;
            let _ = tx.send((surface, result));
            ctx.request_repaint();
        });
        self.starting = Some(rx);
    }

    fn poll_start(&mut self) {
        let Some(rx) = &self.starting else {
            return;
        };
        let received = rx.try_recv();
        let (mut surface, result) = match received {
            Ok(received) => received,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                error!("Audio initialization task went away");
                self.starting = None;
                self.surface = Some(App::new_surface(&self.settings, self.instrument));
                self.error = Some(INIT_FAILED.to_string());
                return;
            }
        };
        self.starting = None;

        if let Err(e) = result {
            error!(err = %e, "Failed to initialize audio");
            self.error = Some(format!("{}\n\n{}", INIT_FAILED, e));
        }
        // The picker may have changed while we were waiting.
        if surface.instrument() != self.instrument {
            surface.set_instrument(self.instrument);
        }
        self.surface = Some(surface);
    }

    fn select_instrument(&mut self, instrument: InstrumentKind) {
        if instrument == self.instrument {
            return;
        }
        self.instrument = instrument;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_instrument(instrument);
        }
    }

    fn start_screen(&mut self, ctx: &egui::Context) {
        let mut start = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.heading(egui::RichText::new(TITLE).size(48.0).color(canvas::ACCENT));
                ui.label("An interactive sound experience");
                ui.add_space(30.0);

                if self.is_initializing() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Initializing...");
                    });
                } else {
                    let button = egui::Button::new(egui::RichText::new("Tap to start").size(24.0))
                        .min_size(egui::vec2(220.0, 60.0));
                    start = ui.add_enabled(self.error.is_none(), button).clicked();
                }
            });
        });
        if start {
            self.start(ctx);
        }
    }

    fn instrument_view(&mut self, ctx: &egui::Context) {
        let mut selected = None;
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new(TITLE).size(32.0).color(canvas::ACCENT));
                ui.label("Select an instrument and create your melody");
                ui.horizontal(|ui| {
                    for kind in InstrumentKind::ALL {
                        if ui
                            .selectable_label(kind == self.instrument, kind.display_name())
                            .clicked()
                        {
                            selected = Some(kind);
                        }
                    }
                });
            });
        });
        if let Some(kind) = selected {
            self.select_instrument(kind);
        }

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let input = &mut self.input;
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            surface.resize(CanvasSize::new(rect.width(), rect.height()));

            let events = ctx.input(|i| i.events.clone());
            input.handle(&events, rect, surface);

            let frame = surface.frame();
            canvas::paint(&painter, rect, &frame);
        });

        // Particles and highlights are redrawn every frame.
        ctx.request_repaint();
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.error else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Audio error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(10.0);
                dismissed = ui.button("OK").clicked();
            });
        if dismissed {
            self.error = None;
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_start();

        if self.is_ready() {
            self.instrument_view(ctx);
        } else {
            self.start_screen(ctx);
        }
        self.error_window(ctx);
    }
}

/// Opens the window and blocks until it is closed.
pub fn run(
    settings: Settings,
    runtime: Handle,
    instrument: InstrumentKind,
) -> Result<(), AppError> {
    info!(instrument = %instrument, "Starting sinfonia");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sinfonía")
            .with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "sinfonia",
        native_options,
        Box::new(move |_cc| Ok(Box::new(App::new(settings, runtime, instrument)))),
    )?;
    Ok(())
}
