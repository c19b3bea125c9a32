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

//! The playable canvas.
//!
//! Every pointer is either idle or pressed on at most one target. Pressing and
//! sliding across targets plays notes through the audio bridge and spawns
//! particles. Each frame redraws the instrument from the bridge's active notes.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::audio::{self, AudioBridge, AudioError};
use crate::config::Settings;
use crate::instrument::InstrumentKind;
use crate::mapper::{self, CanvasSize, Hit, Point, TargetId};
use crate::particles::ParticleSystem;
use crate::render::{self, Scene};

/// Identifies a pointer. The mouse is pointer 0; touches keep their own ids.
pub type PointerId = u64;

/// What to paint for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub instrument: Scene,
    /// Painted on top of the instrument with additive blending.
    pub particles: Scene,
}

pub struct InteractionSurface {
    bridge: AudioBridge,
    particles: ParticleSystem,
    instrument: InstrumentKind,
    size: CanvasSize,
    /// Pressed pointers and the target each one is sounding, if any.
    pointers: HashMap<PointerId, Option<TargetId>>,
    /// Height of the latest pointer event. Violin effects follow it.
    last_y: f32,
}

impl InteractionSurface {
    pub fn new(bridge: AudioBridge, particles: ParticleSystem) -> InteractionSurface {
        InteractionSurface {
            instrument: bridge.instrument(),
            bridge,
            particles,
            size: CanvasSize::default(),
            pointers: HashMap::new(),
            last_y: 0.0,
        }
    }

    /// Builds a surface with the engine and particle count from the settings.
    pub fn from_settings(settings: &Settings) -> InteractionSurface {
        let bridge = AudioBridge::new(audio::get_engine(settings), settings.voices().clone());
        InteractionSurface::new(bridge, ParticleSystem::new(settings.particles().count()))
    }

    /// Starts audio. See [AudioBridge::initialize].
    pub async fn initialize(&mut self) -> Result<(), AudioError> {
        self.bridge.initialize().await
    }

    pub fn is_ready(&self) -> bool {
        self.bridge.is_ready()
    }

    pub fn instrument(&self) -> InstrumentKind {
        self.instrument
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Target to note, for everything currently sounding.
    pub fn active(&self) -> &HashMap<TargetId, String> {
        self.bridge.active()
    }

    /// Silences the current instrument, forgets all pointers and switches.
    pub fn set_instrument(&mut self, instrument: InstrumentKind) {
        info!(from = %self.instrument, to = %instrument, "Selecting instrument");
        self.pointers.clear();
        self.bridge.select_instrument(instrument);
        self.instrument = instrument;
    }

    pub fn resize(&mut self, size: CanvasSize) {
        if size != self.size {
            debug!(width = size.width, height = size.height, "Canvas resized");
            self.size = size;
        }
    }

    pub fn pointer_down(&mut self, pointer: PointerId, position: Point) {
        // A pointer that never saw its up event is released first.
        if let Some(Some(previous)) = self.pointers.remove(&pointer) {
            self.bridge.release(previous);
        }

        self.last_y = position.y;
        let hit = self.hit_test(position);
        if let Some(hit) = hit {
            self.trigger(hit);
        }
        self.pointers.insert(pointer, hit.map(|hit| hit.target));
    }

    /// Slides a pressed pointer. Moves onto a different target release the old
    /// note and play the new one; anything else only records the position.
    pub fn pointer_move(&mut self, pointer: PointerId, position: Point) {
        let Some(&current) = self.pointers.get(&pointer) else {
            return;
        };

        self.last_y = position.y;
        if let Some(hit) = self.hit_test(position) {
            if Some(hit.target) != current {
                if let Some(previous) = current {
                    self.bridge.release(previous);
                }
                self.trigger(hit);
                self.pointers.insert(pointer, Some(hit.target));
            }
        }
    }

    /// Handles up, cancel and leave.
    pub fn pointer_up(&mut self, pointer: PointerId) {
        if let Some(Some(target)) = self.pointers.remove(&pointer) {
            self.bridge.release(target);
        }
    }

    /// Advances the particles and renders the current state.
    pub fn frame(&mut self) -> Frame {
        self.particles.tick();
        Frame {
            instrument: render::instrument_scene(self.instrument, self.size, self.bridge.active()),
            particles: render::particle_scene(self.particles.particles()),
        }
    }

    /// Releases everything. Called when the canvas goes away.
    pub fn unmount(&mut self) {
        self.pointers.clear();
        self.bridge.release_all();
        self.particles.clear();
    }

    fn hit_test(&self, position: Point) -> Option<Hit> {
        mapper::hit_test(self.instrument, position, self.size)
    }

    fn trigger(&mut self, hit: Hit) {
        self.bridge.play(hit.note, hit.target);
        if let Some(effect) = mapper::position_for(hit.target, self.size, self.last_y) {
            self.particles.spawn(effect);
        }
    }
}

impl Drop for InteractionSurface {
    fn drop(&mut self) {
        self.unmount();
    }
}
