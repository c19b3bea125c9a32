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

//! The bridge between the interaction surface and the audio engine.
//!
//! The bridge keeps the Active Note Set: which target is currently sounding
//! which note. Everything that draws pressed keys and strings reads it.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::{AudioError, Command, Engine};
use crate::config::{NoteOffBehavior, Voices};
use crate::instrument::InstrumentKind;
use crate::mapper::TargetId;
use crate::scale;

pub struct AudioBridge {
    engine: Arc<Mutex<Box<dyn Engine>>>,
    voices: Voices,
    ready: bool,
    instrument: InstrumentKind,
    active: HashMap<TargetId, String>,
}

impl AudioBridge {
    pub fn new(engine: Box<dyn Engine>, voices: Voices) -> AudioBridge {
        AudioBridge {
            engine: Arc::new(Mutex::new(engine)),
            voices,
            ready: false,
            instrument: InstrumentKind::default(),
            active: HashMap::new(),
        }
    }

    /// Starts the engine and selects the current instrument's voice.
    ///
    /// The engine is started on a blocking task. On failure the bridge stays
    /// uninitialized and this may be called again. Once ready, further calls
    /// return immediately.
    pub async fn initialize(&mut self) -> Result<(), AudioError> {
        if self.ready {
            return Ok(());
        }

        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || engine.lock().start()).await??;

        self.ready = true;
        info!(
            engine = %self.engine.lock(),
            instrument = %self.instrument,
            "Audio engine ready"
        );
        self.send(Command::Select(self.instrument));
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn instrument(&self) -> InstrumentKind {
        self.instrument
    }

    /// Releases everything that is sounding, then switches voices.
    pub fn select_instrument(&mut self, instrument: InstrumentKind) {
        self.release_all();
        self.instrument = instrument;
        if self.ready {
            info!(instrument = %instrument, "Switching instrument");
            self.send(Command::Select(instrument));
        }
    }

    /// Plays `note` on the current voice and records it against `target`.
    /// Does nothing until the engine is ready.
    pub fn play(&mut self, note: &str, target: TargetId) {
        if !self.ready {
            debug!(note, target = %target, "Audio not ready, ignoring note");
            return;
        }
        let Some(frequency) = scale::frequency(note) else {
            warn!(note, target = %target, "Ignoring unknown note");
            return;
        };

        debug!(note, target = %target, frequency, "Play");
        self.send(Command::Attack {
            note: note.to_string(),
            frequency,
        });
        self.active.insert(target, note.to_string());
    }

    /// Forgets `target`. The engine is only asked to release the note if the
    /// current voice responds to releases.
    pub fn release(&mut self, target: TargetId) {
        let Some(note) = self.active.remove(&target) else {
            return;
        };

        debug!(note, target = %target, "Release");
        if self.voices.patch(self.instrument).note_off() == NoteOffBehavior::Release {
            self.send(Command::Release { note });
        }
    }

    /// Releases every active target.
    pub fn release_all(&mut self) {
        let targets: Vec<TargetId> = self.active.keys().copied().collect();
        for target in targets {
            self.release(target);
        }
    }

    /// The Active Note Set.
    pub fn active(&self) -> &HashMap<TargetId, String> {
        &self.active
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.engine.lock().send(command) {
            error!(err = %e, "Unable to send command to the audio engine");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock;

    fn bridge(name: &str) -> (AudioBridge, mock::Engine) {
        let engine = mock::Engine::get(name);
        let observer = engine.clone();
        (
            AudioBridge::new(Box::new(engine), Voices::default()),
            observer,
        )
    }

    fn release(note: &str) -> Command {
        Command::Release {
            note: note.to_string(),
        }
    }

    #[tokio::test]
    async fn test_initialize_selects_piano() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        assert!(bridge.is_ready());
        assert_eq!(
            engine.commands(),
            vec![Command::Select(InstrumentKind::Piano)]
        );

        // Initializing again is a no-op.
        bridge.initialize().await.unwrap();
        assert_eq!(engine.start_attempts(), 1);
        assert_eq!(engine.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialize_can_retry() {
        let (mut bridge, engine) = bridge("mock-fail");
        assert!(bridge.initialize().await.is_err());
        assert!(!bridge.is_ready());
        assert!(bridge.initialize().await.is_err());
        assert_eq!(engine.start_attempts(), 2);

        bridge.play("C4", TargetId::key(0));
        assert!(bridge.active().is_empty());
    }

    #[tokio::test]
    async fn test_play_before_ready_is_ignored() {
        let (mut bridge, engine) = bridge("mock");
        bridge.play("C4", TargetId::key(0));
        assert!(bridge.active().is_empty());
        assert!(engine.commands().is_empty());
    }

    #[tokio::test]
    async fn test_play_and_release() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        engine.clear_commands();

        bridge.play("A4", TargetId::key(9));
        assert_eq!(bridge.active().get(&TargetId::key(9)).unwrap(), "A4");
        assert_eq!(
            engine.commands(),
            vec![Command::Attack {
                note: "A4".to_string(),
                frequency: 440.0
            }]
        );

        bridge.release(TargetId::key(9));
        assert!(bridge.active().is_empty());
        assert_eq!(engine.commands().last(), Some(&release("A4")));

        // Releasing an unknown target does nothing.
        let sent = engine.commands().len();
        bridge.release(TargetId::key(9));
        assert_eq!(engine.commands().len(), sent);
    }

    #[tokio::test]
    async fn test_unknown_note_is_ignored() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        engine.clear_commands();

        bridge.play("H9", TargetId::key(0));
        assert!(bridge.active().is_empty());
        assert!(engine.commands().is_empty());
    }

    #[tokio::test]
    async fn test_harp_release_is_not_sent() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        bridge.select_instrument(InstrumentKind::Harp);
        engine.clear_commands();

        bridge.play("C4", TargetId::harp(0));
        bridge.release(TargetId::harp(0));
        assert!(bridge.active().is_empty());
        assert_eq!(engine.commands().len(), 1);
        assert!(matches!(engine.commands()[0], Command::Attack { .. }));
    }

    #[tokio::test]
    async fn test_switch_releases_before_selecting() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        bridge.play("C4", TargetId::key(0));
        bridge.play("E4", TargetId::key(4));
        engine.clear_commands();

        bridge.select_instrument(InstrumentKind::Violin);
        assert!(bridge.active().is_empty());
        assert_eq!(bridge.instrument(), InstrumentKind::Violin);

        let commands = engine.commands();
        assert_eq!(commands.len(), 3);
        assert!(commands[..2].contains(&release("C4")));
        assert!(commands[..2].contains(&release("E4")));
        assert_eq!(commands[2], Command::Select(InstrumentKind::Violin));
    }

    #[tokio::test]
    async fn test_selection_before_ready_is_applied_on_start() {
        let (mut bridge, engine) = bridge("mock");
        bridge.select_instrument(InstrumentKind::Harp);
        assert!(engine.commands().is_empty());

        bridge.initialize().await.unwrap();
        assert_eq!(engine.commands(), vec![Command::Select(InstrumentKind::Harp)]);
    }

    #[tokio::test]
    async fn test_release_all_is_idempotent() {
        let (mut bridge, engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        bridge.play("C4", TargetId::string(0));
        bridge.play("G4", TargetId::string(1));

        bridge.release_all();
        let sent = engine.commands().len();
        bridge.release_all();
        assert!(bridge.active().is_empty());
        assert_eq!(engine.commands().len(), sent);
    }

    #[tokio::test]
    async fn test_same_target_overwrites() {
        let (mut bridge, _engine) = bridge("mock");
        bridge.initialize().await.unwrap();
        bridge.play("C4", TargetId::string(0));
        bridge.play("D4", TargetId::string(0));
        assert_eq!(bridge.active().len(), 1);
        assert_eq!(bridge.active().get(&TargetId::string(0)).unwrap(), "D4");
    }
}
