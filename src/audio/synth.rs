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
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use super::effects::EffectChain;
use super::voice::{Voice, VoiceManager};
use super::Command;
use crate::config::{ConfigError, Settings, VoicePatch};
use crate::instrument::InstrumentKind;

/// Headroom applied to the voice mix before the effects.
const MASTER_GAIN: f32 = 0.5;

/// The synthesizer that runs inside the audio callback. It owns every voice
/// and applies commands at the start of each buffer.
pub struct Synth {
    sample_rate: u32,
    voices: VoiceManager,
    effects: EffectChain,
    patches: [VoicePatch; 3],
    current: InstrumentKind,
    /// Samples rendered so far.
    clock: u64,
    release_delay: u64,
    rng: StdRng,
}

fn slot(instrument: InstrumentKind) -> usize {
    match instrument {
        InstrumentKind::Piano => 0,
        InstrumentKind::Violin => 1,
        InstrumentKind::Harp => 2,
    }
}

impl Synth {
    pub fn new(settings: &Settings, sample_rate: u32) -> Result<Synth, ConfigError> {
        let voices = settings.voices();
        let release_delay = settings.audio().release_delay()?;
        Ok(Synth {
            sample_rate,
            voices: VoiceManager::new(settings.audio().max_voices()),
            effects: EffectChain::new(settings.effects(), sample_rate)?,
            patches: InstrumentKind::ALL.map(|instrument| voices.patch(instrument)),
            current: InstrumentKind::default(),
            clock: 0,
            release_delay: (release_delay.as_secs_f64() * sample_rate as f64).round() as u64,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn current(&self) -> InstrumentKind {
        self.current
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_count()
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Select(instrument) => {
                debug!(instrument = %instrument, "Selected voice");
                self.current = instrument;
            }
            Command::Attack { note, frequency } => {
                let patch = &self.patches[slot(self.current)];
                let voice = Voice::new(
                    self.current,
                    &note,
                    frequency,
                    patch,
                    self.clock,
                    self.sample_rate,
                    &mut self.rng,
                );
                self.voices.add_voice(voice, patch.retrigger());
            }
            Command::Release { note } => {
                let behavior = self.patches[slot(self.current)].note_off();
                self.voices.handle_note_off(
                    self.current,
                    &note,
                    behavior,
                    self.clock + self.release_delay,
                );
            }
        }
    }

    /// Renders interleaved frames into `output`. Channel 0 gets the left side
    /// of the effect chain, channel 1 the right, and any further channels
    /// alternate between the two.
    pub fn render(&mut self, output: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in output.chunks_mut(channels) {
            let dry = self.voices.next_sample(self.clock) * MASTER_GAIN;
            let (left, right) = self.effects.process(dry);
            let (left, right) = (left.tanh(), right.tanh());
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = match (channels, channel % 2) {
                    (1, _) => (left + right) / 2.0,
                    (_, 0) => left,
                    _ => right,
                };
            }
            self.clock += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> Synth {
        let settings = Settings::from_yaml(
            r#"
audio:
  release_delay: 10ms
"#,
        )
        .unwrap();
        Synth::new(&settings, 1000).unwrap()
    }

    fn attack(synth: &mut Synth, note: &str) {
        synth.handle(Command::Attack {
            note: note.to_string(),
            frequency: 100.0,
        });
    }

    #[test]
    fn test_silence_without_voices() {
        let mut synth = synth();
        let mut buffer = vec![1.0; 64];
        synth.render(&mut buffer, 2);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_attack_produces_sound() {
        let mut synth = synth();
        attack(&mut synth, "C4");
        assert_eq!(synth.active_voices(), 1);

        let mut buffer = vec![0.0; 200];
        synth.render(&mut buffer, 2);
        assert!(buffer.iter().any(|s| s.abs() > 0.001));
        assert!(buffer.iter().all(|s| s.abs() <= 1.0));

        // Stereo frames: the first frame is identical on both channels.
        assert_eq!(buffer[0], buffer[1]);
    }

    #[test]
    fn test_select_changes_patch() {
        let mut synth = synth();
        assert_eq!(synth.current(), InstrumentKind::Piano);
        synth.handle(Command::Select(InstrumentKind::Harp));
        assert_eq!(synth.current(), InstrumentKind::Harp);

        // Harp voices cut each other.
        attack(&mut synth, "C4");
        attack(&mut synth, "E4");
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn test_harp_ignores_release() {
        let mut synth = synth();
        synth.handle(Command::Select(InstrumentKind::Harp));
        attack(&mut synth, "C4");
        synth.handle(Command::Release {
            note: "C4".to_string(),
        });
        let mut buffer = vec![0.0; 40];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.active_voices(), 1);
    }

    #[test]
    fn test_release_waits_for_delay() {
        let mut synth = synth();
        attack(&mut synth, "C4");
        synth.handle(Command::Release {
            note: "C4".to_string(),
        });

        // Piano release is 1.2s, so after the 10 sample delay it is still
        // releasing but gone well before two seconds.
        let mut buffer = vec![0.0; 500];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.active_voices(), 1);

        let mut buffer = vec![0.0; 1500];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn test_release_leaves_other_note_of_same_pitch() {
        let mut synth = synth();
        synth.handle(Command::Select(InstrumentKind::Violin));
        attack(&mut synth, "E4");
        attack(&mut synth, "E4");
        synth.handle(Command::Release {
            note: "E4".to_string(),
        });

        // Violin release is 1.5s; the second E4 is still held afterwards.
        let mut buffer = vec![0.0; 3000];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.active_voices(), 1);

        synth.handle(Command::Release {
            note: "E4".to_string(),
        });
        let mut buffer = vec![0.0; 3000];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.active_voices(), 0);
    }

    #[test]
    fn test_fully_wet_delay_holds_notes_back() {
        let settings = Settings::from_yaml(
            r#"
effects:
  delay:
    time: 250ms
    wet: 1.0
  reverb:
    wet: 1.0
"#,
        )
        .unwrap();
        let mut synth = Synth::new(&settings, 1000).unwrap();
        attack(&mut synth, "C4");

        let mut buffer = vec![0.0; 250];
        synth.render(&mut buffer, 1);
        assert!(buffer.iter().all(|s| *s == 0.0));

        let mut buffer = vec![0.0; 250];
        synth.render(&mut buffer, 1);
        assert!(buffer.iter().any(|s| s.abs() > 0.0001));
    }
}
