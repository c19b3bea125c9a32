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

//! Per-sample ADSR envelope.
//!
//! Segments are linear. Sustain holds until a note off, which starts the
//! release from whatever level the envelope had reached.

use crate::config::Envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrPhase {
    Attack,
    Decay,
    Sustain,
    Release,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Adsr {
    attack: usize,
    decay: usize,
    sustain: f32,
    release: usize,

    phase: AdsrPhase,
    position: usize,
    level: f32,
    release_start: f32,
    pending_note_off: bool,
}

fn samples(seconds: f32, sample_rate: u32) -> usize {
    (seconds.max(0.0) * sample_rate as f32).round() as usize
}

impl Adsr {
    pub fn new(envelope: &Envelope, sample_rate: u32) -> Adsr {
        Adsr {
            attack: samples(envelope.attack, sample_rate),
            decay: samples(envelope.decay, sample_rate),
            sustain: envelope.sustain.clamp(0.0, 1.0),
            release: samples(envelope.release, sample_rate),
            phase: AdsrPhase::Attack,
            position: 0,
            level: 0.0,
            release_start: 0.0,
            pending_note_off: false,
        }
    }

    /// Queue a note off. It takes effect on the next sample.
    pub fn note_off(&mut self) {
        self.pending_note_off = true;
    }

    pub fn phase(&self) -> AdsrPhase {
        self.phase
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_complete(&self) -> bool {
        self.phase == AdsrPhase::Complete
    }

    fn enter(&mut self, phase: AdsrPhase) {
        self.phase = phase;
        self.position = 0;
        if phase == AdsrPhase::Release {
            self.release_start = self.level;
        }
    }

    /// Advances one sample and returns the new level.
    pub fn next_level(&mut self) -> f32 {
        if self.pending_note_off {
            self.pending_note_off = false;
            if matches!(
                self.phase,
                AdsrPhase::Attack | AdsrPhase::Decay | AdsrPhase::Sustain
            ) {
                self.enter(AdsrPhase::Release);
            }
        }

        // Zero length segments are skipped without producing a sample.
        loop {
            match self.phase {
                AdsrPhase::Attack if self.position >= self.attack => {
                    self.level = 1.0;
                    self.enter(AdsrPhase::Decay);
                }
                AdsrPhase::Decay if self.position >= self.decay => {
                    self.level = self.sustain;
                    self.enter(AdsrPhase::Sustain);
                }
                AdsrPhase::Release if self.position >= self.release => {
                    self.level = 0.0;
                    self.enter(AdsrPhase::Complete);
                }
                _ => break,
            }
        }

        self.position += 1;
        let t = |length: usize, position: usize| position as f32 / length as f32;
        self.level = match self.phase {
            AdsrPhase::Attack => t(self.attack, self.position),
            AdsrPhase::Decay => 1.0 - (1.0 - self.sustain) * t(self.decay, self.position),
            AdsrPhase::Sustain => self.sustain,
            AdsrPhase::Release => self.release_start * (1.0 - t(self.release, self.position)),
            AdsrPhase::Complete => 0.0,
        };
        self.level
    }
}
