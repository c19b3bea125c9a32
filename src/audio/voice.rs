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

//! Voice management for the synthesizer.
//!
//! Handles voice allocation, stealing, delayed releases and reclaiming voices
//! that have gone silent.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use tracing::{debug, warn};

use super::envelope::Adsr;
use super::oscillator::{Oscillator, PluckedString};
use crate::config::{
    AmPatch, FmPatch, NoteOffBehavior, PluckPatch, RetriggerBehavior, VoicePatch,
};
use crate::instrument::InstrumentKind;

/// Global voice ID counter.
static NEXT_VOICE_ID: AtomicU64 = AtomicU64::new(1);

/// Voices removed by stealing or cutting fade out over this many samples.
const CUT_FADE_SAMPLES: u32 = 64;

/// A plucked string below this level is considered finished.
const PLUCK_SILENCE: f32 = 1e-4;

struct FmVoice {
    frequency: f32,
    harmonicity: f32,
    modulation_index: f32,
    carrier: Oscillator,
    modulator: Oscillator,
    envelope: Adsr,
    modulation_envelope: Adsr,
}

impl FmVoice {
    fn new(patch: &FmPatch, frequency: f32, sample_rate: u32) -> FmVoice {
        FmVoice {
            frequency,
            harmonicity: patch.harmonicity,
            modulation_index: patch.modulation_index,
            carrier: Oscillator::new(patch.carrier, sample_rate),
            modulator: Oscillator::new(patch.modulator, sample_rate),
            envelope: Adsr::new(&patch.envelope, sample_rate),
            modulation_envelope: Adsr::new(&patch.modulation_envelope, sample_rate),
        }
    }

    fn next_sample(&mut self) -> f32 {
        let modulation = self.modulator.next_sample(self.frequency * self.harmonicity)
            * self.modulation_envelope.next_level();
        let deviation = modulation * self.frequency * self.modulation_index;
        self.carrier.next_sample(self.frequency + deviation) * self.envelope.next_level()
    }
}

struct AmVoice {
    frequency: f32,
    harmonicity: f32,
    carrier: Oscillator,
    modulator: Oscillator,
    envelope: Adsr,
    modulation_envelope: Adsr,
}

impl AmVoice {
    fn new(patch: &AmPatch, frequency: f32, sample_rate: u32) -> AmVoice {
        AmVoice {
            frequency,
            harmonicity: patch.harmonicity,
            carrier: Oscillator::new(patch.carrier, sample_rate),
            modulator: Oscillator::new(patch.modulator, sample_rate),
            envelope: Adsr::new(&patch.envelope, sample_rate),
            modulation_envelope: Adsr::new(&patch.modulation_envelope, sample_rate),
        }
    }

    fn next_sample(&mut self) -> f32 {
        // The modulator swings the carrier's gain between 0 and 1.
        let modulation = self.modulator.next_sample(self.frequency * self.harmonicity)
            * self.modulation_envelope.next_level();
        let gain = (modulation + 1.0) / 2.0;
        self.carrier.next_sample(self.frequency) * gain * self.envelope.next_level()
    }
}

struct PluckVoice {
    string: PluckedString,
    /// Per-sample feedback reduction while a release is in progress.
    mute_step: f32,
    release: u32,
    muting: bool,
}

impl PluckVoice {
    fn new<R: Rng>(
        patch: &PluckPatch,
        frequency: f32,
        sample_rate: u32,
        rng: &mut R,
    ) -> PluckVoice {
        let string = PluckedString::new(
            frequency,
            sample_rate,
            patch.attack_noise,
            patch.dampening,
            patch.resonance,
            rng,
        );
        let release = (patch.release.max(0.0) * sample_rate as f32).round() as u32;
        PluckVoice {
            mute_step: string.feedback() / release.max(1) as f32,
            string,
            release,
            muting: false,
        }
    }

    fn note_off(&mut self) {
        self.muting = true;
        if self.release == 0 {
            self.string.set_feedback(0.0);
        }
    }

    fn next_sample(&mut self) -> f32 {
        if self.muting {
            let feedback = self.string.feedback() - self.mute_step;
            self.string.set_feedback(feedback);
        }
        self.string.next_sample()
    }
}

enum Generator {
    Fm(FmVoice),
    Am(AmVoice),
    Pluck(PluckVoice),
}

impl Generator {
    fn next_sample(&mut self) -> f32 {
        match self {
            Generator::Fm(voice) => voice.next_sample(),
            Generator::Am(voice) => voice.next_sample(),
            Generator::Pluck(voice) => voice.next_sample(),
        }
    }

    fn note_off(&mut self) {
        match self {
            Generator::Fm(voice) => voice.envelope.note_off(),
            Generator::Am(voice) => voice.envelope.note_off(),
            Generator::Pluck(voice) => voice.note_off(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Generator::Fm(voice) => voice.envelope.is_complete(),
            Generator::Am(voice) => voice.envelope.is_complete(),
            Generator::Pluck(voice) => voice.string.is_silent(PLUCK_SILENCE),
        }
    }
}

/// A sounding note.
pub struct Voice {
    /// Unique ID for this voice.
    id: u64,
    /// The instrument that played this voice.
    instrument: InstrumentKind,
    /// The note that triggered this voice (for release matching).
    note: String,
    /// The sample clock value when this voice started.
    start: u64,
    /// Sample clock value at which a pending release takes effect.
    release_at: Option<u64>,
    released: bool,
    /// Remaining samples of a cut fade, if this voice is being cut.
    fade: Option<u32>,
    gain: f32,
    generator: Generator,
}

impl Voice {
    /// Creates a new voice for the given patch.
    pub fn new<R: Rng>(
        instrument: InstrumentKind,
        note: &str,
        frequency: f32,
        patch: &VoicePatch,
        start: u64,
        sample_rate: u32,
        rng: &mut R,
    ) -> Voice {
        let generator = match patch {
            VoicePatch::Fm(p) => Generator::Fm(FmVoice::new(p, frequency, sample_rate)),
            VoicePatch::Am(p) => Generator::Am(AmVoice::new(p, frequency, sample_rate)),
            VoicePatch::Pluck(p) => {
                Generator::Pluck(PluckVoice::new(p, frequency, sample_rate, rng))
            }
        };
        Voice {
            id: NEXT_VOICE_ID.fetch_add(1, Ordering::SeqCst),
            instrument,
            note: note.to_string(),
            start,
            release_at: None,
            released: false,
            fade: None,
            gain: patch.gain(),
            generator,
        }
    }

    /// Checks if this voice should answer a release for the given note.
    pub fn matches_release(&self, instrument: InstrumentKind, note: &str) -> bool {
        self.instrument == instrument
            && self.note == note
            && !self.released
            && self.release_at.is_none()
    }

    fn cut(&mut self) {
        if self.fade.is_none() {
            self.fade = Some(CUT_FADE_SAMPLES);
        }
    }

    fn is_finished(&self) -> bool {
        self.fade == Some(0) || self.generator.is_finished()
    }

    fn next_sample(&mut self, clock: u64) -> f32 {
        if let Some(release_at) = self.release_at {
            if clock >= release_at {
                self.release_at = None;
                self.released = true;
                self.generator.note_off();
            }
        }

        let mut sample = self.generator.next_sample() * self.gain;
        if let Some(fade) = self.fade.as_mut() {
            sample *= *fade as f32 / CUT_FADE_SAMPLES as f32;
            *fade = fade.saturating_sub(1);
        }
        sample
    }
}

/// Manages active voices for the synthesizer.
pub struct VoiceManager {
    /// Active voices.
    voices: Vec<Voice>,
    /// Voices that were cut or stolen and are fading out.
    fading: Vec<Voice>,
    /// Global maximum voices limit.
    max_voices: usize,
}

impl VoiceManager {
    /// Creates a new voice manager.
    pub fn new(max_voices: usize) -> Self {
        Self {
            voices: Vec::with_capacity(max_voices),
            fading: Vec::new(),
            max_voices: max_voices.max(1),
        }
    }

    fn retire(&mut self, mut voice: Voice) {
        voice.cut();
        self.fading.push(voice);
    }

    /// Adds a new voice, stealing old voices if limits are exceeded.
    /// Returns the number of voices that were cut to make room.
    pub fn add_voice(&mut self, voice: Voice, retrigger: RetriggerBehavior) -> usize {
        let mut stopped = 0;

        if retrigger == RetriggerBehavior::Cut {
            let (cut, keep): (Vec<Voice>, Vec<Voice>) = self
                .voices
                .drain(..)
                .partition(|v| v.instrument == voice.instrument);
            self.voices = keep;
            stopped += cut.len();
            for v in cut {
                self.retire(v);
            }
        }

        if self.voices.len() >= self.max_voices {
            if let Some(oldest) = self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| (v.start, v.id))
                .map(|(index, _)| index)
            {
                let oldest = self.voices.remove(oldest);
                warn!(
                    max_voices = self.max_voices,
                    note = oldest.note,
                    "Global voice limit reached, stealing oldest"
                );
                self.retire(oldest);
                stopped += 1;
            }
        }

        debug!(
            id = voice.id,
            instrument = %voice.instrument,
            note = voice.note,
            "Voice started"
        );
        self.voices.push(voice);
        stopped
    }

    /// Schedules a release for the oldest voice of `instrument` still holding
    /// `note`. Each attack is paired with one release, so two held notes of the
    /// same pitch need two releases. Returns the number of voices that will
    /// release.
    pub fn handle_note_off(
        &mut self,
        instrument: InstrumentKind,
        note: &str,
        behavior: NoteOffBehavior,
        release_at: u64,
    ) -> usize {
        if behavior == NoteOffBehavior::PlayToCompletion {
            return 0;
        }

        match self
            .voices
            .iter_mut()
            .filter(|v| v.matches_release(instrument, note))
            .min_by_key(|v| (v.start, v.id))
        {
            Some(voice) => {
                voice.release_at = Some(release_at);
                1
            }
            None => 0,
        }
    }

    /// Mixes one sample of every voice and reclaims finished ones.
    pub fn next_sample(&mut self, clock: u64) -> f32 {
        let mut mix = 0.0;
        for voice in self.voices.iter_mut().chain(self.fading.iter_mut()) {
            mix += voice.next_sample(clock);
        }
        self.voices.retain(|v| !v.is_finished());
        self.fading.retain(|v| !v.is_finished());
        mix
    }

    /// Returns the current number of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Clears all voices.
    pub fn clear(&mut self) {
        self.voices.clear();
        self.fading.clear();
    }
}

impl std::fmt::Debug for VoiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceManager")
            .field("active_voices", &self.voices.len())
            .field("fading_voices", &self.fading.len())
            .field("max_voices", &self.max_voices)
            .finish()
    }
}
