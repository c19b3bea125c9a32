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
use std::f32::consts::TAU;

use rand::Rng;

use crate::config::Waveform;

impl Waveform {
    /// The waveform's value at `phase`, a fraction of a cycle in [0, 1).
    pub fn at(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// A phase accumulating oscillator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    sample_rate: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: u32) -> Oscillator {
        Oscillator {
            waveform,
            sample_rate: sample_rate as f32,
            phase: 0.0,
        }
    }

    /// Produces one sample at the given instantaneous frequency.
    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        let value = self.waveform.at(self.phase);
        self.phase = (self.phase + frequency / self.sample_rate).rem_euclid(1.0);
        value
    }
}

/// Smallest delay line, which bounds the highest playable pitch.
const MIN_DELAY: usize = 2;

/// Karplus-Strong string: a noise burst recirculating through a delay line one
/// period long, with a one pole lowpass and a gain below one in the loop.
#[derive(Debug, Clone)]
pub struct PluckedString {
    line: Vec<f32>,
    position: usize,
    feedback: f32,
    damping: f32,
    filtered: f32,
    /// Largest magnitude seen in the current period.
    period_peak: f32,
    /// Largest magnitude seen in the last full period.
    last_peak: f32,
}

impl PluckedString {
    pub fn new<R: Rng>(
        frequency: f32,
        sample_rate: u32,
        attack_noise: f32,
        dampening: f32,
        resonance: f32,
        rng: &mut R,
    ) -> PluckedString {
        let period = (sample_rate as f32 / frequency.max(1.0)).round() as usize;
        let line = (0..period.max(MIN_DELAY))
            .map(|_| rng.gen_range(-1.0f32..1.0) * attack_noise)
            .collect::<Vec<f32>>();
        let last_peak = line.iter().fold(0.0f32, |peak, v| peak.max(v.abs()));
        let damping = (-TAU * dampening / sample_rate as f32).exp();

        PluckedString {
            line,
            position: 0,
            feedback: resonance.clamp(0.0, 0.9999),
            damping,
            filtered: 0.0,
            period_peak: 0.0,
            last_peak,
        }
    }

    /// Scales the loop gain, used to mute the string.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9999);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn next_sample(&mut self) -> f32 {
        let out = self.line[self.position];
        self.filtered = (1.0 - self.damping) * out + self.damping * self.filtered;
        self.line[self.position] = self.filtered * self.feedback;

        self.period_peak = self.period_peak.max(out.abs());
        self.position += 1;
        if self.position >= self.line.len() {
            self.position = 0;
            self.last_peak = self.period_peak;
            self.period_peak = 0.0;
        }
        out
    }

    /// True once a whole period stayed below `threshold`.
    pub fn is_silent(&self, threshold: f32) -> bool {
        self.last_peak < threshold
    }

    pub fn period(&self) -> usize {
        self.line.len()
    }
}
