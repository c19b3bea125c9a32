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

//! The master effect chain. The dry voice mix goes through a feedback delay
//! and then a reverb, and comes out as a stereo pair.

use std::time::Duration;

use crate::config::{self, ConfigError};

/// A feedback delay line with a wet/dry mix.
pub struct FeedbackDelay {
    line: Vec<f32>,
    position: usize,
    feedback: f32,
    wet: f32,
}

impl FeedbackDelay {
    pub fn new(time: Duration, feedback: f32, wet: f32, sample_rate: u32) -> FeedbackDelay {
        let length = (time.as_secs_f32() * sample_rate as f32).round() as usize;
        FeedbackDelay {
            line: vec![0.0; length.max(1)],
            position: 0,
            feedback: feedback.clamp(0.0, 0.999),
            wet: wet.clamp(0.0, 1.0),
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line[self.position];
        self.line[self.position] = input + delayed * self.feedback;
        self.position += 1;
        if self.position >= self.line.len() {
            self.position = 0;
        }
        input * (1.0 - self.wet) + delayed * self.wet
    }
}

struct Comb {
    line: Vec<f32>,
    position: usize,
    feedback: f32,
    damp: f32,
    store: f32,
}

impl Comb {
    fn new(length: usize, feedback: f32, damp: f32) -> Comb {
        Comb {
            line: vec![0.0; length.max(1)],
            position: 0,
            feedback: feedback.clamp(0.0, 0.999),
            damp,
            store: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let output = self.line[self.position];
        self.store = output + (self.store - output) * self.damp;
        self.line[self.position] = input + self.store * self.feedback;
        self.position += 1;
        if self.position >= self.line.len() {
            self.position = 0;
        }
        output
    }
}

struct Allpass {
    line: Vec<f32>,
    position: usize,
}

impl Allpass {
    const FEEDBACK: f32 = 0.5;

    fn new(length: usize) -> Allpass {
        Allpass {
            line: vec![0.0; length.max(1)],
            position: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line[self.position];
        self.line[self.position] = input + delayed * Allpass::FEEDBACK;
        self.position += 1;
        if self.position >= self.line.len() {
            self.position = 0;
        }
        delayed - input
    }
}

/// Comb and allpass lengths in samples at 44.1kHz. The right channel is
/// offset slightly for width.
const COMB_LENGTHS: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_LENGTHS: [usize; 2] = [556, 441];
const STEREO_SPREAD: usize = 23;
const COMB_DAMP: f32 = 0.2;
const WET_GAIN: f32 = 0.15;

/// A Schroeder style reverb whose tail decays by 60dB over `decay`.
pub struct Reverb {
    left: ([Comb; 4], [Allpass; 2]),
    right: ([Comb; 4], [Allpass; 2]),
    wet: f32,
}

fn scale(length: usize, sample_rate: u32) -> usize {
    ((length as u64 * sample_rate as u64) / 44100).max(1) as usize
}

/// The comb gain that brings a signal down 60dB after `decay` seconds of
/// recirculating through a line of `length` samples.
fn comb_feedback(length: usize, decay: f32, sample_rate: u32) -> f32 {
    let loop_seconds = length as f32 / sample_rate as f32;
    10f32.powf(-3.0 * loop_seconds / decay.max(f32::EPSILON))
}

impl Reverb {
    pub fn new(decay: Duration, wet: f32, sample_rate: u32) -> Reverb {
        let decay = decay.as_secs_f32();
        let channel = |spread: usize| {
            let combs = COMB_LENGTHS.map(|length| {
                let length = scale(length + spread, sample_rate);
                Comb::new(length, comb_feedback(length, decay, sample_rate), COMB_DAMP)
            });
            let allpasses =
                ALLPASS_LENGTHS.map(|length| Allpass::new(scale(length + spread, sample_rate)));
            (combs, allpasses)
        };

        Reverb {
            left: channel(0),
            right: channel(STEREO_SPREAD),
            wet: wet.clamp(0.0, 1.0),
        }
    }

    fn tail(channel: &mut ([Comb; 4], [Allpass; 2]), input: f32) -> f32 {
        let mut out = channel
            .0
            .iter_mut()
            .map(|comb| comb.process(input))
            .sum::<f32>()
            * WET_GAIN;
        for allpass in channel.1.iter_mut() {
            out = allpass.process(out);
        }
        out
    }

    pub fn process(&mut self, input: f32) -> (f32, f32) {
        let dry = input * (1.0 - self.wet);
        let left = Reverb::tail(&mut self.left, input);
        let right = Reverb::tail(&mut self.right, input);
        (dry + left * self.wet, dry + right * self.wet)
    }
}

/// Delay into reverb.
pub struct EffectChain {
    delay: FeedbackDelay,
    reverb: Reverb,
}

impl EffectChain {
    pub fn new(effects: &config::Effects, sample_rate: u32) -> Result<EffectChain, ConfigError> {
        let delay = effects.delay();
        let reverb = effects.reverb();
        Ok(EffectChain {
            delay: FeedbackDelay::new(delay.time()?, delay.feedback(), delay.wet(), sample_rate),
            reverb: Reverb::new(reverb.decay()?, reverb.wet(), sample_rate),
        })
    }

    pub fn process(&mut self, input: f32) -> (f32, f32) {
        self.reverb.process(self.delay.process(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_echoes() {
        // 10 samples of delay, half feedback, fully wet.
        let mut delay = FeedbackDelay::new(Duration::from_millis(10), 0.5, 1.0, 1000);
        let out: Vec<f32> = (0..31)
            .map(|i| delay.process(if i == 0 { 1.0 } else { 0.0 }))
            .collect();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[10], 1.0);
        assert_eq!(out[20], 0.5);
        assert_eq!(out[30], 0.25);
        assert!(out[1..10].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_dry_delay_passes_through() {
        let mut delay = FeedbackDelay::new(Duration::from_millis(10), 0.5, 0.0, 1000);
        assert_eq!(delay.process(0.7), 0.7);
    }

    #[test]
    fn test_comb_feedback_matches_decay() {
        // After decay seconds of recirculation the level is down 60dB.
        let feedback = comb_feedback(441, 2.0, 44100);
        let trips = 2.0 / (441.0 / 44100.0);
        assert!((feedback.powf(trips) - 0.001).abs() < 1e-5);
    }

    #[test]
    fn test_reverb_tail_decays() {
        let mut reverb = Reverb::new(Duration::from_millis(500), 1.0, 44100);
        let energy = |reverb: &mut Reverb, samples: usize, impulse: bool| {
            (0..samples)
                .map(|i| {
                    let (l, r) = reverb.process(if impulse && i == 0 { 1.0 } else { 0.0 });
                    l * l + r * r
                })
                .sum::<f32>()
        };
        let early = energy(&mut reverb, 4410, true);
        assert!(early > 0.0);
        energy(&mut reverb, 44100, false);
        let late = energy(&mut reverb, 4410, false);
        assert!(late < early * 1e-4);
    }

    #[test]
    fn test_chain_is_silent_without_input() {
        let mut chain = EffectChain::new(&config::Effects::default(), 44100).unwrap();
        for _ in 0..1000 {
            assert_eq!(chain.process(0.0), (0.0, 0.0));
        }
    }
}
