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

//! Voice patches: which synthesis model each instrument uses and how it is
//! tuned. Every instrument has a built-in patch; the settings file may replace
//! any of them.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::instrument::InstrumentKind;

/// Oscillator shapes.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Behavior when a played note is released.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteOffBehavior {
    /// Move the envelope into its release phase.
    #[default]
    Release,
    /// Ignore the release and let the voice decay on its own.
    PlayToCompletion,
}

/// Behavior when an instrument is triggered while one of its voices sounds.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerBehavior {
    /// Allow multiple voices to play simultaneously.
    #[default]
    Polyphonic,
    /// Stop the previous voice and start a new one.
    Cut,
}

/// An ADSR amplitude envelope. Times are in seconds.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

impl Envelope {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Envelope {
        Envelope {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// The envelope that scales the modulator of the FM and AM models.
    const fn modulation() -> Envelope {
        Envelope::new(0.5, 0.0, 1.0, 0.5)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(
                    &format!("{}.{}", field, name),
                    format!("{} is not a non-negative time", value),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.sustain) {
            return Err(ConfigError::invalid(
                &format!("{}.sustain", field),
                format!("{} is outside [0, 1]", self.sustain),
            ));
        }
        Ok(())
    }
}

/// Frequency modulation: a modulator at `harmonicity` times the carrier
/// frequency deviates the carrier by up to `modulation_index` times its
/// frequency.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FmPatch {
    pub harmonicity: f32,
    pub modulation_index: f32,
    pub carrier: Waveform,
    pub modulator: Waveform,
    pub envelope: Envelope,
    pub modulation_envelope: Envelope,
    pub volume_db: f32,
    pub note_off: NoteOffBehavior,
    pub retrigger: RetriggerBehavior,
}

impl Default for FmPatch {
    fn default() -> Self {
        FmPatch {
            harmonicity: 3.01,
            modulation_index: 14.0,
            carrier: Waveform::Sine,
            modulator: Waveform::Square,
            envelope: Envelope::new(0.01, 0.3, 0.1, 1.2),
            modulation_envelope: Envelope::modulation(),
            volume_db: -6.0,
            note_off: NoteOffBehavior::Release,
            retrigger: RetriggerBehavior::Polyphonic,
        }
    }
}

/// Amplitude modulation: the carrier's gain follows a modulator at
/// `harmonicity` times the carrier frequency.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AmPatch {
    pub harmonicity: f32,
    pub carrier: Waveform,
    pub modulator: Waveform,
    pub envelope: Envelope,
    pub modulation_envelope: Envelope,
    pub volume_db: f32,
    pub note_off: NoteOffBehavior,
    pub retrigger: RetriggerBehavior,
}

impl Default for AmPatch {
    fn default() -> Self {
        AmPatch {
            harmonicity: 1.5,
            carrier: Waveform::Sawtooth,
            modulator: Waveform::Square,
            envelope: Envelope::new(0.6, 0.3, 0.6, 1.5),
            modulation_envelope: Envelope::modulation(),
            volume_db: -8.0,
            note_off: NoteOffBehavior::Release,
            retrigger: RetriggerBehavior::Polyphonic,
        }
    }
}

/// A plucked string: a burst of noise circulating through a damped delay line.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PluckPatch {
    /// Amplitude of the initial noise burst.
    pub attack_noise: f32,
    /// Cutoff of the lowpass in the feedback loop, in Hz.
    pub dampening: f32,
    /// Feedback gain per period, below 1.
    pub resonance: f32,
    /// Seconds to mute the string when a release is honoured.
    pub release: f32,
    pub volume_db: f32,
    pub note_off: NoteOffBehavior,
    pub retrigger: RetriggerBehavior,
}

impl Default for PluckPatch {
    fn default() -> Self {
        PluckPatch {
            attack_noise: 1.0,
            dampening: 6000.0,
            resonance: 0.95,
            release: 1.0,
            volume_db: -4.0,
            note_off: NoteOffBehavior::PlayToCompletion,
            retrigger: RetriggerBehavior::Cut,
        }
    }
}

/// A complete voice description, tagged by `model` in YAML.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum VoicePatch {
    Fm(FmPatch),
    Am(AmPatch),
    Pluck(PluckPatch),
}

impl VoicePatch {
    /// The patch an instrument uses when nothing overrides it.
    pub fn builtin(instrument: InstrumentKind) -> VoicePatch {
        match instrument {
            InstrumentKind::Piano => VoicePatch::Fm(FmPatch::default()),
            InstrumentKind::Violin => VoicePatch::Am(AmPatch::default()),
            InstrumentKind::Harp => VoicePatch::Pluck(PluckPatch::default()),
        }
    }

    pub fn volume_db(&self) -> f32 {
        match self {
            VoicePatch::Fm(p) => p.volume_db,
            VoicePatch::Am(p) => p.volume_db,
            VoicePatch::Pluck(p) => p.volume_db,
        }
    }

    /// Linear gain for `volume_db`.
    pub fn gain(&self) -> f32 {
        10f32.powf(self.volume_db() / 20.0)
    }

    pub fn note_off(&self) -> NoteOffBehavior {
        match self {
            VoicePatch::Fm(p) => p.note_off,
            VoicePatch::Am(p) => p.note_off,
            VoicePatch::Pluck(p) => p.note_off,
        }
    }

    pub fn retrigger(&self) -> RetriggerBehavior {
        match self {
            VoicePatch::Fm(p) => p.retrigger,
            VoicePatch::Am(p) => p.retrigger,
            VoicePatch::Pluck(p) => p.retrigger,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match self {
            VoicePatch::Fm(p) => {
                positive(&format!("{}.harmonicity", field), p.harmonicity)?;
                if !(p.modulation_index.is_finite() && p.modulation_index >= 0.0) {
                    return Err(ConfigError::invalid(
                        &format!("{}.modulation_index", field),
                        "must not be negative",
                    ));
                }
                p.envelope.validate(&format!("{}.envelope", field))?;
                p.modulation_envelope
                    .validate(&format!("{}.modulation_envelope", field))
            }
            VoicePatch::Am(p) => {
                positive(&format!("{}.harmonicity", field), p.harmonicity)?;
                p.envelope.validate(&format!("{}.envelope", field))?;
                p.modulation_envelope
                    .validate(&format!("{}.modulation_envelope", field))
            }
            VoicePatch::Pluck(p) => {
                positive(&format!("{}.dampening", field), p.dampening)?;
                if !(0.0..1.0).contains(&p.resonance) {
                    return Err(ConfigError::invalid(
                        &format!("{}.resonance", field),
                        format!("{} is outside [0, 1)", p.resonance),
                    ));
                }
                if !(p.attack_noise.is_finite() && p.attack_noise >= 0.0) {
                    return Err(ConfigError::invalid(
                        &format!("{}.attack_noise", field),
                        "must not be negative",
                    ));
                }
                if !(p.release.is_finite() && p.release >= 0.0) {
                    return Err(ConfigError::invalid(
                        &format!("{}.release", field),
                        "must not be negative",
                    ));
                }
                Ok(())
            }
        }
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} must be greater than 0", value),
        ))
    }
}

/// Per-instrument patch overrides.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Voices {
    #[serde(skip_serializing_if = "Option::is_none")]
    piano: Option<VoicePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violin: Option<VoicePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    harp: Option<VoicePatch>,
}

impl Voices {
    fn slot(&self, instrument: InstrumentKind) -> &Option<VoicePatch> {
        match instrument {
            InstrumentKind::Piano => &self.piano,
            InstrumentKind::Violin => &self.violin,
            InstrumentKind::Harp => &self.harp,
        }
    }

    /// The effective patch for an instrument.
    pub fn patch(&self, instrument: InstrumentKind) -> VoicePatch {
        self.slot(instrument)
            .clone()
            .unwrap_or_else(|| VoicePatch::builtin(instrument))
    }

    /// Returns a table with every instrument filled in.
    pub fn resolved(&self) -> Voices {
        Voices {
            piano: Some(self.patch(InstrumentKind::Piano)),
            violin: Some(self.patch(InstrumentKind::Violin)),
            harp: Some(self.patch(InstrumentKind::Harp)),
        }
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        for instrument in InstrumentKind::ALL {
            if let Some(patch) = self.slot(instrument) {
                patch.validate(&format!("voices.{}", instrument))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Voices {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_builtin_table() {
        let voices = Voices::default();

        let VoicePatch::Fm(piano) = voices.patch(InstrumentKind::Piano) else {
            panic!("piano should be FM");
        };
        assert_eq!(piano.harmonicity, 3.01);
        assert_eq!(piano.modulation_index, 14.0);
        assert_eq!(piano.envelope, Envelope::new(0.01, 0.3, 0.1, 1.2));

        let VoicePatch::Am(violin) = voices.patch(InstrumentKind::Violin) else {
            panic!("violin should be AM");
        };
        assert_eq!(violin.carrier, Waveform::Sawtooth);
        assert_eq!(violin.envelope, Envelope::new(0.6, 0.3, 0.6, 1.5));

        let harp = voices.patch(InstrumentKind::Harp);
        assert!(matches!(harp, VoicePatch::Pluck(_)));
        assert_eq!(harp.note_off(), NoteOffBehavior::PlayToCompletion);
        assert_eq!(harp.retrigger(), RetriggerBehavior::Cut);
        assert_eq!(harp.volume_db(), -4.0);
    }

    #[test]
    fn test_gain() {
        let patch = VoicePatch::builtin(InstrumentKind::Piano);
        assert!((patch.gain() - 0.501).abs() < 0.001);
    }

    #[test]
    fn test_override_keeps_model_defaults() {
        let voices = parse(
            r#"
            violin:
              model: fm
              modulation_index: 2
              envelope:
                attack: 0.2
            "#,
        );
        assert!(voices.validate().is_ok());

        let VoicePatch::Fm(violin) = voices.patch(InstrumentKind::Violin) else {
            panic!("violin should now be FM");
        };
        assert_eq!(violin.modulation_index, 2.0);
        assert_eq!(violin.harmonicity, 3.01);
        assert_eq!(violin.envelope.attack, 0.2);
        assert_eq!(violin.envelope.sustain, 0.3);

        // Untouched instruments keep their built-in patch.
        assert_eq!(
            voices.patch(InstrumentKind::Harp),
            VoicePatch::builtin(InstrumentKind::Harp)
        );
    }

    #[test]
    fn test_invalid_patches() {
        let voices = parse(
            r#"
            piano:
              model: fm
              envelope:
                sustain: 1.5
            "#,
        );
        assert!(voices.validate().is_err());

        let voices = parse(
            r#"
            harp:
              model: pluck
              resonance: 1.0
            "#,
        );
        assert!(voices.validate().is_err());
    }

    #[test]
    fn test_resolved_fills_every_instrument() {
        let resolved = Voices::default().resolved();
        let yaml = serde_yml::to_string(&resolved).unwrap();
        assert!(yaml.contains("piano:"));
        assert!(yaml.contains("violin:"));
        assert!(yaml.contains("harp:"));
        assert!(yaml.contains("model: pluck"));
    }
}
