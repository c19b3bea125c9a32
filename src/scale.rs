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

//! Static note tables and note name helpers.

/// The color of a key on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// A single entry in the chromatic keyboard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaticKey {
    pub note: &'static str,
    pub color: KeyColor,
}

const fn white(note: &'static str) -> ChromaticKey {
    ChromaticKey {
        note,
        color: KeyColor::White,
    }
}

const fn black(note: &'static str) -> ChromaticKey {
    ChromaticKey {
        note,
        color: KeyColor::Black,
    }
}

/// Two octaves of keyboard, C4 through C6.
pub const CHROMATIC_SCALE: [ChromaticKey; 25] = [
    white("C4"),
    black("C#4"),
    white("D4"),
    black("D#4"),
    white("E4"),
    white("F4"),
    black("F#4"),
    white("G4"),
    black("G#4"),
    white("A4"),
    black("A#4"),
    white("B4"),
    white("C5"),
    black("C#5"),
    white("D5"),
    black("D#5"),
    white("E5"),
    white("F5"),
    black("F#5"),
    white("G5"),
    black("G#5"),
    white("A5"),
    black("A#5"),
    white("B5"),
    white("C6"),
];

/// Scale for the instruments that are not fully chromatic.
pub const DIATONIC_SCALE: [&str; 15] = [
    "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5", "C6",
];

/// Number of white keys in the chromatic table.
pub fn white_key_count() -> usize {
    CHROMATIC_SCALE
        .iter()
        .filter(|key| key.color == KeyColor::White)
        .count()
}

/// Returns the number of white keys that precede the given chromatic index.
pub fn white_keys_before(index: usize) -> usize {
    CHROMATIC_SCALE
        .iter()
        .take(index)
        .filter(|key| key.color == KeyColor::White)
        .count()
}

/// Returns the chromatic index of the nth white key.
pub fn nth_white_key(n: usize) -> Option<usize> {
    CHROMATIC_SCALE
        .iter()
        .enumerate()
        .filter(|(_, key)| key.color == KeyColor::White)
        .nth(n)
        .map(|(index, _)| index)
}

/// Parses a note name such as "C4", "F#5" or "Bb3" into a MIDI note number.
pub fn midi_number(note: &str) -> Option<u8> {
    let mut chars = note.chars();
    let pitch_class: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave) = if let Some(octave) = rest.strip_prefix('#') {
        (1, octave)
    } else if let Some(octave) = rest.strip_prefix('b') {
        (-1, octave)
    } else {
        (0, rest)
    };

    let octave: i32 = octave.parse().ok()?;
    let number = (octave + 1) * 12 + pitch_class + accidental;
    u8::try_from(number).ok().filter(|n| *n <= 127)
}

/// Returns the equal-tempered frequency of a note name, with A4 at 440Hz.
pub fn frequency(note: &str) -> Option<f32> {
    midi_number(note).map(|number| 440.0 * 2.0f32.powf((number as f32 - 69.0) / 12.0))
}
