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

//! Four vertical strings. The note on a string depends on how far up the
//! string the pointer is.

use super::{CanvasSize, Hit, Point, TargetId};
use crate::scale::DIATONIC_SCALE;

pub const STRING_COUNT: usize = 4;

/// A pointer closer than this to a string plays it.
pub const HIT_DISTANCE: f32 = 25.0;

/// Number of note bands along the height of a string.
const BANDS: f32 = 8.0;

/// Effects are kept this far away from the top and bottom edges.
const EFFECT_MARGIN: f32 = 20.0;

/// The x coordinate of the given string.
pub fn string_x(index: usize, size: CanvasSize) -> f32 {
    size.width / (STRING_COUNT as f32 + 1.0) * (index as f32 + 1.0)
}

/// The note played on a string at height `y`. Higher on the canvas is higher
/// in pitch, and each string starts two scale steps above the previous one.
pub fn note_at(index: usize, y: f32, size: CanvasSize) -> &'static str {
    let band = ((1.0 - y / size.height) * BANDS).floor() as i64;
    let note_index = (band + 2 * index as i64).rem_euclid(DIATONIC_SCALE.len() as i64);
    DIATONIC_SCALE[note_index as usize]
}

pub(super) fn hit_test(point: Point, size: CanvasSize) -> Option<Hit> {
    (0..STRING_COUNT)
        .find(|&index| (point.x - string_x(index, size)).abs() < HIT_DISTANCE)
        .map(|index| Hit {
            target: TargetId::string(index),
            note: note_at(index, point.y, size),
        })
}

pub(super) fn position_for(index: usize, size: CanvasSize, last_y: f32) -> Option<Point> {
    if index >= STRING_COUNT {
        return None;
    }
    let y = last_y
        .max(EFFECT_MARGIN)
        .min(size.height - EFFECT_MARGIN);
    Some(Point::new(string_x(index, size), y))
}
