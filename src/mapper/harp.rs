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

//! One string per diatonic note, fanning out from a base that covers the
//! middle three quarters of the canvas.

use super::{CanvasSize, Hit, Point, TargetId};
use crate::scale::DIATONIC_SCALE;

pub const STRING_COUNT: usize = DIATONIC_SCALE.len();

/// Where the strings start, relative to the canvas center.
const BASE_OFFSET: f32 = 0.35;

/// Width of the base the strings are spread over.
const BASE_SPAN: f32 = 0.75;

/// The base (left) x coordinate and width of the string fan.
fn base(size: CanvasSize) -> (f32, f32) {
    let center = size.width / 2.0;
    (center - size.width * BASE_OFFSET, size.width * BASE_SPAN)
}

fn spacing(size: CanvasSize) -> f32 {
    base(size).1 / (STRING_COUNT as f32 - 1.0)
}

/// The x coordinate where the given string meets the base.
pub fn string_base_x(index: usize, size: CanvasSize) -> f32 {
    base(size).0 + spacing(size) * index as f32
}

/// The two endpoints of a string: on the base at the bottom of the canvas, and
/// on the neck near the top.
pub fn string_endpoints(index: usize, size: CanvasSize) -> (Point, Point) {
    let center = size.width / 2.0;
    let start = Point::new(string_base_x(index, size), size.height);
    let end = Point::new(
        center + size.width * 0.02 * index as f32 - size.width * 0.05,
        size.height * 0.2,
    );
    (start, end)
}

pub(super) fn hit_test(point: Point, size: CanvasSize) -> Option<Hit> {
    let (start, span) = base(size);
    // Round half up, so a pointer exactly between two strings picks the higher one.
    let index = ((point.x - start) / span * (STRING_COUNT as f32 - 1.0) + 0.5).floor();
    if index < 0.0 || index >= STRING_COUNT as f32 {
        return None;
    }
    let index = index as usize;
    Some(Hit {
        target: TargetId::harp(index),
        note: DIATONIC_SCALE[index],
    })
}

pub(super) fn position_for(index: usize, size: CanvasSize) -> Option<Point> {
    if index >= STRING_COUNT {
        return None;
    }
    Some(Point::new(string_base_x(index, size), size.height * 0.7))
}
