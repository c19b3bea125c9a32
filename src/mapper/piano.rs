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

//! Keyboard geometry. White keys share the canvas width evenly; black keys sit
//! centered on the boundary between white keys and cover the top of the canvas.

use super::{CanvasSize, Hit, Point, Rect, TargetId};
use crate::scale::{self, KeyColor, CHROMATIC_SCALE};

/// Black keys are this fraction of a white key's width.
const BLACK_KEY_WIDTH_RATIO: f32 = 0.6;

/// Black keys cover this fraction of the canvas height.
const BLACK_KEY_HEIGHT_RATIO: f32 = 0.6;

/// Key dimensions for a canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PianoLayout {
    pub white_width: f32,
    pub black_width: f32,
    pub black_height: f32,
    pub height: f32,
}

impl PianoLayout {
    pub fn new(size: CanvasSize) -> PianoLayout {
        let white_width = size.width / scale::white_key_count() as f32;
        PianoLayout {
            white_width,
            black_width: white_width * BLACK_KEY_WIDTH_RATIO,
            black_height: size.height * BLACK_KEY_HEIGHT_RATIO,
            height: size.height,
        }
    }

    /// The rectangle covered by the key at the given chromatic index.
    pub fn key_rect(&self, index: usize) -> Option<Rect> {
        let key = CHROMATIC_SCALE.get(index)?;
        let whites_before = scale::white_keys_before(index) as f32;
        Some(match key.color {
            KeyColor::White => Rect {
                x: whites_before * self.white_width,
                y: 0.0,
                width: self.white_width,
                height: self.height,
            },
            KeyColor::Black => Rect {
                x: whites_before * self.white_width - self.black_width / 2.0,
                y: 0.0,
                width: self.black_width,
                height: self.black_height,
            },
        })
    }
}

pub(super) fn hit_test(point: Point, size: CanvasSize) -> Option<Hit> {
    let layout = PianoLayout::new(size);

    // Black keys win inside their band.
    if point.y < layout.black_height {
        for (index, key) in CHROMATIC_SCALE.iter().enumerate() {
            if key.color != KeyColor::Black {
                continue;
            }
            let left = scale::white_keys_before(index) as f32 * layout.white_width
                - layout.black_width / 2.0;
            if point.x >= left && point.x <= left + layout.black_width {
                return Some(Hit {
                    target: TargetId::key(index),
                    note: key.note,
                });
            }
        }
    }

    let white = (point.x / layout.white_width).floor();
    if white < 0.0 {
        return None;
    }
    let index = scale::nth_white_key(white as usize)?;
    Some(Hit {
        target: TargetId::key(index),
        note: CHROMATIC_SCALE[index].note,
    })
}

pub(super) fn position_for(index: usize, size: CanvasSize) -> Option<Point> {
    let layout = PianoLayout::new(size);
    let key = CHROMATIC_SCALE.get(index)?;
    let whites_before = scale::white_keys_before(index) as f32;
    Some(match key.color {
        KeyColor::White => Point::new(
            whites_before * layout.white_width + layout.white_width / 2.0,
            size.height * 0.8,
        ),
        KeyColor::Black => Point::new(
            whites_before * layout.white_width,
            layout.black_height * 0.8,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::InstrumentKind;
    use crate::mapper;

    fn size() -> CanvasSize {
        CanvasSize::new(1500.0, 500.0)
    }

    fn hit(x: f32, y: f32) -> Option<Hit> {
        mapper::hit_test(InstrumentKind::Piano, Point::new(x, y), size())
    }

    #[test]
    fn test_white_key_centers() {
        // 15 white keys at 100 units each.
        for white in 0..15 {
            let x = white as f32 * 100.0 + 50.0;
            let hit = hit(x, 400.0).expect("white key");
            let index = scale::nth_white_key(white).unwrap();
            assert_eq!(hit.target, TargetId::key(index));
            assert_eq!(hit.note, CHROMATIC_SCALE[index].note);
        }
    }

    #[test]
    fn test_black_key_between_whites() {
        // Between C4 and D4 sits C#4.
        let c_sharp = hit(100.0, 100.0).unwrap();
        assert_eq!(c_sharp.target, TargetId::key(1));
        assert_eq!(c_sharp.note, "C#4");

        // Between A5 and B5 sits A#5.
        let a_sharp = hit(1300.0, 100.0).unwrap();
        assert_eq!(a_sharp.target, TargetId::key(22));
        assert_eq!(a_sharp.note, "A#5");
    }

    #[test]
    fn test_no_black_key_between_e_and_f() {
        // E4/F4 boundary is at white index 3, x = 300. No black key there.
        let hit = hit(300.0, 100.0).unwrap();
        assert_eq!(hit.target, TargetId::key(5));
        assert_eq!(hit.note, "F4");
    }

    #[test]
    fn test_black_key_band_edges() {
        // Black key C#4 spans [70, 130] in the top 300 units.
        assert_eq!(hit(71.0, 10.0).unwrap().note, "C#4");
        assert_eq!(hit(129.0, 10.0).unwrap().note, "C#4");
        assert_eq!(hit(68.0, 10.0).unwrap().note, "C4");
        assert_eq!(hit(132.0, 10.0).unwrap().note, "D4");

        // Below the band the white key underneath wins.
        assert_eq!(hit(100.0, 310.0).unwrap().note, "D4");
        assert_eq!(hit(99.0, 310.0).unwrap().note, "C4");
    }

    #[test]
    fn test_right_edge_has_no_key() {
        // x == width lands one past the last white key.
        assert_eq!(hit(1500.0, 400.0), None);
        assert_eq!(hit(1499.0, 400.0).unwrap().note, "C6");
    }

    #[test]
    fn test_key_rects_match_hit_test() {
        let layout = PianoLayout::new(size());
        for index in 0..CHROMATIC_SCALE.len() {
            let rect = layout.key_rect(index).unwrap();
            let center = Point::new(rect.x + rect.width / 2.0, rect.y + rect.height * 0.75);
            let hit = hit(center.x, center.y).unwrap();
            assert_eq!(hit.target, TargetId::key(index));
        }
        assert_eq!(layout.key_rect(25), None);
    }
}
