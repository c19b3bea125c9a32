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

//! Maps pointer positions to playable targets and back.
//!
//! Every function in here is pure: the same position, instrument and canvas
//! size always produce the same result. Positions that miss every target
//! (including anything outside the canvas) resolve to `None`.

use std::{fmt, str::FromStr};

use crate::instrument::InstrumentKind;

pub mod harp;
pub mod piano;
pub mod violin;

/// A point in canvas coordinates. The origin is the top left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }
}

/// The size of the canvas the instrument is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> CanvasSize {
        CanvasSize { width, height }
    }

    /// True if the canvas has no area to hit.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True if the point lies on the canvas, edges included.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// An axis aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The kind of addressable zone on an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    /// A piano key, indexed into the chromatic table.
    Key,
    /// A violin string, 0 through 3.
    String,
    /// A harp string, indexed into the diatonic table.
    Harp,
}

impl TargetKind {
    fn prefix(self) -> &'static str {
        match self {
            TargetKind::Key => "key",
            TargetKind::String => "string",
            TargetKind::Harp => "harp",
        }
    }
}

/// Identifies an interaction target. Formats as `<kind>-<index>`, e.g. `key-4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId {
    kind: TargetKind,
    index: usize,
}

impl TargetId {
    pub fn new(kind: TargetKind, index: usize) -> TargetId {
        TargetId { kind, index }
    }

    pub fn key(index: usize) -> TargetId {
        TargetId::new(TargetKind::Key, index)
    }

    pub fn string(index: usize) -> TargetId {
        TargetId::new(TargetKind::String, index)
    }

    pub fn harp(index: usize) -> TargetId {
        TargetId::new(TargetKind::Harp, index)
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.index)
    }
}

/// Returned when a string is not a valid target id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid target id: {0}")]
pub struct ParseTargetError(String);

impl FromStr for TargetId {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, index) = s
            .split_once('-')
            .ok_or_else(|| ParseTargetError(s.to_string()))?;
        let kind = match prefix {
            "key" => TargetKind::Key,
            "string" => TargetKind::String,
            "harp" => TargetKind::Harp,
            _ => return Err(ParseTargetError(s.to_string())),
        };
        let index = index
            .parse::<usize>()
            .map_err(|_| ParseTargetError(s.to_string()))?;
        Ok(TargetId::new(kind, index))
    }
}

/// The result of a successful hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: TargetId,
    pub note: &'static str,
}

/// Resolves a pointer position to a target and the note it sounds.
pub fn hit_test(instrument: InstrumentKind, point: Point, size: CanvasSize) -> Option<Hit> {
    if size.is_empty() || !size.contains(point) {
        return None;
    }

    match instrument {
        InstrumentKind::Piano => piano::hit_test(point, size),
        InstrumentKind::Violin => violin::hit_test(point, size),
        InstrumentKind::Harp => harp::hit_test(point, size),
    }
}

/// Resolves a target back to the point where its visual effects are drawn.
///
/// `last_y` is the most recent pointer y, used by the violin whose notes move
/// along the string.
pub fn position_for(target: TargetId, size: CanvasSize, last_y: f32) -> Option<Point> {
    match target.kind() {
        TargetKind::Key => piano::position_for(target.index(), size),
        TargetKind::String => violin::position_for(target.index(), size, last_y),
        TargetKind::Harp => harp::position_for(target.index(), size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> CanvasSize {
        CanvasSize::new(1000.0, 600.0)
    }

    #[test]
    fn test_target_id_format_and_parse() {
        assert_eq!(TargetId::key(4).to_string(), "key-4");
        assert_eq!(TargetId::string(0).to_string(), "string-0");
        assert_eq!(TargetId::harp(14).to_string(), "harp-14");

        assert_eq!("key-13".parse::<TargetId>(), Ok(TargetId::key(13)));
        assert_eq!("string-3".parse::<TargetId>(), Ok(TargetId::string(3)));
        assert_eq!("harp-0".parse::<TargetId>(), Ok(TargetId::harp(0)));
        assert!("drum-1".parse::<TargetId>().is_err());
        assert!("key".parse::<TargetId>().is_err());
        assert!("key-x".parse::<TargetId>().is_err());
        assert!("key--1".parse::<TargetId>().is_err());
    }

    #[test]
    fn test_outside_canvas_never_matches() {
        for instrument in InstrumentKind::ALL {
            assert_eq!(hit_test(instrument, Point::new(-1.0, 300.0), size()), None);
            assert_eq!(hit_test(instrument, Point::new(500.0, -1.0), size()), None);
            assert_eq!(hit_test(instrument, Point::new(1001.0, 300.0), size()), None);
            assert_eq!(hit_test(instrument, Point::new(500.0, 601.0), size()), None);
        }
    }

    #[test]
    fn test_empty_canvas_never_matches() {
        for instrument in InstrumentKind::ALL {
            assert_eq!(
                hit_test(instrument, Point::new(0.0, 0.0), CanvasSize::default()),
                None
            );
        }
    }

    #[test]
    fn test_round_trip_is_stable() {
        let size = size();
        let targets = (0..25)
            .map(|i| (InstrumentKind::Piano, TargetId::key(i)))
            .chain((0..4).map(|i| (InstrumentKind::Violin, TargetId::string(i))))
            .chain((0..15).map(|i| (InstrumentKind::Harp, TargetId::harp(i))));

        for (instrument, target) in targets {
            let point = position_for(target, size, 300.0)
                .unwrap_or_else(|| panic!("{} should have a position", target));
            let hit = hit_test(instrument, point, size)
                .unwrap_or_else(|| panic!("{} should resolve from {:?}", target, point));
            assert_eq!(hit.target, target);
        }
    }

    #[test]
    fn test_forward_then_reverse_is_stable() {
        let size = size();
        for instrument in InstrumentKind::ALL {
            for x in (5..1000).step_by(37) {
                for y in (5..600).step_by(41) {
                    let point = Point::new(x as f32, y as f32);
                    let Some(hit) = hit_test(instrument, point, size) else {
                        continue;
                    };
                    let back = position_for(hit.target, size, point.y).unwrap();
                    let again = hit_test(instrument, back, size).unwrap();
                    assert_eq!(again.target, hit.target, "{} at {:?}", instrument, point);
                }
            }
        }
    }

    #[test]
    fn test_position_for_unknown_index() {
        assert_eq!(position_for(TargetId::key(25), size(), 0.0), None);
        assert_eq!(position_for(TargetId::string(4), size(), 0.0), None);
        assert_eq!(position_for(TargetId::harp(15), size(), 0.0), None);
    }
}
