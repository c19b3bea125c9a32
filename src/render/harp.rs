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
use super::{Glow, Rgba, Scene, Shape, Stroke, NEON};
use crate::mapper::{harp, CanvasSize, Point, TargetId};

const FRAME_GLOW: Glow = Glow {
    color: NEON,
    blur: 20.0,
};

pub(super) fn draw(scene: &mut Scene, size: CanvasSize, is_active: impl Fn(TargetId) -> bool) {
    let (w, h) = (size.width, size.height);
    let center = w / 2.0;
    let frame = Stroke::new(10.0, NEON.with_alpha(0.7));
    let pillar = Point::new(center - w * 0.35, h);
    let crown = Point::new(center + w * 0.1, h * 0.1);

    // Pillar and neck, then the short drop back to where the strings meet.
    scene.push(Shape::Bezier {
        points: [
            pillar,
            Point::new(center - w * 0.4, h * 0.4),
            Point::new(center, -h * 0.1),
            crown,
        ],
        stroke: frame,
        glow: Some(FRAME_GLOW),
    });
    scene.push(Shape::Line {
        from: crown,
        to: Point::new(center - w * 0.05, h * 0.25),
        stroke: frame,
        glow: Some(FRAME_GLOW),
    });
    scene.push(Shape::Line {
        from: pillar,
        to: Point::new(center + w * 0.4, h),
        stroke: frame,
        glow: Some(FRAME_GLOW),
    });

    for index in 0..harp::STRING_COUNT {
        let (from, to) = harp::string_endpoints(index, size);
        let stroke = if is_active(TargetId::harp(index)) {
            Stroke::new(4.0, Rgba::WHITE)
        } else {
            Stroke::new(2.0, NEON.with_alpha(0.8))
        };
        scene.push(Shape::Line {
            from,
            to,
            stroke,
            glow: None,
        });
    }
}
