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
use crate::mapper::{violin, CanvasSize, Point, TargetId};

const BODY_GLOW: Glow = Glow {
    color: NEON,
    blur: 15.0,
};

pub(super) fn draw(scene: &mut Scene, size: CanvasSize, is_active: impl Fn(TargetId) -> bool) {
    let (w, h) = (size.width, size.height);
    let p = |x: f32, y: f32| Point::new(w * x, h * y);
    let body = Stroke::new(4.0, NEON.with_alpha(0.5));

    // Each side of the body is an outer and an inner curve between the same
    // two points.
    for (edge, bulge, inner) in [(0.4, 0.2, 0.3), (0.6, 0.8, 0.7)] {
        for points in [
            [p(edge, 0.0), p(bulge, 0.2), p(bulge, 0.8), p(edge, 1.0)],
            [p(edge, 1.0), p(inner, 0.7), p(inner, 0.3), p(edge, 0.0)],
        ] {
            scene.push(Shape::Bezier {
                points,
                stroke: body,
                glow: Some(BODY_GLOW),
            });
        }
    }

    for index in 0..violin::STRING_COUNT {
        let x = violin::string_x(index, size);
        let stroke = if is_active(TargetId::string(index)) {
            Stroke::new(6.0, Rgba::WHITE)
        } else {
            Stroke::new(3.0, NEON.with_alpha(0.8))
        };
        scene.push(Shape::Line {
            from: Point::new(x, 0.0),
            to: Point::new(x, h),
            stroke,
            glow: Some(BODY_GLOW),
        });
    }
}
