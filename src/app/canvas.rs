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
use eframe::egui::{self, epaint::CubicBezierShape, Color32, Painter, Pos2};

use crate::mapper::Point;
use crate::render::{Glow, Rgba, Scene, Shape, Stroke};
use crate::surface::Frame;

pub(super) const ACCENT: Color32 = Color32::from_rgb(0xd8, 0xb4, 0xfe);

const BACKGROUND: Color32 = Color32::from_rgb(0x0b, 0x05, 0x1a);

/// Halos are approximated by this many widening translucent passes.
const GLOW_LAYERS: usize = 3;
const GLOW_ALPHA: f32 = 0.15;

pub(super) fn paint(painter: &Painter, rect: egui::Rect, frame: &Frame) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
    paint_scene(painter, rect.min, &frame.instrument);
    paint_scene(painter, rect.min, &frame.particles);
}

fn color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (c.a.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn stroke(s: Stroke) -> egui::Stroke {
    egui::Stroke::new(s.width, color(s.color))
}

/// Widest pass first, each paired with the extra width it adds.
fn glow_passes(glow: Glow) -> impl Iterator<Item = (f32, Color32)> {
    let color = color(glow.color.with_alpha(glow.color.a * GLOW_ALPHA));
    (1..=GLOW_LAYERS)
        .rev()
        .map(move |layer| (glow.blur * layer as f32 / GLOW_LAYERS as f32, color))
}

fn paint_scene(painter: &Painter, origin: Pos2, scene: &Scene) {
    let pos = |p: Point| origin + egui::vec2(p.x, p.y);

    for shape in scene.shapes() {
        match shape {
            Shape::Rect {
                rect,
                fill,
                stroke: border,
                glow,
            } => {
                let rect = egui::Rect::from_min_size(
                    pos(Point::new(rect.x, rect.y)),
                    egui::vec2(rect.width, rect.height),
                );
                for (extra, halo) in glow.iter().flat_map(|g| glow_passes(*g)) {
                    painter.rect_filled(rect.expand(extra / 2.0), extra / 2.0, halo);
                }
                painter.rect_filled(rect, 0.0, color(*fill));
                painter.rect_stroke(rect, 0.0, stroke(*border), egui::StrokeKind::Inside);
            }
            Shape::Line {
                from,
                to,
                stroke: line,
                glow,
            } => {
                let points = [pos(*from), pos(*to)];
                for (extra, halo) in glow.iter().flat_map(|g| glow_passes(*g)) {
                    painter.line_segment(points, egui::Stroke::new(line.width + extra, halo));
                }
                painter.line_segment(points, stroke(*line));
            }
            Shape::Bezier {
                points,
                stroke: curve,
                glow,
            } => {
                let points = points.map(pos);
                for (extra, halo) in glow.iter().flat_map(|g| glow_passes(*g)) {
                    painter.add(CubicBezierShape::from_points_stroke(
                        points,
                        false,
                        Color32::TRANSPARENT,
                        egui::Stroke::new(curve.width + extra, halo),
                    ));
                }
                painter.add(CubicBezierShape::from_points_stroke(
                    points,
                    false,
                    Color32::TRANSPARENT,
                    stroke(*curve),
                ));
            }
            Shape::Circle {
                center,
                radius,
                fill,
                additive,
            } => {
                let fill = if *additive {
                    color(*fill).additive()
                } else {
                    color(*fill)
                };
                painter.circle_filled(pos(*center), *radius, fill);
            }
        }
    }
}
