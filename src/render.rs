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

//! Draw lists for the instruments and the particle overlay.
//!
//! Nothing here knows about a windowing toolkit. A scene is a list of shapes in
//! canvas coordinates, painted in order.

use std::collections::HashMap;

use crate::instrument::InstrumentKind;
use crate::mapper::{CanvasSize, Point, Rect, TargetId};
use crate::particles::Particle;

mod harp;
mod piano;
mod violin;

/// The glow color shared by every instrument.
pub const NEON: Rgba = Rgba::new(138, 43, 226, 1.0);

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Rgba {
        Rgba { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Rgba {
        Rgba::new(r, g, b, 1.0)
    }

    pub const fn with_alpha(self, a: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }

    /// Converts from hue (degrees), saturation and lightness (0-1).
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Rgba {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba::opaque(channel(r), channel(g), channel(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Rgba,
}

impl Stroke {
    pub const fn new(width: f32, color: Rgba) -> Stroke {
        Stroke { width, color }
    }
}

/// A soft halo drawn behind a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Rgba,
        stroke: Stroke,
        glow: Option<Glow>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
        glow: Option<Glow>,
    },
    /// A cubic Bézier curve.
    Bezier {
        points: [Point; 4],
        stroke: Stroke,
        glow: Option<Glow>,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Rgba,
        /// Blend by adding to what is already drawn.
        additive: bool,
    },
}

/// An ordered list of shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Draws an instrument, highlighting every target in `active`.
pub fn instrument_scene(
    instrument: InstrumentKind,
    size: CanvasSize,
    active: &HashMap<TargetId, String>,
) -> Scene {
    let mut scene = Scene::new();
    if size.is_empty() {
        return scene;
    }
    let is_active = |target: TargetId| active.contains_key(&target);
    match instrument {
        InstrumentKind::Piano => piano::draw(&mut scene, size, is_active),
        InstrumentKind::Violin => violin::draw(&mut scene, size, is_active),
        InstrumentKind::Harp => harp::draw(&mut scene, size, is_active),
    }
    scene
}

/// Draws the particle overlay.
pub fn particle_scene(particles: &[Particle]) -> Scene {
    let mut scene = Scene::new();
    for particle in particles {
        scene.push(Shape::Circle {
            center: particle.position,
            radius: particle.size,
            fill: Rgba::from_hsl(particle.hue, 1.0, 0.5),
            additive: true,
        });
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{harp as harp_layout, violin as violin_layout};
    use crate::scale::CHROMATIC_SCALE;

    fn size() -> CanvasSize {
        CanvasSize::new(1500.0, 600.0)
    }

    #[test]
    fn test_from_hsl() {
        assert_eq!(Rgba::from_hsl(0.0, 1.0, 0.5), Rgba::opaque(255, 0, 0));
        assert_eq!(Rgba::from_hsl(120.0, 1.0, 0.5), Rgba::opaque(0, 255, 0));
        assert_eq!(Rgba::from_hsl(300.0, 1.0, 0.5), Rgba::opaque(255, 0, 255));
        assert_eq!(Rgba::from_hsl(360.0, 1.0, 0.5), Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn test_piano_scene() {
        let scene = instrument_scene(InstrumentKind::Piano, size(), &HashMap::new());
        assert_eq!(scene.len(), CHROMATIC_SCALE.len());
        // White keys are painted before black keys.
        let Shape::Rect { rect, .. } = &scene.shapes()[15] else {
            panic!("expected a rectangle");
        };
        assert!((rect.height - 360.0).abs() < 1e-3);
        assert!(scene
            .shapes()
            .iter()
            .all(|s| matches!(s, Shape::Rect { glow: None, .. })));
    }

    #[test]
    fn test_piano_active_key_glows() {
        let mut active = HashMap::new();
        active.insert(TargetId::key(1), "C#4".to_string());
        let scene = instrument_scene(InstrumentKind::Piano, size(), &active);

        let glowing: Vec<&Shape> = scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Rect { glow: Some(_), .. }))
            .collect();
        assert_eq!(glowing.len(), 1);
        let Shape::Rect { rect, fill, .. } = glowing[0] else {
            unreachable!();
        };
        assert!((rect.x - (100.0 - 30.0)).abs() < 1e-3);
        assert_eq!(*fill, NEON.with_alpha(0.8));
    }

    #[test]
    fn test_violin_active_string() {
        let mut active = HashMap::new();
        active.insert(TargetId::string(2), "G4".to_string());
        let scene = instrument_scene(InstrumentKind::Violin, size(), &active);

        let strings: Vec<&Shape> = scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Line { .. }))
            .collect();
        assert_eq!(strings.len(), violin_layout::STRING_COUNT);
        for (index, shape) in strings.iter().enumerate() {
            let Shape::Line { from, stroke, .. } = shape else {
                unreachable!();
            };
            assert!((from.x - violin_layout::string_x(index, size())).abs() < 1e-3);
            if index == 2 {
                assert_eq!(stroke.color, Rgba::WHITE);
                assert_eq!(stroke.width, 6.0);
            } else {
                assert_eq!(stroke.width, 3.0);
            }
        }
    }

    #[test]
    fn test_harp_strings_follow_layout() {
        let mut active = HashMap::new();
        active.insert(TargetId::harp(14), "C6".to_string());
        let scene = instrument_scene(InstrumentKind::Harp, size(), &active);

        let strings: Vec<&Shape> = scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Line { glow: None, .. }))
            .collect();
        assert_eq!(strings.len(), harp_layout::STRING_COUNT);
        let Shape::Line { from, to, stroke, .. } = strings[14] else {
            unreachable!();
        };
        assert_eq!((*from, *to), harp_layout::string_endpoints(14, size()));
        assert_eq!(stroke.width, 4.0);
    }

    #[test]
    fn test_empty_canvas_draws_nothing() {
        let scene = instrument_scene(
            InstrumentKind::Harp,
            CanvasSize::new(0.0, 100.0),
            &HashMap::new(),
        );
        assert!(scene.is_empty());
    }

    #[test]
    fn test_particle_scene() {
        let particle = Particle {
            position: Point::new(10.0, 20.0),
            size: 12.0,
            speed_y: -1.0,
            hue: 300.0,
            life: 0.5,
        };
        let scene = particle_scene(&[particle]);
        assert_eq!(
            scene.shapes(),
            &[Shape::Circle {
                center: Point::new(10.0, 20.0),
                radius: 12.0,
                fill: Rgba::opaque(255, 0, 255),
                additive: true,
            }]
        );
    }
}
