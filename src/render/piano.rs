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
use crate::mapper::{piano::PianoLayout, CanvasSize, TargetId};
use crate::scale::{KeyColor, CHROMATIC_SCALE};

struct KeyStyle {
    fill: Rgba,
    active_fill: Rgba,
    border: Rgba,
    border_width: f32,
    glow: Glow,
}

const WHITE_KEY: KeyStyle = KeyStyle {
    fill: Rgba::opaque(0xfd, 0xfd, 0xfd),
    active_fill: NEON.with_alpha(0.6),
    border: Rgba::opaque(0x88, 0x88, 0x88),
    border_width: 1.0,
    glow: Glow {
        color: NEON.with_alpha(0.8),
        blur: 30.0,
    },
};

const BLACK_KEY: KeyStyle = KeyStyle {
    fill: Rgba::opaque(0x33, 0x33, 0x33),
    active_fill: NEON.with_alpha(0.8),
    border: Rgba::opaque(0, 0, 0),
    border_width: 2.0,
    glow: Glow {
        color: NEON.with_alpha(0.9),
        blur: 25.0,
    },
};

pub(super) fn draw(scene: &mut Scene, size: CanvasSize, is_active: impl Fn(TargetId) -> bool) {
    let layout = PianoLayout::new(size);

    // Black keys go on top.
    for (color, style) in [(KeyColor::White, &WHITE_KEY), (KeyColor::Black, &BLACK_KEY)] {
        for (index, key) in CHROMATIC_SCALE.iter().enumerate() {
            if key.color != color {
                continue;
            }
            let Some(rect) = layout.key_rect(index) else {
                continue;
            };
            let active = is_active(TargetId::key(index));
            scene.push(Shape::Rect {
                rect,
                fill: if active { style.active_fill } else { style.fill },
                stroke: Stroke::new(
                    style.border_width,
                    if active { Rgba::WHITE } else { style.border },
                ),
                glow: active.then_some(style.glow),
            });
        }
    }
}
