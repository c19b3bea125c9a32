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
use std::collections::HashSet;

use eframe::egui::{self, Event, PointerButton, TouchPhase};

use crate::mapper::Point;
use crate::surface::{InteractionSurface, PointerId};

/// The mouse.
const MOUSE: PointerId = 0;

/// Turns window events into surface pointer events.
///
/// Leaving the canvas ends a mouse press. Mouse events are ignored while
/// any touch is down, since the platform also reports touches as a mouse.
#[derive(Debug, Default)]
pub(super) struct PointerInput {
    mouse_down: bool,
    touches: HashSet<u64>,
}

fn touch_pointer(id: egui::TouchId) -> PointerId {
    // Keeps touch pointers clear of the mouse.
    id.0.wrapping_add(1)
}

impl PointerInput {
    pub(super) fn handle(
        &mut self,
        events: &[Event],
        rect: egui::Rect,
        surface: &mut InteractionSurface,
    ) {
        let local = |pos: egui::Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => {
                    let pointer = touch_pointer(*id);
                    match phase {
                        TouchPhase::Start => {
                            if rect.contains(*pos) {
                                self.touches.insert(pointer);
                                surface.pointer_down(pointer, local(*pos));
                            }
                        }
                        TouchPhase::Move => {
                            if self.touches.contains(&pointer) {
                                surface.pointer_move(pointer, local(*pos));
                            }
                        }
                        TouchPhase::End | TouchPhase::Cancel => {
                            if self.touches.remove(&pointer) {
                                surface.pointer_up(pointer);
                            }
                        }
                    }
                }
                _ if !self.touches.is_empty() => {}
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed && rect.contains(*pos) {
                        self.mouse_down = true;
                        surface.pointer_down(MOUSE, local(*pos));
                    } else if !*pressed {
                        self.end_mouse(surface);
                    }
                }
                Event::PointerMoved(pos) if self.mouse_down => {
                    if rect.contains(*pos) {
                        surface.pointer_move(MOUSE, local(*pos));
                    } else {
                        self.end_mouse(surface);
                    }
                }
                Event::PointerGone => self.end_mouse(surface),
                _ => {}
            }
        }
    }

    fn end_mouse(&mut self, surface: &mut InteractionSurface) {
        if self.mouse_down {
            self.mouse_down = false;
            surface.pointer_up(MOUSE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{mock, AudioBridge, Command};
    use crate::config::Voices;
    use crate::instrument::InstrumentKind;
    use crate::mapper::{CanvasSize, TargetId};
    use crate::particles::ParticleSystem;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(1500.0, 600.0))
    }

    async fn piano() -> (InteractionSurface, mock::Engine) {
        let engine = mock::Engine::get("mock");
        let bridge = AudioBridge::new(Box::new(engine.clone()), Voices::default());
        let mut surface = InteractionSurface::new(bridge, ParticleSystem::new(1));
        surface.resize(CanvasSize::new(1500.0, 600.0));
        surface.initialize().await.unwrap();
        assert_eq!(surface.instrument(), InstrumentKind::Piano);
        engine.clear_commands();
        (surface, engine)
    }

    fn button(x: f32, y: f32, pressed: bool) -> Event {
        Event::PointerButton {
            pos: egui::pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f32, y: f32) -> Event {
        Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    #[tokio::test]
    async fn test_mouse_is_relative_to_canvas() {
        let (mut surface, _engine) = piano().await;
        let mut input = PointerInput::default();

        // Canvas x = 150, the second white key.
        input.handle(&[button(250.0, 550.0, true)], rect(), &mut surface);
        assert!(surface.active().contains_key(&TargetId::key(2)));

        input.handle(&[button(250.0, 550.0, false)], rect(), &mut surface);
        assert!(surface.active().is_empty());
    }

    #[tokio::test]
    async fn test_leaving_canvas_releases() {
        let (mut surface, engine) = piano().await;
        let mut input = PointerInput::default();

        input.handle(
            &[
                button(150.0, 550.0, true),
                Event::PointerMoved(egui::pos2(150.0, 700.0)),
            ],
            rect(),
            &mut surface,
        );
        assert!(surface.active().is_empty());
        assert_eq!(engine.commands().len(), 2);

        // Moving back in without a press does nothing.
        input.handle(
            &[Event::PointerMoved(egui::pos2(150.0, 550.0))],
            rect(),
            &mut surface,
        );
        assert!(surface.active().is_empty());
    }

    #[tokio::test]
    async fn test_press_outside_canvas_is_ignored() {
        let (mut surface, engine) = piano().await;
        let mut input = PointerInput::default();
        input.handle(&[button(50.0, 10.0, true)], rect(), &mut surface);
        assert!(engine.commands().is_empty());
    }

    #[tokio::test]
    async fn test_touches_are_independent() {
        let (mut surface, _engine) = piano().await;
        let mut input = PointerInput::default();

        input.handle(
            &[
                touch(0, TouchPhase::Start, 150.0, 550.0),
                touch(1, TouchPhase::Start, 350.0, 550.0),
            ],
            rect(),
            &mut surface,
        );
        assert_eq!(surface.active().len(), 2);

        input.handle(&[touch(0, TouchPhase::End, 150.0, 550.0)], rect(), &mut surface);
        assert_eq!(surface.active().len(), 1);
        assert!(surface.active().contains_key(&TargetId::key(4)));
    }

    #[tokio::test]
    async fn test_simulated_mouse_ignored_during_touch() {
        let (mut surface, engine) = piano().await;
        let mut input = PointerInput::default();

        input.handle(
            &[
                touch(3, TouchPhase::Start, 150.0, 550.0),
                button(150.0, 550.0, true),
            ],
            rect(),
            &mut surface,
        );
        assert_eq!(surface.active().len(), 1);
        assert!(matches!(
            engine.commands().as_slice(),
            [Command::Attack { .. }]
        ));
    }
}
