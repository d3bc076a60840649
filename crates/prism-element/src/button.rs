//! The overlay button: fixed layout, hover tracking and click detection.

use prism_engine::coords::{Rect, Vec2};
use prism_engine::input::{ButtonState, InputEvent, MouseButton};
use prism_engine::paint::Color;
use prism_engine::render::ButtonStyle;

pub const LEFT: f32 = 30.0;
pub const TOP: f32 = 30.0;
/// Content width; padding and border come on top.
pub const CONTENT_WIDTH: f32 = 150.0;
pub const PADDING_X: f32 = 6.0;
pub const PADDING_Y: f32 = 12.0;
pub const BORDER_WIDTH: f32 = 1.0;
pub const CORNER_RADIUS: f32 = 4.0;
pub const LABEL_SIZE: f32 = 13.0;
/// `normal` line height for a 13 px sans-serif face.
pub const LINE_HEIGHT: f32 = 15.0;

pub fn style() -> ButtonStyle {
    ButtonStyle {
        corner_radius: CORNER_RADIUS,
        border_width: BORDER_WIDTH,
        border_color: Color::WHITE,
        background: Color::rgba(0, 0, 0, 0.1),
        text_color: Color::WHITE,
    }
}

/// Border box of the button in logical pixels.
pub fn layout() -> Rect {
    Rect::new(
        LEFT,
        TOP,
        CONTENT_WIDTH + 2.0 * (PADDING_X + BORDER_WIDTH),
        LINE_HEIGHT + 2.0 * (PADDING_Y + BORDER_WIDTH),
    )
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonEvent {
    Hover(bool),
    Clicked,
}

/// Click = primary press and release both inside the button.
#[derive(Debug, Clone)]
pub struct OverlayButton {
    rect: Rect,
    hovered: bool,
    armed: bool,
}

impl OverlayButton {
    pub fn new() -> Self {
        Self {
            rect: layout(),
            hovered: false,
            armed: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn hit(&self, p: Vec2) -> bool {
        self.rect.contains(p)
    }

    pub fn on_input(&mut self, event: &InputEvent) -> Option<ButtonEvent> {
        match event {
            InputEvent::PointerMoved(p) => self.set_hover(self.hit(*p)),
            InputEvent::PointerLeft | InputEvent::Focused(false) => {
                self.armed = false;
                self.set_hover(false)
            }
            InputEvent::PointerButton(ev) if ev.button == MouseButton::Left => match ev.state {
                ButtonState::Pressed => {
                    self.armed = self.hit(ev.pos);
                    None
                }
                ButtonState::Released => {
                    let clicked = self.armed && self.hit(ev.pos);
                    self.armed = false;
                    clicked.then_some(ButtonEvent::Clicked)
                }
            },
            _ => None,
        }
    }

    fn set_hover(&mut self, hovered: bool) -> Option<ButtonEvent> {
        if self.hovered == hovered {
            return None;
        }
        self.hovered = hovered;
        Some(ButtonEvent::Hover(hovered))
    }
}

impl Default for OverlayButton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::input::PointerButtonEvent;

    fn press(x: f32, y: f32, state: ButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            pos: Vec2::new(x, y),
        })
    }

    #[test]
    fn layout_matches_inline_style() {
        let r = layout();
        assert_eq!(r.origin, Vec2::new(30.0, 30.0));
        assert_eq!(r.size, Vec2::new(164.0, 41.0));
    }

    #[test]
    fn style_is_translucent_with_white_border() {
        let s = style();
        assert_eq!(s.border_color, Color::WHITE);
        assert!((s.background.a - 0.1).abs() < 1e-6);
        assert_eq!(s.corner_radius, 4.0);
    }

    #[test]
    fn hover_enters_and_leaves() {
        let mut b = OverlayButton::new();
        assert_eq!(b.on_input(&InputEvent::PointerMoved(Vec2::new(5.0, 5.0))), None);
        assert_eq!(
            b.on_input(&InputEvent::PointerMoved(Vec2::new(40.0, 40.0))),
            Some(ButtonEvent::Hover(true))
        );
        assert_eq!(b.on_input(&InputEvent::PointerMoved(Vec2::new(41.0, 40.0))), None);
        assert_eq!(b.on_input(&InputEvent::PointerLeft), Some(ButtonEvent::Hover(false)));
    }

    #[test]
    fn press_and_release_inside_clicks() {
        let mut b = OverlayButton::new();
        assert_eq!(b.on_input(&press(50.0, 45.0, ButtonState::Pressed)), None);
        assert_eq!(
            b.on_input(&press(60.0, 50.0, ButtonState::Released)),
            Some(ButtonEvent::Clicked)
        );
    }

    #[test]
    fn drag_out_or_in_does_not_click() {
        let mut b = OverlayButton::new();
        b.on_input(&press(50.0, 45.0, ButtonState::Pressed));
        assert_eq!(b.on_input(&press(400.0, 400.0, ButtonState::Released)), None);

        b.on_input(&press(400.0, 400.0, ButtonState::Pressed));
        assert_eq!(b.on_input(&press(50.0, 45.0, ButtonState::Released)), None);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut b = OverlayButton::new();
        let right = |state| {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Right,
                state,
                pos: Vec2::new(50.0, 45.0),
            })
        };
        assert_eq!(b.on_input(&right(ButtonState::Pressed)), None);
        assert_eq!(b.on_input(&right(ButtonState::Released)), None);
    }
}
