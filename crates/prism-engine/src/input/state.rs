use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{ButtonState, InputEvent, MouseButton, PointerButtonEvent};

/// Current input state for the element window.
///
/// winit reports mouse buttons without a position, so the last pointer
/// position is tracked here and stamped onto button events.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Pointer position in logical pixels; `None` while outside the window.
    pub pointer_pos: Option<Vec2>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck buttons when focus changes mid-press.
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(p) => self.pointer_pos = Some(*p),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::PointerButton(PointerButtonEvent { button, state, pos }) => {
                self.pointer_pos = Some(*pos);
                match state {
                    ButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    ButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }

            InputEvent::Key { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton, state: ButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent { button, state, pos: Vec2::new(x, y) })
    }

    #[test]
    fn pointer_tracks_moves_and_leave() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerMoved(Vec2::new(3.0, 4.0)));
        assert_eq!(s.pointer_pos, Some(Vec2::new(3.0, 4.0)));
        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }

    #[test]
    fn buttons_press_and_release() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Left, ButtonState::Pressed, 1.0, 1.0));
        assert!(s.buttons_down.contains(&MouseButton::Left));
        s.apply_event(&press(MouseButton::Left, ButtonState::Released, 1.0, 1.0));
        assert!(!s.buttons_down.contains(&MouseButton::Left));
    }

    #[test]
    fn focus_loss_clears_buttons() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Focused(true));
        s.apply_event(&press(MouseButton::Right, ButtonState::Pressed, 0.0, 0.0));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.focused);
        assert!(s.buttons_down.is_empty());
    }
}
