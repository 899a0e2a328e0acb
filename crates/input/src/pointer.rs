use crate::action::Action;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Turns button state and cursor positions into camera actions.
///
/// Left drag orbits, right drag pans. Without a held button, movement only
/// updates the last known position.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last: Option<Vec2>,
    left: bool,
    right: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Left => self.left = pressed,
            PointerButton::Right => self.right = pressed,
            PointerButton::Middle => {}
        }
    }

    pub fn moved(&mut self, x: f32, y: f32) -> Action {
        let position = Vec2::new(x, y);
        let delta = self.last.map(|last| position - last);
        self.last = Some(position);
        let Some(d) = delta else {
            return Action::Noop;
        };
        if self.left {
            Action::Orbit { dx: d.x, dy: d.y }
        } else if self.right {
            Action::Pan { dx: d.x, dy: d.y }
        } else {
            Action::Noop
        }
    }

    /// Cursor left the window; the next move starts a fresh delta.
    pub fn left_window(&mut self) {
        self.last = None;
    }

    pub fn scroll(&self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.left || self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_has_no_delta() {
        let mut p = PointerTracker::new();
        p.button(PointerButton::Left, true);
        assert_eq!(p.moved(10.0, 10.0), Action::Noop);
        assert_eq!(p.moved(15.0, 8.0), Action::Orbit { dx: 5.0, dy: -2.0 });
    }

    #[test]
    fn right_drag_pans() {
        let mut p = PointerTracker::new();
        p.moved(0.0, 0.0);
        p.button(PointerButton::Right, true);
        assert_eq!(p.moved(3.0, 4.0), Action::Pan { dx: 3.0, dy: 4.0 });
        p.button(PointerButton::Right, false);
        assert_eq!(p.moved(5.0, 5.0), Action::Noop);
        assert!(!p.is_dragging());
    }

    #[test]
    fn leaving_window_resets_delta() {
        let mut p = PointerTracker::new();
        p.button(PointerButton::Left, true);
        p.moved(0.0, 0.0);
        p.left_window();
        assert_eq!(p.moved(100.0, 100.0), Action::Noop);
    }

    #[test]
    fn scroll_zooms() {
        let p = PointerTracker::new();
        assert_eq!(p.scroll(1.0), Action::Zoom(1.0));
        assert_eq!(p.scroll(0.0), Action::Noop);
    }
}
