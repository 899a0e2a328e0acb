/// A high-level action produced from desktop input.
///
/// The app loop consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit the camera by a pointer delta in pixels.
    Orbit { dx: f32, dy: f32 },
    /// Pan the camera by a pointer delta in pixels.
    Pan { dx: f32, dy: f32 },
    /// Zoom by wheel steps; positive moves closer.
    Zoom(f32),
    /// Show or hide the debug panel.
    TogglePanel,
    /// Scatter the graves again with a fresh seed.
    Reseed,
    Quit,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

/// Map a key name to its action. Letter keys are case-insensitive.
pub fn key_action(name: &str) -> Action {
    match name {
        "F1" => Action::TogglePanel,
        "Escape" => Action::Quit,
        k if k.eq_ignore_ascii_case("r") => Action::Reseed,
        _ => Action::Noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_keys() {
        assert_eq!(key_action("F1"), Action::TogglePanel);
        assert_eq!(key_action("r"), Action::Reseed);
        assert_eq!(key_action("R"), Action::Reseed);
        assert_eq!(key_action("Escape"), Action::Quit);
    }

    #[test]
    fn unbound_keys_are_noop() {
        assert_eq!(key_action("q"), Action::Noop);
        assert_eq!(key_action(""), Action::Noop);
        assert_eq!(key_action("F2"), Action::Noop);
    }
}
