//! Translates configured key names into Bevy buttons and samples them into
//! the rig's per-frame input snapshot.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use viewpoint::{Action, InputSnapshot, KeyBindings};

/// A physical button an action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// Parses a key name such as `"e"`, `"tab"` or `"mouse_right"`.
pub fn parse_binding(name: &str) -> Option<Binding> {
    let name = name.trim().to_ascii_lowercase();
    let key = match name.as_str() {
        "mouse_left" => return Some(Binding::Mouse(MouseButton::Left)),
        "mouse_right" => return Some(Binding::Mouse(MouseButton::Right)),
        "mouse_middle" => return Some(Binding::Mouse(MouseButton::Middle)),
        "tab" => KeyCode::Tab,
        "escape" | "esc" => KeyCode::Escape,
        "space" => KeyCode::Space,
        "enter" | "return" => KeyCode::Enter,
        "backspace" => KeyCode::Backspace,
        "shift" | "left_shift" => KeyCode::ShiftLeft,
        "ctrl" | "left_ctrl" => KeyCode::ControlLeft,
        "alt" | "left_alt" => KeyCode::AltLeft,
        "up" => KeyCode::ArrowUp,
        "down" => KeyCode::ArrowDown,
        "left" => KeyCode::ArrowLeft,
        "right" => KeyCode::ArrowRight,
        other => letter_or_digit(other)?,
    };
    Some(Binding::Key(key))
}

fn letter_or_digit(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];
    match c {
        'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        _ => None,
    }
}

/// Resolved bindings for every action.
#[derive(Resource, Debug, Clone)]
pub struct ActionMap {
    bindings: Vec<(Action, Binding)>,
}

impl ActionMap {
    /// Resolves every configured key name. Unknown names leave the action
    /// unbound and are logged.
    pub fn from_config(config: &KeyBindings) -> Self {
        let bindings = Action::ALL
            .iter()
            .filter_map(|&action| {
                let name = config.key_for(action);
                match parse_binding(name) {
                    Some(binding) => Some((action, binding)),
                    None => {
                        tracing::warn!("Unknown key '{}' for {:?}; action unbound", name, action);
                        None
                    }
                }
            })
            .collect();
        Self { bindings }
    }

    pub fn binding(&self, action: Action) -> Option<Binding> {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, b)| *b)
    }

    /// Builds this frame's snapshot from the current button state.
    pub fn sample(
        &self,
        keys: &ButtonInput<KeyCode>,
        mouse: &ButtonInput<MouseButton>,
        look: Vec2,
    ) -> InputSnapshot {
        let mut snapshot = InputSnapshot::new();
        for &(action, binding) in &self.bindings {
            let (pressed, held, released) = match binding {
                Binding::Key(key) => (
                    keys.just_pressed(key),
                    keys.pressed(key),
                    keys.just_released(key),
                ),
                Binding::Mouse(button) => (
                    mouse.just_pressed(button),
                    mouse.pressed(button),
                    mouse.just_released(button),
                ),
            };
            if pressed {
                snapshot.set_pressed(action);
            } else if held {
                snapshot.set_held(action);
            }
            if released {
                snapshot.set_released(action);
            }
        }
        snapshot.set_look(look);
        snapshot
    }
}

/// This frame's sampled input, shared by the control and rig systems.
#[derive(Resource, Debug, Default)]
pub struct FrameInput(pub InputSnapshot);

pub fn sample_input(
    map: Res<ActionMap>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut frame: ResMut<FrameInput>,
) {
    let look: Vec2 = motion.read().map(|m| m.delta).sum();
    frame.0 = map.sample(&keys, &mouse, look);
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewpoint::InputSource;

    #[test]
    fn test_parse_binding_names() {
        assert_eq!(parse_binding("e"), Some(Binding::Key(KeyCode::KeyE)));
        assert_eq!(parse_binding("Q"), Some(Binding::Key(KeyCode::KeyQ)));
        assert_eq!(parse_binding("tab"), Some(Binding::Key(KeyCode::Tab)));
        assert_eq!(parse_binding("7"), Some(Binding::Key(KeyCode::Digit7)));
        assert_eq!(
            parse_binding("mouse_right"),
            Some(Binding::Mouse(MouseButton::Right))
        );
        assert_eq!(parse_binding("hyper"), None);
        assert_eq!(parse_binding(""), None);
    }

    #[test]
    fn test_default_bindings_all_resolve() {
        let map = ActionMap::from_config(&KeyBindings::default());
        for action in Action::ALL {
            assert!(map.binding(action).is_some(), "{:?} unbound", action);
        }
    }

    #[test]
    fn test_sample_edges() {
        let map = ActionMap::from_config(&KeyBindings::default());
        let mut keys = ButtonInput::<KeyCode>::default();
        let mouse = ButtonInput::<MouseButton>::default();

        keys.press(KeyCode::KeyE);
        let frame = map.sample(&keys, &mouse, Vec2::new(3.0, 0.0));
        assert!(frame.pressed(Action::Interact));
        assert!(frame.held(Action::Interact));
        assert_eq!(frame.look_axis(), Vec2::new(3.0, 0.0));

        keys.clear();
        let frame = map.sample(&keys, &mouse, Vec2::ZERO);
        assert!(!frame.pressed(Action::Interact));
        assert!(frame.held(Action::Interact));

        keys.release(KeyCode::KeyE);
        let frame = map.sample(&keys, &mouse, Vec2::ZERO);
        assert!(frame.released(Action::Interact));
        assert!(!frame.held(Action::Interact));
    }
}
