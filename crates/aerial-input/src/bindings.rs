//! Key bindings: physical keys mapped to viewer actions.
//!
//! Movement and time-scrub actions are *held*: they stay active between the
//! press and release of their key. Toggles and sun presets are *triggered*
//! once, on key release.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Serde helper for [`KeyCode`], stored as its debug name (e.g. `"KeyW"`).
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        string_to_keycode(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }

    pub(super) fn string_to_keycode(s: &str) -> Option<KeyCode> {
        // Names match the Debug output of KeyCode variants.
        Some(match s {
            "KeyA" => KeyCode::KeyA,
            "KeyB" => KeyCode::KeyB,
            "KeyC" => KeyCode::KeyC,
            "KeyD" => KeyCode::KeyD,
            "KeyE" => KeyCode::KeyE,
            "KeyF" => KeyCode::KeyF,
            "KeyG" => KeyCode::KeyG,
            "KeyH" => KeyCode::KeyH,
            "KeyI" => KeyCode::KeyI,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyL" => KeyCode::KeyL,
            "KeyM" => KeyCode::KeyM,
            "KeyN" => KeyCode::KeyN,
            "KeyO" => KeyCode::KeyO,
            "KeyP" => KeyCode::KeyP,
            "KeyQ" => KeyCode::KeyQ,
            "KeyR" => KeyCode::KeyR,
            "KeyS" => KeyCode::KeyS,
            "KeyT" => KeyCode::KeyT,
            "KeyU" => KeyCode::KeyU,
            "KeyV" => KeyCode::KeyV,
            "KeyW" => KeyCode::KeyW,
            "KeyX" => KeyCode::KeyX,
            "KeyY" => KeyCode::KeyY,
            "KeyZ" => KeyCode::KeyZ,
            "Digit0" => KeyCode::Digit0,
            "Digit1" => KeyCode::Digit1,
            "Digit2" => KeyCode::Digit2,
            "Digit3" => KeyCode::Digit3,
            "Digit4" => KeyCode::Digit4,
            "Digit5" => KeyCode::Digit5,
            "Digit6" => KeyCode::Digit6,
            "Digit7" => KeyCode::Digit7,
            "Digit8" => KeyCode::Digit8,
            "Digit9" => KeyCode::Digit9,
            "Space" => KeyCode::Space,
            "Enter" => KeyCode::Enter,
            "Escape" => KeyCode::Escape,
            "Tab" => KeyCode::Tab,
            "Backspace" => KeyCode::Backspace,
            "ShiftLeft" => KeyCode::ShiftLeft,
            "ShiftRight" => KeyCode::ShiftRight,
            "ControlLeft" => KeyCode::ControlLeft,
            "ControlRight" => KeyCode::ControlRight,
            "AltLeft" => KeyCode::AltLeft,
            "AltRight" => KeyCode::AltRight,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "Comma" => KeyCode::Comma,
            "Period" => KeyCode::Period,
            "Slash" => KeyCode::Slash,
            "Semicolon" => KeyCode::Semicolon,
            "Quote" => KeyCode::Quote,
            "BracketLeft" => KeyCode::BracketLeft,
            "BracketRight" => KeyCode::BracketRight,
            "Minus" => KeyCode::Minus,
            "Equal" => KeyCode::Equal,
            "Backquote" => KeyCode::Backquote,
            "Backslash" => KeyCode::Backslash,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "Insert" => KeyCode::Insert,
            "Delete" => KeyCode::Delete,
            "F1" => KeyCode::F1,
            "F2" => KeyCode::F2,
            "F3" => KeyCode::F3,
            "F4" => KeyCode::F4,
            "F5" => KeyCode::F5,
            "F6" => KeyCode::F6,
            "F7" => KeyCode::F7,
            "F8" => KeyCode::F8,
            "F9" => KeyCode::F9,
            "F10" => KeyCode::F10,
            "F11" => KeyCode::F11,
            "F12" => KeyCode::F12,
            "Numpad0" => KeyCode::Numpad0,
            "Numpad1" => KeyCode::Numpad1,
            "Numpad2" => KeyCode::Numpad2,
            "Numpad3" => KeyCode::Numpad3,
            "Numpad4" => KeyCode::Numpad4,
            "Numpad5" => KeyCode::Numpad5,
            "Numpad6" => KeyCode::Numpad6,
            "Numpad7" => KeyCode::Numpad7,
            "Numpad8" => KeyCode::Numpad8,
            "Numpad9" => KeyCode::Numpad9,
            _ => return None,
        })
    }
}

/// Viewer actions that keys can be bound to.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    /// Scrub the sun forward while held.
    TimeForward,
    /// Scrub the sun backward while held.
    TimeBackward,
    /// Start or stop the automatic sun cycle.
    ToggleCycle,
    /// Jump the sun to preset `n` (0-based).
    SunPreset(u8),
    ToggleRayleigh,
    ToggleMie,
}

impl InputAction {
    /// Whether this action tracks key hold state rather than firing once.
    pub fn is_held(self) -> bool {
        matches!(
            self,
            Self::MoveForward
                | Self::MoveBack
                | Self::MoveLeft
                | Self::MoveRight
                | Self::TimeForward
                | Self::TimeBackward
        )
    }
}

/// Result of looking up a key event in the bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInput {
    /// A held action changed state.
    Held { action: InputAction, active: bool },
    /// A one-shot action fired.
    Triggered(InputAction),
}

/// One key-to-action entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    #[serde(with = "keycode_serde")]
    pub key: KeyCode,
    pub action: InputAction,
}

/// Ordered key binding table. The first entry matching a key wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub bindings: Vec<KeyBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use InputAction::*;
        let table = [
            (KeyCode::KeyW, MoveForward),
            (KeyCode::KeyS, MoveBack),
            (KeyCode::KeyA, MoveLeft),
            (KeyCode::KeyD, MoveRight),
            (KeyCode::KeyE, TimeForward),
            (KeyCode::KeyQ, TimeBackward),
            (KeyCode::Space, ToggleCycle),
            (KeyCode::Digit1, SunPreset(0)),
            (KeyCode::Digit2, SunPreset(1)),
            (KeyCode::Digit3, SunPreset(2)),
            (KeyCode::Digit4, SunPreset(3)),
            (KeyCode::Digit5, SunPreset(4)),
            (KeyCode::Digit6, SunPreset(5)),
            (KeyCode::KeyR, ToggleRayleigh),
            (KeyCode::KeyM, ToggleMie),
        ];
        Self {
            bindings: table
                .into_iter()
                .map(|(key, action)| KeyBinding { key, action })
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Action bound to `key`, if any.
    pub fn action_for(&self, key: KeyCode) -> Option<InputAction> {
        self.bindings
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.action)
    }

    /// Translate a key transition into a held-state change or a trigger.
    /// Presses of one-shot keys resolve to nothing.
    pub fn resolve(&self, key: KeyCode, state: ElementState) -> Option<ResolvedInput> {
        let Some(action) = self.action_for(key) else {
            trace!(?key, "unbound key");
            return None;
        };
        if action.is_held() {
            return Some(ResolvedInput::Held {
                action,
                active: state == ElementState::Pressed,
            });
        }
        (state == ElementState::Released).then_some(ResolvedInput::Triggered(action))
    }

    /// Parse bindings from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        let bindings: Self = ron::from_str(text)?;
        debug!(count = bindings.bindings.len(), "key bindings parsed");
        Ok(bindings)
    }

    /// Serialize bindings as pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }
}
