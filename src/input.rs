//! Keyboard input as seen by the viewer core.
//!
//! The windowing collaborator translates its native key events into
//! [`InputEvent`]s and feeds them to [`Viewer::on_key`](crate::viewer::Viewer::on_key).
//! Held keys are tracked in [`KeyState`] for continuous controls such as the
//! fly camera.

use rustc_hash::FxHashSet;

/// Keys the viewer reacts to. Anything else arrives as [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    I,
    J,
    K,
    L,
    U,
    O,
    P,
    Left,
    Right,
    Up,
    Down,
    Digit(u8),
    Space,
    Escape,
    /// A native key code the core has no binding for
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

impl KeyAction {
    /// Press and auto-repeat both count as the key being down.
    #[inline]
    #[must_use]
    pub fn is_down(self) -> bool {
        matches!(self, Self::Press | Self::Repeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl InputEvent {
    #[must_use]
    pub fn new(key: Key, action: KeyAction) -> Self {
        Self { key, action }
    }

    #[must_use]
    pub fn press(key: Key) -> Self {
        Self::new(key, KeyAction::Press)
    }

    #[must_use]
    pub fn release(key: Key) -> Self {
        Self::new(key, KeyAction::Release)
    }
}

/// Set of currently held keys.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: FxHashSet<Key>,
}

impl KeyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        if event.action.is_down() {
            self.held.insert(event.key);
        } else {
            self.held.remove(&event.key);
        }
    }

    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
