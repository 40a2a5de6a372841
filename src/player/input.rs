//! Keyboard state tracking.
//!
//! Raw key codes are `KeyboardEvent.code` strings (`KeyW`, `ShiftLeft`, ...).
//! Codes without a binding are ignored.

use rustc_hash::FxHashMap;

use crate::utils::settings::Keybinds;

/// Logical keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Run,
    CameraToggle,
}

impl Key {
    pub fn is_movement(self) -> bool {
        matches!(self, Key::Forward | Key::Back | Key::Left | Key::Right)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub run: bool,
    pub camera_toggle: bool,
}

impl InputState {
    pub fn is_pressed(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Back => self.backward,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Jump => self.jump,
            Key::Run => self.run,
            Key::CameraToggle => self.camera_toggle,
        }
    }

    fn flag_mut(&mut self, key: Key) -> &mut bool {
        match key {
            Key::Forward => &mut self.forward,
            Key::Back => &mut self.backward,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Jump => &mut self.jump,
            Key::Run => &mut self.run,
            Key::CameraToggle => &mut self.camera_toggle,
        }
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Lookup table from raw key code to logical key.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: FxHashMap<String, Key>,
}

impl KeyBindings {
    pub fn from_keybinds(binds: &Keybinds) -> Self {
        let mut table = FxHashMap::default();
        for (code, key) in [
            (&binds.forward, Key::Forward),
            (&binds.back, Key::Back),
            (&binds.left, Key::Left),
            (&binds.right, Key::Right),
            (&binds.jump, Key::Jump),
            (&binds.run, Key::Run),
            (&binds.camera_toggle, Key::CameraToggle),
        ] {
            if let Some(previous) = table.insert(code.clone(), key) {
                tracing::warn!(
                    "Key code {} bound to both {:?} and {:?}, keeping {:?}",
                    code,
                    previous,
                    key,
                    key
                );
            }
        }
        Self { table }
    }

    pub fn resolve(&self, code: &str) -> Option<Key> {
        self.table.get(code).copied()
    }

    /// Resolve a winit physical key. winit names its variants after the
    /// same `KeyboardEvent.code` values used by the binding table.
    #[cfg(feature = "winit")]
    pub fn resolve_winit(&self, code: winit::keyboard::KeyCode) -> Option<Key> {
        self.resolve(&format!("{code:?}"))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_keybinds(&Keybinds::default())
    }
}

/// A recognized key-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    /// False for auto-repeat of a key that is already held.
    pub fresh: bool,
}

/// Events a host feeds into the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerMove { dx: f32, dy: f32 },
    Wheel(f32),
    /// Exclusive pointer capture was acquired (click) or released (escape).
    PointerCapture(bool),
}

/// Owns the [`InputState`]; the only writer of key flags.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    state: InputState,
    bindings: KeyBindings,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            state: InputState::default(),
            bindings,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn on_key_down(&mut self, code: &str) -> Option<KeyPress> {
        let key = self.bindings.resolve(code)?;
        let flag = self.state.flag_mut(key);
        let fresh = !*flag;
        *flag = true;
        Some(KeyPress { key, fresh })
    }

    pub fn on_key_up(&mut self, code: &str) -> Option<Key> {
        let key = self.bindings.resolve(code)?;
        *self.state.flag_mut(key) = false;
        Some(key)
    }

    /// Release every key, e.g. when the host window loses focus.
    pub fn release_all(&mut self) {
        self.state = InputState::default();
    }
}
