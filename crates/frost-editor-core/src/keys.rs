//! Keyboard input types and the built-in shortcuts.

use smol_str::SmolStr;

/// A key value, as far as the editor distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key, lowercased.
    Character(SmolStr),
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Other(SmolStr),
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn parse(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" => Self::Escape,
            k if k.chars().count() == 1 => Self::Character(SmolStr::new(k.to_lowercase())),
            other => Self::Other(SmolStr::new(other)),
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };

    /// Ctrl, or Cmd on Mac.
    pub fn primary(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::CTRL)
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::CTRL_SHIFT)
    }
}

/// Built-in editing shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Bold,
    Italic,
    Underline,
    Undo,
    Redo,
}

impl Shortcut {
    /// Primary+B/I/U format, Primary+Z undoes, Primary+Y and
    /// Primary+Shift+Z redo.
    pub fn from_combo(combo: &KeyCombo) -> Option<Self> {
        let mods = combo.modifiers;
        if !mods.primary() || mods.alt {
            return None;
        }
        let Key::Character(c) = &combo.key else {
            return None;
        };
        Some(match (c.as_str(), mods.shift) {
            ("b", false) => Self::Bold,
            ("i", false) => Self::Italic,
            ("u", false) => Self::Underline,
            ("z", false) => Self::Undo,
            ("z", true) | ("y", false) => Self::Redo,
            _ => return None,
        })
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keys() {
        assert_eq!(Key::parse("B"), Key::character("b"));
        assert_eq!(Key::parse("Backspace"), Key::Backspace);
        assert_eq!(Key::parse("ArrowLeft"), Key::Other("ArrowLeft".into()));
    }

    #[test]
    fn shortcut_mapping() {
        let c = |s: &str| Key::character(s);
        assert_eq!(Shortcut::from_combo(&KeyCombo::ctrl(c("b"))), Some(Shortcut::Bold));
        assert_eq!(Shortcut::from_combo(&KeyCombo::ctrl(c("z"))), Some(Shortcut::Undo));
        assert_eq!(
            Shortcut::from_combo(&KeyCombo::ctrl_shift(c("z"))),
            Some(Shortcut::Redo)
        );
        assert_eq!(Shortcut::from_combo(&KeyCombo::ctrl(c("y"))), Some(Shortcut::Redo));
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            Shortcut::from_combo(&KeyCombo::with_modifiers(c("i"), meta)),
            Some(Shortcut::Italic)
        );
        assert_eq!(Shortcut::from_combo(&KeyCombo::new(c("b"))), None);
        assert_eq!(Shortcut::from_combo(&KeyCombo::ctrl_shift(c("b"))), None);
        assert_eq!(Shortcut::from_combo(&KeyCombo::ctrl(Key::Enter)), None);
    }
}
