//! Input event descriptions.
//!
//! These are recorded bindings (a key with modifiers, a mouse or joystick
//! button, a joystick axis direction), not live events.

use std::fmt;

/// Modifier keys held with a key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyModifiers {
    pub control: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyModifiers {
    /// Parse a modifier string; each of `C`, `A`, `S`, `M` (any case) sets
    /// one flag and other characters are ignored.
    pub fn from_letters(letters: &str) -> Self {
        let mut mods = KeyModifiers::default();
        for c in letters.chars() {
            match c.to_ascii_uppercase() {
                'C' => mods.control = true,
                'A' => mods.alt = true,
                'S' => mods.shift = true,
                'M' => mods.meta = true,
                _ => {}
            }
        }
        mods
    }

    pub fn is_empty(&self) -> bool {
        !(self.control || self.alt || self.shift || self.meta)
    }
}

/// Written in `A S C M` order, empty when no modifier is held.
impl fmt::Display for KeyModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, letter) in [
            (self.alt, "A"),
            (self.shift, "S"),
            (self.control, "C"),
            (self.meta, "M"),
        ] {
            if set {
                f.write_str(letter)?;
            }
        }
        Ok(())
    }
}

/// Which half of a joystick axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisDirection {
    Negative,
    Positive,
}

impl AxisDirection {
    /// `-1` or `+1`.
    pub fn sign(self) -> i64 {
        match self {
            AxisDirection::Negative => -1,
            AxisDirection::Positive => 1,
        }
    }

    /// Negative numbers map to `Negative`, everything else to `Positive`.
    pub fn from_sign(sign: i64) -> Self {
        if sign < 0 {
            AxisDirection::Negative
        } else {
            AxisDirection::Positive
        }
    }
}

/// A recorded input binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputEvent {
    #[default]
    None,
    Key {
        scancode: i64,
        modifiers: KeyModifiers,
    },
    MouseButton {
        device: i64,
        index: i64,
    },
    JoystickButton {
        device: i64,
        index: i64,
    },
    JoystickAxis {
        device: i64,
        axis: i64,
        direction: AxisDirection,
    },
}

impl InputEvent {
    /// The sub-variant identifier used in text.
    pub fn tag(&self) -> &'static str {
        match self {
            InputEvent::None => "NONE",
            InputEvent::Key { .. } => "KEY",
            InputEvent::MouseButton { .. } => "MBUTTON",
            InputEvent::JoystickButton { .. } => "JBUTTON",
            InputEvent::JoystickAxis { .. } => "JAXIS",
        }
    }
}
