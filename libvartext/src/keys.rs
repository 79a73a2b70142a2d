//! Default keycode table for symbolic key names.

use crate::hooks::KeycodeLookup;

/// Offset of non-printable keys.
pub const SPECIAL_KEY: i64 = 1 << 24;

const SPECIAL_KEYS: &[(&str, i64)] = &[
    ("Escape", 0x01),
    ("Tab", 0x02),
    ("Backtab", 0x03),
    ("Backspace", 0x04),
    ("Return", 0x05),
    ("Enter", 0x06),
    ("Insert", 0x07),
    ("Delete", 0x08),
    ("Pause", 0x09),
    ("Print", 0x0A),
    ("SysReq", 0x0B),
    ("Clear", 0x0C),
    ("Home", 0x0D),
    ("End", 0x0E),
    ("Left", 0x0F),
    ("Up", 0x10),
    ("Right", 0x11),
    ("Down", 0x12),
    ("PageUp", 0x13),
    ("PageDown", 0x14),
    ("Shift", 0x15),
    ("Control", 0x16),
    ("Meta", 0x17),
    ("Alt", 0x18),
    ("CapsLock", 0x19),
    ("NumLock", 0x1A),
    ("ScrollLock", 0x1B),
];

/// Letters, digits, `Space` and the named special keys, matched without
/// regard to case.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardKeycodes;

impl KeycodeLookup for StandardKeycodes {
    fn lookup(&self, name: &str) -> Option<i64> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphanumeric() {
                return Some(c.to_ascii_uppercase() as i64);
            }
        }
        if name.eq_ignore_ascii_case("Space") {
            return Some(0x20);
        }
        if let Some(n) = name
            .strip_prefix('F')
            .or_else(|| name.strip_prefix('f'))
            .and_then(|n| n.parse::<i64>().ok())
        {
            if (1..=16).contains(&n) {
                return Some(SPECIAL_KEY | (0x1B + n));
            }
        }
        SPECIAL_KEYS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, code)| SPECIAL_KEY | code)
    }
}
