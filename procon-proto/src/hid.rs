//! Boot-protocol keyboard and pointer reports.
//!
//! These are the raw reports an upstream keyboard or mouse produces. They
//! are parsed from bytes here so the relay link and tests can share one
//! definition; the firmware converts from its USB stack's own types.

/// Length of a boot keyboard report.
pub const KEY_REPORT_LEN: usize = 8;

/// Shortest pointer report: buttons, X, Y.
pub const POINTER_REPORT_MIN_LEN: usize = 3;

/// Longest pointer report handled: buttons, X, Y, wheel, pan.
pub const POINTER_REPORT_MAX_LEN: usize = 5;

/// Highest usage code that does not name a key (no event, rollover, POST
/// fail, undefined).
pub const LAST_RESERVED_KEYCODE: u8 = 0x03;

/// Primary pointer button bit.
pub const POINTER_BUTTON_PRIMARY: u8 = 0x01;
/// Secondary pointer button bit.
pub const POINTER_BUTTON_SECONDARY: u8 = 0x02;
/// Middle pointer button bit.
pub const POINTER_BUTTON_MIDDLE: u8 = 0x04;

/// Boot keyboard report: modifier byte and up to six held keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    /// Modifier bitmap.
    pub modifier: u8,
    /// Held key usage codes; unused slots are zero.
    pub keycodes: [u8; 6],
}

impl KeyReport {
    /// Report with the given keys held.
    #[must_use]
    pub fn with_keys(keys: &[u8]) -> Self {
        let mut keycodes = [0u8; 6];
        for (slot, &key) in keycodes.iter_mut().zip(keys) {
            *slot = key;
        }
        Self {
            modifier: 0,
            keycodes,
        }
    }

    /// Parse `[modifier][reserved][key0..key5]`.
    ///
    /// Returns `None` if fewer than [`KEY_REPORT_LEN`] bytes are given.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < KEY_REPORT_LEN {
            return None;
        }
        let mut keycodes = [0u8; 6];
        keycodes.copy_from_slice(&bytes[2..KEY_REPORT_LEN]);
        Some(Self {
            modifier: bytes[0],
            keycodes,
        })
    }

    /// Whether `keycode` is held in this report.
    #[inline]
    #[must_use]
    pub fn contains(&self, keycode: u8) -> bool {
        is_key(keycode) && self.keycodes.contains(&keycode)
    }

    /// Held keys, skipping empty and reserved slots.
    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.keycodes.iter().copied().filter(|&k| is_key(k))
    }
}

/// Boot pointer report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerReport {
    /// Button bitmap.
    pub buttons: u8,
    /// Relative X motion.
    pub x: i8,
    /// Relative Y motion.
    pub y: i8,
    /// Wheel motion, zero if absent.
    pub wheel: i8,
}

impl PointerReport {
    /// Parse `[buttons][x][y]` with an optional wheel byte.
    ///
    /// Returns `None` if fewer than [`POINTER_REPORT_MIN_LEN`] bytes are
    /// given.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < POINTER_REPORT_MIN_LEN {
            return None;
        }
        Some(Self {
            buttons: bytes[0],
            x: bytes[1] as i8,
            y: bytes[2] as i8,
            wheel: bytes.get(3).map_or(0, |&w| w as i8),
        })
    }
}

#[inline]
const fn is_key(keycode: u8) -> bool {
    keycode > LAST_RESERVED_KEYCODE
}

/// Unshifted ASCII character for a keyboard usage code.
///
/// Returns `None` for reserved codes and keys without a printable or
/// control character.
#[must_use]
pub const fn keycode_to_char(keycode: u8) -> Option<char> {
    let c = match keycode {
        0x04..=0x1D => (b'a' + (keycode - 0x04)) as char,
        0x1E..=0x26 => (b'1' + (keycode - 0x1E)) as char,
        0x27 => '0',
        0x28 => '\r',
        0x29 => '\x1b',
        0x2A => '\x08',
        0x2B => '\t',
        0x2C => ' ',
        0x2D => '-',
        0x2E => '=',
        0x2F => '[',
        0x30 => ']',
        0x31 => '\\',
        0x33 => ';',
        0x34 => '\'',
        0x35 => '`',
        0x36 => ',',
        0x37 => '.',
        0x38 => '/',
        _ => return None,
    };
    Some(c)
}

/// Usage code of an unshifted ASCII character, the inverse of
/// [`keycode_to_char`].
#[must_use]
pub fn char_to_keycode(c: char) -> Option<u8> {
    ((LAST_RESERVED_KEYCODE + 1)..=0x38).find(|&k| keycode_to_char(k) == Some(c))
}
