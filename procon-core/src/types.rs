//! Controller state: Buttons, StickPosition, PointerPosition, ControllerState.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use fixed::types::I48F16;
use procon_proto::axis::{self, AXIS_MAX, AXIS_NEUTRAL};

/// Button state as a 24-bit field, one bit per button.
///
/// Byte `i` of the wire form is bits `8i..8i+8`, so every constant is also a
/// (byte, bit) position in the standard input report.
///
/// # Example
///
/// ```
/// use procon_core::Buttons;
///
/// let buttons = Buttons::A | Buttons::ZL;
/// assert_eq!(buttons.to_bytes(), [0x08, 0x00, 0x80]);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u32);

impl Buttons {
    // Byte 0: right side
    pub const Y: Self = Self::at(0, 0);
    pub const X: Self = Self::at(0, 1);
    pub const B: Self = Self::at(0, 2);
    pub const A: Self = Self::at(0, 3);
    pub const SR_R: Self = Self::at(0, 4);
    pub const SL_R: Self = Self::at(0, 5);
    pub const R: Self = Self::at(0, 6);
    pub const ZR: Self = Self::at(0, 7);
    // Byte 1: shared
    pub const MINUS: Self = Self::at(1, 0);
    pub const PLUS: Self = Self::at(1, 1);
    pub const RSTICK: Self = Self::at(1, 2);
    pub const LSTICK: Self = Self::at(1, 3);
    pub const HOME: Self = Self::at(1, 4);
    pub const CAPTURE: Self = Self::at(1, 5);
    // Byte 2: left side
    pub const DOWN: Self = Self::at(2, 0);
    pub const UP: Self = Self::at(2, 1);
    pub const RIGHT: Self = Self::at(2, 2);
    pub const LEFT: Self = Self::at(2, 3);
    pub const SR_L: Self = Self::at(2, 4);
    pub const SL_L: Self = Self::at(2, 5);
    pub const L: Self = Self::at(2, 6);
    pub const ZL: Self = Self::at(2, 7);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// All 24 wire bits.
    pub const ALL: Self = Self(0x00FF_FFFF);

    /// Button at `bit` of wire byte `byte`.
    #[inline]
    #[must_use]
    pub const fn at(byte: u8, bit: u8) -> Self {
        Self(1 << (byte as u32 * 8 + bit as u32))
    }

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Take the bits under `mask` from `value` and keep the rest.
    ///
    /// This is how every input path writes buttons, so two sources that
    /// touch different bits never overwrite each other.
    #[inline]
    #[must_use]
    pub const fn merge(self, value: Buttons, mask: Buttons) -> Self {
        Self((self.0 & !mask.0) | (value.0 & mask.0))
    }

    /// Wire form, byte 0 first.
    #[inline]
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 3] {
        let [b0, b1, b2, _] = self.0.to_le_bytes();
        [b0, b1, b2]
    }

    /// Parse the wire form.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::ALL.0)
    }
}

/// Left stick position.
///
/// Axes are signed accumulators: key presses add and remove full
/// deflections, and opposing presses cancel. The value is clamped to the
/// 12-bit range only when encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StickPosition {
    pub x: i32,
    pub y: i32,
}

impl StickPosition {
    /// Centred stick.
    pub const NEUTRAL: Self = Self {
        x: AXIS_NEUTRAL as i32,
        y: AXIS_NEUTRAL as i32,
    };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Packed 3-byte wire form, each axis clamped to `[0, 4095]`.
    #[must_use]
    pub fn to_wire(self) -> [u8; 3] {
        axis::encode(clamp_axis(self.x), clamp_axis(self.y))
    }
}

impl Default for StickPosition {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[inline]
fn clamp_axis(value: i32) -> u16 {
    value.clamp(0, i32::from(AXIS_MAX)) as u16
}

/// Running pointer position, in scaled pointer units.
///
/// Only differences between snapshots are reported, so the origin is
/// arbitrary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerPosition {
    pub x: I48F16,
    pub y: I48F16,
}

impl PointerPosition {
    pub const ZERO: Self = Self {
        x: I48F16::ZERO,
        y: I48F16::ZERO,
    };
}

#[cfg(feature = "defmt")]
impl defmt::Format for PointerPosition {
    fn format(&self, f: defmt::Formatter) {
        // Raw bits, 16 fractional
        defmt::write!(
            f,
            "PointerPosition {{ x: {=i64}, y: {=i64} }}",
            self.x.to_bits(),
            self.y.to_bits()
        );
    }
}

/// Complete emulated controller state.
///
/// This is the snapshot the input context publishes and the transport
/// context reports; it is `Copy` so publishing never shares memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    pub buttons: Buttons,
    pub left_stick: StickPosition,
    pub pointer: PointerPosition,
}

impl ControllerState {
    /// Nothing pressed, stick centred, pointer at origin.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            left_stick: StickPosition::NEUTRAL,
            pointer: PointerPosition::ZERO,
        }
    }
}

/// One poll of directly wired buttons.
///
/// Only bits in `mask` are sampled; the rest belong to other sources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSample {
    pub value: Buttons,
    pub mask: Buttons,
}
