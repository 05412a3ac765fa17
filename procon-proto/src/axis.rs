//! Analog stick axis packing.
//!
//! The controller reports each stick as two 12-bit values packed into three
//! bytes with the middle byte shared between both axes:
//!
//! ```text
//! byte0 = x[7:0]
//! byte1 = y[3:0] << 4 | x[11:8]
//! byte2 = y[11:4]
//! ```

/// Largest value a 12-bit axis can hold.
pub const AXIS_MAX: u16 = 0x0FFF;

/// Resting position of an axis.
pub const AXIS_NEUTRAL: u16 = 2047;

/// Wire form of a centred stick.
pub const NEUTRAL_STICK: [u8; 3] = [0xFF, 0xF7, 0x7F];

/// Pack two 12-bit axis values into the 3-byte wire form.
///
/// Bits above the low 12 of either input are discarded.
#[inline]
#[must_use]
pub const fn encode(x: u16, y: u16) -> [u8; 3] {
    [
        (x & 0xFF) as u8,
        (((x >> 8) & 0x0F) | ((y & 0x0F) << 4)) as u8,
        ((y >> 4) & 0xFF) as u8,
    ]
}

/// Unpack the 3-byte wire form into `(x, y)`.
#[inline]
#[must_use]
pub const fn decode(bytes: [u8; 3]) -> (u16, u16) {
    let x = bytes[0] as u16 | ((bytes[1] as u16 & 0x0F) << 8);
    let y = (bytes[1] as u16 >> 4) | ((bytes[2] as u16) << 4);
    (x, y)
}
