//! UART relay framing for keyboard and pointer reports.
//!
//! A companion USB host forwards raw boot-protocol reports over a serial
//! link:
//!
//! ```text
//! [0xA5][kind][len][payload..len][crc8]
//! ```
//!
//! `kind` is [`KIND_KEYBOARD`] (8-byte payload) or [`KIND_POINTER`]
//! (3 to 5 bytes). The CRC-8/SMBUS covers `kind`, `len` and the payload.
//! [`RelayParser`] takes one byte at a time and resynchronises on the next
//! sync byte after any error.

use heapless::Vec;

use crate::crc::{frame_checksum, Crc8Digest};
use crate::hid::{
    KeyReport, PointerReport, KEY_REPORT_LEN, POINTER_REPORT_MAX_LEN, POINTER_REPORT_MIN_LEN,
};

/// Frame start byte.
pub const SYNC: u8 = 0xA5;

/// Keyboard report frame.
pub const KIND_KEYBOARD: u8 = 0x01;

/// Pointer report frame.
pub const KIND_POINTER: u8 = 0x02;

/// Largest payload of any frame kind.
pub const MAX_PAYLOAD: usize = KEY_REPORT_LEN;

/// Largest encoded frame.
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD + 4;

/// A decoded relay frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayMessage {
    /// Keyboard report.
    Keyboard(KeyReport),
    /// Pointer report.
    Pointer(PointerReport),
}

/// Relay framing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError {
    /// Kind byte is not a known frame kind.
    UnknownKind(u8),
    /// Length byte is out of range for the kind.
    BadLength {
        /// Frame kind.
        kind: u8,
        /// Length received.
        len: u8,
    },
    /// Checksum mismatch.
    Checksum {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte received.
        actual: u8,
    },
    /// Output buffer too small.
    BufferTooSmall,
}

impl core::fmt::Display for RelayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownKind(kind) => write!(f, "unknown frame kind {kind:#04x}"),
            Self::BadLength { kind, len } => {
                write!(f, "length {len} invalid for frame kind {kind:#04x}")
            }
            Self::Checksum { expected, actual } => {
                write!(f, "checksum mismatch: expected {expected:#04x}, got {actual:#04x}")
            }
            Self::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

fn length_valid(kind: u8, len: usize) -> bool {
    match kind {
        KIND_KEYBOARD => len == KEY_REPORT_LEN,
        KIND_POINTER => (POINTER_REPORT_MIN_LEN..=POINTER_REPORT_MAX_LEN).contains(&len),
        _ => false,
    }
}

/// Encode a frame into `buf`, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`RelayError::UnknownKind`] or [`RelayError::BadLength`] for a
/// frame the parser would reject, or [`RelayError::BufferTooSmall`].
pub fn encode(kind: u8, payload: &[u8], buf: &mut [u8]) -> Result<usize, RelayError> {
    if kind != KIND_KEYBOARD && kind != KIND_POINTER {
        return Err(RelayError::UnknownKind(kind));
    }
    if !length_valid(kind, payload.len()) {
        return Err(RelayError::BadLength {
            kind,
            len: payload.len() as u8,
        });
    }
    let total = payload.len() + 4;
    if buf.len() < total {
        return Err(RelayError::BufferTooSmall);
    }
    buf[0] = SYNC;
    buf[1] = kind;
    buf[2] = payload.len() as u8;
    buf[3..3 + payload.len()].copy_from_slice(payload);
    buf[total - 1] = frame_checksum(kind, payload);
    Ok(total)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParserState {
    WaitingForSync,
    ReadingKind,
    ReadingLength { kind: u8 },
    ReadingPayload { kind: u8, len: usize },
    ReadingChecksum { kind: u8 },
}

/// Byte-at-a-time relay frame parser.
pub struct RelayParser {
    payload: Vec<u8, MAX_PAYLOAD>,
    digest: Crc8Digest,
    state: ParserState,
}

impl RelayParser {
    /// Create a parser waiting for a sync byte.
    #[must_use]
    pub fn new() -> Self {
        Self {
            payload: Vec::new(),
            digest: Crc8Digest::new(),
            state: ParserState::WaitingForSync,
        }
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.payload.clear();
        self.digest = Crc8Digest::new();
        self.state = ParserState::WaitingForSync;
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(message))` when a frame completes. Bytes outside a
    /// frame are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] when a frame is rejected; the parser is
    /// already reset and waiting for the next sync byte. A rejected header
    /// byte that is itself a sync byte starts the next frame.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<RelayMessage>, RelayError> {
        match self.state {
            ParserState::WaitingForSync => {
                if byte == SYNC {
                    self.state = ParserState::ReadingKind;
                }
                Ok(None)
            }
            ParserState::ReadingKind => {
                if byte == SYNC {
                    // The previous sync byte was noise; this one opens the frame
                    return Ok(None);
                }
                if byte != KIND_KEYBOARD && byte != KIND_POINTER {
                    self.reset();
                    return Err(RelayError::UnknownKind(byte));
                }
                self.digest.update(byte);
                self.state = ParserState::ReadingLength { kind: byte };
                Ok(None)
            }
            ParserState::ReadingLength { kind } => {
                let len = byte as usize;
                if !length_valid(kind, len) {
                    self.reset();
                    if byte == SYNC {
                        self.state = ParserState::ReadingKind;
                    }
                    return Err(RelayError::BadLength { kind, len: byte });
                }
                self.digest.update(byte);
                self.state = ParserState::ReadingPayload { kind, len };
                Ok(None)
            }
            ParserState::ReadingPayload { kind, len } => {
                // Capacity is MAX_PAYLOAD and len was checked against it
                let _ = self.payload.push(byte);
                self.digest.update(byte);
                if self.payload.len() >= len {
                    self.state = ParserState::ReadingChecksum { kind };
                }
                Ok(None)
            }
            ParserState::ReadingChecksum { kind } => {
                let digest = core::mem::take(&mut self.digest);
                let expected = digest.finalize();
                let result = if expected == byte {
                    Ok(self.decode(kind))
                } else {
                    Err(RelayError::Checksum {
                        expected,
                        actual: byte,
                    })
                };
                self.reset();
                result
            }
        }
    }

    fn decode(&self, kind: u8) -> Option<RelayMessage> {
        match kind {
            KIND_KEYBOARD => KeyReport::from_bytes(&self.payload).map(RelayMessage::Keyboard),
            KIND_POINTER => PointerReport::from_bytes(&self.payload).map(RelayMessage::Pointer),
            _ => None,
        }
    }
}

impl Default for RelayParser {
    fn default() -> Self {
        Self::new()
    }
}
