//! CRC-8 checksum for relay frames.
//!
//! Uses CRC-8/SMBUS with a 256-byte lookup table. The relay parser feeds
//! bytes one at a time as they arrive from the UART, so the digest form is
//! the one used on the receive path.

use crc::{Crc, CRC_8_SMBUS};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// CRC-8 of a complete byte slice.
#[inline]
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// Checksum of a relay frame body: kind, length, then payload.
#[must_use]
pub fn frame_checksum(kind: u8, payload: &[u8]) -> u8 {
    let mut digest = Crc8Digest::new();
    digest.update(kind);
    // Payloads are bounded by the relay maximum, well under 256 bytes
    digest.update(payload.len() as u8);
    digest.update_slice(payload);
    digest.finalize()
}

/// Incremental CRC-8.
pub struct Crc8Digest {
    digest: crc::Digest<'static, u8>,
}

impl Crc8Digest {
    /// Start a new digest.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: CRC8.digest(),
        }
    }

    /// Feed one byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    /// Feed a slice.
    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Finish and return the checksum.
    #[inline]
    #[must_use]
    pub fn finalize(self) -> u8 {
        self.digest.finalize()
    }
}

impl Default for Crc8Digest {
    fn default() -> Self {
        Self::new()
    }
}
