//! Fixed-size outbound frames.
//!
//! Every frame the controller sends is exactly [`FRAME_LEN`] bytes: a report
//! id, a second header byte (sub-id or rolling counter), then a payload that
//! is zero-padded to the end.

/// Length of every frame on the interrupt endpoints.
pub const FRAME_LEN: usize = 64;

/// Space left for payload after the two header bytes.
pub const MAX_PAYLOAD: usize = FRAME_LEN - 2;

/// Report id of a handshake reply.
pub const REPORT_HANDSHAKE_REPLY: u8 = 0x81;

/// Report id of a subcommand reply.
pub const REPORT_SUBCOMMAND_REPLY: u8 = 0x21;

/// Report id of the periodic standard input report.
pub const REPORT_STANDARD: u8 = 0x30;

/// Error type for frame encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The payload does not fit in the remaining frame space.
    PayloadTooLong {
        /// Bytes requested.
        len: usize,
        /// Bytes still available.
        available: usize,
    },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PayloadTooLong { len, available } => {
                write!(f, "payload of {len} bytes exceeds {available} available")
            }
        }
    }
}

/// A complete 64-byte outbound frame.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseFrame([u8; FRAME_LEN]);

impl ResponseFrame {
    /// Build a frame from its two header bytes and a payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::PayloadTooLong`] if `payload` exceeds
    /// [`MAX_PAYLOAD`].
    pub fn new(report_id: u8, header: u8, payload: &[u8]) -> Result<Self, EncodeError> {
        let mut writer = FrameWriter::new(report_id, header);
        writer.write_slice(payload)?;
        Ok(writer.finish())
    }

    /// Report id (byte 0).
    #[inline]
    #[must_use]
    pub const fn report_id(&self) -> u8 {
        self.0[0]
    }

    /// Raw frame bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Payload after the two header bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.0[2..]
    }
}

impl core::fmt::Debug for ResponseFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ResponseFrame({:02X} {:02X} ..)", self.0[0], self.0[1])
    }
}

impl AsRef<[u8]> for ResponseFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An inbound frame copied out of a transfer buffer.
///
/// Used where a host command has to outlive the buffer it arrived in, such as
/// a control-pipe SET_REPORT handed over to the task that answers commands.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundFrame {
    buf: [u8; FRAME_LEN],
    len: usize,
}

impl InboundFrame {
    /// Copy `data`, report id first.
    ///
    /// Returns `None` for an empty transfer or one longer than a frame.
    #[must_use]
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.is_empty() || data.len() > FRAME_LEN {
            return None;
        }
        let mut buf = [0u8; FRAME_LEN];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            buf,
            len: data.len(),
        })
    }

    /// Received bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Copy into a receive buffer, returning the number of bytes written.
    pub fn copy_to(&self, out: &mut [u8; FRAME_LEN]) -> usize {
        out[..self.len].copy_from_slice(self.as_slice());
        self.len
    }
}

/// Sequential writer that fills a frame after its header.
///
/// Unwritten bytes stay zero.
pub struct FrameWriter {
    buf: [u8; FRAME_LEN],
    pos: usize,
}

impl FrameWriter {
    /// Start a frame with the given header bytes.
    #[must_use]
    pub fn new(report_id: u8, header: u8) -> Self {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = report_id;
        buf[1] = header;
        Self { buf, pos: 2 }
    }

    /// Bytes still available.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        FRAME_LEN - self.pos
    }

    /// Append a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::PayloadTooLong`] if the frame is full.
    #[inline]
    pub fn write(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.write_slice(&[byte])
    }

    /// Append a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::PayloadTooLong`] if the slice does not fit.
    pub fn write_slice(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let available = self.remaining();
        if bytes.len() > available {
            return Err(EncodeError::PayloadTooLong {
                len: bytes.len(),
                available,
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Finish the frame.
    #[must_use]
    pub fn finish(self) -> ResponseFrame {
        ResponseFrame(self.buf)
    }
}
