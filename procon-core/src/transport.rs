//! Transport trait and error types.

use core::future::Future;

use procon_proto::{ResponseFrame, FRAME_LEN};

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not configured).
    NotReady,
    /// Host went away; the handshake must start over.
    Disconnected,
    /// Endpoint busy.
    Busy,
}

/// Async trait for the host link.
///
/// Frames go out one at a time: `send` resolves only once the frame has
/// been handed to the endpoint, and callers never start a second send
/// before the first resolves.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait Transport {
    /// Send one 64-byte frame.
    fn send(&mut self, frame: &ResponseFrame) -> impl Future<Output = Result<(), TransportError>>;

    /// Wait for the next inbound frame and return the number of bytes
    /// received.
    fn receive(
        &mut self,
        buf: &mut [u8; FRAME_LEN],
    ) -> impl Future<Output = Result<usize, TransportError>>;

    /// Check if the link can carry frames.
    fn is_ready(&self) -> bool;
}
