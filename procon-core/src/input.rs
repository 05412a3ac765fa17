//! Input source trait, snapshot hand-off traits and error types.

use core::future::Future;

use procon_proto::RelayError;

use crate::translator::InputEvent;
use crate::types::ControllerState;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// Malformed relay frame.
    Framing,
    /// Checksum mismatch.
    Checksum,
    /// Upstream device lost.
    Disconnected,
    /// Receive buffer overrun.
    BufferOverflow,
}

impl From<RelayError> for InputError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Checksum { .. } => InputError::Checksum,
            RelayError::BufferTooSmall => InputError::BufferOverflow,
            RelayError::UnknownKind(_) | RelayError::BadLength { .. } => InputError::Framing,
        }
    }
}

/// Async trait for upstream input devices.
///
/// Implementations deliver raw keyboard/pointer reports or button polls;
/// translation into controller state happens in the core.
pub trait InputSource {
    /// Wait for and receive the next input event.
    fn receive(&mut self) -> impl Future<Output = Result<InputEvent, InputError>>;

    /// Check if the input device is connected.
    fn is_connected(&self) -> bool;
}

/// Publishing end of the snapshot hand-off between execution contexts.
///
/// Only the latest snapshot matters: publishing replaces any snapshot the
/// reader has not taken yet.
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: ControllerState);
}

/// Reading end of the snapshot hand-off.
pub trait SnapshotSource {
    /// Take the snapshot published since the last call, if any.
    fn try_take(&mut self) -> Option<ControllerState>;
}
