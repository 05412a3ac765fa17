//! Cross-core snapshot hand-off over an embassy [`Signal`].
//!
//! Signal gives "latest value wins" semantics: the engine only ever needs
//! the most recent controller state, so a publish overwrites any snapshot
//! the engine has not taken yet.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use procon_core::{ControllerState, SnapshotSink, SnapshotSource};

/// Signal shared between the input core and the engine.
///
/// `CriticalSectionRawMutex` is backed by a hardware spinlock on the RP2040,
/// so it is safe to share between the two cores.
pub type SnapshotSignal = Signal<CriticalSectionRawMutex, ControllerState>;

/// Publishing end, owned by the input pipeline.
#[derive(Clone, Copy)]
pub struct SignalSink<'a> {
    signal: &'a SnapshotSignal,
}

impl<'a> SignalSink<'a> {
    #[must_use]
    pub const fn new(signal: &'a SnapshotSignal) -> Self {
        Self { signal }
    }
}

impl SnapshotSink for SignalSink<'_> {
    fn publish(&mut self, snapshot: ControllerState) {
        self.signal.signal(snapshot);
    }
}

/// Reading end, owned by the protocol engine.
#[derive(Clone, Copy)]
pub struct SignalSource<'a> {
    signal: &'a SnapshotSignal,
}

impl<'a> SignalSource<'a> {
    #[must_use]
    pub const fn new(signal: &'a SnapshotSignal) -> Self {
        Self { signal }
    }
}

impl SnapshotSource for SignalSource<'_> {
    fn try_take(&mut self) -> Option<ControllerState> {
        self.signal.try_take()
    }
}
