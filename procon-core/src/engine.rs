//! ProtocolEngine: the transport side of the emulator.

use embassy_futures::select::{select, Either};
use procon_proto::{EncodeError, ResponseFrame, FRAME_LEN};

use crate::clock::{Clock, TickGate};
use crate::config::EngineConfig;
use crate::dispatcher::{CommandDispatcher, DispatcherState};
use crate::encoder::ReportEncoder;
use crate::input::SnapshotSource;
use crate::transport::{Transport, TransportError};
use crate::types::ControllerState;

/// Error type for engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Error from the transport.
    Transport(TransportError),
    /// A frame could not be built.
    Encode(EncodeError),
}

impl From<TransportError> for EngineError {
    fn from(err: TransportError) -> Self {
        EngineError::Transport(err)
    }
}

impl From<EncodeError> for EngineError {
    fn from(err: EncodeError) -> Self {
        EngineError::Encode(err)
    }
}

/// Answers host commands and emits the periodic standard report.
///
/// The engine is the only writer on the transport. Command replies and
/// reports are sent from the same task and each send completes before the
/// next frame is built, so frames never interleave.
pub struct ProtocolEngine<T, C, S> {
    transport: T,
    clock: C,
    snapshots: S,
    dispatcher: CommandDispatcher,
    encoder: ReportEncoder,
    gate: TickGate,
    snapshot: ControllerState,
    was_ready: bool,
}

impl<T: Transport, C: Clock, S: SnapshotSource> ProtocolEngine<T, C, S> {
    /// Create an engine; the first tick is one period from now.
    pub fn new(transport: T, clock: C, snapshots: S, config: &EngineConfig) -> Self {
        let gate = TickGate::new(config.tick_period_ms, clock.now_ms());
        Self {
            transport,
            clock,
            snapshots,
            dispatcher: CommandDispatcher::new(config.calibration, config.unknown_address),
            encoder: ReportEncoder::new(),
            gate,
            snapshot: ControllerState::neutral(),
            was_ready: false,
        }
    }

    /// Run the engine indefinitely.
    ///
    /// Transport errors are logged and never end the loop.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.step().await {
                error!("engine error: {:?}", e);
            }
        }
    }

    /// Wait for an inbound frame or the next tick, whichever comes first,
    /// and handle it.
    pub async fn step(&mut self) -> Result<(), EngineError> {
        let mut buf = [0u8; FRAME_LEN];
        let deadline = self.gate.deadline();
        let received = match select(
            self.transport.receive(&mut buf),
            self.clock.wait_until(deadline),
        )
        .await
        {
            Either::First(result) => Some(result),
            Either::Second(()) => None,
        };

        if let Some(result) = received {
            match result {
                Ok(len) => {
                    self.handle_frame(&buf[..len.min(FRAME_LEN)]).await?;
                }
                Err(e) => {
                    self.on_transport_error(e);
                    return Err(e.into());
                }
            }
        }

        self.poll_tick().await?;
        Ok(())
    }

    /// Handle one inbound frame, sending the response if there is one.
    ///
    /// Returns whether a response was sent.
    pub async fn handle_frame(&mut self, frame: &[u8]) -> Result<bool, EngineError> {
        let counter = self.encoder.counter();
        match self.dispatcher.handle_command(frame, counter) {
            Some(response) => {
                self.send(&response).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Emit a standard report if a tick is due.
    ///
    /// Every due tick advances the counter; a report is only built while
    /// streaming and the transport is ready. Returns whether a report was
    /// sent.
    ///
    /// A transport that stops being ready counts as a disconnect: the
    /// handshake starts over and [`TransportError::Disconnected`] is
    /// returned.
    pub async fn poll_tick(&mut self) -> Result<bool, EngineError> {
        let ready = self.transport.is_ready();
        if self.was_ready && !ready {
            self.was_ready = false;
            self.on_transport_error(TransportError::Disconnected);
            return Err(TransportError::Disconnected.into());
        }
        self.was_ready = ready;

        if !self.gate.poll(self.clock.now_ms()) {
            return Ok(false);
        }
        self.encoder.tick();
        if let Some(snapshot) = self.snapshots.try_take() {
            self.snapshot = snapshot;
        }

        if !self.dispatcher.is_streaming() || !ready {
            self.encoder.skip(&self.snapshot);
            return Ok(false);
        }

        let report = self.encoder.encode(&self.snapshot)?;
        self.send(&report).await?;
        Ok(true)
    }

    async fn send(&mut self, frame: &ResponseFrame) -> Result<(), EngineError> {
        trace!("send {:?}", frame);
        if let Err(e) = self.transport.send(frame).await {
            self.on_transport_error(e);
            return Err(e.into());
        }
        Ok(())
    }

    fn on_transport_error(&mut self, e: TransportError) {
        if e == TransportError::Disconnected {
            self.dispatcher.reset();
        }
    }

    /// Dispatcher state.
    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Get a mutable reference to the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Get a mutable reference to the snapshot source.
    pub fn snapshots_mut(&mut self) -> &mut S {
        &mut self.snapshots
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::DEFAULT_ENGINE;
    use crate::types::Buttons;
    use embassy_futures::block_on;
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockTransport {
        inbound: VecDeque<Vec<u8>>,
        sent: Vec<[u8; FRAME_LEN]>,
        fail_next: Option<TransportError>,
        not_ready: bool,
    }

    impl Transport for MockTransport {
        async fn send(&mut self, frame: &ResponseFrame) -> Result<(), TransportError> {
            if let Some(e) = self.fail_next.take() {
                return Err(e);
            }
            self.sent.push(*frame.as_bytes());
            Ok(())
        }

        async fn receive(&mut self, buf: &mut [u8; FRAME_LEN]) -> Result<usize, TransportError> {
            match self.inbound.pop_front() {
                Some(frame) => {
                    buf[..frame.len()].copy_from_slice(&frame);
                    Ok(frame.len())
                }
                None => core::future::pending().await,
            }
        }

        fn is_ready(&self) -> bool {
            !self.not_ready
        }
    }

    struct MockClock {
        now: u64,
    }

    impl Clock for MockClock {
        fn now_ms(&self) -> u64 {
            self.now
        }

        async fn wait_until(&mut self, deadline_ms: u64) {
            self.now = self.now.max(deadline_ms);
        }
    }

    #[derive(Default)]
    struct MockSnapshots {
        next: Option<ControllerState>,
    }

    impl SnapshotSource for MockSnapshots {
        fn try_take(&mut self) -> Option<ControllerState> {
            self.next.take()
        }
    }

    type Engine = ProtocolEngine<MockTransport, MockClock, MockSnapshots>;

    fn engine() -> Engine {
        ProtocolEngine::new(
            MockTransport::default(),
            MockClock { now: 0 },
            MockSnapshots::default(),
            &DEFAULT_ENGINE,
        )
    }

    #[test]
    fn test_handshake_then_neutral_report() {
        let mut engine = engine();
        assert_eq!(engine.state(), DispatcherState::Init);

        assert!(block_on(engine.handle_frame(&[0x80, 0x02])).unwrap());
        assert_eq!(&engine.transport().sent[0][..3], &[0x81, 0x02, 0x00]);

        assert!(!block_on(engine.handle_frame(&[0x80, 0x04])).unwrap());
        assert_eq!(engine.state(), DispatcherState::Streaming);
        assert_eq!(engine.transport().sent.len(), 1);

        engine.clock_mut().now = 30;
        assert!(block_on(engine.poll_tick()).unwrap());
        let report = engine.transport().sent[1];
        assert_eq!(report[0], 0x30);
        assert_eq!(report[1], 3);
        assert_eq!(&report[6..9], &[0xFF, 0xF7, 0x7F]);
    }

    #[test]
    fn test_no_report_before_streaming() {
        let mut engine = engine();
        engine.clock_mut().now = 30;
        assert!(!block_on(engine.poll_tick()).unwrap());
        assert!(engine.transport().sent.is_empty());

        // Counter still advanced
        block_on(engine.handle_frame(&[0x80, 0x04])).unwrap();
        engine.clock_mut().now = 60;
        assert!(block_on(engine.poll_tick()).unwrap());
        assert_eq!(engine.transport().sent[0][1], 6);
    }

    #[test]
    fn test_no_report_between_ticks() {
        let mut engine = engine();
        block_on(engine.handle_frame(&[0x80, 0x04])).unwrap();
        engine.clock_mut().now = 29;
        assert!(!block_on(engine.poll_tick()).unwrap());
        assert!(engine.transport().sent.is_empty());
    }

    #[test]
    fn test_report_uses_latest_snapshot() {
        let mut engine = engine();
        block_on(engine.handle_frame(&[0x80, 0x04])).unwrap();
        engine.snapshots_mut().next = Some(ControllerState {
            buttons: Buttons::A,
            ..ControllerState::neutral()
        });
        engine.clock_mut().now = 30;
        block_on(engine.poll_tick()).unwrap();
        // Snapshot taken; the next report repeats it
        engine.clock_mut().now = 60;
        block_on(engine.poll_tick()).unwrap();

        let sent = &engine.transport().sent;
        assert_eq!(sent[0][3], 0x08);
        assert_eq!(sent[1][3], 0x08);
    }

    #[test]
    fn test_subcommand_reply_carries_counter() {
        let mut engine = engine();
        engine.clock_mut().now = 30;
        block_on(engine.poll_tick()).unwrap();

        let mut frame = [0u8; 64];
        frame[0] = 0x01;
        frame[10] = 0x02;
        block_on(engine.handle_frame(&frame)).unwrap();
        let reply = engine.transport().sent[0];
        assert_eq!(&reply[..2], &[0x21, 0x03]);
    }

    #[test]
    fn test_step_handles_frame_then_tick() {
        let mut engine = engine();
        engine
            .transport_mut()
            .inbound
            .extend([std::vec![0x80, 0x02], std::vec![0x80, 0x04]]);

        block_on(engine.step()).unwrap();
        block_on(engine.step()).unwrap();
        assert_eq!(engine.state(), DispatcherState::Streaming);
        assert_eq!(engine.transport().sent.len(), 1);

        // Nothing inbound: waits for the tick deadline
        block_on(engine.step()).unwrap();
        let sent = &engine.transport().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1][0], 0x30);
    }

    #[test]
    fn test_send_failure_is_reported() {
        let mut engine = engine();
        engine.transport_mut().fail_next = Some(TransportError::Io);
        let result = block_on(engine.handle_frame(&[0x80, 0x02]));
        assert_eq!(result, Err(EngineError::Transport(TransportError::Io)));

        // Not fatal: the next frame goes out
        assert!(block_on(engine.handle_frame(&[0x80, 0x02])).unwrap());
    }

    #[test]
    fn test_disconnect_resets_handshake() {
        let mut engine = engine();
        block_on(engine.handle_frame(&[0x80, 0x04])).unwrap();
        engine.transport_mut().fail_next = Some(TransportError::Disconnected);
        block_on(engine.handle_frame(&[0x80, 0x01])).unwrap_err();
        assert_eq!(engine.state(), DispatcherState::Init);
    }

    #[test]
    fn test_transport_losing_readiness_resets_handshake() {
        let mut engine = engine();
        block_on(engine.handle_frame(&[0x80, 0x04])).unwrap();
        engine.clock_mut().now = 30;
        assert!(block_on(engine.poll_tick()).unwrap());

        engine.transport_mut().not_ready = true;
        let result = block_on(engine.poll_tick());
        assert_eq!(result, Err(EngineError::Transport(TransportError::Disconnected)));
        assert_eq!(engine.state(), DispatcherState::Init);

        // Reported once; later ticks are skipped quietly
        engine.clock_mut().now = 60;
        assert!(!block_on(engine.poll_tick()).unwrap());
        assert_eq!(engine.transport().sent.len(), 1);
    }

    #[test]
    fn test_transport_never_ready_is_not_a_disconnect() {
        let mut engine = engine();
        engine.transport_mut().not_ready = true;
        engine.clock_mut().now = 30;
        assert!(!block_on(engine.poll_tick()).unwrap());
        assert_eq!(engine.state(), DispatcherState::Init);
    }
}
