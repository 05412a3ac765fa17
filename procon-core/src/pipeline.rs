//! InputPipeline: connects an input source to the snapshot hand-off.

use crate::input::{InputError, InputSource, SnapshotSink};
use crate::translator::InputTranslator;

/// Runs the input side: receive an event, translate it, publish the
/// resulting snapshot.
///
/// # Error Handling
///
/// On input errors, the pipeline releases everything and publishes the
/// neutral state to prevent stale inputs from persisting. The same happens
/// when the source stops reporting itself as connected.
pub struct InputPipeline<I, P> {
    input: I,
    sink: P,
    translator: InputTranslator,
    connected: bool,
}

impl<I: InputSource, P: SnapshotSink> InputPipeline<I, P> {
    pub fn new(input: I, sink: P, translator: InputTranslator) -> Self {
        let connected = input.is_connected();
        Self {
            input,
            sink,
            translator,
            connected,
        }
    }

    /// Run the pipeline indefinitely.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.process_one().await {
                warn!("input error: {:?}", e);
            }
        }
    }

    /// Process a single input event.
    ///
    /// Returns the result of the operation for testing purposes.
    pub async fn process_one(&mut self) -> Result<(), InputError> {
        match self.input.receive().await {
            Ok(event) => {
                let snapshot = self.translator.apply(&event);
                self.sink.publish(snapshot);
                if self.track_connection() {
                    let neutral = self.translator.release_all();
                    self.sink.publish(neutral);
                }
                Ok(())
            }
            Err(e) => {
                self.track_connection();
                let neutral = self.translator.release_all();
                self.sink.publish(neutral);
                Err(e)
            }
        }
    }

    /// Follow the source's connection state. Returns `true` when the link
    /// has just been lost.
    fn track_connection(&mut self) -> bool {
        let connected = self.input.is_connected();
        if connected == self.connected {
            return false;
        }
        self.connected = connected;
        if connected {
            info!("input connected");
            false
        } else {
            info!("input disconnected");
            true
        }
    }

    /// Whether the source reported itself connected after the last event.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Get a reference to the input source.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Get a reference to the snapshot sink.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Get a reference to the translator.
    pub fn translator(&self) -> &InputTranslator {
        &self.translator
    }
}
