//! Platform-agnostic Pro Controller emulation.
//!
//! This crate turns keyboard and pointer input into the state of an emulated
//! controller and answers the host's side of the protocol. It has no
//! platform dependencies and runs both on target and on host for testing.
//!
//! # Overview
//!
//! The emulator runs as two independent loops:
//!
//! - **Input side**: [`InputPipeline`] receives [`InputEvent`]s from an
//!   [`InputSource`], applies them through [`InputTranslator`] (key edges,
//!   pointer motion, button polls) and publishes [`ControllerState`]
//!   snapshots through a [`SnapshotSink`]
//! - **Transport side**: [`ProtocolEngine`] answers host commands with
//!   [`CommandDispatcher`] and, once the handshake enables streaming, sends
//!   a standard report built by [`ReportEncoder`] from the latest snapshot
//!   every tick
//!
//! The two sides share nothing but copied snapshots, so they can run on
//! different cores.
//!
//! # Example
//!
//! ```rust
//! use procon_core::{CommandDispatcher, DispatcherState};
//!
//! let mut dispatcher = CommandDispatcher::default();
//! let reply = dispatcher.handle_command(&[0x80, 0x02], 0).unwrap();
//! assert_eq!(&reply.as_bytes()[..3], &[0x81, 0x02, 0x00]);
//! assert_eq!(dispatcher.state(), DispatcherState::HandshakeAcked);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log and format through defmt (for embedded logging)
//! - **`log`**: Log through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod binding;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod engine;
pub mod input;
pub mod keyboard;
pub mod pipeline;
pub mod pointer;
pub mod translator;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use binding::{lookup, BindingTarget, Direction, KeyBinding, DEFAULT_BINDINGS};
pub use clock::{Clock, TickGate};
pub use config::{
    EngineConfig, PointerConfig, TranslatorConfig, DEFAULT_ENGINE, DEFAULT_POINTER,
    DEFAULT_TRANSLATOR,
};
pub use dispatcher::{CommandDispatcher, DispatcherState, UnknownAddressPolicy};
pub use encoder::{ReportEncoder, SequenceCounter};
pub use engine::{EngineError, ProtocolEngine};
pub use input::{InputError, InputSource, SnapshotSink, SnapshotSource};
pub use keyboard::{EdgeCount, KeyEdgeTranslator};
pub use pipeline::InputPipeline;
pub use pointer::PointerTranslator;
pub use translator::{InputEvent, InputTranslator};
pub use transport::{Transport, TransportError};
pub use types::{ButtonSample, Buttons, ControllerState, PointerPosition, StickPosition};
