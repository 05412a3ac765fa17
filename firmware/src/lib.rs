//! Keyboard and mouse to Switch Pro Controller emulator for RP2040.
//!
//! This crate provides the embedded shell around [`procon_core`]: the USB
//! HID transport the console talks to, the input sources feeding the
//! emulated controller, and the cross-core snapshot hand-off.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Enumerates as a wired Pro Controller (VID 0x057E, PID 0x2009)
//! 2. Answers the console's handshake and subcommands
//! 3. Streams a standard input report every 30 ms once the console asks
//!    for it, built from the latest keyboard/mouse state
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Serial transmit (unused) |
//! | UART1 RX | 9    | Relay input (`input-relay`) |
//! | Buttons  | 2-7, 10, 11 | Push buttons to ground (`input-buttons`) |
//! | LED      | 25   | On-board LED (input error indicator) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime on both cores:
//!
//! - **Core 0, USB Task**: Manages the USB device stack
//! - **Core 0, Engine Task**: Runs [`ProtocolEngine`], the only writer on
//!   the HID endpoint
//! - **Core 1, Input Task**: Runs [`InputPipeline`] over the selected input
//!   source and publishes controller snapshots
//!
//! Snapshots cross cores through an Embassy
//! [`Signal`](embassy_sync::signal::Signal) with "latest value wins"
//! semantics; see [`snapshot`].
//!
//! # Modules
//!
//! - [`usb_transport`]: USB HID transport ([`UsbTransport`])
//! - [`input`]: input sources for each strategy
//! - [`snapshot`]: Signal-backed [`SnapshotSink`] / [`SnapshotSource`]
//! - [`clock`]: [`EmbassyClock`]
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`input-relay`** (default): Keyboard/mouse reports relayed over UART1
//! - **`input-buttons`**: Push buttons wired to GPIO

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

#[cfg(all(feature = "input-relay", feature = "input-buttons"))]
compile_error!("Cannot enable both `input-relay` and `input-buttons` features - select a single input strategy");

#[cfg(not(any(feature = "input-relay", feature = "input-buttons")))]
compile_error!("Enable one input strategy: `input-relay` or `input-buttons`");

// Re-export core types for convenience
pub use procon_core::{
    ControllerState, EngineConfig, InputError, InputPipeline, InputSource, InputTranslator,
    ProtocolEngine, SnapshotSink, SnapshotSource, Transport, TransportError, TranslatorConfig,
};

pub mod clock;
pub mod input;
pub mod snapshot;
pub mod usb_transport;

pub use clock::EmbassyClock;
pub use snapshot::{SignalSink, SignalSource, SnapshotSignal};
pub use usb_transport::{
    configure_usb_hid, usb_config, ProconRequestHandler, UsbStateHandler, UsbTransport,
};

#[cfg(feature = "input-relay")]
pub use input::RelayInputSource;

#[cfg(feature = "input-buttons")]
pub use input::{ButtonInputSource, ButtonPin};
