//! Input source implementations for the supported input strategies.
//!
//! Each strategy is conditionally compiled based on Cargo features:
//! - `input-relay`: keyboard/mouse reports relayed over UART (default)
//! - `input-buttons`: push buttons on GPIO

#[cfg(feature = "input-relay")]
pub mod relay;

#[cfg(feature = "input-buttons")]
pub mod buttons;

#[cfg(feature = "input-relay")]
pub use relay::RelayInputSource;

#[cfg(feature = "input-buttons")]
pub use buttons::{ButtonInputSource, ButtonPin};
