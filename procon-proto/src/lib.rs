//! Wire protocol of a Pro Controller emulated over USB.
//!
//! This crate holds everything that is pure byte layout:
//!
//! - **Axis codec**: [`axis::encode`] packs two 12-bit stick values into
//!   three bytes
//! - **Frames**: [`ResponseFrame`] is the fixed 64-byte outbound frame,
//!   [`FrameWriter`] fills one sequentially
//! - **Commands**: [`parse()`] turns an inbound frame into a typed
//!   [`Command`], validating length before any fixed-offset read
//! - **Replies**: builders for handshake, subcommand and SPI read replies
//! - **Calibration**: [`CalibrationStore`], the read-only virtual SPI flash
//! - **Reports**: [`StandardReport`], the periodic `0x30` input report
//! - **HID**: boot keyboard/pointer reports from the upstream device
//! - **Relay**: CRC-8 framed transport of HID reports over a UART
//!
//! # Handshake
//!
//! ```
//! use procon_proto::{parse, Command, Handshake};
//!
//! assert_eq!(parse(&[0x80, 0x02]), Ok(Command::Handshake(Handshake::Handshake)));
//! ```
//!
//! # Axis packing
//!
//! ```
//! assert_eq!(procon_proto::axis::encode(2047, 2047), [0xFF, 0xF7, 0x7F]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod axis;
pub mod calibration;
pub mod command;
pub mod crc;
pub mod frame;
pub mod hid;
pub mod relay;
pub mod reply;
pub mod report;

pub use calibration::{CalibrationBlob, CalibrationStore};
pub use command::{parse, Command, Handshake, ParseError, Subcommand};
pub use frame::{EncodeError, FrameWriter, InboundFrame, ResponseFrame, FRAME_LEN};
pub use hid::{keycode_to_char, KeyReport, PointerReport};
pub use relay::{RelayError, RelayMessage, RelayParser};
pub use report::{MotionBlock, StandardReport};
