//! Inbound command frame parsing.
//!
//! Host output reports are positional: the meaning of each byte depends on
//! the opcode in byte 0 and, for wrapped subcommands, the id at offset 10.
//! [`parse`] checks that every offset it reads is inside the received data
//! and returns a typed [`Command`] instead of letting dispatch read past the
//! end of a short frame.

/// Handshake/USB management opcode.
pub const OPCODE_HANDSHAKE: u8 = 0x80;
/// Rumble data followed by a subcommand.
pub const OPCODE_SUBCOMMAND: u8 = 0x01;
/// Rumble data only.
pub const OPCODE_RUMBLE: u8 = 0x10;

/// Offset of the subcommand id in an [`OPCODE_SUBCOMMAND`] frame.
pub const SUBCOMMAND_OFFSET: usize = 10;
/// Offset of the little-endian SPI address in a read request.
pub const SPI_ADDRESS_OFFSET: usize = 11;
/// Offset of the requested SPI read length.
pub const SPI_LENGTH_OFFSET: usize = 15;

/// Steps of the USB handshake (`0x80` opcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handshake {
    /// `0x01`: request controller type and MAC address.
    Status,
    /// `0x02`: handshake, acknowledged with an empty reply.
    Handshake,
    /// `0x03`: switch the UART link to high speed.
    HighSpeed,
    /// `0x04`: stop the handshake timeout and start streaming over USB.
    ForceUsb,
    /// Any other step.
    Unknown(u8),
}

impl From<u8> for Handshake {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Status,
            0x02 => Self::Handshake,
            0x03 => Self::HighSpeed,
            0x04 => Self::ForceUsb,
            other => Self::Unknown(other),
        }
    }
}

/// Wrapped subcommands (`0x01` opcode, id at offset 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subcommand {
    /// `0x01`: Bluetooth manual pairing.
    Pairing,
    /// `0x02`: request device info.
    DeviceInfo,
    /// `0x03`: set input report mode.
    SetInputMode,
    /// `0x04`: trigger buttons elapsed time.
    TriggerElapsed,
    /// `0x08`: set shipment low power state.
    SetShipmentMode,
    /// `0x10`: read from the SPI flash.
    SpiRead {
        /// Start address.
        address: u16,
        /// Requested length, when the frame was long enough to carry it.
        length: Option<u8>,
    },
    /// `0x21`: set NFC/IR MCU configuration.
    SetNfcIrConfig,
    /// `0x30`: set player lights.
    SetPlayerLights,
    /// `0x38`: set HOME light.
    SetHomeLight,
    /// `0x40`: enable the motion sensor.
    EnableImu,
    /// `0x48`: enable vibration.
    EnableVibration,
    /// Any other id.
    Unknown(u8),
}

impl Subcommand {
    /// Wire id of the subcommand.
    #[must_use]
    pub const fn id(&self) -> u8 {
        match self {
            Self::Pairing => 0x01,
            Self::DeviceInfo => 0x02,
            Self::SetInputMode => 0x03,
            Self::TriggerElapsed => 0x04,
            Self::SetShipmentMode => 0x08,
            Self::SpiRead { .. } => 0x10,
            Self::SetNfcIrConfig => 0x21,
            Self::SetPlayerLights => 0x30,
            Self::SetHomeLight => 0x38,
            Self::EnableImu => 0x40,
            Self::EnableVibration => 0x48,
            Self::Unknown(id) => *id,
        }
    }
}

/// A parsed inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// USB handshake step.
    Handshake(Handshake),
    /// Wrapped subcommand.
    Subcommand(Subcommand),
    /// Rumble-only output report.
    Rumble,
}

/// Error type for command parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// No bytes were received.
    Empty,
    /// The frame ends before an offset the opcode requires.
    Truncated {
        /// Opcode in byte 0.
        opcode: u8,
        /// Minimum length for this command.
        needed: usize,
        /// Bytes actually received.
        actual: usize,
    },
    /// Byte 0 is not a known opcode.
    UnknownOpcode(u8),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::Truncated {
                opcode,
                needed,
                actual,
            } => write!(
                f,
                "frame with opcode {opcode:#04x} needs {needed} bytes, got {actual}"
            ),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op:#04x}"),
        }
    }
}

/// Parse an inbound frame.
///
/// `frame` is the data actually received; trailing bytes beyond what the
/// command needs are ignored.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] for an empty frame,
/// [`ParseError::Truncated`] if the frame is shorter than the command
/// layout, or [`ParseError::UnknownOpcode`].
pub fn parse(frame: &[u8]) -> Result<Command, ParseError> {
    let opcode = *frame.first().ok_or(ParseError::Empty)?;

    match opcode {
        OPCODE_HANDSHAKE => {
            require(frame, opcode, 2)?;
            Ok(Command::Handshake(Handshake::from(frame[1])))
        }
        OPCODE_SUBCOMMAND => {
            require(frame, opcode, SUBCOMMAND_OFFSET + 1)?;
            parse_subcommand(frame).map(Command::Subcommand)
        }
        OPCODE_RUMBLE => Ok(Command::Rumble),
        other => Err(ParseError::UnknownOpcode(other)),
    }
}

fn parse_subcommand(frame: &[u8]) -> Result<Subcommand, ParseError> {
    Ok(match frame[SUBCOMMAND_OFFSET] {
        0x01 => Subcommand::Pairing,
        0x02 => Subcommand::DeviceInfo,
        0x03 => Subcommand::SetInputMode,
        0x04 => Subcommand::TriggerElapsed,
        0x08 => Subcommand::SetShipmentMode,
        0x10 => {
            require(frame, OPCODE_SUBCOMMAND, SPI_ADDRESS_OFFSET + 2)?;
            Subcommand::SpiRead {
                address: u16::from_le_bytes([
                    frame[SPI_ADDRESS_OFFSET],
                    frame[SPI_ADDRESS_OFFSET + 1],
                ]),
                length: frame.get(SPI_LENGTH_OFFSET).copied(),
            }
        }
        0x21 => Subcommand::SetNfcIrConfig,
        0x30 => Subcommand::SetPlayerLights,
        0x38 => Subcommand::SetHomeLight,
        0x40 => Subcommand::EnableImu,
        0x48 => Subcommand::EnableVibration,
        other => Subcommand::Unknown(other),
    })
}

#[inline]
fn require(frame: &[u8], opcode: u8, needed: usize) -> Result<(), ParseError> {
    if frame.len() < needed {
        return Err(ParseError::Truncated {
            opcode,
            needed,
            actual: frame.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subcommand_frame(id: u8, args: &[u8]) -> [u8; 64] {
        let mut frame = [0u8; 64];
        frame[0] = OPCODE_SUBCOMMAND;
        frame[SUBCOMMAND_OFFSET] = id;
        frame[SUBCOMMAND_OFFSET + 1..SUBCOMMAND_OFFSET + 1 + args.len()].copy_from_slice(args);
        frame
    }

    #[test]
    fn test_parse_handshake_steps() {
        assert_eq!(
            parse(&[0x80, 0x01]),
            Ok(Command::Handshake(Handshake::Status))
        );
        assert_eq!(
            parse(&[0x80, 0x02]),
            Ok(Command::Handshake(Handshake::Handshake))
        );
        assert_eq!(
            parse(&[0x80, 0x03]),
            Ok(Command::Handshake(Handshake::HighSpeed))
        );
        assert_eq!(
            parse(&[0x80, 0x04]),
            Ok(Command::Handshake(Handshake::ForceUsb))
        );
        assert_eq!(
            parse(&[0x80, 0x05]),
            Ok(Command::Handshake(Handshake::Unknown(0x05)))
        );
    }

    #[test]
    fn test_parse_spi_read() {
        let frame = subcommand_frame(0x10, &[0x00, 0x60, 0x00, 0x00, 0x10]);
        assert_eq!(
            parse(&frame),
            Ok(Command::Subcommand(Subcommand::SpiRead {
                address: 0x6000,
                length: Some(0x10),
            }))
        );
    }

    #[test]
    fn test_parse_spi_read_without_length() {
        let frame = subcommand_frame(0x10, &[0x3D, 0x60]);
        assert_eq!(
            parse(&frame[..13]),
            Ok(Command::Subcommand(Subcommand::SpiRead {
                address: 0x603D,
                length: None,
            }))
        );
    }

    #[test]
    fn test_parse_mode_set_subcommands() {
        for (id, expected) in [
            (0x03, Subcommand::SetInputMode),
            (0x08, Subcommand::SetShipmentMode),
            (0x30, Subcommand::SetPlayerLights),
            (0x38, Subcommand::SetHomeLight),
            (0x40, Subcommand::EnableImu),
            (0x48, Subcommand::EnableVibration),
        ] {
            let frame = subcommand_frame(id, &[]);
            assert_eq!(parse(&frame), Ok(Command::Subcommand(expected)));
            assert_eq!(expected.id(), id);
        }
    }

    #[test]
    fn test_parse_rumble() {
        assert_eq!(parse(&[0x10, 0x00]), Ok(Command::Rumble));
    }

    #[test]
    fn test_empty_frame() {
        assert_eq!(parse(&[]), Err(ParseError::Empty));
    }

    #[test]
    fn test_truncated_handshake() {
        assert_eq!(
            parse(&[0x80]),
            Err(ParseError::Truncated {
                opcode: 0x80,
                needed: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_truncated_subcommand() {
        let frame = subcommand_frame(0x02, &[]);
        assert_eq!(
            parse(&frame[..10]),
            Err(ParseError::Truncated {
                opcode: 0x01,
                needed: 11,
                actual: 10
            })
        );
    }

    #[test]
    fn test_truncated_spi_address() {
        let frame = subcommand_frame(0x10, &[0x00, 0x60]);
        assert_eq!(
            parse(&frame[..12]),
            Err(ParseError::Truncated {
                opcode: 0x01,
                needed: 13,
                actual: 12
            })
        );
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(parse(&[0x42, 0x00]), Err(ParseError::UnknownOpcode(0x42)));
    }

    #[test]
    fn test_unknown_subcommand_is_not_an_error() {
        let frame = subcommand_frame(0x7F, &[]);
        assert_eq!(
            parse(&frame),
            Ok(Command::Subcommand(Subcommand::Unknown(0x7F)))
        );
    }
}
