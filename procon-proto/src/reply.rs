//! Builders for handshake and subcommand replies.
//!
//! Handshake replies are `[0x81][step][payload]`. Subcommand replies share a
//! common envelope:
//!
//! ```text
//! [0x21][counter][11-byte idle input][ack][subcommand][payload..]
//! ```
//!
//! All builders return a zero-padded [`ResponseFrame`].

use crate::calibration::CalibrationBlob;
use crate::frame::{
    EncodeError, FrameWriter, ResponseFrame, REPORT_HANDSHAKE_REPLY, REPORT_SUBCOMMAND_REPLY,
};

/// Input section carried in front of every subcommand reply: connection
/// info, no buttons held, both sticks near centre, vibrator byte.
pub const IDLE_INPUT_PREFIX: [u8; 11] = [
    0x81, 0x00, 0x80, 0x00, 0xF8, 0xD7, 0x7A, 0x22, 0xC8, 0x7B, 0x0C,
];

/// Controller type reported in the status reply.
pub const CONTROLLER_TYPE_PRO: u8 = 0x03;

/// MAC address reported in the status reply.
pub const MAC_ADDRESS: [u8; 6] = [0x00, 0x00, 0x5E, 0x00, 0x53, 0x5E];

/// Payload of the `0x80 0x01` status reply: padding, type, MAC.
pub const STATUS_PAYLOAD: [u8; 8] = [
    0x00,
    CONTROLLER_TYPE_PRO,
    MAC_ADDRESS[0],
    MAC_ADDRESS[1],
    MAC_ADDRESS[2],
    MAC_ADDRESS[3],
    MAC_ADDRESS[4],
    MAC_ADDRESS[5],
];

/// Device info reply: firmware 3.48, Pro Controller, MAC, SPI colours in use.
pub const DEVICE_INFO: [u8; 12] = [
    0x03, 0x48, 0x03, 0x02, 0xE5, 0x35, 0x00, 0xE5, 0x00, 0x00, 0x03, 0x01,
];

/// NFC/IR MCU configuration reply.
pub const NFC_IR_CONFIG: [u8; 8] = [0x01, 0x00, 0xFF, 0x00, 0x03, 0x00, 0x05, 0x01];

/// Pairing reply payload.
pub const PAIRING_PAYLOAD: [u8; 1] = [0x03];

/// Ack codes carried in subcommand replies.
pub mod ack {
    /// Not acknowledged.
    pub const NACK: u8 = 0x00;
    /// Plain acknowledgement, no data.
    pub const OK: u8 = 0x80;
    /// Pairing acknowledgement.
    pub const PAIRING: u8 = 0x81;
    /// Device info follows.
    pub const DEVICE_INFO: u8 = 0x82;
    /// Trigger elapsed time follows.
    pub const TRIGGER_ELAPSED: u8 = 0x83;
    /// SPI flash data follows.
    pub const SPI_READ: u8 = 0x90;
    /// NFC/IR MCU data follows.
    pub const NFC_IR: u8 = 0xA0;
}

/// Subcommand id of an SPI flash read, echoed in its reply.
pub const SUBCOMMAND_SPI_READ: u8 = 0x10;

/// Build a handshake reply `[0x81][step][payload]`.
///
/// # Errors
///
/// Returns [`EncodeError::PayloadTooLong`] if the payload does not fit.
pub fn handshake_reply(step: u8, payload: &[u8]) -> Result<ResponseFrame, EncodeError> {
    ResponseFrame::new(REPORT_HANDSHAKE_REPLY, step, payload)
}

/// Build a subcommand reply in the common envelope.
///
/// # Errors
///
/// Returns [`EncodeError::PayloadTooLong`] if the payload does not fit
/// after the envelope.
pub fn subcommand_reply(
    counter: u8,
    ack: u8,
    subcommand: u8,
    payload: &[u8],
) -> Result<ResponseFrame, EncodeError> {
    let mut writer = FrameWriter::new(REPORT_SUBCOMMAND_REPLY, counter);
    writer.write_slice(&IDLE_INPUT_PREFIX)?;
    writer.write(ack)?;
    writer.write(subcommand)?;
    writer.write_slice(payload)?;
    Ok(writer.finish())
}

/// Build the reply to an SPI flash read:
/// `[addr lo][addr hi][0x00][0x00][len][data..]`.
///
/// # Errors
///
/// Returns [`EncodeError::PayloadTooLong`] if the region is larger than the
/// space left in the frame.
pub fn spi_read_reply(counter: u8, blob: &CalibrationBlob) -> Result<ResponseFrame, EncodeError> {
    spi_reply(counter, ack::SPI_READ, blob.address, blob.data)
}

/// Build a negative reply to an SPI flash read of an unknown address.
///
/// # Errors
///
/// Never fails in practice; the signature matches the other builders.
pub fn spi_read_nack(counter: u8, address: u16) -> Result<ResponseFrame, EncodeError> {
    spi_reply(counter, ack::NACK, address, &[])
}

fn spi_reply(
    counter: u8,
    ack: u8,
    address: u16,
    data: &[u8],
) -> Result<ResponseFrame, EncodeError> {
    let mut writer = FrameWriter::new(REPORT_SUBCOMMAND_REPLY, counter);
    writer.write_slice(&IDLE_INPUT_PREFIX)?;
    writer.write(ack)?;
    writer.write(SUBCOMMAND_SPI_READ)?;
    writer.write_slice(&address.to_le_bytes())?;
    writer.write_slice(&[0x00, 0x00])?;
    let len = u8::try_from(data.len()).map_err(|_| EncodeError::PayloadTooLong {
        len: data.len(),
        available: writer.remaining(),
    })?;
    writer.write(len)?;
    writer.write_slice(data)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationStore;

    // Offset of the ack byte inside a subcommand reply frame
    const ACK_AT: usize = 2 + IDLE_INPUT_PREFIX.len();

    #[test]
    fn test_handshake_reply() {
        let frame = handshake_reply(0x02, &[0x00]).unwrap();
        assert_eq!(&frame.as_bytes()[..3], &[0x81, 0x02, 0x00]);
        assert!(frame.as_bytes()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_status_reply_carries_type_and_mac() {
        let frame = handshake_reply(0x01, &STATUS_PAYLOAD).unwrap();
        assert_eq!(frame.as_bytes()[3], CONTROLLER_TYPE_PRO);
        assert_eq!(&frame.as_bytes()[4..10], &MAC_ADDRESS);
    }

    #[test]
    fn test_subcommand_envelope() {
        let frame = subcommand_reply(0x09, ack::DEVICE_INFO, 0x02, &DEVICE_INFO).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(bytes[0], 0x21);
        assert_eq!(bytes[1], 0x09);
        assert_eq!(&bytes[2..ACK_AT], &IDLE_INPUT_PREFIX);
        assert_eq!(&bytes[ACK_AT..ACK_AT + 2], &[0x82, 0x02]);
        assert_eq!(&bytes[ACK_AT + 2..ACK_AT + 14], &DEVICE_INFO);
        assert!(bytes[ACK_AT + 14..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_spi_read_reply_layout() {
        let blob = CalibrationStore::DEFAULT.lookup(0x6000).unwrap();
        let frame = spi_read_reply(0x03, blob).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(
            &bytes[ACK_AT..ACK_AT + 7],
            &[0x90, 0x10, 0x00, 0x60, 0x00, 0x00, 16]
        );
        assert_eq!(&bytes[ACK_AT + 7..ACK_AT + 23], &[0xFF; 16]);
    }

    #[test]
    fn test_largest_region_fits() {
        for blob in CalibrationStore::DEFAULT.regions() {
            assert!(spi_read_reply(0, blob).is_ok());
        }
    }

    #[test]
    fn test_spi_nack() {
        let frame = spi_read_nack(0x06, 0x1234).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(
            &bytes[ACK_AT..ACK_AT + 7],
            &[0x00, 0x10, 0x34, 0x12, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_payload_overflow_is_an_error() {
        let payload = [0u8; 50];
        assert!(matches!(
            subcommand_reply(0, ack::OK, 0x03, &payload),
            Err(EncodeError::PayloadTooLong { .. })
        ));
    }
}
