//! Standard full input report (`0x30`).
//!
//! ```text
//! [0x30][counter][0x81][buttons 3][left stick 3][right stick 3][0x0C]
//! [motion block 12] x 3
//! ```
//!
//! The right stick is not driven and carries a fixed near-centre value.
//! The motion section repeats the same block three times, one per 5 ms
//! sample the host expects in a report.

use crate::frame::{EncodeError, FrameWriter, ResponseFrame, REPORT_STANDARD};

/// Connection info byte: USB powered, Pro Controller.
pub const CONNECTION_INFO: u8 = 0x81;

/// Fixed right-stick bytes.
pub const RIGHT_STICK_FILLER: [u8; 3] = [0x22, 0xC8, 0x7B];

/// Vibrator input report byte.
pub const VIBRATOR_REPORT: u8 = 0x0C;

/// Number of motion samples per report.
pub const MOTION_SAMPLES: usize = 3;

/// Length of one motion sample.
pub const MOTION_BLOCK_LEN: usize = 12;

/// One motion sample: accelerometer then gyroscope, X/Y/Z each.
///
/// No real sensor exists; pointer motion is written into two of the gyro
/// fields so the host sees it as motion aiming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionBlock {
    /// Accelerometer X/Y/Z.
    pub accel: [i16; 3],
    /// Gyroscope X/Y/Z.
    pub gyro: [i16; 3],
}

impl MotionBlock {
    /// Sample carrying pointer deltas: Y at bytes 8..10, X at bytes 10..12.
    #[must_use]
    pub const fn from_pointer_delta(dx: i16, dy: i16) -> Self {
        Self {
            accel: [0; 3],
            gyro: [0, dy, dx],
        }
    }

    /// Little-endian wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; MOTION_BLOCK_LEN] {
        let mut out = [0u8; MOTION_BLOCK_LEN];
        for (chunk, value) in out
            .chunks_exact_mut(2)
            .zip(self.accel.iter().chain(self.gyro.iter()))
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// Contents of a standard input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StandardReport {
    /// Rolling counter.
    pub counter: u8,
    /// Button bytes in wire order.
    pub buttons: [u8; 3],
    /// Packed left stick.
    pub left_stick: [u8; 3],
    /// Motion sample, repeated [`MOTION_SAMPLES`] times.
    pub motion: MotionBlock,
}

impl StandardReport {
    /// Encode into a 64-byte frame.
    ///
    /// # Errors
    ///
    /// Never fails in practice: the report is 49 bytes.
    pub fn encode(&self) -> Result<ResponseFrame, EncodeError> {
        let mut writer = FrameWriter::new(REPORT_STANDARD, self.counter);
        writer.write(CONNECTION_INFO)?;
        writer.write_slice(&self.buttons)?;
        writer.write_slice(&self.left_stick)?;
        writer.write_slice(&RIGHT_STICK_FILLER)?;
        writer.write(VIBRATOR_REPORT)?;
        let block = self.motion.to_bytes();
        for _ in 0..MOTION_SAMPLES {
            writer.write_slice(&block)?;
        }
        Ok(writer.finish())
    }
}
