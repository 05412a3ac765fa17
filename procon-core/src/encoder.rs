//! Standard input report encoding.

use procon_proto::{EncodeError, MotionBlock, ResponseFrame, StandardReport};

use crate::types::{ControllerState, PointerPosition};

/// Rolling 8-bit counter advanced by [`SequenceCounter::STEP`] per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceCounter(u8);

impl SequenceCounter {
    /// Increment per report tick.
    pub const STEP: u8 = 3;

    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Advance one tick and return the new value.
    #[inline]
    pub fn advance(&mut self) -> u8 {
        self.0 = self.0.wrapping_add(Self::STEP);
        self.0
    }
}

/// Pointer position at the last report, for computing motion deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionBaseline(PointerPosition);

impl MotionBaseline {
    /// Whole-count motion since the last call, then move the baseline.
    ///
    /// Deltas are differences of floored positions, so fractional motion
    /// carries over to later reports instead of being lost.
    pub fn take_delta(&mut self, current: &PointerPosition) -> (i16, i16) {
        let dx = whole_delta(self.0.x, current.x);
        let dy = whole_delta(self.0.y, current.y);
        self.0 = *current;
        (dx, dy)
    }
}

fn whole_delta(from: fixed::types::I48F16, to: fixed::types::I48F16) -> i16 {
    let delta = to.to_num::<i64>() - from.to_num::<i64>();
    delta.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Builds standard reports from controller snapshots.
#[derive(Debug, Default)]
pub struct ReportEncoder {
    counter: SequenceCounter,
    baseline: MotionBaseline,
}

impl ReportEncoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: SequenceCounter::new(),
            baseline: MotionBaseline(PointerPosition::ZERO),
        }
    }

    /// Current counter value.
    #[inline]
    #[must_use]
    pub const fn counter(&self) -> u8 {
        self.counter.value()
    }

    /// Advance the counter for a new tick.
    #[inline]
    pub fn tick(&mut self) -> u8 {
        self.counter.advance()
    }

    /// Encode `state` with the current counter and consume pending motion.
    ///
    /// # Errors
    ///
    /// Propagates [`EncodeError`] from the frame writer.
    pub fn encode(&mut self, state: &ControllerState) -> Result<ResponseFrame, EncodeError> {
        let (dx, dy) = self.baseline.take_delta(&state.pointer);
        StandardReport {
            counter: self.counter.value(),
            buttons: state.buttons.to_bytes(),
            left_stick: state.left_stick.to_wire(),
            motion: MotionBlock::from_pointer_delta(dx, dy),
        }
        .encode()
    }

    /// Consume pending motion without building a report.
    pub fn skip(&mut self, state: &ControllerState) {
        self.baseline.take_delta(&state.pointer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Buttons, StickPosition};
    use fixed::types::I48F16;

    #[test]
    fn test_counter_wraps() {
        let mut counter = SequenceCounter::new();
        for _ in 0..85 {
            counter.advance();
        }
        assert_eq!(counter.value(), 255);
        assert_eq!(counter.advance(), 2);
    }

    #[test]
    fn test_neutral_report() {
        let mut encoder = ReportEncoder::new();
        encoder.tick();
        let frame = encoder.encode(&ControllerState::neutral()).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(&bytes[..2], &[0x30, 0x03]);
        assert_eq!(&bytes[3..6], &[0, 0, 0]);
        assert_eq!(&bytes[6..9], &[0xFF, 0xF7, 0x7F]);
    }

    #[test]
    fn test_buttons_and_stick() {
        let mut encoder = ReportEncoder::new();
        let state = ControllerState {
            buttons: Buttons::ZR | Buttons::PLUS,
            left_stick: StickPosition::new(4094, 0),
            ..ControllerState::neutral()
        };
        let frame = encoder.encode(&state).unwrap();
        let bytes = frame.as_bytes();
        assert_eq!(&bytes[3..6], &[0x80, 0x02, 0x00]);
        assert_eq!(&bytes[6..9], &procon_proto::axis::encode(4094, 0));
    }

    #[test]
    fn test_motion_delta_then_baseline_advances() {
        let mut encoder = ReportEncoder::new();
        let mut state = ControllerState::neutral();
        state.pointer.x = I48F16::from_num(-5);
        state.pointer.y = I48F16::from_num(2);

        let frame = encoder.encode(&state).unwrap();
        // Y at block offset 8, X at 10, block starts at 13
        assert_eq!(&frame.as_bytes()[21..25], &[0x02, 0x00, 0xFB, 0xFF]);

        let frame = encoder.encode(&state).unwrap();
        assert_eq!(&frame.as_bytes()[21..25], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_fractional_motion_carries_over() {
        let mut baseline = MotionBaseline::default();
        let mut pos = PointerPosition::ZERO;
        let step = I48F16::from_num(0.25);
        let mut total = 0i32;
        for _ in 0..8 {
            pos.y += step;
            total += i32::from(baseline.take_delta(&pos).1);
        }
        assert_eq!(total, 2);
    }

    #[test]
    fn test_delta_clamped() {
        let mut baseline = MotionBaseline::default();
        let pos = PointerPosition {
            x: I48F16::from_num(100_000),
            y: I48F16::from_num(-100_000),
        };
        assert_eq!(baseline.take_delta(&pos), (i16::MAX, i16::MIN));
    }

    #[test]
    fn test_skip_consumes_motion() {
        let mut encoder = ReportEncoder::new();
        let mut state = ControllerState::neutral();
        state.pointer.x = I48F16::from_num(9);
        encoder.skip(&state);
        let frame = encoder.encode(&state).unwrap();
        assert_eq!(&frame.as_bytes()[23..25], &[0, 0]);
    }
}
