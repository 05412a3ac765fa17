//! Pointer report to controller state.

use fixed::types::I48F16;
use procon_proto::PointerReport;

use crate::config::PointerConfig;
use crate::types::{Buttons, ControllerState};

/// Accumulates pointer motion and drives one button from a pointer button.
pub struct PointerTranslator {
    config: PointerConfig,
    previous_buttons: u8,
}

impl PointerTranslator {
    #[must_use]
    pub const fn new(config: PointerConfig) -> Self {
        Self {
            config,
            previous_buttons: 0,
        }
    }

    /// Apply one pointer report.
    ///
    /// Motion is scaled, optionally inverted, and added to the running
    /// position. The configured button changes only on an edge of the
    /// pointer button, so a key holding the same button is not released by
    /// plain motion. Returns whether the button changed.
    pub fn apply(&mut self, report: &PointerReport, state: &mut ControllerState) -> bool {
        let cfg = &self.config;
        let dx = scale(report.x, cfg.x_scale, cfg.invert_x);
        let dy = scale(report.y, cfg.y_scale, cfg.invert_y);
        state.pointer.x = state.pointer.x.saturating_add(dx);
        state.pointer.y = state.pointer.y.saturating_add(dy);

        let was = self.previous_buttons & cfg.button_mask != 0;
        let now = report.buttons & cfg.button_mask != 0;
        self.previous_buttons = report.buttons;
        if was == now {
            return false;
        }

        let value = if now { cfg.button } else { Buttons::NONE };
        state.buttons = state.buttons.merge(value, cfg.button);
        true
    }

    /// Forget the held pointer buttons.
    pub fn reset(&mut self) {
        self.previous_buttons = 0;
    }
}

#[inline]
fn scale(counts: i8, factor: I48F16, invert: bool) -> I48F16 {
    let value = I48F16::from_num(counts).saturating_mul(factor);
    if invert {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_POINTER;
    use procon_proto::hid::{POINTER_BUTTON_PRIMARY, POINTER_BUTTON_SECONDARY};

    fn motion(x: i8, y: i8) -> PointerReport {
        PointerReport {
            buttons: 0,
            x,
            y,
            wheel: 0,
        }
    }

    fn click(buttons: u8) -> PointerReport {
        PointerReport {
            buttons,
            ..PointerReport::default()
        }
    }

    #[test]
    fn test_x_inverted_y_scaled() {
        let mut pointer = PointerTranslator::new(DEFAULT_POINTER);
        let mut state = ControllerState::neutral();

        for _ in 0..10 {
            pointer.apply(&motion(3, 10), &mut state);
        }
        assert_eq!(state.pointer.x.to_num::<i64>(), -30);
        // 0.1 is not exact in binary, allow one count of error
        let y = state.pointer.y.to_num::<f64>();
        assert!((y - 10.0).abs() < 0.01, "y = {y}");
    }

    #[test]
    fn test_primary_button_drives_zr() {
        let mut pointer = PointerTranslator::new(DEFAULT_POINTER);
        let mut state = ControllerState::neutral();

        assert!(pointer.apply(&click(POINTER_BUTTON_PRIMARY), &mut state));
        assert!(state.buttons.contains(Buttons::ZR));
        assert!(!pointer.apply(&click(POINTER_BUTTON_PRIMARY), &mut state));
        assert!(pointer.apply(&click(0), &mut state));
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn test_motion_does_not_release_key_held_button() {
        let mut pointer = PointerTranslator::new(DEFAULT_POINTER);
        let mut state = ControllerState::neutral();
        state.buttons = Buttons::ZR | Buttons::A;

        assert!(!pointer.apply(&motion(5, -5), &mut state));
        assert_eq!(state.buttons, Buttons::ZR | Buttons::A);
    }

    #[test]
    fn test_other_pointer_buttons_ignored() {
        let mut pointer = PointerTranslator::new(DEFAULT_POINTER);
        let mut state = ControllerState::neutral();

        assert!(!pointer.apply(&click(POINTER_BUTTON_SECONDARY), &mut state));
        assert!(state.buttons.is_empty());
    }
}
