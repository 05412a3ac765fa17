//! Keyboard report to controller state, by edge detection.

use procon_proto::{keycode_to_char, KeyReport};

use crate::binding::{lookup, Axis, BindingTarget, KeyBinding};
use crate::types::{Buttons, ControllerState};

/// Number of edges seen in one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeCount {
    pub presses: u8,
    pub releases: u8,
}

impl EdgeCount {
    /// No edges.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.presses == 0 && self.releases == 0
    }
}

/// Diffs consecutive keyboard reports and applies bound edges.
pub struct KeyEdgeTranslator {
    bindings: &'static [KeyBinding],
    deflection: i32,
    previous: KeyReport,
}

impl KeyEdgeTranslator {
    #[must_use]
    pub const fn new(bindings: &'static [KeyBinding], deflection: i32) -> Self {
        Self {
            bindings,
            deflection,
            previous: KeyReport {
                modifier: 0,
                keycodes: [0; 6],
            },
        }
    }

    /// Apply one keyboard report.
    ///
    /// Keys held now but not in the previous report are presses, keys held
    /// before but not now are releases. Button edges are collected into one
    /// change mask and merged, so buttons no key touched keep their state.
    pub fn apply(&mut self, report: &KeyReport, state: &mut ControllerState) -> EdgeCount {
        let mut edges = EdgeCount::default();
        let mut change = Buttons::NONE;
        let mut value = Buttons::NONE;

        let previous = self.previous;
        for key in unique_keys(report) {
            if !previous.contains(key) {
                edges.presses += 1;
                self.apply_edge(key, true, &mut change, &mut value, state);
            }
        }
        for key in unique_keys(&previous) {
            if !report.contains(key) {
                edges.releases += 1;
                self.apply_edge(key, false, &mut change, &mut value, state);
            }
        }

        state.buttons = state.buttons.merge(value, change);
        self.previous = *report;
        edges
    }

    /// Forget held keys without emitting releases.
    pub fn reset(&mut self) {
        self.previous = KeyReport::default();
    }

    fn apply_edge(
        &self,
        keycode: u8,
        pressed: bool,
        change: &mut Buttons,
        value: &mut Buttons,
        state: &mut ControllerState,
    ) {
        let Some(target) = keycode_to_char(keycode).and_then(|c| lookup(self.bindings, c)) else {
            return;
        };
        match target {
            BindingTarget::Button(button) => {
                *change |= button;
                value.set(button, pressed);
            }
            BindingTarget::Stick(direction) => {
                let (axis, sign) = direction.axis_sign();
                let offset = (if pressed { sign } else { -sign }) * self.deflection;
                let stick = &mut state.left_stick;
                match axis {
                    Axis::X => stick.x = stick.x.saturating_add(offset),
                    Axis::Y => stick.y = stick.y.saturating_add(offset),
                }
            }
        }
    }
}

/// Keys in the report, each reported once even if repeated.
fn unique_keys(report: &KeyReport) -> impl Iterator<Item = u8> + '_ {
    report
        .keycodes
        .iter()
        .enumerate()
        .filter(|&(i, &k)| report.contains(k) && !report.keycodes[..i].contains(&k))
        .map(|(_, &k)| k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::DEFAULT_BINDINGS;
    use crate::types::StickPosition;

    const KEY_W: u8 = 0x1A;
    const KEY_S: u8 = 0x16;
    const KEY_D: u8 = 0x07;
    const KEY_E: u8 = 0x08;
    const KEY_Z: u8 = 0x1D;
    const KEY_K: u8 = 0x0E;

    fn translator() -> KeyEdgeTranslator {
        KeyEdgeTranslator::new(DEFAULT_BINDINGS, 2047)
    }

    #[test]
    fn test_press_and_release_button() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();

        let edges = keys.apply(&KeyReport::with_keys(&[KEY_E]), &mut state);
        assert_eq!(edges, EdgeCount { presses: 1, releases: 0 });
        assert_eq!(state.buttons, Buttons::A);

        let edges = keys.apply(&KeyReport::default(), &mut state);
        assert_eq!(edges, EdgeCount { presses: 0, releases: 1 });
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn test_release_keeps_other_sources() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();
        // Held by another source
        state.buttons = Buttons::HOME;

        keys.apply(&KeyReport::with_keys(&[KEY_Z]), &mut state);
        assert_eq!(state.buttons, Buttons::HOME | Buttons::ZR);
        keys.apply(&KeyReport::default(), &mut state);
        assert_eq!(state.buttons, Buttons::HOME);
    }

    #[test]
    fn test_stick_full_deflection() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();

        keys.apply(&KeyReport::with_keys(&[KEY_W, KEY_D]), &mut state);
        assert_eq!(state.left_stick, StickPosition::new(4094, 4094));

        keys.apply(&KeyReport::with_keys(&[KEY_D]), &mut state);
        assert_eq!(state.left_stick, StickPosition::new(4094, 2047));

        keys.apply(&KeyReport::default(), &mut state);
        assert_eq!(state.left_stick, StickPosition::NEUTRAL);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();

        keys.apply(&KeyReport::with_keys(&[KEY_W, KEY_S]), &mut state);
        assert_eq!(state.left_stick, StickPosition::NEUTRAL);
    }

    #[test]
    fn test_repeated_report_has_no_edges() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();
        let report = KeyReport::with_keys(&[KEY_E, KEY_W]);

        assert_eq!(keys.apply(&report, &mut state).presses, 2);
        let before = state;
        assert!(keys.apply(&report, &mut state).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_unbound_and_reserved_keys_ignored() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();

        let edges = keys.apply(&KeyReport::with_keys(&[KEY_K, 0x01, 0x02]), &mut state);
        assert_eq!(edges.presses, 1);
        assert_eq!(state, ControllerState::neutral());
    }

    #[test]
    fn test_duplicate_slot_counts_once() {
        let mut keys = translator();
        let mut state = ControllerState::neutral();

        keys.apply(&KeyReport::with_keys(&[KEY_W, KEY_W]), &mut state);
        assert_eq!(state.left_stick.y, 4094);
        keys.apply(&KeyReport::default(), &mut state);
        assert_eq!(state.left_stick.y, 2047);
    }
}
