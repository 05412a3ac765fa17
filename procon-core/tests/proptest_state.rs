//! Property-based tests for controller state updates.
//!
//! Uses proptest with 500 cases to verify the button merge law, stick
//! press/release symmetry, key edge idempotence and the report counter.

use procon_core::{
    Buttons, ControllerState, InputEvent, InputTranslator, KeyEdgeTranslator, SequenceCounter,
    DEFAULT_BINDINGS,
};
use procon_proto::KeyReport;
use proptest::prelude::*;

const KEY_W: u8 = 0x1A;
const KEY_A: u8 = 0x04;
const KEY_S: u8 = 0x16;
const KEY_D: u8 = 0x07;

fn direction_key() -> impl Strategy<Value = u8> {
    prop_oneof![Just(KEY_W), Just(KEY_A), Just(KEY_S), Just(KEY_D)]
}

fn key_report() -> impl Strategy<Value = KeyReport> {
    (any::<u8>(), proptest::array::uniform6(any::<u8>()))
        .prop_map(|(modifier, keycodes)| KeyReport { modifier, keycodes })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A change mask covering only byte 0 must leave bytes 1 and 2 alone.
    #[test]
    fn prop_merge_byte0_preserves_bytes_1_2(
        prior in 0u32..=0x00FF_FFFF,
        value in 0u32..=0x00FF_FFFF,
        mask in 0u32..=0xFF,
    ) {
        let prior = Buttons(prior);
        let merged = prior.merge(Buttons(value), Buttons(mask)).to_bytes();
        let prior = prior.to_bytes();
        prop_assert_eq!(merged[1], prior[1]);
        prop_assert_eq!(merged[2], prior[2]);
    }

    /// Bits under the mask come from the value, all others from the prior state.
    #[test]
    fn prop_merge_law(
        prior in 0u32..=0x00FF_FFFF,
        value in 0u32..=0x00FF_FFFF,
        mask in 0u32..=0x00FF_FFFF,
    ) {
        let merged = Buttons(prior).merge(Buttons(value), Buttons(mask));
        prop_assert_eq!(merged.0 & mask, value & mask);
        prop_assert_eq!(merged.0 & !mask, prior & !mask);
    }

    /// Press then release of a direction key returns the stick exactly to
    /// its prior position, for any number of cycles.
    #[test]
    fn prop_press_release_symmetry(
        key in direction_key(),
        cycles in 1usize..50,
        x in -10_000i32..10_000,
        y in -10_000i32..10_000,
    ) {
        let mut keys = KeyEdgeTranslator::new(DEFAULT_BINDINGS, 2047);
        let mut state = ControllerState::neutral();
        state.left_stick.x = x;
        state.left_stick.y = y;
        let before = state.left_stick;

        for _ in 0..cycles {
            keys.apply(&KeyReport::with_keys(&[key]), &mut state);
            prop_assert_ne!(state.left_stick, before);
            keys.apply(&KeyReport::default(), &mut state);
            prop_assert_eq!(state.left_stick, before);
        }
    }

    /// Delivering the same report twice produces no edges the second time.
    #[test]
    fn prop_edge_idempotence(first in key_report(), second in key_report()) {
        let mut keys = KeyEdgeTranslator::new(DEFAULT_BINDINGS, 2047);
        let mut state = ControllerState::neutral();

        keys.apply(&first, &mut state);
        keys.apply(&second, &mut state);
        let settled = state;

        let edges = keys.apply(&second, &mut state);
        prop_assert!(edges.is_empty());
        prop_assert_eq!(state, settled);
    }

    /// Any report sequence ending in all-released returns to neutral.
    #[test]
    fn prop_release_all_keys_returns_to_neutral(
        reports in proptest::collection::vec(key_report(), 1..20),
    ) {
        let mut input = InputTranslator::default();
        for report in &reports {
            input.apply(&InputEvent::Keyboard(*report));
        }
        let state = input.apply(&InputEvent::Keyboard(KeyReport::default()));
        prop_assert_eq!(state, ControllerState::neutral());
    }

    /// After N ticks from zero the counter is 3N mod 256.
    #[test]
    fn prop_sequence_counter_law(n in 0usize..2000) {
        let mut counter = SequenceCounter::new();
        for _ in 0..n {
            counter.advance();
        }
        prop_assert_eq!(usize::from(counter.value()), (3 * n) % 256);
    }
}
