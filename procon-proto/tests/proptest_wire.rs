//! Property-based tests for the wire layer.
//!
//! Uses proptest with 500 cases to verify that inbound parsing never reads
//! past the received data, the axis codec round-trips every 12-bit value and
//! the relay parser survives arbitrary line noise.

use procon_proto::axis;
use procon_proto::relay::{self, RelayParser, KIND_KEYBOARD, KIND_POINTER, MAX_FRAME_LEN};
use procon_proto::{parse, Command, ParseError, RelayMessage};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// parse must return a value (never panic) for any input up to 64 bytes.
    #[test]
    fn prop_parse_total(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
        let _ = parse(&data);
    }

    /// Subcommand frames shorter than 11 bytes are rejected as truncated.
    #[test]
    fn prop_short_subcommand_truncated(
        data in proptest::collection::vec(any::<u8>(), 1..11usize),
    ) {
        let mut data = data;
        data[0] = 0x01;
        let is_truncated = matches!(parse(&data), Err(ParseError::Truncated { .. }));
        prop_assert!(is_truncated);
    }

    /// Trailing bytes past what a handshake step needs do not change the result.
    #[test]
    fn prop_handshake_ignores_trailing(
        step in any::<u8>(),
        tail in proptest::collection::vec(any::<u8>(), 0..62),
    ) {
        let mut data = vec![0x80, step];
        let short = parse(&data);
        data.extend_from_slice(&tail);
        prop_assert_eq!(parse(&data), short);
        prop_assert!(matches!(short, Ok(Command::Handshake(_))));
    }

    /// decode(encode(x, y)) == (x, y) for all 12-bit values.
    #[test]
    fn prop_axis_roundtrip(x in 0u16..=axis::AXIS_MAX, y in 0u16..=axis::AXIS_MAX) {
        prop_assert_eq!(axis::decode(axis::encode(x, y)), (x, y));
    }

    /// A valid frame is decoded after any run of bytes without a sync byte.
    #[test]
    fn prop_relay_skips_noise(
        noise in proptest::collection::vec(
            any::<u8>().prop_filter("not sync", |b| *b != relay::SYNC),
            0..64,
        ),
        buttons in any::<u8>(),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        let mut parser = RelayParser::new();
        for &b in &noise {
            prop_assert_eq!(parser.push_byte(b), Ok(None));
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = relay::encode(KIND_POINTER, &[buttons, x, y], &mut buf).unwrap();
        let mut decoded = None;
        for &b in &buf[..len] {
            if let Ok(Some(msg)) = parser.push_byte(b) {
                decoded = Some(msg);
            }
        }
        let is_pointer = matches!(decoded, Some(RelayMessage::Pointer(p)) if p.buttons == buttons);
        prop_assert!(is_pointer);
    }

    /// Stray sync bytes directly before a frame do not swallow it.
    #[test]
    fn prop_relay_survives_stray_sync(
        noise in proptest::collection::vec(
            any::<u8>().prop_filter("not sync", |b| *b != relay::SYNC),
            0..16,
        ),
        stray in 1usize..4,
        keys in proptest::array::uniform6(0x04u8..=0x38),
    ) {
        let mut parser = RelayParser::new();
        for &b in &noise {
            prop_assert_eq!(parser.push_byte(b), Ok(None));
        }
        for _ in 0..stray {
            prop_assert_eq!(parser.push_byte(relay::SYNC), Ok(None));
        }

        let mut payload = [0u8; 8];
        payload[2..].copy_from_slice(&keys);
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = relay::encode(KIND_KEYBOARD, &payload, &mut buf).unwrap();
        let mut decoded = None;
        for &b in &buf[..len] {
            if let Ok(Some(msg)) = parser.push_byte(b) {
                decoded = Some(msg);
            }
        }
        let is_keyboard = matches!(decoded, Some(RelayMessage::Keyboard(k)) if k.keycodes == keys);
        prop_assert!(is_keyboard);
    }
}
