//! GPIO push-button input source.
//!
//! Each button is wired between its pin and ground; the internal pull-up
//! keeps released buttons high. Pins are sampled at a fixed interval, which
//! also debounces them, and a sample is delivered only when it changes.
//!
//! # Pins
//!
//! | Button  | GPIO |
//! |---------|------|
//! | A       | 2    |
//! | B       | 3    |
//! | X       | 4    |
//! | Y       | 5    |
//! | Plus    | 6    |
//! | Minus   | 7    |
//! | Home    | 10   |
//! | Capture | 11   |

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;
use embassy_time::{Duration, Ticker};
use procon_core::{ButtonSample, Buttons, InputError, InputEvent, InputSource};

/// Sampling interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One active-low button input.
pub struct ButtonPin<'d> {
    input: Input<'d>,
    button: Buttons,
}

impl<'d> ButtonPin<'d> {
    /// Configure `pin` as a pulled-up input driving `button`.
    #[must_use]
    pub fn new(pin: Peri<'d, impl Pin>, button: Buttons) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
            button,
        }
    }

    #[inline]
    fn is_pressed(&self) -> bool {
        self.input.is_low()
    }
}

/// Input source polling a fixed set of button pins.
pub struct ButtonInputSource<'d, const N: usize> {
    pins: [ButtonPin<'d>; N],
    mask: Buttons,
    ticker: Ticker,
    last: Option<Buttons>,
}

impl<'d, const N: usize> ButtonInputSource<'d, N> {
    #[must_use]
    pub fn new(pins: [ButtonPin<'d>; N]) -> Self {
        let mask = pins
            .iter()
            .fold(Buttons::NONE, |mask, pin| mask | pin.button);
        Self {
            pins,
            mask,
            ticker: Ticker::every(POLL_INTERVAL),
            last: None,
        }
    }

    /// Buttons currently held.
    #[must_use]
    pub fn sample(&self) -> Buttons {
        self.pins
            .iter()
            .filter(|pin| pin.is_pressed())
            .fold(Buttons::NONE, |value, pin| value | pin.button)
    }
}

impl<const N: usize> InputSource for ButtonInputSource<'_, N> {
    async fn receive(&mut self) -> Result<InputEvent, InputError> {
        loop {
            self.ticker.next().await;
            let value = self.sample();
            if self.last != Some(value) {
                self.last = Some(value);
                return Ok(InputEvent::Buttons(ButtonSample {
                    value,
                    mask: self.mask,
                }));
            }
        }
    }

    fn is_connected(&self) -> bool {
        true
    }
}
