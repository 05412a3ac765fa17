//! UART relay input source.
//!
//! A companion USB host reads the keyboard and mouse and forwards their
//! boot-protocol reports over UART, one relay frame per report:
//!
//! `[0xA5][kind][len][payload..][crc8]`
//!
//! See [`procon_proto::relay`] for the framing.
//!
//! The companion re-sends the latest keyboard report at least once a
//! second while idle. A repeated report carries no new edges, so it only
//! keeps the link alive. When nothing valid arrives for
//! [`CONNECTION_TIMEOUT`] the source reports [`InputError::Disconnected`]
//! and the pipeline releases every held input.
//!
//! # Pins
//!
//! Uses UART1 at 115200 baud, 8N1:
//! - GPIO 8: TX (unused)
//! - GPIO 9: RX

use embassy_rp::uart::{Async, Error as UartError, UartRx};
use embassy_time::{with_timeout, Duration, Instant};
use procon_core::{InputError, InputEvent, InputSource};
use procon_proto::{RelayMessage, RelayParser};

/// Relay baud rate.
pub const BAUD_RATE: u32 = 115_200;

/// Relay considered lost after this long without a valid frame.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Map a UART receive error onto the input error it surfaces as.
///
/// Neither type is local to this crate, so a plain function stands in for
/// a `From` impl.
#[inline]
fn uart_error_to_input_error(e: UartError) -> InputError {
    match e {
        UartError::Framing => InputError::Framing,
        UartError::Overrun => InputError::BufferOverflow,
        _ => InputError::Io,
    }
}

/// Input source reading relay frames from UART.
pub struct RelayInputSource<'d> {
    rx: UartRx<'d, Async>,
    parser: RelayParser,
    last_frame: Option<Instant>,
}

impl<'d> RelayInputSource<'d> {
    /// Create a new relay input source from the given UART receiver.
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            parser: RelayParser::new(),
            last_frame: None,
        }
    }

    /// Read bytes until the parser yields a complete frame.
    ///
    /// A UART error drops any partial frame so the parser resynchronises on
    /// the next sync byte.
    async fn read_frame(&mut self) -> Result<RelayMessage, InputError> {
        let mut byte = [0u8; 1];

        loop {
            if let Err(e) = self.rx.read(&mut byte).await {
                self.parser.reset();
                return Err(uart_error_to_input_error(e));
            }

            if let Some(message) = self.parser.push_byte(byte[0])? {
                self.last_frame = Some(Instant::now());
                return Ok(message);
            }
        }
    }
}

impl InputSource for RelayInputSource<'_> {
    async fn receive(&mut self) -> Result<InputEvent, InputError> {
        let frame = with_timeout(CONNECTION_TIMEOUT, self.read_frame()).await;
        let Ok(message) = frame else {
            // Silent link: forget any partial frame and let the pipeline
            // release held inputs
            self.parser.reset();
            return Err(InputError::Disconnected);
        };
        Ok(match message? {
            RelayMessage::Keyboard(report) => InputEvent::Keyboard(report),
            RelayMessage::Pointer(report) => InputEvent::Pointer(report),
        })
    }

    fn is_connected(&self) -> bool {
        if let Some(last) = self.last_frame {
            Instant::now().duration_since(last) < CONNECTION_TIMEOUT
        } else {
            false
        }
    }
}
