//! USB HID transport: the Pro Controller interface towards the console.

use defmt::{debug, info, trace, warn};
use embassy_futures::join::join;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::hid::{
    HidBootProtocol, HidReader, HidReaderWriter, HidSubclass, HidWriter, ReadError, ReportId,
    RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config as UsbConfig, Handler};
use portable_atomic::{AtomicBool, Ordering};
use procon_core::{Transport, TransportError};
use procon_proto::{InboundFrame, ResponseFrame, FRAME_LEN};

/// Nintendo vendor ID.
pub const VENDOR_ID: u16 = 0x057E;

/// Pro Controller product ID.
pub const PRODUCT_ID: u16 = 0x2009;

/// Interrupt endpoint polling interval.
pub const POLL_MS: u8 = 8;

/// Queued control-pipe commands.
pub const CONTROL_QUEUE_DEPTH: usize = 4;

/// Set while the host has the device configured.
static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Commands received through SET_REPORT, waiting for the engine.
static CONTROL_FRAMES: Channel<CriticalSectionRawMutex, InboundFrame, CONTROL_QUEUE_DEPTH> =
    Channel::new();

/// Pro Controller HID report descriptor.
///
/// Input reports 0x30 (standard), 0x21 (subcommand reply) and 0x81
/// (handshake reply); output reports 0x01 (subcommand), 0x10 (rumble),
/// 0x80 and 0x82 (handshake). Every report is 64 bytes including its ID.
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x15, 0x00, // Logical Minimum (0)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    // --- 0x30: standard input report ---
    0x85, 0x30, //   Report ID (48)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x0A, //   Usage Maximum (Button 10)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x0A, //   Report Count (10)
    0x55, 0x00, //   Unit Exponent (0)
    0x65, 0x00, //   Unit (None)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x0B, //   Usage Minimum (Button 11)
    0x29, 0x0E, //   Usage Maximum (Button 14)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x03, //   Input (Constant, Variable, Absolute)
    //
    0x0B, 0x01, 0x00, 0x01, 0x00, //   Usage (Pointer)
    0xA1, 0x00,                   //   Collection (Physical)
    0x0B, 0x30, 0x00, 0x01, 0x00, //     Usage (X)
    0x0B, 0x31, 0x00, 0x01, 0x00, //     Usage (Y)
    0x0B, 0x32, 0x00, 0x01, 0x00, //     Usage (Z)
    0x0B, 0x35, 0x00, 0x01, 0x00, //     Usage (Rz)
    0x15, 0x00,                   //     Logical Minimum (0)
    0x27, 0xFF, 0xFF, 0x00, 0x00, //     Logical Maximum (65535)
    0x75, 0x10,                   //     Report Size (16)
    0x95, 0x04,                   //     Report Count (4)
    0x81, 0x02,                   //     Input (Data, Variable, Absolute)
    0xC0,                         //   End Collection
    //
    0x0B, 0x39, 0x00, 0x01, 0x00, //   Usage (Hat Switch)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x07,                   //   Logical Maximum (7)
    0x35, 0x00,                   //   Physical Minimum (0)
    0x46, 0x3B, 0x01,             //   Physical Maximum (315)
    0x65, 0x14,                   //   Unit (Degrees)
    0x75, 0x04,                   //   Report Size (4)
    0x95, 0x01,                   //   Report Count (1)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x05, 0x09,                   //   Usage Page (Button)
    0x19, 0x0F,                   //   Usage Minimum (Button 15)
    0x29, 0x12,                   //   Usage Maximum (Button 18)
    0x15, 0x00,                   //   Logical Minimum (0)
    0x25, 0x01,                   //   Logical Maximum (1)
    0x75, 0x01,                   //   Report Size (1)
    0x95, 0x04,                   //   Report Count (4)
    0x81, 0x02,                   //   Input (Data, Variable, Absolute)
    0x75, 0x08,                   //   Report Size (8)
    0x95, 0x34,                   //   Report Count (52)
    0x81, 0x03,                   //   Input (Constant, Variable, Absolute)
    //
    // --- 0x21: subcommand reply ---
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x85, 0x21,       //   Report ID (33)
    0x09, 0x01,       //   Usage (0x01)
    0x75, 0x08,       //   Report Size (8)
    0x95, 0x3F,       //   Report Count (63)
    0x81, 0x03,       //   Input (Constant, Variable, Absolute)
    //
    // --- 0x81: handshake reply ---
    0x85, 0x81, //   Report ID (129)
    0x09, 0x02, //   Usage (0x02)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x3F, //   Report Count (63)
    0x81, 0x03, //   Input (Constant, Variable, Absolute)
    //
    // --- 0x01: subcommand ---
    0x85, 0x01, //   Report ID (1)
    0x09, 0x03, //   Usage (0x03)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x3F, //   Report Count (63)
    0x91, 0x83, //   Output (Constant, Variable, Absolute, Volatile)
    //
    // --- 0x10: rumble ---
    0x85, 0x10, //   Report ID (16)
    0x09, 0x04, //   Usage (0x04)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x3F, //   Report Count (63)
    0x91, 0x83, //   Output (Constant, Variable, Absolute, Volatile)
    //
    // --- 0x80: handshake ---
    0x85, 0x80, //   Report ID (128)
    0x09, 0x05, //   Usage (0x05)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x3F, //   Report Count (63)
    0x91, 0x83, //   Output (Constant, Variable, Absolute, Volatile)
    //
    // --- 0x82 ---
    0x85, 0x82, //   Report ID (130)
    0x09, 0x06, //   Usage (0x06)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x3F, //   Report Count (63)
    0x91, 0x83, //   Output (Constant, Variable, Absolute, Volatile)
    //
    0xC0, // End Collection
];

type UsbDriver<'d> = Driver<'d, USB>;

/// USB HID transport.
///
/// Commands arrive as output reports with the report ID in byte 0, either
/// on the interrupt OUT endpoint or through a control SET_REPORT queued by
/// [`ProconRequestHandler`]. Replies and standard reports leave as 64-byte
/// input reports.
pub struct UsbTransport<'d> {
    reader: HidReader<'d, UsbDriver<'d>, FRAME_LEN>,
    writer: HidWriter<'d, UsbDriver<'d>, FRAME_LEN>,
}

impl<'d> UsbTransport<'d> {
    /// Create a transport from the HID reader/writer pair.
    pub fn new(hid: HidReaderWriter<'d, UsbDriver<'d>, FRAME_LEN, FRAME_LEN>) -> Self {
        let (reader, writer) = hid.split();
        Self { reader, writer }
    }

    /// Wait until both endpoints are enabled (USB enumerated).
    pub async fn wait_ready(&mut self) {
        join(self.reader.ready(), self.writer.ready()).await;
    }
}

impl Transport for UsbTransport<'_> {
    async fn send(&mut self, frame: &ResponseFrame) -> Result<(), TransportError> {
        self.writer
            .write(frame.as_bytes())
            .await
            .map_err(endpoint_error_to_transport_error)
    }

    async fn receive(&mut self, buf: &mut [u8; FRAME_LEN]) -> Result<usize, TransportError> {
        let received = select(self.reader.read(buf), CONTROL_FRAMES.receive()).await;
        match received {
            Either::First(Ok(len)) => {
                trace!("recv {=[u8]:x}", &buf[..len]);
                Ok(len)
            }
            Either::First(Err(ReadError::Disabled)) => {
                // Park until the host enumerates again, then restart the handshake
                self.reader.ready().await;
                Err(TransportError::Disconnected)
            }
            Either::First(Err(_)) => Err(TransportError::Io),
            Either::Second(frame) => {
                trace!("recv (control) {=[u8]:x}", frame.as_slice());
                Ok(frame.copy_to(buf))
            }
        }
    }

    fn is_ready(&self) -> bool {
        CONFIGURED.load(Ordering::Relaxed)
    }
}

/// Convert endpoint errors to [`TransportError`].
///
/// A helper function instead of a `From` impl, as both types live in
/// external crates.
#[inline]
fn endpoint_error_to_transport_error(e: EndpointError) -> TransportError {
    match e {
        EndpointError::Disabled => TransportError::Disconnected,
        EndpointError::BufferOverflow => TransportError::Io,
    }
}

/// HID class request handler.
///
/// Output reports sent over the control pipe are queued for
/// [`UsbTransport::receive`], so they reach the same command path as the
/// interrupt endpoint. A report that cannot be queued is rejected.
pub struct ProconRequestHandler;

impl RequestHandler for ProconRequestHandler {
    fn get_report(&mut self, id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        debug!("get report {:?}", id);
        None
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        debug!("set report {:?}: {=[u8]:x}", id, data);
        if !matches!(id, ReportId::Out(_)) {
            return OutResponse::Rejected;
        }
        let Some(frame) = InboundFrame::from_slice(data) else {
            warn!("set report of {} bytes rejected", data.len());
            return OutResponse::Rejected;
        };
        match CONTROL_FRAMES.try_send(frame) {
            Ok(()) => OutResponse::Accepted,
            Err(_) => {
                warn!("control command queue full");
                OutResponse::Rejected
            }
        }
    }

    fn set_idle_ms(&mut self, id: Option<ReportId>, duration_ms: u32) {
        debug!("set idle {:?} {} ms", id, duration_ms);
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Device state handler; tracks whether the host has configured us.
pub struct UsbStateHandler;

impl Handler for UsbStateHandler {
    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
        CONTROL_FRAMES.clear();
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        CONFIGURED.store(configured, Ordering::Relaxed);
    }

    fn suspended(&mut self, suspended: bool) {
        if suspended {
            CONFIGURED.store(false, Ordering::Relaxed);
        }
    }
}

/// USB device configuration presenting as a wired Pro Controller.
#[must_use]
pub fn usb_config() -> UsbConfig<'static> {
    let mut config = UsbConfig::new(VENDOR_ID, PRODUCT_ID);
    config.manufacturer = Some("Nintendo Co., Ltd.");
    config.product = Some("Pro Controller");
    config.serial_number = Some("000000000001");
    config.device_release = 0x0200;
    config.max_power = 500;
    config.max_packet_size_0 = 64;
    config
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID reader/writer pair for [`UsbTransport::new`].
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
    request_handler: &'d mut ProconRequestHandler,
    state_handler: &'d mut UsbStateHandler,
) -> HidReaderWriter<'d, UsbDriver<'d>, FRAME_LEN, FRAME_LEN> {
    builder.handler(state_handler);

    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(request_handler),
        poll_ms: POLL_MS,
        max_packet_size: FRAME_LEN as u16,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    HidReaderWriter::new(builder, state, config)
}
