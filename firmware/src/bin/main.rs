#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::State;
use embassy_usb::Builder;
use procon_firmware::{
    configure_usb_hid, usb_config, EmbassyClock, InputPipeline, InputTranslator,
    ProconRequestHandler, ProtocolEngine, SignalSink, SignalSource, SnapshotSignal,
    UsbStateHandler, UsbTransport,
};
use procon_core::DEFAULT_ENGINE;
use static_cell::StaticCell;

#[cfg(feature = "input-relay")]
use embassy_rp::peripherals::UART1;
#[cfg(feature = "input-relay")]
use embassy_rp::uart::{Config as UartConfig, Uart};
#[cfg(feature = "input-relay")]
use procon_firmware::input::relay::BAUD_RATE;
#[cfg(feature = "input-relay")]
use procon_firmware::RelayInputSource;

#[cfg(feature = "input-buttons")]
use procon_core::Buttons;
#[cfg(feature = "input-buttons")]
use procon_firmware::{ButtonInputSource, ButtonPin};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

#[cfg(feature = "input-relay")]
bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

#[cfg(feature = "input-buttons")]
bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

#[cfg(feature = "input-relay")]
type ActiveInput = RelayInputSource<'static>;
#[cfg(feature = "input-buttons")]
type ActiveInput = ButtonInputSource<'static, 8>;

type Pipeline = InputPipeline<ActiveInput, SignalSink<'static>>;
type Engine = ProtocolEngine<UsbTransport<'static>, EmbassyClock, SignalSource<'static>>;

/// Latest controller snapshot, published on core 1 and read on core 0.
static SNAPSHOT_SIGNAL: StaticCell<SnapshotSignal> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state and handlers.
static HID_STATE: StaticCell<State> = StaticCell::new();
static REQUEST_HANDLER: StaticCell<ProconRequestHandler> = StaticCell::new();
static STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

/// Core 1 stack and executor.
static CORE1_STACK: StaticCell<Stack<4096>> = StaticCell::new();
static CORE1_EXECUTOR: StaticCell<Executor> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pro Controller emulator starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal: &'static SnapshotSignal = SNAPSHOT_SIGNAL.init(SnapshotSignal::new());

    // --- Input Setup ---
    #[cfg(feature = "input-relay")]
    let input: ActiveInput = {
        let mut uart_config = UartConfig::default();
        uart_config.baudrate = BAUD_RATE;

        let uart = Uart::new(
            p.UART1,
            p.PIN_8, // TX
            p.PIN_9, // RX
            Irqs,
            p.DMA_CH0,
            p.DMA_CH1,
            uart_config,
        );
        let (_tx, rx) = uart.split();
        RelayInputSource::new(rx)
    };

    #[cfg(feature = "input-buttons")]
    let input: ActiveInput = ButtonInputSource::new([
        ButtonPin::new(p.PIN_2, Buttons::A),
        ButtonPin::new(p.PIN_3, Buttons::B),
        ButtonPin::new(p.PIN_4, Buttons::X),
        ButtonPin::new(p.PIN_5, Buttons::Y),
        ButtonPin::new(p.PIN_6, Buttons::PLUS),
        ButtonPin::new(p.PIN_7, Buttons::MINUS),
        ButtonPin::new(p.PIN_10, Buttons::HOME),
        ButtonPin::new(p.PIN_11, Buttons::CAPTURE),
    ]);

    let pipeline = InputPipeline::new(input, SignalSink::new(signal), InputTranslator::default());

    // Optional: LED for error indication (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config(),
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let request_handler = REQUEST_HANDLER.init(ProconRequestHandler);
    let state_handler = STATE_HANDLER.init(UsbStateHandler);
    let hid = configure_usb_hid(&mut builder, hid_state, request_handler, state_handler);

    // Build the USB device
    let usb_device = builder.build();

    let engine = ProtocolEngine::new(
        UsbTransport::new(hid),
        EmbassyClock::new(),
        SignalSource::new(signal),
        &DEFAULT_ENGINE,
    );

    // --- Core 1: input ---
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor = CORE1_EXECUTOR.init(Executor::new());
        executor.run(|spawner| spawner.spawn(input_task(pipeline, led).unwrap()))
    });

    // --- Core 0: USB and protocol ---
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(engine_task(engine).unwrap());

    info!("Pro Controller emulator initialized, waiting for host...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Engine task - answers host commands and streams standard reports.
#[embassy_executor::task]
async fn engine_task(mut engine: Engine) {
    // Wait for USB to be ready
    engine.transport_mut().wait_ready().await;
    info!("USB HID ready, waiting for handshake...");

    engine.run().await
}

/// Input task - translates input events and publishes snapshots.
#[embassy_executor::task]
async fn input_task(mut pipeline: Pipeline, mut led: Output<'static>) {
    loop {
        if let Err(e) = pipeline.process_one().await {
            warn!("Input error: {:?}", e);
            // Toggle LED to indicate error
            led.toggle();
        }
    }
}
