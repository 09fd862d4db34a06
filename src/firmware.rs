//! ESP-IDF firmware
//!
//! # Tasks
//!
//! ```text
//! Timer ISR (19.5 kHz) ──notify──▶ RT task (Core 0, prio 20)
//!                                    TickLatch ─▶ SampleDispatcher ─▶ MCP4921
//!
//! Main task (Core 1)
//!   ControlLoop: keypad ─▶ ControlState ─▶ LCD
//!   Console:     UART0  ─▶ ControlState
//!   Log drain:   RT_LOG_STREAM, BG_LOG_STREAM ─▶ UART0
//! ```
//!
//! SPI transactions cannot run inside the ISR, so the ISR only notifies;
//! the RT task raises the latch and runs the dispatcher. The DAC frame is
//! queued to the SPI driver and never waited for: if the previous frame
//! has not finished by the next tick, that tick's sample is dropped.
//!
//! # Pins (ESP32 DevKitC)
//!
//! | Function        | GPIO               |
//! |-----------------|--------------------|
//! | DAC SCK/SDI/CS  | 18 / 23 / 5        |
//! | LCD RS/E        | 13 / 12            |
//! | LCD D4..D7      | 14, 27, 26, 25     |
//! | Keypad rows     | 32, 33, 15, 4      |
//! | Keypad columns  | 19, 21, 22 (pull-up) |
//! | Console UART0   | TX 1 / RX 3        |

use core::fmt::Write;
use core::num::NonZeroU32;

use esp_idf_svc::hal::cpu::Core;
use esp_idf_svc::hal::delay::{Ets, BLOCK, NON_BLOCK};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, IOPin, Input, Output, OutputPin, PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_svc::hal::task::notification::Notification;
use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;
use esp_idf_svc::hal::timer::{config::Config as TimerConfig, TimerDriver};
use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{
    esp_err_t, spi_device_get_trans_result, spi_device_queue_trans, spi_transaction_t, EspError,
    ESP_ERR_TIMEOUT, SPI_TRANS_USE_TXDATA,
};

use embedded_hal::spi::{ErrorKind, ErrorType};
use embedded_hal_nb::spi::FullDuplex;

use rust_wavegen::config::TICK_RATE_HZ;
use rust_wavegen::console::Console;
use rust_wavegen::hal::{Hd44780, MatrixKeypad, Mcp4921};
use rust_wavegen::{
    fault, log_drain, rt_error, rt_info, ControlLoop, ControlState, DacCalibration, InitError,
    SampleDispatcher, TickLatch, BG_LOG_STREAM, RT_LOG_STREAM,
};

type OutPin = PinDriver<'static, AnyOutputPin, Output>;
type InPin = PinDriver<'static, AnyIOPin, Input>;

/// Raised by the RT task on every notification
static TICK: TickLatch = TickLatch::new();

const DAC_SPI_HZ: u32 = 10_000_000;
const CONSOLE_BAUD: u32 = 115_200;
const RT_STACK: usize = 4096;
const RT_PRIORITY: u8 = 20;

fn timestamp_us() -> i64 {
    // SAFETY: reads a monotonic counter, no preconditions
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// `fmt::Write` over the console UART
struct UartOut<'a>(&'a UartDriver<'static>);

impl Write for UartOut<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let n = self.0.write(bytes).map_err(|_| core::fmt::Error)?;
            bytes = &bytes[n..];
        }
        Ok(())
    }
}

/// Bring everything up, then run the foreground forever.
///
/// Any init failure is logged and halts with the output silent.
pub fn run(state: &'static ControlState) -> ! {
    esp_idf_svc::sys::link_patches();

    match start(state) {
        Ok(never) => match never {},
        Err(e) => {
            rt_error!(BG_LOG_STREAM, timestamp_us(), "init failed: {}", e);
            log_drain::drain_all(&mut StdOut);
            fault::halt()
        }
    }
}

/// stdout fallback used before the console UART exists
struct StdOut;

impl Write for StdOut {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        use std::io::Write as _;
        std::io::stdout().write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

fn start(state: &'static ControlState) -> Result<core::convert::Infallible, InitError> {
    let p = Peripherals::take().map_err(|_| InitError::Clock)?;
    let pins = p.pins;

    // --- DAC on SPI2 ---
    let spi = SpiDriver::new(
        p.spi2,
        pins.gpio18,
        pins.gpio23,
        Option::<AnyIOPin>::None,
        &SpiDriverConfig::new(),
    )
    .map_err(|_| InitError::Spi)?;
    let dac_device = SpiDeviceDriver::new(
        spi,
        Some(pins.gpio5),
        &SpiConfig::new().baudrate(Hertz(DAC_SPI_HZ)),
    )
    .map_err(|_| InitError::Spi)?;
    let dac = Mcp4921::new(QueuedSpi::new(dac_device));

    // --- Tick timer ---
    let timer = TimerDriver::new(p.timer00, &TimerConfig::new().auto_reload(true))
        .map_err(|_| InitError::Timer)?;

    // --- RT task, Core 0 ---
    ThreadSpawnConfiguration {
        name: Some(b"wavegen-rt\0"),
        stack_size: RT_STACK,
        priority: RT_PRIORITY,
        pin_to_core: Some(Core::Core0),
        ..Default::default()
    }
    .set()
    .map_err(|_| InitError::Task)?;
    std::thread::Builder::new()
        .stack_size(RT_STACK)
        .spawn(move || rt_task(state, timer, dac))
        .map_err(|_| InitError::Task)?;
    ThreadSpawnConfiguration::default()
        .set()
        .map_err(|_| InitError::Task)?;

    // --- LCD ---
    let lcd_pins = [
        output(pins.gpio14.downgrade_output())?,
        output(pins.gpio27.downgrade_output())?,
        output(pins.gpio26.downgrade_output())?,
        output(pins.gpio25.downgrade_output())?,
    ];
    let rs = output(pins.gpio13.downgrade_output())?;
    let en = output(pins.gpio12.downgrade_output())?;
    let mut lcd = Hd44780::new(rs, en, lcd_pins, Ets);
    lcd.init().map_err(|_| InitError::Display)?;

    // --- Keypad ---
    let rows = [
        output(pins.gpio32.downgrade_output())?,
        output(pins.gpio33.downgrade_output())?,
        output(pins.gpio15.downgrade_output())?,
        output(pins.gpio4.downgrade_output())?,
    ];
    let cols = [
        input(pins.gpio19.downgrade())?,
        input(pins.gpio21.downgrade())?,
        input(pins.gpio22.downgrade())?,
    ];
    let keypad = MatrixKeypad::new(rows, cols, Ets);

    // --- Console UART ---
    let uart = UartDriver::new(
        p.uart0,
        pins.gpio1,
        pins.gpio3,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(CONSOLE_BAUD)),
    )
    .map_err(|_| InitError::Gpio)?;

    rt_info!(BG_LOG_STREAM, timestamp_us(), "{}", rust_wavegen::console::VERSION);

    let mut control = ControlLoop::new(state, keypad, lcd, Ets);
    control.start();

    let mut console = Console::new(state);
    let mut out = UartOut(&uart);
    console.print_banner(&mut out);

    let mut rx = [0u8; 16];
    loop {
        control.poll(timestamp_us());

        if let Ok(n) = uart.read(&mut rx, NON_BLOCK) {
            for &b in &rx[..n] {
                if let Some(Ok(())) = console.process_byte(b, &mut out) {
                    control.refresh();
                }
            }
        }

        log_drain::drain_all(&mut out);
    }
}

fn output(pin: AnyOutputPin) -> Result<OutPin, InitError> {
    PinDriver::output(pin).map_err(|_| InitError::Gpio)
}

fn input(pin: AnyIOPin) -> Result<InPin, InitError> {
    let mut driver = PinDriver::input(pin).map_err(|_| InitError::Gpio)?;
    driver.set_pull(Pull::Up).map_err(|_| InitError::Gpio)?;
    Ok(driver)
}

/// Real-time task: wait for the timer, dispatch one sample
fn rt_task(state: &'static ControlState, mut timer: TimerDriver<'static>, dac: Mcp4921<QueuedSpi>) {
    let notification = Notification::new();
    let notifier = notification.notifier();

    let armed = (|| {
        timer.set_alarm(timer.tick_hz() / TICK_RATE_HZ as u64)?;
        // SAFETY: the callback only notifies this task; it captures nothing
        // that outlives the timer.
        unsafe {
            timer.subscribe(move || {
                notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }
        timer.enable_interrupt()?;
        timer.enable_alarm(true)?;
        timer.enable(true)
    })();

    if let Err(e) = armed {
        rt_error!(RT_LOG_STREAM, timestamp_us(), "tick timer failed: {}", e);
        fault::halt();
    }

    rt_info!(RT_LOG_STREAM, timestamp_us(), "tick running at {} Hz", TICK_RATE_HZ);

    let mut dispatcher = SampleDispatcher::new(state, dac, DacCalibration::DEFAULT);
    loop {
        if notification.wait(BLOCK).is_some() {
            TICK.raise();
        }
        let mut timer = &TICK;
        dispatcher.on_tick(&mut timer);
    }
}

/// DAC bus: at most one queued 16-bit transaction
///
/// `write` queues and returns at once. Until the driver hands the previous
/// descriptor back, `write` answers `WouldBlock`. Chip select is driven by
/// the SPI peripheral.
struct QueuedSpi {
    device: SpiDeviceDriver<'static, SpiDriver<'static>>,
    // Boxed: the driver holds a pointer to it while the frame is in flight
    trans: Box<spi_transaction_t>,
    in_flight: bool,
}

// SAFETY: the descriptor's raw pointers are only handed to the SPI driver
// by the task that owns this value.
unsafe impl Send for QueuedSpi {}

impl QueuedSpi {
    fn new(device: SpiDeviceDriver<'static, SpiDriver<'static>>) -> Self {
        Self {
            device,
            // SAFETY: all-zero is the documented initial state of a descriptor
            trans: Box::new(unsafe { core::mem::zeroed() }),
            in_flight: false,
        }
    }

    /// Take the previous descriptor back without waiting
    fn poll_done(&mut self) -> nb::Result<(), ErrorKind> {
        if !self.in_flight {
            return Ok(());
        }
        let mut done: *mut spi_transaction_t = core::ptr::null_mut();
        // SAFETY: zero timeout; `done` is an out-parameter only
        let err = unsafe { spi_device_get_trans_result(self.device.device(), &mut done, 0) };
        if err == ESP_ERR_TIMEOUT as esp_err_t {
            return Err(nb::Error::WouldBlock);
        }
        self.in_flight = false;
        EspError::convert(err).map_err(|_| nb::Error::Other(ErrorKind::Other))
    }
}

impl ErrorType for QueuedSpi {
    type Error = ErrorKind;
}

impl FullDuplex<u16> for QueuedSpi {
    // The MCP4921 has no data output: a read completes with 0 once the
    // frame is out.
    fn read(&mut self) -> nb::Result<u16, ErrorKind> {
        self.poll_done().map(|()| 0)
    }

    fn write(&mut self, word: u16) -> nb::Result<(), ErrorKind> {
        self.poll_done()?;

        let [hi, lo] = word.to_be_bytes();
        self.trans.flags = SPI_TRANS_USE_TXDATA;
        self.trans.length = 16;
        self.trans.__bindgen_anon_1.tx_data = [hi, lo, 0, 0];

        // SAFETY: the boxed descriptor is not touched again until
        // `poll_done` has taken it back from the driver.
        let err = unsafe { spi_device_queue_trans(self.device.device(), &mut *self.trans, 0) };
        if err == ESP_ERR_TIMEOUT as esp_err_t {
            return Err(nb::Error::WouldBlock);
        }
        EspError::convert(err).map_err(|_| nb::Error::Other(ErrorKind::Other))?;
        self.in_flight = true;
        Ok(())
    }
}
