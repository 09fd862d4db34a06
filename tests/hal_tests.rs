//! Driver tests against mock SPI and GPIO buses

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::spi;
use embedded_hal_nb::spi::FullDuplex;

use rust_wavegen::display::render_status;
use rust_wavegen::hal::{Hd44780, LcdError, MatrixKeypad, Mcp4921};
use rust_wavegen::{
    CharLcd, ControlState, DacCalibration, DacCode, Display, Key, Keypad, Params,
    SampleDispatcher, SampleSink, Shape, TickLatch, TickOutcome,
};

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ============================================================================
// MCP4921
// ============================================================================

/// SPI bus with one frame in flight until `finish` is called
#[derive(Default)]
struct MockSpi {
    words: Vec<u16>,
    in_flight: bool,
    fail: bool,
}

impl MockSpi {
    fn finish(&mut self) {
        self.in_flight = false;
    }
}

impl spi::ErrorType for MockSpi {
    type Error = spi::ErrorKind;
}

impl FullDuplex<u16> for MockSpi {
    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        if self.in_flight {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(0)
        }
    }

    fn write(&mut self, word: u16) -> nb::Result<(), Self::Error> {
        if self.fail {
            return Err(nb::Error::Other(spi::ErrorKind::Other));
        }
        if self.in_flight {
            return Err(nb::Error::WouldBlock);
        }
        self.words.push(word);
        self.in_flight = true;
        Ok(())
    }
}

fn finish(dac: Mcp4921<MockSpi>) -> Mcp4921<MockSpi> {
    let mut spi = dac.release();
    spi.finish();
    Mcp4921::new(spi)
}

#[test]
fn test_dac_writes_one_word_per_sample() {
    let mut dac = Mcp4921::new(MockSpi::default());

    for raw in [0, 0xABC, 0xFFF] {
        assert!(dac.try_send(DacCode::saturating(raw)));
        dac = finish(dac);
    }

    assert_eq!(dac.release().words, vec![0x3000, 0x3ABC, 0x3FFF]);
}

#[test]
fn test_dac_frame_in_flight_is_busy() {
    let mut dac = Mcp4921::new(MockSpi::default());

    assert!(dac.try_send(DacCode::saturating(100)));
    assert!(!dac.try_send(DacCode::saturating(200)));
    assert_eq!(dac.errors(), 0);

    dac = finish(dac);
    assert!(dac.try_send(DacCode::saturating(300)));
    assert_eq!(dac.release().words, vec![0x3000 | 100, 0x3000 | 300]);
}

#[test]
fn test_dac_bus_error_drops_sample() {
    let mut dac = Mcp4921::new(MockSpi {
        fail: true,
        ..Default::default()
    });

    assert!(!dac.try_send(DacCode::saturating(100)));
    assert!(!dac.try_send(DacCode::saturating(200)));
    assert_eq!(dac.errors(), 2);
    assert!(dac.release().words.is_empty());
}

fn tick(d: &mut SampleDispatcher<'_, Mcp4921<MockSpi>>, latch: &TickLatch) -> TickOutcome {
    latch.raise();
    let mut timer = latch;
    d.on_tick(&mut timer)
}

#[test]
fn test_tick_drops_sample_while_dac_busy() {
    let state = ControlState::new();
    let latch = TickLatch::new();
    let mut d = SampleDispatcher::new(&state, Mcp4921::new(MockSpi::default()), DacCalibration::DEFAULT);
    assert_eq!(tick(&mut d, &latch), TickOutcome::Sent(DacCode::saturating(3818)));
    // Previous frame still shifting out
    assert_eq!(tick(&mut d, &latch), TickOutcome::Dropped);
    assert_eq!(latch.clears(), 2);
}

// ============================================================================
// HD44780
// ============================================================================

#[derive(Clone, Copy)]
enum Role {
    Rs,
    En,
    Data(usize),
}

#[derive(Default)]
struct LcdBus {
    rs: bool,
    en: bool,
    data: [bool; 4],
    /// (rs, nibble) latched on each E falling edge
    nibbles: Vec<(bool, u8)>,
    fail: bool,
}

struct LcdPin {
    bus: Rc<RefCell<LcdBus>>,
    role: Role,
}

impl PinErrorType for LcdPin {
    type Error = digital::ErrorKind;
}

impl OutputPin for LcdPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

impl LcdPin {
    fn drive(&mut self, level: bool) -> Result<(), digital::ErrorKind> {
        let mut bus = self.bus.borrow_mut();
        if bus.fail {
            return Err(digital::ErrorKind::Other);
        }
        match self.role {
            Role::Rs => bus.rs = level,
            Role::Data(i) => bus.data[i] = level,
            Role::En => {
                if bus.en && !level {
                    let nibble = bus
                        .data
                        .iter()
                        .enumerate()
                        .fold(0u8, |acc, (i, &d)| acc | ((d as u8) << i));
                    let rs = bus.rs;
                    bus.nibbles.push((rs, nibble));
                }
                bus.en = level;
            }
        }
        Ok(())
    }
}

fn lcd_on(bus: &Rc<RefCell<LcdBus>>) -> Hd44780<LcdPin, NoDelay> {
    let pin = |role| LcdPin {
        bus: Rc::clone(bus),
        role,
    };
    Hd44780::new(
        pin(Role::Rs),
        pin(Role::En),
        [pin(Role::Data(0)), pin(Role::Data(1)), pin(Role::Data(2)), pin(Role::Data(3))],
        NoDelay,
    )
}

/// Pair up nibbles into (is_data, byte)
fn bytes(nibbles: &[(bool, u8)]) -> Vec<(bool, u8)> {
    nibbles
        .chunks(2)
        .map(|pair| {
            assert_eq!(pair[0].0, pair[1].0, "RS changed mid-byte");
            (pair[0].0, (pair[0].1 << 4) | pair[1].1)
        })
        .collect()
}

#[test]
fn test_lcd_init_sequence() {
    let bus = Rc::new(RefCell::new(LcdBus::default()));
    let mut lcd = lcd_on(&bus);
    assert_eq!(lcd.init(), Ok(()));

    let bus = bus.borrow();
    let reset: Vec<u8> = bus.nibbles[..4].iter().map(|&(_, n)| n).collect();
    assert_eq!(reset, vec![0x3, 0x3, 0x3, 0x2]);
    assert!(bus.nibbles[..4].iter().all(|&(rs, _)| !rs));

    assert_eq!(
        bytes(&bus.nibbles[4..]),
        vec![(false, 0x28), (false, 0x0C), (false, 0x01), (false, 0x06)]
    );
}

#[test]
fn test_lcd_init_reports_pin_error() {
    let bus = Rc::new(RefCell::new(LcdBus {
        fail: true,
        ..Default::default()
    }));
    let mut lcd = lcd_on(&bus);
    assert_eq!(lcd.init(), Err(LcdError::Pin));
}

#[test]
fn test_lcd_bus_carries_status_screen() {
    let bus = Rc::new(RefCell::new(LcdBus::default()));
    let mut lcd = lcd_on(&bus);
    lcd.init().unwrap();
    bus.borrow_mut().nibbles.clear();

    let params = Params {
        shape: Shape::Triangle,
        ..Params::DEFAULT
    };
    render_status(&mut lcd, &params);

    // Replay what crossed the wire into the in-memory model
    let mut replay = CharLcd::new();
    for (is_data, byte) in bytes(&bus.borrow().nibbles) {
        if is_data {
            replay.write_data(byte);
        } else {
            replay.write_command(byte);
        }
    }

    let mut expected = CharLcd::new();
    render_status(&mut expected, &params);
    assert_eq!(replay.row(0), expected.row(0));
    assert_eq!(replay.row(1), expected.row(1));
    assert!(replay.row(0).starts_with("TRI 100 Hz"));
}

// ============================================================================
// Matrix keypad
// ============================================================================

#[derive(Default)]
struct KeyBus {
    /// Row levels, true = high
    rows: [bool; 4],
    /// (row, column) held down
    pressed: Option<(usize, usize)>,
}

struct RowPin(Rc<RefCell<KeyBus>>, usize);
struct ColPin(Rc<RefCell<KeyBus>>, usize);

impl PinErrorType for RowPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for RowPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().rows[self.1] = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().rows[self.1] = true;
        Ok(())
    }
}

impl PinErrorType for ColPin {
    type Error = core::convert::Infallible;
}

impl InputPin for ColPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let bus = self.0.borrow();
        Ok(matches!(bus.pressed, Some((r, c)) if c == self.1 && !bus.rows[r]))
    }
}

type TestKeypad = MatrixKeypad<RowPin, ColPin, NoDelay>;

fn keypad_on(bus: &Rc<RefCell<KeyBus>>) -> TestKeypad {
    let rows = [0, 1, 2, 3].map(|r| RowPin(Rc::clone(bus), r));
    let cols = [0, 1, 2].map(|c| ColPin(Rc::clone(bus), c));
    MatrixKeypad::new(rows, cols, NoDelay)
}

#[test]
fn test_keypad_parks_rows_high() {
    let bus = Rc::new(RefCell::new(KeyBus::default()));
    let mut keypad = keypad_on(&bus);
    assert_eq!(bus.borrow().rows, [true; 4]);

    bus.borrow_mut().pressed = Some((2, 1));
    assert_eq!(keypad.scan(), Key::digit(8));
    assert_eq!(bus.borrow().rows, [true; 4]);
}

#[test]
fn test_keypad_layout() {
    let bus = Rc::new(RefCell::new(KeyBus::default()));
    let mut keypad = keypad_on(&bus);

    for (r, c, key) in [
        (0, 0, Key::digit(1).unwrap()),
        (1, 2, Key::digit(6).unwrap()),
        (3, 0, Key::Star),
        (3, 1, Key::digit(0).unwrap()),
        (3, 2, Key::Hash),
    ] {
        bus.borrow_mut().pressed = Some((r, c));
        assert_eq!(keypad.scan(), Some(key));
    }

    bus.borrow_mut().pressed = None;
    assert_eq!(keypad.scan(), None);
}

#[test]
fn test_keypad_reports_once_per_press() {
    let bus = Rc::new(RefCell::new(KeyBus::default()));
    let mut keypad = keypad_on(&bus);
    assert!(!keypad.key_available());

    bus.borrow_mut().pressed = Some((1, 1));
    assert!(keypad.key_available());
    assert_eq!(keypad.read_key(), Key::digit(5));

    // Still held
    assert!(!keypad.key_available());
    assert_eq!(keypad.read_key(), None);

    bus.borrow_mut().pressed = None;
    assert!(!keypad.key_available());

    bus.borrow_mut().pressed = Some((1, 1));
    assert_eq!(keypad.read_key(), Key::digit(5));
}

#[test]
fn test_keypad_roll_to_other_key() {
    let bus = Rc::new(RefCell::new(KeyBus::default()));
    let mut keypad = keypad_on(&bus);

    bus.borrow_mut().pressed = Some((3, 2));
    assert_eq!(keypad.read_key(), Some(Key::Hash));

    // Slide straight onto '*' without a release in between
    bus.borrow_mut().pressed = Some((3, 0));
    assert_eq!(keypad.read_key(), Some(Key::Star));
}
