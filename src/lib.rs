#![no_std]
//! Driver for I2C character LCD modules with an RGB backlight, like the DFRobot [RGB1602]
//! with 16x2 characters. The module carries two chips on the same bus: an HD44780 compatible
//! display controller and a PWM LED driver for the backlight. It requires an I2C instance
//! implementing [`embedded_hal::i2c::I2c`] and an instance to delay execution with
//! [`embedded_hal::delay::DelayNs`].
//!
//! Usage:
//! ```ignore
//! // Create a I2C instance, needs to implement embedded_hal::i2c::I2c, this
//! // particular uses the arduino_hal crate for avr microcontrollers like the arduinos.
//! let dp = arduino_hal::Peripherals::take().unwrap();
//! let pins = arduino_hal::pins!(dp);
//! let mut i2c = arduino_hal::I2c::new(
//!     dp.TWI, //
//!     pins.a4.into_pull_up_input(), // use respective pins
//!     pins.a5.into_pull_up_input(),
//!     50000,
//! );
//! let mut delay = arduino_hal::Delay::new();
//!
//! let mut lcd = lcd_rgb1602_i2c::sync_lcd::Lcd::new(&mut i2c, &mut delay, 16, 2)
//!     .init()
//!     .unwrap();
//! lcd.set_color(lcd_rgb1602_i2c::Color::Green as u8).unwrap();
//! lcd.set_cursor(3, 1).unwrap();
//! ufmt::uwrite!(lcd, "t={}", 42).unwrap();
//! ```
//!
//! Both chips use fixed addresses, [`LCD_ADDRESS`] and [`RGB_ADDRESS`]. Builders on the
//! controller override them for modules with modified address straps.
//!
//! [RGB1602]: https://wiki.dfrobot.com/Gravity__I2C_LCD1602_RGB_Backlight_Module_SKU__DFR0464

#[cfg(feature = "async")]
pub mod async_lcd;
pub mod sync_lcd;

/// Default I2C address of the display controller.
pub const LCD_ADDRESS: u8 = 0x7c >> 1;
/// Default I2C address of the backlight controller.
pub const RGB_ADDRESS: u8 = 0xc0 >> 1;

/// Backlight controller registers.
mod reg {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    pub const BLUE: u8 = 0x02; // pwm0
    pub const GREEN: u8 = 0x03; // pwm1
    pub const RED: u8 = 0x04; // pwm2
    pub const GRPPWM: u8 = 0x06;
    pub const GRPFREQ: u8 = 0x07;
    pub const LEDOUT: u8 = 0x08;
}

/// Sequence written to the backlight controller during `begin`.
///
/// MODE1 cleared to wake the oscillator, every LED driven by both PWM and GRPPWM, and
/// DMBLNK set in MODE2 so the group registers control blinking.
const BACKLIGHT_INIT: [(u8, u8); 3] = [(reg::MODE1, 0x00), (reg::LEDOUT, 0xff), (reg::MODE2, 0x20)];

/// Blink period in seconds is `(GRPFREQ + 1) / 24`, on/off ratio is `GRPPWM / 256`.
const BLINK_ON: [(u8, u8); 2] = [(reg::GRPFREQ, 0x17), (reg::GRPPWM, 0x7f)];
const BLINK_OFF: [(u8, u8); 2] = [(reg::GRPFREQ, 0x00), (reg::GRPPWM, 0xff)];

/// First byte of every transfer to the display controller.
#[repr(u8)]
#[derive(Copy, Clone)]
enum ControlByte {
    Cmd = 0x80,
    Data = 0x40,
}

#[repr(u8)]
#[derive(Copy, Clone)]
enum Mode {
    EntrySet = 0x04,
    DisplayControl = 0x08,
    CursorShift = 0x10,
    FunctionSet = 0x20,
    CGRAMAddr = 0x40,
}

enum Commands {
    Clear = 0x01,
    ReturnHome = 0x02,
}

#[repr(u8)]
#[derive(Copy, Clone)]
pub enum DisplayControl {
    Off = 0x00,
    CursorBlink = 0x01,
    CursorOn = 0x02,
    DisplayOn = 0x04,
}

enum BitMode {
    Bit4 = 0x0 << 4,
}

enum Lines {
    One = 0x00,
    Two = 0x08,
}

/// Character height. The 5x10 font is only honoured on single line displays.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    Font5x8 = 0x00,
    Font5x10 = 0x04,
}

#[repr(u8)]
#[derive(Copy, Clone)]
enum EntryFlag {
    Left = 0x02,
    ShiftIncrement = 0x01,
}

#[repr(u8)]
#[derive(Copy, Clone)]
enum ShiftFlag {
    DisplayMove = 0x08,
    MoveLeft = 0x00,
    MoveRight = 0x04,
}

/// Backlight colour presets, numbered as accepted by `set_color`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    White = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
}

impl Color {
    /// Preset for a raw colour index, `None` above 3.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Color::White),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Blue),
            _ => None,
        }
    }

    /// `(red, green, blue)` duty cycles.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::White => (255, 255, 255),
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
        }
    }
}

/// The three persistent flag bytes of the display controller. Every mode command carries the
/// whole byte, so toggles only ever touch their own bit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct ModeFlags {
    function: u8,
    control: u8,
    entry: u8,
}

impl ModeFlags {
    fn reset_function(&mut self) {
        self.function = BitMode::Bit4 as u8 | Lines::One as u8 | Font::Font5x8 as u8;
    }

    fn apply_geometry(&mut self, rows: u8, font: Font) {
        if rows > 1 {
            self.function |= Lines::Two as u8;
        }
        // some single line displays can select a 10 pixel high font
        if font != Font::Font5x8 && rows == 1 {
            self.function |= Font::Font5x10 as u8;
        }
    }

    fn reset_control(&mut self) {
        self.control = DisplayControl::DisplayOn as u8 | DisplayControl::Off as u8;
    }

    fn reset_entry(&mut self) {
        self.entry = EntryFlag::Left as u8;
    }

    fn set_control(&mut self, flag: DisplayControl, on: bool) -> u8 {
        if on {
            self.control |= flag as u8;
        } else {
            self.control &= !(flag as u8);
        }
        self.control_cmd()
    }

    fn set_entry(&mut self, flag: EntryFlag, on: bool) -> u8 {
        if on {
            self.entry |= flag as u8;
        } else {
            self.entry &= !(flag as u8);
        }
        self.entry_cmd()
    }

    fn function_cmd(&self) -> u8 {
        Mode::FunctionSet as u8 | self.function
    }

    fn control_cmd(&self) -> u8 {
        Mode::DisplayControl as u8 | self.control
    }

    fn entry_cmd(&self) -> u8 {
        Mode::EntrySet as u8 | self.entry
    }
}

fn shift_cmd(dir: ShiftFlag) -> u8 {
    Mode::CursorShift as u8 | ShiftFlag::DisplayMove as u8 | dir as u8
}

/// CGRAM address command for a glyph slot, wrapping slots above 7.
fn cgram_cmd(location: u8) -> u8 {
    Mode::CGRAMAddr as u8 | ((location & 0x7) << 3)
}

/// DDRAM address for (col, row). Only two physical rows are addressed, every row above 0
/// lands on the second line.
fn ddram_addr(col: u8, row: u8) -> u8 {
    if row == 0 {
        col | 0x80
    } else {
        col | 0xc0
    }
}

fn glyph_payload(charmap: &[u8; 8]) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[0] = ControlByte::Data as u8;
    data[1..].copy_from_slice(charmap);
    data
}
