use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use ufmt_write::uWrite;

use crate::{
    cgram_cmd, ddram_addr, glyph_payload, reg, shift_cmd, Color, Commands, ControlByte,
    DisplayControl, EntryFlag, Font, ModeFlags, ShiftFlag, BACKLIGHT_INIT, BLINK_OFF, BLINK_ON,
    LCD_ADDRESS, RGB_ADDRESS,
};

/// API to write to the LCD and its RGB backlight.
pub struct Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    i2c: &'a mut I,
    delay: &'a mut D,
    lcd_address: u8,
    rgb_address: u8,
    cols: u8,
    rows: u8,
    num_lines: u8,
    flags: ModeFlags,
}

impl<'a, I, D> Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create new instance for a display with `cols` x `rows` characters at the default
    /// addresses. Nothing is sent until [`Lcd::init`].
    pub fn new(i2c: &'a mut I, delay: &'a mut D, cols: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            lcd_address: LCD_ADDRESS,
            rgb_address: RGB_ADDRESS,
            cols,
            rows,
            num_lines: 0,
            flags: ModeFlags::default(),
        }
    }

    /// Set I2C address of the display controller.
    pub fn with_lcd_address(mut self, address: u8) -> Self {
        self.lcd_address = address;
        self
    }

    /// Set I2C address of the backlight controller.
    pub fn with_rgb_address(mut self, address: u8) -> Self {
        self.rgb_address = address;
        self
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of lines configured by the last [`Lcd::begin`].
    pub fn num_lines(&self) -> u8 {
        self.num_lines
    }

    pub fn lcd_address(&self) -> u8 {
        self.lcd_address
    }

    pub fn rgb_address(&self) -> u8 {
        self.rgb_address
    }

    /// Current function-set flags, without the command bits.
    pub fn function_flags(&self) -> u8 {
        self.flags.function
    }

    /// Current display-control flags, without the command bits.
    pub fn display_control_flags(&self) -> u8 {
        self.flags.control
    }

    /// Current entry-mode flags, without the command bits.
    pub fn entry_mode_flags(&self) -> u8 {
        self.flags.entry
    }

    /// Initializes the hardware in 4 bit mode with the 5x8 font.
    pub fn init(mut self) -> Result<Self, I::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "lcd init {}x{} lcd={=u8:#x} rgb={=u8:#x}",
            self.cols,
            self.rows,
            self.lcd_address,
            self.rgb_address
        );
        self.flags.reset_function();
        self.begin(self.cols, self.rows, Font::Font5x8)?;
        Ok(self)
    }

    /// Runs the power-on sequence of the display, then sets up the backlight in white.
    ///
    /// Follows the HD44780 datasheet, page 45 figure 23. Timing is fixed because the busy flag
    /// cannot be read on this module.
    pub fn begin(&mut self, _cols: u8, rows: u8, font: Font) -> Result<(), I::Error> {
        self.flags.apply_geometry(rows, font);
        self.num_lines = rows;

        // At least 40ms after power rises above 2.7V before sending commands.
        self.delay.delay_ms(50);

        let function_set = self.flags.function_cmd();
        self.command(function_set)?;
        self.delay.delay_ms(5); // wait more than 4.1ms
        self.command(function_set)?;
        self.delay.delay_ms(5);
        self.command(function_set)?;

        self.flags.reset_control();
        self.display()?;
        self.clear()?;

        self.flags.reset_entry();
        self.command(self.flags.entry_cmd())?;

        self.set_regs(&BACKLIGHT_INIT)?;
        self.set_color_white()?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "lcd ready function={=u8:#x} control={=u8:#x} entry={=u8:#x}",
            self.flags.function,
            self.flags.control,
            self.flags.entry
        );
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), I::Error> {
        self.i2c.write(self.lcd_address, data)
    }

    fn set_reg(&mut self, addr: u8, data: u8) -> Result<(), I::Error> {
        self.i2c.write(self.rgb_address, &[addr, data])
    }

    fn set_regs(&mut self, regs: &[(u8, u8)]) -> Result<(), I::Error> {
        for &(addr, data) in regs {
            self.set_reg(addr, data)?;
        }
        Ok(())
    }

    /// Send a raw instruction byte.
    pub fn command(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(&[ControlByte::Cmd as u8, value])
    }

    /// Write one character code at the cursor. Always reports one byte written.
    pub fn write(&mut self, value: u8) -> Result<usize, I::Error> {
        self.send(&[ControlByte::Data as u8, value])?;
        Ok(1)
    }

    /// Write string to display, byte by byte.
    pub fn write_str(&mut self, data: &str) -> Result<(), I::Error> {
        for b in data.bytes() {
            self.write(b)?;
        }
        Ok(())
    }

    /// Clear the display and move the cursor to (0, 0).
    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.command(Commands::Clear as u8)?;
        // this command takes a long time
        self.delay.delay_us(2000);
        Ok(())
    }

    /// Return cursor to upper left corner, i.e. (0,0).
    pub fn home(&mut self) -> Result<(), I::Error> {
        self.command(Commands::ReturnHome as u8)?;
        self.delay.delay_us(2000);
        Ok(())
    }

    fn update_control(&mut self, flag: DisplayControl, on: bool) -> Result<(), I::Error> {
        let cmd = self.flags.set_control(flag, on);
        self.command(cmd)
    }

    fn update_entry(&mut self, flag: EntryFlag, on: bool) -> Result<(), I::Error> {
        let cmd = self.flags.set_entry(flag, on);
        self.command(cmd)
    }

    /// Turn the display off without losing its content.
    pub fn no_display(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::DisplayOn, false)
    }

    pub fn display(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::DisplayOn, true)
    }

    pub fn stop_blink(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorBlink, false)
    }

    /// Blink the block cursor.
    pub fn blink(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorBlink, true)
    }

    pub fn no_cursor(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorOn, false)
    }

    /// Show the underline cursor.
    pub fn cursor(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorOn, true)
    }

    /// Scrolls the display one char to the left, without changing the RAM.
    pub fn scroll_display_left(&mut self) -> Result<(), I::Error> {
        self.command(shift_cmd(ShiftFlag::MoveLeft))
    }

    /// Scrolls the display one char to the right, without changing the RAM.
    pub fn scroll_display_right(&mut self) -> Result<(), I::Error> {
        self.command(shift_cmd(ShiftFlag::MoveRight))
    }

    /// Text flows left to right.
    pub fn left_to_right(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::Left, true)
    }

    /// Text flows right to left.
    pub fn right_to_left(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::Left, false)
    }

    /// Shift the display on every write, 'right justifying' text from the cursor.
    pub fn autoscroll(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::ShiftIncrement, true)
    }

    pub fn no_autoscroll(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::ShiftIncrement, false)
    }

    /// Store a glyph in one of the 8 CGRAM slots. Slots above 7 wrap around.
    ///
    /// Each byte is one pixel row, the lower 5 bits are the columns. The glyph is shown by
    /// writing the slot number as character code.
    pub fn custom_symbol(&mut self, location: u8, charmap: &[u8; 8]) -> Result<(), I::Error> {
        self.command(cgram_cmd(location))?;
        self.send(&glyph_payload(charmap))
    }

    /// Set the cursor to (col, row). Coordinates are zero-based.
    ///
    /// Only the first two rows are addressable, any row above 0 selects the second line.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I::Error> {
        self.send(&[ControlByte::Cmd as u8, ddram_addr(col, row)])
    }

    /// Set the backlight duty cycle of each channel.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), I::Error> {
        self.set_reg(reg::RED, r)?;
        self.set_reg(reg::GREEN, g)?;
        self.set_reg(reg::BLUE, b)
    }

    /// Write a backlight controller register directly.
    pub fn set_pwm(&mut self, color: u8, pwm: u8) -> Result<(), I::Error> {
        self.set_reg(color, pwm)
    }

    /// Set one of the [`Color`] presets by index. Indices above 3 are ignored.
    pub fn set_color(&mut self, color: u8) -> Result<(), I::Error> {
        match Color::from_index(color) {
            Some(color) => self.set_color_preset(color),
            None => Ok(()),
        }
    }

    pub fn set_color_preset(&mut self, color: Color) -> Result<(), I::Error> {
        let (r, g, b) = color.rgb();
        self.set_rgb(r, g, b)
    }

    /// Turns every channel off.
    pub fn set_color_all(&mut self) -> Result<(), I::Error> {
        self.set_rgb(0, 0, 0)
    }

    pub fn set_color_white(&mut self) -> Result<(), I::Error> {
        self.set_rgb(255, 255, 255)
    }

    /// Blink the backlight, about once a second with half on, half off.
    pub fn blink_led(&mut self) -> Result<(), I::Error> {
        self.set_regs(&BLINK_ON)
    }

    pub fn no_blink_led(&mut self) -> Result<(), I::Error> {
        self.set_regs(&BLINK_OFF)
    }

    pub fn blink_on(&mut self) -> Result<(), I::Error> {
        self.blink()
    }

    pub fn blink_off(&mut self) -> Result<(), I::Error> {
        self.stop_blink()
    }

    pub fn cursor_on(&mut self) -> Result<(), I::Error> {
        self.cursor()
    }

    pub fn cursor_off(&mut self) -> Result<(), I::Error> {
        self.no_cursor()
    }

    /// Compatibility alias of the single colour backpacks. This chip has no backlight power
    /// switch: nonzero selects the blinking preset, zero the steady one.
    pub fn set_backlight(&mut self, new_val: u8) -> Result<(), I::Error> {
        if new_val != 0 {
            self.blink_led()
        } else {
            self.no_blink_led()
        }
    }

    pub fn load_custom_character(&mut self, char_num: u8, rows: &[u8; 8]) -> Result<(), I::Error> {
        self.custom_symbol(char_num, rows)
    }

    pub fn printstr(&mut self, s: &str) -> Result<(), I::Error> {
        self.write_str(s)
    }

    // Not supported by this module, kept so code written for other LCD backpacks builds.

    pub fn status(&mut self) -> u8 {
        0
    }

    pub fn set_contrast(&mut self, _new_val: u8) {}

    pub fn keypad(&mut self) -> u8 {
        0
    }

    pub fn set_delay(&mut self, _cmd_delay: i32, _char_delay: i32) {}

    pub fn on(&mut self) {}

    pub fn off(&mut self) {}

    pub fn init_bargraph(&mut self, _graphtype: u8) -> u8 {
        0
    }

    pub fn draw_horizontal_graph(&mut self, _row: u8, _column: u8, _len: u8, _pixel_col_end: u8) {}

    pub fn draw_vertical_graph(&mut self, _row: u8, _column: u8, _len: u8, _pixel_row_end: u8) {}
}

impl<'a, I, D> uWrite for Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    type Error = I::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use core::cell::RefCell;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };
    use std::vec;
    use std::vec::Vec;

    const LCD: u8 = 0x3e;
    const RGB: u8 = 0x60;

    fn cmd(b: u8) -> I2cTransaction {
        I2cTransaction::write(LCD, vec![0x80, b])
    }

    fn rgb(reg: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(RGB, vec![reg, value])
    }

    fn init_sequence(function_set: u8) -> Vec<I2cTransaction> {
        vec![
            cmd(function_set),
            cmd(function_set),
            cmd(function_set),
            cmd(0x0c),
            cmd(0x01),
            cmd(0x06),
            rgb(0x00, 0x00),
            rgb(0x08, 0xff),
            rgb(0x01, 0x20),
            rgb(0x04, 255),
            rgb(0x03, 255),
            rgb(0x02, 255),
        ]
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Write(u8, Vec<u8>),
        DelayMs(u32),
        DelayUs(u32),
        DelayNs(u32),
    }

    /// Bus and delay sharing one log, to check writes and waits are interleaved correctly.
    struct Recorder<'l>(&'l RefCell<Vec<Event>>);

    impl ErrorType for Recorder<'_> {
        type Error = core::convert::Infallible;
    }

    impl I2c for Recorder<'_> {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0.borrow_mut().push(Event::Write(address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    impl DelayNs for Recorder<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push(Event::DelayNs(ns));
        }

        fn delay_us(&mut self, us: u32) {
            self.0.borrow_mut().push(Event::DelayUs(us));
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(Event::DelayMs(ms));
        }
    }

    #[test]
    fn init_two_rows() {
        let mut i2c = I2cMock::new(&init_sequence(0x28));
        let mut delay = NoopDelay::new();
        let lcd = Lcd::new(&mut i2c, &mut delay, 16, 2).init().unwrap();
        assert_eq!(lcd.num_lines(), 2);
        assert_eq!(lcd.function_flags(), 0x08);
        assert_eq!(lcd.display_control_flags(), 0x04);
        assert_eq!(lcd.entry_mode_flags(), 0x02);
        i2c.done();
    }

    #[test]
    fn init_single_row() {
        let mut i2c = I2cMock::new(&init_sequence(0x20));
        let mut delay = NoopDelay::new();
        Lcd::new(&mut i2c, &mut delay, 16, 1).init().unwrap();
        i2c.done();
    }

    #[test]
    fn begin_single_row_tall_font() {
        let mut i2c = I2cMock::new(&init_sequence(0x24));
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 1);
        lcd.begin(16, 1, Font::Font5x10).unwrap();
        assert_eq!(lcd.function_flags(), 0x04);
        i2c.done();
    }

    #[test]
    fn custom_addresses() {
        let expectations = [
            I2cTransaction::write(0x27, vec![0x80, 0x01]),
            I2cTransaction::write(0x62, vec![0x04, 1]),
            I2cTransaction::write(0x62, vec![0x03, 2]),
            I2cTransaction::write(0x62, vec![0x02, 3]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 20, 2)
            .with_lcd_address(0x27)
            .with_rgb_address(0x62);
        assert_eq!((lcd.cols(), lcd.rows()), (20, 2));
        assert_eq!((lcd.lcd_address(), lcd.rgb_address()), (0x27, 0x62));
        lcd.clear().unwrap();
        lcd.set_rgb(1, 2, 3).unwrap();
        i2c.done();
    }

    #[test]
    fn init_stops_at_failed_write() {
        let expectations = [cmd(0x28), cmd(0x28).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let result = Lcd::new(&mut i2c, &mut delay, 16, 2).init();
        assert!(matches!(result, Err(ErrorKind::Other)));
        i2c.done();
    }

    #[test]
    fn set_rgb_stops_at_failed_register() {
        let expectations = [rgb(0x04, 10).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        assert_eq!(lcd.set_rgb(10, 20, 30), Err(ErrorKind::Other));
        i2c.done();
    }

    #[test]
    fn end_to_end_init_cursor_write() {
        let log = RefCell::new(Vec::new());
        let mut i2c = Recorder(&log);
        let mut delay = Recorder(&log);
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2).init().unwrap();
        lcd.set_cursor(3, 1).unwrap();
        lcd.write(b'A').unwrap();

        let w = |addr: u8, bytes: &[u8]| Event::Write(addr, bytes.to_vec());
        let expected = vec![
            Event::DelayMs(50),
            w(LCD, &[0x80, 0x28]),
            Event::DelayMs(5),
            w(LCD, &[0x80, 0x28]),
            Event::DelayMs(5),
            w(LCD, &[0x80, 0x28]),
            w(LCD, &[0x80, 0x0c]),
            w(LCD, &[0x80, 0x01]),
            Event::DelayUs(2000),
            w(LCD, &[0x80, 0x06]),
            w(RGB, &[0x00, 0x00]),
            w(RGB, &[0x08, 0xff]),
            w(RGB, &[0x01, 0x20]),
            w(RGB, &[0x04, 255]),
            w(RGB, &[0x03, 255]),
            w(RGB, &[0x02, 255]),
            w(LCD, &[0x80, 0xc3]),
            w(LCD, &[0x40, b'A']),
        ];
        assert_eq!(log.into_inner(), expected);
    }

    #[test]
    fn clear_and_home_wait_2ms() {
        let log = RefCell::new(Vec::new());
        let mut i2c = Recorder(&log);
        let mut delay = Recorder(&log);
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.clear().unwrap();
        lcd.home().unwrap();
        lcd.no_display().unwrap();
        lcd.home().unwrap();
        assert_eq!(
            log.into_inner(),
            vec![
                Event::Write(LCD, vec![0x80, 0x01]),
                Event::DelayUs(2000),
                Event::Write(LCD, vec![0x80, 0x02]),
                Event::DelayUs(2000),
                Event::Write(LCD, vec![0x80, 0x08]),
                Event::Write(LCD, vec![0x80, 0x02]),
                Event::DelayUs(2000),
            ]
        );
    }

    #[test]
    fn display_control_toggles_send_full_byte() {
        let mut expectations = init_sequence(0x28);
        expectations.extend([
            cmd(0x0e), // cursor
            cmd(0x0f), // blink
            cmd(0x0b), // no display
            cmd(0x0f), // display
            cmd(0x0d), // no cursor
            cmd(0x0c), // stop blink
            cmd(0x0c), // stop blink again
        ]);
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2).init().unwrap();
        let initial = lcd.display_control_flags();
        lcd.cursor().unwrap();
        lcd.blink().unwrap();
        lcd.no_display().unwrap();
        lcd.display().unwrap();
        lcd.no_cursor().unwrap();
        lcd.stop_blink().unwrap();
        lcd.stop_blink().unwrap();
        assert_eq!(lcd.display_control_flags(), initial);
        i2c.done();
    }

    #[test]
    fn entry_mode_and_scrolling() {
        let expectations = [
            cmd(0x04), // right to left, from cleared flags
            cmd(0x05), // autoscroll
            cmd(0x07), // left to right
            cmd(0x18), // scroll left
            cmd(0x1c), // scroll right
            cmd(0x06), // no autoscroll
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.right_to_left().unwrap();
        lcd.autoscroll().unwrap();
        lcd.left_to_right().unwrap();
        lcd.scroll_display_left().unwrap();
        lcd.scroll_display_right().unwrap();
        assert_eq!(lcd.entry_mode_flags(), 0x03);
        lcd.no_autoscroll().unwrap();
        i2c.done();
    }

    #[test]
    fn set_cursor_collapses_rows() {
        let expectations = [
            cmd(0x80),
            cmd(0x85),
            cmd(0xc5),
            cmd(0xc5),
            cmd(0xcf),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.set_cursor(0, 0).unwrap();
        lcd.set_cursor(5, 0).unwrap();
        lcd.set_cursor(5, 1).unwrap();
        lcd.set_cursor(5, 3).unwrap();
        lcd.set_cursor(15, 200).unwrap();
        i2c.done();
    }

    #[test]
    fn custom_symbol_wraps_slot() {
        let heart = [0x00, 0x0a, 0x1f, 0x1f, 0x0e, 0x04, 0x00, 0x00];
        let payload = vec![0x40, 0x00, 0x0a, 0x1f, 0x1f, 0x0e, 0x04, 0x00, 0x00];
        let expectations = [
            cmd(0x40 | (2 << 3)),
            I2cTransaction::write(LCD, payload.clone()),
            cmd(0x40 | (2 << 3)),
            I2cTransaction::write(LCD, payload.clone()),
            cmd(0x40 | (7 << 3)),
            I2cTransaction::write(LCD, payload),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.custom_symbol(2, &heart).unwrap();
        lcd.custom_symbol(10, &heart).unwrap();
        lcd.load_custom_character(15, &heart).unwrap();
        i2c.done();
    }

    #[test]
    fn color_presets_and_out_of_range() {
        let expectations = [
            rgb(0x04, 255),
            rgb(0x03, 255),
            rgb(0x02, 255),
            rgb(0x04, 255),
            rgb(0x03, 0),
            rgb(0x02, 0),
            rgb(0x04, 0),
            rgb(0x03, 255),
            rgb(0x02, 0),
            rgb(0x04, 0),
            rgb(0x03, 0),
            rgb(0x02, 255),
            rgb(0x04, 0),
            rgb(0x03, 0),
            rgb(0x02, 0),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        for index in 0..4 {
            lcd.set_color(index).unwrap();
        }
        lcd.set_color(4).unwrap();
        lcd.set_color(255).unwrap();
        lcd.set_color_all().unwrap();
        i2c.done();
    }

    #[test]
    fn backlight_blink_and_alias() {
        let expectations = [
            rgb(0x07, 0x17),
            rgb(0x06, 0x7f),
            rgb(0x07, 0x00),
            rgb(0x06, 0xff),
            rgb(0x07, 0x17),
            rgb(0x06, 0x7f),
            rgb(0x07, 0x00),
            rgb(0x06, 0xff),
            rgb(0x05, 0x42),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.blink_led().unwrap();
        lcd.no_blink_led().unwrap();
        lcd.set_backlight(7).unwrap();
        lcd.set_backlight(0).unwrap();
        lcd.set_pwm(0x05, 0x42).unwrap();
        i2c.done();
    }

    #[test]
    fn aliases_match_targets() {
        let expectations = [cmd(0x09), cmd(0x0b), cmd(0x0a), cmd(0x08)];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        // flags start cleared before init
        lcd.blink_on().unwrap();
        lcd.cursor_on().unwrap();
        lcd.blink_off().unwrap();
        lcd.cursor_off().unwrap();
        i2c.done();
    }

    #[test]
    fn text_output() {
        let expectations = [
            I2cTransaction::write(LCD, vec![0x40, b'h']),
            I2cTransaction::write(LCD, vec![0x40, b'i']),
            I2cTransaction::write(LCD, vec![0x40, b'o']),
            I2cTransaction::write(LCD, vec![0x40, b'k']),
            I2cTransaction::write(LCD, vec![0x40, b'4']),
            I2cTransaction::write(LCD, vec![0x40, b'2']),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        lcd.write_str("hi").unwrap();
        lcd.printstr("ok").unwrap();
        ufmt::uwrite!(lcd, "{}", 42u8).unwrap();
        i2c.done();
    }

    #[test]
    fn write_reports_one_byte() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(LCD, vec![0x40, 0x00])]);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        assert_eq!(lcd.write(0x00).unwrap(), 1);
        i2c.done();
    }

    #[test]
    fn unsupported_calls_stay_off_the_bus() {
        let expectations: [I2cTransaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd::new(&mut i2c, &mut delay, 16, 2);
        assert_eq!(lcd.status(), 0);
        assert_eq!(lcd.keypad(), 0);
        assert_eq!(lcd.init_bargraph(1), 0);
        lcd.set_contrast(10);
        lcd.set_delay(1, 2);
        lcd.on();
        lcd.off();
        lcd.draw_horizontal_graph(0, 0, 16, 40);
        lcd.draw_vertical_graph(1, 0, 2, 8);
        i2c.done();
    }
}
