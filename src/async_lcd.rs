use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    cgram_cmd, ddram_addr, glyph_payload, reg, shift_cmd, Color, Commands, ControlByte,
    DisplayControl, EntryFlag, Font, ModeFlags, ShiftFlag, BACKLIGHT_INIT, BLINK_OFF, BLINK_ON,
    LCD_ADDRESS, RGB_ADDRESS,
};

/// Async API to write to the LCD and its RGB backlight, see [`crate::sync_lcd::Lcd`].
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

    pub fn function_flags(&self) -> u8 {
        self.flags.function
    }

    /// Current mode flags, without the command bits.
    pub fn display_control_flags(&self) -> u8 {
        self.flags.control
    }

    pub fn entry_mode_flags(&self) -> u8 {
        self.flags.entry
    }

    /// Initializes the hardware in 4 bit mode with the 5x8 font.
    pub async fn init(mut self) -> Result<Self, I::Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "async lcd init {}x{} lcd={=u8:#x} rgb={=u8:#x}",
            self.cols,
            self.rows,
            self.lcd_address,
            self.rgb_address
        );
        self.flags.reset_function();
        self.begin(self.cols, self.rows, Font::Font5x8).await?;
        Ok(self)
    }

    /// Runs the power-on sequence of the display, then sets up the backlight in white.
    ///
    /// Follows the HD44780 datasheet, page 45 figure 23. Timing is fixed because the busy flag
    /// cannot be read on this module.
    pub async fn begin(&mut self, _cols: u8, rows: u8, font: Font) -> Result<(), I::Error> {
        self.flags.apply_geometry(rows, font);
        self.num_lines = rows;

        // At least 40ms after power rises above 2.7V before sending commands.
        self.delay.delay_ms(50).await;

        let function_set = self.flags.function_cmd();
        self.command(function_set).await?;
        self.delay.delay_ms(5).await; // wait more than 4.1ms
        self.command(function_set).await?;
        self.delay.delay_ms(5).await;
        self.command(function_set).await?;

        self.flags.reset_control();
        self.display().await?;
        self.clear().await?;

        self.flags.reset_entry();
        self.command(self.flags.entry_cmd()).await?;

        self.set_regs(&BACKLIGHT_INIT).await?;
        self.set_color_white().await?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "async lcd ready function={=u8:#x} control={=u8:#x} entry={=u8:#x}",
            self.flags.function,
            self.flags.control,
            self.flags.entry
        );
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), I::Error> {
        self.i2c.write(self.lcd_address, data).await
    }

    async fn set_reg(&mut self, addr: u8, data: u8) -> Result<(), I::Error> {
        self.i2c.write(self.rgb_address, &[addr, data]).await
    }

    async fn set_regs(&mut self, regs: &[(u8, u8)]) -> Result<(), I::Error> {
        for &(addr, data) in regs {
            self.set_reg(addr, data).await?;
        }
        Ok(())
    }

    /// Send a raw instruction byte.
    pub async fn command(&mut self, value: u8) -> Result<(), I::Error> {
        self.send(&[ControlByte::Cmd as u8, value]).await
    }

    /// Write one character code at the cursor. Always reports one byte written.
    pub async fn write(&mut self, value: u8) -> Result<usize, I::Error> {
        self.send(&[ControlByte::Data as u8, value]).await?;
        Ok(1)
    }

    /// Write string to display, byte by byte.
    pub async fn write_str(&mut self, data: &str) -> Result<(), I::Error> {
        for b in data.bytes() {
            self.write(b).await?;
        }
        Ok(())
    }

    /// Clear the display and move the cursor to (0, 0).
    pub async fn clear(&mut self) -> Result<(), I::Error> {
        self.command(Commands::Clear as u8).await?;
        // this command takes a long time
        self.delay.delay_us(2000).await;
        Ok(())
    }

    /// Return cursor to upper left corner, i.e. (0,0).
    pub async fn home(&mut self) -> Result<(), I::Error> {
        self.command(Commands::ReturnHome as u8).await?;
        self.delay.delay_us(2000).await;
        Ok(())
    }

    async fn update_control(&mut self, flag: DisplayControl, on: bool) -> Result<(), I::Error> {
        let cmd = self.flags.set_control(flag, on);
        self.command(cmd).await
    }

    async fn update_entry(&mut self, flag: EntryFlag, on: bool) -> Result<(), I::Error> {
        let cmd = self.flags.set_entry(flag, on);
        self.command(cmd).await
    }

    /// Turn the display off without losing its content.
    pub async fn no_display(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::DisplayOn, false).await
    }

    pub async fn display(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::DisplayOn, true).await
    }

    pub async fn stop_blink(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorBlink, false).await
    }

    pub async fn blink(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorBlink, true).await
    }

    pub async fn no_cursor(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorOn, false).await
    }

    pub async fn cursor(&mut self) -> Result<(), I::Error> {
        self.update_control(DisplayControl::CursorOn, true).await
    }

    /// Scrolls the display one char to the left, without changing the RAM.
    pub async fn scroll_display_left(&mut self) -> Result<(), I::Error> {
        self.command(shift_cmd(ShiftFlag::MoveLeft)).await
    }

    /// Scrolls the display one char to the right, without changing the RAM.
    pub async fn scroll_display_right(&mut self) -> Result<(), I::Error> {
        self.command(shift_cmd(ShiftFlag::MoveRight)).await
    }

    /// Text flows left to right.
    pub async fn left_to_right(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::Left, true).await
    }

    pub async fn right_to_left(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::Left, false).await
    }

    /// Shift the display on every write, 'right justifying' text from the cursor.
    pub async fn autoscroll(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::ShiftIncrement, true).await
    }

    pub async fn no_autoscroll(&mut self) -> Result<(), I::Error> {
        self.update_entry(EntryFlag::ShiftIncrement, false).await
    }

    /// Store a glyph in one of the 8 CGRAM slots. Slots above 7 wrap around.
    ///
    /// Each byte is one pixel row, the lower 5 bits are the columns. The glyph is shown by
    /// writing the slot number as character code.
    pub async fn custom_symbol(
        &mut self,
        location: u8,
        charmap: &[u8; 8],
    ) -> Result<(), I::Error> {
        self.command(cgram_cmd(location)).await?;
        self.send(&glyph_payload(charmap)).await
    }

    /// Set the cursor to (col, row). Coordinates are zero-based.
    ///
    /// Only the first two rows are addressable, any row above 0 selects the second line.
    pub async fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I::Error> {
        self.send(&[ControlByte::Cmd as u8, ddram_addr(col, row)]).await
    }

    /// Set the backlight duty cycle of each channel.
    pub async fn set_rgb(&mut self, r: u8, g: u8, b: u8) -> Result<(), I::Error> {
        self.set_reg(reg::RED, r).await?;
        self.set_reg(reg::GREEN, g).await?;
        self.set_reg(reg::BLUE, b).await
    }

    /// Write a backlight controller register directly.
    pub async fn set_pwm(&mut self, color: u8, pwm: u8) -> Result<(), I::Error> {
        self.set_reg(color, pwm).await
    }

    /// Set one of the [`Color`] presets by index. Indices above 3 are ignored.
    pub async fn set_color(&mut self, color: u8) -> Result<(), I::Error> {
        match Color::from_index(color) {
            Some(color) => self.set_color_preset(color).await,
            None => Ok(()),
        }
    }

    pub async fn set_color_preset(&mut self, color: Color) -> Result<(), I::Error> {
        let (r, g, b) = color.rgb();
        self.set_rgb(r, g, b).await
    }

    pub async fn set_color_all(&mut self) -> Result<(), I::Error> {
        self.set_rgb(0, 0, 0).await
    }

    pub async fn set_color_white(&mut self) -> Result<(), I::Error> {
        self.set_rgb(255, 255, 255).await
    }

    /// Blink the backlight, about once a second with half on, half off.
    pub async fn blink_led(&mut self) -> Result<(), I::Error> {
        self.set_regs(&BLINK_ON).await
    }

    pub async fn no_blink_led(&mut self) -> Result<(), I::Error> {
        self.set_regs(&BLINK_OFF).await
    }

    pub async fn blink_on(&mut self) -> Result<(), I::Error> {
        self.blink().await
    }

    pub async fn blink_off(&mut self) -> Result<(), I::Error> {
        self.stop_blink().await
    }

    pub async fn cursor_on(&mut self) -> Result<(), I::Error> {
        self.cursor().await
    }

    pub async fn cursor_off(&mut self) -> Result<(), I::Error> {
        self.no_cursor().await
    }

    /// Compatibility alias of the single colour backpacks. This chip has no backlight power
    /// switch: nonzero selects the blinking preset, zero the steady one.
    pub async fn set_backlight(&mut self, new_val: u8) -> Result<(), I::Error> {
        if new_val != 0 {
            self.blink_led().await
        } else {
            self.no_blink_led().await
        }
    }

    pub async fn load_custom_character(
        &mut self,
        char_num: u8,
        rows: &[u8; 8],
    ) -> Result<(), I::Error> {
        self.custom_symbol(char_num, rows).await
    }

    pub async fn printstr(&mut self, s: &str) -> Result<(), I::Error> {
        self.write_str(s).await
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
