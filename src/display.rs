//! # Main driver for the HD44780
//!
//! [`Lcd1602`] owns the parallel bus and turns the [`Lcd`] operations into instruction and
//! data writes. It is meant to be shared between threads (`&self` everywhere):
//!
//!  - the bus mutex makes every single byte write, including the idle time after it, atomic
//!  - the cursor mutex makes operations that set the address counter and then write through
//!    it (a whole line, a whole glyph) atomic against each other
//!
//! The cursor mutex is always taken before the bus mutex and the bus mutex is never held
//! across anything but one byte write plus its wait.
//!
//! Typically you want:
//!  - `Lcd1602::from_session()` or `Lcd1602::new()` to create a driver instance
//!  - `initialize()` once before anything else
//!  - `write_line()` to show text
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::{
    backend::{BusWidth, ParallelBus},
    config::LcdConfig,
    error::{Error, Result},
    gpio::{Gpio, GpioSession},
    instructions::{Instruction, Mode, RESET_SEQUENCE},
    line::{encode_char, format_line, LineNumber},
    Character, Lcd, EXECUTION_TIME_DEFAULT_US, EXECUTION_TIME_RETURN_HOME_US, INIT_SETTLE_MS,
};

/// Two line HD44780 display on a 4 or 8 line parallel bus.
#[derive(Debug)]
pub struct Lcd1602<P, D> {
    bus: Mutex<ParallelBus<P, D>>,
    cursor: Mutex<()>,
    width: usize,
    bus_width: BusWidth,
}

impl<P, D> Lcd1602<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create a driver from pins that are already outputs.
    ///
    /// Arguments:
    ///
    /// - rs: register select
    /// - enable: enable strobe
    /// - data: `[D4..D7]` or `[D0..D7]`, any other count is an error
    /// - width: characters per line
    /// - delay: timing source for the controller waits
    pub fn new(rs: P, enable: P, data: Vec<P>, width: usize, delay: D) -> Result<Lcd1602<P, D>> {
        let bus = ParallelBus::new(rs, enable, data, delay)?;
        Ok(Lcd1602::from_bus(bus, width))
    }

    pub fn from_bus(bus: ParallelBus<P, D>, width: usize) -> Lcd1602<P, D> {
        let bus_width = bus.bus_width();
        Lcd1602 { bus: Mutex::new(bus), cursor: Mutex::new(()), width, bus_width }
    }

    /// Create a driver from pin numbers of an opened GPIO subsystem.
    ///
    /// The wiring is validated before the first pin is configured.
    pub fn from_session<G>(
        session: &mut GpioSession<G>,
        config: &LcdConfig,
        delay: D,
    ) -> Result<Lcd1602<P, D>>
    where
        G: Gpio<Pin = P>,
    {
        config.validate()?;
        let rs = session.pin(config.rs)?;
        let enable = session.pin(config.enable)?;
        let data = config
            .data
            .iter()
            .map(|number| session.pin(*number))
            .collect::<Result<Vec<P>>>()?;
        Lcd1602::new(rs, enable, data, config.width, delay)
    }

    pub fn bus_width(&self) -> BusWidth {
        self.bus_width
    }

    /// Give back `(rs, enable, data, delay)`.
    pub fn release(self) -> (P, P, Vec<P>, D) {
        self.bus
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .release()
    }

    fn bus(&self) -> MutexGuard<'_, ParallelBus<P, D>> {
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cursor(&self) -> MutexGuard<'_, ()> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, instruction: Instruction) -> Result<()> {
        self.bus().write(instruction.byte(), Mode::Instruction)
    }

    // the bus stays locked for the additional wait
    fn send_and_wait(&self, value: u8, wait_us: u32) -> Result<()> {
        let mut bus = self.bus();
        bus.write(value, Mode::Instruction)?;
        bus.wait_us(wait_us);
        Ok(())
    }

    fn reset_sequence(&self) -> Result<()> {
        for value in RESET_SEQUENCE {
            self.send_and_wait(value, EXECUTION_TIME_DEFAULT_US)?;
        }
        Ok(())
    }

    fn home(&self) -> Result<()> {
        self.send_and_wait(Instruction::ReturnHome.byte(), EXECUTION_TIME_RETURN_HOME_US)
    }
}

impl<P, D> Lcd for Lcd1602<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn initialize(&self) -> Result<()> {
        debug!("initializing, {} characters per line, bus width {:?}", self.width, self.bus_width);
        let _cursor = self.cursor();

        self.reset_sequence()?;
        self.send(Instruction::EntryModeSet { increment: true, shift: false })?;
        self.send(Instruction::DisplayControl { display: true, cursor: false, blink: false })?;
        self.send(Instruction::FunctionSet {
            eight_bit: self.bus_width == BusWidth::Eight,
            two_lines: true,
            large_font: false,
        })?;
        self.home()?;
        self.send(Instruction::ClearDisplay)?;

        self.bus().wait_ms(INIT_SETTLE_MS);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        self.reset_sequence()
    }

    fn entry_mode_set(&self, increment: bool, shift: bool) -> Result<()> {
        self.send(Instruction::EntryModeSet { increment, shift })
    }

    fn display_mode_set(&self, display: bool, cursor: bool, blink: bool) -> Result<()> {
        self.send(Instruction::DisplayControl { display, cursor, blink })
    }

    fn clear(&self) -> Result<()> {
        let _cursor = self.cursor();
        self.send(Instruction::ClearDisplay)
    }

    fn return_home(&self) -> Result<()> {
        let _cursor = self.cursor();
        self.home()
    }

    fn write(&self, value: u8, mode: Mode) -> Result<()> {
        self.bus().write(value, mode)
    }

    fn write_line(&self, text: &str, line: LineNumber) -> Result<()> {
        let _cursor = self.cursor();
        let text = format_line(text, self.width);

        self.send(line.instruction())?;
        for c in text.chars() {
            self.write(encode_char(c), Mode::Data)?;
        }
        Ok(())
    }

    fn create_character(&self, position: u8, glyph: &Character) -> Result<()> {
        if position > 7 {
            return Err(Error::CharacterPosition(position));
        }
        let _cursor = self.cursor();

        self.send(Instruction::SetCgramAddress(position))?;
        for row in glyph.rows() {
            self.write(row, Mode::Data)?;
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.width
    }

    fn close(&self) -> Result<()> {
        // pins are plain embedded-hal outputs, use release() to get them back
        debug!("display closed");
        Ok(())
    }
}
