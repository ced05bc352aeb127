//! Pin level sequencing for the HD44780 parallel bus.
//!
//! A byte is presented on the data lines and latched by the falling edge of the enable
//! line. On a 4 line bus (D4..D7 wired) the byte goes out as two nibbles, high nibble first,
//! each with its own enable pulse. After every pulse the bus has to stay idle for the
//! execution time of whatever was latched.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::trace;

use crate::{
    error::{Error, Result},
    instructions::Mode,
    ENABLE_DELAY_US, EXECUTION_TIME_DEFAULT_US,
};

/// Number of data lines wired between host and controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWidth {
    /// D4..D7, two enable pulses per byte
    Four,
    /// D0..D7, one enable pulse per byte
    Eight,
}

impl BusWidth {
    /// Bus width for a number of data pins, anything but 4 or 8 is a wiring error.
    pub fn from_pin_count(count: usize) -> Result<BusWidth> {
        match count {
            4 => Ok(BusWidth::Four),
            8 => Ok(BusWidth::Eight),
            n => Err(Error::DataPinCount(n)),
        }
    }

    /// enable pulses needed to transfer one byte
    pub fn pulses_per_byte(self) -> usize {
        match self {
            BusWidth::Four => 2,
            BusWidth::Eight => 1,
        }
    }
}

/// Register select, enable and 4 or 8 data pins plus the delay provider timing them.
///
/// Data pins are ordered from the lowest wired data line up: `[D4, D5, D6, D7]` or
/// `[D0, .., D7]`.
#[derive(Debug)]
pub struct ParallelBus<P, D> {
    rs: P,
    enable: P,
    data: Vec<P>,
    delay: D,
    width: BusWidth,
}

impl<P, D> ParallelBus<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the pins. Fails before touching any pin if `data` isn't 4 or 8 long.
    pub fn new(rs: P, mut enable: P, data: Vec<P>, delay: D) -> Result<ParallelBus<P, D>> {
        let width = BusWidth::from_pin_count(data.len())?;
        Error::pin(enable.set_low())?;
        Ok(ParallelBus { rs, enable, data, delay, width })
    }

    pub fn bus_width(&self) -> BusWidth {
        self.width
    }

    /// Latch one byte into the instruction or data register.
    ///
    /// Returns after the default execution time has passed, the bus is free again by then.
    pub fn write(&mut self, value: u8, mode: Mode) -> Result<()> {
        trace!("bus write {:#04x} {:?}", value, mode);
        match mode {
            Mode::Instruction => Error::pin(self.rs.set_low())?,
            Mode::Data => Error::pin(self.rs.set_high())?,
        }

        for pin in self.data.iter_mut() {
            Error::pin(pin.set_low())?;
        }

        match self.width {
            BusWidth::Four => {
                // high nibble on D4..D7 first
                self.present(value, 0x10)?;
                self.pulse(EXECUTION_TIME_DEFAULT_US)?;
                self.present(value, 0x01)?;
            }
            BusWidth::Eight => {
                self.present(value, 0x01)?;
            }
        }
        self.pulse(EXECUTION_TIME_DEFAULT_US)
    }

    // data pin `i` carries the bit `base << i`
    fn present(&mut self, value: u8, base: u8) -> Result<()> {
        for (i, pin) in self.data.iter_mut().enumerate() {
            let bit = base << i;
            if value & bit == bit {
                Error::pin(pin.set_high())?;
            } else {
                Error::pin(pin.set_low())?;
            }
        }
        Ok(())
    }

    /// Strobe the enable line, then keep the bus idle for `execution_time_us`.
    pub fn pulse(&mut self, execution_time_us: u32) -> Result<()> {
        self.delay.delay_us(ENABLE_DELAY_US);
        Error::pin(self.enable.set_high())?;
        self.delay.delay_us(ENABLE_DELAY_US);
        Error::pin(self.enable.set_low())?;
        self.delay.delay_us(execution_time_us);
        Ok(())
    }

    /// Extra idle time for instructions slower than the default execution time.
    pub fn wait_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Give back the pins and the delay provider: `(rs, enable, data, delay)`.
    pub fn release(self) -> (P, P, Vec<P>, D) {
        (self.rs, self.enable, self.data, self.delay)
    }
}
