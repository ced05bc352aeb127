//! Construction parameters of a display: how it is wired and how wide a line is.

use crate::{backend::BusWidth, error::Result};

/// Pin numbers as understood by the platform [`Gpio`](crate::gpio::Gpio), plus line width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdConfig {
    /// register select
    pub rs: u8,
    /// enable strobe
    pub enable: u8,
    /// data lines, lowest wired line first: `[D4..D7]` or `[D0..D7]`
    pub data: Vec<u8>,
    /// characters per line
    pub width: usize,
}

impl LcdConfig {
    /// Line width of the common 1602 module.
    pub const DEFAULT_WIDTH: usize = 16;

    /// 1602 module on a 4 line bus.
    pub fn four_bit(rs: u8, enable: u8, data: [u8; 4]) -> LcdConfig {
        LcdConfig { rs, enable, data: data.to_vec(), width: Self::DEFAULT_WIDTH }
    }

    /// 1602 module on an 8 line bus.
    pub fn eight_bit(rs: u8, enable: u8, data: [u8; 8]) -> LcdConfig {
        LcdConfig { rs, enable, data: data.to_vec(), width: Self::DEFAULT_WIDTH }
    }

    pub fn with_width(self, width: usize) -> LcdConfig {
        LcdConfig { width, ..self }
    }

    pub fn bus_width(&self) -> Result<BusWidth> {
        BusWidth::from_pin_count(self.data.len())
    }

    /// Check the wiring before any pin gets configured.
    pub fn validate(&self) -> Result<()> {
        self.bus_width().map(|_| ())
    }
}
