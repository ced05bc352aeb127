//! # HD44780 character LCD over a parallel GPIO bus
//!
//! Driver for the common 16x2 ("1602") character modules built around the Hitachi HD44780
//! or one of its clones, wired with register select, enable and either 4 or 8 data lines.
//!
//! The crate has three layers:
//!
//!  - [`Lcd1602`], the driver: instruction set, timing, line writes, custom glyphs
//!  - [`SynchronizedLcd`], per-line locking on top of any [`Lcd`], so both lines can be
//!    written from different threads
//!  - [`Animation`]s, driven on one line by a background thread holding that line
//!
//! ```no_run
//! use hd44780_gpio::{Lcd, LcdConfig, Lcd1602, GpioSession, StdDelay, SynchronizedLcd};
//! # fn run<G: hd44780_gpio::gpio::Gpio>(gpio: G) -> hd44780_gpio::Result<()> {
//! let mut session = GpioSession::open(gpio)?;
//! let config = LcdConfig::four_bit(7, 8, [25, 24, 23, 18]);
//! let lcd = Lcd1602::from_session(&mut session, &config, StdDelay)?;
//!
//! let lcd = SynchronizedLcd::new(lcd)?;
//! lcd.write_lines(Some("hello"), Some("world"))?;
//! session.close()
//! # }
//! ```

pub mod animation;
pub mod backend;
pub mod config;
pub mod delay;
pub mod display;
pub mod error;
pub mod gpio;
pub mod instructions;
pub mod line;
pub mod synchronized;

#[cfg(any(test, feature = "dummypins"))]
pub mod dummypins;

pub use animation::{Animation, AnimationHandle};
pub use backend::{BusWidth, ParallelBus};
pub use config::LcdConfig;
pub use delay::StdDelay;
pub use display::Lcd1602;
pub use error::{Error, Result};
pub use gpio::GpioSession;
pub use instructions::Mode;
pub use line::LineNumber;
pub use synchronized::SynchronizedLcd;

/// Setup and hold time around the enable strobe, µs.
pub const ENABLE_DELAY_US: u32 = 1;

/// Execution time of every instruction but "return home", µs.
pub const EXECUTION_TIME_DEFAULT_US: u32 = 40;

/// Execution time of "return home", µs.
pub const EXECUTION_TIME_RETURN_HOME_US: u32 = 1520;

/// Wait at the end of `initialize()`, ms.
pub const INIT_SETTLE_MS: u32 = 10;

/// A custom 5x8 glyph, one byte per pixel row, top row first. The low 5 bits are the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Character([u8; 8]);

impl Character {
    pub const fn new(rows: [u8; 8]) -> Character {
        Character(rows)
    }

    pub fn rows(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl From<[u8; 8]> for Character {
    fn from(rows: [u8; 8]) -> Character {
        Character(rows)
    }
}

/// Operations of a two line character display.
///
/// All operations take `&self`; implementations do their own locking so a display can be
/// shared between threads.
pub trait Lcd {
    /// Bring the controller into a known state: 4/8 bit, two lines, display on, cursor
    /// off, cleared. Call once before anything else.
    fn initialize(&self) -> Result<()>;

    /// Send the bus width re-synchronisation sequence.
    fn reset(&self) -> Result<()>;

    fn entry_mode_set(&self, increment: bool, shift: bool) -> Result<()>;

    fn display_mode_set(&self, display: bool, cursor: bool, blink: bool) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn return_home(&self) -> Result<()>;

    /// Latch one raw byte.
    fn write(&self, value: u8, mode: Mode) -> Result<()>;

    /// Replace the content of `line` with `text`, right aligned and cut to the width.
    fn write_line(&self, text: &str, line: LineNumber) -> Result<()>;

    /// Load `glyph` into CGRAM slot `position` (0..=7). Out of range positions are
    /// rejected without touching the bus.
    fn create_character(&self, position: u8, glyph: &Character) -> Result<()>;

    /// characters per line
    fn width(&self) -> usize;

    fn close(&self) -> Result<()>;
}

/// Load glyphs so the last one ends up in slot 7.
///
/// With `n` glyphs, glyph `i` goes to slot `8 - n + i`. If more than 8 are given the ones
/// that would land below slot 0 are skipped.
pub fn set_custom_characters<L: Lcd + ?Sized>(lcd: &L, characters: &[Character]) -> Result<()> {
    let first = 8 - characters.len() as isize;
    for (index, character) in characters.iter().enumerate() {
        let slot = first + index as isize;
        if slot < 0 {
            continue;
        }
        lcd.create_character(slot as u8, character)?;
    }
    Ok(())
}
