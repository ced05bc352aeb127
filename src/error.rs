//! Error type shared by every layer of the driver.

use embedded_hal::digital;

use crate::line::LineNumber;

/// Crate-wide result alias.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong between the caller and the pins.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The controller is wired either with four or with eight data lines.
    #[error("LCD requires four or eight data pins, got {0}")]
    DataPinCount(usize),

    /// CGRAM holds eight glyphs, addressed 0..=7.
    #[error("custom character position {0} is outside 0..=7")]
    CharacterPosition(u8),

    /// A pin refused a level change.
    #[error("GPIO pin error: {0:?}")]
    Pin(digital::ErrorKind),

    /// The GPIO subsystem could not be opened, closed or asked for a pin.
    #[error("GPIO subsystem error: {0}")]
    Gpio(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The animation thread could not be started.
    #[error("failed to spawn animation thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The animation thread panicked before reporting done.
    #[error("animation on {0:?} panicked")]
    AnimationPanicked(LineNumber),
}

impl Error {
    /// Lift the result of a pin operation into the crate error.
    pub fn pin<T, E: digital::Error>(result: core::result::Result<T, E>) -> Result<T> {
        result.map_err(|e| Error::Pin(e.kind()))
    }

    /// Wrap a platform GPIO error.
    pub fn gpio<E>(error: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Gpio(Box::new(error))
    }
}
