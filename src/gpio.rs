//! The GPIO subsystem the display pins come from.
//!
//! Platform crates (memory mapped `/dev/gpiomem`, sysfs, character device) differ in how
//! they are brought up and torn down, but all of them have to be opened once before the
//! first pin is touched and closed once at shutdown. [`GpioSession`] owns that lifecycle
//! explicitly instead of a process global "already opened" flag.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::error::{Error, Result};

/// Platform GPIO access.
pub trait Gpio {
    type Pin: OutputPin;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bring the subsystem up. Called once, before any `output`.
    fn open(&mut self) -> core::result::Result<(), Self::Error>;

    /// Tear the subsystem down. Called once, after the last pin use.
    fn close(&mut self) -> core::result::Result<(), Self::Error>;

    /// Configure pin `number` as an output and hand it out.
    fn output(&mut self, number: u8) -> core::result::Result<Self::Pin, Self::Error>;
}

/// An opened GPIO subsystem.
///
/// Dropping an open session closes it; use [`GpioSession::close`] to see the result.
pub struct GpioSession<G: Gpio> {
    gpio: G,
    open: bool,
}

impl<G: Gpio> GpioSession<G> {
    pub fn open(mut gpio: G) -> Result<GpioSession<G>> {
        gpio.open().map_err(Error::gpio)?;
        debug!("GPIO subsystem opened");
        Ok(GpioSession { gpio, open: true })
    }

    /// Output pin `number`, direction already set.
    pub fn pin(&mut self, number: u8) -> Result<G::Pin> {
        self.gpio.output(number).map_err(Error::gpio)
    }

    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.gpio.close().map_err(Error::gpio)?;
        debug!("GPIO subsystem closed");
        Ok(())
    }
}

impl<G: Gpio> Drop for GpioSession<G> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("closing GPIO subsystem on drop failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummypins::{DummyGpio, Event, Trace};

    #[test]
    fn opens_once_and_closes_once() {
        let trace = Trace::new();
        let mut session = GpioSession::open(DummyGpio::new(&trace)).unwrap();
        session.pin(17).unwrap();
        session.close().unwrap();

        assert_eq!(
            trace.events(),
            vec![Event::Opened, Event::Output { pin: 17 }, Event::Closed]
        );
    }

    #[test]
    fn drop_closes_an_open_session() {
        let trace = Trace::new();
        drop(GpioSession::open(DummyGpio::new(&trace)).unwrap());
        assert_eq!(trace.events(), vec![Event::Opened, Event::Closed]);
    }

    #[test]
    fn open_failure_is_reported() {
        let trace = Trace::new();
        let result = GpioSession::open(DummyGpio::failing_open(&trace));
        assert!(matches!(result, Err(Error::Gpio(_))));
        assert!(trace.events().is_empty());
    }

    #[test]
    fn close_failure_is_reported_once() {
        let trace = Trace::new();
        let session = GpioSession::open(DummyGpio::failing_close(&trace)).unwrap();
        assert!(matches!(session.close(), Err(Error::Gpio(_))));
        assert_eq!(trace.events(), vec![Event::Opened]);
    }
}
