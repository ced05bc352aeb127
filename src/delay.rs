//! Wall clock delays for hosted targets (Raspberry Pi and friends).
//!
//! The HD44780 gives no completion signal, so these waits are what keeps the bus correct.
//! They are never shortened: `thread::sleep` only ever oversleeps, which the controller
//! tolerates.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// `DelayNs` backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    #[inline]
    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
