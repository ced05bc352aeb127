//! # Recording pins, delay and GPIO subsystem
//!
//! Drop-in stand-ins for real hardware that write everything they are asked to do into a
//! shared [`Trace`]. The display works on them like on real pins, so the trace can be
//! replayed afterwards to see what the controller would have latched: every enable falling
//! edge is decoded into the register select level and the data line levels at that moment.
//!
//! Enable with the `dummypins` feature. The pins never fail and the delay never sleeps.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::{backend::BusWidth, config::LcdConfig, gpio::Gpio, instructions::Mode};

/// Something a dummy did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// pin driven to a level
    Level { pin: u8, high: bool },
    /// requested wait, in nanoseconds
    Delay { ns: u64 },
    /// GPIO subsystem opened
    Opened,
    /// GPIO subsystem closed
    Closed,
    /// pin configured as output
    Output { pin: u8 },
}

/// One enable pulse: what the controller saw on its inputs at the falling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    pub mode: Mode,
    /// data line levels, bit `i` for data pin `i`
    pub bits: u8,
}

/// One full byte transferred over the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusWrite {
    pub mode: Mode,
    pub value: u8,
}

impl BusWrite {
    pub fn instruction(value: u8) -> BusWrite {
        BusWrite { mode: Mode::Instruction, value }
    }

    pub fn data(value: u8) -> BusWrite {
        BusWrite { mode: Mode::Data, value }
    }
}

/// Shared, thread safe event log.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Trace {
    pub fn new() -> Trace {
        Trace::default()
    }

    /// A pin recording into this trace under `number`.
    pub fn pin(&self, number: u8) -> TracePin {
        TracePin { number, trace: self.clone() }
    }

    /// A delay provider recording into this trace.
    pub fn delay(&self) -> TraceDelay {
        TraceDelay { trace: self.clone() }
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of high to low transitions on `pin`.
    pub fn falling_edges(&self, pin: u8) -> usize {
        let mut high = false;
        let mut edges = 0;
        for event in self.events() {
            if let Event::Level { pin: p, high: level } = event {
                if p == pin {
                    if high && !level {
                        edges += 1;
                    }
                    high = level;
                }
            }
        }
        edges
    }

    /// All requested waits, in order, in nanoseconds.
    pub fn delays(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Delay { ns } => Some(ns),
                _ => None,
            })
            .collect()
    }

    /// Replay the pin levels and collect what every enable pulse latched.
    ///
    /// Pins not driven yet count as low.
    pub fn latches(&self, wiring: &LcdConfig) -> Vec<Latch> {
        let mut rs = false;
        let mut enable = false;
        let mut bits = 0u8;
        let mut latches = Vec::new();

        for event in self.events() {
            let Event::Level { pin, high } = event else {
                continue;
            };
            if pin == wiring.rs {
                rs = high;
            } else if pin == wiring.enable {
                if enable && !high {
                    let mode = if rs { Mode::Data } else { Mode::Instruction };
                    latches.push(Latch { mode, bits });
                }
                enable = high;
            } else if let Some(i) = wiring.data.iter().position(|d| *d == pin) {
                if high {
                    bits |= 1 << i;
                } else {
                    bits &= !(1 << i);
                }
            }
        }
        latches
    }

    /// Reassemble latches into bytes, pairing nibbles on a 4 line bus.
    ///
    /// Returns an empty list for wirings that aren't 4 or 8 data pins wide.
    pub fn writes(&self, wiring: &LcdConfig) -> Vec<BusWrite> {
        let latches = self.latches(wiring);
        match wiring.bus_width() {
            Ok(BusWidth::Eight) => latches
                .into_iter()
                .map(|l| BusWrite { mode: l.mode, value: l.bits })
                .collect(),
            Ok(BusWidth::Four) => latches
                .chunks_exact(2)
                .map(|pair| BusWrite {
                    mode: pair[1].mode,
                    value: (pair[0].bits << 4) | (pair[1].bits & 0x0F),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// OutputPin writing its level changes into a [`Trace`].
#[derive(Debug, Clone)]
pub struct TracePin {
    number: u8,
    trace: Trace,
}

impl TracePin {
    pub fn number(&self) -> u8 {
        self.number
    }
}

impl ErrorType for TracePin {
    type Error = Infallible;
}

impl OutputPin for TracePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.push(Event::Level { pin: self.number, high: false });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.push(Event::Level { pin: self.number, high: true });
        Ok(())
    }
}

/// DelayNs that records instead of sleeping.
#[derive(Debug, Clone)]
pub struct TraceDelay {
    trace: Trace,
}

impl DelayNs for TraceDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace.push(Event::Delay { ns: u64::from(ns) });
    }

    fn delay_us(&mut self, us: u32) {
        self.trace.push(Event::Delay { ns: u64::from(us) * 1_000 });
    }

    fn delay_ms(&mut self, ms: u32) {
        self.trace.push(Event::Delay { ns: u64::from(ms) * 1_000_000 });
    }
}

/// Error of a [`DummyGpio`] set up to fail.
#[derive(Debug, thiserror::Error)]
#[error("dummy GPIO subsystem refused to {0}")]
pub struct DummyGpioError(&'static str);

/// GPIO subsystem handing out [`TracePin`]s.
#[derive(Debug, Clone)]
pub struct DummyGpio {
    trace: Trace,
    fail_open: bool,
    fail_close: bool,
}

impl DummyGpio {
    pub fn new(trace: &Trace) -> DummyGpio {
        DummyGpio { trace: trace.clone(), fail_open: false, fail_close: false }
    }

    pub fn failing_open(trace: &Trace) -> DummyGpio {
        DummyGpio { fail_open: true, ..DummyGpio::new(trace) }
    }

    pub fn failing_close(trace: &Trace) -> DummyGpio {
        DummyGpio { fail_close: true, ..DummyGpio::new(trace) }
    }
}

impl Gpio for DummyGpio {
    type Pin = TracePin;
    type Error = DummyGpioError;

    fn open(&mut self) -> Result<(), DummyGpioError> {
        if self.fail_open {
            return Err(DummyGpioError("open"));
        }
        self.trace.push(Event::Opened);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DummyGpioError> {
        if self.fail_close {
            return Err(DummyGpioError("close"));
        }
        self.trace.push(Event::Closed);
        Ok(())
    }

    fn output(&mut self, number: u8) -> Result<TracePin, DummyGpioError> {
        self.trace.push(Event::Output { pin: number });
        Ok(self.trace.pin(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiring(data: &[u8]) -> LcdConfig {
        LcdConfig { rs: 1, enable: 2, data: data.to_vec(), width: 16 }
    }

    #[test]
    fn decodes_nibble_pairs() {
        let trace = Trace::new();
        let (mut rs, mut e) = (trace.pin(1), trace.pin(2));
        let mut d: Vec<TracePin> = [4, 5, 6, 7].iter().map(|n| trace.pin(*n)).collect();

        rs.set_high().unwrap();
        // high nibble 0x4
        d[2].set_high().unwrap();
        e.set_high().unwrap();
        e.set_low().unwrap();
        // low nibble 0x1
        d[2].set_low().unwrap();
        d[0].set_high().unwrap();
        e.set_high().unwrap();
        e.set_low().unwrap();

        assert_eq!(trace.falling_edges(2), 2);
        assert_eq!(trace.writes(&wiring(&[4, 5, 6, 7])), vec![BusWrite::data(0x41)]);
    }

    #[test]
    fn delays_are_recorded_in_nanoseconds() {
        let trace = Trace::new();
        let mut delay = trace.delay();
        delay.delay_us(40);
        delay.delay_ms(10);
        assert_eq!(trace.delays(), vec![40_000, 10_000_000]);
    }
}
