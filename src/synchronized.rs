//! Per-line locking on top of an [`Lcd`].
//!
//! Each line has its own lock. A writer holds it for one line write, an animation for its
//! whole lifetime, so a long animation on one line never holds up the other line. The
//! driver's own bus lock still orders the individual byte writes of both lines.
//!
//! A line lock is either free or held by exactly one writer or animation. Its guard owns a
//! reference to the lock, so it can move to the animation thread.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use log::debug;

use crate::{
    animation::{self, Animation, AnimationHandle},
    error::Result,
    line::LineNumber,
    Lcd,
};

#[derive(Debug, Default)]
pub(crate) struct LineLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl LineLock {
    /// Block until the line is free, then take it.
    pub(crate) fn acquire(self: &Arc<Self>) -> LineGuard {
        let held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        let mut held = self
            .released
            .wait_while(held, |held| *held)
            .unwrap_or_else(PoisonError::into_inner);
        *held = true;
        LineGuard { lock: Arc::clone(self) }
    }

    pub(crate) fn is_held(&self) -> bool {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds a line until dropped.
#[derive(Debug)]
pub(crate) struct LineGuard {
    lock: Arc<LineLock>,
}

impl Drop for LineGuard {
    fn drop(&mut self) {
        *self.lock.held.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.lock.released.notify_one();
    }
}

/// A display whose two lines can be written and animated independently from several threads.
///
/// Cloning is cheap and shares the display and its locks.
#[derive(Debug)]
pub struct SynchronizedLcd<L> {
    lcd: Arc<L>,
    line1: Arc<LineLock>,
    line2: Arc<LineLock>,
}

impl<L> Clone for SynchronizedLcd<L> {
    fn clone(&self) -> Self {
        SynchronizedLcd {
            lcd: Arc::clone(&self.lcd),
            line1: Arc::clone(&self.line1),
            line2: Arc::clone(&self.line2),
        }
    }
}

impl<L: Lcd> SynchronizedLcd<L> {
    /// Initialize `lcd` and wrap it.
    pub fn new(lcd: L) -> Result<SynchronizedLcd<L>> {
        lcd.initialize()?;
        Ok(SynchronizedLcd {
            lcd: Arc::new(lcd),
            line1: Arc::default(),
            line2: Arc::default(),
        })
    }

    /// The wrapped display, for operations that aren't per line (clear, glyphs, ...).
    pub fn lcd(&self) -> &L {
        &self.lcd
    }

    fn line_lock(&self, line: LineNumber) -> &Arc<LineLock> {
        match line {
            LineNumber::Line1 => &self.line1,
            LineNumber::Line2 => &self.line2,
        }
    }

    /// Whether a writer or an animation currently holds `line`.
    pub fn is_busy(&self, line: LineNumber) -> bool {
        self.line_lock(line).is_held()
    }

    /// Write the given lines, each one under its own line lock.
    ///
    /// The two writes are independent: the first line is visible (and unlocked) before the
    /// second one is started. Blocks while an animation runs on a requested line.
    pub fn write_lines(&self, first: Option<&str>, second: Option<&str>) -> Result<()> {
        if let Some(text) = first {
            self.write_line(text, LineNumber::Line1)?;
        }
        if let Some(text) = second {
            self.write_line(text, LineNumber::Line2)?;
        }
        Ok(())
    }

    /// Write one line under its line lock.
    pub fn write_line(&self, text: &str, line: LineNumber) -> Result<()> {
        let _line = self.line_lock(line).acquire();
        self.lcd.write_line(text, line)
    }
}

impl<L> SynchronizedLcd<L>
where
    L: Lcd + Send + Sync + 'static,
{
    /// Run `animation` on `line` in a background thread.
    ///
    /// The line is taken before this returns (blocking while someone else holds it) and
    /// stays taken until the animation reports done. The other line stays usable.
    pub fn animate<A>(&self, animation: A, line: LineNumber) -> Result<AnimationHandle>
    where
        A: Animation + Send + 'static,
    {
        let guard = self.line_lock(line).acquire();
        debug!("{} locked for animation", line);
        animation::spawn(Arc::clone(&self.lcd), animation, line, guard)
    }
}
