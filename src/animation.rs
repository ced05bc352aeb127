//! Line animations.
//!
//! An [`Animation`] produces the text of one line, frame by frame, and decides on its own
//! when it is done. [`SynchronizedLcd::animate`](crate::SynchronizedLcd::animate) drives it
//! from a background thread that holds the line for the animation's whole lifetime.
//!
//! Frames are written fire and forget: a frame that fails to reach the pins is logged and
//! dropped, the next frame is written as usual.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    line::LineNumber,
    synchronized::LineGuard,
    Lcd,
};

/// Content source for one display line.
pub trait Animation {
    /// Width of the line the animation will run on. Called once, before the first frame.
    fn set_width(&mut self, width: usize);

    /// No more frames. Checked before every frame.
    fn done(&self) -> bool;

    /// Text of the current frame.
    fn content(&mut self) -> String;

    /// Step to the next frame, returning how long the current frame stays on display.
    fn advance(&mut self) -> Duration;
}

impl<A: Animation + ?Sized> Animation for Box<A> {
    fn set_width(&mut self, width: usize) {
        (**self).set_width(width)
    }

    fn done(&self) -> bool {
        (**self).done()
    }

    fn content(&mut self) -> String {
        (**self).content()
    }

    fn advance(&mut self) -> Duration {
        (**self).advance()
    }
}

/// Completion handle of a running animation.
#[derive(Debug)]
pub struct AnimationHandle {
    line: LineNumber,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<usize>,
}

impl AnimationHandle {
    pub fn line(&self) -> LineNumber {
        self.line
    }

    /// Ask the animation to end after the current frame.
    ///
    /// The line is released as if the animation had reported done.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// The animation ended and its line is free again.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the animation ended. Returns the number of frames shown.
    pub fn wait(self) -> Result<usize> {
        let line = self.line;
        self.thread.join().map_err(|_| Error::AnimationPanicked(line))
    }
}

pub(crate) fn spawn<L, A>(
    lcd: Arc<L>,
    mut animation: A,
    line: LineNumber,
    guard: LineGuard,
) -> Result<AnimationHandle>
where
    L: Lcd + Send + Sync + 'static,
    A: Animation + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_requested = Arc::clone(&stop);

    let thread = thread::Builder::new()
        .name(format!("lcd-{}", line))
        .spawn(move || {
            let frames = run(&*lcd, &mut animation, line, &stop_requested);
            // the line is free before the handle reports completion
            drop(guard);
            frames
        })
        .map_err(Error::Spawn)?;

    Ok(AnimationHandle { line, stop, thread })
}

fn run<L, A>(lcd: &L, animation: &mut A, line: LineNumber, stop: &AtomicBool) -> usize
where
    L: Lcd + ?Sized,
    A: Animation + ?Sized,
{
    animation.set_width(lcd.width());
    debug!("animation on {} started", line);

    let mut frames = 0;
    while !animation.done() {
        if stop.load(Ordering::Relaxed) {
            debug!("animation on {} stopped", line);
            break;
        }
        let content = animation.content();
        if let Err(e) = lcd.write_line(&content, line) {
            warn!("dropped animation frame on {}: {}", line, e);
        }
        frames += 1;
        thread::sleep(animation.advance());
    }

    debug!("animation on {} finished after {} frames", line, frames);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Character, Mode};
    use std::sync::Mutex;

    /// Records every line write, fails the ones containing "fail".
    #[derive(Default)]
    struct Lines(Mutex<Vec<(String, LineNumber)>>);

    impl Lcd for Lines {
        fn initialize(&self) -> Result<()> {
            Ok(())
        }
        fn reset(&self) -> Result<()> {
            Ok(())
        }
        fn entry_mode_set(&self, _: bool, _: bool) -> Result<()> {
            Ok(())
        }
        fn display_mode_set(&self, _: bool, _: bool, _: bool) -> Result<()> {
            Ok(())
        }
        fn clear(&self) -> Result<()> {
            Ok(())
        }
        fn return_home(&self) -> Result<()> {
            Ok(())
        }
        fn write(&self, _: u8, _: Mode) -> Result<()> {
            Ok(())
        }
        fn write_line(&self, text: &str, line: LineNumber) -> Result<()> {
            self.0.lock().unwrap().push((text.to_string(), line));
            if text.contains("fail") {
                return Err(Error::Pin(embedded_hal::digital::ErrorKind::Other));
            }
            Ok(())
        }
        fn create_character(&self, _: u8, _: &Character) -> Result<()> {
            Ok(())
        }
        fn width(&self) -> usize {
            8
        }
        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct Frames {
        frames: Vec<&'static str>,
        next: usize,
        width: Option<usize>,
    }

    impl Frames {
        fn new(frames: &[&'static str]) -> Frames {
            Frames { frames: frames.to_vec(), next: 0, width: None }
        }
    }

    impl Animation for Frames {
        fn set_width(&mut self, width: usize) {
            self.width = Some(width);
        }
        fn done(&self) -> bool {
            self.next >= self.frames.len()
        }
        fn content(&mut self) -> String {
            assert_eq!(self.width, Some(8), "width is set before the first frame");
            self.frames[self.next].to_string()
        }
        fn advance(&mut self) -> Duration {
            self.next += 1;
            Duration::ZERO
        }
    }

    #[test]
    fn every_frame_is_written_once() {
        let lcd = Lines::default();
        let mut frames = Frames::new(&["a", "b", "c"]);
        let shown = run(&lcd, &mut frames, LineNumber::Line2, &AtomicBool::new(false));

        assert_eq!(shown, 3);
        let written = lcd.0.into_inner().unwrap();
        assert_eq!(
            written,
            vec![
                ("a".to_string(), LineNumber::Line2),
                ("b".to_string(), LineNumber::Line2),
                ("c".to_string(), LineNumber::Line2),
            ]
        );
    }

    #[test]
    fn failed_frames_are_not_retried() {
        let lcd = Lines::default();
        let mut frames = Frames::new(&["a", "fail", "c"]);
        let shown = run(&lcd, &mut frames, LineNumber::Line1, &AtomicBool::new(false));

        assert_eq!(shown, 3);
        let texts: Vec<String> = lcd.0.into_inner().unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["a", "fail", "c"]);
    }

    #[test]
    fn stop_request_ends_before_the_next_frame() {
        let lcd = Lines::default();
        let mut frames = Frames::new(&["a", "b"]);
        let shown = run(&lcd, &mut frames, LineNumber::Line1, &AtomicBool::new(true));

        assert_eq!(shown, 0);
        assert!(lcd.0.into_inner().unwrap().is_empty());
    }
}
