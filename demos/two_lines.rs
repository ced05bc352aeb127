//! Scrolls a message over line 1 while line 2 shows a counter, on recording pins.
//!
//! Run with `RUST_LOG=debug cargo run --example two_lines --features dummypins`.

use std::process;
use std::thread;
use std::time::Duration;

use hd44780_gpio::dummypins::{BusWrite, DummyGpio, Trace};
use hd44780_gpio::{
    set_custom_characters, Animation, Character, GpioSession, Lcd1602, LcdConfig, LineNumber,
    Mode, StdDelay, SynchronizedLcd,
};

/// Moves `text` from right to left through the line, once.
struct Scroll {
    text: String,
    width: usize,
    offset: usize,
}

impl Animation for Scroll {
    fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    fn done(&self) -> bool {
        self.offset > self.width + self.text.chars().count()
    }

    fn content(&mut self) -> String {
        let padded = format!("{}{}{}", " ".repeat(self.width), self.text, " ".repeat(self.width));
        padded.chars().skip(self.offset).take(self.width).collect()
    }

    fn advance(&mut self) -> Duration {
        self.offset += 1;
        Duration::from_millis(150)
    }
}

const HEART: Character = Character::new([0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00]);

fn main() {
    env_logger::init();

    let trace = Trace::new();
    let config = LcdConfig::four_bit(7, 8, [25, 24, 23, 18]);

    // GPIO failures leave the pins in an unknown state, nothing to recover
    let mut session = match GpioSession::open(DummyGpio::new(&trace)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&mut session, &config) {
        eprintln!("{}", e);
        process::exit(1);
    }
    if let Err(e) = session.close() {
        eprintln!("{}", e);
        process::exit(1);
    }

    let writes = trace.writes(&config);
    let data = writes.iter().filter(|w| w.mode == Mode::Data).count();
    println!("{} bytes written, {} of them data", writes.len(), data);
    if let Some(last) = writes.iter().rposition(|w| *w == BusWrite::instruction(0xC0)) {
        let line: String = writes[last + 1..].iter().map(|w| w.value as char).collect();
        println!("line 2 ends as {:?}", line);
    }
}

fn run(session: &mut GpioSession<DummyGpio>, config: &LcdConfig) -> hd44780_gpio::Result<()> {
    let lcd = SynchronizedLcd::new(Lcd1602::from_session(session, config, StdDelay)?)?;
    set_custom_characters(lcd.lcd(), &[HEART])?;

    let scroll = Scroll { text: "hello from the bus".into(), width: 0, offset: 0 };
    let handle = lcd.animate(scroll, LineNumber::Line1)?;

    let mut count = 0;
    while !handle.is_finished() {
        // slot 7 holds the heart
        let counter = format!("\u{7} {}", count);
        lcd.write_lines(None, Some(counter.as_str()))?;
        count += 1;
        thread::sleep(Duration::from_millis(200));
    }
    handle.wait()?;
    Ok(())
}
