//! Bus level behaviour of the driver, replayed from recorded pin levels.

use hd44780_gpio::dummypins::{BusWrite, DummyGpio, Trace, TraceDelay, TracePin};
use hd44780_gpio::{
    set_custom_characters, Character, Error, GpioSession, Lcd, Lcd1602, LcdConfig, LineNumber,
    Mode,
};

fn four_bit() -> LcdConfig {
    LcdConfig::four_bit(7, 8, [25, 24, 23, 18])
}

fn eight_bit() -> LcdConfig {
    LcdConfig::eight_bit(7, 8, [2, 3, 4, 17, 25, 24, 23, 18])
}

fn open(trace: &Trace, config: &LcdConfig) -> Lcd1602<TracePin, TraceDelay> {
    let mut session = GpioSession::open(DummyGpio::new(trace)).unwrap();
    let lcd = Lcd1602::from_session(&mut session, config, trace.delay()).unwrap();
    session.close().unwrap();
    trace.clear();
    lcd
}

#[test]
fn three_data_pins_fail_construction() {
    let trace = Trace::new();
    let mut session = GpioSession::open(DummyGpio::new(&trace)).unwrap();
    let config = LcdConfig { rs: 7, enable: 8, data: vec![25, 24, 23], width: 16 };

    match Lcd1602::from_session(&mut session, &config, trace.delay()) {
        Err(Error::DataPinCount(3)) => {}
        other => panic!("expected a pin count error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn nibble_mode_pulses_twice_per_write() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);

    for value in [0x00, 0x5A, 0xFF] {
        trace.clear();
        lcd.write(value, Mode::Data).unwrap();
        assert_eq!(trace.falling_edges(config.enable), 2);
        assert_eq!(trace.writes(&config), vec![BusWrite::data(value)]);
    }
}

#[test]
fn eight_bit_mode_pulses_once_per_write() {
    let trace = Trace::new();
    let config = eight_bit();
    let lcd = open(&trace, &config);

    for value in [0x00, 0xA5, 0xFF] {
        trace.clear();
        lcd.write(value, Mode::Instruction).unwrap();
        assert_eq!(trace.falling_edges(config.enable), 1);
        assert_eq!(trace.writes(&config), vec![BusWrite::instruction(value)]);
    }
}

#[test]
fn every_pulse_waits_the_default_execution_time() {
    let trace = Trace::new();
    let lcd = open(&trace, &four_bit());
    lcd.write(b'x', Mode::Data).unwrap();

    assert_eq!(trace.delays(), vec![1_000, 1_000, 40_000, 1_000, 1_000, 40_000]);
}

#[test]
fn create_character_is_one_instruction_and_eight_rows() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);
    let bell = Character::new([0x04, 0x0E, 0x0E, 0x0E, 0x1F, 0x00, 0x04, 0x00]);

    for position in 0..8u8 {
        trace.clear();
        lcd.create_character(position, &bell).unwrap();

        let writes = trace.writes(&config);
        assert_eq!(writes.len(), 9);
        assert_eq!(writes[0], BusWrite::instruction(0x40 | (position << 3)));
        assert!(writes[1..].iter().all(|w| w.mode == Mode::Data));
    }

    for position in [8u8, 9, 200, 255] {
        trace.clear();
        assert!(lcd.create_character(position, &bell).is_err());
        assert!(trace.events().is_empty());
    }
}

#[test]
fn initialize_then_write_line() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);

    lcd.initialize().unwrap();
    trace.clear();
    lcd.write_line("hi", LineNumber::Line1).unwrap();

    let mut expected = vec![BusWrite::instruction(0x80)];
    expected.extend("              hi".bytes().map(BusWrite::data));
    assert_eq!(trace.writes(&config), expected);
}

#[test]
fn second_line_is_addressed_at_0x40() {
    let trace = Trace::new();
    let config = eight_bit().with_width(4);
    let lcd = open(&trace, &config);
    lcd.write_line("abcdef", LineNumber::Line2).unwrap();

    let mut expected = vec![BusWrite::instruction(0xC0)];
    expected.extend(b"abcd".iter().copied().map(BusWrite::data));
    assert_eq!(trace.writes(&config), expected);
}

#[test]
fn line_writes_always_span_the_width() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);

    for text in ["", "x", "exactly 16 chars", "a good deal longer than sixteen"] {
        trace.clear();
        lcd.write_line(text, LineNumber::Line1).unwrap();
        let data = trace.writes(&config).iter().filter(|w| w.mode == Mode::Data).count();
        assert_eq!(data, 16, "{:?}", text);
    }
}

#[test]
fn clear_twice_is_two_identical_instructions() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);

    lcd.clear().unwrap();
    let once = trace.events();
    lcd.clear().unwrap();

    assert_eq!(
        trace.writes(&config),
        vec![BusWrite::instruction(0x01), BusWrite::instruction(0x01)]
    );
    let events = trace.events();
    assert_eq!(events[..once.len()], events[once.len()..]);
}

#[test]
fn custom_characters_fill_cgram_from_the_top() {
    let trace = Trace::new();
    let config = four_bit();
    let lcd = open(&trace, &config);
    let glyphs = [Character::new([0x1F; 8]), Character::new([0x11; 8])];

    set_custom_characters(&lcd, &glyphs).unwrap();

    let addresses: Vec<u8> = trace
        .writes(&config)
        .into_iter()
        .filter(|w| w.mode == Mode::Instruction)
        .map(|w| w.value)
        .collect();
    // slots 6 and 7
    assert_eq!(addresses, vec![0x70, 0x78]);
}
