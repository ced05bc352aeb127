//! Line addressing and line formatting.
//!
//! A two line HD44780 module maps its first line at DDRAM 0x00 and its second at 0x40,
//! independent of how many characters are visible. A line is always rewritten as a whole:
//! text is right aligned and padded with spaces to the display width, or cut to it.

use core::fmt;

use crate::instructions::Instruction;

/// One of the two lines of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineNumber {
    Line1,
    Line2,
}

impl LineNumber {
    /// DDRAM address of the first character of the line.
    pub fn address(self) -> u8 {
        match self {
            LineNumber::Line1 => 0x00,
            LineNumber::Line2 => 0x40,
        }
    }

    /// The "set DDRAM address" instruction moving the cursor to the start of the line.
    /// `0x80` for line 1, `0xC0` for line 2.
    pub fn instruction(self) -> Instruction {
        Instruction::SetDdramAddress(self.address())
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineNumber::Line1 => f.write_str("line1"),
            LineNumber::Line2 => f.write_str("line2"),
        }
    }
}

/// Exactly `width` characters: `text` right aligned, or its first `width` characters.
pub fn format_line(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
        .chars()
        .take(width)
        .collect()
}

/// Character ROM code for `c`.
///
/// Code points up to 0xFF are sent as is (0..=7 select the custom glyphs), everything
/// else shows up as `?`.
pub fn encode_char(c: char) -> u8 {
    u8::try_from(c).unwrap_or(b'?')
}
