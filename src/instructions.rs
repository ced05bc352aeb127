//! # Module defining the instruction set of the HD44780
//!
//! All instructions are implemented as enum variants, their flags as named fields.
//! The bit layout follows the Hitachi HD44780U data sheet, table 6 ("Instructions").
//!
//! The controller has no handshake the driver could wait on (the R/W pin is tied to ground
//! on the usual 1602 modules, so the busy flag can't be read). Every instruction therefore
//! has a fixed execution time the bus has to stay idle for after latching it:
//!
//!  - 37µs for most instructions, rounded up to 40µs in this driver
//!  - 1.52ms for "return home"
//!
//! ## Bus width
//! After power on the controller is in 8-bit mode, or in the middle of a nibble when the
//! host reset without power cycling. The reset sequence `0x33, 0x32` sent as nibbles
//! (`3, 3, 3, 2`) gets the controller out of every one of those states and into 4-bit mode.
//! The function set following it picks the final width and the number of lines.

/// Register select: which of the two controller registers a byte is latched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// RS low, the byte is an instruction
    Instruction,
    /// RS high, the byte goes to DDRAM or CGRAM, whichever was addressed last
    Data,
}

/// Re-synchronisation bytes sent by `reset()`, in order.
pub const RESET_SEQUENCE: [u8; 2] = [0b0011_0011, 0b0011_0010];

/// HD44780 instruction set, see data sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// clear DDRAM and set the address counter to 0
    // translates to: 0x01
    ClearDisplay,

    /// set the address counter to 0 and undo any display shift
    // translates to: 0x02
    ReturnHome,

    /// what the address counter and the display do after each data write
    // translates to: 0x04 OR with I/D and S
    EntryModeSet {
        /// I/D, move the cursor right (increment) instead of left
        increment: bool,
        /// S, shift the whole display instead of moving the cursor
        shift: bool,
    },

    /// display, cursor and cursor blink on/off
    // translates to: 0x08 OR with D, C and B
    DisplayControl {
        /// D
        display: bool,
        /// C
        cursor: bool,
        /// B
        blink: bool,
    },

    /// interface width, number of lines, font
    // translates to: 0x20 OR with DL, N and F
    FunctionSet {
        /// DL, 8 data lines instead of 4
        eight_bit: bool,
        /// N, two display lines
        two_lines: bool,
        /// F, 5x10 dots instead of 5x8
        large_font: bool,
    },

    /// point the address counter at the first row of a CGRAM glyph slot (0..=7)
    // translates to: 0x40 OR with slot << 3
    SetCgramAddress(u8),

    /// point the address counter at a DDRAM cell
    // translates to: 0x80 OR with 7 bit address
    SetDdramAddress(u8),
}

use Instruction::*;

impl Instruction {
    /// Returns the instruction as the byte presented on the data lines
    pub fn byte(self) -> u8 {
        match self {
            ClearDisplay => 0b0000_0001,
            ReturnHome => 0b0000_0010,
            EntryModeSet { increment, shift } => {
                0b0000_0100 | ((increment as u8) << 1) | shift as u8
            }
            DisplayControl { display, cursor, blink } => {
                0b0000_1000 | ((display as u8) << 2) | ((cursor as u8) << 1) | blink as u8
            }
            FunctionSet { eight_bit, two_lines, large_font } => {
                0b0010_0000
                    | ((eight_bit as u8) << 4)
                    | ((two_lines as u8) << 3)
                    | ((large_font as u8) << 2)
            }
            SetCgramAddress(slot) => 0b0100_0000 | ((slot & 0b111) << 3),
            SetDdramAddress(address) => 0b1000_0000 | (address & 0b0111_1111),
        }
    }
}
