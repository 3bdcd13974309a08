//! Morse code table
//!
//! Maps printable ASCII starting at the space character to an element stream.
//! A dit is a `0` bit and a dah a `1` bit, most significant bit first. The
//! elements are followed by a single `1` bit and zero padding, so a stream
//! that has been shifted left until it equals `0b1000_0000` is finished.

use crate::types::{Element, KeyerError};

/// First byte covered by the table (ASCII space)
pub const TABLE_ORIGIN: u8 = b' ';

const END_OF_CHARACTER: u8 = 0b1000_0000;
const WORD_SPACE: u8 = 0b1111_1111;

static MORSE_TABLE: [u8; 91] = [
    WORD_SPACE,       // ' '
    END_OF_CHARACTER, // '!'
    END_OF_CHARACTER, // '"'
    END_OF_CHARACTER, // '#'
    END_OF_CHARACTER, // '$'
    END_OF_CHARACTER, // '%'
    END_OF_CHARACTER, // '&'
    END_OF_CHARACTER, // '\''
    END_OF_CHARACTER, // '('
    END_OF_CHARACTER, // ')'
    END_OF_CHARACTER, // '*'
    END_OF_CHARACTER, // '+'
    END_OF_CHARACTER, // ','
    0b1110_0000,      // '-' sent as "M"
    END_OF_CHARACTER, // '.'
    0b1001_0100,      // '/'
    0b1111_1100,      // '0'
    0b0111_1100,      // '1'
    0b0011_1100,      // '2'
    0b0001_1100,      // '3'
    0b0000_1100,      // '4'
    0b0000_0100,      // '5'
    0b1000_0100,      // '6'
    0b1100_0100,      // '7'
    0b1110_0100,      // '8'
    0b1111_0100,      // '9'
    END_OF_CHARACTER, // ':'
    END_OF_CHARACTER, // ';'
    END_OF_CHARACTER, // '<'
    0b1000_1100,      // '=' (BT)
    END_OF_CHARACTER, // '>'
    0b0011_0010,      // '?'
    END_OF_CHARACTER, // '@'
    0b0110_0000,      // 'A'
    0b1000_1000,      // 'B'
    0b1010_1000,      // 'C'
    0b1001_0000,      // 'D'
    0b0100_0000,      // 'E'
    0b0010_1000,      // 'F'
    0b1101_0000,      // 'G'
    0b0000_1000,      // 'H'
    0b0010_0000,      // 'I'
    0b0111_1000,      // 'J'
    0b1011_0000,      // 'K'
    0b0100_1000,      // 'L'
    0b1110_0000,      // 'M'
    0b1010_0000,      // 'N'
    0b1111_0000,      // 'O'
    0b0110_1000,      // 'P'
    0b1101_1000,      // 'Q'
    0b0101_0000,      // 'R'
    0b0001_0000,      // 'S'
    0b1100_0000,      // 'T'
    0b0011_0000,      // 'U'
    0b0001_1000,      // 'V'
    0b0111_0000,      // 'W'
    0b1001_1000,      // 'X'
    0b1011_1000,      // 'Y'
    0b1100_1000,      // 'Z'
    END_OF_CHARACTER, // '['
    END_OF_CHARACTER, // '\\'
    END_OF_CHARACTER, // ']'
    END_OF_CHARACTER, // '^'
    END_OF_CHARACTER, // '_'
    END_OF_CHARACTER, // '`'
    0b0110_0000,      // 'a'
    0b1000_1000,      // 'b'
    0b1010_1000,      // 'c'
    0b1001_0000,      // 'd'
    0b0100_0000,      // 'e'
    0b0010_1000,      // 'f'
    0b1101_0000,      // 'g'
    0b0000_1000,      // 'h'
    0b0010_0000,      // 'i'
    0b0111_1000,      // 'j'
    0b1011_0000,      // 'k'
    0b0100_1000,      // 'l'
    0b1110_0000,      // 'm'
    0b1010_0000,      // 'n'
    0b1111_0000,      // 'o'
    0b0110_1000,      // 'p'
    0b1101_1000,      // 'q'
    0b0101_0000,      // 'r'
    0b0001_0000,      // 's'
    0b1100_0000,      // 't'
    0b0011_0000,      // 'u'
    0b0001_1000,      // 'v'
    0b0111_0000,      // 'w'
    0b1001_1000,      // 'x'
    0b1011_1000,      // 'y'
    0b1100_1000,      // 'z'
];

/// Remaining elements of one character
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElementStream(u8);

impl ElementStream {
    /// Returns true once every element has been shifted out
    pub const fn is_empty(&self) -> bool {
        self.0 == END_OF_CHARACTER
    }

    /// Number of elements left
    pub const fn len(&self) -> usize {
        // Everything above the lowest set bit is an element
        7 - self.0.trailing_zeros() as usize
    }
}

impl Iterator for ElementStream {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        let element = if self.0 & 0b1000_0000 != 0 {
            Element::Dah
        } else {
            Element::Dit
        };
        self.0 <<= 1;
        Some(element)
    }
}

/// Result of a table lookup
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// A character with at least one element
    Code(ElementStream),
    /// Inter-word space
    WordSpace,
}

/// Look up an ASCII byte
pub fn lookup(byte: u8) -> Result<Symbol, KeyerError> {
    let index = byte.checked_sub(TABLE_ORIGIN).ok_or(KeyerError::NotEncodable)?;
    match MORSE_TABLE.get(index as usize) {
        Some(&WORD_SPACE) => Ok(Symbol::WordSpace),
        Some(&END_OF_CHARACTER) | None => Err(KeyerError::NotEncodable),
        Some(&bits) => Ok(Symbol::Code(ElementStream(bits))),
    }
}

/// Look up a character; anything outside ASCII is not encodable
pub fn lookup_char(ch: char) -> Result<Symbol, KeyerError> {
    if ch.is_ascii() {
        lookup(ch as u8)
    } else {
        Err(KeyerError::NotEncodable)
    }
}
