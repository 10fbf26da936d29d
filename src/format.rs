//! The format-string interpreter.
//!
//! Per the component design, every instruction variant's encoding is "a
//! single string over `{hex, letter, space, '(' , ')'}`"; an interpreter
//! for that string suffices and generating per-variant pack/unpack code
//! is unnecessary. This module is that interpreter. Rather than
//! re-parsing an ASCII string at runtime — which would have to guess
//! whether, say, a `D` character is the literal hex nibble `0xD` or the
//! named field `D`, since both share the same alphabet — each variant
//! declares its format directly as a [`Cell`] array: the same "format as
//! data" idea the design note describes, just with the field/literal
//! distinction made once, at the call site, instead of re-derived from
//! raw text on every encode and decode.

use crate::error::EncodingError;

/// One nibble position in a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// A fixed hex nibble, always emitted/expected as-is.
    Lit(u8),
    /// A named field; consecutive occurrences of the same letter form
    /// one field, most-significant nibble first.
    Field(char),
}

/// A literal-nibble cell, for terser format tables.
pub const fn lit(nibble: u8) -> Cell {
    Cell::Lit(nibble)
}

/// A named-field cell, for terser format tables.
pub const fn field(name: char) -> Cell {
    Cell::Field(name)
}

/// An instruction's encoding, split into the always-present prefix and
/// the optional trailing extension word.
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    /// Nibble cells always present.
    pub fixed: &'static [Cell],
    /// Nibble cells present only when the variant's extension condition
    /// holds (operand width is 8 bytes, or a debug-log relative-offset
    /// operand type).
    pub extension: &'static [Cell],
}

impl FormatSpec {
    /// A format with no optional extension word.
    pub const fn simple(fixed: &'static [Cell]) -> Self {
        Self { fixed, extension: &[] }
    }

    /// Total nibble count, fixed prefix only.
    pub const fn fixed_len(&self) -> usize {
        self.fixed.len()
    }

    /// Total nibble count, fixed prefix plus extension.
    pub const fn extended_len(&self) -> usize {
        self.fixed.len() + self.extension.len()
    }

    /// Number of nibbles the named field `letter` occupies in `cells`.
    pub fn field_width(cells: &[Cell], letter: char) -> usize {
        cells.iter().filter(|c| **c == Cell::Field(letter)).count()
    }
}

/// Packs nibble values for every field into the nibble sequence described
/// by `cells`. `get` is consulted once per field occurrence, most
/// significant nibble first.
pub fn pack(cells: &[Cell], get: impl Fn(char) -> u64) -> Vec<u8> {
    let mut widths: Vec<(char, usize)> = Vec::new();
    for cell in cells {
        if let Cell::Field(c) = cell {
            if !widths.iter().any(|(n, _)| n == c) {
                widths.push((*c, FormatSpec::field_width(cells, *c)));
            }
        }
    }
    let mut consumed: Vec<(char, usize)> = widths.iter().map(|(c, _)| (*c, 0usize)).collect();
    cells
        .iter()
        .map(|cell| match cell {
            Cell::Lit(n) => *n,
            Cell::Field(c) => {
                let width = widths.iter().find(|(n, _)| n == c).unwrap().1;
                let slot = consumed.iter_mut().find(|(n, _)| n == c).unwrap();
                let shift = 4 * (width - 1 - slot.1);
                slot.1 += 1;
                ((get(*c) >> shift) & 0xF) as u8
            }
        })
        .collect()
}

/// Reads the value of field `letter` out of `nibbles`, which must have
/// the same length as `cells`.
pub fn unpack_field(cells: &[Cell], nibbles: &[u8], letter: char) -> u64 {
    let mut value = 0u64;
    for (cell, nibble) in cells.iter().zip(nibbles.iter()) {
        if *cell == Cell::Field(letter) {
            value = (value << 4) | *nibble as u64;
        }
    }
    value
}

/// Checks that every [`Cell::Lit`] in `cells` matches the corresponding
/// nibble in `nibbles`. Used to confirm a decoder picked the right
/// variant before trusting its field extraction.
pub fn literals_match(cells: &[Cell], nibbles: &[u8]) -> bool {
    cells.len() == nibbles.len()
        && cells.iter().zip(nibbles.iter()).all(|(cell, nibble)| match cell {
            Cell::Lit(expected) => expected == nibble,
            Cell::Field(_) => true,
        })
}

/// Splits `value`'s low `count * 4` bits into `count` nibbles, most
/// significant first. Used by every variant whose field width is driven
/// by an operand width or address-nibble count rather than a fixed
/// [`Cell`] layout.
pub fn nibbles_of(value: u64, count: usize) -> Vec<u8> {
    (0..count)
        .rev()
        .map(|i| ((value >> (4 * i)) & 0xF) as u8)
        .collect()
}

/// Combines a nibble slice, most significant first, into a `u64`. Inverse
/// of [`nibbles_of`].
pub fn value_from(nibbles: &[u8]) -> u64 {
    nibbles.iter().fold(0u64, |acc, n| (acc << 4) | *n as u64)
}

/// Renders a flat nibble sequence as the canonical machine-code string:
/// uppercase hex, 8-nibble words separated by a single space.
pub fn render_hex(nibbles: &[u8]) -> String {
    let hex_chars: String = nibbles.iter().map(|n| std::char::from_digit(*n as u32, 16).unwrap().to_ascii_uppercase()).collect();
    hex_chars
        .as_bytes()
        .chunks(8)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a hex nibble character, case-insensitively.
pub fn nibble_from_char(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

/// Strips whitespace from `line` and converts every remaining character
/// to its nibble value. Rejects non-hex characters and an all-whitespace
/// line; does not pad or truncate to word boundaries, and performs no
/// word-alignment of its own — callers that need the per-word padding
/// and truncation behavior of the disassembler's lenient mode use
/// `disassembler::normalize_machine_code` instead, which applies that
/// logic before ever reaching this function.
pub fn nibbles_from_hex_line(line: &str, fragment: &str) -> Result<Vec<u8>, EncodingError> {
    let collapsed: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if collapsed.is_empty() {
        return Err(EncodingError::new("empty machine-code line", fragment));
    }
    let mut nibbles = Vec::with_capacity(collapsed.len());
    for c in collapsed.chars() {
        match nibble_from_char(c) {
            Some(n) => nibbles.push(n),
            None => {
                return Err(EncodingError::new(
                    format!("non-hex character {c:?} in machine code"),
                    fragment,
                ))
            }
        }
    }
    Ok(nibbles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_FORMAT: &[Cell] = &[
        lit(0x1),
        field('T'),
        field('M'),
        field('A'),
        field('A'),
    ];

    #[test]
    fn pack_and_unpack_round_trip() {
        let nibbles = pack(TEST_FORMAT, |c| match c {
            'T' => 4,
            'M' => 1,
            'A' => 0x3A,
            _ => unreachable!(),
        });
        assert_eq!(nibbles, vec![0x1, 0x4, 0x1, 0x3, 0xA]);
        assert_eq!(unpack_field(TEST_FORMAT, &nibbles, 'A'), 0x3A);
        assert_eq!(unpack_field(TEST_FORMAT, &nibbles, 'T'), 4);
    }

    #[test]
    fn literals_match_detects_mismatch() {
        let nibbles = pack(TEST_FORMAT, |_| 0);
        assert!(literals_match(TEST_FORMAT, &nibbles));
        let mut bad = nibbles.clone();
        bad[0] = 0x2;
        assert!(!literals_match(TEST_FORMAT, &bad));
    }

    #[test]
    fn render_hex_groups_into_8_nibble_words() {
        let nibbles = vec![0u8; 16];
        assert_eq!(render_hex(&nibbles), "00000000 00000000");
    }

    #[test]
    fn nibbles_from_hex_line_rejects_non_hex() {
        assert!(nibbles_from_hex_line("12 3G", "12 3G").is_err());
    }

    #[test]
    fn nibbles_from_hex_line_ignores_whitespace() {
        let nibbles = nibbles_from_hex_line("AB CD", "AB CD").unwrap();
        assert_eq!(nibbles, vec![0xA, 0xB, 0xC, 0xD]);
    }

    #[test]
    fn nibbles_of_and_value_from_round_trip() {
        let nibbles = nibbles_of(0x1234, 8);
        assert_eq!(nibbles, vec![0, 0, 0, 0, 1, 2, 3, 4]);
        assert_eq!(value_from(&nibbles), 0x1234);
    }
}
