//! The machine-code-line decoder.
//!
//! Grounded on `original_source/dmnt_asm/instructions.py`'s
//! `_normalize_mc`/`vm_inst_dism`: normalize whitespace, reject non-hex
//! input, hand the flat nibble stream to [`crate::instructions::decode_words`].
//! The `STRICT_MODE` toggle from that source becomes [`DecodeOptions::strict`],
//! a per-call option rather than a module-level global, per the component
//! design's resolution of that global-mutable-state flag.

use crate::error::{CodecError, EncodingError};
use crate::format::{self, nibbles_from_hex_line};
use crate::instructions::{self, Instruction};

/// Options controlling how lenient the decoder is about its input's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// When `false` (the default), each whitespace-separated token is
    /// independently re-aligned to an 8-nibble word: short tokens are
    /// zero-padded on the left, long all-zero-prefixed tokens are
    /// truncated to their last 8 nibbles. When `true`, the input is
    /// taken as a single flat nibble stream that must already be a
    /// multiple of 8 nibbles long, with no leniency applied.
    pub strict: bool,
}

/// Decodes one line of machine code into an [`Instruction`].
pub fn disassemble_line(raw: &str, options: DecodeOptions) -> Result<Instruction, CodecError> {
    // A line of nothing but whitespace and zero digits is the all-zero
    // Nop padding, regardless of its length or word-alignment.
    if raw.chars().all(|c| c.is_whitespace() || c == '0') {
        return Ok(Instruction::Nop(instructions::Nop::build()));
    }
    let nibbles = normalize_machine_code(raw, options.strict)?;
    Ok(instructions::decode_words(&nibbles, raw)?)
}

fn normalize_machine_code(raw: &str, strict: bool) -> Result<Vec<u8>, EncodingError> {
    if !strict && raw.chars().any(char::is_whitespace) {
        let mut nibbles = Vec::new();
        for word in raw.split_whitespace() {
            let aligned = match word.len() {
                len if len > 8 => {
                    let (prefix, suffix) = word.split_at(len - 8);
                    if prefix.chars().any(|c| c != '0') {
                        return Err(EncodingError::new(format!("invalid value {word:?} in {raw:?}"), raw));
                    }
                    suffix.to_string()
                }
                len if len < 8 => format!("{word:0>8}"),
                _ => word.to_string(),
            };
            for c in aligned.chars() {
                nibbles.push(format::nibble_from_char(c).ok_or_else(|| {
                    EncodingError::new(format!("non-hex character {c:?} in machine code"), raw)
                })?);
            }
        }
        return Ok(nibbles);
    }
    let nibbles = nibbles_from_hex_line(raw, raw)?;
    if nibbles.len() % 8 != 0 {
        return Err(EncodingError::new("machine code length is not word-aligned", raw));
    }
    Ok(nibbles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scenario_2() {
        let i = disassemble_line("18110000 00001234 00000000 00005678", DecodeOptions::default()).unwrap();
        assert_eq!(i.to_assembly(), "if u64 [heap + 0x1234] > 0x5678");
    }

    #[test]
    fn decodes_scenario_3() {
        let i = disassemble_line("30020000 0000000A", DecodeOptions::default()).unwrap();
        assert_eq!(i.to_machine_code(), "30020000 0000000A");
    }

    #[test]
    fn lenient_mode_pads_short_words() {
        // A careless transcription drops the leading zeros of the second
        // word; lenient mode re-pads each word independently.
        let i = disassemble_line("30020000 A", DecodeOptions::default()).unwrap();
        assert_eq!(i.to_machine_code(), "30020000 0000000A");
    }

    #[test]
    fn lenient_mode_truncates_zero_prefixed_long_words() {
        let i = disassemble_line("000FF000000", DecodeOptions::default()).unwrap();
        assert_eq!(i.to_machine_code(), "FF000000");
    }

    #[test]
    fn strict_mode_rejects_misaligned_length() {
        let err = disassemble_line("FF0 0", DecodeOptions { strict: true }).unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
    }

    #[test]
    fn strict_mode_accepts_flat_aligned_input() {
        let i = disassemble_line("FF000000", DecodeOptions { strict: true }).unwrap();
        assert_eq!(i.to_assembly(), "pause");
    }

    #[test]
    fn all_zero_line_is_nop_regardless_of_length() {
        let i = disassemble_line("00000000 00000000 00000000", DecodeOptions::default()).unwrap();
        assert_eq!(i.to_assembly(), "nop");
    }

    #[test]
    fn rejects_non_hex_input() {
        let err = disassemble_line("GGGGGGGG", DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
    }

    #[test]
    fn rejects_unrecognized_signature() {
        let err = disassemble_line("BBBBBBBB", DecodeOptions { strict: true }).unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
    }
}
