//! The instruction model: one variant per `dmnt` opcode family.
//!
//! [`Instruction`] is the tagged union every assembly line and every
//! machine-code line eventually becomes. Each family lives in its own
//! submodule, grouped by how closely related their encodings are, and
//! contributes a signature/decode pair that [`decode_words`] tries in
//! declaration order — more specific signatures are listed, and
//! therefore tried, before the more general ones they overlap with.

mod conditions;
mod control;
mod data_ops;
mod debug;
mod registers_ops;

pub use conditions::{IfKey, IfReg, IfRegAddress};
pub use control::{Else, EndIf, EndLoop, LoopBegin, Nop, Pause, Resume};
pub use data_ops::{IfOffImm, Load, LoadBase, LegacyArithImm, MoveReg, StoreImm, StoreImmViaReg};
pub use debug::{DebugLog, DebugOperandValue, SaveRestore, SaveRestoreMask, StaticRegRw};
pub use registers_ops::{ArithRegImm, ArithRegReg, StoreReg, StoreRegAddress};

use crate::error::EncodingError;

/// Every instruction the codec knows how to build, encode, decode and
/// format. Immutable once constructed; every variant is produced by the
/// assembly dispatcher or the machine-code decoder and consumed by
/// exactly one of `to_machine_code`/`to_assembly`.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// All-zero 3-word padding.
    Nop(Nop),
    /// Store an immediate to `[region + offset + rR]`.
    StoreImm(StoreImm),
    /// `if [region + offset] COND imm`.
    IfOffImm(IfOffImm),
    /// Closes an `if` block.
    EndIf(EndIf),
    /// Swaps an `if` block to its else branch.
    Else(Else),
    /// Opens a counted loop.
    LoopBegin(LoopBegin),
    /// Closes a counted loop.
    EndLoop(EndLoop),
    /// `rR = 0x…` (64-bit immediate move).
    MoveReg(MoveReg),
    /// Loads from `[region + offset]` or, self-deref, `[rR + offset]`.
    Load(Load),
    /// Stores an immediate via a register base, with optional second offset register.
    StoreImmViaReg(StoreImmViaReg),
    /// `rR OP= imm`, restricted to the legacy operator subset.
    LegacyArithImm(LegacyArithImm),
    /// `if key NAME | NAME | …`.
    IfKey(IfKey),
    /// `rD = rS OP rs`.
    ArithRegReg(ArithRegReg),
    /// `rD = rS OP imm`.
    ArithRegImm(ArithRegImm),
    /// Stores a register to one of six addressing shapes.
    StoreReg(StoreReg),
    /// `if rN COND …`, one of six addressing shapes.
    IfReg(IfReg),
    /// Save/restore a single register or slot.
    SaveRestore(SaveRestore),
    /// Save/restore/clear a mask of registers or slots.
    SaveRestoreMask(SaveRestoreMask),
    /// Read or write a static register.
    StaticRegRw(StaticRegRw),
    /// Pauses the cheat VM.
    Pause(Pause),
    /// Resumes the cheat VM.
    Resume(Resume),
    /// Logs an operand to the debug log.
    DebugLog(DebugLog),
}

impl Instruction {
    /// Renders this instruction's canonical machine-code form: uppercase
    /// hex, 8-nibble words separated by a single space.
    pub fn to_machine_code(&self) -> String {
        match self {
            Instruction::Nop(i) => i.encode(),
            Instruction::StoreImm(i) => i.encode(),
            Instruction::IfOffImm(i) => i.encode(),
            Instruction::EndIf(i) => i.encode(),
            Instruction::Else(i) => i.encode(),
            Instruction::LoopBegin(i) => i.encode(),
            Instruction::EndLoop(i) => i.encode(),
            Instruction::MoveReg(i) => i.encode(),
            Instruction::Load(i) => i.encode(),
            Instruction::StoreImmViaReg(i) => i.encode(),
            Instruction::LegacyArithImm(i) => i.encode(),
            Instruction::IfKey(i) => i.encode(),
            Instruction::ArithRegReg(i) => i.encode(),
            Instruction::ArithRegImm(i) => i.encode(),
            Instruction::StoreReg(i) => i.encode(),
            Instruction::IfReg(i) => i.encode(),
            Instruction::SaveRestore(i) => i.encode(),
            Instruction::SaveRestoreMask(i) => i.encode(),
            Instruction::StaticRegRw(i) => i.encode(),
            Instruction::Pause(i) => i.encode(),
            Instruction::Resume(i) => i.encode(),
            Instruction::DebugLog(i) => i.encode(),
        }
    }

    /// Renders this instruction's canonical one-line assembly form (no
    /// outer indentation — that is the cheat-file parser's job).
    pub fn to_assembly(&self) -> String {
        match self {
            Instruction::Nop(i) => i.format(),
            Instruction::StoreImm(i) => i.format(),
            Instruction::IfOffImm(i) => i.format(),
            Instruction::EndIf(i) => i.format(),
            Instruction::Else(i) => i.format(),
            Instruction::LoopBegin(i) => i.format(),
            Instruction::EndLoop(i) => i.format(),
            Instruction::MoveReg(i) => i.format(),
            Instruction::Load(i) => i.format(),
            Instruction::StoreImmViaReg(i) => i.format(),
            Instruction::LegacyArithImm(i) => i.format(),
            Instruction::IfKey(i) => i.format(),
            Instruction::ArithRegReg(i) => i.format(),
            Instruction::ArithRegImm(i) => i.format(),
            Instruction::StoreReg(i) => i.format(),
            Instruction::IfReg(i) => i.format(),
            Instruction::SaveRestore(i) => i.format(),
            Instruction::SaveRestoreMask(i) => i.format(),
            Instruction::StaticRegRw(i) => i.format(),
            Instruction::Pause(i) => i.format(),
            Instruction::Resume(i) => i.format(),
            Instruction::DebugLog(i) => i.format(),
        }
    }
}

/// Decodes one instruction out of a whitespace-normalized nibble stream.
///
/// Walks the variant table in declaration order — most-specific
/// signature first — and hands the first match to that variant's
/// decoder. `nibbles` should already be the full remaining stream for
/// this line; variants that don't consume every nibble (none do — every
/// family's format is either a fixed length or is resolved to one by its
/// own width/offset-type field) read only their own prefix.
pub fn decode_words(nibbles: &[u8], fragment: &str) -> Result<Instruction, EncodingError> {
    if let Some(i) = Nop::try_decode(nibbles) {
        return Ok(Instruction::Nop(i));
    }
    if let Some(i) = EndIf::try_decode(nibbles) {
        return Ok(Instruction::EndIf(i));
    }
    if let Some(i) = Else::try_decode(nibbles) {
        return Ok(Instruction::Else(i));
    }
    if let Some(i) = LoopBegin::try_decode(nibbles) {
        return Ok(Instruction::LoopBegin(i));
    }
    if let Some(i) = EndLoop::try_decode(nibbles) {
        return Ok(Instruction::EndLoop(i));
    }
    if let Some(i) = MoveReg::try_decode(nibbles) {
        return Ok(Instruction::MoveReg(i));
    }
    if let Some(i) = Pause::try_decode(nibbles) {
        return Ok(Instruction::Pause(i));
    }
    if let Some(i) = Resume::try_decode(nibbles) {
        return Ok(Instruction::Resume(i));
    }
    if let Some(i) = DebugLog::try_decode(nibbles, fragment)? {
        return Ok(Instruction::DebugLog(i));
    }
    if let Some(i) = SaveRestore::try_decode(nibbles) {
        return Ok(Instruction::SaveRestore(i));
    }
    if let Some(i) = SaveRestoreMask::try_decode(nibbles) {
        return Ok(Instruction::SaveRestoreMask(i));
    }
    if let Some(i) = StaticRegRw::try_decode(nibbles) {
        return Ok(Instruction::StaticRegRw(i));
    }
    if let Some(i) = IfReg::try_decode(nibbles, fragment)? {
        return Ok(Instruction::IfReg(i));
    }
    if let Some(i) = IfKey::try_decode(nibbles) {
        return Ok(Instruction::IfKey(i));
    }
    if let Some(i) = ArithRegReg::try_decode(nibbles) {
        return Ok(Instruction::ArithRegReg(i));
    }
    if let Some(i) = ArithRegImm::try_decode(nibbles, fragment)? {
        return Ok(Instruction::ArithRegImm(i));
    }
    if let Some(i) = StoreReg::try_decode(nibbles, fragment)? {
        return Ok(Instruction::StoreReg(i));
    }
    if let Some(i) = StoreImm::try_decode(nibbles, fragment)? {
        return Ok(Instruction::StoreImm(i));
    }
    if let Some(i) = IfOffImm::try_decode(nibbles, fragment)? {
        return Ok(Instruction::IfOffImm(i));
    }
    if let Some(i) = Load::try_decode(nibbles) {
        return Ok(Instruction::Load(i));
    }
    if let Some(i) = StoreImmViaReg::try_decode(nibbles) {
        return Ok(Instruction::StoreImmViaReg(i));
    }
    if let Some(i) = LegacyArithImm::try_decode(nibbles) {
        return Ok(Instruction::LegacyArithImm(i));
    }
    Err(EncodingError::new(
        "no instruction signature matches this machine code",
        fragment,
    ))
}

/// Splits `nibbles` into `8 * word_count`-aligned words and pads a short
/// final word with zeros; used by families whose word count varies with
/// an operand-width or operand-type field discovered mid-decode.
pub(crate) fn pad_to_words(nibbles: &[u8], word_count: usize) -> Vec<u8> {
    let mut v = nibbles.to_vec();
    v.resize(word_count * 8, 0);
    v
}
