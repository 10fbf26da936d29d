//! No-ops, block markers and the VM run/pause switches.
//!
//! These are the simplest families in the table: either fully literal
//! (no fields at all) or a single register operand. Grounded on the
//! opcode-signature table's `nop`/`endif`/`else`/`loop-*`/`pause`/`resume`
//! rows.

use crate::format::{nibbles_of, value_from};
use crate::registers::Register;

/// All-zero 3-word padding, indistinguishable on the wire from a
/// store-imm of value zero to register zero at offset zero — the
/// decoder tries this variant first so the all-zero case always reads
/// back as `nop`, matching the reference implementation's special-cased
/// credit padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nop;

impl Nop {
    /// Builds the single `Nop` value; there is nothing to validate.
    pub fn build() -> Self {
        Self
    }

    pub(crate) fn encode(&self) -> String {
        "00000000 00000000 00000000".to_string()
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        let word = &nibbles[..nibbles.len().min(24)];
        (word.len() == 24 && word.iter().all(|n| *n == 0)).then_some(Self)
    }

    pub(crate) fn format(&self) -> String {
        "nop".to_string()
    }
}

/// Closes an `if` block. Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndIf;

impl EndIf {
    pub fn build() -> Self {
        Self
    }

    pub(crate) fn encode(&self) -> String {
        "20000000".to_string()
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        (nibbles.len() >= 8 && nibbles[..8] == [2, 0, 0, 0, 0, 0, 0, 0]).then_some(Self)
    }

    pub(crate) fn format(&self) -> String {
        "endif".to_string()
    }
}

/// Swaps an `if` block to its else branch. Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Else;

impl Else {
    pub fn build() -> Self {
        Self
    }

    pub(crate) fn encode(&self) -> String {
        "21000000".to_string()
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        (nibbles.len() >= 8 && nibbles[..8] == [2, 1, 0, 0, 0, 0, 0, 0]).then_some(Self)
    }

    pub(crate) fn format(&self) -> String {
        "else".to_string()
    }
}

/// Opens a counted loop: `loop rR to V`. `V` is a 32-bit iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBegin {
    pub register: Register,
    pub count: u32,
}

impl LoopBegin {
    pub fn build(register: Register, count: u32) -> Self {
        Self { register, count }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![3, 0, 0, self.register.index()];
        nibbles.extend([0, 0, 0, 0]);
        nibbles.extend(nibbles_of(self.count as u64, 8));
        crate::format::render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 16 || nibbles[0] != 3 || nibbles[1] != 0 {
            return None;
        }
        let register = Register::new(nibbles[3])?;
        let count = value_from(&nibbles[8..16]) as u32;
        Some(Self { register, count })
    }

    pub(crate) fn format(&self) -> String {
        format!("loop {} to {}", self.register, self.count)
    }
}

/// Closes the most recently opened counted loop for `rR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndLoop {
    pub register: Register,
}

impl EndLoop {
    pub fn build(register: Register) -> Self {
        Self { register }
    }

    pub(crate) fn encode(&self) -> String {
        let nibbles = [3, 1, 0, self.register.index(), 0, 0, 0, 0];
        crate::format::render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 3 || nibbles[1] != 1 {
            return None;
        }
        let register = Register::new(nibbles[3])?;
        Some(Self { register })
    }

    pub(crate) fn format(&self) -> String {
        format!("endloop {}", self.register)
    }
}

/// Pauses the cheat VM. Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pause;

impl Pause {
    pub fn build() -> Self {
        Self
    }

    pub(crate) fn encode(&self) -> String {
        "FF000000".to_string()
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        (nibbles.len() >= 8 && nibbles[..8] == [0xF, 0xF, 0, 0, 0, 0, 0, 0]).then_some(Self)
    }

    pub(crate) fn format(&self) -> String {
        "pause".to_string()
    }
}

/// Resumes the cheat VM. Carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resume;

impl Resume {
    pub fn build() -> Self {
        Self
    }

    pub(crate) fn encode(&self) -> String {
        "FF100000".to_string()
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        (nibbles.len() >= 8 && nibbles[..8] == [0xF, 0xF, 1, 0, 0, 0, 0, 0]).then_some(Self)
    }

    pub(crate) fn format(&self) -> String {
        "resume".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_encodes_as_all_zero() {
        assert_eq!(Nop::build().encode(), "00000000 00000000 00000000");
    }

    #[test]
    fn nop_decodes_from_all_zero() {
        let nibbles = vec![0u8; 24];
        assert!(Nop::try_decode(&nibbles).is_some());
    }

    #[test]
    fn endif_round_trips() {
        let i = EndIf::build();
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(EndIf::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn loop_begin_round_trips() {
        let i = LoopBegin::build(Register::new(2).unwrap(), 10);
        assert_eq!(i.encode(), "30020000 0000000A");
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(LoopBegin::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn end_loop_formats_with_register() {
        let i = EndLoop::build(Register::new(2).unwrap());
        assert_eq!(i.format(), "endloop r2");
    }

    #[test]
    fn pause_and_resume_are_distinct() {
        assert_ne!(Pause::build().encode(), Resume::build().encode());
    }
}
