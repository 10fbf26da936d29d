//! The key-mask conditional and the six-shape register conditional.
//!
//! Grounded on the opcode-signature table's `8` and `C0` rows. `if key`
//! is a single-word mask test; `if rN COND …` shares one register-under-
//! test and condition pair across six addressing shapes, distinguished
//! by a sub-tag nibble the same way [`super::registers_ops::StoreReg`]
//! distinguishes its own six shapes by its `O` field.

use crate::error::EncodingError;
use crate::format::{nibbles_of, render_hex, value_from};
use crate::registers::Register;
use crate::types::{Condition, KeyMask, MemRegion, Width};

/// `if key NAME | NAME | …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfKey {
    pub mask: KeyMask,
}

impl IfKey {
    pub fn build(mask: KeyMask) -> Self {
        Self { mask }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![8];
        nibbles.extend(nibbles_of(self.mask.0 as u64, 7));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 8 {
            return None;
        }
        let mask = KeyMask(value_from(&nibbles[1..8]) as u32);
        Some(Self { mask })
    }

    pub(crate) fn format(&self) -> String {
        format!("if key {}", self.mask)
    }
}

/// The six addressing shapes `if rN COND …` can test against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfRegAddress {
    /// `[region + 0xoff]`
    MemBaseImm { region: MemRegion, offset: u64 },
    /// `[region + rM]`
    MemBaseReg { region: MemRegion, offset_register: Register },
    /// `[rN + 0xoff]`
    RegOff { base: Register, offset: u64 },
    /// `[rN + rM]`
    RegOffReg { base: Register, offset_register: Register },
    /// a bare immediate
    Imm { value: u64 },
    /// another register
    Reg { other: Register },
}

/// `if rN COND …`, testing the register `register` against `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfReg {
    pub width: Width,
    pub condition: Condition,
    pub register: Register,
    pub address: IfRegAddress,
}

impl IfReg {
    pub fn build(width: Width, condition: Condition, register: Register, address: IfRegAddress) -> Self {
        Self { width, condition, register, address }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![0xC, 0, self.width.encode_nibble(), self.condition.encode_nibble(), self.register.index()];
        match &self.address {
            IfRegAddress::MemBaseImm { region, offset } => {
                nibbles.push(0);
                nibbles.push(region.encode_nibble());
                let a = nibbles_of(*offset, 9);
                nibbles.push(a[0]);
                nibbles.extend(&a[1..]);
            }
            IfRegAddress::MemBaseReg { region, offset_register } => {
                nibbles.push(1);
                nibbles.push(region.encode_nibble());
                nibbles.push(offset_register.index());
            }
            IfRegAddress::RegOff { base, offset } => {
                nibbles.push(2);
                nibbles.push(base.index());
                let a = nibbles_of(*offset, 9);
                nibbles.push(a[0]);
                nibbles.extend(&a[1..]);
            }
            IfRegAddress::RegOffReg { base, offset_register } => {
                nibbles.push(3);
                nibbles.push(base.index());
                nibbles.push(offset_register.index());
            }
            IfRegAddress::Imm { value } => {
                nibbles.push(4);
                nibbles.push(0);
                nibbles.push(0);
                nibbles.extend(nibbles_of(*value, if self.width.is_extended() { 16 } else { 8 }));
            }
            IfRegAddress::Reg { other } => {
                nibbles.push(5);
                nibbles.push(other.index());
                nibbles.push(0);
            }
        }
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.len() < 8 || nibbles[0] != 0xC || nibbles[1] != 0 {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[2]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let condition = match Condition::from_nibble(nibbles[3]) {
            Some(c) => c,
            None => return Ok(None),
        };
        let register = match Register::new(nibbles[4]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let address = match nibbles[5] {
            0 => {
                let region = match MemRegion::from_nibble(nibbles[6]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                if nibbles.len() < 16 {
                    return Err(EncodingError::new("truncated if-reg mem-base-imm extension word", fragment));
                }
                let mut a = vec![nibbles[7]];
                a.extend(&nibbles[8..16]);
                IfRegAddress::MemBaseImm { region, offset: value_from(&a) }
            }
            1 => {
                let region = match MemRegion::from_nibble(nibbles[6]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let offset_register = match Register::new(nibbles[7]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                IfRegAddress::MemBaseReg { region, offset_register }
            }
            2 => {
                let base = match Register::new(nibbles[6]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                if nibbles.len() < 16 {
                    return Err(EncodingError::new("truncated if-reg reg-off extension word", fragment));
                }
                let mut a = vec![nibbles[7]];
                a.extend(&nibbles[8..16]);
                IfRegAddress::RegOff { base, offset: value_from(&a) }
            }
            3 => {
                let base = match Register::new(nibbles[6]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let offset_register = match Register::new(nibbles[7]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                IfRegAddress::RegOffReg { base, offset_register }
            }
            4 => {
                let vw = if width.is_extended() { 16 } else { 8 };
                if nibbles.len() < 8 + vw {
                    return Err(EncodingError::new("truncated if-reg imm value word", fragment));
                }
                IfRegAddress::Imm { value: value_from(&nibbles[8..8 + vw]) }
            }
            5 => {
                let other = match Register::new(nibbles[6]) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                IfRegAddress::Reg { other }
            }
            _ => return Ok(None),
        };
        Ok(Some(Self { width, condition, register, address }))
    }

    pub(crate) fn format(&self) -> String {
        let rhs = match &self.address {
            IfRegAddress::MemBaseImm { region, offset } => format!("[{region} + {offset:#x}]"),
            IfRegAddress::MemBaseReg { region, offset_register } => format!("[{region} + {offset_register}]"),
            IfRegAddress::RegOff { base, offset } => format!("[{base} + {offset:#x}]"),
            IfRegAddress::RegOffReg { base, offset_register } => format!("[{base} + {offset_register}]"),
            IfRegAddress::Imm { value } => crate::primitives::format_imm(*value, self.width, false),
            IfRegAddress::Reg { other } => other.to_string(),
        };
        format!("if {} {} {} {}", self.width, self.register, self.condition, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_key_matches_worked_example() {
        let i = IfKey::build(KeyMask::A | KeyMask::B);
        assert_eq!(i.encode(), "80000003");
        assert_eq!(i.format(), "if key A | B");
    }

    #[test]
    fn if_key_round_trips() {
        let i = IfKey::build(KeyMask::PLUS | KeyMask::SL);
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(IfKey::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn if_reg_imm_round_trips() {
        let i = IfReg::build(Width::U32, Condition::Eq, Register::new(1).unwrap(), IfRegAddress::Imm { value: 0x10 });
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(IfReg::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn if_reg_mem_base_imm_round_trips_with_extension() {
        let address = IfRegAddress::MemBaseImm { region: MemRegion::Main, offset: 0x123456789 };
        let i = IfReg::build(Width::U64, Condition::Lt, Register::new(2).unwrap(), address);
        let encoded = i.encode();
        assert_eq!(encoded.split(' ').count(), 2);
        let nibbles = crate::format::nibbles_from_hex_line(&encoded, "").unwrap();
        assert_eq!(IfReg::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn if_reg_other_register_formats_bare() {
        let i = IfReg::build(Width::U8, Condition::Neq, Register::new(0).unwrap(), IfRegAddress::Reg { other: Register::new(1).unwrap() });
        assert_eq!(i.format(), "if u8 r0 != r1");
    }
}
