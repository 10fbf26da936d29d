//! Register/register and register/immediate arithmetic, and the
//! six-shape store-register family.
//!
//! Grounded on the opcode-signature table's `9` and `A` rows. Family `9`
//! distinguishes its two shapes (reg,reg vs reg,imm) by the literal
//! nibble following the op field; family `A` distinguishes its six
//! addressing shapes by the `O` (offset-type) field and, per the
//! component design's relocation rule, moves its address-immediate field
//! into a trailing extension word for three of those six shapes.

use crate::error::EncodingError;
use crate::format::{nibbles_of, render_hex, value_from};
use crate::registers::Register;
use crate::types::{ArithOp, MemRegion, OffsetType, Width};

/// `rD = rS OP rs` (or, for `~`/`=`, the unary forms `rD = ~rS` / `rD = rS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithRegReg {
    pub width: Width,
    pub dest: Register,
    pub src: Register,
    pub op: ArithOp,
    pub src2: Register,
}

impl ArithRegReg {
    pub fn build(width: Width, dest: Register, src: Register, op: ArithOp, src2: Register) -> Self {
        Self { width, dest, src, op, src2 }
    }

    pub(crate) fn encode(&self) -> String {
        let nibbles = [
            9,
            self.width.encode_nibble(),
            self.op.encode_nibble(),
            self.dest.index(),
            self.src.index(),
            0,
            self.src2.index(),
            0,
        ];
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 9 || nibbles[5] != 0 {
            return None;
        }
        let width = Width::from_byte_width(nibbles[1])?;
        let op = ArithOp::from_nibble(nibbles[2])?;
        let dest = Register::new(nibbles[3])?;
        let src = Register::new(nibbles[4])?;
        let src2 = Register::new(nibbles[6])?;
        Some(Self { width, dest, src, op, src2 })
    }

    pub(crate) fn format(&self) -> String {
        match self.op {
            ArithOp::Move => format!("{} {} = {}", self.width, self.dest, self.src),
            ArithOp::Not => format!("{} {} = ~{}", self.width, self.dest, self.src),
            op => format!("{} {} = {} {} {}", self.width, self.dest, self.src, op, self.src2),
        }
    }
}

/// `rD = rS OP imm`, with the usual width-driven extension word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithRegImm {
    pub width: Width,
    pub dest: Register,
    pub src: Register,
    pub op: ArithOp,
    pub value: u64,
}

impl ArithRegImm {
    pub fn build(width: Width, dest: Register, src: Register, op: ArithOp, value: u64) -> Self {
        Self { width, dest, src, op, value }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![
            9,
            self.width.encode_nibble(),
            self.op.encode_nibble(),
            self.dest.index(),
            self.src.index(),
            1,
            0,
            0,
        ];
        nibbles.extend(nibbles_of(self.value, if self.width.is_extended() { 16 } else { 8 }));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.len() < 8 || nibbles[0] != 9 || nibbles[5] != 1 {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[1]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let op = match ArithOp::from_nibble(nibbles[2]) {
            Some(o) => o,
            None => return Ok(None),
        };
        let dest = match Register::new(nibbles[3]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let src = match Register::new(nibbles[4]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let vw = if width.is_extended() { 16 } else { 8 };
        if nibbles.len() < 8 + vw {
            return Err(EncodingError::new("truncated arith-reg-imm value word", fragment));
        }
        let value = value_from(&nibbles[8..8 + vw]);
        Ok(Some(Self { width, dest, src, op, value }))
    }

    pub(crate) fn format(&self) -> String {
        format!(
            "{} {} = {} {} {}",
            self.width,
            self.dest,
            self.src,
            self.op,
            crate::primitives::format_imm(self.value, self.width, false)
        )
    }
}

/// The six addressing shapes the store-register family's `O` field selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRegAddress {
    /// `[rN]`
    NoOffset { base: Register },
    /// `[rN + rM]`
    OffReg { base: Register, offset_register: Register },
    /// `[rN + 0xoff]`
    OffImm { base: Register, offset: u64 },
    /// `[region + rM]`
    MemBaseReg { region: MemRegion, offset_register: Register },
    /// `[region + 0xoff]`
    MemBaseImm { region: MemRegion, offset: u64 },
    /// `[region + 0xoff + rM]`
    MemBaseImmOffReg { region: MemRegion, offset: u64, offset_register: Register },
}

impl StoreRegAddress {
    fn offset_type(&self) -> OffsetType {
        match self {
            StoreRegAddress::NoOffset { .. } => OffsetType::NoOffset,
            StoreRegAddress::OffReg { .. } => OffsetType::OffReg,
            StoreRegAddress::OffImm { .. } => OffsetType::OffImm,
            StoreRegAddress::MemBaseReg { .. } => OffsetType::MemBaseReg,
            StoreRegAddress::MemBaseImm { .. } => OffsetType::MemBaseImm,
            StoreRegAddress::MemBaseImmOffReg { .. } => OffsetType::MemBaseImmOffReg,
        }
    }

    /// `(R-field nibble, x-field nibble, address immediate)`.
    fn encode_fields(&self) -> (u8, u8, u64) {
        match self {
            StoreRegAddress::NoOffset { base } => (base.index(), 0, 0),
            StoreRegAddress::OffReg { base, offset_register } => (base.index(), offset_register.index(), 0),
            StoreRegAddress::OffImm { base, offset } => (base.index(), 0, *offset),
            StoreRegAddress::MemBaseReg { region, offset_register } => {
                (region.encode_nibble(), offset_register.index(), 0)
            }
            StoreRegAddress::MemBaseImm { region, offset } => (region.encode_nibble(), 0, *offset),
            StoreRegAddress::MemBaseImmOffReg { region, offset, offset_register } => {
                (region.encode_nibble(), offset_register.index(), *offset)
            }
        }
    }

    fn decode(offset_type: OffsetType, r_nibble: u8, x_nibble: u8, offset: u64) -> Option<Self> {
        Some(match offset_type {
            OffsetType::NoOffset => StoreRegAddress::NoOffset { base: Register::new(r_nibble)? },
            OffsetType::OffReg => StoreRegAddress::OffReg {
                base: Register::new(r_nibble)?,
                offset_register: Register::new(x_nibble)?,
            },
            OffsetType::OffImm => StoreRegAddress::OffImm { base: Register::new(r_nibble)?, offset },
            OffsetType::MemBaseReg => StoreRegAddress::MemBaseReg {
                region: MemRegion::from_nibble(r_nibble)?,
                offset_register: Register::new(x_nibble)?,
            },
            OffsetType::MemBaseImm => {
                StoreRegAddress::MemBaseImm { region: MemRegion::from_nibble(r_nibble)?, offset }
            }
            OffsetType::MemBaseImmOffReg => StoreRegAddress::MemBaseImmOffReg {
                region: MemRegion::from_nibble(r_nibble)?,
                offset,
                offset_register: Register::new(x_nibble)?,
            },
        })
    }

    fn format(&self, self_increment: bool) -> String {
        let inc = if self_increment { "++" } else { "" };
        match self {
            StoreRegAddress::NoOffset { base } => format!("[{base}{inc}]"),
            StoreRegAddress::OffReg { base, offset_register } => format!("[{base}{inc} + {offset_register}]"),
            StoreRegAddress::OffImm { base, offset } => format!("[{base}{inc} + {offset:#x}]"),
            StoreRegAddress::MemBaseReg { region, offset_register } => format!("[{region} + {offset_register}]"),
            StoreRegAddress::MemBaseImm { region, offset } => format!("[{region} + {offset:#x}]"),
            StoreRegAddress::MemBaseImmOffReg { region, offset, offset_register } => {
                format!("[{region} + {offset:#x} + {offset_register}]")
            }
        }
    }
}

/// Stores `source` to one of six addressing shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreReg {
    pub width: Width,
    pub source: Register,
    pub self_increment: bool,
    pub address: StoreRegAddress,
}

impl StoreReg {
    pub fn build(width: Width, source: Register, self_increment: bool, address: StoreRegAddress) -> Self {
        Self { width, source, self_increment, address }
    }

    pub(crate) fn encode(&self) -> String {
        let offset_type = self.address.offset_type();
        let (r_nibble, x_nibble, offset) = self.address.encode_fields();
        let a_width = if offset_type.relocates_offset_field() { 9 } else { 1 };
        let a_nibbles = nibbles_of(offset, a_width);
        let mut nibbles = vec![
            0xA,
            self.width.encode_nibble(),
            self.source.index(),
            r_nibble,
            self.self_increment as u8,
            offset_type.encode_nibble(),
            x_nibble,
            a_nibbles[0],
        ];
        if a_width == 9 {
            nibbles.extend(&a_nibbles[1..]);
        }
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.len() < 8 || nibbles[0] != 0xA {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[1]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let source = match Register::new(nibbles[2]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let offset_type = match OffsetType::from_nibble(nibbles[5]) {
            Some(o) => o,
            None => return Ok(None),
        };
        let self_increment = nibbles[4] != 0;
        let r_nibble = nibbles[3];
        let x_nibble = nibbles[6];
        let offset = if offset_type.relocates_offset_field() {
            if nibbles.len() < 16 {
                return Err(EncodingError::new("truncated store-reg address extension word", fragment));
            }
            let mut a = vec![nibbles[7]];
            a.extend(&nibbles[8..16]);
            value_from(&a)
        } else {
            0
        };
        let address = match StoreRegAddress::decode(offset_type, r_nibble, x_nibble, offset) {
            Some(a) => a,
            None => return Ok(None),
        };
        Ok(Some(Self { width, source, self_increment, address }))
    }

    pub(crate) fn format(&self) -> String {
        format!("{} {} = {}", self.width, self.address.format(self.self_increment), self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arith_reg_reg_unary_move_formats_without_operator() {
        let i = ArithRegReg::build(Width::U32, Register::new(1).unwrap(), Register::new(2).unwrap(), ArithOp::Move, Register::new(0).unwrap());
        assert_eq!(i.format(), "u32 r1 = r2");
    }

    #[test]
    fn arith_reg_reg_round_trips() {
        let i = ArithRegReg::build(Width::U32, Register::new(1).unwrap(), Register::new(2).unwrap(), ArithOp::Add, Register::new(3).unwrap());
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(ArithRegReg::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn arith_reg_imm_round_trips_with_extension() {
        let i = ArithRegImm::build(Width::U64, Register::new(1).unwrap(), Register::new(2).unwrap(), ArithOp::Xor, 0x1122334455667788);
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(ArithRegImm::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn store_reg_no_offset_round_trips() {
        let i = StoreReg::build(Width::U32, Register::new(5).unwrap(), false, StoreRegAddress::NoOffset { base: Register::new(2).unwrap() });
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(StoreReg::try_decode(&nibbles, "").unwrap(), Some(i));
        assert_eq!(i.format(), "u32 [r2] = r5");
    }

    #[test]
    fn store_reg_mem_base_imm_off_reg_round_trips_with_extension() {
        let address = StoreRegAddress::MemBaseImmOffReg {
            region: MemRegion::Heap,
            offset: 0x1234,
            offset_register: Register::new(3).unwrap(),
        };
        let i = StoreReg::build(Width::U64, Register::new(1).unwrap(), true, address);
        let encoded = i.encode();
        assert_eq!(encoded.split(' ').count(), 2);
        let nibbles = crate::format::nibbles_from_hex_line(&encoded, "").unwrap();
        assert_eq!(StoreReg::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn store_reg_off_imm_formats_self_increment() {
        let address = StoreRegAddress::OffImm { base: Register::new(4).unwrap(), offset: 0x8 };
        let i = StoreReg::build(Width::U8, Register::new(0).unwrap(), true, address);
        assert_eq!(i.format(), "u8 [r4++ + 0x8] = r0");
    }
}
