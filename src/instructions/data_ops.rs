//! Memory-store, conditional-test, move and legacy-arithmetic families.
//!
//! Covers opcode leading nibbles `0`, `1`, `4`, `5`, `6`, `7` — every
//! family whose primary job is moving or comparing a value against
//! memory or a register, as opposed to the register/register arithmetic
//! and addressing-mode families in [`super::registers_ops`].

use crate::error::EncodingError;
use crate::format::{nibbles_of, render_hex, value_from};
use crate::registers::Register;
use crate::types::{check_unsigned_width, Condition, MemRegion, Width};

const ADDRESS_NIBBLES: usize = 10;

/// Stores an immediate to `[region + offset + rR]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreImm {
    pub width: Width,
    pub region: MemRegion,
    pub register: Register,
    pub address: u64,
    pub value: u64,
}

impl StoreImm {
    pub fn build(
        width: Width,
        region: MemRegion,
        register: Register,
        address: u64,
        value: u64,
    ) -> Result<Self, EncodingError> {
        check_unsigned_width(address, 4 * ADDRESS_NIBBLES as u32, &format!("{address:#x}"))?;
        Ok(Self { width, region, register, address, value })
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![0, self.width.encode_nibble(), self.region.encode_nibble(), self.register.index(), 0, 0];
        nibbles.extend(nibbles_of(self.address, ADDRESS_NIBBLES));
        nibbles.extend(nibbles_of(self.value, value_width(self.width)));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.first() != Some(&0) || nibbles.len() < 16 {
            return Ok(None);
        }
        if nibbles[4] != 0 || nibbles[5] != 0 {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[1]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let region = match MemRegion::from_nibble(nibbles[2]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let register = match Register::new(nibbles[3]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let address = value_from(&nibbles[6..16]);
        let vw = value_width(width);
        if nibbles.len() < 16 + vw {
            return Err(EncodingError::new("truncated store-imm value word", fragment));
        }
        let value = value_from(&nibbles[16..16 + vw]);
        Ok(Some(Self { width, region, register, address, value }))
    }

    pub(crate) fn format(&self) -> String {
        format!(
            "{} [{} + {:#x} + {}] = {}",
            self.width,
            self.region,
            self.address,
            self.register,
            crate::primitives::format_imm(self.value, self.width, false)
        )
    }
}

/// `if [region + offset] COND imm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfOffImm {
    pub width: Width,
    pub region: MemRegion,
    pub condition: Condition,
    pub address: u64,
    pub value: u64,
}

impl IfOffImm {
    pub fn build(
        width: Width,
        region: MemRegion,
        condition: Condition,
        address: u64,
        value: u64,
    ) -> Result<Self, EncodingError> {
        check_unsigned_width(address, 4 * ADDRESS_NIBBLES as u32, &format!("{address:#x}"))?;
        Ok(Self { width, region, condition, address, value })
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![
            1,
            self.width.encode_nibble(),
            self.region.encode_nibble(),
            self.condition.encode_nibble(),
            0,
            0,
        ];
        nibbles.extend(nibbles_of(self.address, ADDRESS_NIBBLES));
        nibbles.extend(nibbles_of(self.value, value_width(self.width)));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.first() != Some(&1) || nibbles.len() < 16 {
            return Ok(None);
        }
        if nibbles[4] != 0 || nibbles[5] != 0 {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[1]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let region = match MemRegion::from_nibble(nibbles[2]) {
            Some(r) => r,
            None => return Ok(None),
        };
        let condition = match Condition::from_nibble(nibbles[3]) {
            Some(c) => c,
            None => return Ok(None),
        };
        let address = value_from(&nibbles[6..16]);
        let vw = value_width(width);
        if nibbles.len() < 16 + vw {
            return Err(EncodingError::new("truncated if-off-imm value word", fragment));
        }
        let value = value_from(&nibbles[16..16 + vw]);
        Ok(Some(Self { width, region, condition, address, value }))
    }

    pub(crate) fn format(&self) -> String {
        format!(
            "if {} [{} + {:#x}] {} {}",
            self.width,
            self.region,
            self.address,
            self.condition,
            crate::primitives::format_imm(self.value, self.width, false)
        )
    }
}

/// `rR = 0x…`: a full 64-bit immediate move, no width-driven extension —
/// the value word pair is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReg {
    pub register: Register,
    pub value: u64,
}

impl MoveReg {
    pub fn build(register: Register, value: u64) -> Self {
        Self { register, value }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![4, 0, 0, self.register.index()];
        nibbles.extend([0, 0, 0, 0]);
        nibbles.extend(nibbles_of(self.value, 16));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 24 || nibbles[0] != 4 || nibbles[1] != 0 {
            return None;
        }
        let register = Register::new(nibbles[3])?;
        let value = value_from(&nibbles[8..24]);
        Some(Self { register, value })
    }

    pub(crate) fn format(&self) -> String {
        format!("{} = {:#x}", self.register, self.value)
    }
}

/// Which base a [`Load`] reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBase {
    /// `[REGION + offset]`
    Region(MemRegion),
    /// `[rR + offset]`, self-dereferencing the destination register.
    SelfDeref,
}

/// Loads `width`-sized data from memory into `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Load {
    pub width: Width,
    pub register: Register,
    pub base: LoadBase,
    pub address: u64,
}

impl Load {
    pub fn build(width: Width, register: Register, base: LoadBase, address: u64) -> Result<Self, EncodingError> {
        check_unsigned_width(address, 4 * ADDRESS_NIBBLES as u32, &format!("{address:#x}"))?;
        Ok(Self { width, register, base, address })
    }

    pub(crate) fn encode(&self) -> String {
        let (m, s) = match self.base {
            LoadBase::Region(region) => (region.encode_nibble(), 0),
            LoadBase::SelfDeref => (0, 1),
        };
        let mut nibbles = vec![5, self.width.encode_nibble(), m, self.register.index(), s, 0];
        nibbles.extend(nibbles_of(self.address, ADDRESS_NIBBLES));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 16 || nibbles[0] != 5 {
            return None;
        }
        let width = Width::from_byte_width(nibbles[1])?;
        let register = Register::new(nibbles[3])?;
        let base = if nibbles[4] == 1 {
            LoadBase::SelfDeref
        } else {
            LoadBase::Region(MemRegion::from_nibble(nibbles[2])?)
        };
        let address = value_from(&nibbles[6..16]);
        Some(Self { width, register, base, address })
    }

    pub(crate) fn format(&self) -> String {
        match self.base {
            LoadBase::Region(region) => {
                format!("{} {} = [{} + {:#x}]", self.width, self.register, region, self.address)
            }
            LoadBase::SelfDeref => {
                format!("{} {} = [{} + {:#x}]", self.width, self.register, self.register, self.address)
            }
        }
    }
}

/// Stores an immediate through a register base, with an optional second
/// offset register and optional self-increment on the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreImmViaReg {
    pub width: Width,
    pub register: Register,
    pub self_increment: bool,
    pub offset_register: Option<Register>,
    pub value: u64,
}

impl StoreImmViaReg {
    pub fn build(
        width: Width,
        register: Register,
        self_increment: bool,
        offset_register: Option<Register>,
        value: u64,
    ) -> Self {
        Self { width, register, self_increment, offset_register, value }
    }

    pub(crate) fn encode(&self) -> String {
        let (has_offset, offset_index) = match self.offset_register {
            Some(r) => (1, r.index()),
            None => (0, 0),
        };
        let mut nibbles = vec![
            6,
            self.width.encode_nibble(),
            0,
            self.register.index(),
            self.self_increment as u8,
            has_offset,
            offset_index,
            0,
        ];
        nibbles.extend(nibbles_of(self.value, 16));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 24 || nibbles[0] != 6 {
            return None;
        }
        let width = Width::from_byte_width(nibbles[1])?;
        let register = Register::new(nibbles[3])?;
        let self_increment = nibbles[4] != 0;
        let offset_register = (nibbles[5] != 0).then(|| Register::new(nibbles[6])).flatten();
        let value = value_from(&nibbles[8..24]);
        Some(Self { width, register, self_increment, offset_register, value })
    }

    pub(crate) fn format(&self) -> String {
        let inc = if self.self_increment { "++" } else { "" };
        let base = match self.offset_register {
            Some(o) => format!("[{}{} + {}]", self.register, inc, o),
            None => format!("[{}{}]", self.register, inc),
        };
        format!("{} {} = {}", self.width, base, crate::primitives::format_imm(self.value, self.width, false))
    }
}

/// `rR OP= imm`, restricted to the legacy operator subset (`+ - * << >>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyArithImm {
    pub width: Width,
    pub register: Register,
    pub op: crate::types::ArithOp,
    pub value: u64,
}

impl LegacyArithImm {
    pub fn build(width: Width, register: Register, op: crate::types::ArithOp, value: u64) -> Result<Self, EncodingError> {
        if !op.is_legacy() {
            return Err(EncodingError::new(format!("{op} is not a legacy arith-imm operator"), op.to_string()));
        }
        Ok(Self { width, register, op, value })
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![7, self.width.encode_nibble(), 0, self.register.index(), self.op.encode_nibble(), 0, 0, 0];
        nibbles.extend(nibbles_of(self.value, 8));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 16 || nibbles[0] != 7 {
            return None;
        }
        let width = Width::from_byte_width(nibbles[1])?;
        let register = Register::new(nibbles[3])?;
        let op = crate::types::ArithOp::from_nibble(nibbles[4]).filter(|o| o.is_legacy())?;
        let value = value_from(&nibbles[8..16]);
        Some(Self { width, register, op, value })
    }

    pub(crate) fn format(&self) -> String {
        format!(
            "{} {} {}= {}",
            self.width,
            self.register,
            self.op,
            crate::primitives::format_imm(self.value, self.width, false)
        )
    }
}

/// Nibble width of a family-0/1-style value field: 16 when `width` is
/// 8 bytes (the extension word is present), else 8.
fn value_width(width: Width) -> usize {
    if width.is_extended() {
        16
    } else {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArithOp;

    #[test]
    fn store_imm_matches_worked_example_fields() {
        let i = StoreImm::build(Width::U32, MemRegion::Main, Register::new(2).unwrap(), 0x100, 0x1234).unwrap();
        assert_eq!(i.width, Width::U32);
        assert_eq!(i.address, 0x100);
    }

    #[test]
    fn store_imm_round_trips() {
        let i = StoreImm::build(Width::U32, MemRegion::Heap, Register::new(5).unwrap(), 0xABCD, 0xFEED).unwrap();
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(StoreImm::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn store_imm_extends_for_64_bit_value() {
        let i = StoreImm::build(Width::U64, MemRegion::Main, Register::new(0).unwrap(), 0, 0x1122334455667788).unwrap();
        assert_eq!(i.encode().split(' ').count(), 4);
    }

    #[test]
    fn if_off_imm_round_trips() {
        let i = IfOffImm::build(Width::U64, MemRegion::Heap, Condition::Gt, 0x1234, 0x5678).unwrap();
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(IfOffImm::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn move_reg_round_trips() {
        let i = MoveReg::build(Register::new(1).unwrap(), 0x1234);
        assert_eq!(i.encode(), "40010000 00000000 00001234");
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(MoveReg::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn load_self_deref_round_trips() {
        let i = Load::build(Width::U32, Register::new(3).unwrap(), LoadBase::SelfDeref, 0x10).unwrap();
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(Load::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn store_imm_via_reg_formats_with_offset_register() {
        let i = StoreImmViaReg::build(Width::U32, Register::new(2).unwrap(), true, Some(Register::new(3).unwrap()), 0x10);
        assert_eq!(i.format(), "u32 [r2++ + r3] = 0x00000010");
    }

    #[test]
    fn legacy_arith_imm_rejects_non_legacy_op() {
        assert!(LegacyArithImm::build(Width::U32, Register::new(0).unwrap(), ArithOp::And, 1).is_err());
    }

    #[test]
    fn legacy_arith_imm_round_trips() {
        let i = LegacyArithImm::build(Width::U32, Register::new(4).unwrap(), ArithOp::Add, 0x10).unwrap();
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(LegacyArithImm::try_decode(&nibbles), Some(i));
    }
}
