//! Save/restore, static-register and debug-log families.
//!
//! Grounded on the opcode-signature table's `C1`, `C2`, `C3` and `FFF`
//! rows. The debug-log `REG` operand shape follows the `[r{m}]`
//! resolution recorded in the component design rather than the
//! reference implementation's second, inconsistent formatter.

use crate::error::EncodingError;
use crate::format::{nibbles_of, render_hex, value_from};
use crate::registers::{Register, SaveSlot, StaticRegister};
use crate::types::{DebugOperand, MemRegion, SaveRestoreOp, Width};

/// Moves a single value between a working register and a save slot, or
/// zeroes one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRestore {
    pub op: SaveRestoreOp,
    pub slot: SaveSlot,
    pub register: Register,
}

impl SaveRestore {
    pub fn build(op: SaveRestoreOp, slot: SaveSlot, register: Register) -> Self {
        Self { op, slot, register }
    }

    pub(crate) fn encode(&self) -> String {
        // D/S swap roles by op, mirroring the reference's dism(): for
        // Save/Clear, D is the slot and S is the register; for
        // Restore/RegZero, D is the register and S is the slot.
        let (d, s) = match self.op {
            SaveRestoreOp::Save | SaveRestoreOp::Clear => (self.slot.index(), self.register.index()),
            SaveRestoreOp::Restore | SaveRestoreOp::RegZero => (self.register.index(), self.slot.index()),
        };
        let nibbles = [0xC, 1, 0, d, 0, s, self.op.encode_nibble(), 0];
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 0xC || nibbles[1] != 1 {
            return None;
        }
        let d = nibbles[3];
        let s = nibbles[5];
        let op = SaveRestoreOp::from_nibble(nibbles[6])?;
        let (slot, register) = match op {
            SaveRestoreOp::Save | SaveRestoreOp::Clear => (SaveSlot::new(d)?, Register::new(s)?),
            SaveRestoreOp::Restore | SaveRestoreOp::RegZero => (SaveSlot::new(s)?, Register::new(d)?),
        };
        Some(Self { op, slot, register })
    }

    pub(crate) fn format(&self) -> String {
        match self.op {
            SaveRestoreOp::Save => format!("save[{}] = {}", self.slot.index(), self.register),
            SaveRestoreOp::Restore => format!("{} = save[{}]", self.register, self.slot.index()),
            SaveRestoreOp::Clear => format!("save[{}] = 0", self.slot.index()),
            SaveRestoreOp::RegZero => format!("{} = 0", self.register),
        }
    }
}

/// Moves a bitmask of registers/slots in one direction, or zeroes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRestoreMask {
    pub op: SaveRestoreOp,
    pub mask: u16,
}

impl SaveRestoreMask {
    pub fn build(op: SaveRestoreOp, mask: u16) -> Self {
        Self { op, mask }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![0xC, 2, self.op.encode_nibble(), 0];
        nibbles.extend(nibbles_of(self.mask as u64, 4));
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 0xC || nibbles[1] != 2 {
            return None;
        }
        let op = SaveRestoreOp::from_nibble(nibbles[2])?;
        let mask = value_from(&nibbles[4..8]) as u16;
        Some(Self { op, mask })
    }

    fn indices(&self) -> Vec<u8> {
        (0..16).filter(|i| self.mask & (1 << i) != 0).collect()
    }

    pub(crate) fn format(&self) -> String {
        let list: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
        let regs: Vec<String> = self.indices().iter().map(|i| format!("r{i}")).collect();
        match self.op {
            SaveRestoreOp::Save => format!("save {}", regs.join(", ")),
            SaveRestoreOp::Restore => format!("restore {}", regs.join(", ")),
            SaveRestoreOp::Clear => format!("save[{}] = 0", list.join(", ")),
            SaveRestoreOp::RegZero => format!("{} = 0", regs.join(", ")),
        }
    }
}

/// Reads or writes a static register, direction inferred from whether
/// its index is a read (`< 0x80`) or write (`>= 0x80`) index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRegRw {
    pub static_reg: StaticRegister,
    pub register: Register,
}

impl StaticRegRw {
    pub fn build(static_reg: StaticRegister, register: Register) -> Self {
        Self { static_reg, register }
    }

    pub(crate) fn encode(&self) -> String {
        let mut nibbles = vec![0xC, 3, 0, 0, 0];
        nibbles.extend(nibbles_of(self.static_reg.index() as u64, 2));
        nibbles.push(self.register.index());
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8]) -> Option<Self> {
        if nibbles.len() < 8 || nibbles[0] != 0xC || nibbles[1] != 3 {
            return None;
        }
        let static_reg = StaticRegister::from(value_from(&nibbles[5..7]) as u8);
        let register = Register::new(nibbles[7])?;
        Some(Self { static_reg, register })
    }

    pub(crate) fn format(&self) -> String {
        if self.static_reg.is_write() {
            format!("static[{:#x}] = {}", self.static_reg.index(), self.register)
        } else {
            format!("{} = static[{:#x}]", self.register, self.static_reg.index())
        }
    }
}

/// The five operand shapes a debug-log line can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugOperandValue {
    /// `[region + 0xoff]`
    MemBaseOff { region: MemRegion, offset: u64 },
    /// `[region + rM]`
    MemBaseReg { region: MemRegion, offset_register: Register },
    /// `[rN + 0xoff]`
    RegOff { base: Register, offset: u64 },
    /// `[rN + rM]`
    RegOffReg { base: Register, offset_register: Register },
    /// `[r{m}]`, per the `REG` operand-type resolution.
    Reg { register: Register },
}

impl DebugOperandValue {
    fn operand_type(&self) -> DebugOperand {
        match self {
            DebugOperandValue::MemBaseOff { .. } => DebugOperand::MemBaseOff,
            DebugOperandValue::MemBaseReg { .. } => DebugOperand::MemBaseReg,
            DebugOperandValue::RegOff { .. } => DebugOperand::RegOff,
            DebugOperandValue::RegOffReg { .. } => DebugOperand::RegOffReg,
            DebugOperandValue::Reg { .. } => DebugOperand::Reg,
        }
    }
}

/// Logs `value` to the debug log at width `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugLog {
    pub width: Width,
    pub value: DebugOperandValue,
}

impl DebugLog {
    pub fn build(width: Width, value: DebugOperandValue) -> Self {
        Self { width, value }
    }

    pub(crate) fn encode(&self) -> String {
        let operand_type = self.value.operand_type();
        let (x, m) = match &self.value {
            DebugOperandValue::MemBaseOff { region, .. } => (region.encode_nibble(), 0),
            DebugOperandValue::MemBaseReg { region, offset_register } => (region.encode_nibble(), offset_register.index()),
            DebugOperandValue::RegOff { base, .. } => (base.index(), 0),
            DebugOperandValue::RegOffReg { base, offset_register } => (base.index(), offset_register.index()),
            DebugOperandValue::Reg { register } => (0, register.index()),
        };
        let mut nibbles = vec![0xF, 0xF, 0xF, self.width.encode_nibble(), operand_type.encode_nibble(), x, m, 0];
        if operand_type.has_trailing_offset_word() {
            let offset = match &self.value {
                DebugOperandValue::MemBaseOff { offset, .. } | DebugOperandValue::RegOff { offset, .. } => *offset,
                _ => 0,
            };
            nibbles.extend(nibbles_of(offset, 8));
        }
        render_hex(&nibbles)
    }

    pub(crate) fn try_decode(nibbles: &[u8], fragment: &str) -> Result<Option<Self>, EncodingError> {
        if nibbles.len() < 8 || nibbles[0] != 0xF || nibbles[1] != 0xF || nibbles[2] != 0xF {
            return Ok(None);
        }
        let width = match Width::from_byte_width(nibbles[3]) {
            Some(w) => w,
            None => return Ok(None),
        };
        let operand_type = match DebugOperand::from_nibble(nibbles[4]) {
            Some(o) => o,
            None => return Ok(None),
        };
        let x = nibbles[5];
        let m = nibbles[6];
        let offset = if operand_type.has_trailing_offset_word() {
            if nibbles.len() < 16 {
                return Err(EncodingError::new("truncated debug-log offset word", fragment));
            }
            value_from(&nibbles[8..16])
        } else {
            0
        };
        let value = match operand_type {
            DebugOperand::MemBaseOff => {
                let region = match MemRegion::from_nibble(x) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                DebugOperandValue::MemBaseOff { region, offset }
            }
            DebugOperand::MemBaseReg => {
                let region = match MemRegion::from_nibble(x) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let offset_register = match Register::new(m) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                DebugOperandValue::MemBaseReg { region, offset_register }
            }
            DebugOperand::RegOff => {
                let base = match Register::new(x) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                DebugOperandValue::RegOff { base, offset }
            }
            DebugOperand::RegOffReg => {
                let base = match Register::new(x) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let offset_register = match Register::new(m) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                DebugOperandValue::RegOffReg { base, offset_register }
            }
            DebugOperand::Reg => {
                let register = match Register::new(m) {
                    Some(r) => r,
                    None => return Ok(None),
                };
                DebugOperandValue::Reg { register }
            }
        };
        Ok(Some(Self { width, value }))
    }

    pub(crate) fn format(&self) -> String {
        let addr = match &self.value {
            DebugOperandValue::MemBaseOff { region, offset } => format!("[{region} + {offset:#x}]"),
            DebugOperandValue::MemBaseReg { region, offset_register } => format!("[{region} + {offset_register}]"),
            DebugOperandValue::RegOff { base, offset } => format!("[{base} + {offset:#x}]"),
            DebugOperandValue::RegOffReg { base, offset_register } => format!("[{base} + {offset_register}]"),
            DebugOperandValue::Reg { register } => format!("[{register}]"),
        };
        format!("log {} {} {}", self.value.operand_type().encode_nibble(), self.width, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trips() {
        let i = SaveRestore::build(SaveRestoreOp::Save, SaveSlot::new(3).unwrap(), Register::new(5).unwrap());
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(SaveRestore::try_decode(&nibbles), Some(i));
        assert_eq!(i.format(), "save[3] = r5");
    }

    #[test]
    fn save_restore_reg_zero_formats_without_slot() {
        let i = SaveRestore::build(SaveRestoreOp::RegZero, SaveSlot::new(0).unwrap(), Register::new(2).unwrap());
        assert_eq!(i.format(), "r2 = 0");
    }

    #[test]
    fn save_restore_mask_round_trips() {
        let i = SaveRestoreMask::build(SaveRestoreOp::Save, 0b0000_0000_0010_0101);
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(SaveRestoreMask::try_decode(&nibbles), Some(i));
        assert_eq!(i.format(), "save r0, r2, r5");
    }

    #[test]
    fn static_reg_rw_picks_direction_from_high_bit() {
        let read = StaticRegRw::build(StaticRegister::new(0x10), Register::new(2).unwrap());
        assert_eq!(read.format(), "r2 = static[0x10]");
        let write = StaticRegRw::build(StaticRegister::new(0x90), Register::new(2).unwrap());
        assert_eq!(write.format(), "static[0x90] = r2");
    }

    #[test]
    fn static_reg_rw_round_trips() {
        let i = StaticRegRw::build(StaticRegister::new(0xAB), Register::new(4).unwrap());
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(StaticRegRw::try_decode(&nibbles), Some(i));
    }

    #[test]
    fn debug_log_reg_form_round_trips_and_renders_bracketed() {
        let i = DebugLog::build(Width::U32, DebugOperandValue::Reg { register: Register::new(3).unwrap() });
        assert_eq!(i.format(), "log 4 u32 [r3]");
        let nibbles = crate::format::nibbles_from_hex_line(&i.encode(), "").unwrap();
        assert_eq!(DebugLog::try_decode(&nibbles, "").unwrap(), Some(i));
    }

    #[test]
    fn debug_log_mem_base_off_round_trips_with_trailing_word() {
        let i = DebugLog::build(Width::U64, DebugOperandValue::MemBaseOff { region: MemRegion::Alias, offset: 0x1000 });
        let encoded = i.encode();
        assert_eq!(encoded.split(' ').count(), 2);
        let nibbles = crate::format::nibbles_from_hex_line(&encoded, "").unwrap();
        assert_eq!(DebugLog::try_decode(&nibbles, "").unwrap(), Some(i));
    }
}
