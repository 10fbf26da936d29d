//! Register, save-slot and static-register index types.
//!
//! Ported from the teacher crate's `Register` newtype: a validated,
//! copyable index with `TryFrom` conversions and a `Display` impl, rather
//! than a bare `u8` passed around and range-checked ad hoc at every call
//! site.

use std::fmt;

use crate::error::EncodingError;

/// Number of working registers in the VM: `r0..r15`.
pub const NUMBER_OF_REGISTERS: u8 = 16;
/// Number of save slots.
pub const NUMBER_OF_SAVE_SLOTS: u8 = 16;

/// One of the VM's 16 general-purpose registers, `r0..r15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(u8);

impl Register {
    /// Builds a `Register` from a 0..15 index.
    pub const fn new(index: u8) -> Option<Self> {
        if index < NUMBER_OF_REGISTERS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The raw 0..15 index.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Parses an `rN` token, rejecting out-of-range or malformed input.
    pub fn parse(token: &str) -> Result<Self, EncodingError> {
        let digits = token
            .strip_prefix('r')
            .ok_or_else(|| EncodingError::new("register token must start with 'r'", token))?;
        let index: u8 = digits
            .parse()
            .map_err(|_| EncodingError::new("register index is not a number", token))?;
        Self::new(index).ok_or_else(|| {
            EncodingError::new(format!("register index {index} out of range 0..16"), token)
        })
    }
}

impl TryFrom<u8> for Register {
    type Error = EncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            EncodingError::new(format!("register index {value} out of range 0..16"), value.to_string())
        })
    }
}

impl From<Register> for u8 {
    fn from(r: Register) -> Self {
        r.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One of the 16 save slots, distinct storage from the working registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveSlot(u8);

impl SaveSlot {
    /// Builds a `SaveSlot` from a 0..15 index.
    pub const fn new(index: u8) -> Option<Self> {
        if index < NUMBER_OF_SAVE_SLOTS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The raw 0..15 index.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SaveSlot {
    type Error = EncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
            .ok_or_else(|| EncodingError::new(format!("save slot {value} out of range 0..16"), value.to_string()))
    }
}

impl From<SaveSlot> for u8 {
    fn from(slot: SaveSlot) -> Self {
        slot.0
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save[{}]", self.0)
    }
}

/// A static-register index: `0x00..0x7F` for reads, `0x80..0xFF` for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticRegister(u8);

impl StaticRegister {
    /// Builds a `StaticRegister` from any `u8`; every value is valid, the
    /// high bit just selects read vs. write.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// The raw index, `0x00..0xFF`.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// True when this index addresses a write (`0x80..0xFF`) rather than a read.
    pub const fn is_write(self) -> bool {
        self.0 >= 0x80
    }
}

impl From<u8> for StaticRegister {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<StaticRegister> for u8 {
    fn from(r: StaticRegister) -> Self {
        r.0
    }
}

impl fmt::Display for StaticRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "static[{:#x}]", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_parses_valid_token() {
        assert_eq!(Register::parse("r5").unwrap().index(), 5);
    }

    #[test]
    fn register_rejects_out_of_range_index() {
        assert!(Register::parse("r16").is_err());
    }

    #[test]
    fn register_rejects_missing_prefix() {
        assert!(Register::parse("5").is_err());
    }

    #[test]
    fn register_display_round_trips_through_parse() {
        let r = Register::new(7).unwrap();
        assert_eq!(Register::parse(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn static_register_write_bit() {
        assert!(!StaticRegister::new(0x10).is_write());
        assert!(StaticRegister::new(0x90).is_write());
    }
}
