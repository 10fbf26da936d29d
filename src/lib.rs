#![doc = include_str!("../README.md")]
#![allow(clippy::module_name_repetitions)]

//! Codec for the Atmosphere `dmnt` cheat virtual-machine bytecode.
//!
//! The crate converts between the VM's 32-bit-word machine code and a
//! human-readable assembly dialect, in both directions, without executing
//! any of it. [`instructions::Instruction`] is the in-memory value; the
//! [`assembler`] and [`disassembler`] modules drive translation in each
//! direction, and [`cheatfile`] groups individual lines into named cheat
//! entries the way a `.txt`/`.asm` cheat file is actually laid out.

pub mod address;
pub mod assembler;
pub mod cheatfile;
pub mod disassembler;
pub mod error;
pub mod format;
pub mod instructions;
pub mod primitives;
pub mod registers;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use error::{CodecError, EncodingError, SyntaxError};
pub use instructions::Instruction;
