//! The assembly-line dispatcher.
//!
//! One function, [`assemble_line`], turns one line of the human-readable
//! dialect into an [`Instruction`]. Grounded on the component design's
//! dispatcher algorithm: strip the type prefix, recognize a leading
//! keyword, and fall back to inspecting the shape of an `=`-bearing line
//! when no keyword matches.

use crate::address::{self, AddressExpr};
use crate::error::{CodecError, EncodingError, SyntaxError};
use crate::instructions::*;
use crate::primitives::{check_fits_width, is_immediate, reg_index};
use crate::registers::{Register, SaveSlot, StaticRegister};
use crate::types::{ArithOp, Condition, DebugOperand, KeyMask, Width};

/// Parses one assembly line into an [`Instruction`].
///
/// `raw` may carry a trailing `# comment`; it is stripped before parsing.
/// Blank (or comment-only) lines are rejected with a [`SyntaxError`] —
/// callers that walk a whole file should filter those out first, which is
/// exactly what [`crate::cheatfile`] does.
pub fn assemble_line(raw: &str) -> Result<Instruction, CodecError> {
    let stripped = strip_comment(raw);
    let line = stripped.trim();
    if line.is_empty() {
        return Err(SyntaxError::new("empty line", raw).into());
    }
    let (width, body) = extract_type_prefix(line)?;
    let lower = body.to_ascii_lowercase();
    let mut words = lower.split_whitespace();
    let keyword = words.next().unwrap_or("");
    let rest = lower[keyword.len()..].trim();

    match keyword {
        "nop" => Ok(Instruction::Nop(Nop::build())),
        "endif" => Ok(Instruction::EndIf(EndIf::build())),
        "else" => Ok(Instruction::Else(Else::build())),
        "pause" => Ok(Instruction::Pause(Pause::build())),
        "resume" => Ok(Instruction::Resume(Resume::build())),
        "loop" => parse_loop(rest, line).map(|i| Instruction::LoopBegin(i)),
        "endloop" => parse_endloop(rest, line).map(|i| Instruction::EndLoop(i)),
        "log" => parse_log(width, rest, line),
        "save" => parse_bare_save_restore(rest, line, true),
        "restore" => parse_bare_save_restore(rest, line, false),
        "if" => parse_if(width, rest, line),
        _ => parse_assignment(width, &lower, line),
    }
}

/// Strips a trailing `# …` comment, leaving any earlier content intact.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

/// True for tokens that name a data-type prefix: the ten keyword widths,
/// `ptr`, or any genuinely pointer-shaped token containing `*` (never a
/// bare `*`, which is the multiplication operator).
fn looks_like_type_prefix(tok: &str) -> bool {
    matches!(
        tok,
        "u8" | "u16" | "u32" | "u64" | "i8" | "i16" | "i32" | "i64" | "float" | "double" | "ptr"
    ) || (tok.len() > 1 && tok.contains('*'))
}

/// Removes the (at most one) type-prefix token from `line`, returning it
/// alongside the remaining line with the other tokens back-to-back,
/// single-space separated.
fn extract_type_prefix(line: &str) -> Result<(Option<Width>, String), SyntaxError> {
    let mut width = None;
    let mut rest: Vec<&str> = Vec::new();
    for tok in line.split_whitespace() {
        if looks_like_type_prefix(tok) {
            if width.is_some() {
                return Err(SyntaxError::new("multiple type prefixes", line));
            }
            width = Width::parse(tok);
        } else {
            rest.push(tok);
        }
    }
    Ok((width, rest.join(" ")))
}

fn require_width(width: Option<Width>, fragment: &str) -> Result<Width, SyntaxError> {
    width.ok_or_else(|| SyntaxError::new("this instruction requires a type prefix", fragment))
}

fn parse_register(tok: &str, fragment: &str) -> Result<Register, SyntaxError> {
    Register::parse(tok).map_err(|e| SyntaxError::new(e.reason, fragment))
}

fn parse_value(tok: &str, width: Width) -> Result<u64, EncodingError> {
    check_fits_width(tok, width)
}

fn parse_loop(rest: &str, fragment: &str) -> Result<LoopBegin, SyntaxError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [reg_tok, to_tok, count_tok] = tokens[..] else {
        return Err(SyntaxError::new("expected 'loop rN to COUNT'", fragment));
    };
    if to_tok != "to" {
        return Err(SyntaxError::new("expected 'to' in loop header", fragment));
    }
    let register = parse_register(reg_tok, fragment)?;
    let count: u32 = crate::primitives::is_immediate(count_tok)
        .then(|| count_tok.trim_start_matches("0x").parse::<u32>().ok())
        .flatten()
        .or_else(|| count_tok.parse::<u32>().ok())
        .ok_or_else(|| SyntaxError::new("malformed loop count", fragment))?;
    Ok(LoopBegin::build(register, count))
}

fn parse_endloop(rest: &str, fragment: &str) -> Result<EndLoop, SyntaxError> {
    let register = parse_register(rest.trim(), fragment)?;
    Ok(EndLoop::build(register))
}

fn parse_log(width: Option<Width>, rest: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let width = require_width(width, fragment)?;
    let (index_tok, bracket) = rest
        .split_once(' ')
        .ok_or_else(|| SyntaxError::new("expected 'log INDEX [addr-expr]'", fragment))?;
    let index: u8 = index_tok
        .parse()
        .map_err(|_| SyntaxError::new("malformed debug-log operand index", fragment))?;
    let operand_type = DebugOperand::from_nibble(index)
        .ok_or_else(|| SyntaxError::new("unknown debug-log operand index", fragment))?;
    let addr = address::parse(bracket.trim())?;
    let value = debug_operand_from_addr(operand_type, &addr, fragment)?;
    Ok(Instruction::DebugLog(DebugLog::build(width, value)))
}

fn debug_operand_from_addr(
    operand_type: DebugOperand,
    addr: &AddressExpr,
    fragment: &str,
) -> Result<DebugOperandValue, SyntaxError> {
    Ok(match operand_type {
        DebugOperand::MemBaseOff => {
            let region = addr.region.ok_or_else(|| SyntaxError::new("expected a memory region", fragment))?;
            DebugOperandValue::MemBaseOff { region, offset: addr.offset as u64 }
        }
        DebugOperand::MemBaseReg => {
            let region = addr.region.ok_or_else(|| SyntaxError::new("expected a memory region", fragment))?;
            let (offset_register, _) = addr
                .single_register()
                .ok_or_else(|| SyntaxError::new("expected exactly one register", fragment))?;
            DebugOperandValue::MemBaseReg { region, offset_register }
        }
        DebugOperand::RegOff => {
            let (base, _) = addr
                .single_register()
                .ok_or_else(|| SyntaxError::new("expected exactly one register", fragment))?;
            DebugOperandValue::RegOff { base, offset: addr.offset as u64 }
        }
        DebugOperand::RegOffReg => match addr.registers.as_slice() {
            [(base, _), (offset_register, _)] => DebugOperandValue::RegOffReg { base: *base, offset_register: *offset_register },
            _ => return Err(SyntaxError::new("expected exactly two registers", fragment)),
        },
        DebugOperand::Reg => {
            let (register, _) = addr
                .single_register()
                .ok_or_else(|| SyntaxError::new("expected exactly one register", fragment))?;
            DebugOperandValue::Reg { register }
        }
    })
}

fn parse_register_list(s: &str, fragment: &str) -> Result<Vec<Register>, SyntaxError> {
    s.split(',').map(|t| parse_register(t.trim(), fragment)).collect()
}

fn mask_from_registers(regs: &[Register]) -> u16 {
    regs.iter().fold(0u16, |acc, r| acc | (1 << r.index()))
}

fn mask_from_slots(slots: &[SaveSlot]) -> u16 {
    slots.iter().fold(0u16, |acc, s| acc | (1 << s.index()))
}

/// `save r0, r2, …` / `restore r0, r2, …`.
fn parse_bare_save_restore(rest: &str, fragment: &str, is_save: bool) -> Result<Instruction, CodecError> {
    let regs = parse_register_list(rest, fragment)?;
    if regs.is_empty() {
        return Err(SyntaxError::new("expected at least one register", fragment).into());
    }
    let op = if is_save { crate::types::SaveRestoreOp::Save } else { crate::types::SaveRestoreOp::Restore };
    Ok(Instruction::SaveRestoreMask(SaveRestoreMask::build(op, mask_from_registers(&regs))))
}

/// `if key …`, `if [REGION + off] COND value`, `if rN COND …`.
fn parse_if(width: Option<Width>, rest: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let rest = rest.strip_suffix(" then").unwrap_or(rest).trim();
    if let Some(keys) = rest.strip_prefix("key ") {
        let mask = KeyMask::parse(keys)?;
        return Ok(Instruction::IfKey(IfKey::build(mask)));
    }
    let width = require_width(width, fragment)?;
    if rest.starts_with('[') {
        let close = rest.find(']').ok_or_else(|| SyntaxError::new("unterminated address expression", fragment))?;
        let bracket = &rest[..=close];
        let remainder = rest[close + 1..].trim();
        let addr = address::parse(bracket)?;
        if !addr.registers.is_empty() {
            return Err(SyntaxError::new("if-off-imm does not take a register operand", fragment).into());
        }
        let region = addr.region.ok_or_else(|| SyntaxError::new("expected a memory region", fragment))?;
        let mut toks = remainder.splitn(2, ' ');
        let cond_tok = toks.next().unwrap_or("");
        let value_tok = toks.next().unwrap_or("").trim();
        let condition = Condition::parse(cond_tok).ok_or_else(|| SyntaxError::new("unknown condition", fragment))?;
        let value = parse_value(value_tok, width)?;
        return Ok(Instruction::IfOffImm(IfOffImm::build(width, region, condition, addr.offset as u64, value)?));
    }
    let mut toks = rest.splitn(3, ' ');
    let reg_tok = toks.next().unwrap_or("");
    let cond_tok = toks.next().unwrap_or("");
    let rhs = toks.next().unwrap_or("").trim();
    let register = parse_register(reg_tok, fragment)?;
    let condition = Condition::parse(cond_tok).ok_or_else(|| SyntaxError::new("unknown condition", fragment))?;
    let address = if rhs.starts_with('[') {
        let addr = address::parse(rhs)?;
        if_reg_address_from_addr(&addr, fragment)?
    } else if reg_index(rhs).is_some() {
        IfRegAddress::Reg { other: parse_register(rhs, fragment)? }
    } else {
        IfRegAddress::Imm { value: parse_value(rhs, width)? }
    };
    Ok(Instruction::IfReg(IfReg::build(width, condition, register, address)))
}

fn if_reg_address_from_addr(addr: &AddressExpr, fragment: &str) -> Result<IfRegAddress, SyntaxError> {
    match (addr.region, addr.registers.as_slice()) {
        (Some(region), []) => Ok(IfRegAddress::MemBaseImm { region, offset: addr.offset as u64 }),
        (Some(region), [(offset_register, _)]) => Ok(IfRegAddress::MemBaseReg { region, offset_register: *offset_register }),
        (None, [(base, _)]) => Ok(IfRegAddress::RegOff { base: *base, offset: addr.offset as u64 }),
        (None, [(base, _), (offset_register, _)]) => Ok(IfRegAddress::RegOffReg { base: *base, offset_register: *offset_register }),
        _ => Err(SyntaxError::new("unsupported if-reg address shape", fragment)),
    }
}

/// Splits an `=`-bearing line at the top bracket-nesting level, returning
/// `(lhs, compound-op, rhs)`. A compound assignment (`+=`, `-=`, `*=`,
/// `<<=`, `>>=`) is detected by the operator glyph sitting directly
/// against the `=` with no intervening space, the way the formatter
/// emits it.
fn split_assignment<'a>(line: &'a str, fragment: &str) -> Result<(String, Option<ArithOp>, String), SyntaxError> {
    let mut depth = 0i32;
    let mut eq_pos = None;
    for (i, c) in line.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            '=' if depth == 0 => {
                eq_pos = Some(i);
                break;
            }
            _ => {}
        }
    }
    let eq_pos = eq_pos.ok_or_else(|| SyntaxError::new("expected an assignment", fragment))?;
    let prefix = &line[..eq_pos];
    let (lhs, op) = if let Some(p) = prefix.strip_suffix("<<") {
        (p, Some(ArithOp::Lshift))
    } else if let Some(p) = prefix.strip_suffix(">>") {
        (p, Some(ArithOp::Rshift))
    } else if let Some(p) = prefix.strip_suffix('+') {
        (p, Some(ArithOp::Add))
    } else if let Some(p) = prefix.strip_suffix('-') {
        (p, Some(ArithOp::Sub))
    } else if let Some(p) = prefix.strip_suffix('*') {
        (p, Some(ArithOp::Mul))
    } else {
        (prefix, None)
    };
    let rhs = &line[eq_pos + 1..];
    Ok((lhs.trim().to_string(), op, rhs.trim().to_string()))
}

fn parse_assignment(width: Option<Width>, lower: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let (lhs, op, rhs) = split_assignment(lower, fragment)?;

    if let Some(op) = op {
        let width = require_width(width, fragment)?;
        let register = parse_register(&lhs, fragment)?;
        let value = parse_value(&rhs, width)?;
        return Ok(Instruction::LegacyArithImm(LegacyArithImm::build(width, register, op, value)?));
    }

    if let Some(inner) = lhs.strip_prefix("save[").and_then(|s| s.strip_suffix(']')) {
        return parse_save_slot_assignment(inner, &rhs, fragment);
    }
    if let Some(inner) = lhs.strip_prefix("static[").and_then(|s| s.strip_suffix(']')) {
        return parse_static_assignment(inner, &rhs, fragment);
    }
    if let Some(inner) = rhs.strip_prefix("save[").and_then(|s| s.strip_suffix(']')) {
        let register = parse_register(&lhs, fragment)?;
        let slot = parse_save_slot(inner, fragment)?;
        return Ok(Instruction::SaveRestore(SaveRestore::build(crate::types::SaveRestoreOp::Restore, slot, register)));
    }
    if let Some(inner) = rhs.strip_prefix("static[").and_then(|s| s.strip_suffix(']')) {
        return parse_static_assignment(inner, &lhs, fragment);
    }
    if lhs.contains(',') {
        let regs = parse_register_list(&lhs, fragment)?;
        if rhs != "0" {
            return Err(SyntaxError::new("register list assignment must be to 0", fragment).into());
        }
        return Ok(Instruction::SaveRestoreMask(SaveRestoreMask::build(crate::types::SaveRestoreOp::RegZero, mask_from_registers(&regs))));
    }
    if lhs.starts_with('[') {
        return parse_store(width, &lhs, &rhs, fragment);
    }
    if rhs.starts_with('[') {
        return parse_load(width, &lhs, &rhs, fragment);
    }

    // Plain register destination: move, reg/reg arith, or reg/imm arith.
    let dest = parse_register(&lhs, fragment)?;
    match width {
        Some(width) => parse_reg_rhs(width, dest, &rhs, fragment),
        None => parse_move_or_reg_zero(dest, &rhs, fragment),
    }
}

fn parse_save_slot(tok: &str, fragment: &str) -> Result<SaveSlot, SyntaxError> {
    let index: u8 = tok.trim().parse().map_err(|_| SyntaxError::new("malformed save slot index", fragment))?;
    SaveSlot::new(index).ok_or_else(|| SyntaxError::new("save slot index out of range", fragment))
}

fn parse_save_slot_assignment(inner: &str, rhs: &str, fragment: &str) -> Result<Instruction, CodecError> {
    if inner.contains(',') {
        let slots: Result<Vec<SaveSlot>, _> = inner.split(',').map(|t| parse_save_slot(t.trim(), fragment)).collect();
        let slots = slots?;
        if rhs != "0" {
            return Err(SyntaxError::new("save-slot list assignment must be to 0", fragment).into());
        }
        return Ok(Instruction::SaveRestoreMask(SaveRestoreMask::build(crate::types::SaveRestoreOp::Clear, mask_from_slots(&slots))));
    }
    let slot = parse_save_slot(inner, fragment)?;
    if rhs == "0" {
        return Ok(Instruction::SaveRestore(SaveRestore::build(crate::types::SaveRestoreOp::Clear, slot, Register::new(0).unwrap())));
    }
    let register = parse_register(rhs, fragment)?;
    Ok(Instruction::SaveRestore(SaveRestore::build(crate::types::SaveRestoreOp::Save, slot, register)))
}

fn parse_static_assignment(inner: &str, other: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let index = parse_integer_u8(inner, fragment)?;
    let static_reg = StaticRegister::new(index);
    let register = parse_register(other, fragment)?;
    Ok(Instruction::StaticRegRw(StaticRegRw::build(static_reg, register)))
}

fn parse_integer_u8(tok: &str, fragment: &str) -> Result<u8, SyntaxError> {
    let tok = tok.trim();
    if let Some(hex) = tok.strip_prefix("0x") {
        u8::from_str_radix(hex, 16).map_err(|_| SyntaxError::new("malformed index", fragment))
    } else {
        tok.parse().map_err(|_| SyntaxError::new("malformed index", fragment))
    }
}

fn parse_move_or_reg_zero(dest: Register, rhs: &str, fragment: &str) -> Result<Instruction, CodecError> {
    if rhs == "0" {
        return Ok(Instruction::SaveRestore(SaveRestore::build(crate::types::SaveRestoreOp::RegZero, SaveSlot::new(0).unwrap(), dest)));
    }
    let value = check_fits_width(rhs, Width::U64)?;
    Ok(Instruction::MoveReg(MoveReg::build(dest, value)))
}

fn parse_reg_rhs(width: Width, dest: Register, rhs: &str, fragment: &str) -> Result<Instruction, CodecError> {
    if let Some(src_tok) = rhs.strip_prefix('~') {
        let src = parse_register(src_tok.trim(), fragment)?;
        return Ok(Instruction::ArithRegReg(ArithRegReg::build(width, dest, src, ArithOp::Not, src)));
    }
    let toks: Vec<&str> = rhs.split_whitespace().collect();
    match toks.as_slice() {
        [src_tok] if reg_index(src_tok).is_some() => {
            let src = parse_register(src_tok, fragment)?;
            Ok(Instruction::ArithRegReg(ArithRegReg::build(width, dest, src, ArithOp::Move, src)))
        }
        [src_tok, op_tok, operand_tok] => {
            let src = parse_register(src_tok, fragment)?;
            let op = ArithOp::parse(op_tok).ok_or_else(|| SyntaxError::new("unknown arithmetic operator", fragment))?;
            if reg_index(operand_tok).is_some() {
                let src2 = parse_register(operand_tok, fragment)?;
                Ok(Instruction::ArithRegReg(ArithRegReg::build(width, dest, src, op, src2)))
            } else {
                let value = parse_value(operand_tok, width)?;
                Ok(Instruction::ArithRegImm(ArithRegImm::build(width, dest, src, op, value)))
            }
        }
        _ => Err(SyntaxError::new("expected 'rS', '~rS' or 'rS OP value'", fragment).into()),
    }
}

fn parse_store(width: Option<Width>, lhs: &str, rhs: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let addr = address::parse(lhs)?;
    if is_immediate(rhs) {
        let width = require_width(width, fragment)?;
        if let Some(region) = addr.region {
            if addr.registers.len() > 1 {
                return Err(SyntaxError::new("store-imm takes at most one register", fragment).into());
            }
            let register = addr.single_register().map(|(r, _)| r).unwrap_or(Register::new(0).unwrap());
            let value = parse_value(rhs, width)?;
            return Ok(Instruction::StoreImm(StoreImm::build(width, region, register, addr.offset as u64, value)?));
        }
        let (base, self_increment) = addr.registers.first().copied().ok_or_else(|| {
            SyntaxError::new("store requires a register base or a memory region", fragment)
        })?;
        let offset_register = addr.registers.get(1).map(|(r, _)| *r);
        let value = check_fits_width(rhs, Width::U64)?;
        return Ok(Instruction::StoreImmViaReg(StoreImmViaReg::build(width, base, self_increment, offset_register, value)));
    }

    let width = require_width(width, fragment)?;
    let source = parse_register(rhs, fragment)?;
    let address = store_reg_address_from_addr(&addr, fragment)?;
    Ok(store_reg_instruction(width, source, &addr, address))
}

fn store_reg_instruction(width: Width, source: Register, addr: &AddressExpr, address: StoreRegAddress) -> Instruction {
    let self_increment = addr.registers.first().map(|(_, s)| *s).unwrap_or(false);
    Instruction::StoreReg(StoreReg::build(width, source, self_increment, address))
}

fn store_reg_address_from_addr(addr: &AddressExpr, fragment: &str) -> Result<StoreRegAddress, SyntaxError> {
    if let Some(region) = addr.region {
        return match addr.registers.as_slice() {
            [] => Ok(StoreRegAddress::MemBaseImm { region, offset: addr.offset as u64 }),
            [(offset_register, _)] if addr.offset == 0 => {
                Ok(StoreRegAddress::MemBaseReg { region, offset_register: *offset_register })
            }
            [(offset_register, _)] => Ok(StoreRegAddress::MemBaseImmOffReg { region, offset: addr.offset as u64, offset_register: *offset_register }),
            _ => Err(SyntaxError::new("unsupported store-reg address shape", fragment)),
        };
    }
    match addr.registers.as_slice() {
        [(base, _)] if addr.offset == 0 => Ok(StoreRegAddress::NoOffset { base: *base }),
        [(base, _)] => Ok(StoreRegAddress::OffImm { base: *base, offset: addr.offset as u64 }),
        [(base, _), (offset_register, _)] if addr.offset == 0 => {
            Ok(StoreRegAddress::OffReg { base: *base, offset_register: *offset_register })
        }
        _ => Err(SyntaxError::new("unsupported store-reg address shape", fragment)),
    }
}

fn parse_load(width: Option<Width>, lhs: &str, rhs: &str, fragment: &str) -> Result<Instruction, CodecError> {
    let width = require_width(width, fragment)?;
    let dest = parse_register(lhs, fragment)?;
    let addr = address::parse(rhs)?;
    let base = match addr.single_register() {
        Some((r, _)) if r == dest => LoadBase::SelfDeref,
        Some(_) => return Err(SyntaxError::new("load's register base must be the destination register", fragment).into()),
        None => {
            let region = addr.region.ok_or_else(|| SyntaxError::new("expected a memory region or self-deref base", fragment))?;
            LoadBase::Region(region)
        }
    };
    Ok(Instruction::Load(Load::build(width, dest, base, addr.offset as u64)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemRegion;

    #[test]
    fn store_imm_matches_scenario_1_fields() {
        let i = assemble_line("u32 [main + 0x100 + r2] = 0x1234").unwrap();
        match i {
            Instruction::StoreImm(s) => {
                assert_eq!(s.width, Width::U32);
                assert_eq!(s.region, MemRegion::Main);
                assert_eq!(s.register, Register::new(2).unwrap());
                assert_eq!(s.address, 0x100);
                assert_eq!(s.value, 0x1234);
            }
            other => panic!("expected StoreImm, got {other:?}"),
        }
    }

    #[test]
    fn if_off_imm_matches_scenario_2() {
        let i = assemble_line("if u64 [heap + 0x1234] > 0x5678 then").unwrap();
        assert_eq!(i.to_machine_code(), "18110000 00001234 00000000 00005678");
    }

    #[test]
    fn loop_matches_scenario_3() {
        let i = assemble_line("loop r2 to 10").unwrap();
        assert_eq!(i.to_machine_code(), "30020000 0000000A");
    }

    #[test]
    fn move_reg_matches_scenario_4() {
        let i = assemble_line("r1 = 0x1234").unwrap();
        assert_eq!(i.to_machine_code(), "40010000 00000000 00001234");
    }

    #[test]
    fn if_key_matches_scenario_5() {
        let i = assemble_line("if key A | B").unwrap();
        assert_eq!(i.to_machine_code(), "80000003");
    }

    #[test]
    fn save_round_trips_scenario_6_fields() {
        let i = assemble_line("save[3] = r5").unwrap();
        match i {
            Instruction::SaveRestore(s) => {
                assert_eq!(s.op, crate::types::SaveRestoreOp::Save);
                assert_eq!(s.slot.index(), 3);
                assert_eq!(s.register, Register::new(5).unwrap());
            }
            other => panic!("expected SaveRestore, got {other:?}"),
        }
    }

    #[test]
    fn pause_matches_scenario_7() {
        assert_eq!(assemble_line("pause").unwrap().to_machine_code(), "FF000000");
    }

    #[test]
    fn unknown_register_is_syntax_error() {
        let err = assemble_line("r16 = 0x1").unwrap_err();
        assert!(matches!(err, CodecError::Syntax(_)));
    }

    #[test]
    fn overflowing_value_is_encoding_error() {
        let err = assemble_line("u8 [main + 0x0] = 0x1FF").unwrap_err();
        assert!(matches!(err, CodecError::Encoding(_)));
    }

    #[test]
    fn unknown_if_reg_register_is_syntax_error() {
        let err = assemble_line("if u32 rA == r0").unwrap_err();
        assert!(matches!(err, CodecError::Syntax(_)));
    }

    #[test]
    fn arith_reg_imm_parses_operator_and_value() {
        let i = assemble_line("u32 r1 = r2 + 0x10").unwrap();
        match i {
            Instruction::ArithRegImm(a) => {
                assert_eq!(a.op, ArithOp::Add);
                assert_eq!(a.value, 0x10);
            }
            other => panic!("expected ArithRegImm, got {other:?}"),
        }
    }

    #[test]
    fn legacy_arith_imm_parses_compound_assignment() {
        let i = assemble_line("u32 r0 += 0x10").unwrap();
        match i {
            Instruction::LegacyArithImm(a) => assert_eq!(a.op, ArithOp::Add),
            other => panic!("expected LegacyArithImm, got {other:?}"),
        }
    }

    #[test]
    fn store_reg_no_offset_parses() {
        let i = assemble_line("u32 [r2] = r5").unwrap();
        assert_eq!(i.to_assembly(), "u32 [r2] = r5");
    }

    #[test]
    fn load_self_deref_parses() {
        let i = assemble_line("u32 r3 = [r3 + 0x10]").unwrap();
        match i {
            Instruction::Load(l) => assert!(matches!(l.base, LoadBase::SelfDeref)),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn static_read_parses() {
        let i = assemble_line("r2 = static[0x10]").unwrap();
        match i {
            Instruction::StaticRegRw(s) => assert!(!s.static_reg.is_write()),
            other => panic!("expected StaticRegRw, got {other:?}"),
        }
    }

    #[test]
    fn bare_save_keyword_builds_mask() {
        let i = assemble_line("save r0, r2, r5").unwrap();
        match i {
            Instruction::SaveRestoreMask(m) => assert_eq!(m.mask, 0b0010_0101),
            other => panic!("expected SaveRestoreMask, got {other:?}"),
        }
    }
}
