//! Trace Loader.
//!
//! This module turns the textual instruction trace into a [`Program`]. It performs:
//! 1. **Line handling:** Strips `#` comments and surrounding whitespace, skips blank lines.
//! 2. **Operand parsing:** Registers (`r3`, `X3`, `3`), memory operands (`[r2]`,
//!    `[r2+8]`, `[r2-8]`) and signed immediates.
//! 3. **Numbering:** Ids and fetch positions are assigned in file order by
//!    [`Program::new`].
//!
//! Errors carry the 1-based line number of the offending line.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::error::{Result, SimError};
use crate::isa::{Instruction, NUM_REGS, Opcode, Program, Reg};

/// Reads and parses a trace file.
///
/// # Arguments
///
/// * `path` - Path to the trace file.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read and
/// [`SimError::Trace`] for the first malformed line.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Program> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    let program = parse_trace(&text)?;
    debug!(path = %path.display(), instructions = program.len(), "trace loaded");
    Ok(program)
}

/// Parses trace text into a program.
///
/// # Errors
///
/// Returns [`SimError::Trace`] for the first malformed line.
///
/// # Examples
///
/// ```
/// use pipesim_core::isa::Opcode;
/// use pipesim_core::sim::loader::parse_trace;
///
/// let program = parse_trace("LOAD r1 [r2+4]  # fetch\nadd r3 r1 r1\nHALT\n").unwrap();
/// assert_eq!(program.len(), 3);
/// assert_eq!(program.instructions()[1].op, Opcode::Add);
/// assert_eq!(program.instructions()[2].pc, 2);
/// ```
pub fn parse_trace(text: &str) -> Result<Program> {
    let mut instructions = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if line.is_empty() {
            continue;
        }
        let inst = parse_line(line).map_err(|e| e.at_line(idx + 1, line))?;
        instructions.push(inst);
    }
    Ok(Program::new(instructions))
}

/// Parses one comment-free, non-empty line.
fn parse_line(line: &str) -> Result<Instruction> {
    let mut tokens = line.split_whitespace();
    let op: Opcode = tokens.next().unwrap_or_default().parse()?;
    let operands: Vec<&str> = tokens.collect();

    let expected = match op {
        Opcode::Add | Opcode::Sub | Opcode::Beq | Opcode::Bne => 3,
        Opcode::Load | Opcode::Store => 2,
        Opcode::Nop | Opcode::Halt => 0,
    };
    if operands.len() != expected {
        return Err(SimError::BadOperands(format!(
            "{op} takes {expected}, found {}",
            operands.len()
        )));
    }

    let inst = match op {
        Opcode::Add => Instruction::add(
            parse_reg(operands[0])?,
            parse_reg(operands[1])?,
            parse_reg(operands[2])?,
        ),
        Opcode::Sub => Instruction::sub(
            parse_reg(operands[0])?,
            parse_reg(operands[1])?,
            parse_reg(operands[2])?,
        ),
        Opcode::Load => {
            let rd = parse_reg(operands[0])?;
            let (base, offset) = parse_mem_operand(operands[1])?;
            Instruction::load(rd, base, offset)
        }
        Opcode::Store => {
            let src = parse_reg(operands[0])?;
            let (base, offset) = parse_mem_operand(operands[1])?;
            Instruction::store(src, base, offset)
        }
        Opcode::Beq => Instruction::beq(
            parse_reg(operands[0])?,
            parse_reg(operands[1])?,
            parse_imm(operands[2])?,
        ),
        Opcode::Bne => Instruction::bne(
            parse_reg(operands[0])?,
            parse_reg(operands[1])?,
            parse_imm(operands[2])?,
        ),
        Opcode::Nop => Instruction::nop(),
        Opcode::Halt => Instruction::halt(),
    };
    Ok(inst)
}

/// Parses `rN`, `xN` (either case) or a bare `N`, with `N < NUM_REGS`.
///
/// # Errors
///
/// Returns [`SimError::BadRegister`] for any other token.
pub fn parse_reg(token: &str) -> Result<Reg> {
    let digits = token
        .strip_prefix(['r', 'R', 'x', 'X'])
        .unwrap_or(token);
    match digits.parse::<Reg>() {
        Ok(reg) if reg < NUM_REGS => Ok(reg),
        _ => Err(SimError::BadRegister(token.to_string())),
    }
}

/// Parses a signed immediate; a leading `+` is accepted.
///
/// # Errors
///
/// Returns [`SimError::BadImmediate`] if `token` is not a decimal integer.
pub fn parse_imm(token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| SimError::BadImmediate(token.to_string()))
}

/// Parses `[rB]`, `[rB+imm]` or `[rB-imm]` into `(base, offset)`.
///
/// # Errors
///
/// Returns [`SimError::BadMemOperand`] if the brackets, base register or
/// offset are malformed.
pub fn parse_mem_operand(token: &str) -> Result<(Reg, i64)> {
    let bad = || SimError::BadMemOperand(token.to_string());
    let inner = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(bad)?;

    match inner.find(['+', '-']) {
        None => Ok((parse_reg(inner).map_err(|_| bad())?, 0)),
        Some(sep) => {
            let (base, offset) = inner.split_at(sep);
            let base = parse_reg(base).map_err(|_| bad())?;
            let offset = offset.parse().map_err(|_| bad())?;
            Ok((base, offset))
        }
    }
}
