//! Decoded instruction and program containers.
//!
//! An [`Instruction`] is the unit that flows through the pipeline latches. It is
//! immutable once loaded and small enough to copy between stages. A
//! [`Program`] is the fixed, caller-owned array the engine fetches from; it
//! assigns every instruction its unique id and fetch-order position.

use std::fmt;

use serde::Serialize;

use super::opcode::Opcode;

/// Architectural register index.
pub type Reg = usize;

/// Size of the register file.
pub const NUM_REGS: usize = 32;

/// A decoded instruction.
///
/// Operand fields an opcode does not use are `None`. `id` and `pc` are
/// placeholders (zero) until the instruction is placed into a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Instruction {
    /// Operation.
    pub op: Opcode,
    /// Destination register (ADD/SUB/LOAD only).
    pub rd: Option<Reg>,
    /// First source: ALU operand, memory base, or first comparison operand.
    pub rs1: Option<Reg>,
    /// Second source: ALU operand, store data, or second comparison operand.
    pub rs2: Option<Reg>,
    /// Address offset for LOAD/STORE, displacement in instructions for BEQ/BNE.
    pub imm: i64,
    /// Globally unique, monotonically increasing sequence id.
    pub id: u64,
    /// Fetch-order position in the program.
    pub pc: usize,
}

impl Instruction {
    /// `ADD rd rs1 rs2`
    pub const fn add(rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        Self::alu(Opcode::Add, rd, rs1, rs2)
    }

    /// `SUB rd rs1 rs2`
    pub const fn sub(rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        Self::alu(Opcode::Sub, rd, rs1, rs2)
    }

    /// `LOAD rd [base+offset]`
    pub const fn load(rd: Reg, base: Reg, offset: i64) -> Self {
        Self {
            op: Opcode::Load,
            rd: Some(rd),
            rs1: Some(base),
            rs2: None,
            imm: offset,
            id: 0,
            pc: 0,
        }
    }

    /// `STORE src [base+offset]`
    pub const fn store(src: Reg, base: Reg, offset: i64) -> Self {
        Self {
            op: Opcode::Store,
            rd: None,
            rs1: Some(base),
            rs2: Some(src),
            imm: offset,
            id: 0,
            pc: 0,
        }
    }

    /// `BEQ rs1 rs2 offset`
    pub const fn beq(rs1: Reg, rs2: Reg, offset: i64) -> Self {
        Self::branch(Opcode::Beq, rs1, rs2, offset)
    }

    /// `BNE rs1 rs2 offset`
    pub const fn bne(rs1: Reg, rs2: Reg, offset: i64) -> Self {
        Self::branch(Opcode::Bne, rs1, rs2, offset)
    }

    /// `NOP`
    pub const fn nop() -> Self {
        Self::bare(Opcode::Nop)
    }

    /// `HALT`
    pub const fn halt() -> Self {
        Self::bare(Opcode::Halt)
    }

    const fn alu(op: Opcode, rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        Self {
            op,
            rd: Some(rd),
            rs1: Some(rs1),
            rs2: Some(rs2),
            imm: 0,
            id: 0,
            pc: 0,
        }
    }

    const fn branch(op: Opcode, rs1: Reg, rs2: Reg, offset: i64) -> Self {
        Self {
            op,
            rd: None,
            rs1: Some(rs1),
            rs2: Some(rs2),
            imm: offset,
            id: 0,
            pc: 0,
        }
    }

    const fn bare(op: Opcode) -> Self {
        Self {
            op,
            rd: None,
            rs1: None,
            rs2: None,
            imm: 0,
            id: 0,
            pc: 0,
        }
    }

    /// Register this instruction produces, if any.
    pub fn dest(&self) -> Option<Reg> {
        self.rd.filter(|_| self.op.writes_register())
    }

    /// Returns `true` if one of the operand ports this opcode reads names `reg`.
    pub fn reads(&self, reg: Reg) -> bool {
        (self.op.reads_rs1() && self.rs1 == Some(reg))
            || (self.op.reads_rs2() && self.rs2 == Some(reg))
    }

    /// Address of the instruction after this one.
    pub const fn fall_through(&self) -> i64 {
        (self.pc as i64).saturating_add(1)
    }

    /// PC-relative branch destination: `pc + 1 + imm`, clamped to the `i64`
    /// range.
    ///
    /// May fall outside the program; the fetch unit treats that as an empty slot.
    pub const fn branch_target(&self) -> i64 {
        self.fall_through().saturating_add(self.imm)
    }
}

/// Writes `rN`, or `r?` for an operand the loader never filled in.
fn fmt_reg(f: &mut fmt::Formatter<'_>, reg: Option<Reg>) -> fmt::Result {
    match reg {
        Some(r) => write!(f, "r{r}"),
        None => f.write_str("r?"),
    }
}

/// Writes a memory operand as `[rB+imm]` / `[rB-imm]`.
fn fmt_mem(f: &mut fmt::Formatter<'_>, base: Option<Reg>, imm: i64) -> fmt::Result {
    f.write_str("[")?;
    fmt_reg(f, base)?;
    write!(f, "{imm:+}]")
}

impl fmt::Display for Instruction {
    /// Disassembly in the trace syntax, prefixed with id and PC:
    /// `#3 PC=3 LOAD r1 [r2+4]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} PC={} {}", self.id, self.pc, self.op)?;
        match self.op {
            Opcode::Add | Opcode::Sub => {
                f.write_str(" ")?;
                fmt_reg(f, self.rd)?;
                f.write_str(" ")?;
                fmt_reg(f, self.rs1)?;
                f.write_str(" ")?;
                fmt_reg(f, self.rs2)
            }
            Opcode::Load => {
                f.write_str(" ")?;
                fmt_reg(f, self.rd)?;
                f.write_str(" ")?;
                fmt_mem(f, self.rs1, self.imm)
            }
            Opcode::Store => {
                f.write_str(" ")?;
                fmt_reg(f, self.rs2)?;
                f.write_str(" ")?;
                fmt_mem(f, self.rs1, self.imm)
            }
            Opcode::Beq | Opcode::Bne => {
                f.write_str(" ")?;
                fmt_reg(f, self.rs1)?;
                f.write_str(" ")?;
                fmt_reg(f, self.rs2)?;
                write!(f, " {}", self.imm)
            }
            Opcode::Nop | Opcode::Halt => Ok(()),
        }
    }
}

/// A fixed, ordered sequence of instructions.
///
/// Construction stamps each instruction with its fetch-order position and a
/// unique id, so ids are strictly increasing in program order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Builds a program, assigning `pc` and `id` from each instruction's index.
    pub fn new(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let instructions = instructions
            .into_iter()
            .enumerate()
            .map(|(idx, inst)| Instruction {
                id: idx as u64,
                pc: idx,
                ..inst
            })
            .collect();
        Self { instructions }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the program holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at a (possibly out-of-range) fetch address.
    pub fn fetch(&self, addr: i64) -> Option<&Instruction> {
        usize::try_from(addr)
            .ok()
            .and_then(|idx| self.instructions.get(idx))
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterates over the instructions in program order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
