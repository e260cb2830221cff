//! Program builder.
//!
//! Assembles a [`Program`] one instruction at a time so tests read like the
//! trace they model:
//!
//! ```ignore
//! let program = ProgramBuilder::new().load(1, 2, 0).add(3, 1, 4).halt().build();
//! ```

use pipesim_core::isa::{Instruction, Program, Reg};

/// Fluent builder for test programs.
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    /// Starts an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary instruction.
    pub fn push(mut self, inst: Instruction) -> Self {
        self.instructions.push(inst);
        self
    }

    /// `ADD rd rs1 rs2`
    pub fn add(self, rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        self.push(Instruction::add(rd, rs1, rs2))
    }

    /// `SUB rd rs1 rs2`
    pub fn sub(self, rd: Reg, rs1: Reg, rs2: Reg) -> Self {
        self.push(Instruction::sub(rd, rs1, rs2))
    }

    /// `LOAD rd [base+offset]`
    pub fn load(self, rd: Reg, base: Reg, offset: i64) -> Self {
        self.push(Instruction::load(rd, base, offset))
    }

    /// `STORE src [base+offset]`
    pub fn store(self, src: Reg, base: Reg, offset: i64) -> Self {
        self.push(Instruction::store(src, base, offset))
    }

    /// `BEQ rs1 rs2 offset`
    pub fn beq(self, rs1: Reg, rs2: Reg, offset: i64) -> Self {
        self.push(Instruction::beq(rs1, rs2, offset))
    }

    /// `BNE rs1 rs2 offset`
    pub fn bne(self, rs1: Reg, rs2: Reg, offset: i64) -> Self {
        self.push(Instruction::bne(rs1, rs2, offset))
    }

    /// `NOP`
    pub fn nop(self) -> Self {
        self.push(Instruction::nop())
    }

    /// `NOP`, `count` times.
    pub fn nops(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.push(Instruction::nop());
        }
        self
    }

    /// `HALT`
    pub fn halt(self) -> Self {
        self.push(Instruction::halt())
    }

    /// Numbers the instructions and returns the program.
    pub fn build(self) -> Program {
        Program::new(self.instructions)
    }
}
