//! Opcode definitions for the teaching ISA.
//!
//! The instruction set is deliberately tiny: two ALU operations, a load and a
//! store, two conditional branches, `NOP` and `HALT`. This module classifies
//! each opcode by the register ports it uses, which is all the hazard detector
//! and the pipeline engine need to know about an operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::SimError;

/// Operation performed by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// `ADD rd rs1 rs2`
    Add,
    /// `SUB rd rs1 rs2`
    Sub,
    /// `LOAD rd [rs1+imm]`
    Load,
    /// `STORE rs2 [rs1+imm]`
    Store,
    /// `BEQ rs1 rs2 imm` (PC-relative offset, in instructions)
    Beq,
    /// `BNE rs1 rs2 imm`
    Bne,
    /// No operation.
    #[default]
    Nop,
    /// Stops the simulation when it reaches writeback.
    Halt,
}

impl Opcode {
    /// Every opcode, in encoding order.
    pub const ALL: [Self; 8] = [
        Self::Add,
        Self::Sub,
        Self::Load,
        Self::Store,
        Self::Beq,
        Self::Bne,
        Self::Nop,
        Self::Halt,
    ];

    /// Upper-case assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Beq => "BEQ",
            Self::Bne => "BNE",
            Self::Nop => "NOP",
            Self::Halt => "HALT",
        }
    }

    /// Returns `true` if the operation writes a destination register.
    pub const fn writes_register(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Load)
    }

    /// Returns `true` for the conditional branches.
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Beq | Self::Bne)
    }

    /// Returns `true` if the operation reads its `rs1` port.
    ///
    /// `rs1` is the first ALU operand, the base address of a memory access,
    /// or the first comparison operand of a branch.
    pub const fn reads_rs1(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Load | Self::Store | Self::Beq | Self::Bne
        )
    }

    /// Returns `true` if the operation reads its `rs2` port.
    ///
    /// `LOAD` has no second source; `STORE` reads the data to be written.
    pub const fn reads_rs2(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Store | Self::Beq | Self::Bne
        )
    }

    /// Returns `true` for instructions that count towards the retired total.
    pub const fn retires(self) -> bool {
        !matches!(self, Self::Nop | Self::Halt)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Opcode {
    type Err = SimError;

    /// Parses a mnemonic, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownOpcode(s.to_string()))
    }
}
