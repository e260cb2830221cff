//! Instruction Set Architecture (ISA) Definitions.
//!
//! The teaching ISA has eight opcodes and a 32-entry register file. There is
//! no encoding: instructions are produced already decoded by the trace loader.
//!
//! * `opcode`: operations and their register-port classification.
//! * `instruction`: the decoded instruction record and the program container.

/// Decoded instruction record and program container.
pub mod instruction;

/// Operation codes and operand-port classification.
pub mod opcode;

pub use instruction::{Instruction, NUM_REGS, Program, Reg};
pub use opcode::Opcode;
