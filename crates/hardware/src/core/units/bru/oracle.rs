//! Branch outcome oracles.
//!
//! The simulator has no register file, so a branch's real direction cannot be
//! computed from its operands. An oracle supplies the ground truth the engine
//! compares predictions against when a branch resolves in EX.

use crate::isa::Instruction;

/// Source of ground-truth branch outcomes.
pub trait BranchOracle {
    /// Returns `true` if `branch` is taken.
    fn resolve(&self, branch: &Instruction) -> bool;
}

/// Default oracle: a branch is taken iff its displacement is negative.
///
/// Backward branches close loops, so this treats every loop as taken and
/// every forward skip as not-taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignOfImmediate;

impl BranchOracle for SignOfImmediate {
    fn resolve(&self, branch: &Instruction) -> bool {
        branch.imm < 0
    }
}

impl<F: Fn(&Instruction) -> bool> BranchOracle for F {
    fn resolve(&self, branch: &Instruction) -> bool {
        self(branch)
    }
}
