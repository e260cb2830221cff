//! Functional units.
//!
//! The only functional unit the pipeline model needs is the branch unit:
//! direction predictors and the oracle that resolves branches in EX. ALU and
//! memory operations have fixed single-cycle behaviour and no state.

/// Branch Resolution Unit: direction predictors and outcome oracles.
pub mod bru;
