//! 1-bit Branch Predictor.
//!
//! Remembers the last observed outcome of every branch address and predicts
//! that it repeats. Branches never seen before are predicted not-taken.

use std::collections::HashMap;

use super::ledger::PredictionLedger;
use super::{BranchPredictor, BranchTag, PredictorStats};

/// Per-PC last-outcome predictor.
#[derive(Debug, Clone, Default)]
pub struct OneBitPredictor {
    /// Last resolved outcome, keyed by branch pc.
    table: HashMap<usize, bool>,
    /// Unresolved guesses and counts.
    ledger: PredictionLedger<bool>,
}

impl OneBitPredictor {
    /// Creates a predictor with an empty history table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored outcome for `pc`, if the branch has resolved before.
    pub fn last_outcome(&self, pc: usize) -> Option<bool> {
        self.table.get(&pc).copied()
    }
}

impl BranchPredictor for OneBitPredictor {
    fn predict(&mut self, branch: BranchTag) -> bool {
        let guess = self.last_outcome(branch.pc).unwrap_or(false);
        self.ledger.record(branch, || guess)
    }

    /// Overwrites the stored outcome.
    fn update(&mut self, branch: BranchTag, taken: bool) {
        let guess = self.last_outcome(branch.pc).unwrap_or(false);
        let _ = self.ledger.settle(branch, taken, || guess);
        let _ = self.table.insert(branch.pc, taken);
    }

    fn withdraw(&mut self, branch: BranchTag) {
        let _ = self.ledger.withdraw(branch);
    }

    fn stats(&self) -> PredictorStats {
        self.ledger.stats()
    }

    fn name(&self) -> &'static str {
        "OneBit"
    }
}
