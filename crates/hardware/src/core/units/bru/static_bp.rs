//! Static Branch Predictor.
//!
//! Implements a fixed-direction policy: every conditional branch is predicted
//! with the same bias regardless of its address or history. It mispredicts
//! exactly when the actual outcome differs from that bias.

use super::ledger::PredictionLedger;
use super::{BranchPredictor, BranchTag, PredictorStats};

/// Static Branch Predictor structure.
#[derive(Debug, Clone)]
pub struct StaticPredictor {
    /// Direction returned for every branch.
    always_taken: bool,
    /// Unresolved guesses and counts.
    ledger: PredictionLedger<bool>,
}

impl StaticPredictor {
    /// Creates a static predictor with the given bias.
    ///
    /// # Arguments
    ///
    /// * `always_taken` - `true` for always-taken, `false` for always-not-taken.
    pub fn new(always_taken: bool) -> Self {
        Self {
            always_taken,
            ledger: PredictionLedger::new(),
        }
    }

    /// Always-not-taken predictor.
    pub fn not_taken() -> Self {
        Self::new(false)
    }

    /// Always-taken predictor.
    pub fn taken() -> Self {
        Self::new(true)
    }
}

impl BranchPredictor for StaticPredictor {
    /// Returns the fixed bias; the address is ignored.
    fn predict(&mut self, branch: BranchTag) -> bool {
        let bias = self.always_taken;
        self.ledger.record(branch, || bias)
    }

    /// Only scores the guess; there is no direction state to train.
    fn update(&mut self, branch: BranchTag, taken: bool) {
        let bias = self.always_taken;
        let _ = self.ledger.settle(branch, taken, || bias);
    }

    fn withdraw(&mut self, branch: BranchTag) {
        let _ = self.ledger.withdraw(branch);
    }

    fn stats(&self) -> PredictorStats {
        self.ledger.stats()
    }

    fn name(&self) -> &'static str {
        if self.always_taken {
            "Static-AlwaysTaken"
        } else {
            "Static-AlwaysNotTaken"
        }
    }
}
