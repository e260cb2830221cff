//! 2-bit Saturating Counter Predictor.
//!
//! Each branch address owns a counter in `0..=3`. Values 2 and 3 predict taken.
//! A taken outcome moves the counter toward 3, a not-taken outcome toward 0,
//! and the counter saturates at both ends instead of wrapping. Unseen branches
//! start at 0 (strongly not-taken).

use std::collections::HashMap;

use super::ledger::PredictionLedger;
use super::{BranchPredictor, BranchTag, PredictorStats};

/// Largest counter value.
pub const COUNTER_MAX: u8 = 3;

/// Counter value at and above which the prediction is "taken".
pub const TAKEN_THRESHOLD: u8 = 2;

/// Moves a 2-bit counter one step toward the observed outcome, saturating.
pub(crate) const fn saturate(counter: u8, taken: bool) -> u8 {
    if taken {
        if counter < COUNTER_MAX {
            counter + 1
        } else {
            counter
        }
    } else {
        counter.saturating_sub(1)
    }
}

/// Per-PC 2-bit saturating counter predictor.
#[derive(Debug, Clone, Default)]
pub struct TwoBitPredictor {
    /// Counter state, keyed by branch pc.
    table: HashMap<usize, u8>,
    /// Unresolved guesses and counts.
    ledger: PredictionLedger<bool>,
}

impl TwoBitPredictor {
    /// Creates a predictor with an empty counter table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter for `pc` (0 if the branch has never resolved).
    pub fn counter(&self, pc: usize) -> u8 {
        self.table.get(&pc).copied().unwrap_or(0)
    }

    fn direction(&self, pc: usize) -> bool {
        self.counter(pc) >= TAKEN_THRESHOLD
    }
}

impl BranchPredictor for TwoBitPredictor {
    fn predict(&mut self, branch: BranchTag) -> bool {
        let guess = self.direction(branch.pc);
        self.ledger.record(branch, || guess)
    }

    fn update(&mut self, branch: BranchTag, taken: bool) {
        let guess = self.direction(branch.pc);
        let _ = self.ledger.settle(branch, taken, || guess);
        let state = self.table.entry(branch.pc).or_insert(0);
        *state = saturate(*state, taken);
    }

    fn withdraw(&mut self, branch: BranchTag) {
        let _ = self.ledger.withdraw(branch);
    }

    fn stats(&self) -> PredictorStats {
        self.ledger.stats()
    }

    fn name(&self) -> &'static str {
        "TwoBit"
    }
}
