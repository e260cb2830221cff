//! Tournament Branch Predictor.
//!
//! A hybrid predictor that runs a 1-bit and a 2-bit predictor side by side and
//! uses a per-PC meta-predictor (the chooser) to pick which answer to return.
//! Both component predictions are retained per occurrence until the branch
//! resolves, so the chooser is trained on what each component actually said
//! even when a younger instance of the same branch was predicted in between.

use std::collections::HashMap;

use super::ledger::{Guess, PredictionLedger};
use super::{
    BranchPredictor, BranchTag, PredictorStats, one_bit::OneBitPredictor, two_bit,
    two_bit::TwoBitPredictor,
};

/// Initial chooser value: weakly prefer the 1-bit component.
const CHOOSER_INIT: u8 = 1;

/// Component predictions recorded for one branch occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentGuess {
    /// Prediction of the 1-bit component.
    pub one_bit: bool,
    /// Prediction of the 2-bit component.
    pub two_bit: bool,
    /// The answer the chooser selected.
    pub taken: bool,
}

impl Guess for ComponentGuess {
    fn taken(&self) -> bool {
        self.taken
    }
}

/// How often each component would have been right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentStats {
    /// Branches resolved through this predictor.
    pub resolved: u64,
    /// Resolutions where the 1-bit component was correct.
    pub one_bit_correct: u64,
    /// Resolutions where the 2-bit component was correct.
    pub two_bit_correct: u64,
}

/// Tournament Predictor structure.
///
/// Each instance owns its components by value, so two tournament predictors
/// never share history.
#[derive(Debug, Clone, Default)]
pub struct TournamentPredictor {
    /// Local last-outcome component.
    one_bit: OneBitPredictor,
    /// Saturating-counter component.
    two_bit: TwoBitPredictor,
    /// Choice counters (0..=3): 0-1 select the 1-bit component, 2-3 the 2-bit.
    chooser: HashMap<usize, u8>,
    /// Component predictions of every unresolved occurrence.
    ledger: PredictionLedger<ComponentGuess>,
    /// Per-component accuracy counters.
    stats: ComponentStats,
}

impl TournamentPredictor {
    /// Creates a tournament predictor with untrained components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooser counter for `pc`.
    pub fn chooser(&self, pc: usize) -> u8 {
        self.chooser.get(&pc).copied().unwrap_or(CHOOSER_INIT)
    }

    /// Returns `true` if the chooser currently selects the 2-bit component.
    pub fn prefers_two_bit(&self, pc: usize) -> bool {
        self.chooser(pc) >= two_bit::TAKEN_THRESHOLD
    }

    /// Component predictions retained for an unresolved occurrence.
    pub fn pending(&self, branch: BranchTag) -> Option<ComponentGuess> {
        self.ledger.pending(branch)
    }

    /// Per-component accuracy counters.
    pub const fn component_stats(&self) -> ComponentStats {
        self.stats
    }

    /// The 1-bit component, with its own prediction counts.
    pub const fn one_bit(&self) -> &OneBitPredictor {
        &self.one_bit
    }

    /// The 2-bit component, with its own prediction counts.
    pub const fn two_bit(&self) -> &TwoBitPredictor {
        &self.two_bit
    }

    /// Asks both components about `branch` and applies the chooser.
    ///
    /// The components hold their answers per tag, so asking again for an
    /// unresolved occurrence repeats them.
    fn query(&mut self, branch: BranchTag) -> ComponentGuess {
        let one_bit = self.one_bit.predict(branch);
        let two_bit = self.two_bit.predict(branch);
        let taken = if self.prefers_two_bit(branch.pc) {
            two_bit
        } else {
            one_bit
        };
        ComponentGuess {
            one_bit,
            two_bit,
            taken,
        }
    }
}

impl BranchPredictor for TournamentPredictor {
    /// Queries both components, retains their answers, and returns the one
    /// the chooser selects.
    fn predict(&mut self, branch: BranchTag) -> bool {
        let guess = self.query(branch);
        self.ledger.record(branch, || guess).taken
    }

    /// Trains the chooser on the component predictions retained for this
    /// occurrence, then both components on the real outcome.
    ///
    /// The chooser moves only when exactly one component was right.
    fn update(&mut self, branch: BranchTag, taken: bool) {
        let fresh = self.query(branch);
        let guess = self.ledger.settle(branch, taken, || fresh);
        let pc = branch.pc;

        let one_bit_correct = guess.one_bit == taken;
        let two_bit_correct = guess.two_bit == taken;

        self.stats.resolved += 1;
        self.stats.one_bit_correct += u64::from(one_bit_correct);
        self.stats.two_bit_correct += u64::from(two_bit_correct);

        if one_bit_correct != two_bit_correct {
            let choice = self.chooser.entry(pc).or_insert(CHOOSER_INIT);
            *choice = two_bit::saturate(*choice, two_bit_correct);
        }

        self.one_bit.update(branch, taken);
        self.two_bit.update(branch, taken);
    }

    fn withdraw(&mut self, branch: BranchTag) {
        let _ = self.ledger.withdraw(branch);
        self.one_bit.withdraw(branch);
        self.two_bit.withdraw(branch);
    }

    fn stats(&self) -> PredictorStats {
        self.ledger.stats()
    }

    fn name(&self) -> &'static str {
        "Tournament"
    }
}
