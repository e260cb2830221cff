//! Outstanding-prediction bookkeeping shared by every predictor.
//!
//! A predictor answers for an occurrence once; the answer is held here until
//! the occurrence resolves or is withdrawn, and the counts behind
//! [`PredictorStats`] follow from those transitions.

use std::collections::HashMap;

use super::{BranchTag, PredictorStats};

/// What a predictor holds for an unresolved occurrence.
///
/// A plain direction for single-table predictors, the component answers for
/// the tournament.
pub trait Guess: Copy {
    /// Direction the predictor returned.
    fn taken(&self) -> bool;
}

impl Guess for bool {
    fn taken(&self) -> bool {
        *self
    }
}

/// Guesses awaiting resolution plus the running counts.
#[derive(Debug, Clone)]
pub struct PredictionLedger<G> {
    pending: HashMap<BranchTag, G>,
    stats: PredictorStats,
}

impl<G> Default for PredictionLedger<G> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            stats: PredictorStats::default(),
        }
    }
}

impl<G: Guess> PredictionLedger<G> {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the guess held for `tag`, or records and counts a fresh one.
    pub fn record(&mut self, tag: BranchTag, guess: impl FnOnce() -> G) -> G {
        if let Some(&held) = self.pending.get(&tag) {
            return held;
        }
        let fresh = guess();
        let _ = self.pending.insert(tag, fresh);
        self.stats.predictions += 1;
        fresh
    }

    /// Removes the guess for `tag` and scores it against the outcome.
    ///
    /// An unknown tag is recorded from `guess` first.
    pub fn settle(&mut self, tag: BranchTag, taken: bool, guess: impl FnOnce() -> G) -> G {
        let held = self.record(tag, guess);
        let _ = self.pending.remove(&tag);
        if held.taken() != taken {
            self.stats.mispredictions += 1;
        }
        held
    }

    /// Drops the guess for `tag` and uncounts it.
    pub fn withdraw(&mut self, tag: BranchTag) -> Option<G> {
        let held = self.pending.remove(&tag)?;
        self.stats.predictions -= 1;
        Some(held)
    }

    /// Guess held for an unresolved `tag`.
    pub fn pending(&self, tag: BranchTag) -> Option<G> {
        self.pending.get(&tag).copied()
    }

    /// Number of unresolved guesses.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Counts so far.
    pub const fn stats(&self) -> PredictorStats {
        self.stats
    }
}
