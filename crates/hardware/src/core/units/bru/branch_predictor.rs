//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that all direction
//! predictors implement. The pipeline engine borrows a predictor for the length
//! of a run and drives it with exactly one `predict`/`update` pair per dynamic
//! branch occurrence, or `predict`/`withdraw` if the occurrence was fetched
//! down a wrong path and squashed before resolving.

/// One dynamic occurrence of a branch.
///
/// Tables are indexed by `pc`; bookkeeping for an unresolved prediction is
/// keyed by the whole tag, so two in-flight instances of the same static
/// branch never share a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchTag {
    /// Program position of the branch instruction.
    pub pc: usize,
    /// Issue number that distinguishes instances of the same `pc`.
    pub seq: u64,
}

impl BranchTag {
    /// Tags occurrence `seq` of the branch at `pc`.
    pub const fn new(pc: usize, seq: u64) -> Self {
        Self { pc, seq }
    }

    /// Tags a branch at `pc` when only one instance is ever in flight.
    pub const fn at(pc: usize) -> Self {
        Self::new(pc, 0)
    }
}

/// Prediction counters kept by every predictor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictorStats {
    /// Distinct occurrences predicted, less the ones withdrawn.
    pub predictions: u64,
    /// Resolved occurrences whose prediction was wrong.
    pub mispredictions: u64,
}

impl PredictorStats {
    /// Share of predictions that were right, in percent (0 before any).
    pub fn accuracy(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            let correct = self.predictions.saturating_sub(self.mispredictions);
            100.0 * correct as f64 / self.predictions as f64
        }
    }
}

/// Trait for branch direction prediction algorithms.
///
/// Implementations keep per-PC state that persists across cycles and across
/// runs for as long as the instance lives. The caller owns the predictor; the
/// engine only borrows it, so one instance can be reused or swapped between
/// runs for comparison.
pub trait BranchPredictor {
    /// Predicts whether `branch` will be taken and counts the prediction.
    ///
    /// Calling `predict` again for the same unresolved tag returns the
    /// recorded answer and counts nothing.
    ///
    /// # Arguments
    ///
    /// * `branch` - Occurrence being predicted
    fn predict(&mut self, branch: BranchTag) -> bool;

    /// Trains the predictor with the resolved outcome of `branch`.
    ///
    /// Called once per resolved occurrence with the tag of its
    /// [`predict`](Self::predict) call. An occurrence that was never predicted
    /// is predicted first, so it is still counted and scored.
    ///
    /// # Arguments
    ///
    /// * `branch` - Occurrence that resolved
    /// * `taken` - Whether the branch was actually taken
    fn update(&mut self, branch: BranchTag, taken: bool);

    /// Forgets the unresolved prediction for `branch` without training.
    ///
    /// Used for wrong-path occurrences squashed before they resolve. The
    /// prediction no longer counts. Unknown tags are ignored.
    fn withdraw(&mut self, branch: BranchTag);

    /// Prediction and misprediction counts so far.
    fn stats(&self) -> PredictorStats;

    /// Human-readable name used in reports.
    fn name(&self) -> &'static str;
}

impl<P: BranchPredictor + ?Sized> BranchPredictor for Box<P> {
    fn predict(&mut self, branch: BranchTag) -> bool {
        (**self).predict(branch)
    }

    fn update(&mut self, branch: BranchTag, taken: bool) {
        (**self).update(branch, taken);
    }

    fn withdraw(&mut self, branch: BranchTag) {
        (**self).withdraw(branch);
    }

    fn stats(&self) -> PredictorStats {
        (**self).stats()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
