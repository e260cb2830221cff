//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the direction predictors the pipeline can be driven
//! with: static (always-taken / always-not-taken), 1-bit history, 2-bit
//! saturating counter, and a tournament of the 1-bit and 2-bit predictors. It
//! also holds the oracle that supplies ground-truth outcomes at resolution.

pub use self::branch_predictor::{BranchPredictor, BranchTag, PredictorStats};
pub use self::oracle::{BranchOracle, SignOfImmediate};

/// Branch predictor trait.
pub mod branch_predictor;

/// Per-occurrence bookkeeping of unresolved predictions.
pub mod ledger;

/// 1-bit last-outcome predictor.
pub mod one_bit;

/// Ground-truth branch outcome oracles.
pub mod oracle;

/// Static branch predictor (fixed direction).
pub mod static_bp;

/// Tournament predictor (chooser over 1-bit and 2-bit components).
pub mod tournament;

/// 2-bit saturating counter predictor.
pub mod two_bit;

use self::{
    one_bit::OneBitPredictor, static_bp::StaticPredictor, tournament::TournamentPredictor,
    two_bit::TwoBitPredictor,
};
use crate::config::BranchPredictorKind;

/// Enum wrapper for static dispatch of Branch Predictors.
///
/// This is what the driver builds from a [`BranchPredictorKind`]; the engine
/// itself accepts any `BranchPredictor` by reference.
#[derive(Debug, Clone)]
pub enum BranchPredictorWrapper {
    /// Fixed-direction predictor.
    Static(StaticPredictor),
    /// Per-PC last outcome.
    OneBit(OneBitPredictor),
    /// Per-PC saturating counter.
    TwoBit(TwoBitPredictor),
    /// Chooser over 1-bit and 2-bit components.
    Tournament(TournamentPredictor),
}

impl BranchPredictorWrapper {
    /// Creates a fresh predictor of the requested kind.
    pub fn new(kind: BranchPredictorKind) -> Self {
        match kind {
            BranchPredictorKind::StaticNotTaken => Self::Static(StaticPredictor::not_taken()),
            BranchPredictorKind::StaticTaken => Self::Static(StaticPredictor::taken()),
            BranchPredictorKind::OneBit => Self::OneBit(OneBitPredictor::new()),
            BranchPredictorKind::TwoBit => Self::TwoBit(TwoBitPredictor::new()),
            BranchPredictorKind::Tournament => Self::Tournament(TournamentPredictor::new()),
        }
    }

    /// Creates a predictor from a command-line name.
    ///
    /// Unrecognized names resolve to the always-not-taken predictor.
    pub fn from_name(name: &str) -> Self {
        Self::new(BranchPredictorKind::from_name(name))
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline]
    fn predict(&mut self, branch: BranchTag) -> bool {
        match self {
            Self::Static(bp) => bp.predict(branch),
            Self::OneBit(bp) => bp.predict(branch),
            Self::TwoBit(bp) => bp.predict(branch),
            Self::Tournament(bp) => bp.predict(branch),
        }
    }

    #[inline]
    fn update(&mut self, branch: BranchTag, taken: bool) {
        match self {
            Self::Static(bp) => bp.update(branch, taken),
            Self::OneBit(bp) => bp.update(branch, taken),
            Self::TwoBit(bp) => bp.update(branch, taken),
            Self::Tournament(bp) => bp.update(branch, taken),
        }
    }

    fn withdraw(&mut self, branch: BranchTag) {
        match self {
            Self::Static(bp) => bp.withdraw(branch),
            Self::OneBit(bp) => bp.withdraw(branch),
            Self::TwoBit(bp) => bp.withdraw(branch),
            Self::Tournament(bp) => bp.withdraw(branch),
        }
    }

    fn stats(&self) -> PredictorStats {
        match self {
            Self::Static(bp) => bp.stats(),
            Self::OneBit(bp) => bp.stats(),
            Self::TwoBit(bp) => bp.stats(),
            Self::Tournament(bp) => bp.stats(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Static(bp) => bp.name(),
            Self::OneBit(bp) => bp.name(),
            Self::TwoBit(bp) => bp.name(),
            Self::Tournament(bp) => bp.name(),
        }
    }
}
