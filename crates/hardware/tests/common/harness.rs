//! Run harness.
//!
//! Runs a program to completion (HALT or the cycle ceiling) with a freshly
//! built predictor and keeps every cycle record for inspection.

use pipesim_core::config::BranchPredictorKind;
use pipesim_core::core::pipeline::{CycleRecord, Pipeline};
use pipesim_core::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use pipesim_core::isa::Program;
use pipesim_core::sim::{RunSummary, Simulator};
use pipesim_core::stats::Metrics;

/// Cycle ceiling used when a test does not care.
pub const TEST_MAX_CYCLES: u64 = 500;

/// A finished run.
#[derive(Debug)]
pub struct RunResult {
    /// Final summary.
    pub summary: RunSummary,
    /// Every cycle record, in order.
    pub records: Vec<CycleRecord>,
}

impl RunResult {
    /// Raw counters.
    pub fn metrics(&self) -> Metrics {
        *self.summary.metrics()
    }

    /// The timeline rendered the same way as the CSV cells, one row per cycle.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| r.stages().iter().map(ToString::to_string).collect())
            .collect()
    }
}

/// Installs a test log subscriber once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("pipesim_core=debug")
        .try_init();
}

/// Runs `program` with a new predictor of `kind` (or none).
pub fn run(
    program: &Program,
    forwarding: bool,
    kind: Option<BranchPredictorKind>,
    max_cycles: u64,
) -> RunResult {
    init_logging();
    let mut wrapper = kind.map(BranchPredictorWrapper::new);
    let predictor = wrapper
        .as_mut()
        .map(|bp| bp as &mut dyn BranchPredictor);
    let mut sim = Simulator::new(Pipeline::new(program, forwarding, predictor), max_cycles);

    let mut records = Vec::new();
    let summary = sim.run(|record| {
        records.push(*record);
        Ok::<(), std::convert::Infallible>(())
    });
    let summary = match summary {
        Ok(summary) => summary,
        Err(never) => match never {},
    };
    RunResult { summary, records }
}

/// Runs with forwarding on, no predictor and the default test ceiling.
pub fn run_default(program: &Program) -> RunResult {
    run(program, true, None, TEST_MAX_CYCLES)
}

/// Runs with the given predictor and forwarding on.
pub fn run_with(program: &Program, kind: BranchPredictorKind, max_cycles: u64) -> RunResult {
    run(program, true, Some(kind), max_cycles)
}
