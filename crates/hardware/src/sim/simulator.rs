//! Simulator: drives a pipeline to completion under a cycle ceiling.
//!
//! The pipeline itself has no notion of when to stop beyond HALT reaching
//! writeback. The driver adds the second termination condition, the cycle
//! ceiling, and hands every cycle's snapshot to a caller-supplied sink.

use std::convert::Infallible;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::pipeline::{CycleRecord, Pipeline};
use crate::core::units::bru::BranchPredictor;
use crate::isa::Program;
use crate::stats::{Metrics, MetricsSummary};

/// Outcome of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Final metrics with derived ratios.
    #[serde(flatten)]
    pub summary: MetricsSummary,
    /// `true` if HALT reached writeback; `false` if the ceiling stopped the run.
    pub halted: bool,
    /// Whether operand forwarding was enabled.
    pub forwarding: bool,
    /// Name of the attached predictor, if any.
    pub predictor: Option<&'static str>,
}

impl RunSummary {
    /// Raw counters of the run.
    pub const fn metrics(&self) -> &Metrics {
        &self.summary.metrics
    }
}

impl fmt::Display for RunSummary {
    /// One-line report: cycles, CPI, stalls, forwarding and predictor accuracy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.metrics();
        write!(
            f,
            "Cycles={} Retired={} CPI={:.4} StallsRAW={} StallsCTRL={} TotalStalls={} \
             Forwarding={} Predictor={} BP_Acc={:.2}% (Pred={}, Mispred={})",
            m.cycles,
            m.retired,
            self.summary.cpi,
            m.stalls.raw,
            m.stalls.control,
            self.summary.stalls_total,
            if self.forwarding { "ON" } else { "OFF" },
            self.predictor.unwrap_or("none"),
            self.summary.bp_accuracy_pct,
            m.bp_predictions,
            m.bp_mispredictions,
        )
    }
}

/// Top-level driver: a pipeline plus the cycle ceiling.
#[derive(Debug)]
pub struct Simulator<'a> {
    /// The engine being driven.
    pub pipeline: Pipeline<'a>,
    max_cycles: u64,
}

impl<'a> Simulator<'a> {
    /// Wraps an existing pipeline.
    pub fn new(pipeline: Pipeline<'a>, max_cycles: u64) -> Self {
        Self {
            pipeline,
            max_cycles,
        }
    }

    /// Builds a pipeline for `program` from a configuration.
    ///
    /// The predictor is borrowed; build one with
    /// [`BranchPredictorWrapper::new`](crate::core::units::bru::BranchPredictorWrapper::new)
    /// from `config.pipeline.branch_predictor` to honour the configured strategy.
    pub fn from_config(
        program: &'a Program,
        config: &Config,
        predictor: Option<&'a mut dyn BranchPredictor>,
    ) -> Self {
        let pipeline = Pipeline::new(program, config.pipeline.forwarding, predictor);
        Self::new(pipeline, config.general.max_cycles)
    }

    /// Cycle ceiling for this run.
    pub const fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    /// Returns `true` once the run is over: halted, or the ceiling reached.
    pub const fn finished(&self) -> bool {
        self.pipeline.halted() || self.pipeline.cycle() >= self.max_cycles
    }

    /// Advances one cycle unless the run is already over.
    pub fn step(&mut self) -> Option<CycleRecord> {
        if self.finished() {
            return None;
        }
        self.pipeline.step()
    }

    /// Runs to completion, passing every cycle record to `sink`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error produced by `sink`; the pipeline
    /// is left consistent and the run can be resumed.
    pub fn run<E>(
        &mut self,
        mut sink: impl FnMut(&CycleRecord) -> Result<(), E>,
    ) -> Result<RunSummary, E> {
        while let Some(record) = self.step() {
            sink(&record)?;
        }

        let summary = self.summary();
        if let Some(bp) = self.pipeline.predictor_stats() {
            debug!(
                predictions = bp.predictions,
                mispredictions = bp.mispredictions,
                accuracy = bp.accuracy(),
                "predictor counts"
            );
        }
        if summary.halted {
            debug!(cycles = summary.metrics().cycles, "run halted");
        } else {
            info!(
                max_cycles = self.max_cycles,
                "cycle ceiling reached before HALT"
            );
        }
        Ok(summary)
    }

    /// Runs to completion, discarding the per-cycle records.
    pub fn run_to_end(&mut self) -> RunSummary {
        match self.run(|_| Ok::<(), Infallible>(())) {
            Ok(summary) => summary,
            Err(never) => match never {},
        }
    }

    /// Snapshot of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            summary: self.pipeline.metrics().summary(),
            halted: self.pipeline.halted(),
            forwarding: self.pipeline.forwarding(),
            predictor: self.pipeline.predictor_name(),
        }
    }
}
