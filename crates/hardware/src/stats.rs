//! Simulation statistics collection and reporting.
//!
//! This module tracks the performance metrics of a pipeline run. It provides:
//! 1. **Cycles and CPI:** Total cycles, retired instructions, and derived CPI.
//! 2. **Stalls:** Stall cycles partitioned by cause (RAW data hazards, control flushes).
//! 3. **Branch prediction:** Resolved predictions, mispredictions, and accuracy.
//!
//! Invariants maintained by the engine: `cycles >= retired` (a cycle retires at
//! most one instruction) and `stalls.total() <= cycles`.

use std::fmt::{self, Write as _};

use serde::Serialize;

/// Stall cycles partitioned by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StallBreakdown {
    /// Cycles ID was held by a read-after-write hazard.
    pub raw: u64,
    /// Cycles spent flushing after a branch misprediction.
    pub control: u64,
}

impl StallBreakdown {
    /// Total stall cycles.
    pub const fn total(&self) -> u64 {
        self.raw + self.control
    }
}

/// Cumulative metrics for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions that reached WB, excluding NOP and HALT.
    pub retired: u64,
    /// Branches resolved against a prediction.
    pub bp_predictions: u64,
    /// Resolved branches whose prediction was wrong.
    pub bp_mispredictions: u64,
    /// Stall cycles by cause.
    pub stalls: StallBreakdown,
}

/// Section names for selective report output.
///
/// Pass an empty slice to [`Metrics::render_sections`] to render all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "stalls", "branch"];

impl Metrics {
    /// Cycles per retired instruction, or 0 if nothing has retired.
    pub fn cpi(&self) -> f64 {
        if self.retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.retired as f64
        }
    }

    /// Percentage of resolved branches that were predicted correctly, or 0 if
    /// no branch has resolved.
    pub fn bp_accuracy_pct(&self) -> f64 {
        if self.bp_predictions == 0 {
            0.0
        } else {
            let correct = self.bp_predictions - self.bp_mispredictions;
            100.0 * correct as f64 / self.bp_predictions as f64
        }
    }

    /// Raw counters plus derived ratios, for machine-readable export.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            metrics: *self,
            stalls_total: self.stalls.total(),
            cpi: self.cpi(),
            bp_accuracy_pct: self.bp_accuracy_pct(),
        }
    }

    /// Renders the requested report sections.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"stalls"` or
    /// `"branch"`. Pass an empty slice to render every section.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "==========================================================");
        let _ = writeln!(out, "PIPELINE SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================================");
        if want("summary") {
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_insts                {}", self.retired);
            let _ = writeln!(out, "sim_cpi                  {:.4}", self.cpi());
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("stalls") {
            let _ = writeln!(out, "STALL BREAKDOWN");
            let _ = writeln!(
                out,
                "  stalls.raw             {} ({:.2}%)",
                self.stalls.raw,
                self.stalls.raw as f64 / cyc * 100.0
            );
            let _ = writeln!(
                out,
                "  stalls.control         {} ({:.2}%)",
                self.stalls.control,
                self.stalls.control as f64 / cyc * 100.0
            );
            let _ = writeln!(out, "  stalls.total           {}", self.stalls.total());
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("branch") {
            let _ = writeln!(out, "BRANCH PREDICTION");
            let _ = writeln!(out, "  bp.lookups             {}", self.bp_predictions);
            let _ = writeln!(out, "  bp.mispredicts         {}", self.bp_mispredictions);
            let _ = writeln!(out, "  bp.accuracy            {:.2}%", self.bp_accuracy_pct());
        }
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Prints all report sections to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for Metrics {
    /// The full sectioned report, as printed by [`Metrics::print`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_sections(&[]))
    }
}

/// [`Metrics`] with its derived ratios, as exported to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Raw counters.
    #[serde(flatten)]
    pub metrics: Metrics,
    /// `stalls.raw + stalls.control`.
    pub stalls_total: u64,
    /// Cycles per retired instruction.
    pub cpi: f64,
    /// Branch prediction accuracy in percent.
    pub bp_accuracy_pct: f64,
}
