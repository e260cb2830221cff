//! Pipeline engine: the per-cycle state machine.
//!
//! The engine owns the four inter-stage latches, the fetch program counter and
//! the run's metrics. It borrows the program and (optionally) a branch
//! predictor from the caller; the predictor must outlive the engine and keeps
//! its per-PC state after the engine is dropped.
//!
//! Every call to [`Pipeline::step`] performs, in this order:
//! 1. **Retire:** snapshot MEM/WB; a valid HALT halts the machine, anything
//!    else but NOP counts as retired.
//! 2. **Hazard check:** evaluate the instruction in ID against the current
//!    (pre-shift) EX, MEM and WB latches.
//! 3. **Shift:** MEM→WB, EX→MEM, ID→EX; IF/ID holds pending the fetch decision.
//! 4. **Arbitration:** an active control flush beats a data stall, which beats
//!    a normal advance. A normal advance of a branch out of ID queries the
//!    predictor and steers fetch to the predicted path.
//! 5. **Fetch:** load the chosen address into IF/ID, or an empty slot if it is
//!    out of range or the machine has halted.
//! 6. **Resolve:** the branch that was in EX before the shift is checked
//!    against the oracle; a misprediction squashes the wrong-path slots,
//!    withdraws any prediction made for them, redirects the PC and arms a
//!    two-cycle flush.
//! 7. **Commit:** all latches update at once and the cycle counter advances.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::core::pipeline::hazards::detect_hazard_for_id;
use crate::core::pipeline::latches::{BubbleCause, CycleRecord, Latch, Latches};
use crate::core::units::bru::{
    BranchOracle, BranchPredictor, BranchTag, PredictorStats, SignOfImmediate,
};
use crate::isa::{Instruction, Opcode, Program};
use crate::stats::Metrics;

/// Bubbles inserted into ID/EX after a branch misprediction.
pub const CONTROL_FLUSH_CYCLES: u8 = 2;

/// Oracle used when the caller does not supply one.
static DEFAULT_ORACLE: SignOfImmediate = SignOfImmediate;

/// A predictor's answer for one in-flight branch.
#[derive(Debug, Clone, Copy)]
struct Prediction {
    tag: BranchTag,
    taken: bool,
}

/// In-order 5-stage pipeline.
pub struct Pipeline<'a> {
    /// Instructions to fetch from, owned by the caller.
    program: &'a Program,
    /// Bypass results to ID instead of waiting for writeback.
    forwarding: bool,
    /// Borrowed direction predictor.
    predictor: Option<&'a mut dyn BranchPredictor>,
    /// Ground truth for branch resolution.
    oracle: &'a dyn BranchOracle,

    /// Inter-stage latches.
    latches: Latches,
    /// Next fetch address. Signed: a branch target may lie before the program.
    pc: i64,
    /// Cycles stepped.
    cycle: u64,
    /// Set once HALT reaches writeback.
    halted: bool,
    /// Remaining flush cycles after a misprediction.
    control_flush: u8,
    /// Prediction for each in-flight branch, keyed by instruction id.
    predictions: HashMap<u64, Prediction>,
    /// Sequence number for the next predicted occurrence.
    branch_seq: u64,

    metrics: Metrics,
}

impl<'a> Pipeline<'a> {
    /// Creates an engine in its initial state: all latches empty, PC at 0.
    ///
    /// # Arguments
    ///
    /// * `program` - Instructions to run.
    /// * `forwarding` - Enable EX/MEM and MEM/WB bypassing.
    /// * `predictor` - Predictor to consult for branches in ID. With `None`,
    ///   fetch always falls through and every branch resolves as if predicted
    ///   not-taken.
    pub fn new(
        program: &'a Program,
        forwarding: bool,
        predictor: Option<&'a mut dyn BranchPredictor>,
    ) -> Self {
        Self {
            program,
            forwarding,
            predictor,
            oracle: &DEFAULT_ORACLE,
            latches: Latches::default(),
            pc: 0,
            cycle: 0,
            halted: false,
            control_flush: 0,
            predictions: HashMap::new(),
            branch_seq: 0,
            metrics: Metrics::default(),
        }
    }

    /// Replaces the ground-truth oracle (taken iff the immediate is negative).
    #[must_use]
    pub fn with_oracle(mut self, oracle: &'a dyn BranchOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Advances the pipeline by one cycle.
    ///
    /// # Returns
    ///
    /// The cycle's stage snapshot, or `None` if the machine had already
    /// halted (a halted engine does not change state).
    pub fn step(&mut self) -> Option<CycleRecord> {
        if self.halted {
            return None;
        }

        let retired = self.latches.mem_wb;
        if let Some(inst) = retired.instruction() {
            if inst.op == Opcode::Halt {
                debug!(cycle = self.cycle + 1, id = inst.id, "HALT reached writeback");
                self.halted = true;
            } else if inst.op.retires() {
                self.metrics.retired += 1;
            }
        }

        let hazard = detect_hazard_for_id(&self.latches, self.forwarding);

        // Claim the record of the branch resolving in EX before ID can predict
        // a younger instance of the same static branch under the same id.
        let resolving = self
            .latches
            .id_ex
            .branch()
            .copied()
            .map(|branch| (branch, self.predictions.remove(&branch.id)));

        let mut next = Latches {
            if_id: self.latches.if_id,
            id_ex: self.latches.if_id,
            ex_mem: self.latches.id_ex,
            mem_wb: self.latches.ex_mem,
        };

        let mut fetch_addr = None;
        let advanced = if self.control_flush > 0 {
            next.id_ex = Latch::Bubble(BubbleCause::ControlFlush);
            self.control_flush -= 1;
            self.metrics.stalls.control += 1;
            false
        } else if hazard.stall {
            trace!(cycle = self.cycle + 1, kind = ?hazard.kind, "ID stalled");
            next.id_ex = Latch::Bubble(BubbleCause::DataStall);
            self.metrics.stalls.raw += 1;
            false
        } else {
            fetch_addr = Some(self.next_fetch_addr());
            true
        };

        if let Some(addr) = fetch_addr {
            next.if_id = self.fetch(addr);
        }

        if let Some((branch, recorded)) = resolving {
            if self.resolve(&branch, recorded) {
                next.if_id = Latch::Bubble(BubbleCause::ControlFlush);
                if advanced {
                    // The instruction that just left ID was fetched down the
                    // wrong path too.
                    if let Some(squashed) = next.id_ex.instruction() {
                        self.withdraw(squashed.id);
                    }
                    next.id_ex = Latch::Bubble(BubbleCause::ControlFlush);
                }
            }
        }

        self.latches = next;
        self.cycle += 1;
        self.metrics.cycles += 1;

        debug_assert!(self.metrics.cycles >= self.metrics.retired);
        debug_assert!(self.metrics.stalls.total() <= self.metrics.cycles);
        debug_assert!(self.metrics.bp_mispredictions <= self.metrics.bp_predictions);

        Some(CycleRecord {
            cycle: self.cycle,
            fetch: self.latches.if_id.slot(),
            decode: self.latches.id_ex.slot(),
            execute: self.latches.ex_mem.slot(),
            memory: self.latches.mem_wb.slot(),
            writeback: retired.slot(),
        })
    }

    /// Chooses where to fetch on a normal advance.
    ///
    /// A branch leaving ID is predicted here under a fresh tag, and the
    /// guess is recorded under its instruction id so repeated executions of
    /// the same static branch never share a record.
    fn next_fetch_addr(&mut self) -> i64 {
        let Some(branch) = self.latches.if_id.branch().copied() else {
            return self.pc;
        };
        let Some(predictor) = self.predictor.as_deref_mut() else {
            return self.pc;
        };

        let tag = BranchTag::new(branch.pc, self.branch_seq);
        self.branch_seq += 1;
        let taken = predictor.predict(tag);
        let _ = self.predictions.insert(branch.id, Prediction { tag, taken });
        trace!(id = branch.id, pc = branch.pc, seq = tag.seq, taken, "branch predicted");

        if taken {
            branch.branch_target()
        } else {
            branch.fall_through()
        }
    }

    /// Fetches from `addr`, leaving the PC at the next sequential address.
    ///
    /// Out-of-range addresses and a halted machine yield an empty slot, which
    /// lets the instructions already in flight drain.
    fn fetch(&mut self, addr: i64) -> Latch {
        if self.halted {
            return Latch::Empty;
        }
        match self.program.fetch(addr) {
            Some(inst) => {
                trace!(cycle = self.cycle + 1, addr, id = inst.id, "fetched");
                self.pc = addr + 1;
                Latch::Valid(*inst)
            }
            None => {
                self.pc = addr;
                Latch::Empty
            }
        }
    }

    /// Resolves a branch in EX, returning `true` on a misprediction.
    ///
    /// A branch with no recorded prediction is treated as predicted not-taken.
    fn resolve(&mut self, branch: &Instruction, recorded: Option<Prediction>) -> bool {
        let actual = self.oracle.resolve(branch);
        debug_assert!(
            recorded.is_some() || self.predictor.is_none(),
            "branch #{} reached EX without a prediction",
            branch.id
        );
        let predicted = recorded.is_some_and(|p| p.taken);

        self.metrics.bp_predictions += 1;
        let mispredicted = predicted != actual;
        if mispredicted {
            self.metrics.bp_mispredictions += 1;
            self.control_flush = CONTROL_FLUSH_CYCLES;
            self.pc = if actual {
                branch.branch_target()
            } else {
                branch.fall_through()
            };
            debug!(
                cycle = self.cycle + 1,
                id = branch.id,
                pc = branch.pc,
                predicted,
                actual,
                redirect = self.pc,
                "branch mispredicted"
            );
        }

        if let (Some(predictor), Some(recorded)) = (self.predictor.as_deref_mut(), recorded) {
            predictor.update(recorded.tag, actual);
        }
        mispredicted
    }

    /// Drops the record of a squashed instruction and, if it was a predicted
    /// branch, withdraws the prediction.
    fn withdraw(&mut self, id: u64) {
        let Some(squashed) = self.predictions.remove(&id) else {
            return;
        };
        trace!(id, pc = squashed.tag.pc, seq = squashed.tag.seq, "prediction withdrawn");
        if let Some(predictor) = self.predictor.as_deref_mut() {
            predictor.withdraw(squashed.tag);
        }
    }

    /// Returns `true` once HALT has reached writeback.
    pub const fn halted(&self) -> bool {
        self.halted
    }

    /// Cycles stepped so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Next fetch address.
    pub const fn pc(&self) -> i64 {
        self.pc
    }

    /// Whether operand forwarding is enabled.
    pub const fn forwarding(&self) -> bool {
        self.forwarding
    }

    /// Current latch contents.
    pub const fn latches(&self) -> &Latches {
        &self.latches
    }

    /// Flush cycles still to be inserted.
    pub const fn flush_pending(&self) -> u8 {
        self.control_flush
    }

    /// Number of predicted branches that have not resolved yet.
    pub fn in_flight_predictions(&self) -> usize {
        self.predictions.len()
    }

    /// Name of the attached predictor.
    pub fn predictor_name(&self) -> Option<&'static str> {
        self.predictor.as_deref().map(|bp| bp.name())
    }

    /// Counts kept by the attached predictor.
    pub fn predictor_stats(&self) -> Option<PredictorStats> {
        self.predictor.as_deref().map(|bp| bp.stats())
    }

    /// Metrics accumulated so far.
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The program being executed.
    pub const fn program(&self) -> &'a Program {
        self.program
    }
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("program_len", &self.program.len())
            .field("forwarding", &self.forwarding)
            .field("predictor", &self.predictor_name())
            .field("latches", &self.latches)
            .field("pc", &self.pc)
            .field("cycle", &self.cycle)
            .field("halted", &self.halted)
            .field("control_flush", &self.control_flush)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
