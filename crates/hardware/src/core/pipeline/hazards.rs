//! Data Hazard Detection.
//!
//! This module decides, once per cycle, whether the instruction in ID must be
//! held back because an older instruction still in flight has not made its
//! result available. It provides:
//! 1. **Dependency test:** producer/consumer matching on register ports.
//! 2. **Forwarding off:** any producer in EX, MEM or WB forces a stall.
//! 3. **Forwarding on:** only the load-use case (LOAD in EX) forces a stall.
//!
//! Only read-after-write hazards exist here. With a single-issue, in-order
//! pipeline that writes each result back at most once, a later instruction can
//! never overwrite a register before an earlier one reads it (WAR) or
//! reorder two writes to the same register (WAW).

use serde::Serialize;

use crate::core::pipeline::latches::{Latch, Latches};
use crate::isa::{Instruction, Opcode};

/// Kind of hazard that caused a stall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum HazardKind {
    /// No hazard.
    #[default]
    None,
    /// Read-after-write.
    Raw,
}

/// Stall decision for the ID stage, produced fresh every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardDecision {
    /// Hold IF/ID and insert a bubble into ID/EX.
    pub stall: bool,
    /// Why the stall is needed.
    pub kind: HazardKind,
}

impl HazardDecision {
    /// No stall.
    pub const CLEAR: Self = Self {
        stall: false,
        kind: HazardKind::None,
    };

    /// Stall on a read-after-write dependency.
    pub const RAW: Self = Self {
        stall: true,
        kind: HazardKind::Raw,
    };
}

/// Returns `true` if `consumer` reads the register `producer` writes.
///
/// Instructions without a destination (STORE, branches, NOP, HALT) are never
/// producers.
pub fn depends_on(consumer: &Instruction, producer: &Instruction) -> bool {
    producer.dest().is_some_and(|rd| consumer.reads(rd))
}

/// Checks the instruction in ID against the producers ahead of it.
///
/// # Arguments
///
/// * `id` - IF/ID latch (the consumer being decoded).
/// * `ex` - ID/EX latch (instruction in EX).
/// * `mem` - EX/MEM latch (instruction in MEM).
/// * `wb` - MEM/WB latch (instruction in WB).
/// * `forwarding` - Whether EX/MEM and MEM/WB results can bypass to ID.
///
/// # Returns
///
/// [`HazardDecision::RAW`] if ID must stall this cycle, otherwise
/// [`HazardDecision::CLEAR`].
///
/// # Examples
///
/// ```
/// use pipesim_core::core::pipeline::hazards::{detect_hazard, HazardDecision};
/// use pipesim_core::core::pipeline::latches::Latch;
/// use pipesim_core::isa::Instruction;
///
/// // LOAD r1 in EX, ADD r3 r1 r4 in ID: the load-use case stalls even with forwarding.
/// let id = Latch::Valid(Instruction::add(3, 1, 4));
/// let ex = Latch::Valid(Instruction::load(1, 2, 0));
/// let decision = detect_hazard(&id, &ex, &Latch::Empty, &Latch::Empty, true);
/// assert_eq!(decision, HazardDecision::RAW);
/// ```
pub fn detect_hazard(
    id: &Latch,
    ex: &Latch,
    mem: &Latch,
    wb: &Latch,
    forwarding: bool,
) -> HazardDecision {
    let Some(consumer) = id.instruction() else {
        return HazardDecision::CLEAR;
    };

    let blocks = |latch: &Latch| {
        latch
            .instruction()
            .is_some_and(|producer| depends_on(consumer, producer))
    };

    let stall = if forwarding {
        // Everything except a load still in EX can be bypassed.
        ex.holds(Opcode::Load) && blocks(ex)
    } else {
        blocks(ex) || blocks(mem) || blocks(wb)
    };

    if stall {
        HazardDecision::RAW
    } else {
        HazardDecision::CLEAR
    }
}

/// [`detect_hazard`] over the current latch set.
pub fn detect_hazard_for_id(latches: &Latches, forwarding: bool) -> HazardDecision {
    detect_hazard(
        &latches.if_id,
        &latches.id_ex,
        &latches.ex_mem,
        &latches.mem_wb,
        forwarding,
    )
}
