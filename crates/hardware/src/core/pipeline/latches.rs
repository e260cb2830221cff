//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the state carried between the five stages:
//! Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Latches:** One single-entry latch per stage boundary; there is no
//!    queueing within a stage.
//! 2. **Bubbles:** Invalid latch contents record why they are empty so the
//!    timeline can tell a hazard stall from a control flush.
//! 3. **Snapshots:** Per-cycle views of every stage for the timeline.

use std::fmt;

use serde::Serialize;

use crate::isa::{Instruction, Opcode};

/// Why a latch holds a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleCause {
    /// Inserted into ID/EX while a RAW hazard holds the instruction in ID.
    DataStall,
    /// Inserted or left behind while recovering from a branch misprediction.
    ControlFlush,
}

impl BubbleCause {
    /// Short label used in the timeline.
    pub const fn label(self) -> &'static str {
        match self {
            Self::DataStall => "stall",
            Self::ControlFlush => "flush",
        }
    }
}

/// Contents of one stage-boundary latch.
///
/// Only `Valid` carries an instruction; `Empty` and `Bubble` are both invalid
/// and have no instruction identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Latch {
    /// Never filled, or drained past the end of the program.
    #[default]
    Empty,
    /// Deliberately invalidated slot.
    Bubble(BubbleCause),
    /// Holds an instruction.
    Valid(Instruction),
}

impl Latch {
    /// The resident instruction, if the latch is valid.
    pub const fn instruction(&self) -> Option<&Instruction> {
        match self {
            Self::Valid(inst) => Some(inst),
            Self::Empty | Self::Bubble(_) => None,
        }
    }

    /// Returns `true` if the latch holds an instruction.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns `true` if the latch holds a valid instruction with opcode `op`.
    pub fn holds(&self, op: Opcode) -> bool {
        self.instruction().is_some_and(|inst| inst.op == op)
    }

    /// Returns the resident branch, if the latch holds one.
    pub fn branch(&self) -> Option<&Instruction> {
        self.instruction().filter(|inst| inst.op.is_branch())
    }

    /// Snapshot view for the timeline.
    pub fn slot(&self) -> StageSlot {
        match self {
            Self::Empty => StageSlot::Empty,
            Self::Bubble(cause) => StageSlot::Bubble(*cause),
            Self::Valid(inst) => StageSlot::Occupied {
                op: inst.op,
                id: inst.id,
            },
        }
    }
}

/// The four inter-stage latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latches {
    /// IF/ID: instruction being decoded this cycle.
    pub if_id: Latch,
    /// ID/EX: instruction executing this cycle.
    pub id_ex: Latch,
    /// EX/MEM: instruction accessing memory this cycle.
    pub ex_mem: Latch,
    /// MEM/WB: instruction writing back this cycle.
    pub mem_wb: Latch,
}

impl Latches {
    /// Returns `true` if no latch holds an instruction.
    pub const fn is_drained(&self) -> bool {
        !(self.if_id.is_valid()
            || self.id_ex.is_valid()
            || self.ex_mem.is_valid()
            || self.mem_wb.is_valid())
    }
}

/// What a stage held during a cycle, as shown in the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSlot {
    /// Nothing, and not because of a stall or flush.
    #[default]
    Empty,
    /// A stall or flush bubble.
    Bubble(BubbleCause),
    /// A real instruction.
    Occupied {
        /// Opcode of the resident instruction.
        op: Opcode,
        /// Unique id of the resident instruction.
        id: u64,
    },
}

impl fmt::Display for StageSlot {
    /// `-` for empty, `stall`/`flush` for bubbles, `ADD#3` for instructions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("-"),
            Self::Bubble(cause) => f.write_str(cause.label()),
            Self::Occupied { op, id } => write!(f, "{op}#{id}"),
        }
    }
}

/// Per-cycle snapshot of the pipeline.
///
/// `fetch` through `memory` are the latch contents after the cycle commits;
/// `writeback` is the slot that retired at the start of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    /// 1-based cycle number.
    pub cycle: u64,
    /// IF stage (newly fetched, now in IF/ID).
    pub fetch: StageSlot,
    /// ID stage (now in ID/EX).
    pub decode: StageSlot,
    /// EX stage (now in EX/MEM).
    pub execute: StageSlot,
    /// MEM stage (now in MEM/WB).
    pub memory: StageSlot,
    /// WB stage (retired this cycle).
    pub writeback: StageSlot,
}

impl CycleRecord {
    /// Stage slots in pipeline order, IF first.
    pub const fn stages(&self) -> [StageSlot; 5] {
        [
            self.fetch,
            self.decode,
            self.execute,
            self.memory,
            self.writeback,
        ]
    }
}
