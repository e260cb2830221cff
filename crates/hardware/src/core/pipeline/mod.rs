//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the five-stage instruction pipeline.
//! It includes the following components:
//! 1. **Latches:** Inter-stage buffers and per-cycle stage snapshots.
//! 2. **Hazards:** Read-after-write detection with and without forwarding.
//! 3. **Engine:** The cycle state machine tying hazards and branch prediction together.

/// Pipeline state machine.
pub mod engine;

/// Pipeline hazard detection.
pub mod hazards;

/// Inter-stage pipeline latches (IF/ID, ID/EX, EX/MEM, MEM/WB).
pub mod latches;

pub use engine::{CONTROL_FLUSH_CYCLES, Pipeline};
pub use hazards::{HazardDecision, HazardKind, detect_hazard};
pub use latches::{BubbleCause, CycleRecord, Latch, Latches, StageSlot};
