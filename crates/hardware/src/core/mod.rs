//! Core processor model.
//!
//! This module contains the pipeline state machine together with the two
//! decision subsystems it consults every cycle: the data-hazard detector and
//! the branch prediction unit.

/// Instruction pipeline (latches, hazards, engine).
pub mod pipeline;

/// Functional units (branch prediction).
pub mod units;

pub use self::pipeline::Pipeline;
