//! Five-stage pipeline simulator library.
//!
//! This crate models a classic in-order IF/ID/EX/MEM/WB pipeline for a small
//! teaching instruction set, with the following:
//! 1. **Core:** Pipeline engine, inter-stage latches, RAW hazard detection and forwarding.
//! 2. **Branch prediction:** Static, 1-bit, 2-bit and tournament predictors behind one trait.
//! 3. **ISA:** Opcodes, instructions and programs.
//! 4. **Simulation:** Trace loader, cycle-ceiling driver, timeline export, configuration and statistics.

/// Common types (errors and result alias).
pub mod common;
/// Simulator configuration (defaults, predictor selection, JSON loading).
pub mod config;
/// Pipeline core (engine, latches, hazards) and functional units (branch prediction).
pub mod core;
/// Instruction set (opcodes, instructions, programs).
pub mod isa;
/// Trace loading, the simulation driver and timeline export.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Error type for the loader, configuration and I/O surfaces.
pub use crate::common::{Result, SimError};
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The pipeline engine; borrows a program and optionally a predictor.
pub use crate::core::Pipeline;
/// Instruction model and the program container that numbers instructions.
pub use crate::isa::{Instruction, Opcode, Program};
/// Driver that runs a pipeline until HALT or the cycle ceiling.
pub use crate::sim::{RunSummary, Simulator};
/// Cumulative run metrics.
pub use crate::stats::Metrics;
