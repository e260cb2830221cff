//! Simulation driver and I/O boundaries.
//!
//! Everything that sits above the pipeline core lives here:
//! 1. **Loader:** Parses instruction traces into a [`Program`](crate::isa::Program).
//! 2. **Simulator:** Steps the pipeline until HALT or the cycle ceiling.
//! 3. **Timeline:** Writes the per-cycle stage snapshots as CSV.

pub mod loader;
pub mod simulator;
pub mod timeline;

pub use loader::{load_trace, parse_trace};
pub use simulator::{RunSummary, Simulator};
pub use timeline::{TIMELINE_HEADER, TimelineWriter};
