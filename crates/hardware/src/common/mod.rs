//! Common utilities and types shared across the simulator.
//!
//! Currently this is the error type used by the loader, configuration and
//! driver surfaces.

/// Error types for the outer (non-engine) surfaces.
pub mod error;

pub use error::{Result, SimError};
