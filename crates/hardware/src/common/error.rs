//! Error definitions.
//!
//! The pipeline core has no recoverable failure modes of its own: an
//! out-of-range fetch is an empty slot and a missing prediction is a
//! not-taken guess. Errors only arise at the outer surfaces, which this module
//! covers:
//! 1. **Trace loading:** I/O failures and malformed trace lines.
//! 2. **Configuration:** JSON documents that do not match [`Config`](crate::config::Config).

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the loader, configuration and driver surfaces.
#[derive(Debug, Error)]
pub enum SimError {
    /// A file could not be read or written.
    #[error("could not access '{}': {source}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A trace line could not be parsed.
    #[error("trace line {line}: {message}")]
    Trace {
        /// 1-based line number in the trace file.
        line: usize,
        /// Description of the problem, including the offending text.
        message: String,
    },

    /// Mnemonic not part of the instruction set.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),

    /// Wrong number of operands for the opcode.
    #[error("bad operands: {0}")]
    BadOperands(String),

    /// Register token that is not `rN`/`xN`/`N` with `N` in range.
    #[error("bad register: {0}")]
    BadRegister(String),

    /// Memory operand that is not `[rB]`, `[rB+imm]` or `[rB-imm]`.
    #[error("bad memory operand: {0}")]
    BadMemOperand(String),

    /// Immediate that is not a signed integer.
    #[error("bad immediate: {0}")]
    BadImmediate(String),

    /// Configuration document could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attaches a trace line number to an operand-level error.
    ///
    /// Errors that already carry a location are returned unchanged.
    #[must_use]
    pub fn at_line(self, line: usize, text: &str) -> Self {
        match self {
            Self::Trace { .. } | Self::Io { .. } | Self::Config(_) => self,
            other => Self::Trace {
                line,
                message: format!("{other} in '{text}'"),
            },
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimError>;
