//! Driver for the `solc --standard-json` interface.
//!
//! The compiler itself is an external binary. This crate builds the
//! standard-JSON input, runs the binary, and turns its output into typed
//! values: diagnostics, and per contract the bytecode and ABI needed to deploy
//! and talk to it. The untouched output is kept around so it can be persisted
//! for later inspection.

pub mod artifact;
mod compiler;
pub mod input;
pub mod output;

pub use {
    compiler::{Compilation, Solc},
    input::StandardJsonInput,
    output::{CompiledContract, Diagnostic, Severity, StandardJsonOutput},
};
use std::{path::PathBuf, process::ExitStatus};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{binary:?} exited with {status}: {stderr}")]
    Process {
        binary: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    #[error("malformed standard-json document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine compiler version from {0:?}")]
    UnknownVersion(String),
    #[error("compiler reports version {actual} but {expected} is required")]
    VersionMismatch { expected: String, actual: String },
    #[error("compilation failed:\n{}", output::format_diagnostics(.0))]
    Compilation(Vec<Diagnostic>),
    #[error("contract {name:?} not found in {file:?}, available: {available:?}")]
    ContractNotFound {
        file: String,
        name: String,
        available: Vec<String>,
    },
    #[error("compiler output for {name:?} has no {field}")]
    MissingOutput { name: String, field: &'static str },
    #[error("contract {name:?} has invalid bytecode: {reason}")]
    InvalidBytecode { name: String, reason: String },
    #[error("failed to write {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the error comes from looking up a contract in an otherwise
    /// successful compilation.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::ContractNotFound { .. } | Self::MissingOutput { .. } | Self::InvalidBytecode { .. }
        )
    }
}
