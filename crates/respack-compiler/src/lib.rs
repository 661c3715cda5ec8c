//! Resource ID compiler boundary for respack.
//!
//! The pipeline only ever needs one thing from a resource compiler: an
//! identifier table (`R.txt`) for a set of resource search roots. This crate
//! models that as the `IdCompiler` trait with two backends: `aapt`, which
//! drives the Android SDK tool as a child process, and `mock`, an in-process
//! stand-in that assigns identifiers deterministically for tests.

pub mod aapt;
pub mod backend;
pub mod mock;
pub mod prereq;

pub use backend::{select_compiler, IdCompiler, SymbolInvocation, COMPILER_NAMES};
pub use prereq::{check_compiler_prereqs, format_missing, resolve_tool_path, MissingPrereq};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("compiler I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown compiler backend '{0}' (expected one of: aapt, mock)")]
    UnknownBackend(String),
    #[error("compiler backend '{0}' requires a tool path")]
    MissingToolPath(String),
    #[error("compiler '{0}' is not available on this system")]
    Unavailable(String),
    #[error("{tool} failed ({status}):\n{output}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },
    #[error("cannot read resource file {}: {reason}", path.display())]
    UnreadableResource { path: PathBuf, reason: String },
}
