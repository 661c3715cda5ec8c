//! Incremental resource pipeline for one Android resource target.
//!
//! This crate ties together the invocation schema, the filesystem data plane,
//! and the ID compiler boundary into the `Engine`: walk and verify the
//! target's resource directories, extract dependency archives, produce the
//! identifier table, generate `R.java` sources, and pack the merged resource
//! archive, all behind a `StalenessGate` that skips the work when no input
//! changed but always refreshes the depfile.

pub mod completeness;
pub mod deps;
pub mod engine;
pub mod gate;
pub mod idtable;
pub mod merge;
pub mod rjava;
pub mod symbols;
pub mod walker;

pub use completeness::{check_sources_file, verify_sources_listed};
pub use deps::extract_deps;
pub use engine::{Engine, PrepareReport};
pub use gate::{GateOutcome, StalenessGate};
pub use idtable::generate_id_table;
pub use merge::{merge_resource_dirs, write_resource_zip, MergedResources};
pub use rjava::{create_r_java_files, DependencyTable, RJavaOptions};
pub use symbols::{IdentifierTable, JavaType, Locality, TableEntry};
pub use walker::{WalkedFile, Walker};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] respack_schema::ConfigError),
    #[error("store error: {0}")]
    Store(#[from] respack_store::StoreError),
    #[error("{0}")]
    Compiler(#[from] respack_compiler::CompilerError),
    #[error(
        "found files not listed in the declared sources list:\n  {}",
        .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join("\n  ")
    )]
    UnlistedResources(Vec<PathBuf>),
    #[error("malformed identifier table {}:{line}: '{content}'", path.display())]
    MalformedTable {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("package '{0}' appeared twice among dependency packages; resource targets must use unique package names")]
    DuplicatePackage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
