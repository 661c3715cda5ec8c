//! Invocation schema for respack.
//!
//! This crate defines everything that describes *what* one resource target
//! asks for: the `PrepareConfig` (TOML-loadable, validated), the declared
//! sources list and the resource directories derived from it, the ignore-glob
//! filter shared with the ID compiler, manifest package lookup, and string
//! newtypes.

pub mod config;
pub mod ignore;
pub mod manifest;
pub mod sources;
pub mod types;

pub use config::{parse_gn_list, PrepareConfig, DEFAULT_GENERATED_PREFIX};
pub use ignore::{IgnorePattern, DEFAULT_IGNORE_PATTERN};
pub use manifest::{package_from_manifest, package_from_manifest_str};
pub use sources::{parse_sources_list, read_sources_list, resource_dirs_from_sources};
pub use types::{Fingerprint, PackageName};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to read sources list {}: {source}", path.display())]
    SourcesList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "resource(s) found that are not in a proper directory structure:\n  {}\nall resource files must follow a structure of \"$ROOT/$SUBDIR/$FILE\"",
        .0.join("\n  ")
    )]
    MalformedSources(Vec<String>),
    #[error("resource directory does not exist: {}", .0.display())]
    MissingResourceDir(PathBuf),
    #[error("invalid ignore glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },
    #[error("invalid GN list '{value}': {reason}")]
    InvalidGnList { value: String, reason: String },
    #[error("at least one of resource_zip_out, r_text_out or srcjar_out must be set")]
    NoOutputs,
    #[error("{packages} extra packages given but {tables} extra R.txt files")]
    ExtraTablesMismatch { packages: usize, tables: usize },
    #[error("the aapt compiler needs aapt_path (or a prebuilt r_text_in)")]
    MissingCompilerPath,
}
