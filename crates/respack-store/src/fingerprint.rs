//! Content fingerprints over a target's declared inputs, and the record that
//! persists them between invocations.

use crate::{write_atomic, StoreError};
use respack_schema::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Bumped whenever the hashing scheme changes; older records read as absent.
pub const RECORD_FORMAT_VERSION: u32 = 1;
const RECORD_SUFFIX: &str = ".respack.stamp";

/// Record path for an output set, keyed by its first output.
pub fn record_path_for(first_output: &Path) -> PathBuf {
    let mut name: OsString = first_output.as_os_str().to_owned();
    name.push(RECORD_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintInput {
    /// A file whose contents are hashed.
    Path(PathBuf),
    /// A value hashed verbatim (flags, package names, file-relative names).
    Literal(String),
}

/// Ordered collection of inputs hashed into one fingerprint.
#[derive(Debug, Clone, Default)]
pub struct FingerprintSet {
    entries: Vec<FingerprintInput>,
}

impl FingerprintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.entries.push(FingerprintInput::Path(path.into()));
        self
    }

    pub fn add_paths<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for p in paths {
            self.add_path(p);
        }
        self
    }

    pub fn add_literal(&mut self, value: impl Into<String>) -> &mut Self {
        self.entries.push(FingerprintInput::Literal(value.into()));
        self
    }

    pub fn add_literals<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            self.add_literal(v);
        }
        self
    }

    pub fn entries(&self) -> &[FingerprintInput] {
        &self.entries
    }

    /// Hash every entry in order. Reading a missing input path is an error.
    pub fn compute(&self) -> Result<FingerprintRecord, StoreError> {
        let mut overall = blake3::Hasher::new();
        let mut strings = blake3::Hasher::new();
        let mut files = BTreeMap::new();

        for entry in &self.entries {
            match entry {
                FingerprintInput::Path(path) => {
                    let data = fs::read(path).map_err(|e| {
                        StoreError::Io(std::io::Error::new(
                            e.kind(),
                            format!("cannot hash input {}: {e}", path.display()),
                        ))
                    })?;
                    let digest = blake3::hash(&data).to_hex().to_string();
                    overall.update(format!("path:{}\0{digest}\0", path.display()).as_bytes());
                    files.insert(path.display().to_string(), digest);
                }
                FingerprintInput::Literal(value) => {
                    let tagged = format!("str:{value}\0");
                    overall.update(tagged.as_bytes());
                    strings.update(tagged.as_bytes());
                }
            }
        }

        Ok(FingerprintRecord {
            format_version: RECORD_FORMAT_VERSION,
            fingerprint: Fingerprint::new(overall.finalize().to_hex().to_string()),
            files,
            strings_digest: strings.finalize().to_hex().to_string(),
            recorded_at: None,
        })
    }
}

/// Persisted result of [`FingerprintSet::compute`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub format_version: u32,
    pub fingerprint: Fingerprint,
    /// Per-input digests, kept so a rerun can say which input changed.
    pub files: BTreeMap<String, String>,
    pub strings_digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
}

impl FingerprintRecord {
    /// Load a previous record. Missing, unreadable, or outdated records all
    /// read as `None`, which the caller treats as stale.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let record: Self = serde_json::from_str(&content).ok()?;
        (record.format_version == RECORD_FORMAT_VERSION).then_some(record)
    }

    pub fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let mut stamped = self.clone();
        stamped.recorded_at = Some(chrono::Utc::now().to_rfc3339());
        let content = serde_json::to_string_pretty(&stamped)?;
        write_atomic(path, content.as_bytes())
    }

    pub fn remove(path: &Path) -> Result<(), StoreError> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn matches(&self, other: &Self) -> bool {
        self.format_version == other.format_version && self.fingerprint == other.fingerprint
    }

    /// Human-readable reasons why `self` differs from `previous`.
    pub fn describe_changes(&self, previous: &Self) -> Vec<String> {
        let mut changes = Vec::new();
        for (path, digest) in &self.files {
            match previous.files.get(path) {
                None => changes.push(format!("input added: {path}")),
                Some(old) if old != digest => changes.push(format!("input changed: {path}")),
                Some(_) => {}
            }
        }
        for path in previous.files.keys() {
            if !self.files.contains_key(path) {
                changes.push(format!("input removed: {path}"));
            }
        }
        if self.strings_digest != previous.strings_digest {
            changes.push("input strings changed".to_owned());
        }
        if changes.is_empty() && self.fingerprint != previous.fingerprint {
            changes.push("input order changed".to_owned());
        }
        changes
    }
}
