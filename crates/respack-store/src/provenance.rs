use crate::{write_atomic, StoreError};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Side-file path for an archive: `<archive>.info`.
pub fn info_path_for(archive: &Path) -> PathBuf {
    let mut name: OsString = archive.as_os_str().to_owned();
    name.push(".info");
    PathBuf::from(name)
}

/// Maps packaged archive paths back to the checked-in files they came from.
///
/// Serialized one entry per line as `<archive path>,<source path>`, sorted by
/// archive path. Archive paths never contain commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceRecord {
    entries: BTreeMap<String, PathBuf>,
}

impl ProvenanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, archive_path: impl Into<String>, source: impl Into<PathBuf>) {
        self.entries.insert(archive_path.into(), source.into());
    }

    pub fn get(&self, archive_path: &str) -> Option<&Path> {
        self.entries.get(archive_path).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (archive_path, source) in &self.entries {
            out.push_str(archive_path);
            out.push(',');
            out.push_str(&source.to_string_lossy());
            out.push('\n');
        }
        out
    }

    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let mut record = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((archive_path, source)) = line.split_once(',') else {
                return Err(StoreError::MalformedProvenance {
                    line: idx + 1,
                    content: line.to_owned(),
                });
            };
            record.insert(archive_path, source);
        }
        Ok(record)
    }

    /// Write the side-file next to `archive`.
    pub fn write_for(&self, archive: &Path) -> Result<PathBuf, StoreError> {
        let path = info_path_for(archive);
        write_atomic(&path, self.to_text().as_bytes())?;
        Ok(path)
    }

    pub fn read_for(archive: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(info_path_for(archive))?;
        Self::parse(&content)
    }
}
