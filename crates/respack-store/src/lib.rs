//! Filesystem data plane for respack.
//!
//! This crate owns every on-disk format the pipeline reads or writes: the
//! scratch `BuildLayout` used while a target is being prepared, deterministic
//! zip packing and unpacking (including the sentinel comment that marks
//! multi-directory resource archives), the provenance side-file, the persisted
//! `FingerprintRecord` consulted by the staleness gate, and the ninja depfile.

pub mod archive;
pub mod depfile;
pub mod fingerprint;
pub mod layout;
pub mod provenance;

pub use archive::{
    has_multiple_res_dirs, pack_archive, pack_dir, unpack_archive, MULTIPLE_RES_MAGIC,
};
pub use depfile::{render_depfile, write_depfile};
pub use fingerprint::{record_path_for, FingerprintInput, FingerprintRecord, FingerprintSet};
pub use layout::BuildLayout;
pub use provenance::{info_path_for, ProvenanceRecord};

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// Parent directory of `path`, or `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `dest` with `data` via a temp file in the same directory.
pub(crate) fn write_atomic(dest: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = parent_dir(dest);
    std::fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(&dir)?;
    Ok(())
}

/// Copy `src` over `dest` without ever exposing a partial `dest`.
pub fn copy_atomic(src: &Path, dest: &Path) -> Result<(), StoreError> {
    let data = std::fs::read(src)?;
    write_atomic(dest, &data)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("resource zip name conflict: {} already exists", .0.display())]
    ExtractConflict(PathBuf),
    #[error("malformed provenance line {line}: '{content}'")]
    MalformedProvenance { line: usize, content: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display_extract_conflict() {
        let e = StoreError::ExtractConflict(PathBuf::from("deps/0_foo.zip"));
        assert!(e.to_string().contains("0_foo.zip"));
    }

    #[test]
    fn store_error_display_malformed_provenance() {
        let e = StoreError::MalformedProvenance {
            line: 3,
            content: "nocomma".to_owned(),
        };
        let msg = e.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("nocomma"));
    }

    #[test]
    fn parent_dir_of_bare_name_is_cwd() {
        assert_eq!(parent_dir(Path::new("R.txt")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("out/R.txt")), PathBuf::from("out"));
    }

    #[test]
    fn copy_atomic_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("R.txt");
        std::fs::write(&src, "int id a 0x7f010000\n").unwrap();
        let dest = dir.path().join("out").join("foo_R.txt");
        copy_atomic(&src, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), std::fs::read(&src).unwrap());
    }

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a").join("b.txt");
        write_atomic(&dest, b"one").unwrap();
        write_atomic(&dest, b"two").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"two");
    }
}
