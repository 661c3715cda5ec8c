use crate::{fsync_dir, parent_dir, StoreError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Archive comment marking a resource zip that holds several encapsulated
/// resource directories (`0_res/…`, `1_res/…`) instead of one flat tree.
pub const MULTIPLE_RES_MAGIC: &str = "magic";

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Write a deterministic zip archive.
///
/// Determinism guarantees:
/// - Entries written in key order (the map is sorted)
/// - All timestamps set to the zip epoch (1980-01-01)
/// - All permissions set to 0644
///
/// The archive is assembled in a temp file beside `dest` and renamed into
/// place, so a failed run never leaves a truncated archive at `dest`.
pub fn pack_archive(
    entries: &BTreeMap<String, PathBuf>,
    dest: &Path,
    comment: Option<&str>,
) -> Result<(), StoreError> {
    let dir = parent_dir(dest);
    fs::create_dir_all(&dir)?;
    debug!("packing {} entries into {}", entries.len(), dest.display());

    let mut zip = ZipWriter::new(NamedTempFile::new_in(&dir)?);
    for (name, source) in entries {
        let data = fs::read(source)?;
        zip.start_file(name.as_str(), file_options())?;
        zip.write_all(&data)?;
    }
    if let Some(comment) = comment {
        zip.set_comment(comment);
    }

    let tmp = zip.finish()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(&dir)?;
    Ok(())
}

/// Zip every regular file under `source_dir`, keyed by its relative path.
pub fn pack_dir(source_dir: &Path, dest: &Path) -> Result<(), StoreError> {
    let mut entries = BTreeMap::new();
    collect_files(source_dir, source_dir, &mut entries)?;
    pack_archive(&entries, dest, None)
}

/// Extract a zip archive into `target_dir`, creating it if needed.
pub fn unpack_archive(archive: &Path, target_dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(target_dir)?;
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    zip.extract(target_dir)?;
    Ok(())
}

/// Whether the archive carries the [`MULTIPLE_RES_MAGIC`] comment.
pub fn has_multiple_res_dirs(archive: &Path) -> Result<bool, StoreError> {
    let zip = ZipArchive::new(File::open(archive)?)?;
    Ok(zip.comment() == MULTIPLE_RES_MAGIC.as_bytes())
}

fn collect_files(
    root: &Path,
    current: &Path,
    out: &mut BTreeMap<String, PathBuf>,
) -> Result<(), StoreError> {
    if !current.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let full = entry.path();
        if full.is_dir() {
            collect_files(root, &full, out)?;
            continue;
        }
        let rel = full
            .strip_prefix(root)
            .map_err(|e| StoreError::Io(std::io::Error::other(format!("path strip: {e}"))))?;
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.insert(name, full);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_entries(archive: &Path) -> BTreeMap<String, String> {
        let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut out = BTreeMap::new();
        for i in 0..zip.len() {
            let mut f = zip.by_index(i).unwrap();
            let mut s = String::new();
            f.read_to_string(&mut s).unwrap();
            out.insert(f.name().to_owned(), s);
        }
        out
    }

    fn fixture(dir: &Path) -> BTreeMap<String, PathBuf> {
        fs::write(dir.join("a.xml"), "alpha").unwrap();
        fs::write(dir.join("b.xml"), "beta").unwrap();
        let mut entries = BTreeMap::new();
        entries.insert("0_res/values/a.xml".to_owned(), dir.join("a.xml"));
        entries.insert("1_res/values/b.xml".to_owned(), dir.join("b.xml"));
        entries
    }

    #[test]
    fn pack_writes_entries() {
        let src = tempfile::tempdir().unwrap();
        let entries = fixture(src.path());
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("res.zip");

        pack_archive(&entries, &dest, None).unwrap();

        let read = read_entries(&dest);
        assert_eq!(read.len(), 2);
        assert_eq!(read["0_res/values/a.xml"], "alpha");
        assert_eq!(read["1_res/values/b.xml"], "beta");
    }

    #[test]
    fn pack_is_deterministic() {
        let src = tempfile::tempdir().unwrap();
        let entries = fixture(src.path());
        let out = tempfile::tempdir().unwrap();
        let a = out.path().join("a.zip");
        let b = out.path().join("b.zip");

        pack_archive(&entries, &a, Some(MULTIPLE_RES_MAGIC)).unwrap();
        pack_archive(&entries, &b, Some(MULTIPLE_RES_MAGIC)).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn comment_marks_multiple_res_dirs() {
        let src = tempfile::tempdir().unwrap();
        let entries = fixture(src.path());
        let out = tempfile::tempdir().unwrap();
        let marked = out.path().join("marked.zip");
        let flat = out.path().join("flat.zip");

        pack_archive(&entries, &marked, Some(MULTIPLE_RES_MAGIC)).unwrap();
        pack_archive(&entries, &flat, None).unwrap();

        assert!(has_multiple_res_dirs(&marked).unwrap());
        assert!(!has_multiple_res_dirs(&flat).unwrap());
    }

    #[test]
    fn empty_archive_is_valid() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("empty.zip");
        pack_archive(&BTreeMap::new(), &dest, Some(MULTIPLE_RES_MAGIC)).unwrap();
        assert!(read_entries(&dest).is_empty());
        assert!(has_multiple_res_dirs(&dest).unwrap());
    }

    #[test]
    fn pack_dir_unpack_roundtrip() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("org/chromium/foo")).unwrap();
        fs::write(src.path().join("org/chromium/foo/R.java"), "class R {}").unwrap();

        let out = tempfile::tempdir().unwrap();
        let jar = out.path().join("foo.srcjar");
        pack_dir(src.path(), &jar).unwrap();
        assert_eq!(
            read_entries(&jar).keys().collect::<Vec<_>>(),
            vec!["org/chromium/foo/R.java"]
        );

        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("unpacked");
        unpack_archive(&jar, &target).unwrap();
        assert_eq!(
            fs::read_to_string(target.join("org/chromium/foo/R.java")).unwrap(),
            "class R {}"
        );
    }

    #[test]
    fn pack_missing_source_fails_without_output() {
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("res.zip");
        let mut entries = BTreeMap::new();
        entries.insert("x".to_owned(), out.path().join("missing"));
        assert!(pack_archive(&entries, &dest, None).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn garbage_archive_fails_to_unpack() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.zip");
        fs::write(&bad, b"this is not a zip archive").unwrap();
        assert!(unpack_archive(&bad, &dir.path().join("out")).is_err());
    }
}
