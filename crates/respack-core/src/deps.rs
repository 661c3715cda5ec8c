use crate::CoreError;
use respack_store::{has_multiple_res_dirs, unpack_archive, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Unpack each dependency archive into `<dest_root>/<i>_<file name>` and
/// return the resource roots they provide, in archive order.
///
/// An archive carrying the multi-directory marker contributes one root per
/// top-level directory, each renamed `<i>_<file name>_<dir>` so compiler
/// diagnostics point at the originating target. Any other archive is a single
/// flat root.
pub fn extract_deps(archives: &[PathBuf], dest_root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    fs::create_dir_all(dest_root)?;
    let mut roots = Vec::new();

    for (index, archive) in archives.iter().enumerate() {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = format!("{index}_{name}");
        let subdir = dest_root.join(&label);
        if subdir.exists() {
            return Err(StoreError::ExtractConflict(subdir).into());
        }
        unpack_archive(archive, &subdir)?;

        if !has_multiple_res_dirs(archive)? {
            debug!("extracted {} as a single root", archive.display());
            roots.push(subdir);
            continue;
        }

        let mut inner: Vec<String> = Vec::new();
        for entry in fs::read_dir(&subdir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                inner.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        inner.sort();
        debug!(
            "extracted {} with {} encapsulated roots",
            archive.display(),
            inner.len()
        );
        for dir in inner {
            let renamed = subdir.join(format!("{label}_{dir}"));
            fs::rename(subdir.join(&dir), &renamed)?;
            roots.push(renamed);
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use respack_store::{pack_archive, MULTIPLE_RES_MAGIC};
    use std::collections::BTreeMap;

    fn archive(dir: &Path, name: &str, files: &[&str], magic: bool) -> PathBuf {
        let mut entries = BTreeMap::new();
        for f in files {
            let src = dir.join(format!("src-{}", f.replace('/', "_")));
            fs::write(&src, *f).unwrap();
            entries.insert((*f).to_owned(), src);
        }
        let dest = dir.join(name);
        pack_archive(&entries, &dest, magic.then_some(MULTIPLE_RES_MAGIC)).unwrap();
        dest
    }

    #[test]
    fn flat_archive_is_one_root() {
        let dir = tempfile::tempdir().unwrap();
        let zip = archive(dir.path(), "gen.zip", &["values/a.xml"], false);
        let deps = dir.path().join("deps");

        let roots = extract_deps(&[zip], &deps).unwrap();
        assert_eq!(roots, vec![deps.join("0_gen.zip")]);
        assert!(roots[0].join("values/a.xml").is_file());
    }

    #[test]
    fn marked_archive_keeps_encapsulated_roots() {
        let dir = tempfile::tempdir().unwrap();
        let zip = archive(
            dir.path(),
            "base.resources.zip",
            &["1_res/values/b.xml", "0_res/values/a.xml"],
            true,
        );
        let deps = dir.path().join("deps");

        let roots = extract_deps(&[zip], &deps).unwrap();
        let sub = deps.join("0_base.resources.zip");
        assert_eq!(
            roots,
            vec![
                sub.join("0_base.resources.zip_0_res"),
                sub.join("0_base.resources.zip_1_res"),
            ]
        );
        assert!(roots[0].join("values/a.xml").is_file());
        assert!(roots[1].join("values/b.xml").is_file());
    }

    #[test]
    fn ordinals_follow_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = archive(dir.path(), "a.zip", &["values/a.xml"], false);
        let b = archive(dir.path(), "b.zip", &["values/b.xml"], false);
        let deps = dir.path().join("deps");

        let roots = extract_deps(&[b, a], &deps).unwrap();
        assert_eq!(roots, vec![deps.join("0_b.zip"), deps.join("1_a.zip")]);
    }

    #[test]
    fn existing_destination_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let zip = archive(dir.path(), "gen.zip", &["values/a.xml"], false);
        let deps = dir.path().join("deps");
        fs::create_dir_all(deps.join("0_gen.zip")).unwrap();

        let err = extract_deps(&[zip], &deps).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Store(StoreError::ExtractConflict(_))
        ));
    }

    #[test]
    fn no_archives_no_roots() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_deps(&[], &dir.path().join("deps")).unwrap().is_empty());
    }
}
