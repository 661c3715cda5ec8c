//! The declared-sources list handed over by the build description.

use crate::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a newline-delimited list of resource files. Blank lines are dropped.
pub fn read_sources_list(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::SourcesList {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_sources_list(&content))
}

pub fn parse_sources_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Derive the ordered resource directories from a file list.
///
/// Every resource file sits exactly one directory below its root
/// (`$ROOT/$TYPE/$FILE`), so the root is the file's grandparent. Order is
/// first-seen order: it decides overlay precedence downstream.
pub fn resource_dirs_from_sources(sources: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for source in sources {
        let dir = grandparent(source);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    // A root nested in another root means some listed file is not exactly one
    // level deep, e.g. `java/res/README.md` makes `java` look like a root.
    for outer in &dirs {
        for inner in &dirs {
            if outer != inner && inner.starts_with(outer) {
                let bad: Vec<String> = sources
                    .iter()
                    .filter(|s| grandparent(s) == *outer)
                    .map(|s| s.display().to_string())
                    .collect();
                return Err(ConfigError::MalformedSources(bad));
            }
        }
    }

    Ok(dirs)
}

fn grandparent(path: &Path) -> PathBuf {
    path.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let list = parse_sources_list("  a/res/values/s.xml \n\n b/res/layout/l.xml\n");
        assert_eq!(
            list,
            vec![
                PathBuf::from("a/res/values/s.xml"),
                PathBuf::from("b/res/layout/l.xml")
            ]
        );
    }

    #[test]
    fn dirs_keep_first_seen_order() {
        let sources = parse_sources_list(
            "z/res/values/a.xml\na/res/values/b.xml\nz/res/layout/c.xml\n",
        );
        let dirs = resource_dirs_from_sources(&sources).unwrap();
        assert_eq!(dirs, vec![PathBuf::from("z/res"), PathBuf::from("a/res")]);
    }

    #[test]
    fn nested_root_is_malformed() {
        let sources = parse_sources_list("java/res/values/foo.xml\njava/res/README.md\n");
        let err = resource_dirs_from_sources(&sources).unwrap_err();
        match err {
            ConfigError::MalformedSources(bad) => {
                assert_eq!(bad, vec!["java/res/README.md".to_owned()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_list_yields_no_dirs() {
        assert!(resource_dirs_from_sources(&[]).unwrap().is_empty());
    }

    #[test]
    fn read_missing_list_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sources_list(&dir.path().join("absent.txt")).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }
}
