use crate::CoreError;
use respack_schema::{ConfigError, IgnorePattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file found under a resource root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Root-relative path with `/` separators.
    pub relative: String,
    /// `root` joined with the relative path.
    pub source: PathBuf,
}

/// Lazily enumerates the files under one resource root, in file-name order.
///
/// With an ignore pattern, a file is skipped when its root-relative path or
/// any segment of it matches. Directories, including symlinked ones, are
/// descended but never yielded; files keep their path under `root`.
pub struct Walker {
    root: PathBuf,
    ignore: Option<IgnorePattern>,
    inner: walkdir::IntoIter,
}

impl Walker {
    pub fn new(root: &Path, ignore: &IgnorePattern) -> Result<Self, CoreError> {
        Self::build(root, Some(ignore.clone()))
    }

    /// Every file, ignored or not.
    pub fn unfiltered(root: &Path) -> Result<Self, CoreError> {
        Self::build(root, None)
    }

    fn build(root: &Path, ignore: Option<IgnorePattern>) -> Result<Self, CoreError> {
        if !root.is_dir() {
            return Err(ConfigError::MissingResourceDir(root.to_path_buf()).into());
        }
        Ok(Self {
            root: root.to_path_buf(),
            ignore,
            inner: WalkDir::new(root)
                .min_depth(1)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Walker {
    type Item = Result<WalkedFile, CoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(CoreError::Io(e.into()))),
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            if self.ignore.as_ref().is_some_and(|i| i.is_ignored(rel)) {
                continue;
            }
            let relative = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            return Some(Ok(WalkedFile {
                source: self.root.join(rel),
                relative,
            }));
        }
    }
}

/// Walk several roots, concatenating results in root order.
pub fn walk_all(roots: &[PathBuf], ignore: &IgnorePattern) -> Result<Vec<WalkedFile>, CoreError> {
    let mut files = Vec::new();
    for root in roots {
        for file in Walker::new(root, ignore)? {
            files.push(file?);
        }
    }
    Ok(files)
}
