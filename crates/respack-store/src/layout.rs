use crate::StoreError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PLACEHOLDER_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="org.dummy">
  <application android:label="Dummy" />
</manifest>
"#;

/// Scratch directory layout for one `prepare` run.
///
/// Holds extracted dependency archives, compiler output, and the generated
/// source tree. A layout created with [`temporary`](Self::temporary) is removed
/// when dropped; nothing in it outlives the run.
#[derive(Debug)]
pub struct BuildLayout {
    root: PathBuf,
    _guard: Option<TempDir>,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _guard: None,
        }
    }

    pub fn temporary() -> Result<Self, StoreError> {
        let dir = tempfile::Builder::new().prefix("respack-").tempdir()?;
        Ok(Self {
            root: dir.path().to_path_buf(),
            _guard: Some(dir),
        })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where dependency resource archives are unpacked.
    #[inline]
    pub fn deps_dir(&self) -> PathBuf {
        self.root.join("deps")
    }

    /// Compiler output directory (`R.txt` and the throwaway `R.java` stub).
    #[inline]
    pub fn gen_dir(&self) -> PathBuf {
        self.root.join("gen")
    }

    #[inline]
    pub fn srcjar_dir(&self) -> PathBuf {
        self.root.join("srcjars")
    }

    #[inline]
    pub fn r_txt_path(&self) -> PathBuf {
        self.gen_dir().join("R.txt")
    }

    /// Manifest handed to the compiler; its package is irrelevant at this stage.
    #[inline]
    pub fn placeholder_manifest(&self) -> PathBuf {
        self.root.join("AndroidManifest.xml")
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.deps_dir())?;
        fs::create_dir_all(self.gen_dir())?;
        fs::create_dir_all(self.srcjar_dir())?;
        fs::write(self.placeholder_manifest(), PLACEHOLDER_MANIFEST)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_are_correct() {
        let layout = BuildLayout::new("/tmp/respack-test");
        assert_eq!(layout.deps_dir(), PathBuf::from("/tmp/respack-test/deps"));
        assert_eq!(layout.gen_dir(), PathBuf::from("/tmp/respack-test/gen"));
        assert_eq!(
            layout.srcjar_dir(),
            PathBuf::from("/tmp/respack-test/srcjars")
        );
        assert_eq!(
            layout.r_txt_path(),
            PathBuf::from("/tmp/respack-test/gen/R.txt")
        );
        assert_eq!(
            layout.placeholder_manifest(),
            PathBuf::from("/tmp/respack-test/AndroidManifest.xml")
        );
    }

    #[test]
    fn initialize_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::new(dir.path());
        layout.initialize().unwrap();

        assert!(layout.deps_dir().is_dir());
        assert!(layout.gen_dir().is_dir());
        assert!(layout.srcjar_dir().is_dir());
        let manifest = fs::read_to_string(layout.placeholder_manifest()).unwrap();
        assert!(manifest.contains("package=\"org.dummy\""));
    }

    #[test]
    fn initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BuildLayout::new(dir.path());
        layout.initialize().unwrap();
        layout.initialize().unwrap();
    }

    #[test]
    fn temporary_layout_removed_on_drop() {
        let root;
        {
            let layout = BuildLayout::temporary().unwrap();
            layout.initialize().unwrap();
            root = layout.root().to_path_buf();
            assert!(root.is_dir());
        }
        assert!(!root.exists());
    }
}
