use crate::walker::walk_all;
use crate::CoreError;
use respack_schema::{read_sources_list, resource_dirs_from_sources, IgnorePattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fail if any file under `resource_dirs` is missing from `declared`. Every
/// unlisted file is reported, in walk order.
pub fn verify_sources_listed(
    declared: &[PathBuf],
    resource_dirs: &[PathBuf],
    ignore: &IgnorePattern,
) -> Result<(), CoreError> {
    let declared: BTreeSet<&Path> = declared.iter().map(PathBuf::as_path).collect();
    let unlisted: Vec<PathBuf> = walk_all(resource_dirs, ignore)?
        .into_iter()
        .map(|f| f.source)
        .filter(|source| !declared.contains(source.as_path()))
        .collect();

    if unlisted.is_empty() {
        debug!("all {} declared resource files accounted for", declared.len());
        Ok(())
    } else {
        Err(CoreError::UnlistedResources(unlisted))
    }
}

/// Read a declared-sources file and verify it against the directories it
/// implies. Returns the derived resource directories.
pub fn check_sources_file(sources_path: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let sources = read_sources_list(sources_path)?;
    let dirs = resource_dirs_from_sources(&sources)?;
    verify_sources_listed(&sources, &dirs, &IgnorePattern::default())?;
    Ok(dirs)
}
