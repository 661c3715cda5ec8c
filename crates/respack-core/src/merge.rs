use crate::walker::Walker;
use crate::CoreError;
use respack_schema::IgnorePattern;
use respack_store::{pack_archive, ProvenanceRecord, MULTIPLE_RES_MAGIC};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of overlaying several resource roots.
#[derive(Debug, Default)]
pub struct MergedResources {
    /// Archive path (`<ordinal>_<root basename>/<relative>`) to source file.
    pub entries: BTreeMap<String, PathBuf>,
    /// Archive path to checked-in source, without generated files.
    pub provenance: ProvenanceRecord,
}

fn is_generated(source: &Path, generated_prefixes: &[PathBuf]) -> bool {
    generated_prefixes.iter().any(|p| source.starts_with(p))
}

/// Combine `roots` in ordinal order. Every file keeps its own entry under the
/// ordinal prefix, so same-named roots stay apart in the archive. Which
/// definition wins for a resource name is decided by the compiler, which
/// reads the roots in the same order.
pub fn merge_resource_dirs(
    roots: &[PathBuf],
    ignore: &IgnorePattern,
    generated_prefixes: &[PathBuf],
) -> Result<MergedResources, CoreError> {
    let mut merged = MergedResources::default();

    for (ordinal, root) in roots.iter().enumerate() {
        let base = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for file in Walker::new(root, ignore)? {
            let file = file?;
            let archive_path = format!("{ordinal}_{base}/{}", file.relative);
            if is_generated(&file.source, generated_prefixes) {
                debug!("not recording provenance for generated {}", file.source.display());
            } else {
                merged.provenance.insert(archive_path.clone(), file.source.clone());
            }
            merged.entries.insert(archive_path, file.source);
        }
    }
    Ok(merged)
}

/// Write the provenance side-file and the archive, marked as holding several
/// resource roots.
pub fn write_resource_zip(merged: &MergedResources, dest: &Path) -> Result<(), CoreError> {
    info!(
        "writing resource archive {} ({} entries)",
        dest.display(),
        merged.entries.len()
    );
    merged.provenance.write_for(dest)?;
    pack_archive(&merged.entries, dest, Some(MULTIPLE_RES_MAGIC))?;
    Ok(())
}
