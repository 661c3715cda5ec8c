use crate::CoreError;
use respack_compiler::{IdCompiler, SymbolInvocation};
use respack_schema::IgnorePattern;
use respack_store::BuildLayout;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Run `compiler` over dependency roots then own roots and return the path of
/// the identifier table. An empty resource set yields an empty table file.
pub fn generate_id_table(
    compiler: &dyn IdCompiler,
    layout: &BuildLayout,
    own_dirs: &[PathBuf],
    dep_subdirs: &[PathBuf],
    include_resources: &[PathBuf],
    ignore: &IgnorePattern,
) -> Result<PathBuf, CoreError> {
    // Dependency roots come first so references into them resolve; their
    // symbols are carried into this target's table as a side effect.
    let mut search_roots = dep_subdirs.to_vec();
    search_roots.extend_from_slice(own_dirs);

    let invocation = SymbolInvocation {
        manifest: layout.placeholder_manifest(),
        search_roots,
        include_resources: include_resources.to_vec(),
        ignore: ignore.clone(),
        gen_dir: layout.gen_dir(),
    };
    info!(
        "generating identifier table with {} ({} search roots)",
        compiler.name(),
        invocation.search_roots.len()
    );
    compiler.compile_symbols(&invocation)?;

    let table = invocation.r_txt_path();
    if !table.exists() {
        debug!("compiler produced no identifier table; writing an empty one");
        fs::write(&table, "")?;
    }
    Ok(table)
}
