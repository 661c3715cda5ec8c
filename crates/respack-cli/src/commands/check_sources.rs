use super::{json_pretty, CommandError, EXIT_SUCCESS};
use respack_core::check_sources_file;
use std::path::Path;

/// Verify that every file under the directories implied by `sources` is
/// listed in it. Prints the derived resource directories.
pub fn run(sources: &Path, json_output: bool) -> Result<u8, CommandError> {
    let dirs = check_sources_file(sources)?;

    if json_output {
        let json = serde_json::json!({
            "sources": sources,
            "resource_dirs": dirs,
        });
        println!("{}", json_pretty(&json)?);
    } else {
        for dir in &dirs {
            println!("{}", dir.display());
        }
    }
    Ok(EXIT_SUCCESS)
}
