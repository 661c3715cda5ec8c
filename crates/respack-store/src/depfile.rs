use crate::{write_atomic, StoreError};
use std::path::Path;
use tracing::debug;

fn escape(path: &str) -> String {
    path.replace(' ', "\\ ")
}

/// Render a ninja depfile: `<first output>: <dep> <dep> ...` on one line.
pub fn render_depfile<S: AsRef<str>>(first_output: &Path, deps: &[S]) -> String {
    let mut sorted: Vec<&str> = deps.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut line = escape(&first_output.to_string_lossy());
    line.push(':');
    for dep in sorted {
        line.push(' ');
        line.push_str(&escape(dep));
    }
    line.push('\n');
    line
}

/// Write the depfile for `first_output`. Dependencies are sorted and
/// de-duplicated so identical inputs always yield identical bytes.
pub fn write_depfile<S: AsRef<str>>(
    path: &Path,
    first_output: &Path,
    deps: &[S],
) -> Result<(), StoreError> {
    debug!("writing depfile {} ({} deps)", path.display(), deps.len());
    write_atomic(path, render_depfile(first_output, deps).as_bytes())
}
