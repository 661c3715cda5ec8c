use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A missing prerequisite with an actionable hint.
#[derive(Debug, Serialize)]
pub struct MissingPrereq {
    pub name: String,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

/// The file a tool path refers to. A bare name such as `aapt` is looked up
/// on `PATH`; anything with a directory component must name an existing file.
pub fn resolve_tool_path(path: &Path) -> Option<PathBuf> {
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    let output = Command::new("which").arg(path).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let found = stdout.lines().next()?.trim();
    (!found.is_empty()).then(|| PathBuf::from(found))
}

/// Check what the named backend needs. An empty list means it can run.
pub fn check_compiler_prereqs(backend: &str, tool_path: Option<&Path>) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();
    if backend != "aapt" {
        return missing;
    }

    match tool_path {
        None => missing.push(MissingPrereq {
            name: "aapt".to_owned(),
            purpose: "resource identifier table generation",
            install_hint: "pass --aapt-path pointing at build-tools/<version>/aapt",
        }),
        Some(path) => {
            let compiler = crate::aapt::AaptCompiler::new(path);
            if !crate::IdCompiler::available(&compiler) {
                missing.push(MissingPrereq {
                    name: path.display().to_string(),
                    purpose: "resource identifier table generation",
                    install_hint: "sdkmanager \"build-tools;<version>\"",
                });
            }
        }
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nrespack needs a resource compiler to generate identifier tables.");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_needs_nothing() {
        assert!(check_compiler_prereqs("mock", None).is_empty());
    }

    #[test]
    fn aapt_without_path_is_reported() {
        let missing = check_compiler_prereqs("aapt", None);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].install_hint.contains("--aapt-path"));
    }

    #[test]
    fn aapt_with_missing_binary_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("aapt");
        let missing = check_compiler_prereqs("aapt", Some(&bogus));
        assert_eq!(missing.len(), 1);
        assert!(missing[0].name.ends_with("aapt"));
    }

    #[test]
    fn explicit_tool_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("aapt");
        assert_eq!(resolve_tool_path(&tool), None);
        std::fs::write(&tool, "").unwrap();
        assert_eq!(resolve_tool_path(&tool), Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn bare_tool_name_resolves_through_path() {
        let resolved = resolve_tool_path(Path::new("sh")).unwrap();
        assert!(resolved.is_absolute(), "{}", resolved.display());
        assert!(resolved.is_file());
        assert_eq!(resolve_tool_path(Path::new("respack-no-such-tool")), None);
    }

    #[test]
    fn format_missing_produces_readable_output() {
        let items = vec![MissingPrereq {
            name: "aapt".to_owned(),
            purpose: "ids",
            install_hint: "sdkmanager",
        }];
        let output = format_missing(&items);
        assert!(output.starts_with("missing prerequisites:\n"));
        assert!(output.contains("  - aapt: ids (install: sdkmanager)"));
    }

    #[test]
    fn prereq_serializes_for_json_reports() {
        let m = MissingPrereq {
            name: "aapt".to_owned(),
            purpose: "ids",
            install_hint: "sdkmanager",
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["name"], "aapt");
    }
}
