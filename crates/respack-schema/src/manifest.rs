//! Package lookup in an `AndroidManifest.xml`.
//!
//! Only the `package` attribute of the root `<manifest>` element is read; the
//! rest of the document is not interpreted.

use crate::types::PackageName;
use crate::ConfigError;
use std::fs;
use std::path::Path;

pub fn package_from_manifest(path: &Path) -> Result<Option<PackageName>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Manifest {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(package_from_manifest_str(&content))
}

pub fn package_from_manifest_str(xml: &str) -> Option<PackageName> {
    let start = find_manifest_tag(xml)?;
    let rest = &xml[start..];
    let tag = &rest[..rest.find('>')?];
    attribute_value(tag, "package")
        .filter(|v| !v.is_empty())
        .map(PackageName::new)
}

fn find_manifest_tag(xml: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = xml[offset..].find("<manifest") {
        let at = offset + pos;
        let after = xml[at + "<manifest".len()..].chars().next();
        if matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        offset = at + 1;
    }
    None
}

fn attribute_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut offset = 0;
    while let Some(pos) = tag[offset..].find(name) {
        let at = offset + pos;
        offset = at + name.len();
        // Reject partial matches such as `android:package` or `packageName`.
        let before = tag[..at].chars().next_back();
        if !matches!(before, Some(c) if c.is_whitespace()) {
            continue;
        }
        let rest = tag[offset..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let quote = rest.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let body = &rest[1..];
        return body.find(quote).map(|end| &body[..end]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_package_attribute() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="org.chromium.components.foo">
  <application />
</manifest>"#;
        assert_eq!(
            package_from_manifest_str(xml).unwrap(),
            "org.chromium.components.foo"
        );
    }

    #[test]
    fn single_quotes_accepted() {
        let xml = "<manifest package='org.example'/>";
        assert_eq!(package_from_manifest_str(xml).unwrap(), "org.example");
    }

    #[test]
    fn missing_package_is_none() {
        let xml = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"/>"#;
        assert!(package_from_manifest_str(xml).is_none());
    }

    #[test]
    fn similar_attribute_names_ignored() {
        let xml = r#"<manifest android:packageName="x.y" package="a.b"/>"#;
        assert_eq!(package_from_manifest_str(xml).unwrap(), "a.b");
    }

    #[test]
    fn manifest_prefix_tags_ignored() {
        let xml = r#"<manifestation package="no"/><manifest package="yes"/>"#;
        assert_eq!(package_from_manifest_str(xml).unwrap(), "yes");
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AndroidManifest.xml");
        std::fs::write(&path, r#"<manifest package="org.file"/>"#).unwrap();
        assert_eq!(package_from_manifest(&path).unwrap().unwrap(), "org.file");
    }
}
