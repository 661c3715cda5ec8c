use crate::ConfigError;
use glob::Pattern;
use std::path::{Component, Path};

/// Files the ID compiler and the archive step must never see.
pub const DEFAULT_IGNORE_PATTERN: &str = concat!(
    "*OWNERS", // OWNERS files are allowed inside res/
    ":*.py",   // PRESUBMIT.py and friends
    ":*.pyc",
    ":*~",   // editor backups
    ":.*",   // dotfiles and dot directories
    ":*.d.stamp",
);

const STRIP_DRAWABLES_GLOB: &str = "*drawable*";

/// Colon-delimited ignore globs, in the syntax the ID compiler's
/// `--ignore-assets` flag accepts.
///
/// A leading `!` only silences the compiler's log line for the match, so it is
/// dropped before matching locally. `<dir>`/`<file>` prefixes are not supported.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    globs: Vec<Pattern>,
}

impl IgnorePattern {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut globs = Vec::new();
        for part in raw.split(':') {
            let part = part.trim_start_matches('!');
            if part.is_empty() {
                continue;
            }
            let glob = Pattern::new(part).map_err(|e| ConfigError::InvalidGlob {
                pattern: part.to_owned(),
                reason: e.msg.to_owned(),
            })?;
            globs.push(glob);
        }
        Ok(Self {
            raw: raw.to_owned(),
            globs,
        })
    }

    /// The pattern with drawables additionally excluded.
    #[must_use]
    pub fn with_stripped_drawables(&self) -> Self {
        let mut globs = self.globs.clone();
        if let Ok(glob) = Pattern::new(STRIP_DRAWABLES_GLOB) {
            globs.push(glob);
        }
        Self {
            raw: format!("{}:{STRIP_DRAWABLES_GLOB}", self.raw),
            globs,
        }
    }

    /// The colon-delimited form, as handed to the compiler.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether a directory-relative path is excluded: either the whole path or
    /// any one of its segments matches a glob.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let joined = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>();
        let full = joined.join("/");
        if self.globs.iter().any(|g| g.matches(&full)) {
            return true;
        }
        joined
            .iter()
            .any(|segment| self.globs.iter().any(|g| g.matches(segment)))
    }
}

impl Default for IgnorePattern {
    fn default() -> Self {
        // The built-in list is a compile-time constant of valid globs.
        Self::parse(DEFAULT_IGNORE_PATTERN).unwrap_or_else(|_| Self {
            raw: String::new(),
            globs: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ignores_dotfiles_and_backups() {
        let p = IgnorePattern::default();
        assert!(p.is_ignored(Path::new("values/.DS_Store")));
        assert!(p.is_ignored(Path::new(".git/config")));
        assert!(p.is_ignored(Path::new("values/strings.xml~")));
        assert!(p.is_ignored(Path::new("OWNERS")));
        assert!(p.is_ignored(Path::new("values/PRESUBMIT.py")));
        assert!(p.is_ignored(Path::new("layout/foo.d.stamp")));
    }

    #[test]
    fn default_keeps_resources() {
        let p = IgnorePattern::default();
        assert!(!p.is_ignored(Path::new("values/strings.xml")));
        assert!(!p.is_ignored(Path::new("drawable-hdpi/icon.png")));
    }

    #[test]
    fn strip_drawables_extends_pattern() {
        let p = IgnorePattern::default().with_stripped_drawables();
        assert!(p.is_ignored(Path::new("drawable-hdpi/icon.png")));
        assert!(p.as_str().ends_with(":*drawable*"));
        assert!(p.as_str().starts_with(DEFAULT_IGNORE_PATTERN));
        assert!(!p.is_ignored(Path::new("values/strings.xml")));
    }

    #[test]
    fn quiet_marker_is_stripped() {
        let p = IgnorePattern::parse("!*.txt").unwrap();
        assert!(p.is_ignored(Path::new("raw/notes.txt")));
        assert_eq!(p.as_str(), "!*.txt");
    }

    #[test]
    fn invalid_glob_is_config_error() {
        let err = IgnorePattern::parse("[").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }

    #[test]
    fn empty_segments_skipped() {
        let p = IgnorePattern::parse("::*.tmp:").unwrap();
        assert!(p.is_ignored(Path::new("a.tmp")));
        assert!(!p.is_ignored(Path::new("a.xml")));
    }
}
