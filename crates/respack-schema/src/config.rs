use crate::ignore::IgnorePattern;
use crate::types::PackageName;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Temporary trees whose files are never recorded as provenance.
pub const DEFAULT_GENERATED_PREFIX: &str = "/tmp";

/// Everything one `prepare` invocation needs, for one resource target.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct PrepareConfig {
    /// ID compiler backend: `aapt` or `mock`.
    pub compiler: String,
    pub aapt_path: Option<PathBuf>,
    /// Newline-delimited list of this target's resource files.
    pub res_sources_path: Option<PathBuf>,
    /// Resource archives of transitive dependencies, in overlay order.
    pub dependencies_res_zips: Vec<PathBuf>,
    /// Reference-only archives (e.g. `android.jar`).
    pub include_resources: Vec<PathBuf>,
    pub extra_res_packages: Vec<String>,
    pub extra_r_text_files: Vec<PathBuf>,
    /// Prebuilt identifier table; skips the compiler entirely.
    pub r_text_in: Option<PathBuf>,
    pub custom_package: Option<String>,
    pub android_manifest: Option<PathBuf>,
    pub shared_resources: bool,
    pub strip_drawables: bool,
    pub resource_zip_out: Option<PathBuf>,
    pub r_text_out: Option<PathBuf>,
    pub srcjar_out: Option<PathBuf>,
    pub depfile: Option<PathBuf>,
    pub generated_prefixes: Vec<PathBuf>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            compiler: "aapt".to_owned(),
            aapt_path: None,
            res_sources_path: None,
            dependencies_res_zips: Vec::new(),
            include_resources: Vec::new(),
            extra_res_packages: Vec::new(),
            extra_r_text_files: Vec::new(),
            r_text_in: None,
            custom_package: None,
            android_manifest: None,
            shared_resources: false,
            strip_drawables: false,
            resource_zip_out: None,
            r_text_out: None,
            srcjar_out: None,
            depfile: None,
            generated_prefixes: vec![PathBuf::from(DEFAULT_GENERATED_PREFIX)],
        }
    }
}

impl PrepareConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_paths().is_empty() {
            return Err(ConfigError::NoOutputs);
        }
        if self.extra_res_packages.len() != self.extra_r_text_files.len() {
            return Err(ConfigError::ExtraTablesMismatch {
                packages: self.extra_res_packages.len(),
                tables: self.extra_r_text_files.len(),
            });
        }
        let compiler = self.compiler.trim().to_lowercase();
        if compiler == "aapt" && self.aapt_path.is_none() && self.r_text_in.is_none() {
            return Err(ConfigError::MissingCompilerPath);
        }
        Ok(())
    }

    /// Requested outputs in fixed order: archive, table, sources. The first
    /// one names the depfile target and the fingerprint record.
    pub fn output_paths(&self) -> Vec<&Path> {
        [&self.resource_zip_out, &self.r_text_out, &self.srcjar_out]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect()
    }

    pub fn ignore_pattern(&self) -> IgnorePattern {
        let base = IgnorePattern::default();
        if self.strip_drawables {
            base.with_stripped_drawables()
        } else {
            base
        }
    }

    pub fn extra_packages(&self) -> Vec<PackageName> {
        self.extra_res_packages
            .iter()
            .map(|p| PackageName::new(p.trim()))
            .collect()
    }

    pub fn custom_package(&self) -> Option<PackageName> {
        self.custom_package
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PackageName::new)
    }
}

/// Parse a GN list argument (`["a", "b"]`). Anything that does not start with
/// `[` is a single value; an empty string is an empty list.
pub fn parse_gn_list(value: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if !trimmed.starts_with('[') {
        return Ok(vec![trimmed.to_owned()]);
    }
    serde_json::from_str(trimmed).map_err(|e| ConfigError::InvalidGnList {
        value: trimmed.to_owned(),
        reason: e.to_string(),
    })
}
