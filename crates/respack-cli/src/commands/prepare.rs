use super::{json_pretty, CommandError, EXIT_SUCCESS, EXIT_TOOL_FAILURE};
use clap::Args;
use respack_compiler::{check_compiler_prereqs, format_missing};
use respack_core::{Engine, GateOutcome};
use respack_schema::{parse_gn_list, ConfigError, PrepareConfig};
use std::path::PathBuf;

/// Inputs of one `prepare` run. Flags override values loaded from `--config`.
///
/// List-valued flags may be repeated or given once as a GN list
/// (`'["a.zip", "b.zip"]'`).
#[derive(Debug, Default, Args)]
pub struct PrepareArgs {
    /// TOML file with a full invocation; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// ID compiler backend (aapt, mock).
    #[arg(long)]
    pub compiler: Option<String>,
    #[arg(long)]
    pub aapt_path: Option<PathBuf>,
    /// Newline-delimited list of the target's resource files.
    #[arg(long)]
    pub res_sources_path: Option<PathBuf>,
    #[arg(long = "dependencies-res-zips")]
    pub dependencies_res_zips: Vec<String>,
    #[arg(long = "include-resources")]
    pub include_resources: Vec<String>,
    #[arg(long = "extra-res-packages")]
    pub extra_res_packages: Vec<String>,
    #[arg(long = "extra-r-text-files")]
    pub extra_r_text_files: Vec<String>,
    /// Use this identifier table instead of running the compiler.
    #[arg(long)]
    pub r_text_in: Option<PathBuf>,
    #[arg(long)]
    pub custom_package: Option<String>,
    #[arg(long)]
    pub android_manifest: Option<PathBuf>,
    /// Emit the runtime package-id hook in every R class.
    #[arg(long)]
    pub shared_resources: bool,
    /// Leave drawable directories out of compilation and the archive.
    #[arg(long)]
    pub strip_drawables: bool,
    #[arg(long)]
    pub resource_zip_out: Option<PathBuf>,
    #[arg(long)]
    pub r_text_out: Option<PathBuf>,
    #[arg(long)]
    pub srcjar_out: Option<PathBuf>,
    #[arg(long)]
    pub depfile: Option<PathBuf>,
    /// Path prefix of generated files, excluded from the provenance record.
    #[arg(long = "generated-prefix")]
    pub generated_prefixes: Vec<PathBuf>,
}

fn expand_lists(values: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    for value in values {
        out.extend(parse_gn_list(value)?);
    }
    Ok(out)
}

fn expand_paths(values: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    Ok(expand_lists(values)?.into_iter().map(PathBuf::from).collect())
}

fn override_list<T>(target: &mut Vec<T>, values: Vec<T>) {
    if !values.is_empty() {
        *target = values;
    }
}

impl PrepareArgs {
    pub fn into_config(self) -> Result<PrepareConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PrepareConfig::load(path)?,
            None => PrepareConfig::default(),
        };

        if let Some(compiler) = self.compiler {
            config.compiler = compiler;
        }
        config.aapt_path = self.aapt_path.or(config.aapt_path);
        config.res_sources_path = self.res_sources_path.or(config.res_sources_path);
        override_list(
            &mut config.dependencies_res_zips,
            expand_paths(&self.dependencies_res_zips)?,
        );
        override_list(
            &mut config.include_resources,
            expand_paths(&self.include_resources)?,
        );
        override_list(
            &mut config.extra_res_packages,
            expand_lists(&self.extra_res_packages)?,
        );
        override_list(
            &mut config.extra_r_text_files,
            expand_paths(&self.extra_r_text_files)?,
        );
        config.r_text_in = self.r_text_in.or(config.r_text_in);
        config.custom_package = self.custom_package.or(config.custom_package);
        config.android_manifest = self.android_manifest.or(config.android_manifest);
        config.shared_resources |= self.shared_resources;
        config.strip_drawables |= self.strip_drawables;
        config.resource_zip_out = self.resource_zip_out.or(config.resource_zip_out);
        config.r_text_out = self.r_text_out.or(config.r_text_out);
        config.srcjar_out = self.srcjar_out.or(config.srcjar_out);
        config.depfile = self.depfile.or(config.depfile);
        override_list(&mut config.generated_prefixes, self.generated_prefixes);
        Ok(config)
    }
}

pub fn run(args: PrepareArgs, json_output: bool) -> Result<u8, CommandError> {
    let engine = Engine::new(args.into_config()?)?;
    let config = engine.config();

    if config.r_text_in.is_none() && std::env::var("RESPACK_SKIP_PREREQS").as_deref() != Ok("1") {
        let missing = check_compiler_prereqs(&config.compiler, config.aapt_path.as_deref());
        if !missing.is_empty() {
            return Err(CommandError::new(EXIT_TOOL_FAILURE, format_missing(&missing)));
        }
    }

    let report = engine.prepare()?;

    if json_output {
        let (status, reasons) = match &report.outcome {
            GateOutcome::Skipped => ("up_to_date", Vec::new()),
            GateOutcome::Ran { reasons } => ("prepared", reasons.clone()),
        };
        let json = serde_json::json!({
            "status": status,
            "reasons": reasons,
            "resource_dirs": report.resource_dirs,
            "depfile_deps": report.depfile_deps,
            "outputs": config.output_paths(),
        });
        println!("{}", json_pretty(&json)?);
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_gn_lists_and_repeats() {
        let args = PrepareArgs {
            dependencies_res_zips: vec![
                r#"["a.resources.zip", "b.resources.zip"]"#.to_owned(),
                "c.resources.zip".to_owned(),
            ],
            extra_res_packages: vec!["[]".to_owned()],
            r_text_out: Some(PathBuf::from("R.txt")),
            ..PrepareArgs::default()
        };
        let config = args.into_config().unwrap();
        assert_eq!(
            config.dependencies_res_zips,
            vec![
                PathBuf::from("a.resources.zip"),
                PathBuf::from("b.resources.zip"),
                PathBuf::from("c.resources.zip"),
            ]
        );
        assert!(config.extra_res_packages.is_empty());
        assert_eq!(config.generated_prefixes, vec![PathBuf::from("/tmp")]);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prepare.toml");
        std::fs::write(
            &path,
            r#"
compiler = "mock"
custom_package = "org.chromium.file"
r_text_out = "file/R.txt"
include_resources = ["android.jar"]
"#,
        )
        .unwrap();

        let args = PrepareArgs {
            config: Some(path),
            custom_package: Some("org.chromium.flag".to_owned()),
            shared_resources: true,
            ..PrepareArgs::default()
        };
        let config = args.into_config().unwrap();
        assert_eq!(config.compiler, "mock");
        assert_eq!(config.custom_package.as_deref(), Some("org.chromium.flag"));
        assert_eq!(config.r_text_out, Some(PathBuf::from("file/R.txt")));
        assert_eq!(config.include_resources, vec![PathBuf::from("android.jar")]);
        assert!(config.shared_resources);
    }

    #[test]
    fn malformed_gn_list_is_config_error() {
        let args = PrepareArgs {
            include_resources: vec!["[\"unterminated".to_owned()],
            ..PrepareArgs::default()
        };
        assert!(matches!(
            args.into_config(),
            Err(ConfigError::InvalidGnList { .. })
        ));
    }
}
