use crate::completeness::verify_sources_listed;
use crate::deps::extract_deps;
use crate::gate::{GateOutcome, StalenessGate};
use crate::idtable::generate_id_table;
use crate::merge::{merge_resource_dirs, write_resource_zip};
use crate::rjava::{create_r_java_files, DependencyTable, RJavaOptions};
use crate::symbols::IdentifierTable;
use crate::walker::Walker;
use crate::CoreError;
use respack_compiler::{resolve_tool_path, select_compiler, CompilerError};
use respack_schema::{
    package_from_manifest, read_sources_list, resource_dirs_from_sources, ConfigError,
    IgnorePattern, PackageName, PrepareConfig,
};
use respack_store::{copy_atomic, pack_dir, BuildLayout};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Placeholder `.keep` files under `empty/` keep otherwise empty resource
/// directories in version control; they never reach the depfile.
fn is_keep_file(relative: &str) -> bool {
    relative == "empty/.keep" || relative.ends_with("/empty/.keep")
}

/// Result of one `prepare` invocation.
#[derive(Debug)]
pub struct PrepareReport {
    pub outcome: GateOutcome,
    pub resource_dirs: Vec<PathBuf>,
    /// Resource files listed in the depfile.
    pub depfile_deps: Vec<String>,
}

/// Runs the resource pipeline for one target.
pub struct Engine {
    config: PrepareConfig,
}

impl Engine {
    /// Validate `config` and wrap it.
    pub fn new(config: PrepareConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    fn declared_sources(&self) -> Result<Vec<PathBuf>, CoreError> {
        match &self.config.res_sources_path {
            Some(path) => Ok(read_sources_list(path)?),
            None => Ok(Vec::new()),
        }
    }

    /// The staleness gate for this invocation, with every input that can
    /// change the outputs. Also returns the depfile dependencies.
    pub fn build_gate(&self, resource_dirs: &[PathBuf]) -> Result<(StalenessGate, Vec<String>), CoreError> {
        let config = &self.config;
        let outputs = config.output_paths().into_iter().map(Path::to_path_buf).collect();
        let mut gate = StalenessGate::new(outputs)?;

        let mut depfile_deps = Vec::new();
        let mut resource_names = Vec::new();
        let mut resource_files = Vec::new();
        for dir in resource_dirs {
            for file in Walker::unfiltered(dir)? {
                let file = file?;
                if !is_keep_file(&file.relative) {
                    depfile_deps.push(file.source.display().to_string());
                    resource_files.push(file.source);
                }
                resource_names.push(file.relative);
            }
        }
        // File names shape the output even when contents do not change.
        resource_names.sort();

        let inputs = gate.inputs_mut();
        inputs
            .add_literals(config.extra_res_packages.iter().map(|p| format!("extra_package={p}")))
            .add_literal(format!(
                "custom_package={}",
                config.custom_package.as_deref().unwrap_or_default()
            ))
            .add_literal(format!("shared_resources={}", config.shared_resources))
            .add_literal(format!("strip_drawables={}", config.strip_drawables))
            .add_literal(format!("compiler={}", config.compiler));
        if config.r_text_in.is_none() && config.compiler == "aapt" {
            if let Some(tool) = &config.aapt_path {
                let resolved = resolve_tool_path(tool)
                    .ok_or_else(|| CompilerError::Unavailable(tool.display().to_string()))?;
                debug!("aapt resolved to {}", resolved.display());
                inputs.add_path(resolved);
            }
        }
        inputs
            .add_paths(config.res_sources_path.iter())
            .add_paths(config.android_manifest.iter())
            .add_paths(&config.include_resources)
            .add_paths(&config.dependencies_res_zips)
            .add_paths(&config.extra_r_text_files)
            .add_paths(config.r_text_in.iter())
            .add_paths(resource_files)
            .add_literals(resource_names.into_iter().map(|n| format!("resource={n}")));

        if let Some(depfile) = &config.depfile {
            gate = gate.with_depfile(depfile, depfile_deps.clone());
        }
        Ok((gate, depfile_deps))
    }

    /// Run the pipeline if any input changed; always refresh the depfile.
    pub fn prepare(&self) -> Result<PrepareReport, CoreError> {
        let sources = self.declared_sources()?;
        let resource_dirs = resource_dirs_from_sources(&sources)?;
        for dir in &resource_dirs {
            if !dir.is_dir() {
                return Err(ConfigError::MissingResourceDir(dir.clone()).into());
            }
        }
        debug!("{} resource directories", resource_dirs.len());

        let (gate, depfile_deps) = self.build_gate(&resource_dirs)?;
        let outcome = gate.run_if_stale(|| self.run_pipeline(&sources, &resource_dirs))?;

        Ok(PrepareReport {
            outcome,
            resource_dirs,
            depfile_deps,
        })
    }

    fn target_package(&self) -> Result<Option<PackageName>, CoreError> {
        if let Some(package) = self.config.custom_package() {
            return Ok(Some(package));
        }
        match &self.config.android_manifest {
            Some(manifest) => Ok(package_from_manifest(manifest)?),
            None => Ok(None),
        }
    }

    fn run_pipeline(&self, sources: &[PathBuf], resource_dirs: &[PathBuf]) -> Result<(), CoreError> {
        let config = &self.config;
        info!("preparing resources from {} directories", resource_dirs.len());

        if !sources.is_empty() {
            verify_sources_listed(sources, resource_dirs, &IgnorePattern::default())?;
        }

        let layout = BuildLayout::temporary()?;
        layout.initialize()?;
        let ignore = config.ignore_pattern();

        let r_txt = if let Some(prebuilt) = &config.r_text_in {
            debug!("using prebuilt identifier table {}", prebuilt.display());
            prebuilt.clone()
        } else {
            let dep_subdirs = extract_deps(&config.dependencies_res_zips, &layout.deps_dir())?;
            let compiler = select_compiler(&config.compiler, config.aapt_path.as_deref())?;
            generate_id_table(
                compiler.as_ref(),
                &layout,
                resource_dirs,
                &dep_subdirs,
                &config.include_resources,
                &ignore,
            )?
        };

        if let Some(out) = &config.r_text_out {
            copy_atomic(&r_txt, out)?;
        }

        if let Some(srcjar) = &config.srcjar_out {
            let main = IdentifierTable::load(&r_txt)?;
            let dependencies = config
                .extra_packages()
                .into_iter()
                .zip(&config.extra_r_text_files)
                .map(|(package, path)| DependencyTable::load(package, path))
                .collect::<Result<Vec<_>, _>>()?;
            let package = self.target_package()?;
            let written = create_r_java_files(
                &layout.srcjar_dir(),
                package.as_ref(),
                &main,
                &dependencies,
                RJavaOptions::for_prepare(config.shared_resources),
            )?;
            info!("generated {} R.java files into {}", written.len(), srcjar.display());
            pack_dir(&layout.srcjar_dir(), srcjar)?;
        }

        if let Some(zip) = &config.resource_zip_out {
            let merged = merge_resource_dirs(resource_dirs, &ignore, &config.generated_prefixes)?;
            write_resource_zip(&merged, zip)?;
        }
        Ok(())
    }
}
