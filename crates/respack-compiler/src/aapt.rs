use crate::backend::{IdCompiler, SymbolInvocation};
use crate::prereq::resolve_tool_path;
use crate::CompilerError;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Drives the Android SDK `aapt` binary in symbols-only mode.
pub struct AaptCompiler {
    path: PathBuf,
}

impl AaptCompiler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Arguments after the program name. `-S` roots keep invocation order so
    /// dependency roots are searched first.
    pub fn command_args(invocation: &SymbolInvocation) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "package".into(),
            "-m".into(),
            "-M".into(),
            invocation.manifest.clone().into(),
            "--no-crunch".into(),
            "--auto-add-overlay".into(),
            "--no-version-vectors".into(),
        ];
        for include in &invocation.include_resources {
            args.push("-I".into());
            args.push(include.clone().into());
        }
        args.push("--output-text-symbols".into());
        args.push(invocation.gen_dir.clone().into());
        args.push("-J".into());
        args.push(invocation.gen_dir.clone().into());
        args.push("--ignore-assets".into());
        args.push(invocation.ignore.as_str().into());
        for root in &invocation.search_roots {
            args.push("-S".into());
            args.push(root.clone().into());
        }
        args
    }
}

impl IdCompiler for AaptCompiler {
    fn name(&self) -> &'static str {
        "aapt"
    }

    fn available(&self) -> bool {
        resolve_tool_path(&self.path).is_some()
    }

    fn compile_symbols(&self, invocation: &SymbolInvocation) -> Result<(), CompilerError> {
        fs::create_dir_all(&invocation.gen_dir)?;
        let args = Self::command_args(invocation);
        debug!(
            "running {} {}",
            self.path.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.path).args(&args).output().map_err(|e| {
            CompilerError::ToolFailed {
                tool: self.path.display().to_string(),
                status: "not started".to_owned(),
                output: e.to_string(),
            }
        })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CompilerError::ToolFailed {
                tool: self.path.display().to_string(),
                status: output.status.to_string(),
                output: combined,
            });
        }
        Ok(())
    }
}
