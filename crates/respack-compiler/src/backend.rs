use crate::CompilerError;
use respack_schema::IgnorePattern;
use std::path::{Path, PathBuf};

/// Backend names accepted by [`select_compiler`].
pub const COMPILER_NAMES: &[&str] = &["aapt", "mock"];

/// One request for an identifier table.
#[derive(Debug, Clone)]
pub struct SymbolInvocation {
    /// Placeholder manifest; its package is never used.
    pub manifest: PathBuf,
    /// Resource roots in search order: dependency roots first, then the
    /// target's own directories. Later roots override earlier ones.
    pub search_roots: Vec<PathBuf>,
    /// Prebuilt resource packages consulted for reference resolution only.
    pub include_resources: Vec<PathBuf>,
    pub ignore: IgnorePattern,
    /// Directory receiving `R.txt` (and, for aapt, a throwaway `R.java`).
    pub gen_dir: PathBuf,
}

impl SymbolInvocation {
    pub fn r_txt_path(&self) -> PathBuf {
        self.gen_dir.join("R.txt")
    }
}

pub trait IdCompiler: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    /// Produce `R.txt` under `invocation.gen_dir`. An empty resource set may
    /// legitimately leave no table behind; callers handle that case.
    fn compile_symbols(&self, invocation: &SymbolInvocation) -> Result<(), CompilerError>;
}

pub fn select_compiler(
    name: &str,
    tool_path: Option<&Path>,
) -> Result<Box<dyn IdCompiler>, CompilerError> {
    match name {
        "aapt" => {
            let path = tool_path.ok_or_else(|| CompilerError::MissingToolPath(name.to_owned()))?;
            Ok(Box::new(crate::aapt::AaptCompiler::new(path)))
        }
        "mock" => Ok(Box::new(crate::mock::MockCompiler::new())),
        other => Err(CompilerError::UnknownBackend(other.to_owned())),
    }
}
