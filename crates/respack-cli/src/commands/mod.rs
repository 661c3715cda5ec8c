pub mod check_sources;
pub mod completions;
pub mod doctor;
pub mod prepare;

use respack_compiler::CompilerError;
use respack_core::CoreError;
use respack_schema::ConfigError;
use std::fmt;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_UNLISTED_SOURCES: u8 = 3;
pub const EXIT_TOOL_FAILURE: u8 = 4;

/// A failed command: the message for stderr and the process exit code.
#[derive(Debug)]
pub struct CommandError {
    pub code: u8,
    pub message: String,
}

impl CommandError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn exit_code_for(err: &CoreError) -> u8 {
    match err {
        CoreError::Config(_)
        | CoreError::DuplicatePackage(_)
        | CoreError::Compiler(CompilerError::UnknownBackend(_) | CompilerError::MissingToolPath(_)) => {
            EXIT_CONFIG_ERROR
        }
        CoreError::UnlistedResources(_) => EXIT_UNLISTED_SOURCES,
        CoreError::Compiler(_) => EXIT_TOOL_FAILURE,
        CoreError::Store(_) | CoreError::MalformedTable { .. } | CoreError::Io(_) => EXIT_FAILURE,
    }
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        Self::new(exit_code_for(&err), err.to_string())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::new(EXIT_CONFIG_ERROR, format!("configuration error: {err}"))
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CommandError::new(EXIT_FAILURE, format!("JSON serialization failed: {e}")))
}
