//! Bridge error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while running an xmake script.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Script asset not found.
    #[error("Script asset not found: {0}")]
    ScriptNotFound(PathBuf),

    /// The executable could not be started.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The executable ran but reported failure.
    #[error("Script '{script}' exited with {}: {stderr}", exit_code_label(.code))]
    NonZeroExit { script: String, code: Option<i32>, stderr: String },

    /// Output was plain text where structured data was expected.
    #[error("Script '{script}' returned text, expected {expected}")]
    UnexpectedOutput { script: String, expected: &'static str },

    /// Structured output did not match the expected shape.
    #[error("Failed to decode output of script '{script}': {source}")]
    Decode {
        script: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl BridgeError {
    /// Whether this error means the script asset is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ScriptNotFound(_))
    }
}
