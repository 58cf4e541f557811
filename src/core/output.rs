//! Decoding of script output.
//!
//! xmake scripts print either a JSON document or newline-delimited text,
//! optionally followed by the `__end__` marker and trailing diagnostics.
//! Only the part before the marker is significant.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::error::{BridgeError, BridgeResult};

/// Marker separating meaningful output from trailing diagnostics.
pub const SENTINEL: &str = "__end__";

/// Line separator used by list-valued scripts on this platform.
pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Decoded output of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutput {
    /// Output that is not valid JSON, trimmed.
    Text(String),

    /// Output that parsed as JSON.
    ///
    /// `raw` is the trimmed text the value was parsed from, so scalars such
    /// as `null` or `1e5` can still be read back as the script printed them.
    Structured { value: Value, raw: String },
}

impl ScriptOutput {
    /// Borrow the raw text, if this is a text result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured { .. } => None,
        }
    }

    /// Borrow the JSON value, if this is a structured result.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured { value, .. } => Some(value),
        }
    }

    /// Render the output as a single string.
    ///
    /// JSON strings are unwrapped; anything else is returned as printed.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Structured { value: Value::String(text), .. } => text,
            Self::Structured { raw, .. } => raw,
        }
    }

    /// Render the output as an ordered list of entries.
    ///
    /// A JSON array yields one entry per element; anything else is split on
    /// [`EOL`] as printed.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Structured { value: Value::Array(items), .. } => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
            Self::Text(text) | Self::Structured { value: Value::String(text), .. } => {
                split_lines(&text)
            }
            Self::Structured { raw, .. } => split_lines(&raw),
        }
    }

    /// Decode structured output into a typed value.
    ///
    /// `script` and `expected` only feed the error message.
    pub fn deserialize<T: DeserializeOwned>(
        self,
        script: &str,
        expected: &'static str,
    ) -> BridgeResult<T> {
        match self {
            Self::Structured { value, .. } => serde_json::from_value(value)
                .map_err(|source| BridgeError::Decode { script: script.to_string(), source }),
            Self::Text(_) => {
                Err(BridgeError::UnexpectedOutput { script: script.to_string(), expected })
            }
        }
    }
}

// Text serializes as a JSON string, structured output as its value.
impl Serialize for ScriptOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Structured { value, .. } => value.serialize(serializer),
        }
    }
}

impl std::fmt::Display for ScriptOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) | Self::Structured { raw: text, .. } => f.write_str(text),
        }
    }
}

/// Keep only the text before the first [`SENTINEL`], trimmed.
pub fn strip_sentinel(text: &str) -> &str {
    match text.find(SENTINEL) {
        Some(pos) => text[..pos].trim(),
        None => text.trim(),
    }
}

/// Trim raw stdout, drop the sentinel trailer and try JSON first.
pub fn parse_output(stdout: &str) -> ScriptOutput {
    let mut output = stdout.trim();
    if !output.is_empty() {
        output = strip_sentinel(output);
    }

    match serde_json::from_str::<Value>(output) {
        Ok(value) => ScriptOutput::Structured { value, raw: output.to_string() },
        Err(_) => ScriptOutput::Text(output.to_string()),
    }
}

/// Split text on the platform line separator.
///
/// Empty input yields no entries.
pub fn split_lines(text: &str) -> Vec<String> {
    split_lines_on(text, EOL)
}

/// Split text on an explicit separator.
pub fn split_lines_on(text: &str, separator: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(separator).map(str::to_string).collect()
}
