//! Core types and functionality for xmake-bridge.
//!
//! This module contains the script bridge and what it is built from:
//! configuration, process execution, output decoding and errors.

mod bridge;
mod config;
mod error;
pub mod output;
mod process;

pub use bridge::{ScriptBridge, NO_COLOR_ENV, RUN_SCRIPT_FLAG, SCRIPT_EXTENSION};
pub use config::{BridgeConfig, LOCAL_CONFIG_FILE};
pub use error::{BridgeError, BridgeResult};
pub use output::{parse_output, split_lines, strip_sentinel, ScriptOutput, EOL, SENTINEL};
pub use process::{Invocation, ProcessOutput, ProcessRunner, TokioRunner};

#[cfg(test)]
pub(crate) use bridge::testing;
