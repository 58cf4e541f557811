//! # xmake-bridge
//!
//! Run xmake Lua query scripts and decode their output.
//!
//! Editor integrations ask xmake about a project (targets, modes, toolchains,
//! run environments) by running small Lua scripts through `xmake l`. This
//! crate locates those scripts, runs them, drops the `__end__` trailer from
//! what they print and hands back either JSON or plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xmake_bridge::{BridgeConfig, Xmake};
//!
//! # async fn demo() -> xmake_bridge::BridgeResult<()> {
//! let config = BridgeConfig::default().with_working_dir("/path/to/project");
//! let xmake = Xmake::new(config);
//!
//! for target in xmake.targets().await? {
//!     println!("{target}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod xmake;

// Re-export commonly used types
pub use crate::core::{BridgeConfig, BridgeError, BridgeResult, ScriptBridge, ScriptOutput};
pub use xmake::Xmake;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "xmake-bridge";
