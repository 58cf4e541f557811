//! Typed xmake queries.
//!
//! Every query is one script asset run through the [`ScriptBridge`], with a
//! fixed post-processing step: a list of lines, a single string, or a JSON
//! document decoded into one of the types in [`types`].

mod types;

pub use types::{ExplorerInformations, ExplorerTarget, TargetEnv, TargetInformations, XmakeConfig};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::core::{
    BridgeConfig, BridgeError, BridgeResult, ProcessRunner, ScriptBridge, ScriptOutput,
    TokioRunner,
};

/// Script asset names, one per query.
pub mod scripts {
    pub const CONFIG: &str = "config";
    pub const NEW_FILES: &str = "newfiles";
    pub const FIND_GDB: &str = "find_gdb";
    pub const ARCHS: &str = "archs";
    pub const LANGUAGES: &str = "languages";
    pub const TEMPLATES: &str = "templates";
    pub const TOOLCHAINS: &str = "toolchains";
    pub const MODES: &str = "modes";
    pub const TARGETS: &str = "targets";
    pub const DEFAULT_TARGET: &str = "default_target";
    pub const TARGET_INFORMATIONS: &str = "target_informations";
    pub const TARGET_RUNDIR: &str = "target_rundir";
    pub const TARGET_PATH: &str = "targetpath";
    pub const EXPLORER: &str = "explorer";
    pub const UPDATE_INTELLISENSE: &str = "update_intellisense";
}

/// High-level xmake client.
#[derive(Debug, Clone)]
pub struct Xmake<R = TokioRunner> {
    bridge: ScriptBridge<R>,
}

impl Xmake<TokioRunner> {
    /// Create a client that spawns real xmake processes.
    pub fn new(config: BridgeConfig) -> Self {
        Self { bridge: ScriptBridge::new(config) }
    }
}

impl<R: ProcessRunner> Xmake<R> {
    /// Wrap an existing bridge.
    pub fn from_bridge(bridge: ScriptBridge<R>) -> Self {
        Self { bridge }
    }

    /// Get the underlying bridge.
    pub fn bridge(&self) -> &ScriptBridge<R> {
        &self.bridge
    }

    /// Run a script, turning a missing asset into [`BridgeError::ScriptNotFound`].
    async fn require(&self, script: &str, args: &[String]) -> BridgeResult<ScriptOutput> {
        self.bridge
            .run_script(script, args)
            .await?
            .ok_or_else(|| BridgeError::ScriptNotFound(self.bridge.script_path(script)))
    }

    async fn lines(&self, script: &str) -> BridgeResult<Vec<String>> {
        Ok(self.require(script, &[]).await?.into_lines())
    }

    async fn text(&self, script: &str, args: &[String]) -> BridgeResult<String> {
        Ok(self.require(script, args).await?.into_text())
    }

    async fn structured<T: DeserializeOwned>(
        &self,
        script: &str,
        args: &[String],
        expected: &'static str,
    ) -> BridgeResult<T> {
        self.require(script, args).await?.deserialize(script, expected)
    }

    /// Current platform, architecture and mode.
    pub async fn config(&self) -> BridgeResult<XmakeConfig> {
        self.structured(scripts::CONFIG, &[], "a configuration object").await
    }

    /// Files added to the project since the last query.
    pub async fn new_files(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::NEW_FILES).await
    }

    /// Path of the GNU debugger xmake would use.
    pub async fn gdb_path(&self) -> BridgeResult<String> {
        self.text(scripts::FIND_GDB, &[]).await
    }

    /// Architectures of the current platform.
    pub async fn archs(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::ARCHS).await
    }

    /// Languages usable with `xmake create`.
    pub async fn languages(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::LANGUAGES).await
    }

    /// Project templates usable with `xmake create`.
    pub async fn templates(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::TEMPLATES).await
    }

    /// Available toolchains.
    pub async fn toolchains(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::TOOLCHAINS).await
    }

    /// Build modes declared by the project.
    pub async fn modes(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::MODES).await
    }

    /// All targets of the project.
    pub async fn targets(&self) -> BridgeResult<Vec<String>> {
        self.lines(scripts::TARGETS).await
    }

    /// The default target.
    pub async fn default_target(&self) -> BridgeResult<String> {
        self.text(scripts::DEFAULT_TARGET, &[]).await
    }

    /// Run directory, artifact path and environment of a target.
    pub async fn target_informations(&self, target: &str) -> BridgeResult<TargetInformations> {
        self.structured(scripts::TARGET_INFORMATIONS, &[target.to_string()], "target information")
            .await
    }

    /// Directory a target runs in.
    pub async fn target_rundir(&self, target: &str) -> BridgeResult<String> {
        self.text(scripts::TARGET_RUNDIR, &[target.to_string()]).await
    }

    /// Environment variables needed to run a target.
    ///
    /// Read from the `envs` field of [`Self::target_informations`].
    pub async fn target_run_envs(&self, target: &str) -> BridgeResult<Vec<TargetEnv>> {
        Ok(self.target_informations(target).await?.envs)
    }

    /// Path of the artifact a target builds.
    pub async fn target_path(&self, target: &str) -> BridgeResult<String> {
        self.text(scripts::TARGET_PATH, &[target.to_string()]).await
    }

    /// Options and targets for the project explorer.
    pub async fn explorer(&self) -> BridgeResult<ExplorerInformations> {
        self.structured(scripts::EXPLORER, &[], "explorer information").await
    }

    /// Regenerate `compile_commands.json` for language servers.
    pub async fn update_intellisense(&self) -> BridgeResult<()> {
        self.require(scripts::UPDATE_INTELLISENSE, &[]).await?;
        Ok(())
    }
}

impl<R: ProcessRunner + 'static> Xmake<R> {
    /// Start [`Self::update_intellisense`] in the background.
    ///
    /// Failures are logged, never returned.
    pub fn spawn_update_intellisense(self: &Arc<Self>) -> JoinHandle<()> {
        let xmake = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = xmake.update_intellisense().await {
                tracing::warn!(error = %e, "Failed to update intellisense");
            }
        })
    }
}
