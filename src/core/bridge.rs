//! The script bridge.
//!
//! Runs a named Lua asset through `xmake l` and decodes what it prints.

use std::path::PathBuf;

use super::config::BridgeConfig;
use super::error::{BridgeError, BridgeResult};
use super::output::{parse_output, ScriptOutput};
use super::process::{Invocation, ProcessRunner, TokioRunner};

/// xmake subcommand that loads and runs a Lua script.
pub const RUN_SCRIPT_FLAG: &str = "l";

/// Environment override that keeps ANSI colors out of the output.
pub const NO_COLOR_ENV: (&str, &str) = ("COLORTERM", "nocolor");

/// File extension of script assets.
pub const SCRIPT_EXTENSION: &str = "lua";

/// Adapter between callers and the xmake executable.
#[derive(Debug, Clone)]
pub struct ScriptBridge<R = TokioRunner> {
    config: BridgeConfig,
    runner: R,
}

impl ScriptBridge<TokioRunner> {
    /// Create a bridge that spawns real processes.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_runner(config, TokioRunner::new())
    }
}

impl<R: ProcessRunner> ScriptBridge<R> {
    /// Create a bridge with a custom process runner.
    pub fn with_runner(config: BridgeConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get the process runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Absolute path of the asset for `name`.
    pub fn script_path(&self, name: &str) -> PathBuf {
        let path = self.config.assets_dir.join(format!("{name}.{SCRIPT_EXTENSION}"));
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Check whether the asset for `name` exists.
    pub fn has_script(&self, name: &str) -> bool {
        self.script_path(name).is_file()
    }

    /// List the names of all available script assets, sorted.
    pub fn list_scripts(&self) -> BridgeResult<Vec<String>> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.assets_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(SCRIPT_EXTENSION)
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Build the invocation for a script without running it.
    pub fn invocation(&self, script_path: PathBuf, args: &[String]) -> Invocation {
        Invocation::new(&self.config.executable)
            .arg(RUN_SCRIPT_FLAG)
            .arg(script_path.to_string_lossy())
            .args(args.iter().cloned())
            .env(NO_COLOR_ENV.0, NO_COLOR_ENV.1)
            .current_dir(&self.config.working_dir)
    }

    /// Run the script `name` with `args` and decode its output.
    ///
    /// Returns `Ok(None)` without spawning anything when the asset does not
    /// exist. A non-zero exit is an error and no output is returned.
    pub async fn run_script(
        &self,
        name: &str,
        args: &[String],
    ) -> BridgeResult<Option<ScriptOutput>> {
        let script_path = self.script_path(name);
        if !script_path.is_file() {
            tracing::warn!(script = name, path = %script_path.display(), "Script asset not found, skipping");
            return Ok(None);
        }

        let invocation = self.invocation(script_path, args);
        tracing::debug!(
            script = name,
            program = %invocation.program_name(),
            args = ?invocation.args,
            "Running xmake script"
        );

        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            return Err(BridgeError::NonZeroExit {
                script: name.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(Some(parse_output(&output.stdout)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory runner for exercising the bridge without xmake.

    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::process::ProcessOutput;

    /// Records every invocation and answers with a canned output.
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<Invocation>>,
        pub stdout: String,
        pub code: Option<i32>,
    }

    impl RecordingRunner {
        pub fn replying(stdout: impl Into<String>) -> Self {
            Self { calls: Mutex::default(), stdout: stdout.into(), code: Some(0) }
        }

        pub fn failing(code: i32) -> Self {
            Self { calls: Mutex::default(), stdout: String::new(), code: Some(code) }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> BridgeResult<ProcessOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            Ok(ProcessOutput {
                code: self.code,
                stdout: self.stdout.clone(),
                stderr: "error: boom\n".to_string(),
                duration: Duration::ZERO,
            })
        }
    }

    /// Create an assets directory containing empty scripts for `names`.
    pub fn assets_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(format!("{name}.lua")), "-- test asset\n").unwrap();
        }
        dir
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::{assets_with, RecordingRunner};
    use super::*;

    fn bridge(assets: &tempfile::TempDir, runner: RecordingRunner) -> ScriptBridge<RecordingRunner> {
        let config = BridgeConfig::new("xmake", "/work/project", assets.path());
        ScriptBridge::with_runner(config, runner)
    }

    #[tokio::test]
    async fn test_existing_script_runs_once() {
        let assets = assets_with(&["targets"]);
        let bridge = bridge(&assets, RecordingRunner::replying("[1,2,3]__end__trailer\n"));

        let output = bridge.run_script("targets", &[]).await.unwrap().unwrap();
        assert_eq!(output.as_value(), Some(&json!([1, 2, 3])));

        let calls = bridge.runner().calls();
        assert_eq!(calls.len(), 1);

        let call = &calls[0];
        assert_eq!(call.program, PathBuf::from("xmake"));
        assert_eq!(call.args[0], "l");
        assert_eq!(PathBuf::from(&call.args[1]), bridge.script_path("targets"));
        assert!(PathBuf::from(&call.args[1]).is_absolute());
        assert_eq!(call.env, vec![("COLORTERM".to_string(), "nocolor".to_string())]);
        assert_eq!(call.working_dir, Some(PathBuf::from("/work/project")));
    }

    #[tokio::test]
    async fn test_arguments_follow_script_path() {
        let assets = assets_with(&["target_rundir"]);
        let bridge = bridge(&assets, RecordingRunner::replying("/build/linux/x86_64/release\n"));

        let args = vec!["app".to_string(), "--flag with spaces".to_string()];
        let output = bridge.run_script("target_rundir", &args).await.unwrap();
        assert_eq!(output, Some(ScriptOutput::Text("/build/linux/x86_64/release".into())));

        let calls = bridge.runner().calls();
        assert_eq!(&calls[0].args[2..], args.as_slice());
    }

    #[tokio::test]
    async fn test_missing_script_skips_process() {
        let assets = assets_with(&[]);
        let bridge = bridge(&assets, RecordingRunner::replying("unused"));

        let output = bridge.run_script("archs", &[]).await.unwrap();
        assert!(output.is_none());
        assert!(bridge.runner().calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let assets = assets_with(&["modes"]);
        let bridge = bridge(&assets, RecordingRunner::failing(1));

        let err = bridge.run_script("modes", &[]).await.unwrap_err();
        match err {
            BridgeError::NonZeroExit { script, code, stderr } => {
                assert_eq!(script, "modes");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "error: boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_scripts() {
        let assets = assets_with(&["targets", "config", "archs"]);
        std::fs::write(assets.path().join("README.md"), "not a script").unwrap();

        let bridge = bridge(&assets, RecordingRunner::default());
        assert_eq!(bridge.list_scripts().unwrap(), vec!["archs", "config", "targets"]);
        assert!(bridge.has_script("config"));
        assert!(!bridge.has_script("README"));
    }

    #[test]
    fn test_list_scripts_missing_dir() {
        let config = BridgeConfig::new("xmake", ".", "/nonexistent/assets");
        let bridge = ScriptBridge::with_runner(config, RecordingRunner::default());
        assert!(matches!(bridge.list_scripts(), Err(BridgeError::Io(_))));
    }
}
