//! Process execution module.
//!
//! Spawns the xmake executable and captures its output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::error::{BridgeError, BridgeResult};

/// A single process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run
    pub program: PathBuf,

    /// Arguments, passed verbatim
    pub args: Vec<String>,

    /// Environment variables set on top of the inherited environment
    pub env: Vec<(String, String)>,

    /// Working directory for the child
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), env: Vec::new(), working_dir: None }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Program name for logs and error messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,

    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Time taken to execute
    pub duration: Duration,
}

impl ProcessOutput {
    /// Check if the process succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can run an [`Invocation`] to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation and wait for it to exit.
    ///
    /// Only spawn failures are errors here; exit status is reported in the output.
    async fn run(&self, invocation: &Invocation) -> BridgeResult<ProcessOutput>;
}

/// Runner backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioRunner;

impl TokioRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(&self, invocation: &Invocation) -> BridgeResult<ProcessOutput> {
        let start = Instant::now();

        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args);

        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        if let Some(ref dir) = invocation.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd
            .output()
            .await
            .map_err(|source| BridgeError::Spawn { program: invocation.program_name(), source })?;

        let duration = start.elapsed();

        tracing::debug!(
            program = %invocation.program_name(),
            code = ?output.status.code(),
            elapsed_ms = duration.as_millis() as u64,
            "Process finished"
        );

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("xmake")
            .arg("l")
            .args(["script.lua", "app"])
            .env("COLORTERM", "nocolor")
            .current_dir("/tmp");

        assert_eq!(invocation.program, PathBuf::from("xmake"));
        assert_eq!(invocation.args, vec!["l", "script.lua", "app"]);
        assert_eq!(invocation.env, vec![("COLORTERM".to_string(), "nocolor".to_string())]);
        assert_eq!(invocation.working_dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_process_output_success() {
        let output = ProcessOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::ZERO,
        };
        assert!(output.success());
        assert!(!ProcessOutput { code: None, ..output.clone() }.success());
        assert!(!ProcessOutput { code: Some(1), ..output }.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_captures_output() {
        let runner = TokioRunner::new();
        let invocation = Invocation::new("sh").arg("-c").arg("echo hello; echo oops >&2");

        let output = runner.run(&invocation).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_env_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TokioRunner::new();
        let invocation = Invocation::new("sh")
            .args(["-c", "echo \"$COLORTERM\"; pwd"])
            .env("COLORTERM", "nocolor")
            .current_dir(dir.path());

        let output = runner.run(&invocation).await.unwrap();
        let mut lines = output.stdout.lines();
        assert_eq!(lines.next(), Some("nocolor"));

        let name = dir.path().file_name().unwrap().to_str().unwrap();
        assert!(lines.next().unwrap().ends_with(name));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_reports_exit_code() {
        let runner = TokioRunner::new();
        let output = runner.run(&Invocation::new("sh").args(["-c", "exit 3"])).await.unwrap();
        assert!(!output.success());
        assert_eq!(output.code, Some(3));
    }

    #[tokio::test]
    async fn test_tokio_runner_spawn_failure() {
        let runner = TokioRunner::new();
        let err = runner
            .run(&Invocation::new("definitely-not-a-real-xmake-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Spawn { .. }));
    }
}
