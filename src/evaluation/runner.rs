//! Isolated subprocess execution of candidate code against a single test
//! input, with guaranteed kill-on-timeout.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn interpreter: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Outcome of running candidate code against one input.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub runtime: f64,
}

/// Executes candidate code against a single stdin payload under a wall-clock
/// timeout. Implementations must not leak subprocesses on timeout.
#[async_trait]
pub trait ProgramRunner: Send + Sync {
    async fn run(&self, code: &str, input: &str, timeout: Duration) -> Result<RunResult, RunnerError>;
}

/// Production runner: pipes `code` to a `python3` interpreter subprocess
/// with `input` on stdin, killing the process (and its process group on
/// Unix) if it exceeds `timeout`.
pub struct SubprocessRunner {
    interpreter: String,
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }
}

impl SubprocessRunner {
    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

#[async_trait]
impl ProgramRunner for SubprocessRunner {
    async fn run(&self, code: &str, input: &str, timeout: Duration) -> Result<RunResult, RunnerError> {
        use std::io::Write as _;
        use tokio::io::AsyncWriteExt as _;

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg("-c").arg(code);
        cmd.stdin(std::process::Stdio::piped());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(RunnerError::Spawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(input.as_bytes()).await;
        }

        let start = std::time::Instant::now();
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(RunResult {
                timed_out: false,
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                runtime: start.elapsed().as_secs_f64(),
            }),
            Ok(Err(e)) => {
                let _ = std::io::stderr().flush();
                Ok(RunResult {
                    timed_out: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("io error waiting on child: {e}"),
                    runtime: start.elapsed().as_secs_f64(),
                })
            }
            Err(_) => Ok(RunResult {
                timed_out: true,
                exit_code: None,
                stdout: String::new(),
                stderr: "timed out".to_string(),
                runtime: timeout.as_secs_f64(),
            }),
        }
    }
}

#[cfg(test)]
/// A deterministic stub used by evaluation-pipeline tests: returns a fixed
/// output for a given input, or simulates a timeout/non-zero exit.
pub struct StubRunner {
    pub outputs: std::collections::HashMap<String, RunResult>,
    pub default: RunResult,
}

#[cfg(test)]
impl StubRunner {
    pub fn new(default: RunResult) -> Self {
        Self {
            outputs: std::collections::HashMap::new(),
            default,
        }
    }

    pub fn with_output(mut self, input: impl Into<String>, result: RunResult) -> Self {
        self.outputs.insert(input.into(), result);
        self
    }
}

#[cfg(test)]
#[async_trait]
impl ProgramRunner for StubRunner {
    async fn run(&self, _code: &str, input: &str, _timeout: Duration) -> Result<RunResult, RunnerError> {
        Ok(self.outputs.get(input).cloned().unwrap_or_else(|| self.default.clone()))
    }
}

#[cfg(test)]
pub fn passing_result(stdout: impl Into<String>) -> RunResult {
    RunResult {
        timed_out: false,
        exit_code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
        runtime: 0.01,
    }
}
