// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark process execution.
//!
//! Spawns the external ring-buffer benchmark with flags derived from a
//! [`BufferConfig`], captures its output, and enforces a hard wall-clock
//! timeout. One short-lived OS process per call; a single attempt is the
//! complete contract - no retries, no persistent state.
//!
//! Every failure mode (missing executable, spawn error, timeout, nonzero
//! exit) is returned as a structured [`ExecutionResult`], never as `Err`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::types::{BufferConfig, ExecutionResult};

/// Default wall-clock bound for one benchmark execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Hint returned when the executable has not been built yet.
const BUILD_INSTRUCTIONS: &str =
    "Run: mkdir -p build && cd build && cmake .. -G Ninja && cmake --build .";

/// Launches the external benchmark program.
pub struct BenchmarkRunner {
    /// Benchmark repository root; the child's working directory.
    bench_root: PathBuf,
    /// Executable path, absolute or relative to `bench_root`.
    executable: PathBuf,
    /// Hard wall-clock bound per run.
    timeout: Duration,
}

impl BenchmarkRunner {
    /// Create a runner with the default 30s timeout.
    pub fn new(bench_root: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        Self {
            bench_root: bench_root.into(),
            executable: executable.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The benchmark repository root.
    pub fn bench_root(&self) -> &Path {
        &self.bench_root
    }

    /// Absolute-or-root-relative executable path, resolved.
    pub fn resolved_executable(&self) -> PathBuf {
        if self.executable.is_absolute() {
            self.executable.clone()
        } else {
            self.bench_root.join(&self.executable)
        }
    }

    /// Execute the benchmark once with the given configuration.
    pub async fn run(&self, config: &BufferConfig) -> ExecutionResult {
        let exe = self.resolved_executable();

        if !exe.exists() {
            tracing::warn!(path = %exe.display(), "Benchmark executable not found");
            let mut result = ExecutionResult::failure(
                config.clone(),
                format!(
                    "Benchmark executable not found at {}. Please build the project first.",
                    exe.display()
                ),
            );
            result.build_instructions = Some(BUILD_INSTRUCTIONS.to_string());
            return result;
        }

        let args = config.to_args();
        let command_line = std::iter::once(exe.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(command = %command_line, timeout_secs = self.timeout.as_secs(), "Spawning benchmark");

        let mut cmd = Command::new(&exe);
        cmd.args(&args)
            .current_dir(&self.bench_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the child with it.
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(command = %command_line, error = %e, "Failed to spawn benchmark");
                return ExecutionResult::failure(
                    config.clone(),
                    format!("Failed to launch benchmark: {}", e),
                );
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code();
                let success = output.status.success();

                tracing::info!(
                    success = success,
                    exit_code = ?exit_code,
                    "Benchmark run finished"
                );

                ExecutionResult {
                    success,
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    command: Some(command_line),
                    error: None,
                    build_instructions: None,
                    config: config.clone(),
                }
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Failed to collect benchmark output");
                ExecutionResult::failure(
                    config.clone(),
                    format!("Failed to execute benchmark: {}", e),
                )
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Benchmark run timed out; child killed"
                );
                ExecutionResult::failure(
                    config.clone(),
                    format!(
                        "Benchmark execution timed out after {} seconds",
                        self.timeout.as_secs()
                    ),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_executable_resolves_under_root() {
        let runner = BenchmarkRunner::new("/opt/bench", "build/ring-buffer-app");
        assert_eq!(
            runner.resolved_executable(),
            PathBuf::from("/opt/bench/build/ring-buffer-app")
        );
    }

    #[test]
    fn test_absolute_executable_kept() {
        let runner = BenchmarkRunner::new("/opt/bench", "/usr/local/bin/ring-buffer-app");
        assert_eq!(
            runner.resolved_executable(),
            PathBuf::from("/usr/local/bin/ring-buffer-app")
        );
    }
}
