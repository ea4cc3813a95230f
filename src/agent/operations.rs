//! Trait for running the agent so the orchestrator can be tested with mocks.

use anyhow::Result;
use std::path::PathBuf;
use std::process::Command;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// One non-interactive agent invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub prompt: String,
    /// Model hint, e.g. a cheaper model for commit messages
    pub model: Option<String>,
    /// Continuation token of an earlier session to resume
    pub session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub text: String,
    pub session: Option<String>,
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait TaskRunner: Send + Sync {
    /// Run to completion. Blocks the calling thread.
    fn run(&self, request: &TaskRequest) -> Result<TaskOutput>;
}

/// Runs the `claude` CLI (or a compatible command) in the project root
pub struct ClaudeRunner {
    command: String,
    working_dir: PathBuf,
}

impl ClaudeRunner {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl TaskRunner for ClaudeRunner {
    fn run(&self, request: &TaskRequest) -> Result<TaskOutput> {
        let output = Command::new(&self.command)
            .current_dir(&self.working_dir)
            .args(super::build_args(request))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} exited with {}: {}", self.command, output.status, stderr.trim());
        }

        Ok(super::parse_response(&String::from_utf8_lossy(&output.stdout)))
    }
}
