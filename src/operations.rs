//! Foreground process launches (editor, interactive implementation run).
//! These hand the terminal over to the child until it exits.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// A program to run with the terminal handed over to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ForegroundCommand {
    /// Open `file` in `editor`. The editor string may carry its own flags
    /// (e.g. `code --wait`).
    pub fn editor(editor: &str, file: &Path, working_dir: &Path) -> Self {
        let mut parts = editor.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let mut args: Vec<String> = parts.collect();
        args.push(file.to_string_lossy().to_string());
        Self {
            program,
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }
}

pub const DEFAULT_EDITOR: &str = "vim";

/// Configured editor, then `$EDITOR`, then vim
pub fn resolve_editor(configured: Option<&str>) -> String {
    configured
        .map(str::to_string)
        .filter(|e| !e.trim().is_empty())
        .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait ProcessLauncher {
    /// Run with inherited stdio and wait. Returns the exit code (-1 if killed
    /// by a signal).
    fn run_foreground(&self, command: &ForegroundCommand) -> Result<i32>;
}

pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn run_foreground(&self, command: &ForegroundCommand) -> Result<i32> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .status()
            .with_context(|| format!("Failed to launch {}", command.program))?;
        Ok(status.code().unwrap_or(-1))
    }
}
