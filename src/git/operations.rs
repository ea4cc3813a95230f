//! Version-control seam used by the close-and-commit flow.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

/// Operations the session needs from version control
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait VcsOperations: Send + Sync {
    /// Whether the project root is inside a repository
    fn is_repository(&self) -> bool;

    /// Whether the index holds anything to commit
    fn has_staged_changes(&self) -> bool;

    /// Commit the staged changes. Returns git's output on success; on failure
    /// the error carries git's combined output.
    fn commit(&self, message: &str) -> Result<String>;
}

/// Real implementation using the git CLI
pub struct RealGitOps {
    root: PathBuf,
}

impl RealGitOps {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl VcsOperations for RealGitOps {
    fn is_repository(&self) -> bool {
        super::is_git_repo(&self.root)
    }

    fn has_staged_changes(&self) -> bool {
        Command::new("git")
            .current_dir(&self.root)
            .args(["diff", "--cached", "--stat"])
            .output()
            .map(|o| o.status.success() && !String::from_utf8_lossy(&o.stdout).trim().is_empty())
            .unwrap_or(false)
    }

    fn commit(&self, message: &str) -> Result<String> {
        let output = Command::new("git")
            .current_dir(&self.root)
            .args(["commit", "-m", message])
            .output()
            .context("Failed to run git commit")?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            anyhow::bail!("git commit failed: {}", combined.trim());
        }
        Ok(combined)
    }
}
