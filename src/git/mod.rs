mod operations;

pub use operations::*;

use std::path::{Path, PathBuf};
use std::process::Command;

/// Check if a path is inside a git repository
pub fn is_git_repo(path: &Path) -> bool {
    Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Stage the given files. Paths that don't exist are skipped and any git
/// failure (including not being in a repository) is ignored.
pub fn stage(root: &Path, paths: &[PathBuf]) {
    let existing: Vec<&PathBuf> = paths.iter().filter(|p| p.exists()).collect();
    if existing.is_empty() {
        return;
    }

    let result = Command::new("git")
        .current_dir(root)
        .arg("add")
        .args(existing.iter().map(|p| p.as_os_str()))
        .output();

    match result {
        Ok(output) if !output.status.success() => {
            tracing::debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git add skipped"
            );
        }
        Err(err) => tracing::debug!(error = %err, "git add could not run"),
        _ => {}
    }
}
