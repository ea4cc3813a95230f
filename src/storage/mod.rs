//! Persistence of issue documents behind the `IssueStore` seam.

mod file_store;
pub mod frontmatter;

pub use file_store::FileStore;

use std::path::PathBuf;

#[cfg(any(test, feature = "test-mocks"))]
use mockall::automock;

use crate::issue::{FilterMode, Issue, IssueStatus, IssueType};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize: {0}")]
    Serialize(String),
    #[error("issue not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the interactive session reads or writes on disk
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait IssueStore: Send + Sync {
    /// Issues matching the filter, in index order
    fn load_issues(&self, filter: FilterMode) -> StoreResult<Vec<Issue>>;

    /// Issue as described by its brief.md (body included), `None` if missing
    fn load_brief(&self, id: &str) -> StoreResult<Option<Issue>>;

    fn save_brief(&self, issue: &Issue) -> StoreResult<()>;

    /// Allocate the next id, write brief + index and stage both
    fn create_issue(&self, title: &str, issue_type: IssueType) -> StoreResult<Issue>;

    /// Update status in brief and index; `reason` is recorded as the discard reason
    fn update_status(&self, id: &str, status: IssueStatus, reason: Option<String>) -> StoreResult<()>;

    /// Copy title/type from an edited brief.md back into the index when they diverge
    fn sync_brief_to_index(&self, id: &str) -> StoreResult<()>;

    fn analysis_exists(&self, id: &str) -> bool;
    fn plan_exists(&self, id: &str) -> bool;

    fn load_analysis(&self, id: &str) -> StoreResult<String>;
    fn save_analysis(&self, id: &str, content: &str) -> StoreResult<()>;
    fn load_plan(&self, id: &str) -> StoreResult<String>;
    fn save_plan(&self, id: &str, content: &str) -> StoreResult<()>;

    /// Continuation token of the agent session that produced the analysis
    fn load_session(&self, id: &str) -> StoreResult<Option<String>>;
    fn save_session(&self, id: &str, token: &str) -> StoreResult<()>;

    /// Stage brief, analysis, plan and index (best-effort)
    fn stage_issue_files(&self, id: &str);

    fn brief_path(&self, id: &str) -> PathBuf;
    fn analysis_path(&self, id: &str) -> PathBuf;
    fn plan_path(&self, id: &str) -> PathBuf;
}
