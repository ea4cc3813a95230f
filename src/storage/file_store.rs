use std::path::{Path, PathBuf};

use super::frontmatter::{self, Frontmatter};
use super::{IssueStore, StoreError, StoreResult};
use crate::issue::{FilterMode, Issue, IssueIndex, IssueStatus, IssueType};

/// Markdown-on-disk store rooted at `<project>/issues`:
///
/// ```text
/// issues/index.toml
/// issues/<id>/brief.md      (+++ frontmatter +++ body)
/// issues/<id>/analysis.md
/// issues/<id>/plan.md
/// issues/<id>/.session
/// ```
pub struct FileStore {
    project_root: PathBuf,
    issues_dir: PathBuf,
}

impl FileStore {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let issues_dir = project_root.join("issues");
        Self {
            project_root,
            issues_dir,
        }
    }

    pub fn ensure_issues_dir(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.issues_dir).map_err(|source| StoreError::Io {
            path: self.issues_dir.clone(),
            source,
        })
    }

    pub fn index_path(&self) -> PathBuf {
        self.issues_dir.join("index.toml")
    }

    pub fn issue_dir(&self, id: &str) -> PathBuf {
        self.issues_dir.join(id)
    }

    pub fn session_path(&self, id: &str) -> PathBuf {
        self.issue_dir(id).join(".session")
    }

    pub fn load_index(&self) -> StoreResult<IssueIndex> {
        let path = self.index_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(IssueIndex::default());
        };
        toml::from_str(&content).map_err(|e| StoreError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save_index(&self, index: &IssueIndex) -> StoreResult<()> {
        self.ensure_issues_dir()?;
        let content = toml::to_string_pretty(index).map_err(|e| StoreError::Serialize(e.to_string()))?;
        write(&self.index_path(), &content)
    }

    fn stage(&self, paths: &[PathBuf]) {
        crate::git::stage(&self.project_root, paths);
    }

    fn save_text(&self, path: PathBuf, content: &str) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write(&path, content)?;
        self.stage(&[path, self.index_path()]);
        Ok(())
    }

    fn load_text(&self, id: &str, path: PathBuf) -> StoreResult<String> {
        read_optional(&path)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl IssueStore for FileStore {
    fn load_issues(&self, filter: FilterMode) -> StoreResult<Vec<Issue>> {
        Ok(self.load_index()?.filtered(filter))
    }

    fn load_brief(&self, id: &str) -> StoreResult<Option<Issue>> {
        let path = self.brief_path(id);
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        let (fm, body) = frontmatter::parse(&content).map_err(|e| StoreError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let index = self.load_index()?;
        let indexed = index.get(id);

        // A brief without frontmatter is all body; metadata comes from the index
        let Some(fm) = fm else {
            let mut issue = indexed
                .cloned()
                .unwrap_or_else(|| Issue::new(id, id, IssueType::Feature));
            issue.body = body;
            return Ok(Some(issue));
        };
        Ok(Some(fm.into_issue(id, body, indexed)))
    }

    fn save_brief(&self, issue: &Issue) -> StoreResult<()> {
        let dir = self.issue_dir(&issue.id);
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })?;
        let content = frontmatter::render(&Frontmatter::from_issue(issue), &issue.body)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        write(&self.brief_path(&issue.id), &content)
    }

    fn create_issue(&self, title: &str, issue_type: IssueType) -> StoreResult<Issue> {
        let mut index = self.load_index()?;
        let issue = Issue::new(index.next_id(), title, issue_type);

        self.save_brief(&issue)?;
        index.issues.push(issue.clone());
        self.save_index(&index)?;
        self.stage(&[self.index_path(), self.brief_path(&issue.id)]);

        tracing::info!(id = %issue.id, "created issue");
        Ok(issue)
    }

    fn update_status(&self, id: &str, status: IssueStatus, reason: Option<String>) -> StoreResult<()> {
        let mut brief = self
            .load_brief(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        brief.status = status;
        if reason.is_some() {
            brief.discard_reason = reason;
        }
        self.save_brief(&brief)?;

        let mut index = self.load_index()?;
        if let Some(entry) = index.get_mut(id) {
            entry.status = status;
            entry.discard_reason = brief.discard_reason.clone();
            self.save_index(&index)?;
        }

        self.stage(&[self.index_path(), self.brief_path(id)]);
        Ok(())
    }

    fn sync_brief_to_index(&self, id: &str) -> StoreResult<()> {
        let Some(brief) = self.load_brief(id)? else {
            return Ok(());
        };
        let mut index = self.load_index()?;
        let Some(entry) = index.get_mut(id) else {
            return Ok(());
        };
        if entry.title == brief.title && entry.issue_type == brief.issue_type {
            return Ok(());
        }

        entry.title = brief.title;
        entry.issue_type = brief.issue_type;
        self.save_index(&index)?;
        self.stage(&[self.index_path()]);
        Ok(())
    }

    fn analysis_exists(&self, id: &str) -> bool {
        self.analysis_path(id).exists()
    }

    fn plan_exists(&self, id: &str) -> bool {
        self.plan_path(id).exists()
    }

    fn load_analysis(&self, id: &str) -> StoreResult<String> {
        self.load_text(id, self.analysis_path(id))
    }

    fn save_analysis(&self, id: &str, content: &str) -> StoreResult<()> {
        self.save_text(self.analysis_path(id), content)
    }

    fn load_plan(&self, id: &str) -> StoreResult<String> {
        self.load_text(id, self.plan_path(id))
    }

    fn save_plan(&self, id: &str, content: &str) -> StoreResult<()> {
        self.save_text(self.plan_path(id), content)
    }

    fn load_session(&self, id: &str) -> StoreResult<Option<String>> {
        Ok(read_optional(&self.session_path(id))?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    fn save_session(&self, id: &str, token: &str) -> StoreResult<()> {
        write(&self.session_path(id), token)
    }

    fn stage_issue_files(&self, id: &str) {
        self.stage(&[
            self.brief_path(id),
            self.analysis_path(id),
            self.plan_path(id),
            self.index_path(),
        ]);
    }

    fn brief_path(&self, id: &str) -> PathBuf {
        self.issue_dir(id).join("brief.md")
    }

    fn analysis_path(&self, id: &str) -> PathBuf {
        self.issue_dir(id).join("analysis.md")
    }

    fn plan_path(&self, id: &str) -> PathBuf {
        self.issue_dir(id).join("plan.md")
    }
}

fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write(path: &Path, content: &str) -> StoreResult<()> {
    std::fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
