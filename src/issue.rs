use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Analyzed,
    Planned,
    Implemented,
    Closed,
    Invalid,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Analyzed => "analyzed",
            IssueStatus::Planned => "planned",
            IssueStatus::Implemented => "implemented",
            IssueStatus::Closed => "closed",
            IssueStatus::Invalid => "invalid",
        }
    }

    /// Closed and Invalid are terminal
    pub fn is_closed(&self) -> bool {
        matches!(self, IssueStatus::Closed | IssueStatus::Invalid)
    }

    /// Single-column glyph shown in the list
    pub fn icon(&self) -> &'static str {
        match self {
            IssueStatus::Open => "○",
            IssueStatus::Analyzed => "◐",
            IssueStatus::Planned => "●",
            IssueStatus::Implemented => "◉",
            IssueStatus::Closed => "✓",
            IssueStatus::Invalid => "✗",
        }
    }
}

/// Category of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Feature,
    Bug,
    Refactor,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Feature => "feature",
            IssueType::Bug => "bug",
            IssueType::Refactor => "refactor",
        }
    }

    /// Emoji shown in the list (two columns wide)
    pub fn icon(&self) -> &'static str {
        match self {
            IssueType::Feature => "💡",
            IssueType::Bug => "💥",
            IssueType::Refactor => "🔧",
        }
    }
}

/// An issue as tracked in the index. The body lives in brief.md and is only
/// populated when the brief is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub created: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_reason: Option<String>,
    #[serde(skip)]
    pub body: String,
}

impl Issue {
    pub fn new(id: impl Into<String>, title: impl Into<String>, issue_type: IssueType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            issue_type,
            status: IssueStatus::Open,
            created: Local::now().date_naive(),
            discard_reason: None,
            body: String::new(),
        }
    }
}

/// Which statuses the list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Active,
    All,
    Closed,
}

impl FilterMode {
    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::Active => "Active",
            FilterMode::All => "All",
            FilterMode::Closed => "Closed",
        }
    }

    /// Active -> All -> Closed -> Active
    pub fn next(&self) -> Self {
        match self {
            FilterMode::Active => FilterMode::All,
            FilterMode::All => FilterMode::Closed,
            FilterMode::Closed => FilterMode::Active,
        }
    }

    pub fn includes(&self, status: IssueStatus) -> bool {
        match self {
            FilterMode::Active => matches!(
                status,
                IssueStatus::Open | IssueStatus::Analyzed | IssueStatus::Planned
            ),
            FilterMode::All => true,
            FilterMode::Closed => status.is_closed(),
        }
    }
}

/// Ordered collection of every issue in the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueIndex {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl IssueIndex {
    /// Next sequential id, 4-digit zero padded
    pub fn next_id(&self) -> String {
        let max = self
            .issues
            .iter()
            .filter_map(|i| i.id.trim().parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{:04}", max + 1)
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Issue> {
        self.issues.iter_mut().find(|i| i.id == id)
    }

    pub fn filtered(&self, filter: FilterMode) -> Vec<Issue> {
        self.issues
            .iter()
            .filter(|i| filter.includes(i.status))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_starts_at_one() {
        assert_eq!(IssueIndex::default().next_id(), "0001");
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let index = IssueIndex {
            issues: vec![
                Issue::new("0001", "a", IssueType::Bug),
                Issue::new("0007", "b", IssueType::Bug),
                Issue::new("0003", "c", IssueType::Bug),
            ],
        };
        assert_eq!(index.next_id(), "0008");
    }

    #[test]
    fn test_filter_cycle() {
        let f = FilterMode::default();
        assert_eq!(f, FilterMode::Active);
        assert_eq!(f.next(), FilterMode::All);
        assert_eq!(f.next().next(), FilterMode::Closed);
        assert_eq!(f.next().next().next(), FilterMode::Active);
    }

    #[test]
    fn test_filter_membership() {
        assert!(FilterMode::Active.includes(IssueStatus::Planned));
        assert!(!FilterMode::Active.includes(IssueStatus::Implemented));
        assert!(!FilterMode::Active.includes(IssueStatus::Invalid));
        assert!(FilterMode::Closed.includes(IssueStatus::Invalid));
        assert!(FilterMode::All.includes(IssueStatus::Implemented));
    }

    #[test]
    fn test_names_match_serialized_form() {
        for s in [
            IssueStatus::Open,
            IssueStatus::Analyzed,
            IssueStatus::Planned,
            IssueStatus::Implemented,
            IssueStatus::Closed,
            IssueStatus::Invalid,
        ] {
            assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{}\"", s.as_str()));
        }
        for t in [IssueType::Feature, IssueType::Bug, IssueType::Refactor] {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.as_str()));
        }
    }
}
