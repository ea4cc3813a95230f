//! `+++`-delimited TOML frontmatter used by brief.md.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueStatus, IssueType};

const DELIMITER: &str = "+++";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Missing status and date fall back to the index entry when loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discard_reason: Option<String>,
}

impl Frontmatter {
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            issue_type: issue.issue_type,
            status: Some(issue.status),
            date: Some(issue.created),
            discard_reason: issue.discard_reason.clone(),
        }
    }

    pub fn into_issue(self, id: &str, body: String, indexed: Option<&Issue>) -> Issue {
        let mut issue = Issue::new(id, self.title, self.issue_type);
        if let Some(status) = self.status.or(indexed.map(|i| i.status)) {
            issue.status = status;
        }
        if let Some(date) = self.date.or(indexed.map(|i| i.created)) {
            issue.created = date;
        }
        issue.discard_reason = self
            .discard_reason
            .or_else(|| indexed.and_then(|i| i.discard_reason.clone()));
        issue.body = body;
        issue
    }
}

/// Split a document into its frontmatter block (if any) and trimmed body.
/// Returns the raw TOML text so callers can attach path context to parse errors.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix(DELIMITER) else {
        return (None, content.trim());
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, content.trim());
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(header), body.trim());
        }
        offset += line.len();
    }

    (None, content.trim())
}

pub fn parse(content: &str) -> Result<(Option<Frontmatter>, String), toml::de::Error> {
    let (header, body) = split(content);
    let frontmatter = header.map(toml::from_str::<Frontmatter>).transpose()?;
    Ok((frontmatter, body.to_string()))
}

pub fn render(frontmatter: &Frontmatter, body: &str) -> Result<String, toml::ser::Error> {
    let header = toml::to_string(frontmatter)?;
    let mut out = String::with_capacity(header.len() + body.len() + 16);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&header);
    if !header.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    Ok(out)
}
