//! Prompt text for each kind of agent run.

use std::path::Path;

const READ_ONLY_PREAMBLE: &str = "## Constraints
You are running in read-only analysis mode.

Do not use Write, Edit, NotebookEdit or any other file-modifying tool.
Do not ask for write permissions and do not create or save files.
Return everything as your direct text response, starting with the content
itself. The host application saves the result.

";

pub fn analysis(brief: &str, brief_path: &Path) -> String {
    format!(
        "{READ_ONLY_PREAMBLE}## Task
Analyze this issue and provide:
1. Root cause / feature scope
2. Implementation options with pros and cons
3. Recommended approach
4. Risk assessment

Issue ({path}):
{brief}

## Output Format
Return markdown directly, not wrapped in a code block.
Start with the first section header.",
        path = brief_path.display(),
    )
}

pub fn plan(brief: &str, analysis: &str) -> String {
    format!(
        "{READ_ONLY_PREAMBLE}## Task
Write a detailed implementation plan from the issue brief and analysis.

### Brief
{brief}

### Analysis
{analysis}

## Output Format
Return markdown directly, starting with the first section header.

## Plan Summary
3-5 bullet points summarizing the approach.

## Implementation Tasks
A numbered list; for each task name the file and the change.

## Files Modified
| File | Changes |
|------|---------|

## Testing Approach
How to verify the implementation.

## Risk Mitigation
Potential issues and how to handle them."
    )
}

pub fn analysis_review(current: &str, feedback: &str) -> String {
    revision("analysis", current, feedback)
}

pub fn plan_review(current: &str, feedback: &str) -> String {
    revision("implementation plan", current, feedback)
}

fn revision(what: &str, current: &str, feedback: &str) -> String {
    format!(
        "{READ_ONLY_PREAMBLE}## Context
You previously wrote the following {what}:

---
{current}
---

## User Feedback
{feedback}

## Task
Revise the {what} to address this feedback. Keep the same structure.

## Output Format
Return the complete revised {what} as markdown, not wrapped in a code block.
Start with the first section header."
    )
}

pub fn commit_message(issue_id: &str, plan: &str) -> String {
    format!(
        "Write a git commit message for closing issue {issue_id}.

Context:
{plan}

Requirements:
- First line: type(scope): short description, at most 72 characters
- Types: feat, fix, refactor, docs, chore
- A blank line after the first line
- Body: bullet points for the key changes
- Footer: Issue: #{issue_id}

Output only the commit message, without code fences or commentary."
    )
}

pub fn implement(plan_path: &Path) -> String {
    format!(
        "Implement the plan in {}. Follow its tasks in order and run the tests it describes.",
        plan_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_embeds_brief_and_path() {
        let p = analysis("The export button is missing", Path::new("/p/issues/0001/brief.md"));
        assert!(p.contains("read-only"));
        assert!(p.contains("The export button is missing"));
        assert!(p.contains("/p/issues/0001/brief.md"));
    }

    #[test]
    fn test_commit_prompt_mentions_issue_twice() {
        let p = commit_message("0042", "plan body");
        assert_eq!(p.matches("0042").count(), 2);
        assert!(!p.contains("read-only"));
    }

    #[test]
    fn test_review_prompts_carry_feedback() {
        assert!(analysis_review("old", "be shorter").contains("be shorter"));
        assert!(plan_review("old plan", "split task 2").contains("implementation plan"));
    }
}
