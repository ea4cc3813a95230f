//! Frame composition. Produces exactly `height` rows of exactly `width`
//! columns; popups are composited over the base frame.

use crate::issue::Issue;

use super::content_view::ContentViewport;
use super::input::{InputMode, InputPurpose, PreviewKind};
use super::orchestrator::TaskKind;
use super::overlay::composite;
use super::session::Session;
use super::text::{display_width, fit_width, slice_columns, wrap_lines};

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FOOTER_KEYS: &str =
    "[n]ew [a]nalyze [R]eview [p]lan [P]lan-review [i]mplement [c]lose [d]iscard [e]dit [f]ilter [q]uit";
const PREVIEW_HELP: &str = "[e]dit  [f]eedback  [c]lose  [w]rap   ↑↓/j/k scroll  ←→/h/l pan";
const COMMIT_HELP: &str = "[y]es/Enter: commit   [n]/Esc: cancel   ↑↓ scroll";
const SEPARATOR: &str = "│";

/// Panel and popup geometry for a terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// Usable columns of the list panel (left half minus the separator)
    pub list_width: usize,
    /// Rows between the header and the footer
    pub list_height: usize,
    /// Columns of the brief panel on the right
    pub brief_width: usize,
    pub popup_width: usize,
    pub preview_width: usize,
    pub preview_height: usize,
    pub commit_width: usize,
    pub commit_height: usize,
}

impl Layout {
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (width as usize, height as usize);
        let list_panel = width / 2;
        let popup_width = width.saturating_sub(10).clamp(60, 100).min(width);
        let inner = popup_width.saturating_sub(4).max(1);
        Self {
            width,
            height,
            list_width: list_panel.saturating_sub(1),
            list_height: height.saturating_sub(3).max(1),
            brief_width: width.saturating_sub(list_panel),
            popup_width,
            preview_width: inner,
            preview_height: height.saturating_sub(10).max(3),
            commit_width: inner,
            commit_height: height.saturating_sub(10).clamp(5, 20),
        }
    }
}

/// `<type> <status|spinner> [<id>] <title>[ [<kind>...]]`
pub fn row_text(issue: &Issue, in_flight: Option<TaskKind>, spinner_frame: usize) -> String {
    let status = match in_flight {
        Some(_) => SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()],
        None => issue.status.icon(),
    };
    let suffix = in_flight
        .map(|kind| format!(" [{}...]", kind))
        .unwrap_or_default();
    format!(
        "{} {} [{}] {}{}",
        issue.issue_type.icon(),
        status,
        issue.id,
        issue.title,
        suffix
    )
}

/// Screen row of the selected list entry, if it is drawn and not covered by
/// a popup
pub fn selected_row(session: &Session) -> Option<usize> {
    if session.mode() != InputMode::Normal || session.issues().is_empty() {
        return None;
    }
    let list = session.list();
    Some(1 + list.selected.checked_sub(list.offset)?)
}

pub fn frame_lines(session: &Session) -> Vec<String> {
    let layout = session.layout();
    let (width, height) = (layout.width, layout.height);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(height);
    lines.push(fit_width(
        &format!("Issue Manager [{}]", session.filter().label()),
        width,
    ));

    let list = list_lines(session, &layout);
    let brief = brief_lines(session, &layout);
    for (left, right) in list.iter().zip(brief.iter()) {
        let row = if layout.list_width == 0 {
            right.clone()
        } else {
            format!("{}{}{}", left, SEPARATOR, right)
        };
        lines.push(fit_width(&row, width));
    }

    lines.push(fit_width(FOOTER_KEYS, width));
    lines.push(fit_width(session.status(), width));

    lines.truncate(height);
    while lines.len() < height {
        lines.push(" ".repeat(width));
    }

    match popup_lines(session, &layout) {
        Some(popup) => composite(&lines, &popup, width),
        None => lines,
    }
}

fn list_lines(session: &Session, layout: &Layout) -> Vec<String> {
    let width = layout.list_width;
    let list = session.list();
    let processing = session.processing();

    let mut rows: Vec<String> = if session.issues().is_empty() {
        vec![format!("No {} issues", session.filter().label())]
    } else {
        list.visible_range(layout.list_height)
            .filter_map(|idx| session.issues().get(idx))
            .map(|issue| {
                let text = row_text(issue, processing.get(&issue.id), session.spinner_frame());
                slice_columns(&text, list.h_offset, width.max(1))
            })
            .collect()
    };
    rows.resize(layout.list_height, String::new());
    rows.iter().map(|row| fit_width(row, width)).collect()
}

fn brief_lines(session: &Session, layout: &Layout) -> Vec<String> {
    let width = layout.brief_width.saturating_sub(2);
    let mut rows = Vec::new();

    match session.selected_issue() {
        None => rows.push("No issue selected".to_string()),
        Some(issue) => {
            rows.push(format!("Preview: {}", issue.id));
            rows.push("─".repeat(width.min(40)));
            let body = match session.store().load_brief(&issue.id) {
                Ok(Some(brief)) if brief.body.trim().is_empty() => "(empty)".to_string(),
                Ok(Some(brief)) => brief.body,
                Ok(None) | Err(_) => "brief.md not found".to_string(),
            };
            rows.extend(wrap_lines(&body, width));
        }
    }

    rows.resize(layout.list_height, String::new());
    rows.iter()
        .map(|row| fit_width(&format!(" {}", row), layout.brief_width))
        .collect()
}

fn popup_lines(session: &Session, layout: &Layout) -> Option<Vec<String>> {
    let max_inner = layout.width.saturating_sub(4).max(1);
    let lines = match session.mode() {
        InputMode::Normal => return None,
        InputMode::TextInput(InputPurpose::NewIssue) => {
            let inner = 50.min(max_inner);
            boxed(vec![input_line(session, InputPurpose::NewIssue, inner)], inner)
        }
        InputMode::TextInput(purpose) => {
            let inner = layout.preview_width.min(max_inner);
            let title = match purpose.origin() {
                Some(PreviewKind::Plan) => "Current Plan:",
                _ => "Current Analysis:",
            };
            let mut body = vec![title.to_string()];
            body.extend(viewport_rows(session.content()));
            body.push(scroll_rule(session.content(), inner));
            body.push(input_line(session, purpose, inner));
            boxed(body, inner)
        }
        InputMode::Confirm => {
            let message = session.confirm_message();
            let inner = display_width(message).max(20).min(max_inner);
            boxed(
                vec![message.to_string(), String::new(), "[y]es / [n]o".to_string()],
                inner,
            )
        }
        InputMode::TypeSelect => {
            let title = session.pending_title().unwrap_or_default();
            let inner = display_width(title).clamp(30, 60).min(max_inner);
            boxed(
                vec![
                    "Select issue type:".to_string(),
                    title.to_string(),
                    String::new(),
                    "[f]eature  [b]ug  [r]efactor".to_string(),
                    String::new(),
                    "[esc] cancel".to_string(),
                ],
                inner,
            )
        }
        InputMode::Preview(kind) => {
            let inner = layout.preview_width.min(max_inner);
            let mut body = vec![kind.title().to_string()];
            body.extend(viewport_rows(session.content()));
            body.push(scroll_rule(session.content(), inner));
            body.push(String::new());
            body.push(PREVIEW_HELP.to_string());
            boxed(body, inner)
        }
        InputMode::CommitConfirm => {
            let inner = layout.commit_width.min(max_inner);
            let info = session
                .pending_close()
                .map(|issue| format!(" [{}] {}", issue.id, issue.title))
                .unwrap_or_default();
            let mut body = vec![format!("Commit Message:{}", info), "─".repeat(inner), String::new()];
            body.extend(session.commit_view().visible_lines().iter().cloned());
            body.push(String::new());
            body.push(COMMIT_HELP.to_string());
            boxed(body, inner)
        }
        InputMode::CommitGenerating => {
            let info = session
                .pending_close()
                .map(|issue| format!(" [{}]", issue.id))
                .unwrap_or_default();
            let spinner = SPINNER_FRAMES[session.spinner_frame() % SPINNER_FRAMES.len()];
            let progress = format!(
                "{} Generating commit message with {}...",
                spinner,
                session.config().commit_model
            );
            let inner = display_width(&progress).max(30).min(max_inner);
            boxed(
                vec![format!("Closing Issue{}", info), String::new(), progress],
                inner,
            )
        }
    };
    Some(lines)
}

/// The viewport's visible rows padded to its full height so the popup does
/// not change size while scrolling
fn viewport_rows(view: &ContentViewport) -> Vec<String> {
    let mut rows = view.visible_lines().to_vec();
    rows.resize(view.height().max(rows.len()), String::new());
    rows
}

fn scroll_rule(view: &ContentViewport, inner: usize) -> String {
    let percent = format!(" {:3.0}% ", view.scroll_percent() * 100.0);
    let rule = inner.saturating_sub(display_width(&percent));
    format!("{}{}", "─".repeat(rule), percent)
}

/// Prompt and buffer with a block cursor. Long input scrolls so the cursor
/// stays in view.
fn input_line(session: &Session, purpose: InputPurpose, inner: usize) -> String {
    let (before, after) = session.input().split();
    let head = format!("{}{}█", purpose.prompt(), before);
    let head_width = display_width(&head);
    if head_width > inner {
        return slice_columns(&head, head_width - inner, inner);
    }
    format!("{}{}", head, after)
}

fn boxed(body: Vec<String>, inner: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("╭{}╮", "─".repeat(inner + 2)));
    for line in body {
        lines.push(format!("│ {} │", fit_width(&line, inner)));
    }
    lines.push(format!("╰{}╯", "─".repeat(inner + 2)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MockTaskRunner;
    use crate::config::MergedConfig;
    use crate::git::MockVcsOperations;
    use crate::issue::{IssueStatus, IssueType};
    use crate::storage::MockIssueStore;
    use crate::tui::session::Message;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn issue(id: &str, title: &str) -> Issue {
        Issue::new(id, title, IssueType::Bug)
    }

    fn session_with(issues: Vec<Issue>, store: MockIssueStore, width: u16, height: u16) -> Session {
        let mut session = Session::new(
            Arc::new(store),
            Arc::new(MockVcsOperations::new()),
            Arc::new(MockTaskRunner::new()),
            MergedConfig::default(),
            PathBuf::from("/project"),
        );
        session.update(Message::Resize(width, height));
        session.replace_issues(issues);
        session
    }

    fn brief_store(body: &'static str) -> MockIssueStore {
        let mut store = MockIssueStore::new();
        store.expect_load_brief().returning(move |id| {
            let mut brief = Issue::new(id, "t", IssueType::Bug);
            brief.body = body.to_string();
            Ok(Some(brief))
        });
        store
    }

    fn assert_exact(lines: &[String], width: usize, height: usize) {
        assert_eq!(lines.len(), height);
        for line in lines {
            assert_eq!(display_width(line), width, "row {:?}", line);
        }
    }

    #[test]
    fn test_row_text_format() {
        let mut item = issue("0003", "Fix crash");
        item.status = IssueStatus::Analyzed;
        assert_eq!(row_text(&item, None, 0), "💥 ◐ [0003] Fix crash");
        assert_eq!(
            row_text(&item, Some(TaskKind::Plan), 1),
            "💥 ⠙ [0003] Fix crash [plan...]"
        );
    }

    #[test]
    fn test_layout_popup_width_bounds() {
        assert_eq!(Layout::new(200, 50).popup_width, 100);
        assert_eq!(Layout::new(80, 24).popup_width, 70);
        assert_eq!(Layout::new(50, 24).popup_width, 50);
        assert_eq!(Layout::new(80, 24).list_height, 21);
    }

    #[test]
    fn test_frame_is_exactly_terminal_sized() {
        let issues = vec![issue("0001", "日本語のタイトル that is rather long"), issue("0002", "Second")];
        let session = session_with(issues, brief_store("Body 🚀 text\nline two"), 80, 24);
        let lines = frame_lines(&session);
        assert_exact(&lines, 80, 24);
        assert!(lines[0].starts_with("Issue Manager [Active]"));
        assert!(lines[1].contains("[0001]"));
        assert!(lines[1].contains("Preview: 0001"));
        assert!(lines[22].starts_with("[n]ew"));
    }

    #[test]
    fn test_empty_list_message() {
        let session = session_with(vec![], MockIssueStore::new(), 60, 10);
        let lines = frame_lines(&session);
        assert_exact(&lines, 60, 10);
        assert!(lines[1].starts_with("No Active issues"));
        assert!(lines[1].contains("No issue selected"));
        assert_eq!(selected_row(&session), None);
    }

    #[test]
    fn test_missing_brief_and_empty_body() {
        let mut store = MockIssueStore::new();
        store.expect_load_brief().returning(|_| Ok(None));
        let session = session_with(vec![issue("0001", "a")], store, 60, 10);
        assert!(frame_lines(&session).iter().any(|l| l.contains("brief.md not found")));

        let session = session_with(vec![issue("0001", "a")], brief_store("  "), 60, 10);
        assert!(frame_lines(&session).iter().any(|l| l.contains("(empty)")));
    }

    #[test]
    fn test_popup_keeps_frame_size() {
        let mut session = session_with(vec![issue("0001", "a")], brief_store("b"), 80, 24);
        session.update(Message::Key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)));
        for c in "New title".chars() {
            session.update(Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        let lines = frame_lines(&session);
        assert_exact(&lines, 80, 24);
        assert!(lines.iter().any(|l| l.contains("Title: New title█")));
        assert_eq!(selected_row(&session), None);
    }

    #[test]
    fn test_tiny_terminal() {
        let session = session_with(vec![issue("0001", "a")], brief_store("b"), 3, 2);
        assert_exact(&frame_lines(&session), 3, 2);
    }

    #[test]
    fn test_selected_row_follows_scroll() {
        let issues = (1..=30).map(|i| issue(&format!("{:04}", i), "x")).collect();
        let mut session = session_with(issues, brief_store("b"), 80, 10);
        for _ in 0..12 {
            session.update(Message::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)));
        }
        // 7 list rows: selection 12 sits on the last one
        assert_eq!(selected_row(&session), Some(7));
    }

    #[test]
    fn test_boxed_is_uniform_width() {
        let lines = boxed(vec!["a".to_string(), "日本".to_string()], 10);
        for line in &lines {
            assert_eq!(display_width(line), 14);
        }
    }
}
