//! End-to-end session flows against a real file store
//!
//! The agent and version control are mocked; everything else runs for real.
//!
//! Run with: cargo test --features test-mocks

#![cfg(feature = "test-mocks")]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use issue_manager::agent::{MockTaskRunner, TaskOutput, TaskRequest};
use issue_manager::config::MergedConfig;
use issue_manager::git::MockVcsOperations;
use issue_manager::issue::{FilterMode, IssueStatus, IssueType};
use issue_manager::storage::{FileStore, IssueStore};
use issue_manager::tui::input::InputMode;
use issue_manager::tui::render;
use issue_manager::tui::session::{Effect, Message, Session};

fn key(c: char) -> Message {
    Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn session(dir: &TempDir, runner: MockTaskRunner, vcs: MockVcsOperations) -> Session {
    let mut session = Session::new(
        Arc::new(FileStore::new(dir.path())),
        Arc::new(vcs),
        Arc::new(runner),
        MergedConfig::default(),
        PathBuf::from(dir.path()),
    );
    session.reload();
    session
}

/// Feed the next finished task back in and perform any refresh it asks for
fn deliver(session: &mut Session) {
    let result = session
        .wait_result(Duration::from_secs(5))
        .expect("task finished");
    for effect in session.update(Message::TaskFinished(result)) {
        if effect == Effect::Refresh {
            session.reload();
        }
    }
}

/// Analyze then plan an issue; both documents land on disk and the status advances
#[test]
fn test_analyze_then_plan() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.create_issue("Crash on save", IssueType::Bug).unwrap();

    let mut runner = MockTaskRunner::new();
    runner
        .expect_run()
        .withf(|req: &TaskRequest| req.session.is_none())
        .times(1)
        .returning(|_| {
            Ok(TaskOutput {
                text: "# Analysis".to_string(),
                session: Some("sess-1".to_string()),
            })
        });
    runner
        .expect_run()
        .withf(|req: &TaskRequest| req.session.as_deref() == Some("sess-1"))
        .times(1)
        .returning(|_| {
            Ok(TaskOutput {
                text: "## Plan Summary".to_string(),
                session: None,
            })
        });

    let mut session = session(&dir, runner, MockVcsOperations::new());
    assert_eq!(session.issues().len(), 1);

    session.update(key('a'));
    deliver(&mut session);
    assert_eq!(session.status(), "Analyzed 0001");
    assert_eq!(store.load_analysis("0001").unwrap(), "# Analysis");
    assert_eq!(store.load_session("0001").unwrap().as_deref(), Some("sess-1"));
    assert_eq!(session.issues()[0].status, IssueStatus::Analyzed);

    session.update(key('p'));
    deliver(&mut session);
    assert_eq!(session.status(), "Planned 0001");
    assert_eq!(store.load_plan("0001").unwrap(), "## Plan Summary");
    assert_eq!(session.issues()[0].status, IssueStatus::Planned);
    assert!(session.processing().is_empty());
}

/// The spinner and task label show on the row while a task is in flight
#[test]
fn test_row_shows_in_flight_task() {
    let dir = TempDir::new().unwrap();
    FileStore::new(dir.path())
        .create_issue("Spin", IssueType::Feature)
        .unwrap();

    let mut runner = MockTaskRunner::new();
    runner.expect_run().returning(|_| {
        Ok(TaskOutput {
            text: "done".to_string(),
            session: None,
        })
    });

    let mut session = session(&dir, runner, MockVcsOperations::new());
    session.update(key('a'));

    let frame = render::frame_lines(&session);
    assert!(frame.iter().any(|line| line.contains("[analyze...]")));

    deliver(&mut session);
    let frame = render::frame_lines(&session);
    assert!(!frame.iter().any(|line| line.contains("[analyze...]")));
}

/// Discarding hides the issue from the active list and shows it under Closed
#[test]
fn test_discard_then_filter() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.create_issue("Dup", IssueType::Feature).unwrap();

    let mut session = session(&dir, MockTaskRunner::new(), MockVcsOperations::new());
    session.update(key('d'));
    assert_eq!(session.mode(), InputMode::Confirm);
    assert_eq!(session.update(key('y')), vec![Effect::Refresh]);
    session.reload();
    assert!(session.issues().is_empty());

    // Active -> All -> Closed
    session.update(key('f'));
    session.update(key('f'));
    assert_eq!(session.filter(), FilterMode::Closed);
    session.reload();
    assert_eq!(session.issues().len(), 1);
    assert_eq!(session.issues()[0].status, IssueStatus::Invalid);
}

/// Close generates a message, then commits and marks the issue closed
#[test]
fn test_close_and_commit() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.create_issue("Ship it", IssueType::Feature).unwrap();
    store.save_plan("0001", "## Plan").unwrap();

    let mut vcs = MockVcsOperations::new();
    vcs.expect_is_repository().returning(|| true);
    vcs.expect_has_staged_changes().returning(|| true);
    vcs.expect_commit()
        .withf(|message: &str| message == "feat: ship it")
        .times(1)
        .returning(|_| Ok(String::new()));

    let mut runner = MockTaskRunner::new();
    runner
        .expect_run()
        .withf(|req: &TaskRequest| req.model.as_deref() == Some("haiku") && req.prompt.contains("0001"))
        .returning(|_| {
            Ok(TaskOutput {
                text: "feat: ship it\n".to_string(),
                session: None,
            })
        });

    let mut session = session(&dir, runner, vcs);
    session.update(key('c'));
    assert_eq!(session.mode(), InputMode::CommitGenerating);
    deliver(&mut session);
    assert_eq!(session.mode(), InputMode::CommitConfirm);

    session.update(key('y'));
    assert_eq!(session.status(), "Closed & committed 0001");
    let brief = store.load_brief("0001").unwrap().unwrap();
    assert_eq!(brief.status, IssueStatus::Closed);
}
