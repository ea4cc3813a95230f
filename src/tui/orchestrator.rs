//! Background task dispatch with at most one task in flight per issue.
//!
//! Workers are plain threads that run the agent to completion and send exactly
//! one [`TaskResult`] back. The processing entry for an issue is removed only
//! when its result is taken off the channel, so the set always reflects
//! "dispatched but not yet consumed".

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::agent::{TaskRequest, TaskRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Analyze,
    Plan,
    /// Analysis revised with user feedback
    Review,
    /// Plan revised with user feedback
    PlanReview,
    /// Commit message generation for the close flow
    Commit,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Analyze => "analyze",
            TaskKind::Plan => "plan",
            TaskKind::Review => "review",
            TaskKind::PlanReview => "plan-review",
            TaskKind::Commit => "commit",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one background task. Not `Clone`: each result is consumed once.
#[derive(Debug, PartialEq, Eq)]
pub struct TaskResult {
    pub issue_id: String,
    pub kind: TaskKind,
    pub success: bool,
    /// Agent output on success, error text on failure
    pub output: String,
    pub session: Option<String>,
}

/// Issue id -> kind of the task in flight for it. Shared with worker threads
/// and the render path; the lock is never held across a blocking call.
#[derive(Debug, Clone, Default)]
pub struct ProcessingSet {
    inner: Arc<Mutex<HashMap<String, TaskKind>>>,
}

impl ProcessingSet {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, TaskKind>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, issue_id: &str) -> Option<TaskKind> {
        self.lock().get(issue_id).copied()
    }

    pub fn contains(&self, issue_id: &str) -> bool {
        self.lock().contains_key(issue_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Check-and-insert under one lock acquisition. Returns the kind already
    /// in flight if the issue is busy.
    fn try_insert(&self, issue_id: &str, kind: TaskKind) -> Result<(), TaskKind> {
        let mut map = self.lock();
        if let Some(existing) = map.get(issue_id) {
            return Err(*existing);
        }
        map.insert(issue_id.to_string(), kind);
        Ok(())
    }

    fn remove(&self, issue_id: &str) -> Option<TaskKind> {
        self.lock().remove(issue_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{issue_id} is already processing")]
pub struct Busy {
    pub issue_id: String,
    /// Kind of the task already in flight
    pub kind: TaskKind,
}

pub struct TaskOrchestrator {
    runner: Arc<dyn TaskRunner>,
    processing: ProcessingSet,
    tx: Sender<TaskResult>,
    rx: Receiver<TaskResult>,
}

impl TaskOrchestrator {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runner,
            processing: ProcessingSet::default(),
            tx,
            rx,
        }
    }

    pub fn processing(&self) -> &ProcessingSet {
        &self.processing
    }

    /// Register `issue_id` and spawn one worker for it. Refused without side
    /// effects if the issue already has a task in flight.
    pub fn start(&self, issue_id: &str, kind: TaskKind, request: TaskRequest) -> Result<(), Busy> {
        if let Err(existing) = self.processing.try_insert(issue_id, kind) {
            tracing::info!(issue = issue_id, kind = %kind, in_flight = %existing, "task rejected, issue busy");
            return Err(Busy {
                issue_id: issue_id.to_string(),
                kind: existing,
            });
        }

        tracing::info!(issue = issue_id, kind = %kind, resume = request.session.is_some(), "dispatching task");

        let runner = Arc::clone(&self.runner);
        let tx = self.tx.clone();
        let issue_id = issue_id.to_string();
        std::thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| runner.run(&request)));
            drop(runner);

            let result = match outcome {
                Ok(Ok(output)) => TaskResult {
                    issue_id,
                    kind,
                    success: true,
                    output: output.text,
                    session: output.session,
                },
                Ok(Err(err)) => TaskResult {
                    issue_id,
                    kind,
                    success: false,
                    output: format!("{err:#}"),
                    session: None,
                },
                Err(_) => TaskResult {
                    issue_id,
                    kind,
                    success: false,
                    output: "task runner panicked".to_string(),
                    session: None,
                },
            };
            // Receiver only goes away when the session ends
            let _ = tx.send(result);
        });

        Ok(())
    }

    /// Next finished task, if any, without blocking
    pub fn try_next(&self) -> Option<TaskResult> {
        self.rx.try_recv().ok().map(|result| self.deliver(result))
    }

    /// Wait up to `timeout` for the next finished task
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TaskResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(self.deliver(result)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn deliver(&self, result: TaskResult) -> TaskResult {
        self.processing.remove(&result.issue_id);
        if result.success {
            tracing::info!(issue = %result.issue_id, kind = %result.kind, "task finished");
        } else {
            tracing::warn!(issue = %result.issue_id, kind = %result.kind, error = %result.output, "task failed");
        }
        result
    }
}
