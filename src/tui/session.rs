//! The interactive session: modal state, key handling, task dispatch and
//! result handling. Terminal-free, so every flow can be driven from tests by
//! feeding [`Message`]s and inspecting the returned [`Effect`]s.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::agent::{self, prompts, TaskRequest, TaskRunner};
use crate::config::MergedConfig;
use crate::git::VcsOperations;
use crate::issue::{FilterMode, Issue, IssueStatus, IssueType};
use crate::operations::{resolve_editor, ForegroundCommand};
use crate::storage::{IssueStore, StoreResult};

use super::content_view::ContentViewport;
use super::input::{InputMode, InputPurpose, LineInput, PreviewKind};
use super::keys::{action_for, Action};
use super::list_view::ListViewport;
use super::orchestrator::{ProcessingSet, TaskKind, TaskOrchestrator, TaskResult};
use super::render::{self, Layout};
use super::text::display_width;

/// Action waiting on a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Discard(String),
    Reanalyze(String),
    Replan(String),
    /// Launch the interactive implementation run resuming `session`
    Implement { issue_id: String, session: String },
}

#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    TaskFinished(TaskResult),
    /// A foreground process handed the terminal back. `error` is set when it
    /// could not be launched at all.
    ForegroundExited {
        sync_issue: Option<String>,
        error: Option<String>,
    },
}

/// Work the event loop performs on the session's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reload the issue list from storage
    Refresh,
    /// Hand the terminal to a child process and wait for it
    Suspend(Suspension),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suspension {
    pub command: ForegroundCommand,
    /// Issue whose brief may have been edited and must be synced to the index
    pub sync_issue: Option<String>,
}

pub struct Session {
    store: Arc<dyn IssueStore>,
    vcs: Arc<dyn VcsOperations>,
    orchestrator: TaskOrchestrator,
    config: MergedConfig,
    editor: String,
    project_root: PathBuf,

    issues: Vec<Issue>,
    filter: FilterMode,
    list: ListViewport,
    content: ContentViewport,
    commit_view: ContentViewport,
    mode: InputMode,
    status: String,
    spinner_frame: usize,
    input: LineInput,
    width: u16,
    height: u16,
    should_quit: bool,

    // Context of the active popup, cleared when it closes
    confirm_message: String,
    pending: Option<PendingAction>,
    pending_title: Option<String>,
    pending_close: Option<Issue>,
    preview_issue: Option<String>,
}

impl Session {
    pub fn new(
        store: Arc<dyn IssueStore>,
        vcs: Arc<dyn VcsOperations>,
        runner: Arc<dyn TaskRunner>,
        config: MergedConfig,
        project_root: PathBuf,
    ) -> Self {
        let editor = resolve_editor(config.editor.as_deref());
        let mut session = Self {
            store,
            vcs,
            orchestrator: TaskOrchestrator::new(runner),
            config,
            editor,
            project_root,
            issues: Vec::new(),
            filter: FilterMode::default(),
            list: ListViewport::new(),
            content: ContentViewport::new(),
            commit_view: ContentViewport::new(),
            mode: InputMode::Normal,
            status: String::new(),
            spinner_frame: 0,
            input: LineInput::new(),
            width: 80,
            height: 24,
            should_quit: false,
            confirm_message: String::new(),
            pending: None,
            pending_title: None,
            pending_close: None,
            preview_issue: None,
        };
        session.resize(80, 24);
        session
    }

    // === Accessors ===

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn list(&self) -> &ListViewport {
        &self.list
    }

    pub fn content(&self) -> &ContentViewport {
        &self.content
    }

    pub fn commit_view(&self) -> &ContentViewport {
        &self.commit_view
    }

    pub fn input(&self) -> &LineInput {
        &self.input
    }

    pub fn processing(&self) -> &ProcessingSet {
        self.orchestrator.processing()
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn confirm_message(&self) -> &str {
        &self.confirm_message
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn pending_title(&self) -> Option<&str> {
        self.pending_title.as_deref()
    }

    pub fn pending_close(&self) -> Option<&Issue> {
        self.pending_close.as_ref()
    }

    pub fn config(&self) -> &MergedConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn IssueStore {
        self.store.as_ref()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.issues.get(self.list.selected)
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.width, self.height)
    }

    // === Results ===

    /// Next finished background task, without blocking
    pub fn next_result(&self) -> Option<TaskResult> {
        self.orchestrator.try_next()
    }

    /// Wait up to `timeout` for a finished background task
    pub fn wait_result(&self, timeout: Duration) -> Option<TaskResult> {
        self.orchestrator.recv_timeout(timeout)
    }

    // === List ===

    /// Reload the list for the current filter
    pub fn reload(&mut self) {
        match self.store.load_issues(self.filter) {
            Ok(issues) => self.replace_issues(issues),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load issues");
                self.status = format!("Failed to load issues: {}", e);
            }
        }
    }

    /// Swap in a freshly loaded list. The selection index is kept and clamped.
    pub fn replace_issues(&mut self, issues: Vec<Issue>) {
        self.issues = issues;
        let layout = self.layout();
        self.list.set_len(self.issues.len(), layout.list_height);
        self.refresh_row_width();
    }

    fn refresh_row_width(&mut self) {
        let processing = self.orchestrator.processing();
        let widest = self
            .issues
            .iter()
            .map(|issue| {
                display_width(&render::row_text(
                    issue,
                    processing.get(&issue.id),
                    self.spinner_frame,
                ))
            })
            .max()
            .unwrap_or(0);
        let layout = self.layout();
        self.list.set_max_row_width(widest, layout.list_width);
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let layout = self.layout();
        self.content.set_size(layout.preview_width, layout.preview_height);
        self.commit_view.set_size(layout.commit_width, layout.commit_height);
        self.list.ensure_selected_visible(layout.list_height);
        self.refresh_row_width();
    }

    // === Update ===

    pub fn update(&mut self, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return vec![];
                }
                match action_for(self.mode, key) {
                    Some(action) => self.handle_action(action),
                    None => vec![],
                }
            }
            Message::Tick => {
                self.spinner_frame = (self.spinner_frame + 1) % render::SPINNER_FRAMES.len();
                self.refresh_row_width();
                vec![]
            }
            Message::Resize(width, height) => {
                self.resize(width, height);
                vec![]
            }
            Message::TaskFinished(result) => {
                self.handle_result(result);
                vec![Effect::Refresh]
            }
            Message::ForegroundExited { sync_issue, error } => {
                if let Some(id) = sync_issue {
                    if let Err(e) = self.store.sync_brief_to_index(&id) {
                        tracing::warn!(issue = %id, error = %e, "failed to sync brief into index");
                    }
                }
                if let Some(error) = error {
                    self.status = error;
                }
                vec![Effect::Refresh]
            }
        }
    }

    fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match self.mode {
            InputMode::Normal => self.handle_normal(action),
            InputMode::TextInput(purpose) => self.handle_text_input(purpose, action),
            InputMode::Confirm => self.handle_confirm(action),
            InputMode::TypeSelect => self.handle_type_select(action),
            InputMode::Preview(kind) => self.handle_preview(kind, action),
            InputMode::CommitConfirm => self.handle_commit_confirm(action),
            InputMode::CommitGenerating => vec![],
        }
    }

    fn handle_normal(&mut self, action: Action) -> Vec<Effect> {
        let layout = self.layout();
        match action {
            Action::Quit => {
                self.should_quit = true;
                return vec![Effect::Quit];
            }
            Action::MoveUp => self.list.move_up(layout.list_height),
            Action::MoveDown => self.list.move_down(layout.list_height),
            Action::ScrollLeft => self.list.scroll_left(self.config.scroll_step),
            Action::ScrollRight => self
                .list
                .scroll_right(self.config.scroll_step, layout.list_width),
            Action::New => {
                self.input.clear();
                self.pending_title = None;
                self.mode = InputMode::TextInput(InputPurpose::NewIssue);
            }
            Action::Edit => return self.edit_issue(),
            Action::Analyze => self.analyze_issue(),
            Action::Plan => self.plan_issue(),
            Action::Review => self.open_preview(PreviewKind::Analysis),
            Action::PlanReview => self.open_preview(PreviewKind::Plan),
            Action::Implement => self.confirm_implement(),
            Action::Close => self.close_issue(),
            Action::Discard => self.confirm_discard(),
            Action::Refresh => {
                self.status = "Refreshed".to_string();
                return vec![Effect::Refresh];
            }
            Action::CycleFilter => {
                self.filter = self.filter.next();
                self.status = format!("Filter: {}", self.filter.label());
                return vec![Effect::Refresh];
            }
            _ => {}
        }
        vec![]
    }

    fn handle_text_input(&mut self, purpose: InputPurpose, action: Action) -> Vec<Effect> {
        match action {
            Action::Submit => {
                let value = self.input.take();
                return self.submit_input(purpose, value);
            }
            Action::Cancel => {
                self.input.clear();
                match purpose.origin() {
                    Some(kind) => self.mode = InputMode::Preview(kind),
                    None => {
                        self.mode = InputMode::Normal;
                        self.pending_title = None;
                        self.status = "Cancelled".to_string();
                    }
                }
            }
            Action::InsertChar(c) => self.input.insert(c),
            Action::Backspace => self.input.backspace(),
            Action::Delete => self.input.delete(),
            Action::CursorLeft => self.input.left(),
            Action::CursorRight => self.input.right(),
            Action::CursorHome => self.input.home(),
            Action::CursorEnd => self.input.end(),
            Action::WordLeft => self.input.word_left(),
            Action::WordRight => self.input.word_right(),
            _ => {}
        }
        vec![]
    }

    fn submit_input(&mut self, purpose: InputPurpose, value: String) -> Vec<Effect> {
        match purpose {
            InputPurpose::NewIssue => {
                if value.is_empty() {
                    self.mode = InputMode::Normal;
                    self.status = "Cancelled".to_string();
                } else {
                    self.pending_title = Some(value);
                    self.mode = InputMode::TypeSelect;
                }
            }
            InputPurpose::AnalysisFeedback | InputPurpose::PlanFeedback => {
                let kind = purpose.origin().unwrap_or(PreviewKind::Analysis);
                if value.is_empty() {
                    self.mode = InputMode::Preview(kind);
                    return vec![];
                }
                self.mode = InputMode::Normal;
                self.content.clear();
                match self.preview_issue.take() {
                    Some(id) => self.execute_review(&id, kind, &value),
                    None => self.status = "No issue selected".to_string(),
                }
            }
        }
        vec![]
    }

    fn handle_confirm(&mut self, action: Action) -> Vec<Effect> {
        let Action::Confirm(yes) = action else {
            return vec![];
        };

        self.mode = InputMode::Normal;
        self.confirm_message.clear();
        let pending = self.pending.take();
        if !yes {
            self.status = "Cancelled".to_string();
            return vec![];
        }

        match pending {
            Some(PendingAction::Discard(id)) => {
                // no discard while a task for the issue is in flight
                if self.reject_if_busy(&id) {
                    return vec![];
                }
                match self
                    .store
                    .update_status(&id, IssueStatus::Invalid, Some("Discarded by user".to_string()))
                {
                    Ok(()) => self.status = format!("Discarded {}", id),
                    Err(e) => {
                        tracing::warn!(issue = %id, error = %e, "failed to discard issue");
                        self.status = format!("Discard {} failed: {}", id, e);
                    }
                }
                vec![Effect::Refresh]
            }
            Some(PendingAction::Reanalyze(id)) => {
                self.start_analysis(&id);
                vec![Effect::Refresh]
            }
            Some(PendingAction::Replan(id)) => {
                self.start_plan(&id);
                vec![Effect::Refresh]
            }
            Some(PendingAction::Implement { issue_id, session }) => {
                self.store.stage_issue_files(&issue_id);
                let prompt = prompts::implement(&self.store.plan_path(&issue_id));
                let command = agent::implement_command(
                    &self.config.runner_command,
                    &session,
                    &prompt,
                    &self.project_root,
                );
                self.status = format!("Implementing {}...", issue_id);
                tracing::info!(issue = %issue_id, "launching implementation run");
                vec![Effect::Suspend(Suspension {
                    command,
                    sync_issue: None,
                })]
            }
            None => vec![Effect::Refresh],
        }
    }

    fn handle_type_select(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SelectType(issue_type) => self.create_issue(issue_type),
            Action::Cancel => {
                self.mode = InputMode::Normal;
                self.pending_title = None;
                self.status = "Cancelled".to_string();
                vec![]
            }
            _ => vec![],
        }
    }

    fn handle_preview(&mut self, kind: PreviewKind, action: Action) -> Vec<Effect> {
        let step = self.config.scroll_step;
        match action {
            Action::LineUp => self.content.line_up(1),
            Action::LineDown => self.content.line_down(1),
            Action::HalfPageUp => self.content.half_page_up(),
            Action::HalfPageDown => self.content.half_page_down(),
            Action::Top => self.content.goto_top(),
            Action::Bottom => self.content.goto_bottom(),
            Action::ScrollLeft => self.content.scroll_left(step),
            Action::ScrollRight => self.content.scroll_right(step),
            Action::ToggleWrap => self.content.toggle_wrap(),
            Action::Feedback => {
                self.input.clear();
                self.mode = InputMode::TextInput(kind.feedback_purpose());
            }
            Action::EditDocument => {
                self.mode = InputMode::Normal;
                self.content.clear();
                let Some(id) = self.preview_issue.take() else {
                    self.status = "No issue selected".to_string();
                    return vec![];
                };
                let path = match kind {
                    PreviewKind::Analysis => self.store.analysis_path(&id),
                    PreviewKind::Plan => self.store.plan_path(&id),
                };
                return vec![self.editor_suspension(&path, None)];
            }
            Action::Cancel => {
                self.mode = InputMode::Normal;
                self.content.clear();
                self.preview_issue = None;
            }
            _ => {}
        }
        vec![]
    }

    fn handle_commit_confirm(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::LineUp => self.commit_view.line_up(1),
            Action::LineDown => self.commit_view.line_down(1),
            Action::Confirm(true) => return self.commit_and_close(),
            Action::Confirm(false) => {
                self.mode = InputMode::Normal;
                self.pending_close = None;
                self.commit_view.clear();
                self.status = "Cancelled".to_string();
            }
            _ => {}
        }
        vec![]
    }

    // === Flows ===

    fn selected_or_status(&mut self) -> Option<Issue> {
        let issue = self.selected_issue().cloned();
        if issue.is_none() {
            self.status = "No issue selected".to_string();
        }
        issue
    }

    /// Sets the busy status and returns true if `id` has a task in flight
    fn reject_if_busy(&mut self, id: &str) -> bool {
        if self.orchestrator.processing().contains(id) {
            self.status = format!("{} is already processing", id);
            return true;
        }
        false
    }

    fn editor_suspension(&self, path: &std::path::Path, sync_issue: Option<String>) -> Effect {
        Effect::Suspend(Suspension {
            command: ForegroundCommand::editor(&self.editor, path, &self.project_root),
            sync_issue,
        })
    }

    fn edit_issue(&mut self) -> Vec<Effect> {
        let Some(issue) = self.selected_or_status() else {
            return vec![];
        };
        let path = self.store.brief_path(&issue.id);
        vec![self.editor_suspension(&path, Some(issue.id))]
    }

    fn create_issue(&mut self, issue_type: IssueType) -> Vec<Effect> {
        self.mode = InputMode::Normal;
        let Some(title) = self.pending_title.take() else {
            return vec![];
        };
        match self.store.create_issue(&title, issue_type) {
            Ok(issue) => {
                self.status = format!("Created {} - opening editor", issue.id);
                let path = self.store.brief_path(&issue.id);
                vec![self.editor_suspension(&path, Some(issue.id))]
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create issue");
                self.status = format!("Error: {}", e);
                vec![Effect::Refresh]
            }
        }
    }

    fn analyze_issue(&mut self) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        if self.reject_if_busy(&issue.id) {
            return;
        }
        if self.store.analysis_exists(&issue.id) {
            self.ask(
                format!("Re-analyze {}? The existing analysis will be replaced.", issue.id),
                PendingAction::Reanalyze(issue.id),
            );
            return;
        }
        self.start_analysis(&issue.id);
    }

    fn plan_issue(&mut self) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        if !self.store.analysis_exists(&issue.id) {
            self.status = "Analyze first".to_string();
            return;
        }
        if self.reject_if_busy(&issue.id) {
            return;
        }
        if self.store.plan_exists(&issue.id) {
            self.ask(
                format!("Re-plan {}? The existing plan will be replaced.", issue.id),
                PendingAction::Replan(issue.id),
            );
            return;
        }
        self.start_plan(&issue.id);
    }

    fn open_preview(&mut self, kind: PreviewKind) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        let exists = match kind {
            PreviewKind::Analysis => self.store.analysis_exists(&issue.id),
            PreviewKind::Plan => self.store.plan_exists(&issue.id),
        };
        if !exists {
            self.status = match kind {
                PreviewKind::Analysis => "Analyze first",
                PreviewKind::Plan => "Plan first (press 'p')",
            }
            .to_string();
            return;
        }
        if self.reject_if_busy(&issue.id) {
            return;
        }

        let loaded = match kind {
            PreviewKind::Analysis => self.store.load_analysis(&issue.id),
            PreviewKind::Plan => self.store.load_plan(&issue.id),
        };
        match loaded {
            Ok(text) => {
                let layout = self.layout();
                self.content.set_size(layout.preview_width, layout.preview_height);
                self.content.load(&text);
                self.preview_issue = Some(issue.id);
                self.mode = InputMode::Preview(kind);
            }
            Err(e) => {
                tracing::warn!(issue = %issue.id, error = %e, "failed to load document for preview");
                self.status = match kind {
                    PreviewKind::Analysis => "Failed to load analysis",
                    PreviewKind::Plan => "Failed to load plan",
                }
                .to_string();
            }
        }
    }

    fn confirm_implement(&mut self) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        if issue.status != IssueStatus::Planned {
            self.status = "Only planned issues can be implemented".to_string();
            return;
        }
        if !self.store.plan_exists(&issue.id) {
            self.status = "Plan first (press 'p')".to_string();
            return;
        }
        let session = match self.store.load_session(&issue.id) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                self.status = "No session found. Re-analyze the issue first".to_string();
                return;
            }
            Err(e) => {
                tracing::warn!(issue = %issue.id, error = %e, "failed to load session token");
                self.status = "No session found. Re-analyze the issue first".to_string();
                return;
            }
        };
        if self.reject_if_busy(&issue.id) {
            return;
        }
        self.ask(
            format!("Implement {}? The agent will modify files in this project.", issue.id),
            PendingAction::Implement {
                issue_id: issue.id,
                session,
            },
        );
    }

    fn close_issue(&mut self) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        if !self.store.plan_exists(&issue.id) {
            self.status = "Plan first (press 'p')".to_string();
            return;
        }
        if !self.vcs.is_repository() {
            self.status = "Not a git repository".to_string();
            return;
        }
        if !self.vcs.has_staged_changes() {
            self.status = "No staged changes. Run 'git add' first".to_string();
            return;
        }

        let plan = self.store.load_plan(&issue.id).unwrap_or_else(|e| {
            tracing::warn!(issue = %issue.id, error = %e, "closing without plan context");
            String::new()
        });
        let request = TaskRequest {
            prompt: prompts::commit_message(&issue.id, &plan),
            model: Some(self.config.commit_model.clone()),
            session: None,
        };
        match self.orchestrator.start(&issue.id, TaskKind::Commit, request) {
            Ok(()) => {
                self.status = format!("Generating commit message for {}...", issue.id);
                self.pending_close = Some(issue);
                self.mode = InputMode::CommitGenerating;
            }
            Err(busy) => self.status = busy.to_string(),
        }
    }

    fn confirm_discard(&mut self) {
        let Some(issue) = self.selected_or_status() else {
            return;
        };
        if self.reject_if_busy(&issue.id) {
            return;
        }
        self.ask(
            format!("Discard issue {}?", issue.id),
            PendingAction::Discard(issue.id),
        );
    }

    fn ask(&mut self, message: String, action: PendingAction) {
        self.confirm_message = message;
        self.pending = Some(action);
        self.mode = InputMode::Confirm;
    }

    /// Load the brief and dispatch an analysis. Nothing is registered as
    /// processing unless the task actually starts.
    fn start_analysis(&mut self, id: &str) {
        let brief = match self.store.load_brief(id) {
            Ok(Some(brief)) => brief,
            Ok(None) => {
                self.status = "Cannot load brief".to_string();
                return;
            }
            Err(e) => {
                tracing::warn!(issue = id, error = %e, "failed to load brief");
                self.status = "Cannot load brief".to_string();
                return;
            }
        };
        let prompt = prompts::analysis(&brief.body, &self.store.brief_path(id));
        self.dispatch(id, TaskKind::Analyze, prompt, None, format!("Analyzing {}...", id));
    }

    fn start_plan(&mut self, id: &str) {
        let brief = match self.store.load_brief(id) {
            Ok(Some(brief)) => brief,
            Ok(None) | Err(_) => {
                self.status = "Cannot load brief".to_string();
                return;
            }
        };
        let analysis = match self.store.load_analysis(id) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(issue = id, error = %e, "failed to load analysis");
                self.status = "Failed to load analysis".to_string();
                return;
            }
        };
        let session = self.load_session_quiet(id);
        let prompt = prompts::plan(&brief.body, &analysis);
        self.dispatch(id, TaskKind::Plan, prompt, session, format!("Planning {}...", id));
    }

    fn execute_review(&mut self, id: &str, kind: PreviewKind, feedback: &str) {
        if self.reject_if_busy(id) {
            return;
        }
        let (current, task, label) = match kind {
            PreviewKind::Analysis => (
                self.store.load_analysis(id),
                TaskKind::Review,
                format!("Reviewing {}...", id),
            ),
            PreviewKind::Plan => (
                self.store.load_plan(id),
                TaskKind::PlanReview,
                format!("Reviewing plan {}...", id),
            ),
        };
        let current = match current {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(issue = id, error = %e, "failed to load document for review");
                self.status = format!("Cannot review {}: {}", id, e);
                return;
            }
        };
        let session = self.load_session_quiet(id);
        let prompt = match kind {
            PreviewKind::Analysis => prompts::analysis_review(&current, feedback),
            PreviewKind::Plan => prompts::plan_review(&current, feedback),
        };
        self.dispatch(id, task, prompt, session, label);
    }

    fn load_session_quiet(&self, id: &str) -> Option<String> {
        self.store.load_session(id).unwrap_or_else(|e| {
            tracing::debug!(issue = id, error = %e, "no session token");
            None
        })
    }

    fn dispatch(
        &mut self,
        id: &str,
        kind: TaskKind,
        prompt: String,
        session: Option<String>,
        started: String,
    ) {
        let request = TaskRequest {
            prompt,
            model: self.config.analysis_model.clone(),
            session,
        };
        match self.orchestrator.start(id, kind, request) {
            Ok(()) => self.status = started,
            Err(busy) => self.status = busy.to_string(),
        }
        self.refresh_row_width();
    }

    fn commit_and_close(&mut self) -> Vec<Effect> {
        self.mode = InputMode::Normal;
        let message = self.commit_view.raw().to_string();
        self.commit_view.clear();

        let Some(issue) = self.pending_close.take() else {
            self.status = "No pending issue".to_string();
            return vec![];
        };

        if let Err(e) = self.store.update_status(&issue.id, IssueStatus::Closed, None) {
            tracing::warn!(issue = %issue.id, error = %e, "failed to mark issue closed");
        }

        self.status = if self.vcs.has_staged_changes() {
            match self.vcs.commit(&message) {
                Ok(_) => {
                    tracing::info!(issue = %issue.id, "closed and committed");
                    format!("Closed & committed {}", issue.id)
                }
                Err(e) => {
                    tracing::warn!(issue = %issue.id, error = %e, "commit failed");
                    format!("Closed {} (commit failed)", issue.id)
                }
            }
        } else {
            format!("Closed {} (no changes to commit)", issue.id)
        };
        vec![Effect::Refresh]
    }

    // === Results ===

    fn handle_result(&mut self, result: TaskResult) {
        let id = result.issue_id.as_str();
        match result.kind {
            TaskKind::Analyze => {
                self.status = if result.success {
                    self.persist(id, "analysis", self.store.save_analysis(id, &result.output));
                    self.persist_session(id, result.session.as_deref());
                    self.persist(id, "status", self.store.update_status(id, IssueStatus::Analyzed, None));
                    format!("Analyzed {}", id)
                } else {
                    format!("Analyze {} failed", id)
                };
            }
            TaskKind::Plan => {
                self.status = if result.success {
                    self.persist(id, "plan", self.store.save_plan(id, &result.output));
                    self.persist(id, "status", self.store.update_status(id, IssueStatus::Planned, None));
                    format!("Planned {}", id)
                } else {
                    format!("Plan {} failed", id)
                };
            }
            TaskKind::Review => {
                self.status = if result.success {
                    self.persist(id, "analysis", self.store.save_analysis(id, &result.output));
                    self.persist_session(id, result.session.as_deref());
                    format!("Reviewed {}", id)
                } else {
                    format!("Review {} failed", id)
                };
            }
            TaskKind::PlanReview => {
                self.status = if result.success {
                    self.persist(id, "plan", self.store.save_plan(id, &result.output));
                    self.persist_session(id, result.session.as_deref());
                    format!("Plan reviewed {}", id)
                } else {
                    format!("Plan review {} failed", id)
                };
            }
            TaskKind::Commit => self.handle_commit_message(result),
        }
        self.refresh_row_width();
    }

    fn handle_commit_message(&mut self, result: TaskResult) {
        let waiting = self.mode == InputMode::CommitGenerating
            && self
                .pending_close
                .as_ref()
                .is_some_and(|issue| issue.id == result.issue_id);
        if !waiting {
            tracing::debug!(issue = %result.issue_id, "commit message arrived with no close pending");
            return;
        }

        if result.success {
            let layout = self.layout();
            self.commit_view.set_size(layout.commit_width, layout.commit_height);
            self.commit_view.load(result.output.trim());
            self.mode = InputMode::CommitConfirm;
            self.status = "Review commit message".to_string();
        } else {
            self.mode = InputMode::Normal;
            self.pending_close = None;
            self.status = format!("Commit message generation failed: {}", result.issue_id);
        }
    }

    fn persist(&self, id: &str, what: &str, result: StoreResult<()>) {
        if let Err(e) = result {
            tracing::warn!(issue = id, what, error = %e, "failed to persist task output");
        }
    }

    fn persist_session(&self, id: &str, session: Option<&str>) {
        if let Some(token) = session.filter(|t| !t.is_empty()) {
            self.persist(id, "session", self.store.save_session(id, token));
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
