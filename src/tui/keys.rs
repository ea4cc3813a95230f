//! Key bindings as a table from (mode, key) to an [`Action`]. The session
//! interprets actions; nothing here touches state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::input::InputMode;
use crate::issue::IssueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // list
    MoveUp,
    MoveDown,
    New,
    Edit,
    Analyze,
    Plan,
    Review,
    PlanReview,
    Implement,
    Close,
    Discard,
    Refresh,
    CycleFilter,
    Quit,

    // horizontal scroll of the list or the preview
    ScrollLeft,
    ScrollRight,

    // text input
    Submit,
    InsertChar(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    WordLeft,
    WordRight,

    /// Leave the current popup
    Cancel,
    /// Yes/no answer (confirm and commit popups)
    Confirm(bool),
    SelectType(IssueType),

    // previews
    LineUp,
    LineDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
    EditDocument,
    Feedback,
    ToggleWrap,
}

pub fn action_for(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Normal => normal(key),
        InputMode::TextInput(_) => text_input(key),
        InputMode::Confirm => confirm(key),
        InputMode::TypeSelect => type_select(key),
        InputMode::Preview(_) => preview(key),
        InputMode::CommitConfirm => commit_confirm(key),
        InputMode::CommitGenerating => None,
    }
}

fn has_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn normal(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('c') if has_ctrl(&key) => Action::Quit,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('h') | KeyCode::Left => Action::ScrollLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::ScrollRight,
        KeyCode::Char('n') => Action::New,
        KeyCode::Char('e') | KeyCode::Enter => Action::Edit,
        KeyCode::Char('a') => Action::Analyze,
        KeyCode::Char('p') => Action::Plan,
        KeyCode::Char('R') => Action::Review,
        KeyCode::Char('P') => Action::PlanReview,
        KeyCode::Char('i') => Action::Implement,
        KeyCode::Char('c') => Action::Close,
        KeyCode::Char('d') => Action::Discard,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('f') => Action::CycleFilter,
        _ => return None,
    };
    Some(action)
}

fn text_input(key: KeyEvent) -> Option<Action> {
    let has_alt = key.modifiers.contains(KeyModifiers::ALT);
    let action = match key.code {
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Left if has_alt => Action::WordLeft,
        KeyCode::Right if has_alt => Action::WordRight,
        // macOS: Option+Left/Right sends Alt+b / Alt+f
        KeyCode::Char('b') if has_alt => Action::WordLeft,
        KeyCode::Char('f') if has_alt => Action::WordRight,
        KeyCode::Left => Action::CursorLeft,
        KeyCode::Right => Action::CursorRight,
        KeyCode::Home => Action::CursorHome,
        KeyCode::End => Action::CursorEnd,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Char(c) if !has_ctrl(&key) => Action::InsertChar(c),
        _ => return None,
    };
    Some(action)
}

fn confirm(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Confirm(true)),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Confirm(false)),
        _ => None,
    }
}

fn type_select(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('f') | KeyCode::Char('1') => Some(Action::SelectType(IssueType::Feature)),
        KeyCode::Char('b') | KeyCode::Char('2') => Some(Action::SelectType(IssueType::Bug)),
        KeyCode::Char('r') | KeyCode::Char('3') => Some(Action::SelectType(IssueType::Refactor)),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}

fn preview(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('u') if has_ctrl(&key) => Action::HalfPageUp,
        KeyCode::Char('d') if has_ctrl(&key) => Action::HalfPageDown,
        KeyCode::Char('k') | KeyCode::Up => Action::LineUp,
        KeyCode::Char('j') | KeyCode::Down => Action::LineDown,
        KeyCode::PageUp => Action::HalfPageUp,
        KeyCode::PageDown => Action::HalfPageDown,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        KeyCode::Char('h') | KeyCode::Left => Action::ScrollLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::ScrollRight,
        KeyCode::Char('w') => Action::ToggleWrap,
        KeyCode::Char('e') => Action::EditDocument,
        KeyCode::Char('f') => Action::Feedback,
        KeyCode::Char('c') | KeyCode::Esc => Action::Cancel,
        _ => return None,
    };
    Some(action)
}

fn commit_confirm(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('k') | KeyCode::Up => Some(Action::LineUp),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::LineDown),
        KeyCode::Char('y') | KeyCode::Enter => Some(Action::Confirm(true)),
        KeyCode::Char('n') | KeyCode::Esc => Some(Action::Confirm(false)),
        _ => None,
    }
}
