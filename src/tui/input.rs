/// Which key-handling contract is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode - navigating the issue list
    Normal,
    /// Single-line text entry
    TextInput(InputPurpose),
    /// Yes/no question about the pending action
    Confirm,
    /// Choosing the type of a new issue
    TypeSelect,
    /// Scrollable analysis or plan popup
    Preview(PreviewKind),
    /// Approving a generated commit message
    CommitConfirm,
    /// Waiting for the commit message; keys are ignored
    CommitGenerating,
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    NewIssue,
    AnalysisFeedback,
    PlanFeedback,
}

impl InputPurpose {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputPurpose::NewIssue => "Title: ",
            InputPurpose::AnalysisFeedback => "Feedback: ",
            InputPurpose::PlanFeedback => "Plan Feedback: ",
        }
    }

    /// Preview that feedback input returns to when cancelled
    pub fn origin(&self) -> Option<PreviewKind> {
        match self {
            InputPurpose::NewIssue => None,
            InputPurpose::AnalysisFeedback => Some(PreviewKind::Analysis),
            InputPurpose::PlanFeedback => Some(PreviewKind::Plan),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Analysis,
    Plan,
}

impl PreviewKind {
    pub fn title(&self) -> &'static str {
        match self {
            PreviewKind::Analysis => "Review Analysis:",
            PreviewKind::Plan => "Review Plan:",
        }
    }

    pub fn feedback_purpose(&self) -> InputPurpose {
        match self {
            PreviewKind::Analysis => InputPurpose::AnalysisFeedback,
            PreviewKind::Plan => InputPurpose::PlanFeedback,
        }
    }
}

pub const INPUT_CHAR_LIMIT: usize = 200;

/// Single-line editor. `cursor` is a byte offset that always sits on a char
/// boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineInput {
    buffer: String,
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text before and after the cursor, for drawing the cursor block
    pub fn split(&self) -> (&str, &str) {
        self.buffer.split_at(self.cursor)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the (trimmed) value and reset
    pub fn take(&mut self) -> String {
        let value = self.buffer.trim().to_string();
        self.clear();
        value
    }

    pub fn insert(&mut self, c: char) {
        if c.is_control() || self.buffer.chars().count() >= INPUT_CHAR_LIMIT {
            return;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Jump to the start of the previous word (Alt+Left)
    pub fn word_left(&mut self) {
        let before = &self.buffer[..self.cursor];
        let trimmed = before.trim_end_matches(|c: char| !c.is_alphanumeric());
        self.cursor = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
    }

    /// Jump past the end of the next word (Alt+Right)
    pub fn word_right(&mut self) {
        let after = &self.buffer[self.cursor..];
        let skipped = after.len() - after.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
        let rest = &after[skipped..];
        let word = rest
            .char_indices()
            .find(|(_, c)| !c.is_alphanumeric())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.cursor += skipped + word;
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> LineInput {
        let mut input = LineInput::new();
        text.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn test_insert_and_cursor_moves() {
        let mut input = typed("helo");
        input.left();
        input.insert('l');
        assert_eq!(input.value(), "hello");
        input.home();
        input.insert('>');
        input.end();
        input.insert('!');
        assert_eq!(input.value(), ">hello!");
    }

    #[test]
    fn test_backspace_and_delete_multibyte() {
        let mut input = typed("a日b");
        input.backspace();
        assert_eq!(input.value(), "a日");
        input.left();
        input.delete();
        assert_eq!(input.value(), "a");
        input.backspace();
        input.backspace();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_char_limit() {
        let input = typed(&"x".repeat(INPUT_CHAR_LIMIT + 20));
        assert_eq!(input.value().chars().count(), INPUT_CHAR_LIMIT);
    }

    #[test]
    fn test_take_trims_and_resets() {
        let mut input = typed("  fix login  ");
        assert_eq!(input.take(), "fix login");
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_word_jumps() {
        let mut input = typed("fix the login bug");
        input.word_left();
        assert_eq!(input.split().1, "bug");
        input.word_left();
        assert_eq!(input.split().1, "login bug");
        input.word_right();
        assert_eq!(input.split().0, "fix the login");
        input.home();
        input.word_right();
        assert_eq!(input.split().0, "fix");
    }

    #[test]
    fn test_feedback_purpose_returns_to_preview() {
        assert_eq!(InputPurpose::NewIssue.origin(), None);
        assert_eq!(
            PreviewKind::Plan.feedback_purpose().origin(),
            Some(PreviewKind::Plan)
        );
    }
}
