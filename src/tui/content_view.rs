//! Scroll state over one long document (analysis, plan, commit message).
//!
//! The document is kept raw and re-laid-out whenever the width, horizontal
//! offset or wrap mode changes, so the visible rows are always a pure function
//! of `(raw, width, h_offset, wrap)`.

use super::text::{display_width, expand_tabs, slice_columns, wrap_lines};

#[derive(Debug, Default, Clone)]
pub struct ContentViewport {
    raw: String,
    lines: Vec<String>,
    /// Index of the first visible row
    pub offset: usize,
    /// First visible display column (unwrapped mode only)
    pub h_offset: usize,
    max_line_width: usize,
    width: usize,
    height: usize,
    wrap: bool,
}

impl ContentViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a new document from the top-left corner
    pub fn load(&mut self, text: &str) {
        self.raw = text.to_string();
        self.offset = 0;
        self.h_offset = 0;
        self.max_line_width = text
            .lines()
            .map(|l| display_width(&expand_tabs(l)))
            .max()
            .unwrap_or(0);
        self.relayout();
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.lines.clear();
        self.offset = 0;
        self.h_offset = 0;
        self.max_line_width = 0;
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.h_offset = self.h_offset.min(self.max_h_offset());
        self.relayout();
    }

    /// Switch between soft-wrapped rows and horizontally scrollable hard lines
    pub fn toggle_wrap(&mut self) {
        self.wrap = !self.wrap;
        self.h_offset = 0;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.lines = if self.wrap {
            wrap_lines(&self.raw, self.width)
        } else {
            self.raw
                .lines()
                .map(|l| slice_columns(&expand_tabs(l), self.h_offset, self.width))
                .collect()
        };
        self.offset = self.offset.min(self.max_offset());
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height.max(1))
    }

    pub fn max_h_offset(&self) -> usize {
        if self.wrap {
            0
        } else {
            self.max_line_width.saturating_sub(self.width)
        }
    }

    pub fn line_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn line_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub fn half_page_up(&mut self) {
        self.line_up((self.height / 2).max(1));
    }

    pub fn half_page_down(&mut self) {
        self.line_down((self.height / 2).max(1));
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn scroll_left(&mut self, step: usize) {
        let next = self.h_offset.saturating_sub(step);
        if next != self.h_offset {
            self.h_offset = next;
            self.relayout();
        }
    }

    pub fn scroll_right(&mut self, step: usize) {
        let next = (self.h_offset + step).min(self.max_h_offset());
        if next != self.h_offset {
            self.h_offset = next;
            self.relayout();
        }
    }

    /// Rows currently on screen
    pub fn visible_lines(&self) -> &[String] {
        let start = self.offset.min(self.lines.len());
        let end = (start + self.height).min(self.lines.len());
        &self.lines[start..end]
    }

    /// 0.0 at the top, 1.0 at the bottom or when everything fits
    pub fn scroll_percent(&self) -> f64 {
        let max = self.max_offset();
        if self.lines.len() <= self.height || max == 0 {
            return 1.0;
        }
        self.offset as f64 / max as f64
    }
}
