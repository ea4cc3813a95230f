use std::ops::Range;

/// Scroll state of the issue list: a selection cursor kept inside a vertical
/// window, plus a horizontal column offset shared by every row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListViewport {
    /// Index of the first visible row
    pub offset: usize,
    /// First visible display column
    pub h_offset: usize,
    pub selected: usize,
    len: usize,
    max_row_width: usize,
}

impl ListViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_row_width(&self) -> usize {
        self.max_row_width
    }

    /// Row set replaced; keeps the selection index where possible
    pub fn set_len(&mut self, len: usize, visible_height: usize) {
        self.len = len;
        self.ensure_selected_visible(visible_height);
    }

    /// Widest rendered row changed (new rows, or a processing suffix came or went)
    pub fn set_max_row_width(&mut self, width: usize, visible_width: usize) {
        self.max_row_width = width;
        self.clamp_horizontal(visible_width);
    }

    pub fn move_up(&mut self, visible_height: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.ensure_selected_visible(visible_height);
    }

    pub fn move_down(&mut self, visible_height: usize) {
        if self.selected + 1 < self.len {
            self.selected += 1;
        }
        self.ensure_selected_visible(visible_height);
    }

    /// Clamp the selection into range and scroll the minimum needed to show
    /// it. Idempotent.
    pub fn ensure_selected_visible(&mut self, visible_height: usize) {
        if self.len == 0 {
            self.selected = 0;
            self.offset = 0;
            return;
        }
        let height = visible_height.max(1);

        self.selected = self.selected.min(self.len - 1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
        self.offset = self.offset.min(self.len.saturating_sub(height));
    }

    pub fn max_h_offset(&self, visible_width: usize) -> usize {
        self.max_row_width.saturating_sub(visible_width)
    }

    pub fn scroll_left(&mut self, step: usize) {
        self.h_offset = self.h_offset.saturating_sub(step);
    }

    pub fn scroll_right(&mut self, step: usize, visible_width: usize) {
        self.h_offset = (self.h_offset + step).min(self.max_h_offset(visible_width));
    }

    pub fn clamp_horizontal(&mut self, visible_width: usize) {
        self.h_offset = self.h_offset.min(self.max_h_offset(visible_width));
    }

    /// Row indices currently on screen
    pub fn visible_range(&self, visible_height: usize) -> Range<usize> {
        let end = (self.offset + visible_height).min(self.len);
        self.offset.min(end)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(len: usize, height: usize) -> ListViewport {
        let mut list = ListViewport::new();
        list.set_len(len, height);
        list
    }

    #[test]
    fn test_moving_down_scrolls_minimally() {
        let mut list = viewport(10, 5);
        for _ in 0..9 {
            list.move_down(5);
        }
        assert_eq!(list.selected, 9);
        assert_eq!(list.offset, 5);
    }

    #[test]
    fn test_move_down_stops_at_last_row() {
        let mut list = viewport(3, 5);
        for _ in 0..10 {
            list.move_down(5);
        }
        assert_eq!(list.selected, 2);
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn test_move_up_scrolls_back() {
        let mut list = viewport(10, 3);
        list.selected = 9;
        list.ensure_selected_visible(3);
        assert_eq!(list.offset, 7);
        for _ in 0..5 {
            list.move_up(3);
        }
        assert_eq!(list.selected, 4);
        assert_eq!(list.offset, 4);
    }

    #[test]
    fn test_selection_always_visible() {
        for len in 1..12 {
            for height in 1..8 {
                let mut list = viewport(len, height);
                for step in 0..30 {
                    if step % 7 < 4 {
                        list.move_down(height);
                    } else {
                        list.move_up(height);
                    }
                    assert!(list.selected < len);
                    assert!(list.offset <= list.selected);
                    assert!(list.selected < list.offset + height);
                }
            }
        }
    }

    #[test]
    fn test_ensure_visible_is_idempotent() {
        let mut list = viewport(20, 4);
        list.selected = 13;
        list.ensure_selected_visible(4);
        let once = list.clone();
        list.ensure_selected_visible(4);
        assert_eq!(list, once);
    }

    #[test]
    fn test_shrinking_list_clamps_selection() {
        let mut list = viewport(10, 4);
        list.selected = 9;
        list.ensure_selected_visible(4);
        list.set_len(3, 4);
        assert_eq!(list.selected, 2);
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn test_empty_list_resets() {
        let mut list = viewport(5, 2);
        list.selected = 4;
        list.set_len(0, 2);
        assert_eq!(list.selected, 0);
        assert_eq!(list.offset, 0);
        assert_eq!(list.visible_range(2), 0..0);
    }

    #[test]
    fn test_horizontal_scroll_is_bounded() {
        let mut list = viewport(1, 1);
        list.set_max_row_width(50, 20);
        for _ in 0..10 {
            list.scroll_right(8, 20);
            assert!(list.h_offset <= 30);
        }
        assert_eq!(list.h_offset, 30);
        for _ in 0..10 {
            list.scroll_left(8);
        }
        assert_eq!(list.h_offset, 0);
    }

    #[test]
    fn test_narrower_rows_pull_offset_back() {
        let mut list = viewport(1, 1);
        list.set_max_row_width(100, 20);
        list.scroll_right(64, 20);
        assert_eq!(list.h_offset, 64);
        list.set_max_row_width(30, 20);
        assert_eq!(list.h_offset, 10);
        list.set_max_row_width(10, 20);
        assert_eq!(list.h_offset, 0);
    }

    #[test]
    fn test_visible_range() {
        let mut list = viewport(10, 4);
        list.selected = 6;
        list.ensure_selected_visible(4);
        assert_eq!(list.visible_range(4), 3..7);
    }
}
