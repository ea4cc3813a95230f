//! Column-accurate text layout. Widths are terminal columns, so wide CJK
//! glyphs and emoji count as two. A width of zero leaves input untouched.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const TAB_STOP: usize = 4;
pub const ELLIPSIS: &str = "...";

/// Columns occupied by a single grapheme cluster
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.chars().any(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Columns occupied by `text` (a single line)
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Replace tabs with spaces up to the next tab stop
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut col = 0;
    for g in line.graphemes(true) {
        if g == "\t" {
            let n = TAB_STOP - (col % TAB_STOP);
            out.extend(std::iter::repeat(' ').take(n));
            col += n;
        } else {
            out.push_str(g);
            col += grapheme_width(g);
        }
    }
    out
}

/// Wrap one hard line into rows no wider than `width`. A glyph that would
/// cross the boundary moves to the next row and the short row gets one space
/// of padding. A glyph wider than `width` sits alone on its row.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for g in line.graphemes(true) {
        let w = grapheme_width(g);
        if current_width > 0 && current_width + w > width {
            if current_width < width {
                current.push(' ');
            }
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push_str(g);
        current_width += w;
    }
    rows.push(current);
    rows
}

/// Wrap every line of `text` (tabs expanded) into display rows
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| wrap_line(&expand_tabs(line), width))
        .collect()
}

/// Cut `line` to at most `width` columns, ending in "..." when anything was
/// dropped. Budgets narrower than the ellipsis get dots only.
pub fn truncate(line: &str, width: usize) -> String {
    if width == 0 || display_width(line) <= width {
        return line.to_string();
    }
    if width <= ELLIPSIS.len() {
        return ".".repeat(width);
    }

    let budget = width - ELLIPSIS.len();
    let mut out = String::new();
    let mut used = 0;
    for g in line.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > budget {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

/// View of `line` starting at display column `offset`, truncated to `width`.
/// If `offset` lands inside a wide glyph, that glyph becomes one space.
pub fn slice_columns(line: &str, offset: usize, width: usize) -> String {
    if width == 0 {
        return line.to_string();
    }

    let mut col = 0;
    let mut visible = String::new();
    let mut rest = "";
    for (idx, g) in line.grapheme_indices(true) {
        if col >= offset {
            rest = &line[idx..];
            break;
        }
        col += grapheme_width(g);
        if col > offset {
            visible.push(' ');
            rest = &line[idx + g.len()..];
            break;
        }
    }
    visible.push_str(rest);
    truncate(&visible, width)
}

/// Exactly `len` columns of `line` starting at column `start`. Glyphs cut by
/// either edge are replaced by spaces; short lines are padded.
pub fn column_window(line: &str, start: usize, len: usize) -> String {
    let end = start + len;
    let mut out = String::new();
    let mut out_width = 0;
    let mut col = 0;

    for g in line.graphemes(true) {
        let w = grapheme_width(g);
        let (g_start, g_end) = (col, col + w);
        col = g_end;
        if g_end <= start {
            continue;
        }
        if g_start >= end {
            break;
        }
        if g_start >= start && g_end <= end {
            out.push_str(g);
            out_width += w;
        } else {
            let cut = g_end.min(end) - g_start.max(start);
            out.extend(std::iter::repeat(' ').take(cut));
            out_width += cut;
        }
    }

    pad_to_width(out, out_width, len)
}

/// Truncate then pad so the result is exactly `width` columns
pub fn fit_width(line: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let cut = truncate(line, width);
    let w = display_width(&cut);
    pad_to_width(cut, w, width)
}

fn pad_to_width(mut s: String, current: usize, width: usize) -> String {
    if current < width {
        s.extend(std::iter::repeat(' ').take(width - current));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width_counts_wide_glyphs() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("a🚀b"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let text = "The quick 日本語 fox 🚀🚀 jumps over\nsecond line with\ttab";
        for width in 2..20 {
            for row in wrap_lines(text, width) {
                assert!(
                    display_width(&row) <= width,
                    "row {:?} wider than {}",
                    row,
                    width
                );
            }
        }
    }

    #[test]
    fn test_wrap_pads_instead_of_splitting_wide_glyph() {
        let rows = wrap_line("ab日", 3);
        assert_eq!(rows, vec!["ab ".to_string(), "日".to_string()]);
    }

    #[test]
    fn test_wrap_glyph_wider_than_width_stands_alone() {
        let rows = wrap_line("a日b", 1);
        assert_eq!(rows, vec!["a", "日", "b"]);
    }

    #[test]
    fn test_wrap_zero_width_is_noop() {
        assert_eq!(wrap_lines("hello\nworld", 0), vec!["hello", "world"]);
        assert_eq!(wrap_line("hello", 0), vec!["hello"]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        assert_eq!(wrap_lines("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("hello", 2), "..");
        assert_eq!(truncate("hello", 0), "hello");
    }

    #[test]
    fn test_truncate_respects_wide_glyphs() {
        let out = truncate("日本語テキスト", 8);
        assert_eq!(out, "日本...");
        assert!(display_width(&out) <= 8);
    }

    #[test]
    fn test_slice_skips_whole_glyphs() {
        assert_eq!(slice_columns("abcdef", 2, 10), "cdef");
        assert_eq!(slice_columns("abcdef", 10, 10), "");
        assert_eq!(slice_columns("abcdefgh", 1, 5), "bc...");
    }

    #[test]
    fn test_slice_pads_when_offset_inside_wide_glyph() {
        assert_eq!(slice_columns("日本", 1, 10), " 本");
        assert_eq!(slice_columns("日本", 2, 10), "本");
    }

    #[test]
    fn test_column_window_replaces_straddling_glyphs() {
        assert_eq!(column_window("日本語", 1, 4), " 本 ");
        assert_eq!(column_window("ab", 0, 4), "ab  ");
        assert_eq!(display_width(&column_window("🚀x🚀", 1, 3)), 3);
    }

    #[test]
    fn test_fit_width_is_exact() {
        assert_eq!(fit_width("ab", 4), "ab  ");
        assert_eq!(display_width(&fit_width("日本語テキスト", 7)), 7);
        assert_eq!(fit_width("abc", 0), "");
    }

    #[test]
    fn test_expand_tabs_to_stops() {
        assert_eq!(expand_tabs("a\tb"), "a   b");
        assert_eq!(expand_tabs("abcd\te"), "abcd    e");
    }
}
