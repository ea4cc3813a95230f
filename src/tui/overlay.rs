//! Popup compositing over a pre-rendered frame. Columns are addressed by
//! display width; every output row is exactly the frame width.

use super::text::{column_window, display_width, fit_width};

/// Top-left corner `(x, y)` that centers a `ov_width` x `ov_height` block
pub fn centered_anchor(
    bg_width: usize,
    bg_height: usize,
    ov_width: usize,
    ov_height: usize,
) -> (usize, usize) {
    (
        bg_width.saturating_sub(ov_width) / 2,
        bg_height.saturating_sub(ov_height) / 2,
    )
}

/// Widest row of a block
pub fn block_width(lines: &[String]) -> usize {
    lines.iter().map(|l| display_width(l)).max().unwrap_or(0)
}

/// Center `overlay` on `background`. Keeps the background's row count; overlay
/// rows that fall below the last background row are dropped.
pub fn composite(background: &[String], overlay: &[String], width: usize) -> Vec<String> {
    let ov_width = block_width(overlay).min(width);
    let (x, y) = centered_anchor(width, background.len(), ov_width, overlay.len());

    background
        .iter()
        .enumerate()
        .map(|(row, base)| match row.checked_sub(y).and_then(|i| overlay.get(i)) {
            Some(line) => composite_line_at(base, line, x, ov_width, width),
            None => column_window(base, 0, width),
        })
        .collect()
}

/// Splice `overlay_line` into `base_line` at `start_col`. Background glyphs cut
/// by either edge of the splice become spaces.
pub fn composite_line_at(
    base_line: &str,
    overlay_line: &str,
    start_col: usize,
    overlay_width: usize,
    total_width: usize,
) -> String {
    if start_col >= total_width {
        return column_window(base_line, 0, total_width);
    }

    let overlay_width = overlay_width.min(total_width - start_col);
    let after_start = start_col + overlay_width;

    let mut out = column_window(base_line, 0, start_col);
    out.push_str(&fit_width(overlay_line, overlay_width));
    out.push_str(&column_window(base_line, after_start, total_width - after_start));
    out
}
