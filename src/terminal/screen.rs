//! `ScreenBuffer`: the character-cell grid an `AnsiParser` drives, with
//! scrollback, a main/alternate screen pair, and deferred line wrap.
//!
//! Adapted from the teacher's `TerminalState`, but reshaped around values
//! instead of live IPC events: there is no dirty-line tracking here, because
//! nothing consumes incremental diffs — renderers clone a full snapshot of
//! the buffer at a point in time instead.

use std::collections::VecDeque;

use super::color::Color;
use super::cursor::{CellAttrs, CursorState};
use super::grid::{Cell, CellFlags, Grid, Row};
use super::wide::{is_wide, vs16_promotes};

/// The style a glyph is printed with: foreground, background, and the
/// boolean attribute set merged by SGR operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
        }
    }
}

/// Line/display erase modes shared by CSI `J` and `K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    ToEnd,
    ToStart,
    All,
}

#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    width: u16,
    height: u16,
    main: Grid,
    alt: Grid,
    using_alt: bool,
    saved_main_cursor: Option<CursorState>,
    pub cursor: CursorState,
    pub pending_wrap: bool,
    pub scrollback: VecDeque<Row>,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            main: Grid::new(height, width),
            alt: Grid::new(height, width),
            using_alt: false,
            saved_main_cursor: None,
            cursor: CursorState::new(),
            pending_wrap: false,
            scrollback: VecDeque::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn is_alt_screen(&self) -> bool {
        self.using_alt
    }

    pub fn active_grid(&self) -> &Grid {
        if self.using_alt { &self.alt } else { &self.main }
    }

    fn active_grid_mut(&mut self) -> &mut Grid {
        if self.using_alt { &mut self.alt } else { &mut self.main }
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Iterate scrollback followed by the visible grid, top to bottom —
    /// the full history a renderer walks when scrollback is included.
    pub fn rows_with_scrollback(&self) -> impl Iterator<Item = &Row> {
        self.scrollback.iter().chain(self.active_grid().rows.iter())
    }

    fn current_style(&self) -> Style {
        Style {
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            attrs: self.cursor.attrs,
        }
    }

    /// Advance to the next line, scrolling if needed, and reset the column —
    /// shared by deferred-wrap resolution and the wide-glyph-at-edge case.
    fn advance_line(&mut self) {
        self.cursor.row += 1;
        if self.cursor.row >= self.height {
            self.scroll_up(1);
            self.cursor.row = self.height - 1;
        }
        self.cursor.col = 0;
    }

    pub fn put_grapheme(&mut self, g: &str, style: Style) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.advance_line();
        }

        let wide = g.chars().next().map(is_wide).unwrap_or(false);

        if wide && self.cursor.col == self.width - 1 {
            let bg = self.cursor.bg;
            let row = self.cursor.row;
            let col = self.cursor.col;
            self.active_grid_mut().cell_mut(row, col).erase(bg);
            self.advance_line();
        }

        let row = self.cursor.row;
        let col = self.cursor.col;
        {
            let grid = self.active_grid_mut();
            let cell = grid.cell_mut(row, col);
            cell.text.clear();
            cell.text.push_str(g);
            cell.fg = style.fg;
            cell.bg = style.bg;
            cell.attrs = style.attrs;
            cell.flags = if wide { CellFlags::WIDE } else { CellFlags::empty() };
            if wide && col + 1 < self.width {
                *grid.cell_mut(row, col + 1) = Cell::wide_continuation();
            }
        }

        let step: u32 = if wide { 2 } else { 1 };
        let new_col = col as u32 + step;
        if new_col >= self.width as u32 {
            self.cursor.col = self.width - 1;
            self.pending_wrap = true;
        } else {
            self.cursor.col = new_col as u16;
        }
    }

    /// Append a combining mark to the last printed cell. Steps back over a
    /// continuation half to find the owning wide cell. A mark arriving with
    /// no prior cell to attach to (cursor at the origin of a fresh buffer)
    /// is a no-op.
    pub fn append_combining(&mut self, mark: &str) {
        if self.cursor.col == 0 {
            return;
        }
        let (row, mut col) = (self.cursor.row, self.cursor.col - 1);

        if self
            .active_grid()
            .cell(row, col)
            .flags
            .contains(CellFlags::WIDE_CONTINUATION)
            && col > 0
        {
            col -= 1;
        }

        let is_vs16 = mark == "\u{FE0F}";
        let grid = self.active_grid_mut();
        let base_char = grid.cell(row, col).text.chars().next();
        grid.cell_mut(row, col).text.push_str(mark);

        if is_vs16 {
            if let Some(base) = base_char {
                if vs16_promotes(base) && col + 1 < grid.cols {
                    let next_is_plain_space = grid.cell(row, col + 1).is_blank();
                    if next_is_plain_space {
                        grid.cell_mut(row, col).flags = CellFlags::WIDE;
                        *grid.cell_mut(row, col + 1) = Cell::wide_continuation();
                    }
                }
            }
        }
    }

    pub fn line_feed(&mut self) {
        self.pending_wrap = false;
        self.cursor.row += 1;
        if self.cursor.row >= self.height {
            self.scroll_up(1);
            self.cursor.row = self.height - 1;
        }
    }

    pub fn carriage_return(&mut self) {
        self.pending_wrap = false;
        self.cursor.col = 0;
    }

    pub fn backspace(&mut self) {
        self.cursor.col = self.cursor.col.saturating_sub(1);
    }

    pub fn tab(&mut self) {
        let next = ((self.cursor.col / 8) + 1) * 8;
        self.cursor.col = next.min(self.width - 1);
    }

    /// Scroll the active grid up by `n`. Rows pushed off the main screen's
    /// top are appended to scrollback; alt-screen content never is.
    pub fn scroll_up(&mut self, n: u16) {
        let using_alt = self.using_alt;
        for _ in 0..n {
            let cols = self.active_grid().cols;
            let top = {
                let grid = self.active_grid_mut();
                let top = grid.rows.remove(0);
                grid.rows.push(Row::new(cols));
                top
            };
            if !using_alt {
                self.scrollback.push_back(top);
            }
        }
    }

    pub fn move_to(&mut self, row: u16, col: u16) {
        self.cursor.row = row.min(self.height - 1);
        self.cursor.col = col.min(self.width - 1);
        self.pending_wrap = false;
    }

    pub fn move_by(&mut self, drow: i32, dcol: i32) {
        let nr = (self.cursor.row as i32 + drow).clamp(0, self.height as i32 - 1);
        let nc = (self.cursor.col as i32 + dcol).clamp(0, self.width as i32 - 1);
        self.cursor.row = nr as u16;
        self.cursor.col = nc as u16;
        self.pending_wrap = false;
    }

    pub fn save_cursor(&mut self) {
        self.cursor.save();
    }

    pub fn restore_cursor(&mut self) {
        self.cursor.restore();
        self.pending_wrap = false;
    }

    pub fn clear_line(&mut self, mode: EraseMode) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let cols = self.width;
        let bg = self.cursor.bg;
        let grid = self.active_grid_mut();
        match mode {
            EraseMode::ToEnd => grid.erase_cells(row, col, cols, bg),
            EraseMode::ToStart => grid.erase_cells(row, 0, col + 1, bg),
            EraseMode::All => grid.erase_cells(row, 0, cols, bg),
        }
    }

    pub fn clear_display(&mut self, mode: EraseMode) {
        let bg = self.cursor.bg;
        let cols = self.width;
        let height = self.height;
        let row = self.cursor.row;
        match mode {
            EraseMode::ToEnd => {
                self.clear_line(EraseMode::ToEnd);
                let grid = self.active_grid_mut();
                for r in (row + 1)..height {
                    grid.erase_cells(r, 0, cols, bg);
                }
            }
            EraseMode::ToStart => {
                {
                    let grid = self.active_grid_mut();
                    for r in 0..row {
                        grid.erase_cells(r, 0, cols, bg);
                    }
                }
                self.clear_line(EraseMode::ToStart);
            }
            EraseMode::All => self.active_grid_mut().clear(bg),
        }
    }

    /// Overwrite `n` cells from the cursor with blanks, widening the range
    /// so a wide/continuation pair is never left half-erased.
    pub fn erase_chars(&mut self, n: u16) {
        if n == 0 {
            return;
        }
        let row = self.cursor.row;
        let col = self.cursor.col;
        let bg = self.cursor.bg;
        let width = self.width;
        let mut start = col;
        if self
            .active_grid()
            .cell(row, start)
            .flags
            .contains(CellFlags::WIDE_CONTINUATION)
            && start > 0
        {
            start -= 1;
        }
        let mut stop = (col as u32 + n as u32).min(width as u32) as u16;
        if stop > 0 && stop < width {
            let last = stop - 1;
            if self.active_grid().cell(row, last).flags.contains(CellFlags::WIDE) {
                stop += 1;
            }
        }
        self.active_grid_mut().erase_cells(row, start, stop, bg);
    }

    pub fn delete_chars(&mut self, n: u16) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let bg = self.cursor.bg;
        self.active_grid_mut().delete_cells(row, col, n, bg);
    }

    /// Toggle the alternate screen. Idempotent: entering alt while already
    /// in alt, or leaving while already on main, is a no-op.
    pub fn set_alternate_screen(&mut self, on: bool) {
        if on == self.using_alt {
            return;
        }
        if on {
            self.saved_main_cursor = Some(self.cursor.clone());
            self.alt.clear(Color::Default);
            self.cursor = CursorState::new();
            self.pending_wrap = false;
            self.using_alt = true;
        } else {
            self.using_alt = false;
            if let Some(saved) = self.saved_main_cursor.take() {
                self.cursor = saved;
            }
            self.pending_wrap = false;
        }
    }

    /// Resize both grids. The main grid preserves its top-left overlap (no
    /// scrollback is synthesized or discarded by a resize); the alt grid is
    /// wiped, matching real terminals where a resized full-screen app
    /// repaints from scratch.
    pub fn resize(&mut self, width: u16, height: u16) {
        let width = width.max(1);
        let height = height.max(1);
        self.main.resize(height, width);
        self.alt.resize(height, width);
        self.alt.clear(Color::Default);
        self.width = width;
        self.height = height;
        self.cursor.row = self.cursor.row.min(height - 1);
        self.cursor.col = self.cursor.col.min(width - 1);
        self.pending_wrap = false;
    }

    pub fn apply_style_update(&mut self, f: impl FnOnce(&mut Style)) {
        let mut style = self.current_style();
        f(&mut style);
        self.cursor.fg = style.fg;
        self.cursor.bg = style.bg;
        self.cursor.attrs = style.attrs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(buf: &mut ScreenBuffer, s: &str) {
        for g in s.chars().map(String::from) {
            buf.put_grapheme(&g, Style::default());
        }
    }

    #[test]
    fn put_grapheme_advances_cursor() {
        let mut buf = ScreenBuffer::new(8, 2);
        put(&mut buf, "Hi");
        assert_eq!((buf.cursor.row, buf.cursor.col), (0, 2));
        assert_eq!(buf.active_grid().cell(0, 0).text, "H");
        assert_eq!(buf.active_grid().cell(0, 1).text, "i");
    }

    #[test]
    fn deferred_wrap_defers_to_next_printable() {
        let mut buf = ScreenBuffer::new(4, 2);
        put(&mut buf, "abcd");
        assert!(buf.pending_wrap);
        assert_eq!((buf.cursor.row, buf.cursor.col), (0, 3));
        put(&mut buf, "e");
        assert_eq!((buf.cursor.row, buf.cursor.col), (1, 1));
        assert_eq!(buf.active_grid().cell(1, 0).text, "e");
    }

    #[test]
    fn carriage_return_then_full_line_write_has_no_spurious_blank() {
        let mut buf = ScreenBuffer::new(4, 2);
        put(&mut buf, "abcd");
        buf.carriage_return();
        assert!(!buf.pending_wrap);
        assert_eq!(buf.cursor.col, 0);
        assert_eq!(buf.cursor.row, 0);
    }

    #[test]
    fn wide_char_occupies_two_cells() {
        let mut buf = ScreenBuffer::new(8, 2);
        put(&mut buf, "中文");
        assert_eq!(buf.active_grid().cell(0, 0).text, "中");
        assert!(buf.active_grid().cell(0, 0).flags.contains(CellFlags::WIDE));
        assert!(buf
            .active_grid()
            .cell(0, 1)
            .flags
            .contains(CellFlags::WIDE_CONTINUATION));
        assert_eq!(buf.active_grid().cell(0, 2).text, "文");
        assert_eq!(buf.cursor.col, 4);
    }

    #[test]
    fn wide_glyph_in_last_column_defers_then_wraps() {
        let mut buf = ScreenBuffer::new(3, 2);
        put(&mut buf, "a");
        put(&mut buf, "中");
        assert_eq!(buf.cursor.row, 1);
        assert_eq!(buf.active_grid().cell(0, 1).text, " ");
    }

    #[test]
    fn combining_mark_at_origin_is_noop() {
        let mut buf = ScreenBuffer::new(4, 2);
        buf.append_combining("\u{0301}");
        assert_eq!(buf.active_grid().cell(0, 0).text, " ");
    }

    #[test]
    fn scroll_up_moves_top_row_into_scrollback() {
        let mut buf = ScreenBuffer::new(4, 2);
        put(&mut buf, "ab");
        buf.line_feed();
        buf.carriage_return();
        put(&mut buf, "cd");
        buf.line_feed();
        buf.carriage_return();
        assert_eq!(buf.scrollback_len(), 1);
        assert_eq!(buf.scrollback[0].cells[0].text, "a");
    }

    #[test]
    fn alt_screen_never_contributes_scrollback() {
        let mut buf = ScreenBuffer::new(4, 2);
        buf.set_alternate_screen(true);
        put(&mut buf, "ab");
        buf.line_feed();
        buf.line_feed();
        buf.line_feed();
        assert_eq!(buf.scrollback_len(), 0);
    }

    #[test]
    fn set_alternate_screen_restores_main_cursor() {
        let mut buf = ScreenBuffer::new(8, 4);
        buf.move_to(2, 3);
        buf.set_alternate_screen(true);
        assert_eq!((buf.cursor.row, buf.cursor.col), (0, 0));
        buf.move_to(1, 1);
        buf.set_alternate_screen(false);
        assert_eq!((buf.cursor.row, buf.cursor.col), (2, 3));
    }

    #[test]
    fn erase_chars_blanks_orphaned_wide_pair() {
        let mut buf = ScreenBuffer::new(6, 1);
        put(&mut buf, "中b");
        buf.move_to(0, 1);
        buf.erase_chars(1);
        assert_eq!(buf.active_grid().cell(0, 0).text, " ");
        assert_eq!(buf.active_grid().cell(0, 1).text, " ");
    }
}
