//! Fixed-size cell grid backing one screen (main or alternate). Scrollback
//! lives above this, in `screen::ScreenBuffer`, as a separate append-only
//! sequence of rows pushed off the top during a scroll.

use bitflags::bitflags;

use super::color::Color;
use super::cursor::CellAttrs;

bitflags! {
    /// Per-cell flags for wide-character tracking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u8 {
        /// Holds a wide (2-column) glyph; the next cell is its continuation.
        const WIDE              = 1 << 0;
        /// The trailing half of a wide glyph to its left.
        const WIDE_CONTINUATION = 1 << 1;
    }
}

/// One terminal cell. `text` holds a full grapheme cluster (a base character
/// plus any combining marks), not a single `char`, so it can represent
/// surrogate pairs and accents without widening every cell to a `Vec<char>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::from(" "),
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
            flags: CellFlags::empty(),
        }
    }
}

impl Cell {
    pub fn wide_continuation() -> Self {
        Self {
            text: String::from(" "),
            flags: CellFlags::WIDE_CONTINUATION,
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text == " " && self.flags.is_empty()
    }

    /// Erase to default, carrying forward the background the eraser was
    /// asked to paint with (ECMA-48: erased cells take the current SGR
    /// background, not the theme default).
    pub fn erase(&mut self, bg: Color) {
        self.text.clear();
        self.text.push(' ');
        self.fg = Color::Default;
        self.bg = bg;
        self.attrs = CellAttrs::empty();
        self.flags = CellFlags::empty();
    }
}

/// One row of cells.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
        }
    }

    pub fn erase(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
    }

    pub fn resize(&mut self, cols: u16) {
        self.cells.resize(cols as usize, Cell::default());
    }
}

/// A single screen's worth of cells: fixed `cols` x `height`, no history.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: Vec<Row>,
    pub cols: u16,
    pub height: u16,
}

impl Grid {
    pub fn new(height: u16, cols: u16) -> Self {
        Self {
            rows: (0..height).map(|_| Row::new(cols)).collect(),
            cols,
            height,
        }
    }

    pub fn row(&self, r: u16) -> &Row {
        &self.rows[r as usize]
    }

    pub fn row_mut(&mut self, r: u16) -> &mut Row {
        &mut self.rows[r as usize]
    }

    pub fn cell(&self, r: u16, c: u16) -> &Cell {
        &self.rows[r as usize].cells[c as usize]
    }

    pub fn cell_mut(&mut self, r: u16, c: u16) -> &mut Cell {
        &mut self.rows[r as usize].cells[c as usize]
    }

    /// Blank every cell, painting with the given background.
    pub fn clear(&mut self, bg: Color) {
        for row in &mut self.rows {
            row.erase(bg);
        }
    }

    /// Resize in place. Preserves the top-left overlap of old and new
    /// dimensions; grown rows/columns are blank, shrunk ones are dropped.
    /// Used for the alt screen, which always repaints from scratch on
    /// resize, and reused by `ScreenBuffer::resize` for the main screen's
    /// column/row adjustment (scrollback capture happens one level up).
    pub fn resize(&mut self, height: u16, cols: u16) {
        for row in &mut self.rows {
            row.resize(cols);
        }
        if height as usize > self.rows.len() {
            for _ in self.rows.len()..height as usize {
                self.rows.push(Row::new(cols));
            }
        } else {
            self.rows.truncate(height as usize);
        }
        self.cols = cols;
        self.height = height;
    }

    /// Erase cells `[start_col, end_col)` in a row.
    pub fn erase_cells(&mut self, row: u16, start_col: u16, end_col: u16, bg: Color) {
        let r = self.row_mut(row);
        let end = (end_col as usize).min(r.cells.len());
        for i in (start_col as usize)..end {
            r.cells[i].erase(bg);
        }
    }

    /// Shift cells after `col` left by `count`, filling the vacated tail
    /// with blanks.
    pub fn delete_cells(&mut self, row: u16, col: u16, count: u16, bg: Color) {
        let r = self.row_mut(row);
        let col = col as usize;
        let count = count.min(r.cells.len().saturating_sub(col) as u16) as usize;
        for _ in 0..count {
            r.cells.remove(col);
            let mut blank = Cell::default();
            blank.bg = bg;
            r.cells.push(blank);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_cells_paints_requested_background() {
        let mut g = Grid::new(2, 4);
        g.erase_cells(0, 1, 3, Color::Indexed(2));
        assert_eq!(g.cell(0, 0).bg, Color::Default);
        assert_eq!(g.cell(0, 1).bg, Color::Indexed(2));
        assert_eq!(g.cell(0, 2).bg, Color::Indexed(2));
        assert_eq!(g.cell(0, 3).bg, Color::Default);
    }

    #[test]
    fn delete_cells_shifts_left_and_blanks_tail() {
        let mut g = Grid::new(1, 4);
        g.cell_mut(0, 0).text = "a".into();
        g.cell_mut(0, 1).text = "b".into();
        g.cell_mut(0, 2).text = "c".into();
        g.cell_mut(0, 3).text = "d".into();
        g.delete_cells(0, 1, 2, Color::Default);
        let texts: Vec<&str> = g.rows[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "d", " ", " "]);
    }

    #[test]
    fn resize_preserves_top_left_overlap() {
        let mut g = Grid::new(2, 2);
        g.cell_mut(0, 0).text = "x".into();
        g.resize(3, 3);
        assert_eq!(g.cell(0, 0).text, "x");
        assert_eq!(g.rows.len(), 3);
        assert_eq!(g.cols, 3);
    }
}
