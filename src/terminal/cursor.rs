use super::color::Color;
use bitflags::bitflags;

bitflags! {
    /// Text attributes merged by SGR operations. Matches spec's TextStyle
    /// boolean set exactly: {bold, italic, underline, reversed, faint}.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellAttrs: u8 {
        const BOLD      = 1 << 0;
        const FAINT     = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const REVERSED  = 1 << 4;
    }
}

/// Cursor position plus the SGR state that applies to the next printed cell,
/// and the DECSC/DECRC save slot.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    saved: Option<SavedCursor>,
}

#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    row: u16,
    col: u16,
    fg: Color,
    bg: Color,
    attrs: CellAttrs,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
            saved: None,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// DECSC: snapshot position and graphic rendition.
    pub fn save(&mut self) {
        self.saved = Some(SavedCursor {
            row: self.row,
            col: self.col,
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
        });
    }

    /// DECRC: restore a previously saved position and rendition. No-op if
    /// nothing was ever saved.
    pub fn restore(&mut self) {
        if let Some(saved) = self.saved {
            self.row = saved.row;
            self.col = saved.col;
            self.fg = saved.fg;
            self.bg = saved.bg;
            self.attrs = saved.attrs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_without_save_is_noop() {
        let mut c = CursorState::new();
        c.row = 3;
        c.col = 4;
        c.restore();
        assert_eq!((c.row, c.col), (3, 4));
    }

    #[test]
    fn save_restore_roundtrip() {
        let mut c = CursorState::new();
        c.row = 2;
        c.col = 5;
        c.fg = Color::Indexed(3);
        c.save();
        c.row = 9;
        c.col = 9;
        c.fg = Color::Default;
        c.restore();
        assert_eq!((c.row, c.col), (2, 5));
        assert_eq!(c.fg, Color::Indexed(3));
    }
}
