//! `AnsiParser`: owns a `vte::Parser` and drives a `ScreenBuffer` through
//! its `vte::Perform` implementation, the same wiring the teacher uses to
//! drive `TerminalState` from `vte::Parser::advance`.
//!
//! Incomplete escape sequences spanning a chunk boundary are `vte::Parser`'s
//! problem, not ours — it is designed to be fed one byte at a time across
//! read boundaries and keeps its own state machine position between calls.
//! Incomplete UTF-8 sequences are likewise buffered internally by `vte`'s
//! UTF-8 decoder. A surrogate pair never appears at this layer either: `vte`
//! hands `print` a fully decoded `char` (a Unicode scalar value), so a
//! 4-byte UTF-8 emoji sequence already arrives as one `char`, not two code
//! units needing reassembly.

use vte::{Params, Perform};

use super::color::Color;
use super::cursor::CellAttrs;
use super::screen::{EraseMode, ScreenBuffer, Style};

pub struct AnsiParser {
    parser: vte::Parser,
    screen: ScreenBuffer,
}

impl AnsiParser {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            parser: vte::Parser::new(),
            screen: ScreenBuffer::new(width, height),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        let mut performer = Performer { screen: &mut self.screen };
        for &byte in bytes {
            self.parser.advance(&mut performer, byte);
        }
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.screen
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
    }
}

struct Performer<'a> {
    screen: &'a mut ScreenBuffer,
}

/// Zero-width joiners/marks and the BOM, dropped rather than stored.
fn is_zero_width(c: char) -> bool {
    matches!(c as u32, 0x200B..=0x200D | 0xFEFF | 0x00AD)
}

/// Variation selectors and combining/enclosing marks, routed to
/// `AppendCombining` instead of occupying a fresh cell.
fn is_combining(c: char) -> bool {
    matches!(c as u32,
        0xFE00..=0xFE0F
        | 0x0300..=0x036F
        | 0x1AB0..=0x1AFF
        | 0x1DC0..=0x1DFF
        | 0x20D0..=0x20FF
        | 0xFE20..=0xFE2F
    )
}

fn param_or(params: &Params, idx: usize, default: u16) -> u16 {
    match params.iter().nth(idx).and_then(|group| group.first().copied()) {
        Some(0) | None => default,
        Some(v) => v,
    }
}

fn erase_mode(n: u16) -> EraseMode {
    match n {
        1 => EraseMode::ToStart,
        2 => EraseMode::All,
        _ => EraseMode::ToEnd,
    }
}

impl<'a> Perform for Performer<'a> {
    fn print(&mut self, c: char) {
        if is_zero_width(c) {
            return;
        }
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        if is_combining(c) {
            self.screen.append_combining(s);
            return;
        }
        let cursor = &self.screen.cursor;
        let style = Style {
            fg: cursor.fg,
            bg: cursor.bg,
            attrs: cursor.attrs,
        };
        self.screen.put_grapheme(s, style);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.screen.line_feed(),
            b'\r' => self.screen.carriage_return(),
            0x08 => self.screen.backspace(),
            b'\t' => self.screen.tab(),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}
    fn put(&mut self, _byte: u8) {}
    fn unhook(&mut self) {}
    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, byte: u8) {
        match byte {
            b'7' => self.screen.save_cursor(),
            b'8' => self.screen.restore_cursor(),
            b'c' => {
                self.screen.clear_display(EraseMode::All);
                self.screen.move_to(0, 0);
                self.screen.apply_style_update(|s| {
                    s.fg = Color::Default;
                    s.bg = Color::Default;
                    s.attrs = CellAttrs::empty();
                });
            }
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        if !intermediates.is_empty() {
            // Private-prefixed or intermediate-qualified CSIs are filtered:
            // parsed to completion, no mutation — except the one private
            // mode we actually track.
            if (action == 'h' || action == 'l') && intermediates == [b'?'] {
                if param_or(params, 0, 0) == 1049 {
                    self.screen.set_alternate_screen(action == 'h');
                }
            }
            return;
        }

        match action {
            'A' => self.screen.move_by(-(param_or(params, 0, 1) as i32), 0),
            'B' => self.screen.move_by(param_or(params, 0, 1) as i32, 0),
            'C' => self.screen.move_by(0, param_or(params, 0, 1) as i32),
            'D' => self.screen.move_by(0, -(param_or(params, 0, 1) as i32)),
            'E' => {
                self.screen.move_by(param_or(params, 0, 1) as i32, 0);
                self.screen.carriage_return();
            }
            'F' => {
                self.screen.move_by(-(param_or(params, 0, 1) as i32), 0);
                self.screen.carriage_return();
            }
            'G' | '`' => {
                let row = self.screen.cursor.row;
                self.screen.move_to(row, param_or(params, 0, 1).saturating_sub(1));
            }
            'H' | 'f' => {
                let row = param_or(params, 0, 1).saturating_sub(1);
                let col = param_or(params, 1, 1).saturating_sub(1);
                self.screen.move_to(row, col);
            }
            'd' => {
                let col = self.screen.cursor.col;
                self.screen.move_to(param_or(params, 0, 1).saturating_sub(1), col);
            }
            'J' => self.screen.clear_display(erase_mode(param_or(params, 0, 0))),
            'K' => self.screen.clear_line(erase_mode(param_or(params, 0, 0))),
            'P' => self.screen.delete_chars(param_or(params, 0, 1)),
            'X' => self.screen.erase_chars(param_or(params, 0, 1)),
            's' => self.screen.save_cursor(),
            'u' => self.screen.restore_cursor(),
            'm' => self.handle_sgr(params),
            _ => {}
        }
    }
}

impl<'a> Performer<'a> {
    fn handle_sgr(&mut self, params: &Params) {
        let codes: Vec<u16> = params
            .iter()
            .map(|group| group.first().copied().unwrap_or(0))
            .collect();

        if codes.is_empty() {
            self.screen.apply_style_update(|s| {
                s.fg = Color::Default;
                s.bg = Color::Default;
                s.attrs = CellAttrs::empty();
            });
            return;
        }

        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            match code {
                0 => self.screen.apply_style_update(|s| {
                    s.fg = Color::Default;
                    s.bg = Color::Default;
                    s.attrs = CellAttrs::empty();
                }),
                1 => self.screen.apply_style_update(|s| s.attrs.insert(CellAttrs::BOLD)),
                2 => self.screen.apply_style_update(|s| s.attrs.insert(CellAttrs::FAINT)),
                3 => self.screen.apply_style_update(|s| s.attrs.insert(CellAttrs::ITALIC)),
                4 => self.screen.apply_style_update(|s| s.attrs.insert(CellAttrs::UNDERLINE)),
                7 => self.screen.apply_style_update(|s| s.attrs.insert(CellAttrs::REVERSED)),
                22 => self
                    .screen
                    .apply_style_update(|s| s.attrs.remove(CellAttrs::BOLD | CellAttrs::FAINT)),
                23 => self.screen.apply_style_update(|s| s.attrs.remove(CellAttrs::ITALIC)),
                24 => self.screen.apply_style_update(|s| s.attrs.remove(CellAttrs::UNDERLINE)),
                27 => self.screen.apply_style_update(|s| s.attrs.remove(CellAttrs::REVERSED)),
                30..=37 => {
                    let idx = (code - 30) as u8;
                    self.screen.apply_style_update(|s| s.fg = Color::Indexed(idx));
                }
                40..=47 => {
                    let idx = (code - 40) as u8;
                    self.screen.apply_style_update(|s| s.bg = Color::Indexed(idx));
                }
                90..=97 => {
                    let idx = (code - 90 + 8) as u8;
                    self.screen.apply_style_update(|s| s.fg = Color::Indexed(idx));
                }
                100..=107 => {
                    let idx = (code - 100 + 8) as u8;
                    self.screen.apply_style_update(|s| s.bg = Color::Indexed(idx));
                }
                39 => self.screen.apply_style_update(|s| s.fg = Color::Default),
                49 => self.screen.apply_style_update(|s| s.bg = Color::Default),
                38 | 48 => {
                    let is_fg = code == 38;
                    if i + 1 < codes.len() {
                        match codes[i + 1] {
                            5 if i + 2 < codes.len() => {
                                let idx = codes[i + 2] as u8;
                                self.screen.apply_style_update(|s| {
                                    if is_fg {
                                        s.fg = Color::Indexed(idx);
                                    } else {
                                        s.bg = Color::Indexed(idx);
                                    }
                                });
                                i += 2;
                            }
                            2 if i + 4 < codes.len() => {
                                let (r, g, b) =
                                    (codes[i + 2] as u8, codes[i + 3] as u8, codes[i + 4] as u8);
                                self.screen.apply_style_update(|s| {
                                    if is_fg {
                                        s.fg = Color::Rgb(r, g, b);
                                    } else {
                                        s.bg = Color::Rgb(r, g, b);
                                    }
                                });
                                i += 4;
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_bytes(parser: &mut AnsiParser, bytes: &[u8]) {
        parser.feed(bytes);
    }

    #[test]
    fn plain_text_writes_cells() {
        let mut p = AnsiParser::new(8, 2);
        feed_bytes(&mut p, b"Hi");
        assert_eq!(p.screen().active_grid().cell(0, 0).text, "H");
        assert_eq!(p.screen().active_grid().cell(0, 1).text, "i");
    }

    #[test]
    fn sgr_truecolor_sets_fg() {
        let mut p = AnsiParser::new(8, 2);
        feed_bytes(&mut p, b"\x1b[38;2;255;128;0mA\x1b[0m");
        assert_eq!(p.screen().active_grid().cell(0, 0).fg, Color::Rgb(255, 128, 0));
    }

    #[test]
    fn sgr_256_palette_sets_fg() {
        let mut p = AnsiParser::new(8, 2);
        feed_bytes(&mut p, b"\x1b[38;5;196mA");
        assert_eq!(p.screen().active_grid().cell(0, 0).fg, Color::Indexed(196));
    }

    #[test]
    fn private_mode_1049_toggles_alt_screen() {
        let mut p = AnsiParser::new(8, 2);
        feed_bytes(&mut p, b"\x1b[?1049h");
        assert!(p.screen().is_alt_screen());
        feed_bytes(&mut p, b"\x1b[?1049l");
        assert!(!p.screen().is_alt_screen());
    }

    #[test]
    fn filtered_csi_with_private_prefix_is_inert() {
        let mut p = AnsiParser::new(8, 2);
        // DA1 response-shaped sequence arriving as if it were output.
        feed_bytes(&mut p, b"\x1b[?1;2c");
        assert_eq!(p.screen().cursor.row, 0);
        assert_eq!(p.screen().cursor.col, 0);
    }

    #[test]
    fn cursor_position_is_one_based_in_wire_format() {
        let mut p = AnsiParser::new(10, 10);
        feed_bytes(&mut p, b"\x1b[3;5H");
        assert_eq!((p.screen().cursor.row, p.screen().cursor.col), (2, 4));
    }

    #[test]
    fn erase_display_mode_2_clears_whole_screen() {
        let mut p = AnsiParser::new(4, 2);
        feed_bytes(&mut p, b"abcd");
        feed_bytes(&mut p, b"\x1b[2J");
        assert_eq!(p.screen().active_grid().cell(0, 0).text, " ");
    }

    #[test]
    fn full_reset_clears_screen_and_style() {
        let mut p = AnsiParser::new(4, 2);
        feed_bytes(&mut p, b"\x1b[1mA\x1bc");
        assert_eq!(p.screen().active_grid().cell(0, 0).text, " ");
        assert_eq!(p.screen().cursor.attrs, CellAttrs::empty());
    }
}
