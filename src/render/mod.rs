//! SVG code generation. No crate in the retrieval pack generates SVG, so
//! this is plain `String`/`write!` formatting in the same low-level style
//! the pack uses elsewhere for `fmt::Display` impls over styled terminal
//! content.

pub mod animated;
pub mod metrics;
pub mod svg;

pub use animated::AnimatedSvgRenderer;
pub use svg::SvgRenderer;

use std::fmt::Write as _;

use crate::crop::ResolvedCrop;
use crate::terminal::{CellFlags, Row};
use crate::theme::Theme;
use metrics::{fmt_num, CELL_HEIGHT, CELL_WIDTH};

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the cell content of one buffer snapshot within `crop`'s row/column
/// window: a theme background rect, per-cell background patches where they
/// differ from the theme, and text runs. Shared by the static renderer (one
/// call) and the animated renderer (one call per unique frame state).
pub fn render_cells_fragment(rows: &[&Row], crop: &ResolvedCrop, theme: &Theme) -> String {
    let mut out = String::new();
    let content_width = (crop.end_col - crop.start_col) as f64 * CELL_WIDTH;
    let content_height = (crop.end_row - crop.start_row) as f64 * CELL_HEIGHT;

    let _ = write!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
        fmt_num(content_width),
        fmt_num(content_height),
        theme.background.to_hex()
    );

    for (row_idx, row) in rows[crop.start_row..crop.end_row].iter().enumerate() {
        let y = row_idx as f64 * CELL_HEIGHT;
        for (col_idx, cell) in row.cells[crop.start_col as usize..crop.end_col as usize]
            .iter()
            .enumerate()
        {
            if cell.flags.contains(CellFlags::WIDE_CONTINUATION) {
                continue;
            }
            let x = col_idx as f64 * CELL_WIDTH;
            let reversed = cell.attrs.contains(crate::terminal::CellAttrs::REVERSED);
            let mut fg = cell.fg.resolve(theme, true);
            let mut bg = cell.bg.resolve(theme, false);
            if reversed {
                std::mem::swap(&mut fg, &mut bg);
            }
            let wide = cell.flags.contains(CellFlags::WIDE);
            let cell_width = if wide { CELL_WIDTH * 2.0 } else { CELL_WIDTH };

            if bg != theme.background {
                let _ = write!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" />",
                    fmt_num(x),
                    fmt_num(y),
                    fmt_num(cell_width),
                    fmt_num(CELL_HEIGHT),
                    bg.to_hex()
                );
            }

            if cell.text != " " {
                let mut style = String::new();
                if cell.attrs.contains(crate::terminal::CellAttrs::BOLD) {
                    style.push_str("font-weight:bold;");
                }
                if cell.attrs.contains(crate::terminal::CellAttrs::ITALIC) {
                    style.push_str("font-style:italic;");
                }
                if cell.attrs.contains(crate::terminal::CellAttrs::UNDERLINE) {
                    style.push_str("text-decoration:underline;");
                }
                if cell.attrs.contains(crate::terminal::CellAttrs::FAINT) {
                    style.push_str("opacity:0.6;");
                }
                let style_attr = if style.is_empty() {
                    String::new()
                } else {
                    format!(" style=\"{style}\"")
                };
                let _ = write!(
                    out,
                    "<text class=\"crt\" x=\"{}\" y=\"{}\" fill=\"{}\"{}>{}</text>",
                    fmt_num(x),
                    fmt_num(y + metrics::BASELINE_OFFSET),
                    fg.to_hex(),
                    style_attr,
                    escape_xml(&cell.text)
                );
            }
        }
    }

    out
}
