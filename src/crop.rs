//! `CropResolver`: turns a [`CropSpec`] (per-side px/ch/text-pattern) plus
//! chrome insets and padding into the row/column bounds and pixel rectangle
//! a renderer walks.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::render::metrics::{CELL_HEIGHT, CELL_WIDTH};
use crate::terminal::Row;

/// One side's crop unit. `TextPattern` carries an optional `±N` row-shift,
/// parsed from the `"pattern:±N"` form.
#[derive(Debug, Clone, PartialEq)]
pub enum CropUnit {
    Pixels(f64),
    Characters(u16),
    TextPattern { pattern: String, offset: i32 },
}

impl FromStr for CropUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty crop value".to_string());
        }
        if let Some(n) = s.strip_suffix("px") {
            return n
                .parse::<f64>()
                .map(CropUnit::Pixels)
                .map_err(|_| format!("invalid pixel count {n:?}"));
        }
        if let Some(n) = s.strip_suffix("ch") {
            return n
                .parse::<u16>()
                .map(CropUnit::Characters)
                .map_err(|_| format!("invalid character count {n:?}"));
        }
        // "pattern:±N" — only split on the last ':' when the suffix parses
        // as a signed integer, so a pattern that itself contains a colon
        // (e.g. a shell prompt "user@host:~$") is not misread.
        if let Some((pattern, suffix)) = s.rsplit_once(':') {
            if let Ok(offset) = suffix.parse::<i32>() {
                return Ok(CropUnit::TextPattern {
                    pattern: pattern.to_string(),
                    offset,
                });
            }
        }
        Ok(CropUnit::TextPattern {
            pattern: s.to_string(),
            offset: 0,
        })
    }
}

/// Which edge of the scan a `TextPattern` searches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanDirection {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropSpec {
    pub top: Option<CropUnit>,
    pub right: Option<CropUnit>,
    pub bottom: Option<CropUnit>,
    pub left: Option<CropUnit>,
}

impl CropSpec {
    pub fn parse_side(value: &str) -> Result<CropUnit, ConfigError> {
        value
            .parse::<CropUnit>()
            .map_err(|reason| ConfigError::InvalidCrop(value.to_string(), reason))
    }
}

/// Chrome's content inset on each side, in pixels (e.g. a title bar adds to
/// `top`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeInset {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Resolved crop: the row/column window into the buffer plus the final
/// canvas geometry a renderer needs to emit `viewBox` and content offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCrop {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: u16,
    pub end_col: u16,
    pub view_width: f64,
    pub view_height: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub content_offset_x: f64,
    pub content_offset_y: f64,
}

fn row_text(row: &Row) -> String {
    row.cells.iter().map(|c| c.text.as_str()).collect()
}

fn find_pattern_row(rows: &[&Row], pattern: &str, direction: ScanDirection) -> Option<usize> {
    let indices: Box<dyn Iterator<Item = usize>> = match direction {
        ScanDirection::Top => Box::new(0..rows.len()),
        ScanDirection::Bottom => Box::new((0..rows.len()).rev()),
    };
    for i in indices {
        if row_text(rows[i]).contains(pattern) {
            return Some(i);
        }
    }
    None
}

/// Resolve a [`CropSpec`] against a buffer snapshot (already including
/// scrollback rows when the caller wants history visible) into row/column
/// bounds and final canvas geometry.
pub fn resolve(
    rows: &[&Row],
    width: u16,
    spec: &CropSpec,
    chrome: ChromeInset,
    padding: f64,
    min_rows: Option<u16>,
) -> ResolvedCrop {
    let total_rows = rows.len();
    let mut start_row = 0usize;
    let mut end_row = total_rows;
    let mut px_top = 0.0;
    let mut px_bottom = 0.0;

    match &spec.top {
        Some(CropUnit::TextPattern { pattern, offset }) => {
            if let Some(found) = find_pattern_row(rows, pattern, ScanDirection::Top) {
                start_row = (found as i64 + *offset as i64).clamp(0, total_rows as i64) as usize;
            }
        }
        Some(CropUnit::Characters(n)) => {
            start_row = (*n as usize).min(total_rows);
        }
        Some(CropUnit::Pixels(px)) => px_top = *px,
        None => {}
    }

    match &spec.bottom {
        Some(CropUnit::TextPattern { pattern, offset }) => {
            if let Some(found) = find_pattern_row(rows, pattern, ScanDirection::Bottom) {
                let shifted = (found as i64 + *offset as i64).clamp(0, total_rows as i64) as usize;
                end_row = shifted.max(start_row);
            }
        }
        Some(CropUnit::Characters(n)) => {
            end_row = total_rows.saturating_sub(*n as usize).max(start_row);
        }
        Some(CropUnit::Pixels(px)) => px_bottom = *px,
        None => {}
    }
    end_row = end_row.max(start_row);

    let mut start_col = 0u16;
    let mut end_col = width;
    let mut px_left = 0.0;
    let mut px_right = 0.0;

    match &spec.left {
        Some(CropUnit::Characters(n)) => start_col = (*n).min(width),
        Some(CropUnit::Pixels(px)) => px_left = *px,
        Some(CropUnit::TextPattern { .. }) | None => {}
    }
    match &spec.right {
        Some(CropUnit::Characters(n)) => end_col = width.saturating_sub(*n).max(start_col),
        Some(CropUnit::Pixels(px)) => px_right = *px,
        Some(CropUnit::TextPattern { .. }) | None => {}
    }
    end_col = end_col.max(start_col);

    let content_width = (end_col - start_col) as f64 * CELL_WIDTH;
    let content_height = (end_row - start_row) as f64 * CELL_HEIGHT;

    // Clamp so at least one pixel remains in each dimension — a crop that
    // would eat the whole visible rect is capped, not collapsed to zero.
    let px_left = px_left.min((content_width - 1.0).max(0.0));
    let px_right = px_right.min((content_width - px_left - 1.0).max(0.0));
    let px_top = px_top.min((content_height - 1.0).max(0.0));
    let px_bottom = px_bottom.min((content_height - px_top - 1.0).max(0.0));

    let mut view_width = (content_width - px_left - px_right).max(1.0);
    let mut view_height = (content_height - px_top - px_bottom).max(1.0);

    if let Some(min_rows) = min_rows {
        view_height = view_height.max(min_rows as f64 * CELL_HEIGHT);
    }
    view_width = view_width.max(1.0);
    view_height = view_height.max(1.0);

    let canvas_width = chrome.left + chrome.right + 2.0 * padding + view_width;
    let canvas_height = chrome.top + chrome.bottom + 2.0 * padding + view_height;

    ResolvedCrop {
        start_row,
        end_row,
        start_col,
        end_col,
        view_width,
        view_height,
        canvas_width,
        canvas_height,
        content_offset_x: chrome.left + padding - px_left,
        content_offset_y: chrome.top + padding - px_top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScreenBuffer;

    fn buffer_with_rows(lines: &[&str], width: u16) -> ScreenBuffer {
        let mut buf = ScreenBuffer::new(width, lines.len() as u16);
        for (i, line) in lines.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                buf.move_to(i as u16, c as u16);
                buf.put_grapheme(&ch.to_string(), Default::default());
            }
        }
        buf
    }

    #[test]
    fn text_pattern_crop_trims_to_matching_row() {
        let buf = buffer_with_rows(&["line1", "---", "line3", "line4"], 5);
        let rows: Vec<&Row> = buf.active_grid().rows.iter().collect();
        let spec = CropSpec {
            bottom: Some(CropUnit::TextPattern {
                pattern: "---".to_string(),
                offset: 0,
            }),
            ..Default::default()
        };
        let resolved = resolve(&rows, 5, &spec, ChromeInset::default(), 0.0, None);
        assert_eq!(resolved.start_row, 0);
        assert_eq!(resolved.end_row, 1);
        assert_eq!(resolved.view_height, 1.0 * CELL_HEIGHT);
    }

    #[test]
    fn pixel_crop_never_collapses_view_to_zero() {
        let buf = buffer_with_rows(&["x"], 1);
        let rows: Vec<&Row> = buf.active_grid().rows.iter().collect();
        let spec = CropSpec {
            top: Some(CropUnit::Pixels(1000.0)),
            ..Default::default()
        };
        let resolved = resolve(&rows, 1, &spec, ChromeInset::default(), 0.0, None);
        assert!(resolved.view_height >= 1.0);
        assert!(resolved.canvas_height >= 1.0);
    }

    #[test]
    fn min_rows_hint_floors_view_height() {
        let buf = buffer_with_rows(&["a", "b"], 1);
        let rows: Vec<&Row> = buf.active_grid().rows.iter().collect();
        let resolved = resolve(&rows, 1, &CropSpec::default(), ChromeInset::default(), 0.0, Some(10));
        assert_eq!(resolved.view_height, 10.0 * CELL_HEIGHT);
    }

    #[test]
    fn crop_unit_parses_all_forms() {
        assert_eq!("12px".parse::<CropUnit>().unwrap(), CropUnit::Pixels(12.0));
        assert_eq!("3ch".parse::<CropUnit>().unwrap(), CropUnit::Characters(3));
        assert_eq!(
            "prompt$:-2".parse::<CropUnit>().unwrap(),
            CropUnit::TextPattern { pattern: "prompt$".to_string(), offset: -2 }
        );
        assert_eq!(
            "user@host:~$".parse::<CropUnit>().unwrap(),
            CropUnit::TextPattern { pattern: "user@host:~$".to_string(), offset: 0 }
        );
    }
}
