//! Static SVG rendering: one buffer snapshot replayed from a
//! `RecordingSession`, composed with crop, chrome, and background into a
//! single self-contained `<svg>` document.

use crate::config::Config;
use crate::crop::{self, ResolvedCrop};
use crate::error::Result;
use crate::recording::RecordingSession;
use crate::terminal::{AnsiParser, Row};
use crate::theme::{self, Theme};

use super::metrics::{fmt_num, FONT_SIZE};
use super::render_cells_fragment;

pub struct SvgRenderer;

impl SvgRenderer {
    /// Render `session` to a complete SVG document, honoring `config`'s
    /// crop/chrome/theme/background/opacity/frame-index settings.
    pub fn render(session: &RecordingSession, config: &Config) -> Result<String> {
        let theme = theme::resolve(&config.theme)?;
        let width = session.header.width;
        let height = session.header.height;

        let mut parser = AnsiParser::new(width, height);
        let target_frame = config.frame_index;
        let last_index = session.events.len().saturating_sub(1);
        let feed_upto = target_frame.unwrap_or(last_index);
        for event in session.events.iter().take(feed_upto + 1) {
            if matches!(event.kind, crate::recording::EventKind::Output) {
                parser.feed(event.data.as_bytes());
            }
        }

        // No explicit frame index: this is the "final state" render, which
        // makes scrollback visible the way a shell prompt's scrollback
        // would be after the session ends.
        let include_scrollback = target_frame.is_none();
        let screen = parser.screen();
        let rows: Vec<&Row> = if include_scrollback {
            screen.rows_with_scrollback().collect()
        } else {
            screen.active_grid().rows.iter().collect()
        };

        let resolved = crop::resolve(
            &rows,
            width,
            &config.crop,
            config.chrome.inset(),
            config.padding,
            config.min_rows,
        );

        Ok(assemble(&rows, &resolved, &theme, config))
    }
}

fn assemble(rows: &[&Row], crop: &ResolvedCrop, theme: &Theme, config: &Config) -> String {
    let cells = render_cells_fragment(rows, crop, theme);
    let chrome_fragment = config.chrome.render(crop.canvas_width, crop.canvas_height);
    let background_fragment = config.background.render(crop.canvas_width, crop.canvas_height);

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {cw} {ch}\" width=\"{cw}\" height=\"{ch}\" \
opacity=\"{opacity}\" role=\"img\" aria-label=\"console2svg output\">\
<style>text.crt {{ font-family: {font}; font-size: {font_size}px; white-space: pre; }}</style>\
{background}{chrome}\
<g transform=\"translate({ox}, {oy})\">{cells}</g>\
</svg>",
        cw = fmt_num(crop.canvas_width),
        ch = fmt_num(crop.canvas_height),
        opacity = fmt_num(config.opacity as f64),
        font = config.font_family,
        font_size = fmt_num(FONT_SIZE),
        background = background_fragment,
        chrome = chrome_fragment,
        ox = fmt_num(crop.content_offset_x),
        oy = fmt_num(crop.content_offset_y),
        cells = cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::recording::RecordingSession;

    fn session_with(text: &str, w: u16, h: u16) -> RecordingSession {
        let mut s = RecordingSession::new(w, h, 0);
        s.push_output(0.01, text.to_string());
        s
    }

    #[test]
    fn hi_in_small_terminal_renders_text_and_viewbox() {
        let session = session_with("Hi", 8, 2);
        let config = Config::default();
        let svg = SvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains("viewBox=\"0 0"));
        assert!(svg.contains(">Hi<") || (svg.contains(">H<") && svg.contains(">i<")));
    }

    #[test]
    fn truecolor_escape_renders_hex_color() {
        let session = session_with("\x1b[38;2;255;128;0mA\x1b[0m", 8, 2);
        let config = Config::default();
        let svg = SvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains("#FF8000"));
        assert!(svg.contains(">A<"));
    }

    #[test]
    fn wide_characters_are_offset_by_two_cells() {
        let session = session_with("中文", 8, 2);
        let config = Config::default();
        let svg = SvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains(">中<"));
        assert!(svg.contains(">文<"));
    }

    #[test]
    fn zero_events_renders_like_a_blank_static_frame() {
        let session = RecordingSession::new(8, 2, 0);
        let config = Config::default();
        let svg = SvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains("<svg"));
    }
}
