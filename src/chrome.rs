//! Window chrome and desktop-background SVG fragments — the non-content
//! decorations drawn around the terminal content (title bar, traffic
//! lights, border) plus the canvas-filling background behind everything.

use std::str::FromStr;

use crate::crop::ChromeInset;
use crate::error::ConfigError;
use crate::render::metrics::fmt_num;
use crate::theme::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeKind {
    None,
    MacOs,
    Windows,
}

impl FromStr for ChromeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(ChromeKind::None),
            "macos" | "mac" => Ok(ChromeKind::MacOs),
            "windows" | "win" => Ok(ChromeKind::Windows),
            other => Err(ConfigError::UnknownChrome(other.to_string())),
        }
    }
}

const TITLE_BAR_HEIGHT: f64 = 32.0;
const BORDER_WIDTH: f64 = 1.0;

impl ChromeKind {
    /// Pixel inset this chrome's frame reserves around the content area.
    pub fn inset(self) -> ChromeInset {
        match self {
            ChromeKind::None => ChromeInset::default(),
            ChromeKind::MacOs | ChromeKind::Windows => ChromeInset {
                top: TITLE_BAR_HEIGHT,
                right: BORDER_WIDTH,
                bottom: BORDER_WIDTH,
                left: BORDER_WIDTH,
            },
        }
    }

    /// Emit the frame's SVG fragment (title bar, buttons, border) sized to
    /// `canvas_width`/`canvas_height`.
    pub fn render(self, canvas_width: f64, canvas_height: f64) -> String {
        match self {
            ChromeKind::None => String::new(),
            ChromeKind::MacOs => render_macos(canvas_width, canvas_height),
            ChromeKind::Windows => render_windows(canvas_width, canvas_height),
        }
    }
}

fn render_macos(w: f64, h: f64) -> String {
    let (w, h) = (fmt_num(w), fmt_num(h));
    format!(
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" rx=\"8\" fill=\"#2a2a2e\" />\
<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"32\" rx=\"8\" fill=\"#3a3a3e\" />\
<rect x=\"0\" y=\"24\" width=\"{w}\" height=\"8\" fill=\"#3a3a3e\" />\
<circle cx=\"16\" cy=\"16\" r=\"6\" fill=\"#ff5f56\" />\
<circle cx=\"36\" cy=\"16\" r=\"6\" fill=\"#ffbd2e\" />\
<circle cx=\"56\" cy=\"16\" r=\"6\" fill=\"#27c93f\" />"
    )
}

fn render_windows(w: f64, h: f64) -> String {
    let (w, h) = (fmt_num(w), fmt_num(h));
    format!(
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"#202020\" stroke=\"#404040\" />\
<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"32\" fill=\"#2b2b2b\" />\
<g stroke=\"#c0c0c0\" stroke-width=\"1\">\
<line x1=\"{minus_x1}\" y1=\"16\" x2=\"{minus_x2}\" y2=\"16\" />\
<rect x=\"{sq_x}\" y=\"11\" width=\"10\" height=\"10\" fill=\"none\" />\
<line x1=\"{x_x1}\" y1=\"11\" x2=\"{x_x2}\" y2=\"21\" />\
<line x1=\"{x_x2}\" y1=\"11\" x2=\"{x_x1}\" y2=\"21\" />\
</g>",
        minus_x1 = fmt_num(w.parse::<f64>().unwrap_or(0.0) - 72.0),
        minus_x2 = fmt_num(w.parse::<f64>().unwrap_or(0.0) - 62.0),
        sq_x = fmt_num(w.parse::<f64>().unwrap_or(0.0) - 45.0),
        x_x1 = fmt_num(w.parse::<f64>().unwrap_or(0.0) - 26.0),
        x_x2 = fmt_num(w.parse::<f64>().unwrap_or(0.0) - 16.0),
    )
}

/// Canvas-filling background: empty, a solid color, a two-stop gradient, or
/// an image/URL (embedded as an `<image>` href — the CLI layer resolves a
/// local path to its bytes; here we just carry the string).
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    None,
    Solid(Rgb),
    Gradient(Rgb, Rgb),
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::None
    }
}

fn parse_hex(s: &str) -> Option<Rgb> {
    let s = s.strip_prefix('#')?;
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Rgb(r, g, b))
}

impl Background {
    /// Parse the CLI `--background` value: empty string, one color, two
    /// comma-separated colors (gradient), or a path/URL.
    pub fn parse(s: &str) -> Background {
        let s = s.trim();
        if s.is_empty() {
            return Background::None;
        }
        if let Some((a, b)) = s.split_once(',') {
            if let (Some(a), Some(b)) = (parse_hex(a.trim()), parse_hex(b.trim())) {
                return Background::Gradient(a, b);
            }
        }
        if let Some(color) = parse_hex(s) {
            return Background::Solid(color);
        }
        Background::Image(s.to_string())
    }

    /// Emit the background SVG fragment (a full-canvas `<rect>`, possibly
    /// filled by a `<defs>`-registered gradient, or an `<image>`).
    pub fn render(&self, canvas_width: f64, canvas_height: f64) -> String {
        let (w, h) = (fmt_num(canvas_width), fmt_num(canvas_height));
        match self {
            Background::None => String::new(),
            Background::Solid(c) => {
                format!("<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\" />", c.to_hex())
            }
            Background::Gradient(a, b) => format!(
                "<defs><linearGradient id=\"bg-gradient\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\">\
<stop offset=\"0%\" stop-color=\"{}\" /><stop offset=\"100%\" stop-color=\"{}\" />\
</linearGradient></defs>\
<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"url(#bg-gradient)\" />",
                a.to_hex(),
                b.to_hex()
            ),
            Background::Image(src) => format!(
                "<image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" href=\"{src}\" preserveAspectRatio=\"xMidYMid slice\" />"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_name_resolves() {
        assert_eq!("none".parse::<ChromeKind>().unwrap(), ChromeKind::None);
        assert_eq!("macos".parse::<ChromeKind>().unwrap(), ChromeKind::MacOs);
        assert!("bogus".parse::<ChromeKind>().is_err());
    }

    #[test]
    fn none_chrome_has_zero_inset() {
        let inset = ChromeKind::None.inset();
        assert_eq!((inset.top, inset.left), (0.0, 0.0));
    }

    #[test]
    fn background_parses_solid_and_gradient() {
        assert_eq!(Background::parse("#112233"), Background::Solid(Rgb(0x11, 0x22, 0x33)));
        assert_eq!(
            Background::parse("#000000,#ffffff"),
            Background::Gradient(Rgb(0, 0, 0), Rgb(255, 255, 255))
        );
        assert_eq!(Background::parse(""), Background::None);
        assert_eq!(Background::parse("./bg.png"), Background::Image("./bg.png".to_string()));
    }
}
