//! Color state carried by cells and the cursor's current graphic rendition.

use crate::theme::{self, Rgb, Theme};

/// Terminal color representation supporting 16-color, 256-color, and truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    /// Resolve against a theme to a concrete RGB triple for SVG output.
    pub fn resolve(self, theme: &Theme, is_foreground: bool) -> Rgb {
        match self {
            Color::Default => {
                if is_foreground {
                    theme.foreground
                } else {
                    theme.background
                }
            }
            Color::Indexed(i) => theme::indexed_to_rgb(theme, i),
            Color::Rgb(r, g, b) => Rgb(r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolves_to_theme_colors() {
        let dark = theme::resolve("dark").unwrap();
        assert_eq!(Color::Default.resolve(&dark, true), dark.foreground);
        assert_eq!(Color::Default.resolve(&dark, false), dark.background);
    }

    #[test]
    fn truecolor_passes_through() {
        let dark = theme::resolve("dark").unwrap();
        assert_eq!(
            Color::Rgb(255, 128, 0).resolve(&dark, true),
            Rgb(255, 128, 0)
        );
    }
}
