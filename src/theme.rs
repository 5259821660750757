//! Named color palettes. Immutable value data, the way the teacher keeps its
//! ANSI-to-RGB table (`terminal/color.rs::indexed_to_rgb`) as const data.

use crate::error::ConfigError;

/// An RGB color, rendered as `#RRGGBB` in generated SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Background, foreground, and the 16-slot ANSI palette (normal 0-7, bright 8-15).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub palette: [Rgb; 16],
}

const DARK: Theme = Theme {
    name: "dark",
    background: Rgb(0x15, 0x16, 0x1e),
    foreground: Rgb(0xc0, 0xca, 0xf5),
    palette: [
        Rgb(0x15, 0x16, 0x1e), // black
        Rgb(0xf7, 0x76, 0x8e), // red
        Rgb(0x9e, 0xce, 0x6a), // green
        Rgb(0xe0, 0xaf, 0x68), // yellow
        Rgb(0x7a, 0xa2, 0xf7), // blue
        Rgb(0xbb, 0x9a, 0xf7), // magenta
        Rgb(0x7d, 0xcf, 0xff), // cyan
        Rgb(0xa9, 0xb1, 0xd6), // white
        Rgb(0x41, 0x48, 0x68), // bright black
        Rgb(0xff, 0x9e, 0x9e), // bright red
        Rgb(0xb9, 0xf2, 0x7c), // bright green
        Rgb(0xff, 0x9e, 0x64), // bright yellow
        Rgb(0x82, 0xaa, 0xff), // bright blue
        Rgb(0xd4, 0xb0, 0xff), // bright magenta
        Rgb(0xa9, 0xe1, 0xff), // bright cyan
        Rgb(0xc0, 0xca, 0xf5), // bright white
    ],
};

const LIGHT: Theme = Theme {
    name: "light",
    background: Rgb(0xfa, 0xfa, 0xfa),
    foreground: Rgb(0x1a, 0x1a, 0x1a),
    palette: [
        Rgb(0x1a, 0x1a, 0x1a),
        Rgb(0xc4, 0x2b, 0x2b),
        Rgb(0x2e, 0x8b, 0x2e),
        Rgb(0xb5, 0x8b, 0x00),
        Rgb(0x1a, 0x5f, 0xc4),
        Rgb(0x8b, 0x2b, 0xc4),
        Rgb(0x1a, 0x8b, 0x8b),
        Rgb(0xd0, 0xd0, 0xd0),
        Rgb(0x60, 0x60, 0x60),
        Rgb(0xe0, 0x4a, 0x4a),
        Rgb(0x4a, 0xb0, 0x4a),
        Rgb(0xd4, 0xaa, 0x20),
        Rgb(0x4a, 0x8a, 0xe0),
        Rgb(0xb0, 0x4a, 0xe0),
        Rgb(0x4a, 0xb0, 0xb0),
        Rgb(0xf0, 0xf0, 0xf0),
    ],
};

/// Resolve a theme by name, matching the `--theme` CLI flag.
pub fn resolve(name: &str) -> Result<Theme, ConfigError> {
    match name {
        "dark" => Ok(DARK),
        "light" => Ok(LIGHT),
        other => Err(ConfigError::UnknownTheme(other.to_string())),
    }
}

/// Map a 256-color palette index to RGB given a theme's first 16 slots.
/// 16..=231 is a 6x6x6 cube with levels {0,95,135,175,215,255}; 232..=255 is
/// a 24-step gray ramp `8 + 10*(n-232)`.
pub fn indexed_to_rgb(theme: &Theme, index: u8) -> Rgb {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match index {
        0..=15 => theme.palette[index as usize],
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            Rgb(LEVELS[r as usize], LEVELS[g as usize], LEVELS[b as usize])
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            Rgb(v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_themes() {
        assert_eq!(resolve("dark").unwrap().name, "dark");
        assert_eq!(resolve("light").unwrap().name, "light");
        assert!(resolve("nope").is_err());
    }

    #[test]
    fn cube_boundaries() {
        let dark = resolve("dark").unwrap();
        assert_eq!(indexed_to_rgb(&dark, 16), Rgb(0, 0, 0));
        assert_eq!(indexed_to_rgb(&dark, 231), Rgb(255, 255, 255));
        assert_eq!(indexed_to_rgb(&dark, 232), Rgb(8, 8, 8));
        assert_eq!(indexed_to_rgb(&dark, 255), Rgb(238, 238, 238));
    }
}
