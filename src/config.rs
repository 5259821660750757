//! `config::Config` — the single struct the core consumes, per spec section
//! 6 ("the core sees a configuration struct"). Built by `cli::Args` in the
//! binary, or directly by library callers and tests.

use std::path::PathBuf;

use crate::chrome::{Background, ChromeKind};
use crate::crop::CropSpec;
use crate::error::ConfigError;

/// Where session bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Run `argv[0] argv[1..]` under a PTY.
    Command(Vec<String>),
    /// Read an existing asciicast-v2 recording.
    CastFile(PathBuf),
    /// Consume bytes already piped to our stdin.
    Pipe,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub output: PathBuf,
    pub input: InputSource,
    pub cols: Option<u16>,
    pub rows: Option<u16>,
    pub crop: CropSpec,
    pub theme: String,
    pub chrome: ChromeKind,
    pub padding: f64,
    pub opacity: f32,
    pub background: Background,
    pub font_family: String,
    pub fps: f64,
    pub loop_animation: bool,
    pub sleep: f64,
    pub fade_out: f64,
    pub frame_index: Option<usize>,
    pub replay_path: Option<PathBuf>,
    pub save_replay_path: Option<PathBuf>,
    pub forward_io: bool,
    pub timeout: Option<f64>,
    pub min_rows: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("out.svg"),
            input: InputSource::Pipe,
            cols: None,
            rows: None,
            crop: CropSpec::default(),
            theme: "dark".to_string(),
            chrome: ChromeKind::None,
            padding: 0.0,
            opacity: 1.0,
            background: Background::None,
            font_family: "Menlo, Consolas, monospace".to_string(),
            fps: 30.0,
            loop_animation: false,
            sleep: 0.5,
            fade_out: 0.0,
            frame_index: None,
            replay_path: None,
            save_replay_path: None,
            forward_io: true,
            timeout: None,
            min_rows: None,
        }
    }
}

impl Config {
    /// Validate cross-field constraints the CLI layer can't express via
    /// per-flag parsing alone (mutually exclusive inputs, ranges).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(w), Some(h)) = (self.cols, self.rows) {
            if w == 0 || h == 0 {
                return Err(ConfigError::InvalidGeometry(w, h));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::InvalidOpacity(self.opacity));
        }
        crate::theme::resolve(&self.theme)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_geometry_is_rejected() {
        let mut cfg = Config::default();
        cfg.cols = Some(0);
        cfg.rows = Some(24);
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidGeometry(0, 24))));
    }

    #[test]
    fn opacity_out_of_range_is_rejected() {
        let mut cfg = Config::default();
        cfg.opacity = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidOpacity(_))));
    }
}
