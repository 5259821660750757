//! Argv parsing, confined here per SPEC_FULL's crate-shape note: the library
//! sees only `config::Config`, never `clap`.

use std::path::PathBuf;

use clap::Parser;

use svgcast::chrome::{Background, ChromeKind};
use svgcast::config::{Config, InputSource};
use svgcast::crop::CropSpec;
use svgcast::error::{AppError, ConfigError};

/// Render a terminal session to a self-contained SVG.
#[derive(Debug, Parser)]
#[command(name = "svgcast", version, about)]
pub struct Args {
    /// Where to write the generated SVG.
    #[arg(short, long, default_value = "out.svg")]
    pub output: PathBuf,

    /// Read an existing asciicast-v2 recording instead of running a command.
    #[arg(long, conflicts_with = "command")]
    pub cast: Option<PathBuf>,

    /// Command to run under a PTY. Required unless `--cast` is given or
    /// stdin is a pipe.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    #[arg(long)]
    pub cols: Option<u16>,
    #[arg(long)]
    pub rows: Option<u16>,

    #[arg(long = "crop-top")]
    pub crop_top: Option<String>,
    #[arg(long = "crop-right")]
    pub crop_right: Option<String>,
    #[arg(long = "crop-bottom")]
    pub crop_bottom: Option<String>,
    #[arg(long = "crop-left")]
    pub crop_left: Option<String>,

    #[arg(long, default_value = "dark")]
    pub theme: String,

    #[arg(long, default_value = "none")]
    pub chrome: String,

    #[arg(long, default_value_t = 0.0)]
    pub padding: f64,

    #[arg(long, default_value_t = 1.0)]
    pub opacity: f32,

    /// Empty, one color, "color1,color2" for a gradient, or an image path/URL.
    #[arg(long, default_value = "")]
    pub background: String,

    #[arg(long, default_value = "Menlo, Consolas, monospace")]
    pub font_family: String,

    /// Maximum frames per second kept in an animated render.
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    #[arg(long = "loop", default_value_t = false)]
    pub loop_animation: bool,

    /// Seconds the final frame holds before the animation ends or repeats.
    #[arg(long, default_value_t = 0.5)]
    pub sleep: f64,

    #[arg(long, default_value_t = 0.0)]
    pub fade_out: f64,

    /// Render a single static frame at this event index instead of animating.
    #[arg(long)]
    pub frame: Option<usize>,

    /// Replay a saved keystroke file into the PTY's stdin instead of
    /// forwarding the live console.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Record decoded keystrokes to this path while the session runs.
    #[arg(long)]
    pub save_replay: Option<PathBuf>,

    /// Don't mirror the child's output to our own stdout while recording.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Abort the recording after this many seconds (partial output is
    /// still rendered).
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Never let the rendered view drop below this many rows.
    #[arg(long)]
    pub min_rows: Option<u16>,

    /// Increase log verbosity (equivalent to `RUST_LOG=svgcast=debug`).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    pub fn into_config(self) -> Result<Config, AppError> {
        let input = match (self.cast, self.command.is_empty()) {
            (Some(_), false) => return Err(ConfigError::CommandAndCastFile.into()),
            (Some(path), true) => InputSource::CastFile(path),
            (None, false) => InputSource::Command(self.command),
            (None, true) => {
                if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
                    return Err(AppError::InputSource(
                        "no command, cast file, or piped input was given".to_string(),
                    ));
                }
                InputSource::Pipe
            }
        };

        let crop = CropSpec {
            top: self.crop_top.as_deref().map(CropSpec::parse_side).transpose()?,
            right: self.crop_right.as_deref().map(CropSpec::parse_side).transpose()?,
            bottom: self.crop_bottom.as_deref().map(CropSpec::parse_side).transpose()?,
            left: self.crop_left.as_deref().map(CropSpec::parse_side).transpose()?,
        };

        let chrome: ChromeKind = self.chrome.parse()?;
        let background = Background::parse(&self.background);

        let config = Config {
            output: self.output,
            input,
            cols: self.cols,
            rows: self.rows,
            crop,
            theme: self.theme,
            chrome,
            padding: self.padding,
            opacity: self.opacity,
            background,
            font_family: self.font_family,
            fps: self.fps,
            loop_animation: self.loop_animation,
            sleep: self.sleep,
            fade_out: self.fade_out,
            frame_index: self.frame,
            replay_path: self.replay,
            save_replay_path: self.save_replay,
            // Verbose-suppression of console forwarding is CLI policy, not
            // a core behavior: `forward_io` still always forwards when the
            // caller wants it, `--quiet` is just how the CLI asks for that.
            forward_io: !self.quiet,
            timeout: self.timeout,
            min_rows: self.min_rows,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_and_cast_file_conflict() {
        let args = Args {
            cast: Some(PathBuf::from("x.cast")),
            command: vec!["bash".to_string()],
            ..default_args()
        };
        assert!(matches!(
            args.into_config(),
            Err(AppError::Config(ConfigError::CommandAndCastFile))
        ));
    }

    #[test]
    fn plain_cast_file_resolves_to_cast_input() {
        let args = Args {
            cast: Some(PathBuf::from("x.cast")),
            ..default_args()
        };
        let config = args.into_config().unwrap();
        assert_eq!(config.input, InputSource::CastFile(PathBuf::from("x.cast")));
    }

    fn default_args() -> Args {
        Args {
            output: PathBuf::from("out.svg"),
            cast: None,
            command: Vec::new(),
            cols: None,
            rows: None,
            crop_top: None,
            crop_right: None,
            crop_bottom: None,
            crop_left: None,
            theme: "dark".to_string(),
            chrome: "none".to_string(),
            padding: 0.0,
            opacity: 1.0,
            background: String::new(),
            font_family: "monospace".to_string(),
            fps: 30.0,
            loop_animation: false,
            sleep: 0.5,
            fade_out: 0.0,
            frame: None,
            replay: None,
            save_replay: None,
            quiet: false,
            timeout: None,
            min_rows: None,
            verbose: false,
        }
    }
}
