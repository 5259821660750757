//! `svgcast`: render a terminal session — a live command run under a PTY, an
//! existing asciicast-v2 recording, or bytes piped to stdin — to a
//! self-contained SVG image, animated or static.
//!
//! The binary (`main.rs`) is a thin `clap` shell; everything here takes and
//! returns plain types so it can be driven directly by library callers too.

pub mod chrome;
pub mod config;
pub mod crop;
pub mod error;
pub mod input;
pub mod recording;
pub mod render;
pub mod shell;
pub mod terminal;
pub mod theme;

use std::io::Write;

use config::{Config, InputSource};
use error::{AppError, Result};
use recording::pty_recorder::{CancellationToken, PtyOptions, RecordOutcome};
use recording::{cast_codec, pipe_recorder, Completion, RecordingSession};
use render::{AnimatedSvgRenderer, SvgRenderer};

/// Install a `tracing-subscriber` fmt layer honoring `RUST_LOG`, defaulting
/// to `info` (or `debug` for this crate under `--verbose`).
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "svgcast=debug,info" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Acquire a session, render it, and write the SVG to `config.output`.
/// Returns how the underlying recording ended — a cancelled recording is
/// still a successful render of whatever was captured.
pub fn run(config: &Config) -> Result<Completion> {
    let (session, completion) = acquire_session(config)?;
    let svg = render_session(&session, config)?;
    std::fs::write(&config.output, svg)?;
    tracing::info!(path = %config.output.display(), "wrote svg");
    Ok(completion)
}

fn acquire_session(config: &Config) -> Result<(RecordingSession, Completion)> {
    match &config.input {
        InputSource::CastFile(path) => {
            let session = cast_codec::read_file(path)?;
            Ok((session, Completion::Finished))
        }
        InputSource::Pipe => {
            let width = config.cols.unwrap_or(80);
            let height = config.rows.unwrap_or(24);
            let timestamp = recording::unix_timestamp();
            let session = pipe_recorder::record(std::io::stdin(), width, height, timestamp)?;
            Ok((session, Completion::Finished))
        }
        InputSource::Command(argv) => record_command(argv, config),
    }
}

fn record_command(argv: &[String], config: &Config) -> Result<(RecordingSession, Completion)> {
    let width = config.cols.unwrap_or(80);
    let height = config.rows.unwrap_or(24);
    let cancel = CancellationToken::new();

    let ctrlc_cancel = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_cancel.cancel()) {
        tracing::debug!(error = %e, "could not install a Ctrl+C handler (already installed?)");
    }

    let opts = PtyOptions {
        forward_io: config.forward_io,
        replay_input_path: config.replay_path.clone(),
        save_replay_path: config.save_replay_path.clone(),
    };

    match recording::pty_recorder::record(argv, width, height, cancel, opts, config.timeout)? {
        RecordOutcome::Done(session, completion) => Ok((session, completion)),
        RecordOutcome::ReplayTimedOut(session) => {
            // The session is still finalized and rendered by the caller;
            // only the exit code needs to reflect that the replay overran.
            render_and_write_partial(&session, config)?;
            Err(AppError::ReplayTimeout)
        }
    }
}

fn render_and_write_partial(session: &RecordingSession, config: &Config) -> Result<()> {
    let svg = render_session(session, config)?;
    std::fs::write(&config.output, svg)?;
    Ok(())
}

/// Static (`config.frame_index` set) or animated (default) rendering —
/// the CLI's `--frame N` flag exists precisely to opt out of animating.
fn render_session(session: &RecordingSession, config: &Config) -> Result<String> {
    if config.frame_index.is_some() {
        SvgRenderer::render(session, config)
    } else {
        AnimatedSvgRenderer::render(session, config)
    }
}

/// Writes `Generated (partial): <path>` to `out`, the stderr note the
/// binary emits when a recording ended in `Completion::Cancelled`.
pub fn note_partial_output(out: &mut impl Write, config: &Config) -> std::io::Result<()> {
    writeln!(out, "Generated (partial): {}", config.output.display())
}
