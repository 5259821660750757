//! `RecordingSession` plumbing: the asciicast codec, a piped-stdin recorder,
//! and the PTY recorder, all producing the same `RecordingSession` value
//! that renderers consume.

pub mod cast_codec;
pub mod pipe_recorder;
pub mod pty_recorder;
pub mod session;

pub use session::{Completion, Event, EventKind, Header, RecordingSession};

/// Seconds since the Unix epoch, for a fresh session header's `timestamp`.
pub fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
