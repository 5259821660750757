//! `RecordingSession`: an ordered, append-only list of timestamped output
//! events plus the header a renderer needs to size its `ScreenBuffer`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
    pub width: u16,
    pub height: u16,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Output,
    Input,
}

impl EventKind {
    pub fn code(self) -> &'static str {
        match self {
            EventKind::Output => "o",
            EventKind::Input => "i",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "o" => Some(EventKind::Output),
            "i" => Some(EventKind::Input),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
    pub data: String,
}

/// A recorded session. Events are appended by exactly one producer (the
/// recorder) and never mutated afterward — renderers only ever read.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    pub header: Header,
    pub events: Vec<Event>,
}

impl RecordingSession {
    pub fn new(width: u16, height: u16, timestamp: i64) -> Self {
        Self {
            header: Header {
                version: 2,
                width,
                height,
                timestamp,
            },
            events: Vec::new(),
        }
    }

    /// Appends an output event. Panics in debug builds if this would
    /// violate the monotonic-time invariant — a bug in the recorder, not
    /// something callers should need to handle.
    pub fn push_output(&mut self, time: f64, data: String) {
        self.push(time, EventKind::Output, data);
    }

    pub fn push_input(&mut self, time: f64, data: String) {
        self.push(time, EventKind::Input, data);
    }

    fn push(&mut self, time: f64, kind: EventKind, data: String) {
        debug_assert!(
            self.events.last().map(|e| e.time).unwrap_or(0.0) <= time,
            "recording session event times must be non-decreasing"
        );
        self.events.push(Event { time, kind, data });
    }

    pub fn last_event_time(&self) -> f64 {
        self.events.last().map(|e| e.time).unwrap_or(0.0)
    }
}

/// How a recording ended. Cancellation is deliberately not an `AppError`
/// variant — a cancelled session still renders and is still a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Finished,
    Cancelled { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_event_time_defaults_to_zero() {
        let session = RecordingSession::new(80, 24, 0);
        assert_eq!(session.last_event_time(), 0.0);
    }

    #[test]
    #[should_panic]
    fn push_rejects_decreasing_time_in_debug() {
        let mut session = RecordingSession::new(80, 24, 0);
        session.push_output(1.0, "a".into());
        session.push_output(0.5, "b".into());
    }
}
