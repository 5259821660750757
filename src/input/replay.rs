//! On-disk replay file format (section 6) and the wall-clock-scheduled
//! player (`ReplayStream`) that turns a decoded event list back into a
//! timed byte stream for `recording::pty_recorder` to feed into a PTY.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::event::{InputEvent, InputEventKind, Modifiers};

fn modifiers_from_names(names: &[String]) -> Modifiers {
    let mut m = Modifiers::empty();
    for name in names {
        match name.as_str() {
            "shift" => m |= Modifiers::SHIFT,
            "alt" => m |= Modifiers::ALT,
            "ctrl" => m |= Modifiers::CTRL,
            "meta" => m |= Modifiers::META,
            _ => {}
        }
    }
    m
}

fn modifiers_to_names(m: Modifiers) -> Vec<String> {
    let mut v = Vec::new();
    if m.contains(Modifiers::SHIFT) {
        v.push("shift".to_string());
    }
    if m.contains(Modifiers::ALT) {
        v.push("alt".to_string());
    }
    if m.contains(Modifiers::CTRL) {
        v.push("ctrl".to_string());
    }
    if m.contains(Modifiers::META) {
        v.push("meta".to_string());
    }
    v
}

/// One event as it appears on disk: either an absolute `time` or a `tick`
/// delta from the previous event's resolved time. `time` wins when both
/// are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayEventRaw {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<f64>,
    pub key: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `{"version":"1","createdAt":...,"totalDuration":...,"replay":[...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFile {
    pub version: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "totalDuration")]
    pub total_duration: f64,
    pub replay: Vec<ReplayEventRaw>,
}

impl ReplayFile {
    pub fn new(events: &[InputEvent], total_duration: f64, created_at: String) -> Self {
        let replay = events
            .iter()
            .map(|e| ReplayEventRaw {
                time: Some(e.time),
                tick: None,
                key: e.key.clone(),
                modifiers: modifiers_to_names(e.modifiers),
                kind: match e.kind {
                    InputEventKind::Raw => "raw".to_string(),
                    InputEventKind::KeyDown => "keydown".to_string(),
                },
            })
            .collect();
        Self {
            version: "1".to_string(),
            created_at,
            total_duration,
            replay,
        }
    }

    /// Resolve `time`/`tick` entries into absolute-time `InputEvent`s, in
    /// file order. A `tick` is a delta from the previous event's resolved
    /// time (or from zero, for the first entry).
    pub fn into_events(&self) -> Vec<InputEvent> {
        let mut out = Vec::with_capacity(self.replay.len());
        let mut prev_time = 0.0;
        for raw in &self.replay {
            let time = match (raw.time, raw.tick) {
                (Some(t), _) => t,
                (None, Some(tick)) => prev_time + tick,
                (None, None) => prev_time,
            };
            prev_time = time;
            out.push(InputEvent {
                time,
                key: raw.key.clone(),
                modifiers: modifiers_from_names(&raw.modifiers),
                kind: if raw.kind == "raw" {
                    InputEventKind::Raw
                } else {
                    InputEventKind::KeyDown
                },
            });
        }
        out
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let parsed: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(parsed)
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// Releases a decoded event list's VT bytes at each event's scheduled time,
/// measured from the stream's construction — the "time-gated stream" of
/// spec section 4.4.
pub struct ReplayStream {
    events: Vec<InputEvent>,
    start: Instant,
}

impl ReplayStream {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            events,
            start: Instant::now(),
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.events.last().map(|e| e.time).unwrap_or(0.0)
    }

    /// Blocks the calling thread, invoking `on_event` once per event at its
    /// scheduled wall-clock offset, in order. `should_stop` is polled
    /// between events so a cancelled recording can unwind promptly instead
    /// of sleeping through the rest of the replay.
    pub fn drive(mut self, mut on_event: impl FnMut(&InputEvent), mut should_stop: impl FnMut() -> bool) {
        for event in self.events.drain(..) {
            if should_stop() {
                return;
            }
            let target = Duration::from_secs_f64(event.time.max(0.0));
            let elapsed = self.start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }
            if should_stop() {
                return;
            }
            on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_deltas_resolve_against_previous_resolved_time() {
        let file = ReplayFile {
            version: "1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            total_duration: 1.0,
            replay: vec![
                ReplayEventRaw { time: None, tick: Some(0.1), key: "a".into(), modifiers: vec![], kind: "keydown".into() },
                ReplayEventRaw { time: None, tick: Some(0.2), key: "b".into(), modifiers: vec![], kind: "keydown".into() },
            ],
        };
        let events = file.into_events();
        assert_eq!(events[0].time, 0.1);
        assert_eq!(events[1].time, 0.3);
    }

    #[test]
    fn absolute_time_wins_over_tick_when_both_present() {
        let file = ReplayFile {
            version: "1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            total_duration: 1.0,
            replay: vec![ReplayEventRaw {
                time: Some(5.0),
                tick: Some(0.1),
                key: "a".into(),
                modifiers: vec![],
                kind: "keydown".into(),
            }],
        };
        assert_eq!(file.into_events()[0].time, 5.0);
    }

    #[test]
    fn round_trips_through_json() {
        let events = vec![InputEvent::keydown("Up", Modifiers::CTRL, 0.25)];
        let file = ReplayFile::new(&events, 0.25, "2024-01-01T00:00:00Z".to_string());
        let json = serde_json::to_string(&file).unwrap();
        let parsed: ReplayFile = serde_json::from_str(&json).unwrap();
        let roundtripped = parsed.into_events();
        assert_eq!(roundtripped, events);
    }

    #[test]
    fn write_file_then_read_file_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.replay.json");
        let events = vec![InputEvent::keydown("a", Modifiers::empty(), 0.0)];
        let file = ReplayFile::new(&events, 0.0, "2024-01-01T00:00:00Z".to_string());
        file.write_file(&path).unwrap();
        let read_back = ReplayFile::read_file(&path).unwrap();
        assert_eq!(read_back.into_events(), events);
    }
}
