//! Asciicast v2 read/write: line-delimited JSON, one header object followed
//! by one `[time, "o"|"i", data]` array per event.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::{AppError, Result};

use super::session::{Event, EventKind, Header, RecordingSession};

pub fn read_file(path: &Path) -> Result<RecordingSession> {
    let file = File::open(path)?;
    read(BufReader::new(file), path)
}

pub fn write_file(path: &Path, session: &RecordingSession) -> Result<()> {
    let file = File::create(path)?;
    write(file, session)
}

pub fn read<R: BufRead>(reader: R, path: &Path) -> Result<RecordingSession> {
    let malformed = |reason: &str| AppError::CastFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut lines = reader.lines();
    let header = loop {
        let line = lines
            .next()
            .ok_or_else(|| malformed("missing header line"))??;
        if line.trim().is_empty() {
            continue;
        }
        break parse_header(&line, path)?;
    };

    let mut events = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        let Some(arr) = value.as_array() else {
            continue;
        };
        if arr.len() < 3 {
            continue;
        }
        let (time, kind, data) = (
            arr[0].as_f64(),
            arr[1].as_str().and_then(EventKind::from_code),
            arr[2].as_str(),
        );
        if let (Some(time), Some(kind), Some(data)) = (time, kind, data) {
            events.push(Event {
                time,
                kind,
                data: data.to_string(),
            });
        }
    }

    Ok(RecordingSession { header, events })
}

fn parse_header(line: &str, path: &Path) -> Result<Header> {
    let malformed = |reason: &str| AppError::CastFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let value: Value = serde_json::from_str(line).map_err(|_| malformed("header is not valid JSON"))?;
    let width = value
        .get("width")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed("header missing width"))? as u16;
    let height = value
        .get("height")
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed("header missing height"))? as u16;
    let timestamp = value.get("timestamp").and_then(Value::as_i64).unwrap_or(0);
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(2) as u32;
    Ok(Header {
        version,
        width,
        height,
        timestamp,
    })
}

pub fn write<W: Write>(mut writer: W, session: &RecordingSession) -> Result<()> {
    let header = json!({
        "version": session.header.version,
        "width": session.header.width,
        "height": session.header.height,
        "timestamp": session.header.timestamp,
    });
    writeln!(writer, "{header}")?;
    for event in &session.events {
        let line = json!([event.time, event.kind.code(), event.data]);
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> RecordingSession {
        let mut s = RecordingSession::new(80, 24, 1_700_000_000);
        s.push_output(0.01, "hello".into());
        s.push_input(0.2, "\r".into());
        s
    }

    #[test]
    fn round_trips_header_and_events() {
        let session = sample();
        let mut buf = Vec::new();
        write(&mut buf, &session).unwrap();
        let read_back = read(Cursor::new(buf), Path::new("mem.cast")).unwrap();
        assert_eq!(read_back.header.width, 80);
        assert_eq!(read_back.header.height, 24);
        assert_eq!(read_back.events.len(), 2);
        assert_eq!(read_back.events[0].data, "hello");
        assert_eq!(read_back.events[1].kind, EventKind::Input);
    }

    #[test]
    fn skips_blank_lines_and_malformed_arrays() {
        let content = "{\"version\":2,\"width\":4,\"height\":2,\"timestamp\":0}\n\n[0.1,\"o\"]\n[0.2,\"o\",\"x\"]\n";
        let session = read(Cursor::new(content), Path::new("mem.cast")).unwrap();
        assert_eq!(session.events.len(), 1);
        assert_eq!(session.events[0].data, "x");
    }

    #[test]
    fn missing_header_is_a_cast_format_error() {
        let content = "\n\n";
        let err = read(Cursor::new(content), Path::new("mem.cast")).unwrap_err();
        assert!(matches!(err, AppError::CastFormat { .. }));
    }

    #[test]
    fn write_file_then_read_file_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.cast");
        write_file(&path, &sample()).unwrap();
        let read_back = read_file(&path).unwrap();
        assert_eq!(read_back.header.width, 80);
        assert_eq!(read_back.events.len(), 2);
        assert_eq!(read_back.events[0].data, "hello");
    }
}
