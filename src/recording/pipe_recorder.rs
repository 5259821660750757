//! Wraps an arbitrary byte stream (piped stdin) into a `RecordingSession`,
//! timestamped against a monotonic clock started at the first read.

use std::io::Read;
use std::time::Instant;

use crate::error::Result;

use super::session::RecordingSession;

pub fn record<R: Read>(mut input: R, width: u16, height: u16, timestamp: i64) -> Result<RecordingSession> {
    let mut session = RecordingSession::new(width, height, timestamp);
    let start = Instant::now();
    let mut buf = [0u8; 8192];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let time = start.elapsed().as_secs_f64();
        let text = String::from_utf8_lossy(&buf[..n]).into_owned();
        session.push_output(time, text);
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn drains_stream_into_output_events() {
        let session = record(Cursor::new(b"abc".to_vec()), 80, 24, 0).unwrap();
        assert_eq!(session.events.len(), 1);
        assert_eq!(session.events[0].data, "abc");
    }

    #[test]
    fn empty_stream_yields_zero_events() {
        let session = record(Cursor::new(Vec::new()), 80, 24, 0).unwrap();
        assert!(session.events.is_empty());
    }
}
