//! `PtyRecorder`: spawns a command under a pseudo-terminal (or falls back to
//! a plain subprocess when no PTY backend is available), forwards I/O in
//! both directions, and returns the timestamped `RecordingSession` that was
//! captured. Three logically concurrent roles -- output pump, input pump,
//! exit watcher -- run as OS threads communicating through channels and a
//! shared cancellation flag, the same thread-per-role shape the teacher's
//! `pty/reader.rs` uses for its parser + render-pump pair.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use crate::error::{AppError, Result};
use crate::input::decode::parse_input_text_partial;
use crate::input::encode::event_to_bytes;
use crate::input::replay::ReplayFile;
use crate::input::{InputEvent, ReplayStream};
use crate::shell::detect::detect_shell;

use super::session::{Completion, RecordingSession};
use super::unix_timestamp;

/// Cooperative cancellation shared across the recorder's threads: Ctrl+C,
/// an overall deadline, or a programmatic caller all set the same flag.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Recorder behavior flags, matching spec section 4.3's `Record(...)` contract.
#[derive(Debug, Clone, Default)]
pub struct PtyOptions {
    pub forward_io: bool,
    pub replay_input_path: Option<PathBuf>,
    pub save_replay_path: Option<PathBuf>,
}

/// Outcome of a recording attempt: the ordinary finished/cancelled path, or
/// a replay that overran its declared duration -- the session is still
/// finalized and usable, but the caller must surface this as an error
/// afterward (section 7: "after finalizing the session, surfaced").
pub enum RecordOutcome {
    Done(RecordingSession, Completion),
    ReplayTimedOut(RecordingSession),
}

/// RAII guard: puts the controlling terminal into raw mode on construction,
/// restores it on drop -- including panic unwinds -- per section 5's
/// "restored on every exit path" rule.
struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    fn enable() -> Self {
        match crossterm::terminal::enable_raw_mode() {
            Ok(()) => {
                tracing::debug!("host terminal switched to raw mode");
                Self { active: true }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to enable raw mode on host terminal");
                Self { active: false }
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = crossterm::terminal::disable_raw_mode() {
                tracing::warn!(error = %e, "failed to restore host terminal mode");
            }
        }
    }
}

#[cfg(unix)]
fn disable_slave_echo(master: &dyn MasterPty) {
    let Some(fd) = master.as_raw_fd() else {
        return;
    };
    unsafe {
        let mut term: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut term) != 0 {
            return;
        }
        term.c_lflag &= !libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &term);
    }
}

#[cfg(not(unix))]
fn disable_slave_echo(_master: &dyn MasterPty) {}

/// Spawn `argv[0] argv[1..]` under a PTY (or, if no PTY backend is
/// available, a plain subprocess) and forward I/O until the first of {EOF,
/// child exit, cancellation, replay exhaustion + grace}.
pub fn record(
    argv: &[String],
    cols: u16,
    rows: u16,
    cancel: CancellationToken,
    opts: PtyOptions,
    timeout: Option<f64>,
) -> Result<RecordOutcome> {
    let argv: Vec<String> = if argv.is_empty() {
        vec![detect_shell()]
    } else {
        argv.to_vec()
    };
    let timestamp = unix_timestamp();

    match open_pty(cols, rows) {
        Ok(pair) => run_pty_session(pair, &argv, cols, rows, timestamp, cancel, opts, timeout),
        Err(reason) => {
            tracing::warn!(%reason, "pty backend unavailable, falling back to a plain subprocess");
            run_fallback_session(&argv, cols, rows, timestamp, cancel, timeout)
        }
    }
}

fn open_pty(cols: u16, rows: u16) -> std::result::Result<portable_pty::PtyPair, String> {
    let system = native_pty_system();
    system
        .openpty(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| e.to_string())
}

enum PumpMsg {
    Output(f64, String),
    Eof,
}

fn run_pty_session(
    pair: portable_pty::PtyPair,
    argv: &[String],
    cols: u16,
    rows: u16,
    timestamp: i64,
    cancel: CancellationToken,
    opts: PtyOptions,
    timeout: Option<f64>,
) -> Result<RecordOutcome> {
    let mut cmd = CommandBuilder::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.env("COLUMNS", cols.to_string());
    cmd.env("LINES", rows.to_string());
    cmd.env("TERM", "xterm-256color");

    let child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| AppError::PtyRuntime(e.to_string()))?;

    disable_slave_echo(pair.master.as_ref());

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| AppError::PtyRuntime(e.to_string()))?;
    let writer = pair
        .master
        .take_writer()
        .map_err(|e| AppError::PtyRuntime(e.to_string()))?;
    let master = pair.master;

    let start = Instant::now();
    let raw_guard = (opts.forward_io && opts.replay_input_path.is_none()).then(RawModeGuard::enable);

    let (out_tx, out_rx) = mpsc::channel::<PumpMsg>();
    let child: Arc<Mutex<Box<dyn Child + Send + Sync>>> = Arc::new(Mutex::new(child));
    let writer: Arc<Mutex<Box<dyn Write + Send>>> = Arc::new(Mutex::new(writer));

    let out_cancel = cancel.clone();
    let out_forward = opts.forward_io;
    let output_handle = std::thread::Builder::new()
        .name("svgcast-output-pump".into())
        .spawn(move || output_pump_loop(reader, out_tx, start, out_forward, out_cancel))
        .expect("failed to spawn pty output pump thread");

    let saved_events: Arc<Mutex<Vec<InputEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let replay_timed_out = Arc::new(AtomicBool::new(false));
    let input_handle = {
        let writer = Arc::clone(&writer);
        let cancel = cancel.clone();
        let save = opts.save_replay_path.is_some();
        let saved_events = Arc::clone(&saved_events);
        let replay_path = opts.replay_input_path.clone();
        let forward_io = opts.forward_io;
        let timed_out = Arc::clone(&replay_timed_out);
        std::thread::Builder::new()
            .name("svgcast-input-pump".into())
            .spawn(move || {
                if let Some(path) = replay_path {
                    run_replay_input(&path, &writer, &cancel, &timed_out);
                } else if forward_io {
                    run_console_input(&writer, &cancel, save, &saved_events);
                }
            })
            .expect("failed to spawn pty input pump thread")
    };

    let exited = Arc::new(AtomicBool::new(false));
    let exit_handle = {
        let child = Arc::clone(&child);
        let cancel = cancel.clone();
        let exited = Arc::clone(&exited);
        std::thread::Builder::new()
            .name("svgcast-exit-watcher".into())
            .spawn(move || exit_watcher_loop(child, cancel, exited))
            .expect("failed to spawn pty exit watcher thread")
    };

    let (session, completion) =
        drain_until_done(&out_rx, cols, rows, timestamp, start, timeout, &cancel, &exited);

    cancel.cancel();
    join_with_grace(output_handle, Duration::from_millis(200));
    join_with_grace(input_handle, Duration::from_millis(200));
    join_with_grace(exit_handle, Duration::from_millis(200));
    drop(raw_guard);
    drop(writer);
    drop(master);

    if let Some(path) = &opts.save_replay_path {
        persist_replay(path, &saved_events.lock());
    }

    if replay_timed_out.load(Ordering::SeqCst) {
        return Ok(RecordOutcome::ReplayTimedOut(session));
    }
    Ok(RecordOutcome::Done(session, completion))
}

fn output_pump_loop(
    mut reader: Box<dyn Read + Send>,
    out_tx: mpsc::Sender<PumpMsg>,
    start: Instant,
    forward_io: bool,
    cancel: CancellationToken,
) {
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                let _ = out_tx.send(PumpMsg::Eof);
                break;
            }
            Ok(n) => {
                let time = start.elapsed().as_secs_f64();
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                if forward_io {
                    let mut stdout = std::io::stdout();
                    let _ = stdout.write_all(&buf[..n]);
                    let _ = stdout.flush();
                }
                if out_tx.send(PumpMsg::Output(time, text)).is_err() {
                    break;
                }
            }
            Err(e) => {
                #[cfg(unix)]
                let is_eio = e.raw_os_error() == Some(libc::EIO);
                #[cfg(not(unix))]
                let is_eio = false;
                if !is_eio {
                    tracing::warn!(error = %e, "pty output read failed; ending recording with what was captured");
                }
                let _ = out_tx.send(PumpMsg::Eof);
                break;
            }
        }
        if cancel.is_cancelled() {
            let _ = out_tx.send(PumpMsg::Eof);
            break;
        }
    }
}

/// Blocking reads from the console can only be interrupted by EOF or
/// process exit, not by the cancellation flag; the check between reads
/// covers the common case where the output side (or a timeout) finishes
/// the recording first.
fn run_console_input(
    writer: &Arc<Mutex<Box<dyn Write + Send>>>,
    cancel: &CancellationToken,
    save: bool,
    saved_events: &Arc<Mutex<Vec<InputEvent>>>,
) {
    let mut stdin = std::io::stdin();
    let start = Instant::now();
    let mut remainder: Vec<u8> = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let n = match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed while forwarding console input");
                break;
            }
        };
        {
            let mut w = writer.lock();
            if w.write_all(&buf[..n]).is_err() {
                break;
            }
            let _ = w.flush();
        }
        if save {
            remainder.extend_from_slice(&buf[..n]);
            let time = start.elapsed().as_secs_f64();
            let (events, rest) = parse_input_text_partial(&remainder, time);
            remainder = rest;
            if !events.is_empty() {
                saved_events.lock().extend(events);
            }
        }
    }
}

fn run_replay_input(
    path: &Path,
    writer: &Arc<Mutex<Box<dyn Write + Send>>>,
    cancel: &CancellationToken,
    timed_out: &Arc<AtomicBool>,
) {
    let file = match ReplayFile::read_file(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read replay file");
            return;
        }
    };
    let total_duration = file.total_duration;
    let stream = ReplayStream::new(file.into_events());
    let start = Instant::now();

    stream.drive(
        |event| {
            let bytes = event_to_bytes(event);
            let mut w = writer.lock();
            let _ = w.write_all(&bytes);
            let _ = w.flush();
        },
        || cancel.is_cancelled(),
    );

    let elapsed = start.elapsed().as_secs_f64();
    if elapsed > total_duration + 1.0 {
        timed_out.store(true, Ordering::SeqCst);
    }
    // Termination rule: "replay-stream completion + 1s grace" before the
    // recorder considers the session over.
    std::thread::sleep(Duration::from_secs(1));
    cancel.cancel();
}

fn exit_watcher_loop(
    child: Arc<Mutex<Box<dyn Child + Send + Sync>>>,
    cancel: CancellationToken,
    exited: Arc<AtomicBool>,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let has_exited = matches!(child.lock().try_wait(), Ok(Some(_)));
        if has_exited {
            exited.store(true, Ordering::SeqCst);
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[allow(clippy::too_many_arguments)]
fn drain_until_done(
    out_rx: &mpsc::Receiver<PumpMsg>,
    cols: u16,
    rows: u16,
    timestamp: i64,
    start: Instant,
    timeout: Option<f64>,
    cancel: &CancellationToken,
    exited: &Arc<AtomicBool>,
) -> (RecordingSession, Completion) {
    let mut session = RecordingSession::new(cols, rows, timestamp);
    let deadline = timeout.map(|t| start + Duration::from_secs_f64(t.max(0.0)));
    let mut completion = Completion::Finished;

    loop {
        let wait = deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(100))
            .min(Duration::from_millis(100));
        match out_rx.recv_timeout(wait) {
            Ok(PumpMsg::Output(time, data)) => session.push_output(time, data),
            Ok(PumpMsg::Eof) => break,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    completion = Completion::Cancelled { reason: "cancelled".to_string() };
                    break;
                }
                if let Some(d) = deadline {
                    if Instant::now() >= d {
                        cancel.cancel();
                        completion = Completion::Cancelled { reason: "timeout".to_string() };
                        break;
                    }
                }
                // The exit watcher observing the child as gone never races
                // ahead of in-flight output: we keep draining the channel
                // (not just peeking) before declaring the session over.
                if exited.load(Ordering::SeqCst) {
                    while let Ok(msg) = out_rx.try_recv() {
                        match msg {
                            PumpMsg::Output(time, data) => session.push_output(time, data),
                            PumpMsg::Eof => break,
                        }
                    }
                    break;
                }
            }
        }
    }

    (session, completion)
}

fn persist_replay(path: &Path, events: &[InputEvent]) {
    let total_duration = events.last().map(|e| e.time).unwrap_or(0.0);
    let file = ReplayFile::new(events, total_duration, chrono::Utc::now().to_rfc3339());
    if let Err(e) = file.write_file(path) {
        tracing::warn!(error = %e, path = %path.display(), "failed to write replay file");
    }
}

/// Waits up to `grace` for `handle` to finish. std offers no way to force-
/// join a thread within a timeout, so a thread still blocked on a read
/// (most commonly stdin, with nothing left to write) is simply abandoned;
/// it dies with the process. This bounds how long shutdown *waits*, not how
/// long the thread may continue to exist.
fn join_with_grace(handle: std::thread::JoinHandle<()>, grace: Duration) {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("svgcast-join-shield".into())
        .spawn(move || {
            let _ = handle.join();
            let _ = tx.send(());
        });
    if spawned.is_ok() {
        let _ = rx.recv_timeout(grace);
    }
}

fn run_fallback_session(
    argv: &[String],
    cols: u16,
    rows: u16,
    timestamp: i64,
    cancel: CancellationToken,
    timeout: Option<f64>,
) -> Result<RecordOutcome> {
    use std::process::{Command, Stdio};

    let mut command = Command::new(&argv[0]);
    command.args(&argv[1..]);
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::inherit());

    let mut child = command.spawn().map_err(|e| AppError::PtyRuntime(e.to_string()))?;
    let mut stdout = child.stdout.take().expect("piped stdout");
    let child_stdin = child.stdin.take();

    let start = Instant::now();
    let (tx, rx) = mpsc::channel::<PumpMsg>();
    let output_handle = std::thread::Builder::new()
        .name("svgcast-fallback-output".into())
        .spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => {
                        let _ = tx.send(PumpMsg::Eof);
                        break;
                    }
                    Ok(n) => {
                        let time = start.elapsed().as_secs_f64();
                        let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                        if tx.send(PumpMsg::Output(time, text)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        let _ = tx.send(PumpMsg::Eof);
                        break;
                    }
                }
            }
        })
        .expect("failed to spawn fallback output pump thread");

    // No PTY means no curses-style interactivity, but a line-oriented child
    // reading stdin still works -- forward bytes the same as the PTY path.
    let input_handle = child_stdin.map(|mut sink| {
        let cancel = cancel.clone();
        std::thread::Builder::new()
            .name("svgcast-fallback-input".into())
            .spawn(move || {
                let mut stdin = std::io::stdin();
                let mut buf = [0u8; 1024];
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    match stdin.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if sink.write_all(&buf[..n]).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
            .expect("failed to spawn fallback input pump thread")
    });

    let mut session = RecordingSession::new(cols, rows, timestamp);
    let deadline = timeout.map(|t| start + Duration::from_secs_f64(t.max(0.0)));
    let mut completion = Completion::Finished;

    loop {
        let wait = deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(100))
            .min(Duration::from_millis(100));
        match rx.recv_timeout(wait) {
            Ok(PumpMsg::Output(time, data)) => session.push_output(time, data),
            Ok(PumpMsg::Eof) => break,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    completion = Completion::Cancelled { reason: "cancelled".to_string() };
                    break;
                }
                if let Some(d) = deadline {
                    if Instant::now() >= d {
                        cancel.cancel();
                        completion = Completion::Cancelled { reason: "timeout".to_string() };
                        break;
                    }
                }
                if let Ok(Some(_)) = child.try_wait() {
                    while let Ok(msg) = rx.try_recv() {
                        if let PumpMsg::Output(time, data) = msg {
                            session.push_output(time, data);
                        }
                    }
                    break;
                }
            }
        }
    }

    cancel.cancel();
    let _ = child.kill();
    join_with_grace(output_handle, Duration::from_millis(200));
    if let Some(handle) = input_handle {
        join_with_grace(handle, Duration::from_millis(200));
    }
    let _ = child.wait();

    Ok(RecordOutcome::Done(session, completion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_round_trips() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn fallback_session_captures_subprocess_output() {
        let cancel = CancellationToken::new();
        let argv = vec!["echo".to_string(), "hi".to_string()];
        let outcome = run_fallback_session(&argv, 80, 24, 0, cancel, None).unwrap();
        match outcome {
            RecordOutcome::Done(session, Completion::Finished) => {
                let combined: String = session.events.iter().map(|e| e.data.as_str()).collect();
                assert!(combined.contains("hi"), "expected captured output to contain 'hi', got {combined:?}");
            }
            _ => panic!("expected a finished fallback session"),
        }
    }

    #[test]
    fn fallback_session_honors_a_short_timeout() {
        let cancel = CancellationToken::new();
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let outcome = run_fallback_session(&argv, 80, 24, 0, cancel, Some(0.05)).unwrap();
        match outcome {
            RecordOutcome::Done(_, Completion::Cancelled { reason }) => {
                assert_eq!(reason, "timeout");
            }
            _ => panic!("expected a timeout-cancelled session"),
        }
    }
}
