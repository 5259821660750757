//! `InputReplay`: a bidirectional codec between VT input byte streams and
//! structured key events, plus the on-disk replay file format and a
//! wall-clock-scheduled player used by `recording::pty_recorder`.

pub mod decode;
pub mod encode;
pub mod event;
pub mod replay;

pub use decode::{parse_input_text, parse_input_text_partial};
pub use encode::event_to_bytes;
pub use event::{InputEvent, InputEventKind, Modifiers};
pub use replay::{ReplayFile, ReplayStream};
