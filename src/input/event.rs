use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const META  = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEventKind {
    KeyDown,
    Raw,
}

/// A decoded keystroke: a named key (`"Up"`, `"F5"`, `"Enter"`) or a single
/// printable grapheme, plus the modifier keys held and when it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub time: f64,
    pub key: String,
    pub modifiers: Modifiers,
    pub kind: InputEventKind,
}

impl InputEvent {
    pub fn keydown(key: impl Into<String>, modifiers: Modifiers, time: f64) -> Self {
        Self {
            time,
            key: key.into(),
            modifiers,
            kind: InputEventKind::KeyDown,
        }
    }
}
