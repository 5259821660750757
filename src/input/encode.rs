//! Inverse of `decode`: turns a structured `InputEvent` back into the VT
//! bytes a real terminal would have sent for that keystroke.

use super::event::{InputEvent, InputEventKind, Modifiers};

fn modifier_code(m: Modifiers) -> u16 {
    let mut bits = 0u16;
    if m.contains(Modifiers::SHIFT) {
        bits |= 0b0001;
    }
    if m.contains(Modifiers::ALT) {
        bits |= 0b0010;
    }
    if m.contains(Modifiers::CTRL) {
        bits |= 0b0100;
    }
    if m.contains(Modifiers::META) {
        bits |= 0b1000;
    }
    1 + bits
}

fn named_key_bytes(key: &str, m: Modifiers) -> Option<Vec<u8>> {
    let modcode = modifier_code(m);
    let letter_seq = |letter: char| -> Vec<u8> {
        if modcode > 1 {
            format!("\x1b[1;{modcode}{letter}").into_bytes()
        } else {
            format!("\x1b[{letter}").into_bytes()
        }
    };
    let tilde_seq = |n: u16| -> Vec<u8> {
        if modcode > 1 {
            format!("\x1b[{n};{modcode}~").into_bytes()
        } else {
            format!("\x1b[{n}~").into_bytes()
        }
    };

    Some(match key {
        "Up" => letter_seq('A'),
        "Down" => letter_seq('B'),
        "Right" => letter_seq('C'),
        "Left" => letter_seq('D'),
        "Home" => letter_seq('H'),
        "End" => letter_seq('F'),
        "F1" if modcode <= 1 => b"\x1bOP".to_vec(),
        "F2" if modcode <= 1 => b"\x1bOQ".to_vec(),
        "F3" if modcode <= 1 => b"\x1bOR".to_vec(),
        "F4" if modcode <= 1 => b"\x1bOS".to_vec(),
        "F1" => tilde_seq(11),
        "F2" => tilde_seq(12),
        "F3" => tilde_seq(13),
        "F4" => tilde_seq(14),
        "F5" => tilde_seq(15),
        "F6" => tilde_seq(17),
        "F7" => tilde_seq(18),
        "F8" => tilde_seq(19),
        "F9" => tilde_seq(20),
        "F10" => tilde_seq(21),
        "F11" => tilde_seq(23),
        "F12" => tilde_seq(24),
        "Insert" => tilde_seq(2),
        "Delete" => tilde_seq(3),
        "PageUp" => tilde_seq(5),
        "PageDown" => tilde_seq(6),
        "Tab" if m.contains(Modifiers::SHIFT) => b"\x1b[Z".to_vec(),
        "Tab" => vec![0x09],
        "Enter" => vec![b'\r'],
        "Backspace" => vec![0x7F],
        "Escape" => vec![0x1B],
        _ => return None,
    })
}

fn is_named(key: &str) -> bool {
    named_key_bytes(key, Modifiers::empty()).is_some()
}

fn single_letter(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    c.is_ascii_alphabetic().then(|| c.to_ascii_lowercase())
}

/// Encode one event to the bytes a terminal would send over its input
/// stream. Unknown keys fall back to the UTF-8 of the key string itself.
pub fn event_to_bytes(e: &InputEvent) -> Vec<u8> {
    if e.kind == InputEventKind::Raw {
        return e.key.clone().into_bytes();
    }

    let only = |flag: Modifiers| e.modifiers == flag;

    if only(Modifiers::CTRL) {
        if let Some(c) = single_letter(&e.key) {
            return vec![c as u8 - b'a' + 1];
        }
    }
    if only(Modifiers::ALT) && !is_named(&e.key) && e.key.chars().count() == 1 {
        let mut bytes = vec![0x1B];
        bytes.extend(e.key.as_bytes());
        return bytes;
    }
    if let Some(bytes) = named_key_bytes(&e.key, e.modifiers) {
        return bytes;
    }

    e.key.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::decode::parse_input_text;

    #[test]
    fn ctrl_c_roundtrips() {
        let e = InputEvent::keydown("c", Modifiers::CTRL, 0.0);
        let bytes = event_to_bytes(&e);
        assert_eq!(bytes, vec![0x03]);
        let decoded = parse_input_text(&bytes, 0.0);
        assert_eq!(decoded[0].key, "c");
        assert_eq!(decoded[0].modifiers, Modifiers::CTRL);
    }

    #[test]
    fn plain_printable_roundtrips() {
        let e = InputEvent::keydown("x", Modifiers::empty(), 0.0);
        let bytes = event_to_bytes(&e);
        assert_eq!(bytes, b"x");
    }

    #[test]
    fn named_arrow_roundtrips() {
        let e = InputEvent::keydown("Up", Modifiers::empty(), 0.0);
        let bytes = event_to_bytes(&e);
        let decoded = parse_input_text(&bytes, 0.0);
        assert_eq!(decoded[0].key, "Up");
    }

    #[test]
    fn modified_arrow_roundtrips() {
        let e = InputEvent::keydown("Right", Modifiers::CTRL, 0.0);
        let bytes = event_to_bytes(&e);
        let decoded = parse_input_text(&bytes, 0.0);
        assert_eq!(decoded[0].key, "Right");
        assert_eq!(decoded[0].modifiers, Modifiers::CTRL);
    }
}
