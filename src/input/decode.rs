//! Decodes VT input byte streams (what a terminal sends when a key is
//! pressed) back into structured `InputEvent`s.

use super::event::{InputEvent, Modifiers};

enum Utf8Take {
    Char(char, usize),
    Incomplete,
    Invalid(usize),
}

fn take_utf8_char(buf: &[u8]) -> Utf8Take {
    match std::str::from_utf8(buf) {
        Ok(s) => match s.chars().next() {
            Some(c) => Utf8Take::Char(c, c.len_utf8()),
            None => Utf8Take::Incomplete,
        },
        Err(e) => {
            if e.valid_up_to() > 0 {
                let s = std::str::from_utf8(&buf[..e.valid_up_to()]).expect("validated");
                let c = s.chars().next().expect("non-empty");
                Utf8Take::Char(c, c.len_utf8())
            } else if e.error_len().is_none() {
                Utf8Take::Incomplete
            } else {
                Utf8Take::Invalid(1)
            }
        }
    }
}

/// Result of scanning one CSI sequence: bytes consumed (from the `ESC`),
/// whether it carried a private prefix or an intermediate byte, the final
/// byte, and its numeric parameters.
struct Csi {
    consumed: usize,
    filtered: bool,
    final_byte: u8,
    params: Vec<u16>,
}

fn scan_csi(rest: &[u8]) -> Option<Csi> {
    // rest[0] == ESC, rest[1] == '['
    let mut idx = 2;
    if idx >= rest.len() {
        return None;
    }
    let mut private = false;
    if matches!(rest[idx], b'?' | b'<' | b'>' | b'=') {
        private = true;
        idx += 1;
    }
    let param_start = idx;
    while idx < rest.len() && (rest[idx].is_ascii_digit() || rest[idx] == b';' || rest[idx] == b':') {
        idx += 1;
    }
    if idx >= rest.len() {
        return None;
    }
    let param_bytes = &rest[param_start..idx];
    let intermediate_start = idx;
    while idx < rest.len() && (0x20..=0x2F).contains(&rest[idx]) {
        idx += 1;
    }
    let has_intermediate = idx > intermediate_start;
    if idx >= rest.len() {
        return None;
    }
    let final_byte = rest[idx];
    idx += 1;

    let params: Vec<u16> = param_bytes
        .split(|&b| b == b';')
        .map(|p| {
            std::str::from_utf8(p)
                .ok()
                .and_then(|s| s.split(':').next())
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(0)
        })
        .collect();

    Some(Csi {
        consumed: idx,
        filtered: private || has_intermediate,
        final_byte,
        params,
    })
}

fn modifier_from_param(m: Option<u16>) -> Modifiers {
    let bits = m.unwrap_or(1).saturating_sub(1);
    let mut mods = Modifiers::empty();
    if bits & 0b0001 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if bits & 0b0010 != 0 {
        mods |= Modifiers::ALT;
    }
    if bits & 0b0100 != 0 {
        mods |= Modifiers::CTRL;
    }
    if bits & 0b1000 != 0 {
        mods |= Modifiers::META;
    }
    mods
}

fn tilde_key(n: u16) -> Option<&'static str> {
    Some(match n {
        1 | 7 => "Home",
        2 => "Insert",
        3 => "Delete",
        4 | 8 => "End",
        5 => "PageUp",
        6 => "PageDown",
        11 => "F1",
        12 => "F2",
        13 => "F3",
        14 => "F4",
        15 => "F5",
        17 => "F6",
        18 => "F7",
        19 => "F8",
        20 => "F9",
        21 => "F10",
        23 => "F11",
        24 => "F12",
        _ => return None,
    })
}

const F_KEY_NAMES: [&str; 12] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
];

fn vk_to_name(vk: u16) -> Option<&'static str> {
    if (0x70..=0x7B).contains(&vk) {
        return Some(F_KEY_NAMES[(vk - 0x70) as usize]);
    }
    match vk {
        0x25 => Some("Left"),
        0x26 => Some("Up"),
        0x27 => Some("Right"),
        0x28 => Some("Down"),
        0x24 => Some("Home"),
        0x23 => Some("End"),
        0x21 => Some("PageUp"),
        0x22 => Some("PageDown"),
        0x2D => Some("Insert"),
        0x2E => Some("Delete"),
        0x0D => Some("Enter"),
        0x08 => Some("Backspace"),
        0x1B => Some("Escape"),
        0x09 => Some("Tab"),
        _ => None,
    }
}

/// `Vk;Sc;Uc;Kd;Cs;Rc` — Windows Terminal's win32-input-mode CSI. `Kd=0` is
/// a key-up event and is skipped; `Cs` bits follow the Win32 console API's
/// `dwControlKeyState` (right/left alt = 0x1/0x2, right/left ctrl = 0x4/0x8,
/// shift = 0x10) rather than the terser, internally inconsistent gloss in
/// the prose spec this was drawn from.
fn decode_win32(params: &[u16], t: f64) -> Option<InputEvent> {
    if params.len() != 6 {
        return None;
    }
    let (vk, kd, cs) = (params[0], params[3], params[4]);
    if kd == 0 {
        return None;
    }
    let name = vk_to_name(vk)?;
    let mut modifiers = Modifiers::empty();
    if cs & 0x0003 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if cs & 0x000C != 0 {
        modifiers |= Modifiers::CTRL;
    }
    if cs & 0x0010 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    Some(InputEvent::keydown(name, modifiers, t))
}

fn decode_csi_event(csi: &Csi, t: f64) -> Option<InputEvent> {
    let arrow_or_home_end = |name: &str| {
        let modifiers = if csi.params.len() >= 2 {
            modifier_from_param(Some(csi.params[1]))
        } else {
            Modifiers::empty()
        };
        Some(InputEvent::keydown(name, modifiers, t))
    };
    match csi.final_byte {
        b'A' => arrow_or_home_end("Up"),
        b'B' => arrow_or_home_end("Down"),
        b'C' => arrow_or_home_end("Right"),
        b'D' => arrow_or_home_end("Left"),
        b'H' => arrow_or_home_end("Home"),
        b'F' => arrow_or_home_end("End"),
        b'P' => arrow_or_home_end("F1"),
        b'Q' => arrow_or_home_end("F2"),
        b'R' => arrow_or_home_end("F3"),
        b'S' => arrow_or_home_end("F4"),
        b'Z' => Some(InputEvent::keydown("Tab", Modifiers::SHIFT, t)),
        b'~' => {
            let n = csi.params.first().copied().unwrap_or(0);
            let name = tilde_key(n)?;
            let modifiers = modifier_from_param(csi.params.get(1).copied());
            Some(InputEvent::keydown(name, modifiers, t))
        }
        b'_' => decode_win32(&csi.params, t),
        _ => None,
    }
}

fn decode_ss3(final_byte: u8, t: f64) -> Option<InputEvent> {
    let name = match final_byte {
        b'A' => "Up",
        b'B' => "Down",
        b'C' => "Right",
        b'D' => "Left",
        b'H' => "Home",
        b'F' => "End",
        b'P' => "F1",
        b'Q' => "F2",
        b'R' => "F3",
        b'S' => "F4",
        _ => return None,
    };
    Some(InputEvent::keydown(name, Modifiers::empty(), t))
}

/// Decode a complete chunk. A standalone trailing ESC (nothing follows it)
/// resolves to a lone `Escape` event, matching `event_to_bytes(Escape) ==
/// [0x1B]`. Any other trailing incomplete escape/CSI/SS3/UTF-8 suffix is
/// silently dropped — callers that might see a chunk boundary mid-sequence
/// should use [`parse_input_text_partial`] instead, where a trailing ESC is
/// always a genuine incomplete-sequence remainder.
pub fn parse_input_text(bytes: &[u8], t: f64) -> Vec<InputEvent> {
    let (mut events, remainder) = parse_input_text_partial(bytes, t);
    if remainder == [0x1B] {
        events.push(InputEvent::keydown("Escape", Modifiers::empty(), t));
    }
    events
}

/// Streaming-safe decode: returns the events found plus any trailing
/// incomplete sequence to prepend to the next chunk.
pub fn parse_input_text_partial(bytes: &[u8], t: f64) -> (Vec<InputEvent>, Vec<u8>) {
    let mut events = Vec::new();
    let mut i = 0;
    let len = bytes.len();

    while i < len {
        let b = bytes[i];
        if b == 0x1B {
            if i + 1 >= len {
                return (events, bytes[i..].to_vec());
            }
            match bytes[i + 1] {
                0x1B => {
                    events.push(InputEvent::keydown("Escape", Modifiers::empty(), t));
                    i += 1;
                }
                b'[' => match scan_csi(&bytes[i..]) {
                    Some(csi) => {
                        if !csi.filtered {
                            if let Some(ev) = decode_csi_event(&csi, t) {
                                events.push(ev);
                            }
                        }
                        i += csi.consumed;
                    }
                    None => return (events, bytes[i..].to_vec()),
                },
                b'O' => {
                    if i + 2 >= len {
                        return (events, bytes[i..].to_vec());
                    }
                    if let Some(ev) = decode_ss3(bytes[i + 2], t) {
                        events.push(ev);
                    }
                    i += 3;
                }
                other => match take_utf8_char(&bytes[i + 1..]) {
                    Utf8Take::Char(c, width) => {
                        events.push(InputEvent::keydown(c.to_string(), Modifiers::ALT, t));
                        i += 1 + width;
                    }
                    Utf8Take::Incomplete => return (events, bytes[i..].to_vec()),
                    Utf8Take::Invalid(_) => {
                        let _ = other;
                        i += 2;
                    }
                },
            }
            continue;
        }

        if b == 0x08 || b == 0x7F {
            events.push(InputEvent::keydown("Backspace", Modifiers::empty(), t));
            i += 1;
            continue;
        }
        if b == 0x09 {
            events.push(InputEvent::keydown("Tab", Modifiers::empty(), t));
            i += 1;
            continue;
        }
        if b == 0x0A || b == 0x0D {
            events.push(InputEvent::keydown("Enter", Modifiers::empty(), t));
            i += if b == 0x0D && i + 1 < len && bytes[i + 1] == 0x0A { 2 } else { 1 };
            continue;
        }
        if (0x01..=0x1A).contains(&b) {
            let letter = (b - 1 + b'a') as char;
            events.push(InputEvent::keydown(letter.to_string(), Modifiers::CTRL, t));
            i += 1;
            continue;
        }

        match take_utf8_char(&bytes[i..]) {
            Utf8Take::Char(c, width) => {
                events.push(InputEvent::keydown(c.to_string(), Modifiers::empty(), t));
                i += width;
            }
            Utf8Take::Incomplete => return (events, bytes[i..].to_vec()),
            Utf8Take::Invalid(skip) => i += skip,
        }
    }

    (events, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_coalesces_to_one_enter() {
        let events = parse_input_text(b"\r\n", 0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "Enter");
    }

    #[test]
    fn double_cr_is_two_enters() {
        let events = parse_input_text(b"\r\r", 0.0);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn ctrl_c_decodes_to_ctrl_modifier() {
        let events = parse_input_text(&[0x03], 0.0);
        assert_eq!(events[0].key, "c");
        assert_eq!(events[0].modifiers, Modifiers::CTRL);
    }

    #[test]
    fn arrow_key_decodes() {
        let events = parse_input_text(b"\x1b[A", 0.0);
        assert_eq!(events[0].key, "Up");
    }

    #[test]
    fn modified_arrow_key_decodes_modifiers() {
        let events = parse_input_text(b"\x1b[1;5C", 0.0); // ctrl+right
        assert_eq!(events[0].key, "Right");
        assert_eq!(events[0].modifiers, Modifiers::CTRL);
    }

    #[test]
    fn filtered_csi_with_private_prefix_yields_no_events() {
        let events = parse_input_text(b"\x1b[?1;2c", 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn tilde_table_decodes_delete() {
        let events = parse_input_text(b"\x1b[3~", 0.0);
        assert_eq!(events[0].key, "Delete");
    }

    #[test]
    fn ss3_decodes_f1() {
        let events = parse_input_text(b"\x1bOP", 0.0);
        assert_eq!(events[0].key, "F1");
    }

    #[test]
    fn alt_modified_char_prepends_alt() {
        let events = parse_input_text(b"\x1bx", 0.0);
        assert_eq!(events[0].key, "x");
        assert_eq!(events[0].modifiers, Modifiers::ALT);
    }

    #[test]
    fn partial_decode_buffers_incomplete_escape() {
        let (events, remainder) = parse_input_text_partial(b"a\x1b[1", 0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(remainder, b"\x1b[1");
    }

    #[test]
    fn standalone_trailing_escape_resolves_to_escape_event() {
        let events = parse_input_text(&[0x1B], 0.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "Escape");
        assert_eq!(events[0].modifiers, Modifiers::empty());

        // The streaming-safe variant still treats a lone trailing ESC as a
        // possible chunk boundary, not a resolved event.
        let (partial_events, remainder) = parse_input_text_partial(&[0x1B], 0.0);
        assert!(partial_events.is_empty());
        assert_eq!(remainder, vec![0x1B]);
    }

    #[test]
    fn partial_decode_idempotence_across_a_split_point() {
        let full = b"a\x1b[Ab\x1b[3~c";
        for split in 0..full.len() {
            let (events1, rem) = parse_input_text_partial(&full[..split], 0.0);
            let mut rejoined = rem;
            rejoined.extend_from_slice(&full[split..]);
            let (events2, leftover) = parse_input_text_partial(&rejoined, 0.0);
            assert!(leftover.is_empty());
            let whole = parse_input_text(full, 0.0);
            let mut combined = events1;
            combined.extend(events2);
            assert_eq!(combined.len(), whole.len());
        }
    }
}
