//! Wide-character classification for CJK/fullwidth text and pictographs, plus
//! the VS16 (U+FE0F) emoji-presentation promotion list.

use unicode_width::UnicodeWidthChar;

/// True if `ch` occupies two display columns. Grounded on the teacher's own
/// `UnicodeWidthChar::width(c).unwrap_or(1)` call (`terminal/state.rs`'s
/// `print`/cursor-backspace handling) rather than a hand-rolled range table.
pub fn is_wide(ch: char) -> bool {
    ch.width().unwrap_or(1) >= 2
}

/// Returns true if `base` is a narrow glyph that VS16 (emoji-style
/// presentation) promotes to wide. Not exhaustive — covers the common
/// keycap/symbol set seen in terminal output (status glyphs, arrows,
/// weather, card suits).
pub fn vs16_promotes(base: char) -> bool {
    matches!(
        base,
        '#' | '*'
            | '0'..='9'
            | '\u{2122}' // ™
            | '\u{2139}' // ℹ
            | '\u{2194}'..='\u{2199}' // arrows
            | '\u{21A9}'..='\u{21AA}'
            | '\u{231A}'..='\u{231B}' // watch, hourglass
            | '\u{2328}'
            | '\u{23CF}'
            | '\u{23E9}'..='\u{23F3}'
            | '\u{23F8}'..='\u{23FA}'
            | '\u{25AA}'..='\u{25AB}'
            | '\u{25B6}'
            | '\u{25C0}'
            | '\u{25FB}'..='\u{25FE}'
            | '\u{2600}'..='\u{27BF}' // misc symbols, dingbats
            | '\u{2934}'..='\u{2935}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_ranges_are_wide() {
        assert!(is_wide('中'));
        assert!(is_wide('文'));
        assert!(is_wide('한'));
    }

    #[test]
    fn ascii_is_narrow() {
        assert!(!is_wide('a'));
        assert!(!is_wide('!'));
    }

    #[test]
    fn emoji_block_is_wide() {
        assert!(is_wide('\u{1F600}'));
    }

    #[test]
    fn vs16_list_covers_hash_and_digits() {
        assert!(vs16_promotes('#'));
        assert!(vs16_promotes('7'));
        assert!(!vs16_promotes('中'));
    }
}
