//! Letter-by-letter Latin transcription of Arabic tokens.
//!
//! This is a best-effort approximation used only when no word-by-word
//! provider supplied a transliteration. It ignores vowelling, assimilation
//! and long vowels, so the output is a reading aid rather than an accurate
//! romanization.

use crate::text::is_diacritic;

/// The 28 base letters followed by hamza seats, ta marbuta and alef variants.
static LETTERS: &[(char, &str)] = &[
    ('ا', "a"),
    ('ب', "b"),
    ('ت', "t"),
    ('ث', "th"),
    ('ج', "j"),
    ('ح', "h"),
    ('خ', "kh"),
    ('د', "d"),
    ('ذ', "dh"),
    ('ر', "r"),
    ('ز', "z"),
    ('س', "s"),
    ('ش', "sh"),
    ('ص', "s"),
    ('ض', "d"),
    ('ط', "t"),
    ('ظ', "dh"),
    ('ع', "a"),
    ('غ', "gh"),
    ('ف', "f"),
    ('ق', "q"),
    ('ك', "k"),
    ('ل', "l"),
    ('م', "m"),
    ('ن', "n"),
    ('ه', "h"),
    ('و', "w"),
    ('ي', "y"),
    ('ء', "'"),
    ('أ', "a"),
    ('إ', "i"),
    ('آ', "aa"),
    ('ٱ', "a"),
    ('ى', "a"),
    ('ة', "h"),
    ('ؤ', "'u"),
    ('ئ', "'i"),
];

fn latin_for(c: char) -> Option<&'static str> {
    LETTERS.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

/// Transcribe `token`; `index` is the zero-based word position and is only
/// used for the `word_<n>` placeholder when nothing could be emitted.
pub fn transliterate(token: &str, index: usize) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if let Some(latin) = latin_for(c) {
            out.push_str(latin);
        } else if is_diacritic(c) {
            continue;
        } else {
            out.push(c);
        }
    }

    if out.is_empty() {
        format!("word_{}", index + 1)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_letters() {
        assert_eq!(transliterate("بسم", 0), "bsm");
        assert_eq!(transliterate("كتاب", 0), "ktab");
        assert_eq!(transliterate("شكر", 0), "shkr");
    }

    #[test]
    fn test_diacritics_skipped() {
        assert_eq!(transliterate("بِسْمِ", 0), "bsm");
        assert_eq!(transliterate("رَبِّ", 3), "rb");
    }

    #[test]
    fn test_unknown_chars_pass_through() {
        assert_eq!(transliterate("ب-1", 0), "b-1");
        assert_eq!(transliterate("abc", 0), "abc");
    }

    #[test]
    fn test_placeholder_when_empty() {
        assert_eq!(transliterate("", 0), "word_1");
        assert_eq!(transliterate("َُ", 4), "word_5");
    }
}
