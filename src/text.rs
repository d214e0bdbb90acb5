//! Arabic text normalization: diacritic stripping and whitespace tokenization

/// Combining marks removed before any lookup: tanween, short vowels, shadda,
/// sukun, superscript alef and the Quranic annotation signs.
pub fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

pub fn strip_diacritics(text: &str) -> String {
    text.chars().filter(|c| !is_diacritic(*c)).collect()
}

/// Strip diacritics and split on whitespace, dropping empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    strip_diacritics(text)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// Canonical stripped form: tokens joined by a single space.
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Form used for dictionary lookups: diacritics stripped, alef wasla (ٱ)
/// folded to bare alef so Uthmani spellings hit the same table entries.
pub fn lookup_form(token: &str) -> String {
    token
        .chars()
        .filter(|c| !is_diacritic(*c))
        .map(|c| if c == 'ٱ' { 'ا' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split on whitespace keeping the surface form (diacritics intact).
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(|s| s.to_string()).collect()
}

/// Drop a leading definite article (ال) if present.
pub fn strip_definite_article(token: &str) -> Option<&str> {
    token.strip_prefix("ال")
}
