//! Triliteral root guessing.
//!
//! Known derivative forms are matched exactly against a small table. Anything
//! else falls back to the first three distinct letters of the word, which is
//! a crude stand-in for morphological analysis and is often wrong for words
//! carrying prefixes or weak radicals.

use crate::text::lookup_form;

pub const ROOT_NOT_AVAILABLE: &str = "N/A";

/// Roots in scan order with the surface forms known to derive from them.
static KNOWN_ROOTS: &[(&str, &[&str])] = &[
    ("ع ل م", &["عالم", "علامة", "تعليم", "معلم", "عليم"]),
    ("ك ت ب", &["كتاب", "مكتب", "كاتب", "مكتوب", "يكتب"]),
    ("ق و ل", &["قال", "يقول", "قائل", "مقول", "قول"]),
    ("ع ب د", &["عابد", "عبادة", "معبود", "يعبد", "عبد"]),
    ("ح م د", &["حامد", "حمدة", "محمود", "يحمد", "حمد"]),
    ("ص ل و", &["مصلى", "صلاة", "مصلي", "يصلي", "صلى"]),
    ("ز ك و", &["زكاة", "زكي", "مزكى", "يزكي", "زكى"]),
    ("ر ح م", &["رحمن", "رحيب", "راحة", "مرحوم", "رحم"]),
    ("ر ب ب", &["رب", "ربوبية", "تربية", "رباني"]),
    ("د ي ن", &["دين", "مدين", "ديني", "تدين"]),
    ("ن ف س", &["نفس", "أنفس", "نفسي", "نفوس"]),
    ("خ ل ق", &["خلق", "يخلق", "مخلوق", "خلاق"]),
    ("ه د ي", &["هدى", "يهدي", "مهتد", "هداية"]),
    ("ص ب ر", &["صبر", "يصبر", "صابر"]),
    ("ش ك ر", &["شكر", "يشكر", "شاكر"]),
];

fn known_root(word: &str) -> Option<&'static str> {
    KNOWN_ROOTS
        .iter()
        .find(|(_, forms)| forms.contains(&word))
        .map(|(root, _)| *root)
}

/// First three distinct alphabetic characters, space separated.
fn leading_letters(word: &str) -> String {
    let mut letters: Vec<char> = Vec::with_capacity(3);
    for c in word.chars() {
        if c.is_alphabetic() && !letters.contains(&c) {
            letters.push(c);
            if letters.len() == 3 {
                break;
            }
        }
    }

    if letters.is_empty() {
        return ROOT_NOT_AVAILABLE.to_string();
    }

    letters
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_root(token: &str) -> String {
    let word = lookup_form(token);

    if let Some(root) = known_root(&word) {
        return root.to_string();
    }

    leading_letters(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_derivative() {
        assert_eq!(extract_root("كتاب"), "ك ت ب");
        assert_eq!(extract_root("يَقُولُ"), "ق و ل");
        assert_eq!(extract_root("رَحْمَٰن"), "ر ح م");
    }

    #[test]
    fn test_exact_membership_only() {
        // the article is not stripped before matching
        assert_eq!(extract_root("الكتاب"), "ا ل ك");
        assert_eq!(extract_root("ٱلرَّحْمَٰنِ"), "ا ل ر");
        // contains "رب" but is not a listed form
        assert_eq!(extract_root("ربكم"), "ر ب ك");
    }

    #[test]
    fn test_fallback_three_distinct_letters() {
        let root = extract_root("سماوات");
        assert_eq!(root, "س م ا");
        assert_eq!(root.split(' ').count(), 3);
        // repeated letters are skipped
        assert_eq!(extract_root("ممدود"), "م د و");
    }

    #[test]
    fn test_fallback_short_words() {
        assert_eq!(extract_root("في"), "ف ي");
        assert_eq!(extract_root("لل"), "ل");
    }

    #[test]
    fn test_not_available() {
        assert_eq!(extract_root(""), ROOT_NOT_AVAILABLE);
        assert_eq!(extract_root("123 ..."), ROOT_NOT_AVAILABLE);
    }
}
