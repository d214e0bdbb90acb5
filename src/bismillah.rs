//! Opening formula handling.
//!
//! Verse 1 of every chapter except 1 and 9 is delivered by the text sources
//! with the opening formula prepended. Readers show the formula separately,
//! so serialized verse text and word lists are cleaned here. Chapter 1 keeps
//! it because there it *is* the first verse; chapter 9 never has it.
//!
//! The canonical formula record itself is served through [`BismillahCache`].

use crate::db;
use crate::error::{MushafError, Result};
use crate::models::OpeningFormula;
use crate::text::lookup_form;
use regex_lite::Regex;
use rusqlite::Connection;
use std::sync::{Arc, LazyLock, RwLock};

/// Known renderings of the formula, tried in order.
static RENDERINGS: &[&str] = &[
    "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ",
    "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
    "بِسْمِٱللَّهِٱلرَّحْمَٰنِٱلرَّحِيمِ",
];

static CANONICAL_WORDS: [&str; 4] = ["بِسْمِ", "اللَّهِ", "الرَّحْمَٰنِ", "الرَّحِيمِ"];

static LEADING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\.،,:;]\s*").expect("valid punctuation regex"));

/// Whether cleaning applies to the given verse.
pub fn applies_to(chapter: u32, number_in_chapter: u32) -> bool {
    chapter != 1 && chapter != 9 && number_in_chapter == 1
}

/// Remove the formula from `text` unconditionally.
pub fn strip_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = text.to_string();
    if let Some(rendering) = RENDERINGS.iter().find(|r| text.contains(*r)) {
        cleaned = cleaned.replace(rendering, "");
    }

    LEADING_PUNCTUATION
        .replace(&cleaned, "")
        .trim()
        .to_string()
}

fn starts_with_formula(words: &[String]) -> bool {
    words.len() >= CANONICAL_WORDS.len()
        && CANONICAL_WORDS
            .iter()
            .zip(words.iter())
            .all(|(canonical, word)| lookup_form(word).contains(&lookup_form(canonical)))
}

/// Drop the first four words when they carry the formula.
///
/// Each position is compared by substring containment after diacritics are
/// removed and alef wasla is folded, so Uthmani and simple spellings both
/// match.
pub fn strip_words(words: &[String]) -> Vec<String> {
    if starts_with_formula(words) {
        words[CANONICAL_WORDS.len()..].to_vec()
    } else {
        words.to_vec()
    }
}

/// Number of leading words of the verse that belong to a prepended formula.
pub fn formula_word_count(chapter: u32, number_in_chapter: u32, words: &[String]) -> usize {
    if applies_to(chapter, number_in_chapter) && starts_with_formula(words) {
        CANONICAL_WORDS.len()
    } else {
        0
    }
}

pub fn clean_verse_text(chapter: u32, number_in_chapter: u32, text: &str) -> String {
    if applies_to(chapter, number_in_chapter) {
        strip_text(text)
    } else {
        text.to_string()
    }
}

pub fn clean_verse_words(chapter: u32, number_in_chapter: u32, words: &[String]) -> Vec<String> {
    if applies_to(chapter, number_in_chapter) {
        strip_words(words)
    } else {
        words.to_vec()
    }
}

/// Process-wide read-through cache for the opening formula record.
pub struct BismillahCache {
    slot: RwLock<Option<Arc<OpeningFormula>>>,
}

pub static OPENING_FORMULA: BismillahCache = BismillahCache::new();

impl BismillahCache {
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Return the cached record, loading (and creating if absent) on first use.
    pub fn get(&self, conn: &Connection) -> Result<Arc<OpeningFormula>> {
        {
            let guard = self
                .slot
                .read()
                .map_err(|_| MushafError::Other("Failed to acquire formula cache lock".to_string()))?;
            if let Some(formula) = guard.as_ref() {
                return Ok(Arc::clone(formula));
            }
        }

        let formula = Arc::new(db::load_or_create_opening_formula(conn)?);
        let mut guard = self
            .slot
            .write()
            .map_err(|_| MushafError::Other("Failed to acquire formula cache lock".to_string()))?;
        *guard = Some(Arc::clone(&formula));
        Ok(formula)
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.slot.write() {
            *guard = None;
        }
    }

    /// Persist a revised record and drop the cached copy.
    pub fn replace(&self, conn: &Connection, formula: &OpeningFormula) -> Result<()> {
        db::save_opening_formula(conn, formula)?;
        self.invalidate();
        tracing::info!("Opening formula revised, cache invalidated");
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().map(|g| g.is_some()).unwrap_or(false)
    }
}

impl Default for BismillahCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_applies_to() {
        assert!(applies_to(2, 1));
        assert!(applies_to(114, 1));
        assert!(!applies_to(1, 1));
        assert!(!applies_to(9, 1));
        assert!(!applies_to(2, 2));
    }

    #[test]
    fn test_every_rendering_removed() {
        for rendering in RENDERINGS {
            let text = format!("{} الٓمٓ", rendering);
            let cleaned = clean_verse_text(2, 1, &text);
            assert!(!cleaned.contains(rendering), "left {:?}", cleaned);
            assert_eq!(cleaned, "الٓمٓ");
        }
    }

    #[test]
    fn test_leading_punctuation_removed() {
        let text = format!("{}، قُلْ", RENDERINGS[1]);
        assert_eq!(clean_verse_text(112, 1, &text), "قُلْ");
    }

    #[test]
    fn test_first_and_ninth_chapters_untouched() {
        let text = RENDERINGS[1].to_string();
        assert_eq!(clean_verse_text(1, 1, &text), text);
        let ninth = format!("{} بَرَآءَةٌ", RENDERINGS[0]);
        assert_eq!(clean_verse_text(9, 1, &ninth), ninth);
    }

    #[test]
    fn test_text_without_formula_only_trimmed() {
        assert_eq!(clean_verse_text(2, 1, "  الٓمٓ "), "الٓمٓ");
        assert_eq!(clean_verse_text(2, 1, ""), "");
    }

    #[test]
    fn test_word_array_stripped() {
        let input = words(&["بِسْمِ", "اللَّهِ", "الرَّحْمَٰنِ", "الرَّحِيمِ", "الٓمٓ"]);
        let out = clean_verse_words(2, 1, &input);
        assert_eq!(out.len(), input.len() - 4);
        assert_eq!(out, words(&["الٓمٓ"]));
    }

    #[test]
    fn test_uthmani_word_array_stripped() {
        let input = words(&["بِسْمِ", "ٱللَّهِ", "ٱلرَّحْمَٰنِ", "ٱلرَّحِيمِ", "الٓمٓ", "ذَٰلِكَ"]);
        assert_eq!(strip_words(&input).len(), 2);
    }

    #[test]
    fn test_non_matching_word_array_unchanged() {
        let input = words(&["الٓمٓ", "ذَٰلِكَ", "ٱلْكِتَٰبُ", "لَا", "رَيْبَ"]);
        assert_eq!(clean_verse_words(2, 1, &input), input);

        let short = words(&["بِسْمِ", "اللَّهِ"]);
        assert_eq!(strip_words(&short), short);
    }

    #[test]
    fn test_word_array_untouched_outside_first_verse() {
        let input = words(&["بِسْمِ", "اللَّهِ", "الرَّحْمَٰنِ", "الرَّحِيمِ", "x"]);
        assert_eq!(clean_verse_words(1, 1, &input), input);
        assert_eq!(clean_verse_words(2, 5, &input), input);
    }

    #[test]
    fn test_cache_read_through_and_invalidate() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let cache = BismillahCache::new();

        assert!(!cache.is_loaded());
        let first = cache.get(&conn).unwrap();
        assert_eq!(*first, OpeningFormula::canonical());
        assert!(cache.is_loaded());

        let mut revised = OpeningFormula::canonical();
        revised.translation_en = "In the name of God".to_string();
        cache.replace(&conn, &revised).unwrap();
        assert!(!cache.is_loaded());
        assert_eq!(cache.get(&conn).unwrap().translation_en, "In the name of God");
    }
}
