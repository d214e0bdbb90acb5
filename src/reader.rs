//! Read-side views over the store.
//!
//! Word data is stored once, as rows; the parallel `words_*` arrays that
//! older clients expect are derived here at serialization time, together
//! with the opening-formula cleaning of verse 1.

use crate::bismillah::{self, OPENING_FORMULA};
use crate::db::{self, CorpusStats, VerseFilter};
use crate::error::{MushafError, Result};
use crate::lexicon::MEANING_NOT_AVAILABLE;
use crate::models::{Chapter, OpeningFormula, Paged, Recitation, Tafsir, Verse, Word};
use crate::roots::ROOT_NOT_AVAILABLE;
use crate::text;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_RECITER_ID: u32 = 1;

/// A verse as handed to readers.
#[derive(Debug, Clone, Serialize)]
pub struct VerseView {
    #[serde(flatten)]
    pub verse: Verse,
    pub chapter_name: String,
    pub text_uthmani_cleaned: String,
    pub words_arabic: Vec<String>,
    pub words_arabic_cleaned: Vec<String>,
    pub words_transliteration: Vec<String>,
    pub words_translation: Vec<String>,
    pub words: Vec<Word>,
}

impl VerseView {
    pub fn build(verse: Verse, chapter_name: String, words: Vec<Word>) -> Self {
        let words_arabic: Vec<String> = words.iter().map(|w| w.arabic.clone()).collect();
        let words_transliteration = words.iter().map(|w| w.transliteration.clone()).collect();
        let words_translation = words.iter().map(|w| w.meaning_en.clone()).collect();

        let text_uthmani_cleaned =
            bismillah::clean_verse_text(verse.chapter, verse.number_in_chapter, &verse.text_uthmani);
        let words_arabic_cleaned =
            bismillah::clean_verse_words(verse.chapter, verse.number_in_chapter, &words_arabic);

        Self {
            verse,
            chapter_name,
            text_uthmani_cleaned,
            words_arabic,
            words_arabic_cleaned,
            words_transliteration,
            words_translation,
            words,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterWithVerses {
    pub chapter: Chapter,
    pub verses: Vec<VerseView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDetail {
    pub arabic: String,
    pub transliteration: String,
    pub meaning: String,
    pub pronunciation_audio: String,
    pub root: String,
}

impl From<Word> for WordDetail {
    fn from(word: Word) -> Self {
        Self {
            arabic: word.arabic,
            transliteration: word.transliteration,
            meaning: word.meaning_en,
            pronunciation_audio: word.pronunciation_audio.unwrap_or_default(),
            root: word.root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    pub audio_url: String,
    /// `chapter:verse`
    pub reference: String,
    pub chapter_name: String,
    pub chapter_name_translation_bn: String,
    pub number_in_chapter: u32,
    pub arabic_text: String,
}

fn chapter_name(conn: &Connection, number: u32) -> Result<String> {
    Ok(db::get_chapter(conn, number)?
        .map(|c| c.name_english)
        .unwrap_or_default())
}

fn require_verse(conn: &Connection, verse_id: i64) -> Result<Verse> {
    db::get_verse(conn, verse_id)?
        .ok_or_else(|| MushafError::NotFound(format!("verse {}", verse_id)))
}

fn view(conn: &Connection, verse: Verse, chapter_name: String) -> Result<VerseView> {
    let words = db::words_for_verse(conn, verse.id)?;
    Ok(VerseView::build(verse, chapter_name, words))
}

pub fn list_chapters(conn: &Connection) -> Result<Vec<Chapter>> {
    db::list_chapters(conn)
}

pub fn chapter_with_verses(conn: &Connection, number: u32) -> Result<ChapterWithVerses> {
    let chapter = db::get_chapter(conn, number)?
        .ok_or_else(|| MushafError::NotFound(format!("chapter {}", number)))?;

    let verses = db::verses_for_chapter(conn, number)?
        .into_iter()
        .map(|v| view(conn, v, chapter.name_english.clone()))
        .collect::<Result<Vec<_>>>()?;

    Ok(ChapterWithVerses { chapter, verses })
}

/// One page of verses matching `filter`, ordered by chapter and verse.
/// Pages count from 1; `page_size` defaults to 20 and is capped at 100.
pub fn list_verses(
    conn: &Connection,
    filter: &VerseFilter,
    page: usize,
    page_size: Option<usize>,
) -> Result<Paged<VerseView>> {
    if page == 0 {
        return Err(MushafError::InvalidInput("page numbers start at 1".to_string()));
    }
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let count = db::count_filtered_verses(conn, filter)?;
    let offset = match (page - 1).checked_mul(page_size) {
        Some(offset) if page == 1 || offset < count => offset,
        _ => return Err(MushafError::NotFound(format!("page {}", page))),
    };

    let mut names: HashMap<u32, String> = HashMap::new();
    let mut results = Vec::new();
    for verse in db::query_verses(conn, filter, page_size, offset)? {
        let name = match names.get(&verse.chapter) {
            Some(name) => name.clone(),
            None => {
                let name = chapter_name(conn, verse.chapter)?;
                names.insert(verse.chapter, name.clone());
                name
            }
        };
        results.push(view(conn, verse, name)?);
    }

    Ok(Paged {
        count,
        page,
        page_size,
        has_next: offset + results.len() < count,
        results,
    })
}

pub fn verse_view(conn: &Connection, verse_id: i64) -> Result<VerseView> {
    let verse = require_verse(conn, verse_id)?;
    let name = chapter_name(conn, verse.chapter)?;
    view(conn, verse, name)
}

pub fn words_for_verse(conn: &Connection, verse_id: i64) -> Result<Vec<Word>> {
    require_verse(conn, verse_id)?;
    db::words_for_verse(conn, verse_id)
}

/// Stored word at `position`, or a placeholder cut from the verse text when
/// no word row exists.
pub fn word_detail(conn: &Connection, verse_id: i64, position: u32) -> Result<WordDetail> {
    if let Some(word) = db::get_word(conn, verse_id, position)? {
        return Ok(word.into());
    }

    let not_found = || MushafError::NotFound(format!("word {} of verse {}", position, verse_id));
    let verse = db::get_verse(conn, verse_id)?.ok_or_else(not_found)?;
    let arabic = text::split_words(&verse.text_uthmani)
        .into_iter()
        .nth(position as usize)
        .ok_or_else(not_found)?;

    Ok(WordDetail {
        arabic,
        transliteration: format!("word_{}", position + 1),
        meaning: MEANING_NOT_AVAILABLE.to_string(),
        pronunciation_audio: String::new(),
        root: ROOT_NOT_AVAILABLE.to_string(),
    })
}

pub fn tafsirs_for_verse(conn: &Connection, verse_id: i64) -> Result<Vec<Tafsir>> {
    require_verse(conn, verse_id)?;
    db::tafsirs_for_verse(conn, verse_id)
}

pub fn upsert_tafsir(conn: &Connection, tafsir: &Tafsir) -> Result<()> {
    require_verse(conn, tafsir.verse_id)?;
    if tafsir.text.trim().is_empty() {
        return Err(MushafError::InvalidInput("empty tafsir text".to_string()));
    }
    db::upsert_tafsir(conn, tafsir)
}

pub fn list_recitations(conn: &Connection) -> Result<Vec<Recitation>> {
    db::list_recitations(conn)
}

/// Audio for a verse in the given reciter's voice. Unknown reciters fall
/// back to the verse's own URL, then to the default recitation.
pub fn resolve_audio(conn: &Connection, verse_id: i64, reciter_id: Option<u32>) -> Result<AudioInfo> {
    let verse = require_verse(conn, verse_id)?;
    let chapter = db::get_chapter(conn, verse.chapter)?;
    let reciter_id = reciter_id.unwrap_or(DEFAULT_RECITER_ID);

    let audio_url = match db::get_recitation(conn, reciter_id)? {
        Some(recitation) => recitation.audio_url(verse.chapter, verse.number_in_chapter),
        None => {
            tracing::debug!("Unknown reciter {}, using stored audio", reciter_id);
            verse
                .audio_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| Verse::default_audio_url(verse.chapter, verse.number_in_chapter))
        }
    };

    Ok(AudioInfo {
        audio_url,
        reference: verse.reference(),
        chapter_name: chapter.as_ref().map(|c| c.name_english.clone()).unwrap_or_default(),
        chapter_name_translation_bn: chapter
            .map(|c| c.name_translation_bn)
            .unwrap_or_default(),
        number_in_chapter: verse.number_in_chapter,
        arabic_text: verse.text_uthmani,
    })
}

pub fn opening_formula(conn: &Connection) -> Result<Arc<OpeningFormula>> {
    OPENING_FORMULA.get(conn)
}

pub fn stats(conn: &Connection) -> Result<CorpusStats> {
    db::corpus_stats(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{memory_db, sample_verse};
    use crate::models::TafsirSource;
    use crate::reference;

    const AL_BAQARAH_1: &str = "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ الٓمٓ";

    fn seeded() -> (Connection, i64, i64) {
        let conn = memory_db();
        for chapter in reference::known_chapters().iter().take(2) {
            db::upsert_chapter(&conn, chapter).unwrap();
        }
        for n in 1..=7 {
            db::upsert_verse(&conn, &sample_verse(1, n, reference::FATIHAH[n as usize - 1].0))
                .unwrap();
        }
        let baqarah_1 = db::upsert_verse(&conn, &sample_verse(2, 1, AL_BAQARAH_1)).unwrap();
        let baqarah_2 = db::upsert_verse(&conn, &sample_verse(2, 2, "ذَٰلِكَ ٱلْكِتَٰبُ")).unwrap();

        for (i, arabic) in ["بِسْمِ", "ٱللَّهِ", "ٱلرَّحْمَٰنِ", "ٱلرَّحِيمِ", "الٓمٓ"]
            .iter()
            .enumerate()
        {
            let word = Word {
                verse_id: baqarah_1,
                position: i as u32,
                arabic: arabic.to_string(),
                transliteration: format!("t{}", i),
                meaning_en: format!("m{}", i),
                ..Default::default()
            };
            db::upsert_word(&conn, &word).unwrap();
        }
        for r in reference::default_recitations() {
            db::upsert_recitation(&conn, &r).unwrap();
        }
        (conn, baqarah_1, baqarah_2)
    }

    #[test]
    fn test_verse_view_derives_and_cleans() {
        let (conn, id, _) = seeded();
        let view = verse_view(&conn, id).unwrap();

        assert_eq!(view.chapter_name, "Al-Baqarah");
        assert_eq!(view.text_uthmani_cleaned, "الٓمٓ");
        assert_eq!(view.verse.text_uthmani, AL_BAQARAH_1);
        assert_eq!(view.words_arabic.len(), 5);
        assert_eq!(view.words_arabic_cleaned, vec!["الٓمٓ".to_string()]);
        assert_eq!(view.words_translation[4], "m4");
        assert_eq!(view.words_transliteration[0], "t0");
    }

    #[test]
    fn test_verse_view_serializes_flat() {
        let (conn, id, _) = seeded();
        let json = serde_json::to_value(verse_view(&conn, id).unwrap()).unwrap();
        assert_eq!(json["number_in_chapter"], 1);
        assert_eq!(json["text_uthmani_cleaned"], "الٓمٓ");
        assert!(json["words"].is_array());
    }

    #[test]
    fn test_first_chapter_not_cleaned() {
        let (conn, _, _) = seeded();
        let detail = chapter_with_verses(&conn, 1).unwrap();
        assert_eq!(detail.verses.len(), 7);
        assert_eq!(detail.verses[0].text_uthmani_cleaned, reference::FATIHAH[0].0);
        assert!(matches!(
            chapter_with_verses(&conn, 3),
            Err(MushafError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_verses_paging() {
        let (conn, _, _) = seeded();
        let all = VerseFilter::default();

        let first = list_verses(&conn, &all, 1, Some(3)).unwrap();
        assert_eq!(first.count, 9);
        assert_eq!(first.results.len(), 3);
        assert!(first.has_next);

        let last = list_verses(&conn, &all, 3, Some(3)).unwrap();
        assert_eq!(last.results.len(), 3);
        assert!(!last.has_next);
        assert_eq!(last.results[2].chapter_name, "Al-Baqarah");

        assert!(matches!(list_verses(&conn, &all, 4, Some(3)), Err(MushafError::NotFound(_))));
        assert!(matches!(list_verses(&conn, &all, 0, None), Err(MushafError::InvalidInput(_))));

        let capped = list_verses(&conn, &all, 1, Some(500)).unwrap();
        assert_eq!(capped.page_size, MAX_PAGE_SIZE);
        assert_eq!(list_verses(&conn, &all, 1, None).unwrap().page_size, DEFAULT_PAGE_SIZE);

        let by_chapter = VerseFilter { chapter: Some(2), ..Default::default() };
        assert_eq!(list_verses(&conn, &by_chapter, 1, None).unwrap().count, 2);
    }

    #[test]
    fn test_empty_listing_is_first_page() {
        let conn = memory_db();
        let page = list_verses(&conn, &VerseFilter::default(), 1, None).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_huge_page_number_is_not_found() {
        let (conn, _, _) = seeded();
        let all = VerseFilter::default();
        assert!(matches!(
            list_verses(&conn, &all, usize::MAX, Some(20)),
            Err(MushafError::NotFound(_))
        ));
        assert!(matches!(
            list_verses(&conn, &all, usize::MAX / 2, Some(MAX_PAGE_SIZE)),
            Err(MushafError::NotFound(_))
        ));
    }

    #[test]
    fn test_word_detail_stored_and_fallback() {
        let (conn, with_words, without_words) = seeded();

        let stored = word_detail(&conn, with_words, 4).unwrap();
        assert_eq!(stored.meaning, "m4");

        let fallback = word_detail(&conn, without_words, 1).unwrap();
        assert_eq!(fallback.arabic, "ٱلْكِتَٰبُ");
        assert_eq!(fallback.transliteration, "word_2");
        assert_eq!(fallback.meaning, "Meaning not available");
        assert_eq!(fallback.root, "N/A");

        assert!(matches!(
            word_detail(&conn, without_words, 2),
            Err(MushafError::NotFound(_))
        ));
        assert!(matches!(word_detail(&conn, 9999, 0), Err(MushafError::NotFound(_))));
    }

    #[test]
    fn test_resolve_audio() {
        let (conn, _, id) = seeded();

        let known = resolve_audio(&conn, id, Some(1)).unwrap();
        assert_eq!(known.audio_url, "https://everyayah.com/data/Alafasy_128kbps/002002.mp3");
        assert_eq!(known.reference, "2:2");

        let verse_255 = db::upsert_verse(&conn, &sample_verse(2, 255, "ٱللَّهُ")).unwrap();
        let maher = resolve_audio(&conn, verse_255, Some(3)).unwrap();
        assert!(maher.audio_url.contains("002"));
        assert!(maher.audio_url.ends_with("002255.mp3"));

        let unknown = resolve_audio(&conn, verse_255, Some(42)).unwrap();
        assert_eq!(unknown.audio_url, Verse::default_audio_url(2, 255));
    }

    #[test]
    fn test_resolve_audio_without_stored_url() {
        let (conn, _, _) = seeded();
        let mut verse = sample_verse(2, 3, "x");
        verse.audio_url = None;
        let id = db::upsert_verse(&conn, &verse).unwrap();
        let info = resolve_audio(&conn, id, Some(77)).unwrap();
        assert_eq!(info.audio_url, "https://everyayah.com/data/Alafasy_128kbps/002003.mp3");
    }

    #[test]
    fn test_tafsir_round_trip() {
        let (conn, id, _) = seeded();
        let tafsir = Tafsir {
            verse_id: id,
            source: TafsirSource::IbnKathir,
            text: "Disjointed letters".to_string(),
            language: "en".to_string(),
        };
        upsert_tafsir(&conn, &tafsir).unwrap();
        assert_eq!(tafsirs_for_verse(&conn, id).unwrap(), vec![tafsir.clone()]);

        let blank = Tafsir { text: "  ".to_string(), ..tafsir };
        assert!(matches!(upsert_tafsir(&conn, &blank), Err(MushafError::InvalidInput(_))));
        assert!(matches!(tafsirs_for_verse(&conn, 9999), Err(MushafError::NotFound(_))));
    }

    #[test]
    fn test_opening_formula_and_stats() {
        let (conn, _, _) = seeded();
        assert_eq!(opening_formula(&conn).unwrap().words.len(), 4);

        let stats = stats(&conn).unwrap();
        assert_eq!(stats.chapters, 2);
        assert_eq!(stats.verses, 9);
        assert_eq!(stats.words, 5);
        assert_eq!(stats.recitations, 4);
    }
}
