//! SQLite schema and record persistence

use crate::error::{MushafError, Result};
use crate::models::{
    AudioSegment, BismillahWord, Chapter, OpeningFormula, Recitation, Tafsir, Verse, Word,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Well-known id of the opening formula row.
pub const OPENING_FORMULA_ID: i64 = 1;

/// Create all tables (idempotent) and enable foreign keys on this connection.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS chapters (
            number INTEGER PRIMARY KEY CHECK (number BETWEEN 1 AND 114),
            name_arabic TEXT NOT NULL,
            name_english TEXT NOT NULL,
            name_translation TEXT NOT NULL,
            name_translation_bn TEXT NOT NULL DEFAULT '',
            name_translation_ur TEXT NOT NULL DEFAULT '',
            revelation_type TEXT NOT NULL CHECK (revelation_type IN ('meccan', 'medinan')),
            total_verses INTEGER NOT NULL,
            audio_url TEXT
        );

        CREATE TABLE IF NOT EXISTS verses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chapter INTEGER NOT NULL REFERENCES chapters(number) ON DELETE CASCADE,
            number INTEGER NOT NULL,
            number_in_chapter INTEGER NOT NULL,
            text_uthmani TEXT NOT NULL,
            text_indopak TEXT NOT NULL DEFAULT '',
            text_simple TEXT NOT NULL DEFAULT '',
            transliteration TEXT NOT NULL DEFAULT '',
            translation_en TEXT NOT NULL DEFAULT '',
            translation_id TEXT NOT NULL DEFAULT '',
            translation_ur TEXT NOT NULL DEFAULT '',
            translation_bn TEXT NOT NULL DEFAULT '',
            audio_url TEXT,
            audio_segments TEXT NOT NULL DEFAULT '[]',
            segment_timestamps TEXT NOT NULL DEFAULT '[]',
            page_number INTEGER NOT NULL,
            juz_number INTEGER NOT NULL,
            hizb_number INTEGER NOT NULL,
            rub_number INTEGER,
            sajdah INTEGER NOT NULL DEFAULT 0,
            UNIQUE(chapter, number_in_chapter)
        );

        CREATE TABLE IF NOT EXISTS words (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            verse_id INTEGER NOT NULL REFERENCES verses(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            arabic TEXT NOT NULL,
            transliteration TEXT NOT NULL,
            pronunciation_audio TEXT,
            meaning_en TEXT NOT NULL,
            meaning_id TEXT NOT NULL DEFAULT '',
            meaning_ur TEXT NOT NULL DEFAULT '',
            root TEXT NOT NULL DEFAULT '',
            part_of_speech TEXT NOT NULL DEFAULT '',
            UNIQUE(verse_id, position)
        );

        CREATE TABLE IF NOT EXISTS tafsirs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            verse_id INTEGER NOT NULL REFERENCES verses(id) ON DELETE CASCADE,
            source TEXT NOT NULL,
            text TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT 'en',
            UNIQUE(verse_id, source, language)
        );

        CREATE TABLE IF NOT EXISTS recitations (
            reciter_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            name_arabic TEXT NOT NULL DEFAULT '',
            style TEXT NOT NULL,
            audio_url_template TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            verse_id INTEGER NOT NULL REFERENCES verses(id) ON DELETE CASCADE,
            note TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, verse_id)
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            verse_id INTEGER NOT NULL REFERENCES verses(id) ON DELETE CASCADE,
            bookmark_type TEXT NOT NULL DEFAULT 'default',
            created_at TEXT NOT NULL,
            UNIQUE(user_id, verse_id)
        );

        CREATE TABLE IF NOT EXISTS opening_formula (
            id INTEGER PRIMARY KEY,
            text_uthmani TEXT NOT NULL,
            text_simple TEXT NOT NULL,
            translation_en TEXT NOT NULL,
            audio_url TEXT NOT NULL,
            words TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_verses_page ON verses(page_number);
        CREATE INDEX IF NOT EXISTS idx_verses_juz ON verses(juz_number);
        CREATE INDEX IF NOT EXISTS idx_words_verse ON words(verse_id, position);
        CREATE INDEX IF NOT EXISTS idx_notes_user ON user_notes(user_id);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id);
        "#,
    )?;
    Ok(())
}

/// Open a store connection with foreign keys enforced.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a JSON column, reporting corrupt content as a conversion failure.
fn from_json<T: for<'de> Deserialize<'de>>(idx: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ============ Chapters ============

const CHAPTER_COLUMNS: &str = "number, name_arabic, name_english, name_translation, name_translation_bn, name_translation_ur, revelation_type, total_verses, audio_url";

fn row_to_chapter(row: &Row) -> rusqlite::Result<Chapter> {
    let revelation: String = row.get(6)?;
    Ok(Chapter {
        number: row.get(0)?,
        name_arabic: row.get(1)?,
        name_english: row.get(2)?,
        name_translation: row.get(3)?,
        name_translation_bn: row.get(4)?,
        name_translation_ur: row.get(5)?,
        revelation_type: revelation.parse().map_err(|e: MushafError| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        total_verses: row.get(7)?,
        audio_url: row.get(8)?,
    })
}

pub fn upsert_chapter(conn: &Connection, chapter: &Chapter) -> Result<()> {
    conn.execute(
        "INSERT INTO chapters (number, name_arabic, name_english, name_translation, name_translation_bn, name_translation_ur, revelation_type, total_verses, audio_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(number) DO UPDATE SET
            name_arabic = excluded.name_arabic,
            name_english = excluded.name_english,
            name_translation = excluded.name_translation,
            name_translation_bn = CASE WHEN excluded.name_translation_bn = '' THEN chapters.name_translation_bn ELSE excluded.name_translation_bn END,
            name_translation_ur = CASE WHEN excluded.name_translation_ur = '' THEN chapters.name_translation_ur ELSE excluded.name_translation_ur END,
            revelation_type = excluded.revelation_type,
            total_verses = excluded.total_verses,
            audio_url = excluded.audio_url",
        params![
            chapter.number,
            chapter.name_arabic,
            chapter.name_english,
            chapter.name_translation,
            chapter.name_translation_bn,
            chapter.name_translation_ur,
            chapter.revelation_type.as_str(),
            chapter.total_verses,
            chapter.audio_url,
        ],
    )?;
    Ok(())
}

pub fn get_chapter(conn: &Connection, number: u32) -> Result<Option<Chapter>> {
    let chapter = conn
        .query_row(
            &format!("SELECT {} FROM chapters WHERE number = ?1", CHAPTER_COLUMNS),
            [number],
            row_to_chapter,
        )
        .optional()?;
    Ok(chapter)
}

pub fn list_chapters(conn: &Connection) -> Result<Vec<Chapter>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM chapters ORDER BY number",
        CHAPTER_COLUMNS
    ))?;
    let chapters = stmt
        .query_map([], row_to_chapter)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(chapters)
}

pub fn set_chapter_translation_bn(conn: &Connection, number: u32, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE chapters SET name_translation_bn = ?2 WHERE number = ?1",
        params![number, name],
    )?;
    Ok(changed > 0)
}

// ============ Verses ============

const VERSE_COLUMNS: &str = "id, chapter, number, number_in_chapter, text_uthmani, text_indopak, text_simple, transliteration, translation_en, translation_id, translation_ur, translation_bn, audio_url, audio_segments, segment_timestamps, page_number, juz_number, hizb_number, rub_number, sajdah";

fn row_to_verse(row: &Row) -> rusqlite::Result<Verse> {
    let segments: String = row.get(13)?;
    let timestamps: String = row.get(14)?;
    Ok(Verse {
        id: row.get(0)?,
        chapter: row.get(1)?,
        number: row.get(2)?,
        number_in_chapter: row.get(3)?,
        text_uthmani: row.get(4)?,
        text_indopak: row.get(5)?,
        text_simple: row.get(6)?,
        transliteration: row.get(7)?,
        translation_en: row.get(8)?,
        translation_id: row.get(9)?,
        translation_ur: row.get(10)?,
        translation_bn: row.get(11)?,
        audio_url: row.get(12)?,
        audio_segments: from_json::<Vec<AudioSegment>>(13, &segments)?,
        segment_timestamps: from_json::<Vec<u64>>(14, &timestamps)?,
        page_number: row.get(15)?,
        juz_number: row.get(16)?,
        hizb_number: row.get(17)?,
        rub_number: row.get(18)?,
        sajdah: row.get(19)?,
    })
}

/// Insert or update by (chapter, number_in_chapter); returns the row id.
/// Empty translation fields never overwrite stored ones.
pub fn upsert_verse(conn: &Connection, verse: &Verse) -> Result<i64> {
    let id = conn.query_row(
        "INSERT INTO verses (chapter, number, number_in_chapter, text_uthmani, text_indopak, text_simple, transliteration,
                             translation_en, translation_id, translation_ur, translation_bn, audio_url, audio_segments,
                             segment_timestamps, page_number, juz_number, hizb_number, rub_number, sajdah)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
         ON CONFLICT(chapter, number_in_chapter) DO UPDATE SET
            number = excluded.number,
            text_uthmani = excluded.text_uthmani,
            text_indopak = excluded.text_indopak,
            text_simple = excluded.text_simple,
            transliteration = excluded.transliteration,
            translation_en = CASE WHEN excluded.translation_en = '' THEN verses.translation_en ELSE excluded.translation_en END,
            translation_id = CASE WHEN excluded.translation_id = '' THEN verses.translation_id ELSE excluded.translation_id END,
            translation_ur = CASE WHEN excluded.translation_ur = '' THEN verses.translation_ur ELSE excluded.translation_ur END,
            translation_bn = CASE WHEN excluded.translation_bn = '' THEN verses.translation_bn ELSE excluded.translation_bn END,
            audio_url = excluded.audio_url,
            audio_segments = excluded.audio_segments,
            segment_timestamps = excluded.segment_timestamps,
            page_number = excluded.page_number,
            juz_number = excluded.juz_number,
            hizb_number = excluded.hizb_number,
            rub_number = excluded.rub_number,
            sajdah = excluded.sajdah
         RETURNING id",
        params![
            verse.chapter,
            verse.number,
            verse.number_in_chapter,
            verse.text_uthmani,
            verse.text_indopak,
            verse.text_simple,
            verse.transliteration,
            verse.translation_en,
            verse.translation_id,
            verse.translation_ur,
            verse.translation_bn,
            verse.audio_url,
            to_json(&verse.audio_segments)?,
            to_json(&verse.segment_timestamps)?,
            verse.page_number,
            verse.juz_number,
            verse.hizb_number,
            verse.rub_number,
            verse.sajdah,
        ],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_verse(conn: &Connection, id: i64) -> Result<Option<Verse>> {
    let verse = conn
        .query_row(
            &format!("SELECT {} FROM verses WHERE id = ?1", VERSE_COLUMNS),
            [id],
            row_to_verse,
        )
        .optional()?;
    Ok(verse)
}

pub fn find_verse(conn: &Connection, chapter: u32, number_in_chapter: u32) -> Result<Option<Verse>> {
    let verse = conn
        .query_row(
            &format!(
                "SELECT {} FROM verses WHERE chapter = ?1 AND number_in_chapter = ?2",
                VERSE_COLUMNS
            ),
            params![chapter, number_in_chapter],
            row_to_verse,
        )
        .optional()?;
    Ok(verse)
}

pub fn verses_for_chapter(conn: &Connection, chapter: u32) -> Result<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM verses WHERE chapter = ?1 ORDER BY number_in_chapter",
        VERSE_COLUMNS
    ))?;
    let verses = stmt
        .query_map([chapter], row_to_verse)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(verses)
}

pub fn count_verses(conn: &Connection, chapter: u32) -> Result<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM verses WHERE chapter = ?1",
        [chapter],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Optional equality filters for verse listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseFilter {
    pub chapter: Option<u32>,
    pub page: Option<u32>,
    pub juz: Option<u32>,
}

const VERSE_FILTER: &str =
    "(?1 IS NULL OR chapter = ?1) AND (?2 IS NULL OR page_number = ?2) AND (?3 IS NULL OR juz_number = ?3)";

pub fn count_filtered_verses(conn: &Connection, filter: &VerseFilter) -> Result<usize> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM verses WHERE {}", VERSE_FILTER),
        params![filter.chapter, filter.page, filter.juz],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn query_verses(
    conn: &Connection,
    filter: &VerseFilter,
    limit: usize,
    offset: usize,
) -> Result<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM verses WHERE {} ORDER BY chapter, number_in_chapter LIMIT ?4 OFFSET ?5",
        VERSE_COLUMNS, VERSE_FILTER
    ))?;
    let verses = stmt
        .query_map(
            params![filter.chapter, filter.page, filter.juz, limit as i64, offset as i64],
            row_to_verse,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(verses)
}

pub fn set_verse_translation_bn(
    conn: &Connection,
    chapter: u32,
    number_in_chapter: u32,
    text: &str,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE verses SET translation_bn = ?3 WHERE chapter = ?1 AND number_in_chapter = ?2",
        params![chapter, number_in_chapter, text],
    )?;
    Ok(changed > 0)
}

pub fn delete_verse(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM verses WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============ Words ============

const WORD_COLUMNS: &str = "verse_id, position, arabic, transliteration, pronunciation_audio, meaning_en, meaning_id, meaning_ur, root, part_of_speech";

fn row_to_word(row: &Row) -> rusqlite::Result<Word> {
    Ok(Word {
        verse_id: row.get(0)?,
        position: row.get(1)?,
        arabic: row.get(2)?,
        transliteration: row.get(3)?,
        pronunciation_audio: row.get(4)?,
        meaning_en: row.get(5)?,
        meaning_id: row.get(6)?,
        meaning_ur: row.get(7)?,
        root: row.get(8)?,
        part_of_speech: row.get(9)?,
    })
}

/// Plain insert; a duplicate (verse, position) surfaces as a constraint error.
pub fn insert_word(conn: &Connection, word: &Word) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO words ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            WORD_COLUMNS
        ),
        params![
            word.verse_id,
            word.position,
            word.arabic,
            word.transliteration,
            word.pronunciation_audio,
            word.meaning_en,
            word.meaning_id,
            word.meaning_ur,
            word.root,
            word.part_of_speech,
        ],
    )?;
    Ok(())
}

pub fn upsert_word(conn: &Connection, word: &Word) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO words ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(verse_id, position) DO UPDATE SET
                arabic = excluded.arabic,
                transliteration = excluded.transliteration,
                pronunciation_audio = excluded.pronunciation_audio,
                meaning_en = excluded.meaning_en,
                meaning_id = excluded.meaning_id,
                meaning_ur = excluded.meaning_ur,
                root = excluded.root,
                part_of_speech = excluded.part_of_speech",
            WORD_COLUMNS
        ),
        params![
            word.verse_id,
            word.position,
            word.arabic,
            word.transliteration,
            word.pronunciation_audio,
            word.meaning_en,
            word.meaning_id,
            word.meaning_ur,
            word.root,
            word.part_of_speech,
        ],
    )?;
    Ok(())
}

pub fn words_for_verse(conn: &Connection, verse_id: i64) -> Result<Vec<Word>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM words WHERE verse_id = ?1 ORDER BY position",
        WORD_COLUMNS
    ))?;
    let words = stmt
        .query_map([verse_id], row_to_word)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

pub fn get_word(conn: &Connection, verse_id: i64, position: u32) -> Result<Option<Word>> {
    let word = conn
        .query_row(
            &format!(
                "SELECT {} FROM words WHERE verse_id = ?1 AND position = ?2",
                WORD_COLUMNS
            ),
            params![verse_id, position],
            row_to_word,
        )
        .optional()?;
    Ok(word)
}

pub fn delete_words_for_chapter(conn: &Connection, chapter: u32) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM words WHERE verse_id IN (SELECT id FROM verses WHERE chapter = ?1)",
        [chapter],
    )?;
    Ok(deleted)
}

pub fn delete_words_for_verse(conn: &Connection, verse_id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM words WHERE verse_id = ?1", [verse_id])?)
}

pub fn delete_all_words(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM words", [])?)
}

pub fn count_words_for_chapter(conn: &Connection, chapter: u32) -> Result<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM words w JOIN verses v ON v.id = w.verse_id WHERE v.chapter = ?1",
        [chapter],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============ Tafsir ============

pub fn upsert_tafsir(conn: &Connection, tafsir: &Tafsir) -> Result<()> {
    conn.execute(
        "INSERT INTO tafsirs (verse_id, source, text, language) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(verse_id, source, language) DO UPDATE SET text = excluded.text",
        params![
            tafsir.verse_id,
            tafsir.source.as_str(),
            tafsir.text,
            tafsir.language
        ],
    )?;
    Ok(())
}

pub fn tafsirs_for_verse(conn: &Connection, verse_id: i64) -> Result<Vec<Tafsir>> {
    let mut stmt = conn.prepare(
        "SELECT verse_id, source, text, language FROM tafsirs WHERE verse_id = ?1 ORDER BY source, language",
    )?;
    let rows = stmt
        .query_map([verse_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(verse_id, source, text, language)| -> Result<Tafsir> {
            Ok(Tafsir {
                verse_id,
                source: source.parse()?,
                text,
                language,
            })
        })
        .collect()
}

// ============ Recitations ============

fn row_to_recitation(row: &Row) -> rusqlite::Result<Recitation> {
    let style: String = row.get(3)?;
    Ok(Recitation {
        reciter_id: row.get(0)?,
        name: row.get(1)?,
        name_arabic: row.get(2)?,
        style: style.parse().map_err(|e: MushafError| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        audio_url_template: row.get(4)?,
    })
}

pub fn upsert_recitation(conn: &Connection, recitation: &Recitation) -> Result<()> {
    conn.execute(
        "INSERT INTO recitations (reciter_id, name, name_arabic, style, audio_url_template)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(reciter_id) DO UPDATE SET
            name = excluded.name,
            name_arabic = excluded.name_arabic,
            style = excluded.style,
            audio_url_template = excluded.audio_url_template",
        params![
            recitation.reciter_id,
            recitation.name,
            recitation.name_arabic,
            recitation.style.as_str(),
            recitation.audio_url_template,
        ],
    )?;
    Ok(())
}

pub fn get_recitation(conn: &Connection, reciter_id: u32) -> Result<Option<Recitation>> {
    let recitation = conn
        .query_row(
            "SELECT reciter_id, name, name_arabic, style, audio_url_template FROM recitations WHERE reciter_id = ?1",
            [reciter_id],
            row_to_recitation,
        )
        .optional()?;
    Ok(recitation)
}

pub fn list_recitations(conn: &Connection) -> Result<Vec<Recitation>> {
    let mut stmt = conn.prepare(
        "SELECT reciter_id, name, name_arabic, style, audio_url_template FROM recitations ORDER BY name",
    )?;
    let recitations = stmt
        .query_map([], row_to_recitation)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(recitations)
}

// ============ Bulk maintenance ============

/// Remove every ingested record. User data on verses goes with them.
pub fn clear_corpus(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM words;
        DELETE FROM tafsirs;
        DELETE FROM verses;
        DELETE FROM chapters;
        DELETE FROM recitations;
        "#,
    )?;
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub chapters: u64,
    pub verses: u64,
    pub words: u64,
    pub recitations: u64,
    pub tafsirs: u64,
}

pub fn corpus_stats(conn: &Connection) -> Result<CorpusStats> {
    let count = |table: &str| -> Result<u64> {
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(n as u64)
    };

    Ok(CorpusStats {
        chapters: count("chapters")?,
        verses: count("verses")?,
        words: count("words")?,
        recitations: count("recitations")?,
        tafsirs: count("tafsirs")?,
    })
}

// ============ Users ============

/// Register an identity handed over by the auth layer (no-op if present).
pub fn ensure_user(conn: &Connection, id: i64, username: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO users (id, username) VALUES (?1, ?2)",
        params![id, username],
    )?;
    Ok(())
}

pub fn delete_user(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

// ============ Opening formula ============

pub fn load_opening_formula(conn: &Connection) -> Result<Option<OpeningFormula>> {
    let formula = conn
        .query_row(
            "SELECT text_uthmani, text_simple, translation_en, audio_url, words FROM opening_formula WHERE id = ?1",
            [OPENING_FORMULA_ID],
            |row| {
                let words: String = row.get(4)?;
                Ok(OpeningFormula {
                    text_uthmani: row.get(0)?,
                    text_simple: row.get(1)?,
                    translation_en: row.get(2)?,
                    audio_url: row.get(3)?,
                    words: from_json::<Vec<BismillahWord>>(4, &words)?,
                })
            },
        )
        .optional()?;
    Ok(formula)
}

pub fn save_opening_formula(conn: &Connection, formula: &OpeningFormula) -> Result<()> {
    conn.execute(
        "INSERT INTO opening_formula (id, text_uthmani, text_simple, translation_en, audio_url, words)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            text_uthmani = excluded.text_uthmani,
            text_simple = excluded.text_simple,
            translation_en = excluded.translation_en,
            audio_url = excluded.audio_url,
            words = excluded.words",
        params![
            OPENING_FORMULA_ID,
            formula.text_uthmani,
            formula.text_simple,
            formula.translation_en,
            formula.audio_url,
            to_json(&formula.words)?,
        ],
    )?;
    Ok(())
}

pub fn load_or_create_opening_formula(conn: &Connection) -> Result<OpeningFormula> {
    if let Some(formula) = load_opening_formula(conn)? {
        return Ok(formula);
    }
    let formula = OpeningFormula::canonical();
    save_opening_formula(conn, &formula)?;
    Ok(formula)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{RecitationStyle, RevelationType, TafsirSource};
    use crate::reference;

    pub(crate) fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    pub(crate) fn sample_verse(chapter: u32, n: u32, text: &str) -> Verse {
        Verse {
            chapter,
            number: n,
            number_in_chapter: n,
            text_uthmani: text.to_string(),
            text_simple: text.to_string(),
            translation_en: format!("translation {}:{}", chapter, n),
            audio_url: Some(Verse::default_audio_url(chapter, n)),
            page_number: 1,
            juz_number: 1,
            hizb_number: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn test_chapter_upsert_and_read() {
        let conn = memory_db();
        let mut chapter = reference::placeholder_chapter(2);
        upsert_chapter(&conn, &chapter).unwrap();
        chapter.name_english = "Al-Baqarah".to_string();
        chapter.revelation_type = RevelationType::Medinan;
        upsert_chapter(&conn, &chapter).unwrap();

        let stored = get_chapter(&conn, 2).unwrap().unwrap();
        assert_eq!(stored, chapter);
        assert_eq!(list_chapters(&conn).unwrap().len(), 1);
        assert!(get_chapter(&conn, 3).unwrap().is_none());
    }

    #[test]
    fn test_chapter_number_out_of_range_rejected() {
        let conn = memory_db();
        let chapter = reference::placeholder_chapter(115);
        let err = upsert_chapter(&conn, &chapter).unwrap_err();
        assert!(matches!(err, MushafError::Database(_)));
    }

    #[test]
    fn test_verse_upsert_keeps_id_and_translations() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();

        let mut verse = sample_verse(1, 1, "بِسْمِ");
        verse.audio_segments = vec![AudioSegment { word_index: 0, start_ms: 0, end_ms: 640 }];
        let id = upsert_verse(&conn, &verse).unwrap();

        verse.translation_en = String::new();
        verse.text_uthmani = "updated".to_string();
        let again = upsert_verse(&conn, &verse).unwrap();
        assert_eq!(id, again);

        let stored = get_verse(&conn, id).unwrap().unwrap();
        assert_eq!(stored.text_uthmani, "updated");
        assert_eq!(stored.translation_en, "translation 1:1");
        assert_eq!(stored.audio_segments.len(), 1);
        assert_eq!(count_verses(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn test_verse_requires_chapter() {
        let conn = memory_db();
        assert!(upsert_verse(&conn, &sample_verse(5, 1, "x")).is_err());
    }

    #[test]
    fn test_filtered_verse_queries() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();
        upsert_chapter(&conn, &reference::placeholder_chapter(2)).unwrap();
        for n in 1..=7 {
            upsert_verse(&conn, &sample_verse(1, n, "a")).unwrap();
        }
        for n in 1..=5 {
            let mut v = sample_verse(2, n, "b");
            v.page_number = 2;
            upsert_verse(&conn, &v).unwrap();
        }

        let all = VerseFilter::default();
        assert_eq!(count_filtered_verses(&conn, &all).unwrap(), 12);

        let page2 = VerseFilter { page: Some(2), ..Default::default() };
        assert_eq!(count_filtered_verses(&conn, &page2).unwrap(), 5);

        let chapter1 = VerseFilter { chapter: Some(1), ..Default::default() };
        let rows = query_verses(&conn, &chapter1, 3, 3).unwrap();
        let numbers: Vec<u32> = rows.iter().map(|v| v.number_in_chapter).collect();
        assert_eq!(numbers, vec![4, 5, 6]);
    }

    #[test]
    fn test_word_insert_duplicate_is_constraint_violation() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();
        let verse_id = upsert_verse(&conn, &sample_verse(1, 1, "a")).unwrap();

        let word = Word { verse_id, position: 0, arabic: "بسم".into(), ..Default::default() };
        insert_word(&conn, &word).unwrap();
        let err = insert_word(&conn, &word).unwrap_err();
        assert!(MushafError::is_constraint_violation(&err));

        let mut revised = word.clone();
        revised.meaning_en = "In the name of".into();
        upsert_word(&conn, &revised).unwrap();
        let words = words_for_verse(&conn, verse_id).unwrap();
        assert_eq!(words, vec![revised]);
        assert_eq!(count_words_for_chapter(&conn, 1).unwrap(), 1);
        assert_eq!(delete_words_for_chapter(&conn, 1).unwrap(), 1);
    }

    #[test]
    fn test_tafsir_unique_per_source_and_language() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();
        let verse_id = upsert_verse(&conn, &sample_verse(1, 1, "a")).unwrap();

        let mut tafsir = Tafsir {
            verse_id,
            source: TafsirSource::Jalalayn,
            text: "first".into(),
            language: "en".into(),
        };
        upsert_tafsir(&conn, &tafsir).unwrap();
        tafsir.text = "second".into();
        upsert_tafsir(&conn, &tafsir).unwrap();
        tafsir.language = "ar".into();
        upsert_tafsir(&conn, &tafsir).unwrap();

        let stored = tafsirs_for_verse(&conn, verse_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().any(|t| t.language == "en" && t.text == "second"));
    }

    #[test]
    fn test_recitations() {
        let conn = memory_db();
        for r in reference::default_recitations() {
            upsert_recitation(&conn, &r).unwrap();
        }
        let r = get_recitation(&conn, 3).unwrap().unwrap();
        assert_eq!(r.style, RecitationStyle::Hafs);
        assert_eq!(list_recitations(&conn).unwrap().len(), 4);
        assert!(get_recitation(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn test_clear_corpus_and_stats() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();
        upsert_verse(&conn, &sample_verse(1, 1, "a")).unwrap();
        assert_eq!(corpus_stats(&conn).unwrap().verses, 1);

        clear_corpus(&conn).unwrap();
        assert_eq!(corpus_stats(&conn).unwrap(), CorpusStats::default());
    }

    #[test]
    fn test_opening_formula_get_or_create() {
        let conn = memory_db();
        assert!(load_opening_formula(&conn).unwrap().is_none());
        let created = load_or_create_opening_formula(&conn).unwrap();
        assert_eq!(created, OpeningFormula::canonical());
        assert_eq!(load_opening_formula(&conn).unwrap(), Some(created));
    }

    #[test]
    fn test_corrupt_json_column_is_an_error() {
        let conn = memory_db();
        upsert_chapter(&conn, &reference::placeholder_chapter(2)).unwrap();
        let id = upsert_verse(&conn, &sample_verse(2, 1, "x")).unwrap();
        conn.execute("UPDATE verses SET audio_segments = '{broken' WHERE id = ?1", [id])
            .unwrap();
        assert!(matches!(get_verse(&conn, id), Err(MushafError::Database(_))));

        load_or_create_opening_formula(&conn).unwrap();
        conn.execute("UPDATE opening_formula SET words = 'null'", []).unwrap();
        assert!(load_opening_formula(&conn).is_err());
    }
}
