//! Ingestion of chapters, verses, recitations and word annotations.
//!
//! Every category degrades through a fixed ladder of tiers: the remote
//! source, then built-in reference data, then synthesized placeholders.
//! Chapters are processed one at a time with a pause between them, and a
//! failure in one chapter is logged without stopping the rest.

use crate::bismillah::OPENING_FORMULA;
use crate::config::Config;
use crate::db;
use crate::enrich;
use crate::error::{MushafError, Result};
use crate::models::{Chapter, Verse, Word};
use crate::reference::{self, CHAPTER_COUNT, FATIHAH};
use crate::sources::{self, ApiEndpoints, JsonSource, ProviderVerse};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of one category for one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterState {
    Pending,
    /// Data came from a remote source.
    Fetched,
    /// Built from local reference data or heuristics.
    FallbackBasic,
    /// Sample placeholder records.
    FallbackSample,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub metadata: BTreeMap<u32, ChapterState>,
    pub verses: BTreeMap<u32, ChapterState>,
    pub words: BTreeMap<u32, ChapterState>,
    pub translations_bn: BTreeMap<u32, ChapterState>,
    pub recitations: usize,
    pub words_stored: usize,
    pub words_skipped: usize,
    /// Chapters whose stored verse count differs from the reference table.
    pub verse_count_mismatches: Vec<u32>,
}

impl IngestReport {
    pub fn tally(states: &BTreeMap<u32, ChapterState>, state: ChapterState) -> usize {
        states.values().filter(|s| **s == state).count()
    }

    fn mark_pending(states: &mut BTreeMap<u32, ChapterState>, chapters: &[u32]) {
        for chapter in chapters {
            states.insert(*chapter, ChapterState::Pending);
        }
    }

    pub fn log_summary(&self) {
        let line = |name: &str, states: &BTreeMap<u32, ChapterState>| {
            if !states.is_empty() {
                tracing::info!(
                    "{}: {} fetched, {} basic fallback, {} sample fallback, {} pending",
                    name,
                    Self::tally(states, ChapterState::Fetched),
                    Self::tally(states, ChapterState::FallbackBasic),
                    Self::tally(states, ChapterState::FallbackSample),
                    Self::tally(states, ChapterState::Pending),
                );
            }
        };
        line("Chapter metadata", &self.metadata);
        line("Verses", &self.verses);
        line("Words", &self.words);
        line("Bengali translations", &self.translations_bn);

        if self.recitations > 0 {
            tracing::info!("Recitations: {}", self.recitations);
        }
        if self.words_stored > 0 || self.words_skipped > 0 {
            tracing::info!(
                "Words stored: {}, skipped: {}",
                self.words_stored,
                self.words_skipped
            );
        }
        if !self.verse_count_mismatches.is_empty() {
            tracing::warn!(
                "Verse counts differ from reference for chapters {:?}",
                self.verse_count_mismatches
            );
        }
    }
}

pub struct Ingester<'a, S> {
    source: &'a S,
    api: ApiEndpoints,
    delay: Duration,
    chapters: Vec<u32>,
}

impl<'a, S: JsonSource> Ingester<'a, S> {
    pub fn new(source: &'a S, config: &Config) -> Self {
        Self {
            source,
            api: config.api.clone(),
            delay: config.request_delay(),
            chapters: (1..=CHAPTER_COUNT).collect(),
        }
    }

    /// Restrict per-chapter work to the given chapters. Out-of-range
    /// numbers are dropped.
    pub fn with_chapters(mut self, chapters: impl IntoIterator<Item = u32>) -> Self {
        self.chapters = chapters
            .into_iter()
            .filter(|c| reference::expected_verse_count(*c).is_some())
            .collect();
        self
    }

    async fn pause(&self, index: usize) {
        if index > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Clear the corpus and repopulate it inside one transaction.
    pub async fn run_full(&self, conn: &mut Connection) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let tx = conn.transaction()?;

        tracing::info!("Clearing existing corpus");
        db::clear_corpus(&tx)?;

        self.load_chapters(&tx, &mut report).await?;
        self.load_verses(&tx, &mut report).await;
        self.load_recitations(&tx, &mut report)?;
        self.load_words(&tx, &mut report).await;
        db::load_or_create_opening_formula(&tx)?;

        tx.commit()?;
        OPENING_FORMULA.invalidate();

        report.log_summary();
        Ok(report)
    }

    /// Fetch word annotations for the selected chapters.
    pub async fn words(&self, conn: &mut Connection) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let tx = conn.transaction()?;
        self.load_words(&tx, &mut report).await;
        tx.commit()?;
        report.log_summary();
        Ok(report)
    }

    /// Refresh Bengali chapter names and verse translations.
    pub async fn translations_bn(&self, conn: &mut Connection) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let tx = conn.transaction()?;
        self.load_translations_bn(&tx, &mut report).await;
        tx.commit()?;
        report.log_summary();
        Ok(report)
    }

    // ============ Chapters ============

    async fn fetch_chapters(&self) -> Result<Vec<Chapter>> {
        let body = self.source.get_json(&self.api.chapters_url()).await?;
        let chapters = sources::parse_chapters(body)?;
        if chapters.is_empty() {
            return Err(MushafError::Source("empty chapter list".to_string()));
        }
        Ok(chapters)
    }

    /// Ensures all 114 chapters exist afterwards.
    pub async fn load_chapters(&self, conn: &Connection, report: &mut IngestReport) -> Result<()> {
        let all: Vec<u32> = (1..=CHAPTER_COUNT).collect();
        IngestReport::mark_pending(&mut report.metadata, &all);

        let (chapters, state) = match self.fetch_chapters().await {
            Ok(chapters) => (chapters, ChapterState::Fetched),
            Err(e) => {
                tracing::warn!("Chapter list unavailable ({}), using built-in metadata", e);
                (reference::known_chapters(), ChapterState::FallbackBasic)
            }
        };

        for chapter in &chapters {
            if reference::expected_verse_count(chapter.number).is_none() {
                tracing::warn!("Skipping chapter with invalid number {}", chapter.number);
                continue;
            }
            db::upsert_chapter(conn, chapter)?;
            report.metadata.insert(chapter.number, state);
        }

        for number in all {
            if report.metadata.get(&number) == Some(&ChapterState::Pending) {
                db::upsert_chapter(conn, &reference::placeholder_chapter(number))?;
                report.metadata.insert(number, ChapterState::FallbackSample);
            }
        }

        tracing::info!("Stored metadata for {} chapters", report.metadata.len());
        Ok(())
    }

    // ============ Verses ============

    async fn fetch_verses(&self, chapter: u32) -> Result<Vec<Verse>> {
        let arabic = self
            .source
            .get_json(&self.api.arabic_text_url(chapter))
            .await?;
        let english = self
            .source
            .get_json(&self.api.english_text_url(chapter))
            .await?;
        sources::parse_verses(chapter, arabic, english)
    }

    fn store_verses(conn: &Connection, verses: &[Verse]) -> Result<()> {
        for verse in verses {
            db::upsert_verse(conn, verse)?;
        }
        Ok(())
    }

    pub async fn load_verses(&self, conn: &Connection, report: &mut IngestReport) {
        IngestReport::mark_pending(&mut report.verses, &self.chapters);

        for (i, &chapter) in self.chapters.iter().enumerate() {
            self.pause(i).await;

            let fetched = match self.fetch_verses(chapter).await {
                Ok(verses) => match Self::store_verses(conn, &verses) {
                    Ok(()) => {
                        tracing::debug!("Stored {} verses for chapter {}", verses.len(), chapter);
                        true
                    }
                    Err(e) => {
                        tracing::error!("Failed to store verses for chapter {}: {}", chapter, e);
                        false
                    }
                },
                Err(e) => {
                    tracing::warn!("Verses for chapter {} unavailable: {}", chapter, e);
                    false
                }
            };

            let state = if fetched {
                ChapterState::Fetched
            } else {
                match Self::store_verses(conn, &sample_verses(chapter)) {
                    Ok(()) => ChapterState::FallbackSample,
                    Err(e) => {
                        tracing::error!("Failed to store sample verses for chapter {}: {}", chapter, e);
                        continue;
                    }
                }
            };
            report.verses.insert(chapter, state);

            if state == ChapterState::Fetched {
                if let Ok(stored) = db::count_verses(conn, chapter) {
                    if Some(stored) != reference::expected_verse_count(chapter) {
                        report.verse_count_mismatches.push(chapter);
                    }
                }
            }
        }
    }

    // ============ Recitations ============

    pub fn load_recitations(&self, conn: &Connection, report: &mut IngestReport) -> Result<()> {
        for recitation in reference::default_recitations() {
            db::upsert_recitation(conn, &recitation)?;
            report.recitations += 1;
        }
        Ok(())
    }

    // ============ Words ============

    async fn fetch_primary_words(&self, chapter: u32) -> Result<Vec<ProviderVerse>> {
        let body = self.source.get_json(&self.api.wbw_url(chapter)).await?;
        sources::parse_wbw(body)
    }

    async fn fetch_secondary_words(&self, chapter: u32) -> Result<Vec<ProviderVerse>> {
        let body = self
            .source
            .get_json(&self.api.word_by_word_url(chapter))
            .await?;
        sources::parse_word_by_word(body)
    }

    /// Replace the words of every verse the provider covers. Verses absent
    /// from the store are skipped. Zero stored words is an error so the next
    /// tier runs.
    fn store_provider_words(
        conn: &Connection,
        chapter: u32,
        verses: &[ProviderVerse],
    ) -> Result<usize> {
        let mut stored = 0;
        for provided in verses {
            let Some(verse) = db::find_verse(conn, chapter, provided.number_in_chapter)? else {
                tracing::debug!(
                    "No stored verse {}:{}, skipping provider words",
                    chapter,
                    provided.number_in_chapter
                );
                continue;
            };
            if provided.words.is_empty() {
                continue;
            }

            db::delete_words_for_verse(conn, verse.id)?;
            for (position, w) in provided.words.iter().enumerate() {
                let word = Word {
                    verse_id: verse.id,
                    position: position as u32,
                    arabic: w.arabic.clone(),
                    transliteration: w.transliteration.clone(),
                    pronunciation_audio: w.audio.clone(),
                    meaning_en: w.meaning.clone(),
                    meaning_id: String::new(),
                    meaning_ur: String::new(),
                    root: w.root.clone(),
                    part_of_speech: w.part_of_speech.clone(),
                };
                db::upsert_word(conn, &word)?;
                stored += 1;
            }
        }

        if stored == 0 {
            return Err(MushafError::Source(format!(
                "no words matched stored verses of chapter {}",
                chapter
            )));
        }
        Ok(stored)
    }

    fn store_heuristic_words(conn: &Connection, chapter: u32) -> Result<usize> {
        let stale = db::delete_words_for_chapter(conn, chapter)?;
        if stale > 0 {
            tracing::debug!("Replacing {} words of chapter {}", stale, chapter);
        }
        let mut stored = 0;
        for verse in db::verses_for_chapter(conn, chapter)? {
            for word in enrich::annotate_verse(&verse) {
                db::upsert_word(conn, &word)?;
                stored += 1;
            }
        }
        Ok(stored)
    }

    async fn words_for_chapter(
        &self,
        conn: &Connection,
        chapter: u32,
    ) -> Result<(ChapterState, usize)> {
        match self.fetch_primary_words(chapter).await {
            Ok(verses) => match Self::store_provider_words(conn, chapter, &verses) {
                Ok(n) => return Ok((ChapterState::Fetched, n)),
                Err(e) => tracing::warn!("Primary words for chapter {} unusable: {}", chapter, e),
            },
            Err(e) => tracing::warn!("Primary words for chapter {} unavailable: {}", chapter, e),
        }

        match self.fetch_secondary_words(chapter).await {
            Ok(verses) => match Self::store_provider_words(conn, chapter, &verses) {
                Ok(n) => return Ok((ChapterState::Fetched, n)),
                Err(e) => tracing::warn!("Secondary words for chapter {} unusable: {}", chapter, e),
            },
            Err(e) => tracing::warn!("Secondary words for chapter {} unavailable: {}", chapter, e),
        }

        let n = Self::store_heuristic_words(conn, chapter)?;
        Ok((ChapterState::FallbackBasic, n))
    }

    pub async fn load_words(&self, conn: &Connection, report: &mut IngestReport) {
        IngestReport::mark_pending(&mut report.words, &self.chapters);

        for (i, &chapter) in self.chapters.iter().enumerate() {
            self.pause(i).await;

            match self.words_for_chapter(conn, chapter).await {
                Ok((state, n)) => {
                    tracing::debug!("Stored {} words for chapter {}", n, chapter);
                    report.words.insert(chapter, state);
                    report.words_stored += n;
                }
                Err(e) => tracing::error!("Failed to store words for chapter {}: {}", chapter, e),
            }
        }
    }

    // ============ Bengali ============

    async fn translations_bn_for_chapter(&self, conn: &Connection, chapter: u32) -> Result<()> {
        let body = self.source.get_json(&self.api.bengali_url(chapter)).await?;
        let payload = sources::parse_bengali(body)?;

        if !db::set_chapter_translation_bn(conn, chapter, &payload.translation)? {
            return Err(MushafError::NotFound(format!("chapter {}", chapter)));
        }

        for verse in &payload.verses {
            if !db::set_verse_translation_bn(conn, chapter, verse.id, &verse.translation)? {
                tracing::warn!("No stored verse {}:{} for Bengali translation", chapter, verse.id);
            }
        }
        Ok(())
    }

    pub async fn load_translations_bn(&self, conn: &Connection, report: &mut IngestReport) {
        IngestReport::mark_pending(&mut report.translations_bn, &self.chapters);

        for (i, &chapter) in self.chapters.iter().enumerate() {
            self.pause(i).await;

            match self.translations_bn_for_chapter(conn, chapter).await {
                Ok(()) => {
                    report.translations_bn.insert(chapter, ChapterState::Fetched);
                }
                Err(e) => tracing::warn!("Bengali translation for chapter {} failed: {}", chapter, e),
            }
        }
    }
}

/// Placeholder verses for a chapter whose text could not be fetched.
pub fn sample_verses(chapter: u32) -> Vec<Verse> {
    let verse = |n: u32, text: String, translation: String| Verse {
        chapter,
        number: n,
        number_in_chapter: n,
        text_simple: text.clone(),
        text_uthmani: text,
        translation_en: translation,
        audio_url: Some(Verse::default_audio_url(chapter, n)),
        page_number: 1,
        juz_number: 1,
        hizb_number: 1,
        ..Default::default()
    };

    if chapter == 1 {
        FATIHAH
            .iter()
            .enumerate()
            .map(|(i, (text, translation))| {
                verse(i as u32 + 1, text.to_string(), translation.to_string())
            })
            .collect()
    } else {
        vec![verse(
            1,
            format!("Sample verse for Surah {}", chapter),
            format!("Sample translation for Surah {}", chapter),
        )]
    }
}

/// Delete every word and regenerate all of them from stored verse text.
/// Curated annotations take precedence. Runs in one transaction.
pub fn rebuild_words(conn: &mut Connection) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let tx = conn.transaction()?;

    let deleted = db::delete_all_words(&tx)?;
    tracing::info!("Deleted {} existing words", deleted);

    for chapter in 1..=CHAPTER_COUNT {
        let verses = db::verses_for_chapter(&tx, chapter)?;
        if verses.is_empty() {
            tracing::warn!("Chapter {} has no stored verses", chapter);
            continue;
        }

        let mut stored = 0;
        for verse in &verses {
            for word in enrich::annotate_verse(verse) {
                match db::insert_word(&tx, &word) {
                    Ok(()) => stored += 1,
                    Err(e) if MushafError::is_constraint_violation(&e) => {
                        tracing::warn!(
                            "Skipping word {} of verse {}: {}",
                            word.position,
                            verse.reference(),
                            e
                        );
                        report.words_skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        tracing::debug!("Created {} words for chapter {}", stored, chapter);
        report.words.insert(chapter, ChapterState::FallbackBasic);
        report.words_stored += stored;
    }

    tx.commit()?;
    report.log_summary();
    Ok(report)
}
