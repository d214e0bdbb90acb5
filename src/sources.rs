//! Remote text sources and their payload formats
//!
//! Every upstream API is reached through [`JsonSource`] so ingestion can be
//! driven by a scripted source in tests. Payloads are decoded into typed
//! records here; the orchestrator never touches raw JSON.

use crate::error::{MushafError, Result};
use crate::models::{Chapter, RevelationType, Verse};
use crate::reference;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Fetches a JSON document. A non-success HTTP status is an error.
#[allow(async_fn_in_trait)]
pub trait JsonSource {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Live source backed by `reqwest`.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpSource {
    async fn get_json(&self, url: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(MushafError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(response.json().await?)
    }
}

/// Base URLs of the upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub alquran: String,
    pub quranwbw: String,
    pub qurancom: String,
    pub bn_api: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            alquran: "https://api.alquran.cloud/v1".to_string(),
            quranwbw: "https://api.quranwbw.com".to_string(),
            qurancom: "https://api.quran.com".to_string(),
            bn_api: "https://alquran-api.pages.dev".to_string(),
        }
    }
}

impl ApiEndpoints {
    pub fn chapters_url(&self) -> String {
        format!("{}/surah", self.alquran)
    }

    pub fn arabic_text_url(&self, chapter: u32) -> String {
        format!("{}/surah/{}/ar.alafasy", self.alquran, chapter)
    }

    pub fn english_text_url(&self, chapter: u32) -> String {
        format!("{}/surah/{}/en.asad", self.alquran, chapter)
    }

    pub fn wbw_url(&self, chapter: u32) -> String {
        format!("{}/v1/surahs/{}/ayahs", self.quranwbw, chapter)
    }

    pub fn word_by_word_url(&self, chapter: u32) -> String {
        format!("{}/api/v4/quran/word_by_word/{}", self.qurancom, chapter)
    }

    pub fn bengali_url(&self, chapter: u32) -> String {
        format!("{}/api/quran/surah/{}?lang=bn", self.bn_api, chapter)
    }
}

// ============ Chapter metadata ============

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterPayload {
    number: u32,
    name: String,
    english_name: String,
    english_name_translation: String,
    revelation_type: String,
    number_of_ayahs: u32,
}

pub fn parse_chapters(value: Value) -> Result<Vec<Chapter>> {
    let envelope: Envelope<Vec<ChapterPayload>> = serde_json::from_value(value)?;

    envelope
        .data
        .into_iter()
        .map(|c| -> Result<Chapter> {
            let revelation_type: RevelationType = c.revelation_type.parse()?;
            Ok(Chapter {
                number: c.number,
                name_arabic: c.name,
                name_english: c.english_name,
                name_translation: c.english_name_translation,
                name_translation_bn: String::new(),
                name_translation_ur: String::new(),
                revelation_type,
                total_verses: c.number_of_ayahs,
                audio_url: Some(Chapter::default_audio_url(c.number)),
            })
        })
        .collect()
}

// ============ Verse text ============

#[derive(Debug, Deserialize)]
struct EditionPayload {
    ayahs: Vec<AyahPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahPayload {
    number: u32,
    number_in_surah: u32,
    #[serde(default)]
    text: String,
    page: Option<u32>,
    juz: Option<u32>,
    hizb_quarter: Option<u32>,
    /// `false` or an object describing the prostration.
    #[serde(default)]
    sajda: Value,
}

/// Combine the Arabic and English editions of one chapter into verses.
/// Translations pair with the Arabic verse at the same index.
pub fn parse_verses(chapter: u32, arabic: Value, english: Value) -> Result<Vec<Verse>> {
    let arabic: Envelope<EditionPayload> = serde_json::from_value(arabic)?;
    let english: Envelope<EditionPayload> = serde_json::from_value(english)?;

    if arabic.data.ayahs.is_empty() {
        return Err(MushafError::Source(format!(
            "no verses for chapter {}",
            chapter
        )));
    }

    let mut translations = english.data.ayahs.into_iter().map(|a| a.text);

    Ok(arabic
        .data
        .ayahs
        .into_iter()
        .map(|ayah| {
            let n = ayah.number_in_surah;
            Verse {
                chapter,
                number: ayah.number,
                number_in_chapter: n,
                text_simple: ayah.text.clone(),
                text_uthmani: ayah.text,
                translation_en: translations.next().unwrap_or_default(),
                audio_url: Some(Verse::default_audio_url(chapter, n)),
                page_number: ayah
                    .page
                    .unwrap_or_else(|| reference::estimate_page(chapter, n)),
                juz_number: ayah
                    .juz
                    .unwrap_or_else(|| reference::estimate_juz(chapter, n)),
                hizb_number: ayah
                    .hizb_quarter
                    .unwrap_or_else(|| reference::estimate_hizb(chapter, n)),
                sajdah: !matches!(ayah.sajda, Value::Null | Value::Bool(false)),
                ..Default::default()
            }
        })
        .collect())
}

// ============ Word annotations ============

/// One word as delivered by an annotation provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderWord {
    pub arabic: String,
    pub transliteration: String,
    pub meaning: String,
    pub root: String,
    pub part_of_speech: String,
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderVerse {
    pub number_in_chapter: u32,
    pub words: Vec<ProviderWord>,
}

#[derive(Debug, Default, Deserialize)]
struct TextField {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UrlField {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WbwPayload {
    #[serde(default)]
    ayahs: Vec<WbwAyah>,
}

#[derive(Debug, Deserialize)]
struct WbwAyah {
    ayah_number: u32,
    #[serde(default)]
    words: Vec<WbwWord>,
}

#[derive(Debug, Deserialize)]
struct WbwWord {
    #[serde(default)]
    text_uthmani: Option<String>,
    #[serde(default)]
    transliteration: Option<TextField>,
    #[serde(default)]
    translation: Option<TextField>,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    audio: Option<UrlField>,
}

fn text_of(field: Option<TextField>) -> String {
    field.and_then(|f| f.text).unwrap_or_default()
}

/// Decode the primary word-by-word provider.
pub fn parse_wbw(value: Value) -> Result<Vec<ProviderVerse>> {
    let payload: WbwPayload = serde_json::from_value(value)?;

    Ok(payload
        .ayahs
        .into_iter()
        .map(|ayah| ProviderVerse {
            number_in_chapter: ayah.ayah_number,
            words: ayah
                .words
                .into_iter()
                .map(|w| ProviderWord {
                    arabic: w.text_uthmani.unwrap_or_default(),
                    transliteration: text_of(w.transliteration),
                    meaning: text_of(w.translation),
                    root: w.root.unwrap_or_default(),
                    part_of_speech: w.part_of_speech.unwrap_or_default(),
                    audio: w.audio.and_then(|a| a.url).filter(|u| !u.is_empty()),
                })
                .collect(),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct QuranComPayload {
    #[serde(default)]
    verses: Vec<QuranComVerse>,
}

#[derive(Debug, Deserialize)]
struct QuranComVerse {
    verse_number: u32,
    #[serde(default)]
    words: Vec<QuranComWord>,
}

#[derive(Debug, Deserialize)]
struct QuranComWord {
    #[serde(default)]
    text_uthmani: Option<String>,
    #[serde(default)]
    transliteration: Option<TextField>,
    #[serde(default)]
    translations: Vec<TextField>,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    part_of_speech: Option<String>,
}

/// Decode the secondary word-by-word provider. The first translation wins.
pub fn parse_word_by_word(value: Value) -> Result<Vec<ProviderVerse>> {
    let payload: QuranComPayload = serde_json::from_value(value)?;

    Ok(payload
        .verses
        .into_iter()
        .map(|verse| ProviderVerse {
            number_in_chapter: verse.verse_number,
            words: verse
                .words
                .into_iter()
                .map(|w| ProviderWord {
                    arabic: w.text_uthmani.unwrap_or_default(),
                    transliteration: text_of(w.transliteration),
                    meaning: text_of(w.translations.into_iter().next()),
                    root: w.root.unwrap_or_default(),
                    part_of_speech: w.part_of_speech.unwrap_or_default(),
                    audio: None,
                })
                .collect(),
        })
        .collect())
}

// ============ Bengali translation ============

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BengaliVerse {
    pub id: u32,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BengaliChapter {
    /// Translated chapter name.
    pub translation: String,
    pub verses: Vec<BengaliVerse>,
}

pub fn parse_bengali(value: Value) -> Result<BengaliChapter> {
    Ok(serde_json::from_value(value)?)
}
