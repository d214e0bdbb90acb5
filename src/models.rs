//! Record types for chapters, verses, words and user data

use crate::error::MushafError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zero-padded 3-digit form used by every audio URL scheme.
pub fn pad3(n: u32) -> String {
    format!("{:03}", n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevelationType {
    Meccan,
    Medinan,
}

impl RevelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevelationType::Meccan => "meccan",
            RevelationType::Medinan => "medinan",
        }
    }
}

impl FromStr for RevelationType {
    type Err = MushafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meccan" => Ok(RevelationType::Meccan),
            "medinan" => Ok(RevelationType::Medinan),
            other => Err(MushafError::InvalidInput(format!("revelation type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub name_arabic: String,
    pub name_english: String,
    pub name_translation: String,
    #[serde(default)]
    pub name_translation_bn: String,
    #[serde(default)]
    pub name_translation_ur: String,
    pub revelation_type: RevelationType,
    pub total_verses: u32,
    pub audio_url: Option<String>,
}

impl Chapter {
    pub fn default_audio_url(number: u32) -> String {
        format!("https://everyayah.com/data/Alafasy_128kbps/{}001.mp3", pad3(number))
    }
}

/// Timing of a single word inside the verse recitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSegment {
    pub word_index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Row id; ignored on upsert, filled in on read.
    pub id: i64,
    pub chapter: u32,
    /// Global sequence number across the whole text.
    pub number: u32,
    pub number_in_chapter: u32,
    pub text_uthmani: String,
    pub text_indopak: String,
    pub text_simple: String,
    pub transliteration: String,
    pub translation_en: String,
    pub translation_id: String,
    pub translation_ur: String,
    pub translation_bn: String,
    pub audio_url: Option<String>,
    pub audio_segments: Vec<AudioSegment>,
    pub segment_timestamps: Vec<u64>,
    pub page_number: u32,
    pub juz_number: u32,
    pub hizb_number: u32,
    pub rub_number: Option<u32>,
    pub sajdah: bool,
}

impl Verse {
    pub fn default_audio_url(chapter: u32, verse: u32) -> String {
        format!(
            "https://everyayah.com/data/Alafasy_128kbps/{}{}.mp3",
            pad3(chapter),
            pad3(verse)
        )
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.chapter, self.number_in_chapter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub verse_id: i64,
    /// Zero-based, dense within a verse.
    pub position: u32,
    pub arabic: String,
    pub transliteration: String,
    pub pronunciation_audio: Option<String>,
    pub meaning_en: String,
    pub meaning_id: String,
    pub meaning_ur: String,
    pub root: String,
    pub part_of_speech: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TafsirSource {
    IbnKathir,
    Jalalayn,
    Qurtubi,
    Tabari,
    Modern,
}

impl TafsirSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TafsirSource::IbnKathir => "ibn_kathir",
            TafsirSource::Jalalayn => "jalalayn",
            TafsirSource::Qurtubi => "qurtubi",
            TafsirSource::Tabari => "tabari",
            TafsirSource::Modern => "modern",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TafsirSource::IbnKathir => "Tafsir Ibn Kathir",
            TafsirSource::Jalalayn => "Tafsir al-Jalalayn",
            TafsirSource::Qurtubi => "Tafsir al-Qurtubi",
            TafsirSource::Tabari => "Tafsir al-Tabari",
            TafsirSource::Modern => "Modern Tafsir",
        }
    }
}

impl FromStr for TafsirSource {
    type Err = MushafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ibn_kathir" => Ok(TafsirSource::IbnKathir),
            "jalalayn" => Ok(TafsirSource::Jalalayn),
            "qurtubi" => Ok(TafsirSource::Qurtubi),
            "tabari" => Ok(TafsirSource::Tabari),
            "modern" => Ok(TafsirSource::Modern),
            other => Err(MushafError::InvalidInput(format!("tafsir source '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tafsir {
    pub verse_id: i64,
    pub source: TafsirSource,
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecitationStyle {
    Hafs,
    Warsh,
    Qaloon,
    Duri,
}

impl RecitationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecitationStyle::Hafs => "hafs",
            RecitationStyle::Warsh => "warsh",
            RecitationStyle::Qaloon => "qaloon",
            RecitationStyle::Duri => "duri",
        }
    }
}

impl FromStr for RecitationStyle {
    type Err = MushafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hafs" => Ok(RecitationStyle::Hafs),
            "warsh" => Ok(RecitationStyle::Warsh),
            "qaloon" => Ok(RecitationStyle::Qaloon),
            "duri" => Ok(RecitationStyle::Duri),
            other => Err(MushafError::InvalidInput(format!("recitation style '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recitation {
    pub reciter_id: u32,
    pub name: String,
    pub name_arabic: String,
    pub style: RecitationStyle,
    /// Contains `{surah}` and `{ayah}` placeholders.
    pub audio_url_template: String,
}

impl Recitation {
    pub fn audio_url(&self, chapter: u32, verse: u32) -> String {
        self.audio_url_template
            .replace("{surah}", &pad3(chapter))
            .replace("{ayah}", &pad3(verse))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkType {
    #[default]
    Default,
    Favorite,
    Memorized,
    Study,
}

impl BookmarkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkType::Default => "default",
            BookmarkType::Favorite => "favorite",
            BookmarkType::Memorized => "memorized",
            BookmarkType::Study => "study",
        }
    }
}

impl FromStr for BookmarkType {
    type Err = MushafError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(BookmarkType::Default),
            "favorite" => Ok(BookmarkType::Favorite),
            "memorized" => Ok(BookmarkType::Memorized),
            "study" => Ok(BookmarkType::Study),
            other => Err(MushafError::InvalidInput(format!("bookmark type '{}'", other))),
        }
    }
}

impl fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNote {
    pub id: i64,
    pub user_id: i64,
    pub verse_id: i64,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub verse_id: i64,
    pub bookmark_type: BookmarkType,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BismillahWord {
    pub index: u32,
    pub arabic: String,
    pub audio: String,
}

/// The opening formula record (singleton, well-known id 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningFormula {
    pub text_uthmani: String,
    pub text_simple: String,
    pub translation_en: String,
    pub audio_url: String,
    pub words: Vec<BismillahWord>,
}

impl OpeningFormula {
    pub fn canonical() -> Self {
        let word = |index: u32, arabic: &str| BismillahWord {
            index,
            arabic: arabic.to_string(),
            audio: format!(
                "https://words.audios.quranwbw.com/001/001_001_{}.mp3",
                pad3(index)
            ),
        };

        Self {
            text_uthmani: "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ".to_string(),
            text_simple: "بسم الله الرحمن الرحيم".to_string(),
            translation_en: "In the name of Allah, the Entirely Merciful, the Especially Merciful."
                .to_string(),
            audio_url: "https://everyayah.com/data/Alafasy_128kbps/001001.mp3".to_string(),
            words: vec![
                word(1, "بِسْمِ"),
                word(2, "اللَّهِ"),
                word(3, "الرَّحْمَٰنِ"),
                word(4, "الرَّحِيمِ"),
            ],
        }
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recitation_template() {
        let r = Recitation {
            reciter_id: 1,
            name: "Mishary Alafasy".to_string(),
            name_arabic: String::new(),
            style: RecitationStyle::Hafs,
            audio_url_template: "https://everyayah.com/data/Alafasy_128kbps/{surah}{ayah}.mp3"
                .to_string(),
        };
        assert_eq!(
            r.audio_url(2, 255),
            "https://everyayah.com/data/Alafasy_128kbps/002255.mp3"
        );
        assert_eq!(
            r.audio_url(1, 7),
            "https://everyayah.com/data/Alafasy_128kbps/001007.mp3"
        );
    }

    #[test]
    fn test_enum_round_trip_strings() {
        assert_eq!("Medinan".parse::<RevelationType>().unwrap(), RevelationType::Medinan);
        assert_eq!("ibn_kathir".parse::<TafsirSource>().unwrap(), TafsirSource::IbnKathir);
        assert_eq!("study".parse::<BookmarkType>().unwrap(), BookmarkType::Study);
        assert!("gold".parse::<BookmarkType>().is_err());
        assert!("hafs ".parse::<RecitationStyle>().is_err());
    }

    #[test]
    fn test_canonical_opening_formula() {
        let f = OpeningFormula::canonical();
        assert_eq!(f.words.len(), 4);
        assert_eq!(
            f.words[3].audio,
            "https://words.audios.quranwbw.com/001/001_001_004.mp3"
        );
    }
}
