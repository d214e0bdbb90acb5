//! Static reference data used to validate and backfill ingested records

use crate::models::{Chapter, Recitation, RecitationStyle, RevelationType};

pub const CHAPTER_COUNT: u32 = 114;

/// Expected verse count per chapter, index 0 is chapter 1.
static VERSE_COUNTS: [u32; CHAPTER_COUNT as usize] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, //
    123, 111, 43, 52, 99, 128, 111, 110, 98, 135, //
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, //
    34, 30, 73, 54, 45, 83, 182, 88, 75, 85, //
    54, 53, 89, 59, 37, 35, 38, 29, 18, 45, //
    60, 49, 62, 55, 78, 96, 29, 22, 24, 13, //
    14, 11, 11, 18, 12, 12, 30, 52, 52, 44, //
    28, 28, 20, 56, 40, 31, 50, 40, 46, 42, //
    29, 19, 36, 25, 22, 17, 19, 26, 30, 20, //
    15, 21, 11, 8, 8, 19, 5, 8, 8, 11, //
    11, 8, 3, 9, 5, 4, 7, 3, 6, 3, //
    5, 4, 5, 6,
];

pub fn expected_verse_count(chapter: u32) -> Option<u32> {
    if (1..=CHAPTER_COUNT).contains(&chapter) {
        Some(VERSE_COUNTS[(chapter - 1) as usize])
    } else {
        None
    }
}

/// Total verses across all chapters.
pub fn total_verse_count() -> u32 {
    VERSE_COUNTS.iter().sum()
}

/// Chapters whose metadata is known without any network access.
static KNOWN_CHAPTERS: &[(u32, &str, &str, &str, RevelationType)] = &[
    (1, "الفاتحة", "Al-Fatihah", "The Opening", RevelationType::Meccan),
    (2, "البقرة", "Al-Baqarah", "The Cow", RevelationType::Medinan),
    (3, "آل عمران", "Ali 'Imran", "Family of Imran", RevelationType::Medinan),
    (4, "النساء", "An-Nisa", "The Women", RevelationType::Medinan),
    (5, "المائدة", "Al-Ma'idah", "The Table Spread", RevelationType::Medinan),
    (6, "الأنعام", "Al-An'am", "The Cattle", RevelationType::Meccan),
    (7, "الأعراف", "Al-A'raf", "The Heights", RevelationType::Meccan),
    (8, "الأنفال", "Al-Anfal", "The Spoils of War", RevelationType::Medinan),
    (9, "التوبة", "At-Tawbah", "The Repentance", RevelationType::Medinan),
    (10, "يونس", "Yunus", "Jonah", RevelationType::Meccan),
];

pub fn known_chapters() -> Vec<Chapter> {
    KNOWN_CHAPTERS
        .iter()
        .map(|(number, arabic, english, translation, revelation)| Chapter {
            number: *number,
            name_arabic: arabic.to_string(),
            name_english: english.to_string(),
            name_translation: translation.to_string(),
            name_translation_bn: String::new(),
            name_translation_ur: String::new(),
            revelation_type: *revelation,
            total_verses: VERSE_COUNTS[(*number - 1) as usize],
            audio_url: Some(Chapter::default_audio_url(*number)),
        })
        .collect()
}

/// Placeholder metadata for a chapter nothing else could describe.
/// The revelation type split at 86 is approximate.
pub fn placeholder_chapter(number: u32) -> Chapter {
    let name = format!("Surah {}", number);
    Chapter {
        number,
        name_arabic: name.clone(),
        name_english: name.clone(),
        name_translation: name,
        name_translation_bn: String::new(),
        name_translation_ur: String::new(),
        revelation_type: if number <= 86 {
            RevelationType::Meccan
        } else {
            RevelationType::Medinan
        },
        total_verses: expected_verse_count(number).unwrap_or(0),
        audio_url: Some(Chapter::default_audio_url(number)),
    }
}

pub fn default_recitations() -> Vec<Recitation> {
    let recitation = |id: u32, name: &str, arabic: &str, folder: &str| Recitation {
        reciter_id: id,
        name: name.to_string(),
        name_arabic: arabic.to_string(),
        style: RecitationStyle::Hafs,
        audio_url_template: format!("https://everyayah.com/data/{}/{{surah}}{{ayah}}.mp3", folder),
    };

    vec![
        recitation(1, "Mishary Alafasy", "مشاري العفاسي", "Alafasy_128kbps"),
        recitation(2, "Abdul Basit Abdul Samad", "عبد الباسط عبد الصمد", "AbdulSamad_64kbps/Quran"),
        recitation(3, "Maher Al Muaiqly", "ماهر المعيقلي", "MaherAlMuaiqly128kbps"),
        recitation(4, "Hani Ar-Rifai", "هاني الرفاعي", "Hani_Rifai_192kbps"),
    ]
}

/// Al-Fatihah text and Sahih-style translation, used when the text source is down.
pub static FATIHAH: &[(&str, &str)] = &[
    (
        "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
        "In the name of Allah, the Entirely Merciful, the Especially Merciful.",
    ),
    (
        "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ",
        "[All] praise is [due] to Allah, Lord of the worlds -",
    ),
    (
        "ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
        "The Entirely Merciful, the Especially Merciful,",
    ),
    ("مَٰلِكِ يَوْمِ ٱلدِّينِ", "Sovereign of the Day of Recompense."),
    (
        "إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ",
        "It is You we worship and You we ask for help.",
    ),
    ("ٱهْدِنَا ٱلصِّرَٰطَ ٱلْمُسْتَقِيمَ", "Guide us to the straight path -"),
    (
        "صِرَٰطَ ٱلَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ ٱلْمَغْضُوبِ عَلَيْهِمْ وَلَا ٱلضَّآلِّينَ",
        "The path of those upon whom You have bestowed favor, not of those who have evoked [Your] anger or of those who are astray.",
    ),
];

/// Simplified page estimate for verses whose source omitted it.
pub fn estimate_page(chapter: u32, verse: u32) -> u32 {
    if chapter == 1 {
        1
    } else if chapter == 2 && verse <= 141 {
        2
    } else {
        ((chapter - 1) / 2 + 1).max(1)
    }
}

pub fn estimate_juz(chapter: u32, verse: u32) -> u32 {
    if chapter == 1 || (chapter == 2 && verse <= 141) {
        1
    } else if chapter == 2 && verse <= 252 {
        2
    } else {
        ((chapter - 1) / 4 + 1).min(30)
    }
}

pub fn estimate_hizb(chapter: u32, verse: u32) -> u32 {
    (estimate_juz(chapter, verse) * 2).saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_counts() {
        assert_eq!(expected_verse_count(1), Some(7));
        assert_eq!(expected_verse_count(2), Some(286));
        assert_eq!(expected_verse_count(9), Some(129));
        assert_eq!(expected_verse_count(114), Some(6));
        assert_eq!(expected_verse_count(0), None);
        assert_eq!(expected_verse_count(115), None);
        assert_eq!(total_verse_count(), 6236);
    }

    #[test]
    fn test_known_chapters_consistent() {
        let chapters = known_chapters();
        assert_eq!(chapters.len(), 10);
        for (i, c) in chapters.iter().enumerate() {
            assert_eq!(c.number, i as u32 + 1);
            assert_eq!(Some(c.total_verses), expected_verse_count(c.number));
        }
    }

    #[test]
    fn test_placeholder_chapter() {
        let c = placeholder_chapter(87);
        assert_eq!(c.name_english, "Surah 87");
        assert_eq!(c.total_verses, 19);
        assert_eq!(c.revelation_type, RevelationType::Medinan);
        assert_eq!(placeholder_chapter(86).revelation_type, RevelationType::Meccan);
    }

    #[test]
    fn test_recitation_templates() {
        let recs = default_recitations();
        assert_eq!(recs.len(), 4);
        assert_eq!(
            recs[1].audio_url(2, 255),
            "https://everyayah.com/data/AbdulSamad_64kbps/Quran/002255.mp3"
        );
    }

    #[test]
    fn test_estimates() {
        assert_eq!(estimate_page(1, 3), 1);
        assert_eq!(estimate_juz(2, 200), 2);
        assert_eq!(estimate_juz(114, 1), 29);
        assert_eq!(estimate_hizb(1, 1), 1);
        assert_eq!(estimate_hizb(2, 200), 3);
    }

    #[test]
    fn test_fatihah_matches_reference() {
        assert_eq!(FATIHAH.len() as u32, expected_verse_count(1).unwrap());
    }
}
