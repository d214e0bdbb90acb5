//! Word-level enrichment of stored verse text.
//!
//! Each verse is tokenized and every token gets a transliteration, gloss,
//! root and part-of-speech from the heuristics. A handful of well-known
//! verses carry curated annotations that win over the heuristics position
//! by position.

use crate::models::{Verse, Word};
use crate::{bismillah, lexicon, pos, roots, text, transliterate};

/// A curated annotation for one word position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub arabic: &'static str,
    pub transliteration: &'static str,
    pub meaning: &'static str,
    pub root: &'static str,
    pub part_of_speech: &'static str,
}

const fn a(
    arabic: &'static str,
    transliteration: &'static str,
    meaning: &'static str,
    root: &'static str,
    part_of_speech: &'static str,
) -> Annotation {
    Annotation {
        arabic,
        transliteration,
        meaning,
        root,
        part_of_speech,
    }
}

static FATIHAH_1: &[Annotation] = &[
    a("بِسْمِ", "bismi", "In (the) name of", "ب س م", "Preposition"),
    a("ٱللَّهِ", "Allahi", "Allah", "ا ل ه", "Proper Noun"),
    a("ٱلرَّحْمَٰنِ", "Ar-Rahman", "The Entirely Merciful", "ر ح م", "Proper Noun"),
    a("ٱلرَّحِيمِ", "Ar-Raheem", "The Especially Merciful", "ر ح م", "Proper Noun"),
];

static FATIHAH_2: &[Annotation] = &[
    a("ٱلْحَمْدُ", "Alhamdu", "All praise", "ح م د", "Noun"),
    a("لِلَّهِ", "lillahi", "is for Allah", "ل ل ه", "Preposition"),
    a("رَبِّ", "Rabb", "Lord", "ر ب ب", "Noun"),
    a("ٱلْعَٰلَمِينَ", "al-'aalameen", "of the worlds", "ع ل م", "Noun"),
];

static FATIHAH_3: &[Annotation] = &[
    a("ٱلرَّحْمَٰنِ", "Ar-Rahman", "The Entirely Merciful", "ر ح م", "Proper Noun"),
    a("ٱلرَّحِيمِ", "Ar-Raheem", "The Especially Merciful", "ر ح م", "Proper Noun"),
];

static FATIHAH_4: &[Annotation] = &[
    a("مَٰلِكِ", "Maaliki", "Sovereign", "م ل ك", "Noun"),
    a("يَوْمِ", "Yawmi", "(of the) Day", "ي و م", "Noun"),
    a("ٱلدِّينِ", "id-Deen", "of Recompense", "د ي ن", "Noun"),
];

static FATIHAH_5: &[Annotation] = &[
    a("إِيَّاكَ", "Iyyaka", "You alone", "ا ي ي", "Pronoun"),
    a("نَعْبُدُ", "na'budu", "we worship", "ع ب د", "Verb"),
    a("وَإِيَّاكَ", "wa iyyaka", "and You alone", "ا ي ي", "Conjunction"),
    a("نَسْتَعِينُ", "nasta'een", "we ask for help", "ع و ن", "Verb"),
];

static FATIHAH_6: &[Annotation] = &[
    a("ٱهْدِنَا", "Ihdina", "Guide us", "ه د ي", "Verb"),
    a("ٱلصِّرَٰطَ", "as-Siraat", "to the straight path", "ص ر ط", "Noun"),
    a("ٱلْمُسْتَقِيمَ", "al-Mustaqeem", "the straight", "ق و م", "Adjective"),
];

static FATIHAH_7: &[Annotation] = &[
    a("صِرَٰطَ", "Siraata", "The path", "ص ر ط", "Noun"),
    a("ٱلَّذِينَ", "allatheena", "of those", "ل ذ ي", "Relative Pronoun"),
    a("أَنْعَمْتَ", "an'amta", "You have bestowed favor", "ن ع م", "Verb"),
    a("عَلَيْهِمْ", "'alayhim", "upon them", "ع ل ي", "Preposition"),
    a("غَيْرِ", "ghayri", "not", "غ ي ر", "Noun"),
    a("ٱلْمَغْضُوبِ", "al-maghdoobi", "those who have evoked anger", "غ ض ب", "Noun"),
    a("وَلَا", "wala", "and not", "و ل ي", "Conjunction"),
    a("ٱلضَّآلِّينَ", "ad-daaalleen", "those who are astray", "ض ل ل", "Noun"),
];

static DISJOINED_ALIF_LAM_MIM: &[Annotation] = &[a(
    "الم",
    "Alif Laam Meem",
    "These are disjointed letters",
    "ا ل م",
    "Letter",
)];

static BAQARAH_2: &[Annotation] = &[
    a("ذَٰلِكَ", "Zaalika", "That", "ذ ل ك", "Demonstrative Pronoun"),
    a("ٱلْكِتَابُ", "al-Kitaabu", "the Book", "ك ت ب", "Noun"),
    a("لَا", "laa", "no", "ل ي", "Negative Particle"),
    a("رَيْبَ", "rayba", "doubt", "ر ي ب", "Noun"),
    a("فِيهِ", "feehi", "in it", "ف ي ه", "Preposition"),
    a("هُدًى", "hudan", "a guidance", "ه د ي", "Noun"),
    a("لِّلْمُتَّقِينَ", "lilmuttaqeena", "for the righteous", "و ق ي", "Noun"),
];

static NISA_1: &[Annotation] = &[
    a("يَٰٓأَيُّهَا", "Yaa ayyuha", "O", "ي ا ه", "Vocative Particle"),
    a("ٱلنَّاسُ", "an-Naasu", "mankind", "ن و س", "Noun"),
    a("ٱتَّقُوا۟", "ittaqoo", "fear", "و ق ي", "Verb"),
    a("رَبَّكُمُ", "Rabbakum", "your Lord", "ر ب ب", "Noun"),
];

static PREDEFINED: &[((u32, u32), &[Annotation])] = &[
    ((1, 1), FATIHAH_1),
    ((1, 2), FATIHAH_2),
    ((1, 3), FATIHAH_3),
    ((1, 4), FATIHAH_4),
    ((1, 5), FATIHAH_5),
    ((1, 6), FATIHAH_6),
    ((1, 7), FATIHAH_7),
    ((2, 1), DISJOINED_ALIF_LAM_MIM),
    ((2, 2), BAQARAH_2),
    ((3, 1), DISJOINED_ALIF_LAM_MIM),
    ((4, 1), NISA_1),
];

/// Curated annotations for a verse, empty when none exist.
pub fn predefined(chapter: u32, number_in_chapter: u32) -> &'static [Annotation] {
    PREDEFINED
        .iter()
        .find(|(key, _)| *key == (chapter, number_in_chapter))
        .map(|(_, annotations)| *annotations)
        .unwrap_or(&[])
}

/// Heuristic annotation of a single (already stripped) token.
pub fn analyze_token(verse_id: i64, token: &str, position: u32) -> Word {
    Word {
        verse_id,
        position,
        arabic: token.to_string(),
        transliteration: transliterate::transliterate(token, position as usize),
        pronunciation_audio: None,
        meaning_en: lexicon::lookup(token).to_string(),
        meaning_id: String::new(),
        meaning_ur: String::new(),
        root: roots::extract_root(token),
        part_of_speech: pos::guess(token).to_string(),
    }
}

fn from_annotation(verse_id: i64, annotation: &Annotation, position: u32) -> Word {
    Word {
        verse_id,
        position,
        arabic: annotation.arabic.to_string(),
        transliteration: annotation.transliteration.to_string(),
        pronunciation_audio: None,
        meaning_en: annotation.meaning.to_string(),
        meaning_id: String::new(),
        meaning_ur: String::new(),
        root: annotation.root.to_string(),
        part_of_speech: annotation.part_of_speech.to_string(),
    }
}

/// Build the word rows for a stored verse. Positions are dense from 0 and
/// follow the token order of the Uthmani text. Curated annotations are
/// aligned after a prepended opening formula.
pub fn annotate_verse(verse: &Verse) -> Vec<Word> {
    let curated = predefined(verse.chapter, verse.number_in_chapter);
    let tokens = text::tokenize(&verse.text_uthmani);
    let skip = bismillah::formula_word_count(verse.chapter, verse.number_in_chapter, &tokens);

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let annotation = i.checked_sub(skip).and_then(|j| curated.get(j));
            match annotation {
                Some(annotation) => from_annotation(verse.id, annotation, i as u32),
                None => analyze_token(verse.id, token, i as u32),
            }
        })
        .collect()
}
