//! Rule-based part-of-speech guessing.
//!
//! Coarse classifier over affixes and closed word lists. It has known false
//! positives (any word with both ي and ن is called a verb) and must not be
//! read as grammatical analysis.

use crate::text::lookup_form;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    FeminineNoun,
    PluralNoun,
    Verb,
    Conjunction,
    Preposition,
    Particle,
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PartOfSpeech::Noun => "Noun",
            PartOfSpeech::FeminineNoun => "Noun (Feminine)",
            PartOfSpeech::PluralNoun => "Noun (Plural)",
            PartOfSpeech::Verb => "Verb",
            PartOfSpeech::Conjunction => "Conjunction",
            PartOfSpeech::Preposition => "Preposition",
            PartOfSpeech::Particle => "Particle",
        };
        f.write_str(label)
    }
}

static CONJUNCTIONS: &[&str] = &["و", "ف", "ثم", "أو", "بل", "لكن"];
static PREPOSITIONS: &[&str] = &["في", "من", "عن", "على", "إلى", "ب", "ك", "ل"];

pub fn guess(token: &str) -> PartOfSpeech {
    let word = lookup_form(token);

    if word.starts_with("ال") {
        PartOfSpeech::Noun
    } else if word.ends_with('ة') {
        PartOfSpeech::FeminineNoun
    } else if word.ends_with("ون") || word.ends_with("ين") {
        PartOfSpeech::PluralNoun
    } else if word.chars().count() <= 2 {
        if CONJUNCTIONS.contains(&word.as_str()) {
            PartOfSpeech::Conjunction
        } else if PREPOSITIONS.contains(&word.as_str()) {
            PartOfSpeech::Preposition
        } else {
            PartOfSpeech::Particle
        }
    } else if word.contains('ي') && word.contains('ن') {
        PartOfSpeech::Verb
    } else {
        PartOfSpeech::Noun
    }
}
