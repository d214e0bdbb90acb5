//! Gloss lookup against a small dictionary of common Quranic words.
//!
//! Results are advisory. The substring pass in particular is weak: it
//! returns the gloss of the first key (in table order) contained anywhere in
//! the token, which is neither the longest nor the most specific match.

use crate::text::{lookup_form, strip_definite_article};

pub const MEANING_NOT_AVAILABLE: &str = "Meaning not available";

/// Declared order is significant for the substring pass.
static GLOSSES: &[(&str, &str)] = &[
    ("الله", "Allah (God)"),
    ("رب", "Lord"),
    ("رحمن", "Most Gracious"),
    ("رحيم", "Merciful"),
    ("الحمد", "All praise"),
    ("عالمين", "Worlds"),
    ("ملك", "King/Master"),
    ("يوم", "Day"),
    ("الدين", "Judgment/Recompense"),
    ("إياك", "You alone"),
    ("نعبد", "We worship"),
    ("نستعين", "We seek help"),
    ("اهدنا", "Guide us"),
    ("الصراط", "The path"),
    ("المستقيم", "Straight"),
    ("الذين", "Those who"),
    ("أنعمت", "You have favored"),
    ("عليهم", "Upon them"),
    ("غير", "Not"),
    ("المغضوب", "Those who earned anger"),
    ("الضالين", "Those who are astray"),
    ("بسم", "In the name of"),
    ("كتاب", "Book"),
    ("لا", "No/Not"),
    ("ريب", "Doubt"),
    ("فيه", "In it"),
    ("هدى", "Guidance"),
    ("للمتقين", "For the righteous"),
    ("الناس", "Mankind"),
    ("اتقوا", "Fear"),
    ("خلقكم", "Created you"),
    ("نفس", "Soul"),
    ("واحدة", "One"),
    ("و", "And"),
    ("من", "From"),
    ("هو", "He"),
    ("هم", "They"),
    ("أنت", "You"),
    ("أنا", "I"),
    ("نحن", "We"),
    ("هذا", "This"),
    ("ذلك", "That"),
    ("هؤلاء", "These"),
    ("أولئك", "Those"),
    ("كان", "Was"),
    ("يكون", "Will be"),
    ("يكونون", "They will be"),
    ("قال", "Said"),
    ("يقول", "Says"),
    ("قالوا", "They said"),
    ("تعالى", "Exalted"),
    ("عظيم", "Great"),
    ("كريم", "Generous"),
    ("حكيم", "Wise"),
    ("عليم", "All-Knowing"),
    ("قدير", "All-Powerful"),
    ("سميع", "All-Hearing"),
    ("بصير", "All-Seeing"),
    ("غفور", "Forgiving"),
    ("عزيز", "Mighty"),
];

fn exact(word: &str) -> Option<&'static str> {
    GLOSSES.iter().find(|(k, _)| *k == word).map(|(_, v)| *v)
}

/// Look up an English gloss for `token`, returning
/// [`MEANING_NOT_AVAILABLE`] when nothing matches.
pub fn lookup(token: &str) -> &'static str {
    let word = lookup_form(token);
    if word.is_empty() {
        return MEANING_NOT_AVAILABLE;
    }

    if let Some(gloss) = exact(&word) {
        return gloss;
    }

    if let Some(gloss) = strip_definite_article(&word).and_then(exact) {
        return gloss;
    }

    GLOSSES
        .iter()
        .find(|(k, _)| word.contains(k))
        .map(|(_, v)| *v)
        .unwrap_or(MEANING_NOT_AVAILABLE)
}
