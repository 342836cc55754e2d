//! Field extraction from interview answers.
//!
//! [`FieldExtractor`] is the seam; [`KeywordExtractor`] implements the
//! keyword-anchored heuristics for Turkish answers.

use crate::onboarding::model::Disability;
use crate::onboarding::state::Field;

/// Turns a spoken answer into the value stored for a field.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, field: Field, utterance: &str) -> String;
}

const FIRST_NAME_KEYWORDS: &[&str] = &["adım", "ismim", "benim adım", "ben"];
const LAST_NAME_KEYWORDS: &[&str] = &["soyadım", "soyismim"];

/// Tens are checked before "on" and the units, so "otuz beş" reads as 30.
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("yirmi", "20"),
    ("otuz", "30"),
    ("kırk", "40"),
    ("elli", "50"),
    ("altmış", "60"),
    ("yetmiş", "70"),
    ("seksen", "80"),
    ("doksan", "90"),
    ("on", "10"),
    ("bir", "1"),
    ("iki", "2"),
    ("üç", "3"),
    ("dört", "4"),
    ("beş", "5"),
    ("altı", "6"),
    ("yedi", "7"),
    ("sekiz", "8"),
    ("dokuz", "9"),
];

const DISABILITY_KEYWORDS: &[(Disability, &[&str])] = &[
    (Disability::Visual, &["görme", "kör", "göremiyorum"]),
    (Disability::Hearing, &["işitme", "sağır", "duyamıyorum"]),
    (
        Disability::Physical,
        &["fiziksel", "yürüme", "tekerlekli", "ortopedik"],
    ),
    (Disability::Speech, &["konuşma", "konuşamıyorum", "dilsiz"]),
];

/// Keyword-anchored substring heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl FieldExtractor for KeywordExtractor {
    fn extract(&self, field: Field, utterance: &str) -> String {
        match field {
            Field::FirstName => extract_name(utterance, FIRST_NAME_KEYWORDS),
            Field::LastName => extract_name(utterance, LAST_NAME_KEYWORDS),
            Field::Age => extract_age(utterance),
            Field::Disability => extract_disability(utterance).label().to_string(),
        }
    }
}

/// Word following the first keyword found, or the first word of the answer.
pub fn extract_name(text: &str, keywords: &[&str]) -> String {
    for keyword in keywords {
        if let Some((_, end)) = find_ignore_case(text, keyword) {
            let rest: String = text[end..]
                .trim()
                .chars()
                .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ';' | ':'))
                .collect();
            if let Some(word) = rest.split(' ').next().filter(|w| !w.is_empty()) {
                return capitalize(word);
            }
        }
    }

    match text.split_whitespace().next() {
        Some(word) => capitalize(word),
        None => text.trim().to_string(),
    }
}

/// Digits if present, else a number word, else the answer itself.
pub fn extract_age(text: &str) -> String {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if !digits.is_empty() {
        return digits;
    }

    let lower = text.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, number)| number.to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

pub fn extract_disability(text: &str) -> Disability {
    let lower = text.to_lowercase();
    if lower.contains("yok") {
        return Disability::None;
    }
    DISABILITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| category.clone())
        .unwrap_or_else(|| Disability::Other(text.trim().to_string()))
}

/// Byte range of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }
    haystack.char_indices().find_map(|(start, _)| {
        let mut matched = 0;
        for (offset, c) in haystack[start..].char_indices() {
            for lower in c.to_lowercase() {
                if needle.get(matched) != Some(&lower) {
                    return None;
                }
                matched += 1;
            }
            if matched == needle.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
        None
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_after_keyword() {
        let x = KeywordExtractor;
        assert_eq!(x.extract(Field::FirstName, "Benim adım ahmet."), "Ahmet");
        assert_eq!(x.extract(Field::FirstName, "ismim Zeynep, memnun oldum"), "Zeynep");
        assert_eq!(x.extract(Field::FirstName, "Ben mehmet"), "Mehmet");
    }

    #[test]
    fn first_name_falls_back_to_first_word() {
        let x = KeywordExtractor;
        assert_eq!(x.extract(Field::FirstName, "ayşe"), "Ayşe");
        assert_eq!(x.extract(Field::FirstName, "  elif kaya "), "Elif");
        assert_eq!(x.extract(Field::FirstName, "   "), "");
    }

    #[test]
    fn keyword_with_nothing_after_falls_back() {
        assert_eq!(extract_name("fatma adım", FIRST_NAME_KEYWORDS), "Fatma");
    }

    #[test]
    fn last_name_keywords() {
        let x = KeywordExtractor;
        assert_eq!(x.extract(Field::LastName, "Soyadım yılmaz"), "Yılmaz");
        assert_eq!(x.extract(Field::LastName, "soyismim Demir!"), "Demir");
        assert_eq!(x.extract(Field::LastName, "kaya"), "Kaya");
    }

    #[test]
    fn age_digits_first() {
        assert_eq!(extract_age("35 yaşındayım"), "35");
        assert_eq!(extract_age("yaşım 42, otuz değil"), "42");
    }

    #[test]
    fn age_number_words_prefer_tens() {
        assert_eq!(extract_age("otuz beş yaşındayım"), "30");
        assert_eq!(extract_age("Yirmi"), "20");
        assert_eq!(extract_age("beş"), "5");
    }

    #[test]
    fn age_falls_back_to_text() {
        assert_eq!(extract_age("  bilmiyorum "), "bilmiyorum");
    }

    #[test]
    fn disability_categories() {
        assert_eq!(extract_disability("engelim yok"), Disability::None);
        assert_eq!(extract_disability("görme engelliyim"), Disability::Visual);
        assert_eq!(extract_disability("Sağırım"), Disability::Hearing);
        assert_eq!(extract_disability("tekerlekli sandalye kullanıyorum"), Disability::Physical);
        assert_eq!(extract_disability("dilsizim"), Disability::Speech);
        assert_eq!(
            extract_disability(" disleksi "),
            Disability::Other("disleksi".to_string())
        );
    }

    #[test]
    fn disability_label_through_extractor() {
        assert_eq!(
            KeywordExtractor.extract(Field::Disability, "görme engelliyim"),
            "Görme Engelli"
        );
        assert_eq!(KeywordExtractor.extract(Field::Disability, "engelim yok"), "Yok");
    }

    #[test]
    fn case_insensitive_find_returns_byte_range() {
        assert_eq!(find_ignore_case("Benim ADIM Can", "adım"), None);
        assert_eq!(find_ignore_case("Benim Adım Can", "adım"), Some((6, 11)));
        assert_eq!(find_ignore_case("abc", "x"), None);
    }
}
