//! Raw-record normalization for the verse dataset.
//!
//! Dataset versions disagree on field naming (case variants, abbreviations),
//! so every raw record is mapped onto canonical keys before validation.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::verse::{MAX_CHAPTER, MIN_CHAPTER};

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonical fields extracted from one raw record. Unmapped keys are dropped.
#[derive(Debug, Default, Clone)]
pub struct RawVerseFields {
    pub chapter: Option<String>,
    pub verse: Option<String>,
    pub sanskrit: Option<String>,
    pub hindi: Option<String>,
    pub english: Option<String>,
}

/// Map a raw heterogeneous record onto canonical field names.
/// The first matching alternate spelling wins for each field.
pub fn normalize_schema(record: &Map<String, Value>) -> RawVerseFields {
    RawVerseFields {
        chapter: first_match(record, &["chapter", "Chapter", "ch"]),
        verse: first_match(record, &["verse", "Verse", "v"]),
        sanskrit: first_match(record, &["sanskrit", "Sanskrit", "sa"]),
        hindi: first_match(record, &["hindi", "Hindi", "hi"]),
        english: first_match(record, &["english", "English", "en", "translation"]),
    }
}

fn first_match(record: &Map<String, Value>, alternates: &[&str]) -> Option<String> {
    alternates
        .iter()
        .find_map(|key| record.get(*key).and_then(value_to_string))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Strip characters outside the printable ASCII range, whitespace excepted,
/// then collapse whitespace runs to single spaces and trim. Unicode whitespace
/// (U+00A0, U+2009, ...) counts as a word break and collapses to a plain
/// space rather than being deleted with the surrounding words fused. The
/// result is a fixed point: `clean_text(clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|&c| c.is_whitespace() || (' '..='~').contains(&c))
        .collect();
    WHITESPACE_RE.replace_all(kept.trim(), " ").into_owned()
}

/// A record is usable iff chapter and verse parse as integers within bounds
/// and the resolved text is non-empty after trimming.
pub fn validate_verse_data(fields: &RawVerseFields, text: &str) -> bool {
    let (Some(chapter_raw), Some(verse_raw)) = (&fields.chapter, &fields.verse) else {
        return false;
    };

    let Ok(chapter) = chapter_raw.trim().parse::<u32>() else {
        return false;
    };
    let Ok(verse) = verse_raw.trim().parse::<u32>() else {
        return false;
    };

    if !(MIN_CHAPTER..=MAX_CHAPTER).contains(&chapter) || verse < 1 {
        return false;
    }

    !text.trim().is_empty()
}
