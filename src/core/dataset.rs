//! Corpus loading: raw heterogeneous records -> canonical verse store.
//!
//! Records that fail validation are silently excluded, so the store may hold
//! fewer verses than the raw source. An unreadable dataset or one that yields
//! zero valid verses is a fatal startup error.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use super::normalize::{clean_text, normalize_schema, validate_verse_data};
use super::verse::Verse;

/// Load and normalize the verse corpus from a JSON array of raw records.
pub fn load_corpus(path: &Path) -> Result<Vec<Verse>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset at {}", path.display()))?;

    let records: Vec<Map<String, Value>> = serde_json::from_str(&raw)
        .with_context(|| format!("Dataset at {} is not a JSON array of records", path.display()))?;

    let verses = assemble_verses(&records);
    if verses.is_empty() {
        bail!(
            "Dataset at {} yielded no valid verses after normalization",
            path.display()
        );
    }

    Ok(verses)
}

/// Normalize, validate, and assemble verses in source order.
///
/// The English translation is the primary text with Hindi as fallback.
/// Duplicate (chapter, verse) pairs keep the first occurrence.
pub fn assemble_verses(records: &[Map<String, Value>]) -> Vec<Verse> {
    let mut verses = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();

    for record in records {
        let fields = normalize_schema(record);

        let translation = fields
            .english
            .as_deref()
            .or(fields.hindi.as_deref())
            .map(clean_text)
            .unwrap_or_default();

        if !validate_verse_data(&fields, &translation) {
            continue;
        }

        let chapter: u32 = match fields.chapter.as_deref().map(str::trim).map(str::parse) {
            Some(Ok(c)) => c,
            _ => continue,
        };
        let verse: u32 = match fields.verse.as_deref().map(str::trim).map(str::parse) {
            Some(Ok(v)) => v,
            _ => continue,
        };

        if !seen.insert((chapter, verse)) {
            continue;
        }

        let sanskrit = fields
            .sanskrit
            .as_deref()
            .map(clean_text)
            .filter(|s| !s.is_empty());

        verses.push(Verse::new(chapter, verse, &translation, sanskrit));
    }

    verses
}
