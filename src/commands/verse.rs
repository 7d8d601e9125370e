//! Verse command - exact lookup by chapter and verse number

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::verse::{MAX_CHAPTER, MIN_CHAPTER};
use crate::engine::GitaEngine;

/// Run verse command
pub fn run(
    chapter: u32,
    verse: u32,
    db_path: &Path,
    dataset_path: &Path,
    json: bool,
) -> Result<()> {
    if !(MIN_CHAPTER..=MAX_CHAPTER).contains(&chapter) {
        bail!(
            "Chapter must be between {} and {}",
            MIN_CHAPTER,
            MAX_CHAPTER
        );
    }

    let engine = GitaEngine::open_or_build(db_path, dataset_path)?;

    match engine.retriever().get_verse_by_citation(chapter, verse) {
        Some(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.citation().cyan().bold());
                println!();
                println!("{}", result.text);
            }
        }
        None => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "error": "not found",
                        "chapter": chapter,
                        "verse": verse,
                    })
                );
            } else {
                println!(
                    "{} Verse {}.{} not found in the corpus",
                    "!".yellow().bold(),
                    chapter,
                    verse
                );
            }
        }
    }

    Ok(())
}
