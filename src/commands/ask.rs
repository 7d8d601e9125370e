//! Ask command - the full question-to-cited-answer pipeline

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::answer::answerer::AnswerMode;
use crate::engine::{GitaEngine, DEFAULT_SOURCE_COUNT};

/// Run ask command
pub fn run(
    query: &str,
    mode: AnswerMode,
    k: Option<usize>,
    db_path: &Path,
    dataset_path: &Path,
    json: bool,
) -> Result<()> {
    let engine = GitaEngine::open_or_build(db_path, dataset_path)?;
    let k = k.unwrap_or(DEFAULT_SOURCE_COUNT);

    let response = engine.ask(query, mode, k);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{} {}", "Q:".bold(), query.cyan());
    println!();
    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!();
        println!(
            "{} ({} mode)",
            "Sources".bold(),
            response.mode_used.to_string().dimmed()
        );
        println!();

        for source in &response.sources {
            let score_str = format!("{:.2}", source.score);
            let score_colored = if source.score > 0.8 {
                score_str.green()
            } else if source.score > 0.6 {
                score_str.yellow()
            } else {
                score_str.dimmed()
            };

            println!(
                "{}. [{}] {}",
                source.rank.to_string().bold(),
                score_colored,
                source.citation().cyan()
            );
            println!("   {}", snippet(&source.text, 100).dimmed());
            println!();
        }
    }

    Ok(())
}

/// First line of the translated passage, truncated char-aware.
fn snippet(text: &str, max_chars: usize) -> String {
    let passage = text.rsplit("\n\n").next().unwrap_or(text);
    if passage.chars().count() > max_chars {
        format!("{}...", passage.chars().take(max_chars).collect::<String>())
    } else {
        passage.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_takes_passage_after_header() {
        let text = "Chapter 2, Verse 47\n\nDo your duty.";
        assert_eq!(snippet(text, 100), "Do your duty.");
    }

    #[test]
    fn test_snippet_truncates() {
        let text = "a".repeat(150);
        let s = snippet(&text, 100);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 103);
    }
}
