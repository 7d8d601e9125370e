//! Search command - retrieval only, no answer generation

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::engine::GitaEngine;

const DEFAULT_LIMIT: usize = 5;

/// Run search command
pub fn run(
    query: &str,
    limit: Option<usize>,
    db_path: &Path,
    dataset_path: &Path,
    json: bool,
) -> Result<()> {
    let engine = GitaEngine::open_or_build(db_path, dataset_path)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let results = engine.retriever().search(query, Some(limit));

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        results.len(),
        query.cyan()
    );
    println!();

    for result in &results {
        let score_str = format!("{:.2}", result.score);
        let score_colored = if result.score > 0.8 {
            score_str.green()
        } else if result.score > 0.6 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };

        println!(
            "{}. [{}] {}",
            result.rank.to_string().bold(),
            score_colored,
            result.citation().cyan()
        );
        for line in result.text.lines().take(3) {
            println!("   {}", line.dimmed());
        }
        println!();
    }

    Ok(())
}
