//! Index command - build or inspect the verse index snapshot

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::core::dataset::load_corpus;
use crate::search::embedding::Embedder;
use crate::search::index::VerseIndex;

/// Run index command
pub fn run(
    db_path: &Path,
    dataset_path: &Path,
    rebuild: bool,
    status_only: bool,
    json: bool,
) -> Result<()> {
    if status_only {
        return show_status(db_path, json);
    }

    if rebuild && db_path.exists() {
        std::fs::remove_file(db_path)?;
        if !json {
            println!("{} Removed existing index", "→".dimmed());
        }
    }

    if !json {
        println!(
            "{} Loading dataset from {}",
            "→".dimmed(),
            dataset_path.display()
        );
    }

    let start = std::time::Instant::now();
    let verses = load_corpus(dataset_path)?;
    let embedder = Embedder::new();
    let index = VerseIndex::build(db_path, &verses, &embedder)?;
    let duration_ms = start.elapsed().as_millis();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "verse_count": index.len(),
                "duration_ms": duration_ms,
                "db_path": db_path.display().to_string(),
            })
        );
    } else {
        println!();
        println!(
            "{} Indexed {} verses in {:.2}s",
            "✓".green().bold(),
            index.len().to_string().cyan(),
            duration_ms as f64 / 1000.0
        );
        println!("  {} Index saved to: {}", "→".dimmed(), db_path.display());
    }

    Ok(())
}

/// Show index status
fn show_status(db_path: &Path, json: bool) -> Result<()> {
    if !db_path.exists() {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "exists": false,
                    "error": "Index not found"
                })
            );
        } else {
            println!(
                "{} Index not found. Run {} first.",
                "!".yellow().bold(),
                "gita index".cyan()
            );
        }
        return Ok(());
    }

    let index = VerseIndex::open(db_path, crate::search::embedding::EMBEDDER_ID)?;
    let stats = index.stats()?;
    let file_size = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "verse_count": stats.verse_count,
                "embedder": stats.embedder,
                "built_at": stats.built_at,
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Index Status".bold());
        println!();
        println!(
            "  {} {} verses indexed",
            "→".dimmed(),
            stats.verse_count.to_string().cyan()
        );
        println!("  {} Embedder: {}", "→".dimmed(), stats.embedder);
        println!(
            "  {} Size: {:.2} KB",
            "→".dimmed(),
            file_size as f64 / 1024.0
        );
        if let Some(ts) = stats.built_at {
            let dt = chrono::DateTime::from_timestamp(ts, 0)
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            println!("  {} Built: {}", "→".dimmed(), dt);
        }
    }

    Ok(())
}
