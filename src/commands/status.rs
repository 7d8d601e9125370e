//! Status command - index snapshot health and backend availability

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::answer::generator::{
    GeminiGenerator, OllamaGenerator, OpenAiGenerator, TextGenerator,
};
use crate::search::embedding::EMBEDDER_ID;
use crate::search::index::VerseIndex;

/// Run status command
pub fn run(db_path: &Path, json: bool) -> Result<()> {
    let index = if db_path.exists() {
        VerseIndex::open(db_path, EMBEDDER_ID).ok()
    } else {
        None
    };

    let backends: Vec<(&str, bool)> = {
        let gemini = GeminiGenerator::new();
        let openai = OpenAiGenerator::new();
        let ollama = OllamaGenerator::new();
        vec![
            ("extractive", true),
            (gemini.name(), gemini.is_available()),
            (openai.name(), openai.is_available()),
            (ollama.name(), ollama.is_available()),
        ]
    };

    if json {
        let backends_json: serde_json::Map<String, serde_json::Value> = backends
            .iter()
            .map(|(name, available)| (name.to_string(), serde_json::json!(available)))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "index_loaded": index.is_some(),
                "verse_count": index.as_ref().map(|i| i.len()),
                "backends": backends_json,
            })
        );
        return Ok(());
    }

    println!("{}", "Gita Query Status".bold());
    println!();

    match &index {
        Some(index) => println!(
            "  {} Index loaded: {} verses",
            "✓".green().bold(),
            index.len().to_string().cyan()
        ),
        None => println!(
            "  {} No usable index at {} (run {})",
            "✗".red().bold(),
            db_path.display(),
            "gita index".cyan()
        ),
    }

    println!();
    println!("{}", "Answer backends".bold());
    for (name, available) in backends {
        if available {
            println!("  {} {}", "✓".green().bold(), name);
        } else {
            println!("  {} {} {}", "✗".red(), name, "unavailable".dimmed());
        }
    }

    Ok(())
}
