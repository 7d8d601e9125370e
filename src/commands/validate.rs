//! Validate command - check citation strings against the corpus

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::engine::GitaEngine;

/// Run validate command
pub fn run(
    citations: &[String],
    db_path: &Path,
    dataset_path: &Path,
    json: bool,
) -> Result<()> {
    let engine = GitaEngine::open_or_build(db_path, dataset_path)?;
    let reports = engine.retriever().validate_citations(citations);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("{}", "Citation Check".bold());
    println!();

    for report in &reports {
        if report.exists {
            println!("  {} {}", "✓".green().bold(), report.citation);
        } else {
            println!(
                "  {} {} {}",
                "✗".red().bold(),
                report.citation,
                "does not exist".dimmed()
            );
        }
    }

    let missing = reports.iter().filter(|r| !r.exists).count();
    println!();
    if missing == 0 {
        println!("{} All {} citations exist", "✓".green().bold(), reports.len());
    } else {
        println!(
            "{} {} of {} citations do not exist",
            "✗".red().bold(),
            missing,
            reports.len()
        );
    }

    Ok(())
}
