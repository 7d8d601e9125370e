mod answer;
mod commands;
mod core;
mod engine;
mod search;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use answer::answerer::AnswerMode;

#[derive(Parser)]
#[command(name = "gita")]
#[command(about = "Life questions answered with cited Bhagavad Gita verses", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Index snapshot path")]
    db: Option<PathBuf>,

    #[arg(long, global = true, help = "Raw dataset JSON path")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or inspect the verse index snapshot
    Index {
        #[arg(long, help = "Force rebuild index")]
        rebuild: bool,
        #[arg(long, help = "Show index status only")]
        status: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Ask a life question and get a cited answer
    Ask {
        query: String,
        #[arg(long, value_enum, default_value_t = AnswerMode::Extractive, help = "Answer generation mode")]
        mode: AnswerMode,
        #[arg(short, long, help = "Number of source verses to show")]
        k: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Semantic search over the verses, no answer generation
    Search {
        query: String,
        #[arg(short, long, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Look up a verse by chapter and verse number
    Verse {
        chapter: u32,
        verse: u32,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Check citation strings like [2.47] against the corpus
    Validate {
        #[arg(required = true)]
        citations: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Index health and answer-backend availability
    Status {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Evaluate retrieval against the golden question set
    Eval {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (db_path, dataset_path) = commands::resolve_paths(cli.db, cli.dataset);

    match cli.command {
        Commands::Index {
            rebuild,
            status,
            json,
        } => commands::index::run(&db_path, &dataset_path, rebuild, status, json),
        Commands::Ask {
            query,
            mode,
            k,
            json,
        } => commands::ask::run(&query, mode, k, &db_path, &dataset_path, json),
        Commands::Search { query, limit, json } => {
            commands::search::run(&query, limit, &db_path, &dataset_path, json)
        }
        Commands::Verse {
            chapter,
            verse,
            json,
        } => commands::verse::run(chapter, verse, &db_path, &dataset_path, json),
        Commands::Validate { citations, json } => {
            commands::validate::run(&citations, &db_path, &dataset_path, json)
        }
        Commands::Status { json } => commands::status::run(&db_path, json),
        Commands::Eval { json } => commands::eval::run(&db_path, &dataset_path, json),
    }
}
