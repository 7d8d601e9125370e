//! Query engine: the explicit context holding the read-only handles.
//!
//! Built once at process start (load the snapshot if it is valid, otherwise
//! rebuild from the raw dataset) and passed to every query handler. No
//! hidden globals; after construction everything is read-only and safe for
//! concurrent readers.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::answer::answerer::{AnswerMode, Answerer};
use crate::core::dataset::load_corpus;
use crate::core::safety::{safety_check, DEFLECTION_MESSAGE};
use crate::search::embedding::{Embedder, EMBEDDER_ID};
use crate::search::index::VerseIndex;
use crate::search::retriever::{Retriever, SearchResult};

/// Default number of source verses returned with an answer.
pub const DEFAULT_SOURCE_COUNT: usize = 5;

/// The response surface: answer text, ordered sources, and the mode that
/// actually produced the answer (which may differ from the requested mode
/// after a fallback).
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub mode_used: AnswerMode,
}

pub struct GitaEngine {
    retriever: Retriever,
    answerer: Answerer,
}

impl GitaEngine {
    /// Open an existing index snapshot. Fails if it is missing or was built
    /// with an incompatible schema or embedder.
    pub fn open(db_path: &Path) -> Result<Self> {
        let embedder = Embedder::new();
        let index = VerseIndex::open(db_path, EMBEDDER_ID)?;
        Ok(Self::from_parts(index, embedder))
    }

    /// Load-or-build startup policy: reuse a valid snapshot, otherwise load
    /// the raw dataset and rebuild wholesale. A dataset that cannot be read
    /// or yields zero verses is fatal; there is no degraded mode.
    pub fn open_or_build(db_path: &Path, dataset_path: &Path) -> Result<Self> {
        let embedder = Embedder::new();

        let index = match VerseIndex::open(db_path, EMBEDDER_ID) {
            Ok(index) => index,
            Err(err) => {
                if db_path.exists() {
                    eprintln!("Index snapshot unusable ({}), rebuilding", err);
                }
                let verses = load_corpus(dataset_path)?;
                VerseIndex::build(db_path, &verses, &embedder)
                    .with_context(|| format!("Failed to build index at {}", db_path.display()))?
            }
        };

        Ok(Self::from_parts(index, embedder))
    }

    fn from_parts(index: VerseIndex, embedder: Embedder) -> Self {
        Self {
            retriever: Retriever::new(index, embedder),
            answerer: Answerer::new(),
        }
    }

    /// Full query pipeline. Every per-query failure class resolves to a
    /// well-defined response; this never errors.
    ///
    /// 1. Unsafe (medical/legal) queries get the deflection message with
    ///    zero sources, skipping retrieval entirely.
    /// 2. Queries with no verse above the score floor get the fixed
    ///    no-match message.
    /// 3. Otherwise the best verse plus its context verses feed answer
    ///    generation, and the sources are truncated to `k` for display.
    pub fn ask(&self, query: &str, mode: AnswerMode, k: usize) -> AskResponse {
        if !safety_check(query) {
            return AskResponse {
                answer: DEFLECTION_MESSAGE.to_string(),
                sources: Vec::new(),
                mode_used: AnswerMode::Extractive,
            };
        }

        let passages: Vec<SearchResult> = match self.retriever.search_best_answer(query) {
            Some(bundle) => std::iter::once(bundle.best_verse)
                .chain(bundle.context_verses)
                .collect(),
            None => Vec::new(),
        };

        let output = self.answerer.generate_answer(query, &passages, mode);

        let mut sources = passages;
        sources.truncate(k);

        AskResponse {
            answer: output.text,
            sources,
            mode_used: output.mode_used,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn answerer(&self) -> &Answerer {
        &self.answerer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verse::Verse;

    fn test_engine() -> GitaEngine {
        let embedder = Embedder::new();
        let verses = vec![
            Verse::new(2, 47, "Do your duty without attachment to the results of action.", None),
            Verse::new(2, 48, "Be steadfast in yoga, perform your duty with an even mind.", None),
            Verse::new(6, 5, "Lift yourself by your own self, never degrade yourself.", None),
        ];
        let index = VerseIndex::build_in_memory(&verses, &embedder).unwrap();
        GitaEngine::from_parts(index, embedder)
    }

    #[test]
    fn test_unsafe_query_is_deflected_without_sources() {
        let engine = test_engine();
        let response = engine.ask("What medicine should I take?", AnswerMode::Extractive, 5);

        assert_eq!(response.answer, DEFLECTION_MESSAGE);
        assert!(response.sources.is_empty());
    }

    #[test]
    fn test_empty_query_gets_no_match_response() {
        let engine = test_engine();
        let response = engine.ask("   ", AnswerMode::Extractive, 5);

        assert_eq!(
            response.answer,
            crate::answer::answerer::NO_MATCH_MESSAGE
        );
        assert!(response.sources.is_empty());
        assert_eq!(response.mode_used, AnswerMode::Extractive);
    }

    #[test]
    fn test_ask_returns_answer_with_sources() {
        let engine = test_engine();
        let response = engine.ask(
            "Do your duty without attachment to the results of action.",
            AnswerMode::Extractive,
            5,
        );

        assert!(response.answer.contains("The Bhagavad Gita teaches:"));
        assert!(!response.sources.is_empty());
        assert_eq!(response.sources[0].id, "02.47");
        assert_eq!(response.mode_used, AnswerMode::Extractive);
    }

    #[test]
    fn test_ask_truncates_sources_to_k() {
        let engine = test_engine();
        let response = engine.ask(
            "duty yoga action self mind results",
            AnswerMode::Extractive,
            1,
        );
        assert!(response.sources.len() <= 1);
    }

    #[test]
    fn test_open_or_build_is_fatal_without_dataset() {
        let db = std::env::temp_dir().join(format!("gita-engine-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&db);
        let result = GitaEngine::open_or_build(&db, Path::new("/nonexistent/dataset.json"));
        assert!(result.is_err());
        let _ = std::fs::remove_file(&db);
    }
}
