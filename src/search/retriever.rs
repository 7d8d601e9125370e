//! Exhaustive-search-then-rank retrieval over the verse index.
//!
//! Every query scans the whole corpus, so the "best" verse is globally best
//! rather than best within an arbitrary candidate window. The corpus is a
//! few hundred verses; full scans are cheap.

use serde::Serialize;

use super::embedding::Embedder;
use super::index::VerseIndex;
use crate::core::citation::{build_citation, parse_citation};
use crate::core::verse::Verse;

/// Scores below this are background similarity of the embedding space, not
/// relevance. Policy constant, not a tunable default.
pub const SCORE_FLOOR: f32 = 0.1;

/// Number of context verses returned alongside the best answer.
pub const CONTEXT_WINDOW: usize = 4;

/// A transient per-query view of a verse with its score and rank.
/// Never written back into the store.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub sanskrit: Option<String>,
    pub score: f32,
    pub rank: usize,
}

impl SearchResult {
    fn from_verse(verse: &Verse, score: f32, rank: usize) -> Self {
        Self {
            id: verse.id.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text.clone(),
            sanskrit: verse.sanskrit.clone(),
            score,
            rank,
        }
    }

    pub fn citation(&self) -> String {
        build_citation(self.chapter, self.verse)
    }
}

/// Best verse plus supporting context for one query. Constructed fresh per
/// query and discarded after the caller consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct BestAnswerBundle {
    pub best_verse: SearchResult,
    pub context_verses: Vec<SearchResult>,
    pub total_matches: usize,
    pub confidence: f32,
}

/// Per-citation existence report.
#[derive(Debug, Clone, Serialize)]
pub struct CitationReport {
    pub citation: String,
    pub exists: bool,
    pub verse: Option<SearchResult>,
}

/// Retriever over a read-only index and embedder, built once at startup and
/// safe to share across concurrent query handlers.
pub struct Retriever {
    index: VerseIndex,
    embedder: Embedder,
}

impl Retriever {
    pub fn new(index: VerseIndex, embedder: Embedder) -> Self {
        Self { index, embedder }
    }

    /// Ranked, scored verse matches for a free-text query.
    ///
    /// Empty/whitespace queries yield an empty vec with no error. Everything
    /// below [`SCORE_FLOOR`] is discarded; survivors come back in strictly
    /// descending score order with 1-based ranks, truncated to `k` if given.
    pub fn search(&self, query: &str, k: Option<usize>) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let query_vector = self.embedder.embed(query);
        let scored = self.index.search(&query_vector, self.index.len());

        let mut results: Vec<SearchResult> = scored
            .into_iter()
            .filter(|s| s.score >= SCORE_FLOOR)
            .enumerate()
            .map(|(i, s)| SearchResult::from_verse(s.verse, s.score, i + 1))
            .collect();

        if let Some(k) = k {
            results.truncate(k);
        }

        results
    }

    /// Globally best verse plus up to [`CONTEXT_WINDOW`] context verses.
    /// `None` when nothing passes the score floor.
    pub fn search_best_answer(&self, query: &str) -> Option<BestAnswerBundle> {
        let all = self.search(query, None);
        if all.is_empty() {
            return None;
        }

        let total_matches = all.len();
        let mut iter = all.into_iter();
        let best_verse = iter.next()?;
        let confidence = best_verse.score;
        let context_verses: Vec<SearchResult> = iter.take(CONTEXT_WINDOW).collect();

        Some(BestAnswerBundle {
            best_verse,
            context_verses,
            total_matches,
            confidence,
        })
    }

    /// Exact (chapter, verse) lookup by linear scan; synthetic perfect score
    /// on a hit. O(corpus) is fine at this scale, so no extra index exists.
    pub fn get_verse_by_citation(&self, chapter: u32, verse: u32) -> Option<SearchResult> {
        self.index
            .verses()
            .iter()
            .find(|v| v.chapter == chapter && v.verse == verse)
            .map(|v| SearchResult::from_verse(v, 1.0, 1))
    }

    /// Existence report for citation strings of the form `[chapter.verse]`.
    /// Malformed strings report as non-existent rather than erroring.
    pub fn validate_citations(&self, citations: &[String]) -> Vec<CitationReport> {
        citations
            .iter()
            .map(|citation| {
                let verse = parse_citation(citation)
                    .and_then(|(chapter, verse)| self.get_verse_by_citation(chapter, verse));
                CitationReport {
                    citation: citation.clone(),
                    exists: verse.is_some(),
                    verse,
                }
            })
            .collect()
    }

    /// Readable listing of results, one `{citation} {text}` block per verse.
    pub fn format_search_results(&self, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return "No relevant verses found.".to_string();
        }

        results
            .iter()
            .map(|r| format!("{} {}", r.citation(), r.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_retriever() -> Retriever {
        let embedder = Embedder::new();
        let verses = vec![
            Verse::new(2, 47, "Do your duty without attachment to the results of action.", None),
            Verse::new(2, 48, "Be steadfast in yoga, perform your duty with an even mind.", None),
            Verse::new(6, 5, "Lift yourself by your own self, never degrade yourself.", None),
            Verse::new(18, 78, "Where there is Krishna and Arjuna there is victory.", None),
        ];
        let index = VerseIndex::build_in_memory(&verses, &embedder).unwrap();
        Retriever::new(index, embedder)
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let retriever = test_retriever();
        assert!(retriever.search("", None).is_empty());
        assert!(retriever.search("   \t", None).is_empty());
        assert!(retriever.search_best_answer("  ").is_none());
    }

    #[test]
    fn test_search_scores_descending_above_floor() {
        let retriever = test_retriever();
        let results =
            retriever.search("Do your duty without attachment to the results of action.", None);

        assert!(!results.is_empty());
        assert_eq!(results[0].id, "02.47");
        for (i, result) in results.iter().enumerate() {
            assert!(result.score >= SCORE_FLOOR);
            assert_eq!(result.rank, i + 1);
        }
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_search_truncates_to_k() {
        let retriever = test_retriever();
        let all = retriever.search("duty and action and yoga and self", None);
        let limited = retriever.search("duty and action and yoga and self", Some(1));
        assert!(limited.len() <= 1);
        if !all.is_empty() {
            assert_eq!(limited[0].id, all[0].id);
        }
    }

    #[test]
    fn test_best_answer_bundle_shape() {
        let retriever = test_retriever();
        let bundle = retriever
            .search_best_answer("Do your duty without attachment to the results of action.")
            .unwrap();

        assert_eq!(bundle.best_verse.id, "02.47");
        assert_eq!(bundle.confidence, bundle.best_verse.score);
        assert!(bundle.context_verses.len() <= CONTEXT_WINDOW);
        assert!(bundle.total_matches >= 1 + bundle.context_verses.len());
        // the best verse never repeats in the context window
        assert!(bundle.context_verses.iter().all(|v| v.id != bundle.best_verse.id));
    }

    #[test]
    fn test_get_verse_by_citation() {
        let retriever = test_retriever();

        let hit = retriever.get_verse_by_citation(2, 47).unwrap();
        assert_eq!(hit.score, 1.0);
        assert_eq!(hit.chapter, 2);
        assert_eq!(hit.verse, 47);
        assert_eq!(hit.id, "02.47");

        assert!(retriever.get_verse_by_citation(2, 999).is_none());
        assert!(retriever.get_verse_by_citation(12, 1).is_none());
    }

    #[test]
    fn test_validate_citations() {
        let retriever = test_retriever();
        let citations = vec![
            "[2.47]".to_string(),
            "[9.99]".to_string(),
            "[2.x]".to_string(),
            "not a citation".to_string(),
        ];

        let reports = retriever.validate_citations(&citations);
        assert_eq!(reports.len(), 4);
        assert!(reports[0].exists);
        assert!(reports[0].verse.is_some());
        assert!(!reports[1].exists);
        assert!(!reports[2].exists);
        assert!(!reports[3].exists);
    }

    #[test]
    fn test_format_search_results() {
        let retriever = test_retriever();
        assert_eq!(retriever.format_search_results(&[]), "No relevant verses found.");

        let results = vec![SearchResult {
            id: "02.47".into(),
            chapter: 2,
            verse: 47,
            text: "Chapter 2, Verse 47\n\nDo your duty.".into(),
            sanskrit: None,
            score: 0.9,
            rank: 1,
        }];
        let formatted = retriever.format_search_results(&results);
        assert!(formatted.starts_with("[2.47] Chapter 2, Verse 47"));
    }
}
