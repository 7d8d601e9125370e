//! Answer composition from retrieved passages.
//!
//! Generation backends are best-effort; extraction is the guaranteed
//! baseline. Any backend failure falls back to the extractive answer rather
//! than surfacing an error, and the caller learns which mode actually ran.

use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::generator::{
    GeminiGenerator, OllamaGenerator, OpenAiGenerator, TextGenerator,
};
use crate::core::citation::{build_citation, extract_citations_from_text};
use crate::search::retriever::SearchResult;

/// The only instructions any generation backend ever sees, alongside the
/// context block. Outside knowledge is forbidden and inline citations are
/// mandatory so that answers stay checkable against the supplied passages.
pub const SYSTEM_PROMPT: &str = "\
You answer life skills questions using only the provided Bhagavad Gita passages.

Instructions:
- Write 3-6 sentences maximum
- Put citations like [chapter.verse] after supporting sentences
- If passages don't contain an answer, say so briefly and show 1-3 related verses
- Keep a respectful, neutral tone
- No medical or legal advice
- Never invent facts or verses not in the provided passages
- Always base your answer on the given verses only";

/// Response when retrieval produced nothing usable.
pub const NO_MATCH_MESSAGE: &str =
    "I couldn't find relevant verses in the Bhagavad Gita to answer your question.";

/// Sentences shorter than this are skipped during extraction.
const MIN_SENTENCE_CHARS: usize = 20;

lazy_static! {
    static ref SENTENCE_SPLIT_RE: Regex = Regex::new(r"[.!?]+").unwrap();
}

/// Requested generation mode. Everything except `Extractive` wraps an
/// external service and may fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    Extractive,
    Gemini,
    Openai,
    Ollama,
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnswerMode::Extractive => "extractive",
            AnswerMode::Gemini => "gemini",
            AnswerMode::Openai => "openai",
            AnswerMode::Ollama => "ollama",
        };
        write!(f, "{}", name)
    }
}

impl AnswerMode {
    /// The backend for a non-extractive mode.
    pub fn generator(self) -> Option<Box<dyn TextGenerator>> {
        match self {
            AnswerMode::Extractive => None,
            AnswerMode::Gemini => Some(Box::new(GeminiGenerator::new())),
            AnswerMode::Openai => Some(Box::new(OpenAiGenerator::new())),
            AnswerMode::Ollama => Some(Box::new(OllamaGenerator::new())),
        }
    }
}

/// Final answer text plus the mode that actually produced it.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutput {
    pub text: String,
    pub mode_used: AnswerMode,
}

/// Advisory report of answer citations against the supplied passages.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerValidation {
    pub valid: bool,
    pub invalid_citations: Vec<String>,
    pub answer_citations: Vec<String>,
    pub passage_citations: Vec<String>,
}

pub struct Answerer;

impl Answerer {
    pub fn new() -> Self {
        Self
    }

    /// `"{citation} {text}"` blocks separated by blank lines; the only
    /// context any backend is ever given.
    pub fn format_context_block(passages: &[SearchResult]) -> String {
        passages
            .iter()
            .map(|p| format!("{} {}", p.citation(), p.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Produce the final answer for the requested mode.
    ///
    /// Non-extractive modes try their backend first; any error there falls
    /// back to extraction. Zero passages short-circuit to the fixed no-match
    /// message before any backend is contacted.
    pub fn generate_answer(
        &self,
        query: &str,
        passages: &[SearchResult],
        mode: AnswerMode,
    ) -> AnswerOutput {
        if passages.is_empty() {
            return AnswerOutput {
                text: NO_MATCH_MESSAGE.to_string(),
                mode_used: AnswerMode::Extractive,
            };
        }

        match mode.generator() {
            Some(generator) => self.generate_with(generator.as_ref(), mode, query, passages),
            None => AnswerOutput {
                text: self.extractive_answer(query, passages),
                mode_used: AnswerMode::Extractive,
            },
        }
    }

    /// Run one backend with the extractive fallback wrapped around it.
    pub fn generate_with(
        &self,
        generator: &dyn TextGenerator,
        mode: AnswerMode,
        query: &str,
        passages: &[SearchResult],
    ) -> AnswerOutput {
        if passages.is_empty() {
            return AnswerOutput {
                text: NO_MATCH_MESSAGE.to_string(),
                mode_used: AnswerMode::Extractive,
            };
        }

        let context = Self::format_context_block(passages);
        match generator.generate(SYSTEM_PROMPT, &context, query) {
            Ok(text) => AnswerOutput {
                text,
                mode_used: mode,
            },
            Err(err) => {
                eprintln!("{} generation failed, using extractive answer: {}", generator.name(), err);
                AnswerOutput {
                    text: self.extractive_answer(query, passages),
                    mode_used: AnswerMode::Extractive,
                }
            }
        }
    }

    /// The guaranteed extraction path.
    ///
    /// Takes the top passage, splits on sentence-ending punctuation, and
    /// among sentences of at least [`MIN_SENTENCE_CHARS`] picks the one
    /// whose lowercase word set overlaps the query's most (strict `>`, so
    /// the first of tied sentences wins). Falls back to the text up to the
    /// first period when nothing scores.
    pub fn extractive_answer(&self, query: &str, passages: &[SearchResult]) -> String {
        let Some(best_passage) = passages.first() else {
            return NO_MATCH_MESSAGE.to_string();
        };

        let query_lower = query.to_lowercase();
        let query_words: HashSet<&str> = query_lower.split_whitespace().collect();

        let mut best_sentence = String::new();
        let mut best_score = 0usize;

        for sentence in SENTENCE_SPLIT_RE.split(&best_passage.text) {
            let sentence = sentence.trim();
            if sentence.chars().count() < MIN_SENTENCE_CHARS {
                continue;
            }

            let sentence_lower = sentence.to_lowercase();
            let sentence_words: HashSet<&str> = sentence_lower.split_whitespace().collect();
            let score = query_words.intersection(&sentence_words).count();

            if score > best_score {
                best_score = score;
                best_sentence = sentence.to_string();
            }
        }

        if best_sentence.is_empty() {
            let head = best_passage.text.split('.').next().unwrap_or("").trim();
            best_sentence = format!("{}.", head);
        }

        let mut answer = format!(
            "The Bhagavad Gita teaches: {} {}",
            best_sentence,
            best_passage.citation()
        );

        if passages.len() > 1 {
            let related: Vec<String> = passages[1..passages.len().min(3)]
                .iter()
                .map(|p| p.citation())
                .collect();
            answer.push_str(&format!("\n\nRelated guidance: {}", related.join(", ")));
        }

        answer
    }

    /// Cross-check the answer's embedded citations against the passages it
    /// was generated from. Advisory: callers may log or report, nothing is
    /// enforced before the answer reaches the user.
    pub fn validate_answer(&self, answer: &str, passages: &[SearchResult]) -> AnswerValidation {
        let answer_citations = dedup_in_order(extract_citations_from_text(answer));

        let passage_citations = dedup_in_order(
            passages
                .iter()
                .map(|p| build_citation(p.chapter, p.verse))
                .collect(),
        );

        let passage_set: HashSet<&String> = passage_citations.iter().collect();
        let invalid_citations: Vec<String> = answer_citations
            .iter()
            .filter(|c| !passage_set.contains(c))
            .cloned()
            .collect();

        AnswerValidation {
            valid: invalid_citations.is_empty(),
            invalid_citations,
            answer_citations,
            passage_citations,
        }
    }
}

impl Default for Answerer {
    fn default() -> Self {
        Self::new()
    }
}

/// Deduplicate preserving first-seen order, keeping reports deterministic.
fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::generator::GenerateError;

    fn passage(chapter: u32, verse: u32, text: &str) -> SearchResult {
        SearchResult {
            id: format!("{:02}.{:02}", chapter, verse),
            chapter,
            verse,
            text: text.to_string(),
            sanskrit: None,
            score: 0.9,
            rank: 1,
        }
    }

    struct UnavailableGenerator;

    impl TextGenerator for UnavailableGenerator {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn is_available(&self) -> bool {
            false
        }
        fn generate(&self, _: &str, _: &str, _: &str) -> Result<String, GenerateError> {
            Err(GenerateError::Unavailable("no credentials".into()))
        }
    }

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn generate(&self, _: &str, context: &str, _: &str) -> Result<String, GenerateError> {
            Ok(format!("generated over: {}", context))
        }
    }

    #[test]
    fn test_context_block_layout() {
        let passages = vec![
            passage(2, 47, "Do your duty."),
            passage(2, 48, "Be steadfast."),
        ];
        let context = Answerer::format_context_block(&passages);
        assert_eq!(context, "[2.47] Do your duty.\n\n[2.48] Be steadfast.");
    }

    #[test]
    fn test_extractive_answer_end_to_end() {
        let answerer = Answerer::new();
        let passages = vec![passage(
            2,
            47,
            "You have a right to perform your duty. Do your duty without attachment to results always.",
        )];

        let answer = answerer.extractive_answer("duty", &passages);
        assert!(answer.contains("The Bhagavad Gita teaches:"));
        assert!(answer.ends_with("[2.47]"));
    }

    #[test]
    fn test_extractive_picks_highest_overlap_sentence() {
        let answerer = Answerer::new();
        let passages = vec![passage(
            2,
            47,
            "The wise grieve neither for the living nor the dead. \
             Focus on your duty and your work without any attachment.",
        )];

        let answer = answerer.extractive_answer("how do I focus on duty and work", &passages);
        assert!(answer.contains("Focus on your duty"));
    }

    #[test]
    fn test_extractive_falls_back_to_first_period() {
        let answerer = Answerer::new();
        let passages = vec![passage(2, 47, "Equanimity is called yoga. Short tail")];

        let answer = answerer.extractive_answer("zzz qqq", &passages);
        assert!(answer.contains("Equanimity is called yoga."));
    }

    #[test]
    fn test_extractive_adds_related_guidance() {
        let answerer = Answerer::new();
        let passages = vec![
            passage(2, 47, "Do your duty without attachment to the results."),
            passage(2, 48, "Be steadfast in yoga while performing actions."),
            passage(2, 49, "Seek refuge in wisdom and even-mindedness."),
            passage(2, 50, "Yoga is skill in action and in stillness."),
        ];

        let answer = answerer.extractive_answer("duty", &passages);
        assert!(answer.contains("Related guidance: [2.48], [2.49]"));
        assert!(!answer.contains("[2.50]"));
    }

    #[test]
    fn test_zero_passages_returns_no_match() {
        let answerer = Answerer::new();
        let out = answerer.generate_answer("anything", &[], AnswerMode::Gemini);
        assert_eq!(out.text, NO_MATCH_MESSAGE);
        assert_eq!(out.mode_used, AnswerMode::Extractive);
    }

    #[test]
    fn test_unavailable_backend_matches_extractive_exactly() {
        let answerer = Answerer::new();
        let passages = vec![
            passage(2, 47, "Do your duty without attachment to the results."),
            passage(2, 48, "Be steadfast in yoga while performing actions."),
        ];

        let fallback = answerer.generate_with(
            &UnavailableGenerator,
            AnswerMode::Gemini,
            "duty",
            &passages,
        );
        let extractive = answerer.generate_answer("duty", &passages, AnswerMode::Extractive);

        assert_eq!(fallback.text, extractive.text);
        assert_eq!(fallback.mode_used, AnswerMode::Extractive);
    }

    #[test]
    fn test_successful_backend_reports_its_mode() {
        let answerer = Answerer::new();
        let passages = vec![passage(2, 47, "Do your duty.")];

        let out = answerer.generate_with(&EchoGenerator, AnswerMode::Ollama, "duty", &passages);
        assert_eq!(out.mode_used, AnswerMode::Ollama);
        assert!(out.text.contains("[2.47] Do your duty."));
    }

    #[test]
    fn test_validate_answer_flags_outside_citations() {
        let answerer = Answerer::new();
        let passages = vec![passage(3, 1, "Some verse text.")];

        let report = answerer.validate_answer("Act well [2.47] and rest [3.1].", &passages);
        assert!(!report.valid);
        assert_eq!(report.invalid_citations, vec!["[2.47]"]);
        assert_eq!(report.answer_citations, vec!["[2.47]", "[3.1]"]);
        assert_eq!(report.passage_citations, vec!["[3.1]"]);
    }

    #[test]
    fn test_validate_answer_accepts_covered_citations() {
        let answerer = Answerer::new();
        let passages = vec![passage(2, 47, "text"), passage(2, 48, "text")];

        let report = answerer.validate_answer("Do it [2.47]. Again [2.47] and [2.48].", &passages);
        assert!(report.valid);
        assert!(report.invalid_citations.is_empty());
        assert_eq!(report.answer_citations, vec!["[2.47]", "[2.48]"]);
    }
}
