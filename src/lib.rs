//! gita-query library
//!
//! Citation-grounded retrieval and answering over the Bhagavad Gita.
//!
//! # Modules
//!
//! - `core`: Verse data model, schema normalization, citations, safety filter
//! - `search`: Deterministic embeddings, persisted flat index, retriever
//! - `answer`: Extractive answers, generation backends, citation validation
//! - `engine`: Read-only query context wiring the pieces together

pub mod answer;
pub mod core;
pub mod engine;
pub mod search;

// Re-exports for convenience
pub use crate::core::citation::{build_citation, extract_citations_from_text, parse_citation};
pub use crate::core::dataset::load_corpus;
pub use crate::core::safety::{safety_check, DEFLECTION_MESSAGE};
pub use crate::core::verse::{create_verse_id, Verse};
pub use answer::answerer::{AnswerMode, Answerer};
pub use engine::{AskResponse, GitaEngine};
pub use search::retriever::{BestAnswerBundle, Retriever, SearchResult};
