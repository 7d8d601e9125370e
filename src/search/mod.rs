//! Semantic search over the verse corpus.
//!
//! A deterministic embedding function, a persisted flat inner-product index,
//! and the exhaustive-search-then-rank retriever on top of them.

pub mod embedding;
pub mod index;
pub mod retriever;

pub use embedding::{Embedder, EMBEDDING_DIM};
pub use index::VerseIndex;
pub use retriever::{BestAnswerBundle, Retriever, SearchResult};
