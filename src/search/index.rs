//! Persisted flat vector index over the verse corpus.
//!
//! One SQLite file holds the verse rows, the embedding blobs, and a small
//! meta table tagging the snapshot with a schema version and the embedder
//! identifier. A mismatched snapshot is refused on open so the caller
//! rebuilds instead of serving incompatible vectors.
//!
//! There is no incremental update path: any dataset change is a wholesale
//! rebuild, which is cheap for a corpus of a few hundred verses.

use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::embedding::{inner_product, Embedder, EMBEDDING_DIM};
use crate::core::verse::Verse;

/// Bumped whenever the on-disk layout changes.
pub const INDEX_SCHEMA_VERSION: i64 = 1;

/// Snapshot statistics for the status command.
#[derive(Debug)]
pub struct IndexStats {
    pub verse_count: usize,
    pub embedder: String,
    pub built_at: Option<i64>,
}

/// A verse paired with its similarity score for one query.
#[derive(Debug)]
pub struct ScoredVerse<'a> {
    pub verse: &'a Verse,
    pub score: f32,
}

/// Flat exhaustive inner-product index.
///
/// Verses and vectors are loaded into memory on open/build and are read-only
/// for the life of the process; every query scans all of them.
pub struct VerseIndex {
    conn: Connection,
    verses: Vec<Verse>,
    vectors: Vec<Vec<f32>>,
}

impl VerseIndex {
    /// Open an existing snapshot, verifying its version tags.
    pub fn open(db_path: &Path, embedder_id: &str) -> Result<Self> {
        if !db_path.exists() {
            bail!("Index snapshot not found at {}", db_path.display());
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open index at {}", db_path.display()))?;
        Self::load(conn, embedder_id)
    }

    /// Build a snapshot wholesale from the verse store, replacing any
    /// previous contents atomically in one transaction.
    pub fn build(db_path: &Path, verses: &[Verse], embedder: &Embedder) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to create index at {}", db_path.display()))?;
        Self::populate(conn, verses, embedder)
    }

    /// Build an in-memory index (for tests).
    pub fn build_in_memory(verses: &[Verse], embedder: &Embedder) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::populate(conn, verses, embedder)
    }

    fn populate(mut conn: Connection, verses: &[Verse], embedder: &Embedder) -> Result<Self> {
        if verses.is_empty() {
            bail!("Refusing to build an index over zero verses");
        }

        let texts: Vec<String> = verses.iter().map(|v| v.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts);

        let tx = conn.transaction()?;
        tx.execute_batch(
            r#"
            DROP TABLE IF EXISTS verses;
            DROP TABLE IF EXISTS embeddings;
            DROP TABLE IF EXISTS index_meta;

            CREATE TABLE verses (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                chapter INTEGER NOT NULL,
                verse INTEGER NOT NULL,
                text TEXT NOT NULL,
                sanskrit TEXT
            );

            CREATE TABLE embeddings (
                position INTEGER PRIMARY KEY,
                vector BLOB NOT NULL
            );

            CREATE TABLE index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        for (position, (verse, vector)) in verses.iter().zip(vectors.iter()).enumerate() {
            tx.execute(
                "INSERT INTO verses (position, id, chapter, verse, text, sanskrit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    position as i64,
                    verse.id,
                    verse.chapter,
                    verse.verse,
                    verse.text,
                    verse.sanskrit,
                ],
            )?;
            tx.execute(
                "INSERT INTO embeddings (position, vector) VALUES (?1, ?2)",
                params![position as i64, vector_to_blob(vector)],
            )?;
        }

        let meta = [
            ("schema_version", INDEX_SCHEMA_VERSION.to_string()),
            ("embedding_dim", EMBEDDING_DIM.to_string()),
            ("embedder", super::embedding::EMBEDDER_ID.to_string()),
            ("verse_count", verses.len().to_string()),
            ("built_at", chrono::Utc::now().timestamp().to_string()),
        ];
        for (key, value) in meta {
            tx.execute(
                "INSERT INTO index_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        tx.commit()?;

        Ok(Self {
            conn,
            verses: verses.to_vec(),
            vectors,
        })
    }

    fn load(conn: Connection, embedder_id: &str) -> Result<Self> {
        let schema_version = get_meta(&conn, "schema_version")?
            .and_then(|v| v.parse::<i64>().ok())
            .context("Index snapshot has no schema version tag")?;
        if schema_version != INDEX_SCHEMA_VERSION {
            bail!(
                "Index snapshot schema version {} does not match expected {}",
                schema_version,
                INDEX_SCHEMA_VERSION
            );
        }

        let dim = get_meta(&conn, "embedding_dim")?
            .and_then(|v| v.parse::<usize>().ok())
            .context("Index snapshot has no embedding dimension tag")?;
        if dim != EMBEDDING_DIM {
            bail!(
                "Index snapshot embedding dimension {} does not match expected {}",
                dim,
                EMBEDDING_DIM
            );
        }

        let embedder = get_meta(&conn, "embedder")?
            .context("Index snapshot has no embedder tag")?;
        if embedder != embedder_id {
            bail!(
                "Index snapshot was built with embedder '{}', expected '{}'",
                embedder,
                embedder_id
            );
        }

        let mut verses = Vec::new();
        {
            let mut stmt = conn.prepare(
                "SELECT id, chapter, verse, text, sanskrit FROM verses ORDER BY position",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Verse {
                    id: row.get(0)?,
                    chapter: row.get(1)?,
                    verse: row.get(2)?,
                    text: row.get(3)?,
                    sanskrit: row.get(4)?,
                })
            })?;
            for row in rows {
                verses.push(row?);
            }
        }

        let mut vectors = Vec::new();
        {
            let mut stmt = conn.prepare("SELECT vector FROM embeddings ORDER BY position")?;
            let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
            for row in rows {
                let vector = blob_to_vector(&row?);
                if vector.len() != EMBEDDING_DIM {
                    bail!("Index snapshot contains a vector of the wrong dimension");
                }
                vectors.push(vector);
            }
        }

        if verses.len() != vectors.len() || verses.is_empty() {
            bail!(
                "Index snapshot is inconsistent: {} verses, {} vectors",
                verses.len(),
                vectors.len()
            );
        }

        Ok(Self {
            conn,
            verses,
            vectors,
        })
    }

    /// Exhaustive inner-product scan over every stored vector.
    ///
    /// Results are in strictly descending score order; equal scores keep
    /// insertion order, so the ordering is deterministic for a given
    /// snapshot state.
    pub fn search(&self, query_vector: &[f32], top_n: usize) -> Vec<ScoredVerse<'_>> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, inner_product(query_vector, vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_n);

        scored
            .into_iter()
            .map(|(position, score)| ScoredVerse {
                verse: &self.verses[position],
                score,
            })
            .collect()
    }

    /// All verses in insertion order.
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let embedder = get_meta(&self.conn, "embedder")?.unwrap_or_default();
        let built_at = get_meta(&self.conn, "built_at")?.and_then(|v| v.parse::<i64>().ok());
        Ok(IndexStats {
            verse_count: self.verses.len(),
            embedder,
            built_at,
        })
    }
}

fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM index_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| e.into())
}

/// f32 vector to little-endian BLOB.
fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for &value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
