//! Harmonic-projection text embedding.
//!
//! Deterministic and training-free: each token is encoded as a base-2^16
//! integer over its Unicode code points, reduced modulo a set of coprime
//! moduli, and projected onto the unit circle per modulus. Token vectors are
//! mean-pooled and L2-normalized, so the inner product of two embeddings is
//! their cosine similarity.
//!
//! The same text always yields a bit-identical vector, across instances and
//! across runs, which keeps the persisted index reproducible.

use std::f64::consts::PI;

/// Embedding dimension: two circle coordinates per modulus.
pub const EMBEDDING_DIM: usize = 384;

const NUM_MODULI: usize = EMBEDDING_DIM / 2;

/// Unicode code points considered per token.
const MAX_TOKEN_CHARS: usize = 64;

/// Identifier recorded in the index snapshot; a different embedder forces
/// a rebuild.
pub const EMBEDDER_ID: &str = "htp-384";

/// Deterministic embedding function over verse texts and queries.
#[derive(Debug, Clone)]
pub struct Embedder {
    moduli: Vec<u64>,
}

impl Embedder {
    pub fn new() -> Self {
        Self {
            moduli: first_primes(NUM_MODULI),
        }
    }

    /// Embed a single text. Empty/tokenless input yields the zero vector.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vec![0.0; EMBEDDING_DIM];
        }

        let mut pooled = vec![0.0f64; EMBEDDING_DIM];
        for token in &tokens {
            let n = token_to_integer(token);
            for (slot, &m) in self.moduli.iter().enumerate() {
                let theta = 2.0 * PI * ((n % m) as f64) / (m as f64);
                pooled[2 * slot] += theta.sin();
                pooled[2 * slot + 1] += theta.cos();
            }
        }

        let count = tokens.len() as f64;
        for value in &mut pooled {
            *value /= count;
        }

        let norm: f64 = pooled.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            pooled.iter().map(|x| (*x / norm) as f32).collect()
        } else {
            pooled.iter().map(|x| *x as f32).collect()
        }
    }

    pub fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner product of two vectors. Over L2-normalized inputs this is the
/// cosine similarity.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Lowercased word tokens split on whitespace and ASCII punctuation.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}

/// Token as a base-2^16 integer over its code points, wrapping on overflow.
fn token_to_integer(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_CHARS)
        .fold(0u64, |n, c| n.wrapping_mul(65536).wrapping_add(c as u64))
}

/// First `n` primes by trial division; pairwise coprime by construction.
fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate: u64 = 2;
    while primes.len() < n {
        if primes.iter().all(|p| candidate % p != 0) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}
