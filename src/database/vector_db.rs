use log::debug;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::document::Chunk;

#[derive(Error, Debug, PartialEq)]
pub enum VectorStoreError {
    #[error("Got {vectors} vectors for {chunks} chunks")]
    CountMismatch { chunks: usize, vectors: usize },
    #[error("Vector dimension {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Empty embedding vector")]
    EmptyVector,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// In-memory chunk index searched by exhaustive cosine similarity.
///
/// Entries are append-only and kept in insertion order, which is also the
/// tie-break order for equal scores. Clones share the same underlying index.
#[derive(Clone, Default)]
pub struct VectorStore {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends all pairs or none of them.
    pub fn insert_batch(&self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<usize, VectorStoreError> {
        if chunks.len() != vectors.len() {
            return Err(VectorStoreError::CountMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut entries = self.entries.write();

        let expected = match entries.first() {
            Some(entry) => entry.vector.len(),
            None => vectors[0].len(),
        };
        for vector in &vectors {
            if vector.is_empty() {
                return Err(VectorStoreError::EmptyVector);
            }
            if vector.len() != expected {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    found: vector.len(),
                });
            }
        }

        let added = chunks.len();
        entries.extend(chunks.into_iter().zip(vectors).map(|(chunk, vector)| Entry {
            norm: l2_norm(&vector),
            chunk,
            vector,
        }));
        debug!("Vector store grew by {} to {} entries", added, entries.len());

        Ok(added)
    }

    /// Returns up to `k` chunks, best match first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, VectorStoreError> {
        let entries = self.entries.read();
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let expected = entries[0].vector.len();
        if query.len() != expected {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                found: query.len(),
            });
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine(query, query_norm, &entry.vector, entry.norm)))
            .collect();

        // Stable sort keeps insertion order among equal scores; NaN ranks last
        scored.sort_by(|a, b| rank(b.1).total_cmp(&rank(a.1)));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredChunk {
                chunk: entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.entries.read().first().map(|e| e.vector.len())
    }

    /// Number of distinct ingested documents with at least one chunk.
    pub fn document_count(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|e| e.chunk.document_id)
            .collect::<HashSet<Uuid>>()
            .len()
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn rank(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
