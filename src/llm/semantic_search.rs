use log::{debug, info};

use crate::database::{ScoredChunk, VectorStore};
use crate::document::Chunk;
use crate::error::{RagError, RagResult};
use crate::llm::embeddings::EmbeddingGenerator;

/// The embedding index: chunk vectors in a [`VectorStore`], queried by text.
#[derive(Clone)]
pub struct SemanticSearch {
    generator: EmbeddingGenerator,
    store: VectorStore,
}

impl SemanticSearch {
    pub fn new(generator: EmbeddingGenerator) -> Self {
        Self::with_store(generator, VectorStore::new())
    }

    pub fn with_store(generator: EmbeddingGenerator, store: VectorStore) -> Self {
        Self { generator, store }
    }

    /// Embeds every chunk, then stores them together. On error the index is
    /// left exactly as it was.
    pub async fn add(&self, chunks: Vec<Chunk>) -> RagResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.generator.generate_batch_embeddings(&texts).await?;

        let added = self
            .store
            .insert_batch(chunks, vectors)
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        info!("Indexed {} chunks ({} total)", added, self.store.len());
        Ok(added)
    }

    pub async fn search(&self, query: &str, k: usize) -> RagResult<Vec<ScoredChunk>> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.generator.generate_embedding(query).await?;
        let results = self
            .store
            .search(&query_vector, k)
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        debug!("Search returned {} of {} chunks", results.len(), self.store.len());
        for hit in &results {
            debug!("  {:.4} {}", hit.score, hit.chunk);
        }
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.store.document_count()
    }

    /// Vector size of the indexed chunks, once anything is indexed.
    pub fn dimension(&self) -> Option<usize> {
        self.store.dimension()
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LetterEmbedder;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        let document_id = Uuid::new_v4();
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk {
                id: Uuid::new_v4(),
                document_id,
                text: t.to_string(),
                start_index: i * 10,
                page_number: 1,
                chunk_index: i,
                source: PathBuf::from("doc.pdf"),
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_index_search_is_empty_without_backend_call() {
        let embedder = LetterEmbedder::failing();
        let index = SemanticSearch::new(EmbeddingGenerator::new(embedder));
        assert!(index.search("anything", 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn returns_k_or_fewer() {
        let index = SemanticSearch::new(EmbeddingGenerator::new(LetterEmbedder::new()));
        index.add(chunks(&["apple", "banana", "cherry"])).await.unwrap();

        assert_eq!(index.search("apple", 2).await.unwrap().len(), 2);
        assert_eq!(index.search("apple", 4).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn most_similar_chunk_ranks_first() {
        let index = SemanticSearch::new(EmbeddingGenerator::new(LetterEmbedder::new()));
        index.add(chunks(&["zzz zebra", "banana bandana", "xylophone"])).await.unwrap();

        let results = index.search("bananas", 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "banana bandana");
    }

    #[tokio::test]
    async fn failed_add_leaves_index_unchanged() {
        let embedder = LetterEmbedder::new();
        let index = SemanticSearch::new(EmbeddingGenerator::new(embedder.clone()));
        index.add(chunks(&["kept"])).await.unwrap();

        embedder.set_failing(true);
        let err = index.add(chunks(&["lost", "also lost"])).await.unwrap_err();

        assert!(matches!(err, RagError::Embedding(_)));
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn adding_same_chunks_twice_doubles_candidates() {
        let index = SemanticSearch::new(EmbeddingGenerator::new(LetterEmbedder::new()));
        index.add(chunks(&["one", "two"])).await.unwrap();
        index.add(chunks(&["one", "two"])).await.unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.search("one", 10).await.unwrap().len(), 4);
    }
}
