use futures::future::try_join_all;
use log::debug;
use std::sync::Arc;

use crate::error::{RagError, RagResult};
use crate::providers::EmbeddingProvider;

const DEFAULT_BATCH_SIZE: usize = 32;

/// Batches texts through an [`EmbeddingProvider`] and checks what comes back.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub async fn generate_embedding(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut vectors = self.generate_batch_embeddings(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("backend returned no vector".to_string()))
    }

    /// All-or-nothing: any failing batch fails the whole call.
    pub async fn generate_batch_embeddings(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let batches = texts.chunks(self.batch_size).map(|batch| async move {
            let vectors = self
                .provider
                .embed(batch)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;

            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "backend returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }
            Ok(vectors)
        });

        // try_join_all keeps batch order and stops at the first failure
        let embeddings: Vec<Vec<f32>> = try_join_all(batches).await?.into_iter().flatten().collect();

        if let Some(first) = embeddings.first() {
            let dimension = first.len();
            if dimension == 0 {
                return Err(RagError::Embedding("backend returned an empty vector".to_string()));
            }
            if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
                return Err(RagError::Embedding(format!(
                    "inconsistent embedding size: {} (expected {})",
                    bad.len(),
                    dimension
                )));
            }
        }

        debug!("Embedded {} texts with {}", texts.len(), self.model_name());
        Ok(embeddings)
    }
}
