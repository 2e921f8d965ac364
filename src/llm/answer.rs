use log::{debug, error};

use crate::document::Chunk;
use crate::error::{RagError, RagResult};
use crate::providers::CompletionProvider;

pub const PROMPT_TEMPLATE: &str = "You are an expert research assistant. Use the provided context to answer the query. \
If unsure, state that you don't know. Be concise and factual (max 3 sentences).

Query: {user_query}
Context: {document_context}
Answer:";

/// Fills [`PROMPT_TEMPLATE`] from retrieved chunks and asks the language model.
pub struct AnswerGenerator {
    provider: Box<dyn CompletionProvider + Send + Sync>,
}

impl AnswerGenerator {
    pub fn new(provider: Box<dyn CompletionProvider + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Chunk texts in the order given, separated by a blank line.
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn build_prompt(query: &str, chunks: &[Chunk]) -> String {
        // Context first so a query containing the placeholder is left alone
        PROMPT_TEMPLATE
            .replace("{document_context}", &Self::build_context(chunks))
            .replacen("{user_query}", query, 1)
    }

    /// The model output is returned untouched.
    pub async fn generate(&self, query: &str, context_chunks: &[Chunk]) -> RagResult<String> {
        let prompt = Self::build_prompt(query, context_chunks);
        debug!("Prompt is {} chars with {} context chunks", prompt.len(), context_chunks.len());

        self.provider.complete(&prompt).await.map_err(|e| {
            error!("Generation failed: {}", e);
            RagError::Generation(e.to_string())
        })
    }
}
