pub mod ollama;
pub mod openai;
pub mod traits;
pub mod utils;

use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{RagError, RagResult};

pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use traits::{CompletionProvider, EmbeddingProvider};

pub fn create_embedding_provider(config: &ProviderConfig) -> RagResult<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.kind {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(config).map_err(config_error)?),
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(config).map_err(config_error)?),
    };
    Ok(provider)
}

pub fn create_completion_provider(
    config: &ProviderConfig,
) -> RagResult<Box<dyn CompletionProvider + Send + Sync>> {
    let provider: Box<dyn CompletionProvider + Send + Sync> = match config.kind {
        ProviderKind::Ollama => Box::new(OllamaProvider::new(config).map_err(config_error)?),
        ProviderKind::OpenAI => Box::new(OpenAIProvider::new(config).map_err(config_error)?),
    };
    Ok(provider)
}

fn config_error(e: anyhow::Error) -> RagError {
    RagError::Config(format!("Failed to initialize provider: {}", e))
}
