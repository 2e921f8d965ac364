//! Wires storage, loading, chunking, indexing and generation together.
//!
//! A [`RagPipeline`] owns its index. Documents ingested into one pipeline are
//! never visible to another, so callers that need isolation (one index per
//! chat session, say) create one pipeline each through [`PipelineFactory`].

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::{PdfLoader, TextChunker};
use crate::error::{RagError, RagResult};
use crate::llm::{AnswerGenerator, EmbeddingGenerator, SemanticSearch};
use crate::providers::{self, CompletionProvider, EmbeddingProvider};
use crate::storage::FileStore;

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: Uuid,
    pub file_name: String,
    pub path: PathBuf,
    pub pages: usize,
    pub chunks: usize,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub documents: usize,
    pub chunks: usize,
    pub embedding_model: String,
    pub embedding_dimension: Option<usize>,
    pub storage_dir: PathBuf,
    pub ingested: Vec<IngestReport>,
}

pub struct RagPipeline {
    top_k: usize,
    store: FileStore,
    loader: PdfLoader,
    chunker: TextChunker,
    index: SemanticSearch,
    generator: AnswerGenerator,
    ingested: RwLock<Vec<IngestReport>>,
}

impl RagPipeline {
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Box<dyn CompletionProvider + Send + Sync>,
    ) -> RagResult<Self> {
        config.validate()?;

        Ok(Self {
            top_k: config.top_k,
            store: FileStore::new(&config.storage_dir),
            loader: PdfLoader::new(),
            chunker: TextChunker::new(config.chunk)?,
            index: SemanticSearch::new(EmbeddingGenerator::new(embedder)),
            generator: AnswerGenerator::new(llm),
            ingested: RwLock::new(Vec::new()),
        })
    }

    /// Builds the backends described by `config`.
    pub fn from_config(config: &RagConfig) -> RagResult<Self> {
        let embedder = providers::create_embedding_provider(&config.embedding)?;
        let llm = providers::create_completion_provider(&config.generation)?;
        Self::new(config, embedder, llm)
    }

    /// store, load, chunk, index. Nothing reaches the index unless every
    /// chunk of the document was embedded.
    pub async fn ingest(&self, bytes: &[u8], file_name: &str) -> RagResult<IngestReport> {
        info!("Ingesting {} ({} bytes)", file_name, bytes.len());

        let path = self.store.save(bytes, file_name).await?;
        let pages = self.loader.load(&path).await?;
        let chunks = self.chunker.split(&pages);

        if chunks.is_empty() {
            warn!("{} has no extractable text; nothing was indexed", file_name);
        }

        let document_id = pages
            .first()
            .map(|p| p.document_id)
            .unwrap_or_else(Uuid::new_v4);
        let chunk_count = self.index.add(chunks).await?;

        let report = IngestReport {
            document_id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.to_string()),
            path,
            pages: pages.len(),
            chunks: chunk_count,
            ingested_at: Utc::now(),
        };
        self.ingested.write().push(report.clone());

        info!(
            "Document {} processed: {} pages, {} chunks",
            report.file_name, report.pages, report.chunks
        );
        Ok(report)
    }

    /// Ingests a file already on disk as if it had been uploaded.
    pub async fn ingest_path(&self, path: &Path) -> RagResult<IngestReport> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RagError::storage(path, e))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RagError::storage(path, "path has no file name"))?;

        self.ingest(&bytes, file_name).await
    }

    pub async fn ask(&self, query: &str) -> RagResult<String> {
        if self.index.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let results = self.index.search(query, self.top_k).await?;
        info!("Retrieved {} chunks for query", results.len());

        let context: Vec<_> = results.into_iter().map(|r| r.chunk).collect();
        self.generator.generate(query, &context).await
    }

    pub fn is_ready(&self) -> bool {
        !self.index.is_empty()
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            documents: self.index.document_count(),
            chunks: self.index.len(),
            embedding_model: self.index.model_name().to_string(),
            embedding_dimension: self.index.dimension(),
            storage_dir: self.store.root().to_path_buf(),
            ingested: self.ingested.read().clone(),
        }
    }

    /// Removes every stored upload of this pipeline. The index is untouched.
    pub async fn remove_uploads(&self) -> RagResult<()> {
        self.store.remove_all().await
    }

    pub fn index(&self) -> &SemanticSearch {
        &self.index
    }
}

/// Creates independent pipelines that share backend connections.
#[derive(Clone)]
pub struct PipelineFactory {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Box<dyn CompletionProvider + Send + Sync>,
}

impl PipelineFactory {
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Box<dyn CompletionProvider + Send + Sync>,
    ) -> RagResult<Self> {
        config.validate()?;
        Ok(Self { config, embedder, llm })
    }

    pub fn from_config(config: RagConfig) -> RagResult<Self> {
        let embedder = providers::create_embedding_provider(&config.embedding)?;
        let llm = providers::create_completion_provider(&config.generation)?;
        Self::new(config, embedder, llm)
    }

    /// Uploads for the session go to their own subdirectory.
    pub fn create_for_session(&self, session_id: Uuid) -> RagResult<RagPipeline> {
        let config = RagConfig {
            storage_dir: self.config.storage_dir.join(session_id.to_string()),
            ..self.config.clone()
        };
        RagPipeline::new(&config, self.embedder.clone(), self.llm.clone())
    }
}
