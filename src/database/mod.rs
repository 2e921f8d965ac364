pub mod vector_db;

pub use vector_db::{ScoredChunk, VectorStore, VectorStoreError};
