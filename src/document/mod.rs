//! PDF ingestion: page extraction and fixed-window chunking.

mod chunker;
mod loader;
mod models;

pub use chunker::TextChunker;
pub use loader::PdfLoader;
pub use models::{Chunk, Document};
