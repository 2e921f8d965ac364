//! Splits page text into overlapping, fixed-size windows.
//!
//! Lengths and offsets are counted in characters, never bytes, so a window
//! boundary can't land inside a multi-byte sequence.

use std::iter;
use uuid::Uuid;

use crate::config::ChunkConfig;
use crate::error::RagResult;

use super::models::{Chunk, Document};

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }
}

impl TextChunker {
    /// Fails with a configuration error when `overlap >= max_len`.
    pub fn new(config: ChunkConfig) -> RagResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        if document.is_blank() {
            return Vec::new();
        }

        windows(&document.text, self.config.max_len, self.config.stride())
            .into_iter()
            .enumerate()
            .map(|(chunk_index, (start_index, text))| Chunk {
                id: Uuid::new_v4(),
                document_id: document.document_id,
                text: text.to_string(),
                start_index,
                page_number: document.page_number,
                chunk_index,
                source: document.source.clone(),
            })
            .collect()
    }
}

/// Returns `(char_offset, slice)` pairs. The last window may be shorter than
/// `max_len`; every other window is exactly `max_len` characters.
fn windows(text: &str, max_len: usize, stride: usize) -> Vec<(usize, &str)> {
    // Byte offset of every char boundary, including the end of the string
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(text.len()))
        .collect();
    let total = boundaries.len() - 1;

    let mut out = Vec::new();
    if total == 0 {
        return out;
    }

    let mut start = 0;
    loop {
        let end = (start + max_len).min(total);
        out.push((start, &text[boundaries[start]..boundaries[end]]));
        if end == total {
            break;
        }
        start += stride;
    }
    out
}
