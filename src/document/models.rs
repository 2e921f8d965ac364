use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier shared by every page of the same ingested file
    pub document_id: Uuid,
    pub text: String,
    pub source: PathBuf,
    /// 1-based page number
    pub page_number: usize,
}

impl Document {
    pub fn new(document_id: Uuid, text: String, source: impl Into<PathBuf>, page_number: usize) -> Self {
        Self {
            document_id,
            text,
            source: source.into(),
            page_number,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A bounded slice of a [`Document`]'s text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text: String,
    /// Offset of the first character within the source page, in characters
    pub start_index: usize,
    pub page_number: usize,
    /// Position of this chunk among the chunks of its page
    pub chunk_index: usize,
    pub source: PathBuf,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} p.{} #{} (@{}, {} chars)",
            self.source.display(),
            self.page_number,
            self.chunk_index,
            self.start_index,
            self.char_len()
        )
    }
}
