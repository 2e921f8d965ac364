use log::{info, warn};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{RagError, RagResult};

use super::models::Document;

const PDF_MARKER: &[u8] = b"%PDF-";
const HEADER_WINDOW: usize = 1024;

/// Extracts per-page text from PDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    pub async fn load(&self, path: &Path) -> RagResult<Vec<Document>> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RagError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
        self.load_bytes(bytes, path).await
    }

    /// Parses an in-memory PDF. `source` is only recorded as metadata.
    pub async fn load_bytes(&self, bytes: Vec<u8>, source: &Path) -> RagResult<Vec<Document>> {
        let source = source.to_path_buf();
        let label = source.display().to_string();

        // Extraction is CPU-bound, and pdf-extract may panic on malformed input
        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| RagError::Parse(format!("PDF extraction aborted for {}: {}", label, e)))??;

        let document_id = Uuid::new_v4();
        let documents = into_documents(document_id, pages, &source);

        let blank = documents.iter().filter(|d| d.is_blank()).count();
        if blank > 0 {
            warn!("{} of {} pages in {} have no extractable text", blank, documents.len(), source.display());
        }
        info!("Loaded {} pages from {}", documents.len(), source.display());

        Ok(documents)
    }
}

/// Readers accept the `%PDF-` marker anywhere in the first kilobyte.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_WINDOW)];
    head.windows(PDF_MARKER.len()).any(|w| w == PDF_MARKER)
}

fn extract_pages(bytes: &[u8]) -> RagResult<Vec<String>> {
    if !has_pdf_header(bytes) {
        return Err(RagError::Parse("Not a PDF: missing %PDF- header".to_string()));
    }

    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| RagError::Parse(format!("Not a readable PDF: {}", e)))
}

fn into_documents(document_id: Uuid, pages: Vec<String>, source: &Path) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| Document::new(document_id, text, PathBuf::from(source), i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::build_pdf;

    #[tokio::test]
    async fn single_page_text_is_extracted() {
        let bytes = build_pdf(&["Hello world"]);
        let docs = PdfLoader::new()
            .load_bytes(bytes, Path::new("hello.pdf"))
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_number, 1);
        assert_eq!(docs[0].source, PathBuf::from("hello.pdf"));
        assert!(docs[0].text.contains("Hello world"));
    }

    #[tokio::test]
    async fn empty_pages_are_kept_to_preserve_numbering() {
        let bytes = build_pdf(&["first", "", "third"]);
        let docs = PdfLoader::new()
            .load_bytes(bytes, Path::new("gaps.pdf"))
            .await
            .unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs.iter().map(|d| d.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(docs[1].is_blank());
        assert!(docs[2].text.contains("third"));
        assert!(docs.iter().all(|d| d.document_id == docs[0].document_id));
    }

    #[tokio::test]
    async fn garbage_bytes_are_a_parse_error() {
        let err = PdfLoader::new()
            .load_bytes(b"definitely not a pdf".to_vec(), Path::new("junk.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, RagError::Parse(_)));
    }

    #[tokio::test]
    async fn text_without_pdf_header_is_rejected() {
        let err = PdfLoader::new()
            .load_bytes(b"Hello world, plain text".to_vec(), Path::new("notes.pdf"))
            .await
            .unwrap_err();

        match err {
            RagError::Parse(message) => assert!(message.contains("%PDF-")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn header_may_follow_leading_bytes() {
        let mut bytes = b"\xEF\xBB\xBF\r\n".to_vec();
        bytes.extend_from_slice(&build_pdf(&["x"]));

        assert!(has_pdf_header(&bytes));
        assert!(!has_pdf_header(b"%PD"));
        assert!(!has_pdf_header(&[b' '; 2048]));
    }

    #[tokio::test]
    async fn missing_file_is_a_parse_error() {
        let err = PdfLoader::new()
            .load(Path::new("/nonexistent/nowhere.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, RagError::Parse(_)));
    }

    #[tokio::test]
    async fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.pdf");
        std::fs::write(&path, build_pdf(&["on disk"])).unwrap();

        let docs = PdfLoader::new().load(&path).await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, path);
    }
}
