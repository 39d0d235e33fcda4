use serde::{Deserialize, Serialize};

/// One page of extracted PDF text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path of the originating PDF file
    pub source: String,
    pub filename: Option<String>,
    /// Zero-based page number within the source file
    pub page: u32,
    /// SHA-256 of the whole source file
    pub checksum: String,
    pub size_bytes: u64,
}

/// A bounded window of a document's text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub start_offset: u64,
    pub end_offset: u64,
    pub source: String,
    pub page: u32,
}

impl Document {
    pub fn generate_id(source: &str, page: u32) -> String {
        use sha2::{Digest, Sha256};
        let input = format!("{}#{}", source, page);
        let hash = Sha256::digest(input.as_bytes());
        hex::encode(&hash[..16])
    }

    pub fn new(content: String, source: impl Into<String>, page: u32, checksum: String) -> Self {
        let source = source.into();
        let filename = std::path::Path::new(&source)
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let metadata = DocumentMetadata {
            size_bytes: content.len() as u64,
            source,
            filename,
            page,
            checksum,
        };
        Self {
            id: Self::generate_id(&metadata.source, page),
            content,
            metadata,
        }
    }
}

impl DocumentChunk {
    pub fn generate_id(document_id: &str, chunk_index: u32) -> String {
        use uuid::Uuid;
        let name = format!("{}:{}", document_id, chunk_index);
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }

    pub fn from_document(
        document: &Document,
        content: String,
        chunk_index: u32,
        total_chunks: u32,
        start_offset: u64,
        end_offset: u64,
    ) -> Self {
        Self {
            id: Self::generate_id(&document.id, chunk_index),
            document_id: document.id.clone(),
            content,
            chunk_index,
            total_chunks,
            start_offset,
            end_offset,
            source: document.metadata.source.clone(),
            page: document.metadata.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_generate_id() {
        let id = Document::generate_id("docs/handbook.pdf", 3);
        assert_eq!(id.len(), 32);
        assert_ne!(id, Document::generate_id("docs/handbook.pdf", 4));
    }

    #[test]
    fn test_chunk_generate_id() {
        let id = DocumentChunk::generate_id("abc123", 5);
        assert_eq!(id.len(), 36);
        assert!(id.chars().filter(|c| *c == '-').count() == 4);
        let id2 = DocumentChunk::generate_id("abc123", 5);
        assert_eq!(id, id2);
        let id3 = DocumentChunk::generate_id("abc123", 6);
        assert_ne!(id, id3);
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new(
            "content".to_string(),
            "docs/handbook.pdf",
            0,
            "checksum".to_string(),
        );
        assert!(!doc.id.is_empty());
        assert_eq!(doc.metadata.filename.as_deref(), Some("handbook.pdf"));
        assert_eq!(doc.metadata.page, 0);
        assert_eq!(doc.metadata.size_bytes, 7);
    }
}
