//! Text chunking with overlap for embedding.

use crate::models::{Document, DocumentChunk, IndexingConfig};
use crate::utils::has_content;

/// Text chunker that splits documents into overlapping character windows.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters repeated from the end of the previous chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new text chunker with the given configuration.
    pub fn new(config: &IndexingConfig) -> Self {
        Self::with_sizes(config.chunk_size as usize, config.chunk_overlap as usize)
    }

    pub fn with_sizes(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Create a chunker with default settings (500 characters, 50 overlap).
    pub fn with_defaults() -> Self {
        Self::new(&IndexingConfig::default())
    }

    /// Chunk a document into overlapping segments.
    pub fn chunk(&self, document: &Document) -> Vec<DocumentChunk> {
        let chunks: Vec<_> = self
            .split_with_overlap(&document.content)
            .into_iter()
            .filter(|(chunk_content, _, _)| has_content(chunk_content))
            .collect();

        let total_chunks = chunks.len() as u32;

        chunks
            .into_iter()
            .enumerate()
            .map(|(idx, (chunk_content, start_offset, end_offset))| {
                DocumentChunk::from_document(
                    document,
                    chunk_content,
                    idx as u32,
                    total_chunks,
                    start_offset,
                    end_offset,
                )
            })
            .collect()
    }

    /// Chunk many documents, preserving document order.
    pub fn chunk_all(&self, documents: &[Document]) -> Vec<DocumentChunk> {
        documents.iter().flat_map(|doc| self.chunk(doc)).collect()
    }

    /// Split content into overlapping windows with character offsets.
    ///
    /// Each window ends at a natural break when one exists in its last fifth;
    /// the next window starts `overlap` characters before that end.
    fn split_with_overlap(&self, content: &str) -> Vec<(String, u64, u64)> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = content.chars().collect();
        let total_chars = chars.len();

        if total_chars == 0 {
            return chunks;
        }

        let mut start = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let adjusted_end = self.find_break_point(&chars, start, end, total_chars);

            let chunk_content: String = chars[start..adjusted_end].iter().collect();
            chunks.push((
                chunk_content.trim().to_string(),
                start as u64,
                adjusted_end as u64,
            ));

            if adjusted_end >= total_chars {
                break;
            }

            let next = adjusted_end.saturating_sub(self.overlap);
            start = if next > start { next } else { adjusted_end };
        }

        chunks
    }

    /// Find a natural break point near the target end position.
    fn find_break_point(&self, chars: &[char], start: usize, target_end: usize, total: usize) -> usize {
        if target_end >= total {
            return total;
        }

        // Only breaks past the overlap keep the window advancing.
        let search_start = target_end
            .saturating_sub(self.chunk_size / 5)
            .max(start + self.overlap + 1);
        if search_start >= target_end {
            return target_end;
        }
        let search_range = &chars[search_start..target_end];

        // Priority: double newline > single newline > period+space > space
        let mut best_break = None;
        let mut last_newline = None;
        let mut last_sentence = None;
        let mut last_space = None;

        for (i, c) in search_range.iter().enumerate() {
            let pos = search_start + i;
            match c {
                '\n' => {
                    if i > 0 && search_range.get(i - 1) == Some(&'\n') {
                        best_break = Some(pos + 1);
                    }
                    last_newline = Some(pos + 1);
                }
                '.' | '!' | '?' => {
                    if chars.get(pos + 1).is_some_and(|c| c.is_whitespace()) {
                        last_sentence = Some(pos + 1);
                    }
                }
                ' ' | '\t' => {
                    last_space = Some(pos + 1);
                }
                _ => {}
            }
        }

        best_break
            .or(last_newline)
            .or(last_sentence)
            .or(last_space)
            .unwrap_or(target_end)
    }
}
