//! File utilities for the document corpus.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Calculate SHA-256 checksum of content.
pub fn calculate_checksum(content: &[u8]) -> String {
    let hash = Sha256::digest(content);
    hex::encode(hash)
}

/// Check whether a path names a PDF file by its extension.
pub fn is_pdf_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}
