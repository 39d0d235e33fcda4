//! PDF folder loader producing one document per page.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::LoaderError;
use crate::models::Document;
use crate::utils::file::{calculate_checksum, is_pdf_file};

/// Reads every PDF directly inside a folder.
#[derive(Debug, Clone)]
pub struct PdfLoader {
    folder: PathBuf,
}

impl PdfLoader {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// List PDF files in the folder (not recursive), sorted by path.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, LoaderError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| LoaderError::FolderError {
                path: self.folder.clone(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            })?;

            let path = entry.path();
            if path.is_file() && is_pdf_file(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Load every page of every PDF. The first unreadable file aborts the load.
    pub fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let mut documents = Vec::new();
        for path in self.collect_files()? {
            let pages = load_pdf(&path)?;
            debug!(file = %path.display(), pages = pages.len(), "extracted PDF");
            documents.extend(pages);
        }
        Ok(documents)
    }
}

/// Extract a single PDF into per-page documents.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>, LoaderError> {
    let bytes = std::fs::read(path).map_err(|e| LoaderError::PdfError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let checksum = calculate_checksum(&bytes);
    let pages =
        pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| LoaderError::PdfError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let source = path.to_string_lossy().to_string();
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| Document::new(text, source.clone(), page as u32, checksum.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_test_pdf;

    #[test]
    fn test_empty_folder_yields_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PdfLoader::new(dir.path());
        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_non_pdf_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();
        std::fs::write(dir.path().join("readme.md"), "# readme").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let loader = PdfLoader::new(dir.path());
        assert!(loader.collect_files().unwrap().is_empty());
        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_collect_files_sorted_and_shallow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.pdf"), b"x").unwrap();

        let files = PdfLoader::new(dir.path()).collect_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PdfLoader::new(dir.path().join("missing"));
        assert!(matches!(
            loader.load(),
            Err(LoaderError::FolderError { .. })
        ));
    }

    #[test]
    fn test_corrupt_pdf_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"this is not a pdf").unwrap();

        let err = PdfLoader::new(dir.path()).load().unwrap_err();
        match err {
            LoaderError::PdfError { path, .. } => assert!(path.ends_with("broken.pdf")),
            other => panic!("expected PdfError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_yields_one_document_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handbook.pdf");
        write_test_pdf(
            &path,
            &["Enrolment closes in February", "Fees are due in March"],
        );

        let docs = PdfLoader::new(dir.path()).load().unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs.iter().map(|d| d.metadata.page).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(docs[0].content.contains("Enrolment closes in February"));
        assert!(docs[1].content.contains("Fees are due in March"));
        for doc in &docs {
            assert!(doc.metadata.source.ends_with("handbook.pdf"));
            assert_eq!(doc.metadata.filename.as_deref(), Some("handbook.pdf"));
            assert_eq!(doc.metadata.checksum, docs[0].metadata.checksum);
        }
        assert_ne!(docs[0].id, docs[1].id);
    }
}
