//! Deterministic fakes for the service seams.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::{CourseStoreError, EmbeddingError, LlmError};
use crate::models::{Config, Course, CourseQuery, EmbeddingProvider};
use crate::services::courses::CourseStore;
use crate::services::embedding::Embedder;
use crate::services::llm::ChatModel;
use crate::services::vector_index::{IndexManifest, IndexedChunk, VectorIndex};

/// Bag-of-words embedder: each lowercase word is hashed into one bucket.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes(digest[..8].try_into().unwrap()) as usize;
            v[bucket % self.dimension] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "hash-embedder"
    }
}

/// Index over `texts`, one chunk per text, in order.
pub async fn index_with_texts(embedder: &HashEmbedder, texts: &[&str]) -> VectorIndex {
    let mut index = VectorIndex::new(IndexManifest {
        model_id: embedder.model_id().to_string(),
        dimension: embedder.dimension(),
        chunk_size: 500,
        chunk_overlap: 50,
        built_at: Utc::now(),
        sources: vec!["docs/test.pdf".to_string()],
    });
    let vectors = embedder
        .embed_documents(texts.iter().map(|t| t.to_string()).collect())
        .await
        .unwrap();
    for (i, (text, vector)) in texts.iter().zip(vectors).enumerate() {
        let chunk = IndexedChunk {
            id: format!("chunk-{i}"),
            content: text.to_string(),
            source: "docs/test.pdf".to_string(),
            page: 0,
        };
        index.add(chunk, &vector).unwrap();
    }
    index
}

pub fn sample_courses() -> Vec<Course> {
    let course = |code: &str, title: &str, majors: &[&str], year: i32, semester: &[i32]| Course {
        code: code.to_string(),
        title: title.to_string(),
        majors: majors.iter().map(|m| m.to_string()).collect(),
        year,
        semester: semester.to_vec(),
    };
    vec![
        course(
            "COMP501",
            "Computing Technology in Society",
            &["Software Development", "Data Science"],
            1,
            &[1],
        ),
        course("COMP502", "Foundations of IT Infrastructure", &["Software Development"], 1, &[1, 2]),
        course("DATA601", "Data Wrangling", &["Data Science"], 2, &[2]),
        course("SOFT703", "Web Applications Development", &["Software Development"], 2, &[1]),
    ]
}

/// Course store whose every query fails.
pub struct FailingCourseStore;

#[async_trait]
impl CourseStore for FailingCourseStore {
    async fn find(&self, _query: &CourseQuery) -> Result<Vec<Course>, CourseStoreError> {
        Err(CourseStoreError::QueryError("connection reset".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Chat model with a fixed reply (or failure) that records prompts.
pub struct ScriptedChatModel {
    reply: String,
    error: Mutex<Option<LlmError>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            error: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails the first call with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self {
            reply: String::new(),
            error: Mutex::new(Some(error)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(self.reply.clone()),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Config rooted in `dir`, using the HTTP embedder and the JSON course store.
pub fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.documents.folder = dir.join("docs");
    config.index.path = dir.join("index");
    config.embedding.provider = EmbeddingProvider::Http;
    config.embedding.dimension = 16;
    config.courses.driver = crate::models::CourseDriver::Json;
    config.courses.json_path = dir.join("courses.json");
    config
}

/// Write a minimal PDF with one Helvetica text line per page.
pub fn write_test_pdf(path: &std::path::Path, pages: &[&str]) {
    let page_count = pages.len();
    let mut objects: Vec<String> = Vec::new();

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, text) in pages.iter().enumerate() {
        let escaped = text
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        let content = format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));

    std::fs::write(path, out).unwrap();
}
