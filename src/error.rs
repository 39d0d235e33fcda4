//! Error types for the course assistant.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the PDF corpus.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("document folder not readable: {path}: {source}")]
    FolderError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {path}: {message}")]
    PdfError { path: PathBuf, message: String },
}

/// Errors raised by the ONNX embedding backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not found: {0}")]
    NotFound(String),

    #[error("failed to load model: {0}")]
    LoadError(String),

    #[error("tokenizer error: {0}")]
    TokenizerError(String),

    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model error: {0}")]
    Model(#[from] ModelError),

    #[error("failed to connect to embedding server: {0}")]
    ConnectionError(String),

    #[error("embedding server error: {0}")]
    ServerError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding timeout")]
    Timeout,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors related to the on-disk vector index.
#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("index IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),

    #[error("index not found at {0}")]
    NotFound(PathBuf),

    #[error("vector has dimension {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt index: {0}")]
    Corrupt(String),
}

/// Errors related to building the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("document loading error: {0}")]
    Loader(#[from] LoaderError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector index error: {0}")]
    VectorIndexError(#[from] VectorIndexError),

    #[error("embedder returned {actual} vectors for {expected} chunks")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
}

/// Errors related to similarity retrieval.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("vector index error: {0}")]
    VectorIndexError(#[from] VectorIndexError),
}

/// Errors related to the course database.
#[derive(Debug, Error)]
pub enum CourseStoreError {
    #[error("failed to connect to course database: {0}")]
    ConnectionError(String),

    #[error("course query failed: {0}")]
    QueryError(String),

    #[error("course file error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("course file parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("course database not configured: {0}")]
    NotConfigured(String),
}

/// Errors related to the LLM chat endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    ClientError(String),

    #[error("chat request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("chat endpoint returned status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("invalid chat response: {0}")]
    InvalidResponse(String),
}

/// Errors that escape a chat turn. LLM failures never appear here; they are
/// converted into the generic answer text.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("course lookup failed: {0}")]
    Courses(#[from] CourseStoreError),

    #[error("context retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}
