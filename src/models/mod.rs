mod chat;
mod config;
mod course;
mod document;

pub use chat::{ChatRequest, ChatResponse, Intent};
pub use config::{
    Config, CourseDriver, CourseStoreConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL, DEFAULT_LLM_URL,
    DEFAULT_MAJOR, DEFAULT_TOP_K, DocumentsConfig, EmbeddingConfig, EmbeddingProvider,
    IndexConfig, IndexingConfig, KNOWN_MAJORS, LlmConfig, ResolvedConfig, RetrievalConfig,
    ServerConfig, StudyPlanConfig,
};
pub use course::{Course, CourseQuery, PlanGrid, StudyPlan, StudyPlanRequest};
pub use document::{Document, DocumentChunk, DocumentMetadata};
