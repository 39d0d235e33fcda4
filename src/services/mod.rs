pub mod chat;
pub mod chunker;
pub mod courses;
pub mod embedding;
pub mod indexer;
pub mod intent;
pub mod llm;
pub mod loader;
pub mod retriever;
pub mod study_plan;
pub mod vector_index;

pub use chat::{ChatService, LLM_ERROR_MESSAGE, build_prompt};
pub use chunker::TextChunker;
pub use courses::{
    CourseStore, JsonCourseStore, PgCourseStore, SharedCourseStore, create_course_store,
};
pub use embedding::{Embedder, HttpEmbedder, OnnxEmbedder, SharedEmbedder, create_embedder};
pub use indexer::{IndexBuilder, process_batch};
pub use intent::{IntentClassifier, RegexIntentClassifier, detect_major, detect_year};
pub use llm::{ChatModel, OllamaClient};
pub use loader::PdfLoader;
pub use retriever::Retriever;
pub use study_plan::{build_plan, format_plan, group_courses};
pub use vector_index::{IndexManifest, IndexedChunk, ScoredChunk, VectorIndex};
