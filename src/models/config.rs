use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DOCS_FOLDER: &str = "docs";
pub const DEFAULT_INDEX_PATH: &str = "vector_index";
pub const DEFAULT_CHUNK_SIZE: u32 = 500;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 50;
pub const DEFAULT_TOP_K: u32 = 20;
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 384;
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:11411";
pub const DEFAULT_LLM_URL: &str = "http://127.0.0.1:11434/api/chat";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-r1:8b";
pub const DEFAULT_COURSE_TABLE: &str = "courses";
pub const DEFAULT_COURSE_FILE: &str = "courses.json";
pub const DEFAULT_MAJOR: &str = "Software Development";
pub const KNOWN_MAJORS: [&str; 5] = [
    "Software Development",
    "Computer Science",
    "Data Science",
    "Networks and Cybersecurity",
    "Digital Services",
];

const CONFIG_FILE_NAME: &str = "coursebot.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub courses: CourseStoreConfig,

    #[serde(default)]
    pub study_plan: StudyPlanConfig,
}

/// A loaded configuration together with the file it came from, if any.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Project-local config file in the working directory.
    pub fn project_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Per-user config file under the platform config directory.
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("coursebot").join("config.toml"))
    }

    /// Candidate config files in lookup order.
    pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }
        paths.push(Self::project_path());
        if let Some(global) = Self::global_path() {
            paths.push(global);
        }
        paths
    }

    /// Load configuration from the first existing candidate file, then apply
    /// environment overrides.
    ///
    /// An explicit path that does not exist is an error; missing implicit
    /// files fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(ConfigError::PathError(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let found = Self::candidate_paths(explicit)
            .into_iter()
            .find(|p| p.exists());

        let mut config = match &found {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(ResolvedConfig {
            config,
            path: found,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Write this configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides. Secrets such as the database URL are
    /// only ever expected to arrive this way.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.courses.url = Some(url);
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = model;
        }
        if let Some(folder) = lookup("COURSEBOT_DOCS") {
            self.documents.folder = PathBuf::from(folder);
        }
        if let Some(path) = lookup("COURSEBOT_INDEX") {
            self.index.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexing.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "indexing.chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "indexing.chunk_overlap ({}) must be smaller than indexing.chunk_size ({})",
                self.indexing.chunk_overlap, self.indexing.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimension must be greater than 0".to_string(),
            ));
        }
        if self.study_plan.majors.is_empty() {
            return Err(ConfigError::ValidationError(
                "study_plan.majors must list at least one major".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding downloaded embedding models.
    pub fn models_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("coursebot").join("models"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_docs_folder")]
    pub folder: PathBuf,
}

fn default_docs_folder() -> PathBuf {
    PathBuf::from(DEFAULT_DOCS_FOLDER)
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            folder: default_docs_folder(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Characters shared between neighbouring chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> u32 {
    DEFAULT_CHUNK_OVERLAP
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// In-process ONNX Runtime model
    #[default]
    Onnx,
    /// Remote text-embeddings server
    Http,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Onnx => write!(f, "onnx"),
            EmbeddingProvider::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    #[serde(default = "default_embedding_model")]
    pub model_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_embedding_dimension")]
    pub dimension: u32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimension() -> u32 {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_max_tokens() -> u32 {
    256
}

fn default_batch_size() -> u32 {
    32
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_timeout() -> u64 {
    120
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model_id: default_embedding_model(),
            model_path: None,
            dimension: default_embedding_dimension(),
            max_tokens: default_max_tokens(),
            batch_size: default_batch_size(),
            url: default_embedding_url(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl EmbeddingConfig {
    /// Directory containing `model.onnx` and `tokenizer.json`.
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        self.model_path.clone().or_else(|| {
            Config::models_dir().map(|dir| dir.join(self.model_id.replace('/', "--")))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory the vector index is persisted to
    #[serde(default = "default_index_path")]
    pub path: PathBuf,
}

fn default_index_path() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_PATH)
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// No timeout is applied when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_llm_url() -> String {
    DEFAULT_LLM_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_llm_model(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseDriver {
    #[default]
    Postgres,
    Json,
}

impl std::fmt::Display for CourseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseDriver::Postgres => write!(f, "postgres"),
            CourseDriver::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseStoreConfig {
    #[serde(default)]
    pub driver: CourseDriver,

    /// Connection URL; normally supplied through `DATABASE_URL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_course_table")]
    pub table: String,

    #[serde(default = "default_course_file")]
    pub json_path: PathBuf,

    #[serde(default = "default_pool_max")]
    pub pool_max: u32,

    #[serde(default = "default_pool_acquire_timeout")]
    pub pool_acquire_timeout: u32,
}

fn default_course_table() -> String {
    DEFAULT_COURSE_TABLE.to_string()
}

fn default_course_file() -> PathBuf {
    PathBuf::from(DEFAULT_COURSE_FILE)
}

fn default_pool_max() -> u32 {
    5
}

fn default_pool_acquire_timeout() -> u32 {
    30
}

impl Default for CourseStoreConfig {
    fn default() -> Self {
        Self {
            driver: CourseDriver::default(),
            url: None,
            table: default_course_table(),
            json_path: default_course_file(),
            pool_max: default_pool_max(),
            pool_acquire_timeout: default_pool_acquire_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlanConfig {
    /// Majors recognised in messages, matched in this order
    #[serde(default = "default_majors")]
    pub majors: Vec<String>,

    #[serde(default = "default_major")]
    pub default_major: String,
}

fn default_majors() -> Vec<String> {
    KNOWN_MAJORS.iter().map(|m| m.to_string()).collect()
}

fn default_major() -> String {
    DEFAULT_MAJOR.to_string()
}

impl Default for StudyPlanConfig {
    fn default() -> Self {
        Self {
            majors: default_majors(),
            default_major: default_major(),
        }
    }
}
