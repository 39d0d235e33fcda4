//! Wiring shared by the commands that answer chat messages.

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::VectorIndexError;
use crate::models::Config;
use crate::services::{
    ChatService, IndexBuilder, OllamaClient, RegexIntentClassifier, Retriever, SharedEmbedder,
    VectorIndex, create_course_store, create_embedder,
};

pub fn load_embedder(config: &Config) -> Result<SharedEmbedder> {
    create_embedder(&config.embedding).with_context(|| {
        format!(
            "failed to initialise {} embedder for {}",
            config.embedding.provider, config.embedding.model_id
        )
    })
}

/// Embedding progress bar on stderr, hidden when stderr is not a terminal.
pub fn progress_bar() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

pub async fn build_index(config: &Config, embedder: SharedEmbedder) -> Result<VectorIndex> {
    IndexBuilder::new(config, embedder)
        .with_progress(progress_bar())
        .build()
        .await
        .context("failed to build vector index")
}

/// Load the persisted index, checking it was built with the configured model.
pub fn load_index(config: &Config, embedder: &SharedEmbedder) -> Result<VectorIndex> {
    let index = match VectorIndex::load(&config.index.path) {
        Ok(index) => index,
        Err(VectorIndexError::NotFound(path)) => anyhow::bail!(
            "no vector index at {}; run `coursebot index` first",
            path.display()
        ),
        Err(e) => return Err(e).context("failed to load vector index"),
    };

    let manifest = index.manifest();
    if manifest.model_id != embedder.model_id() || manifest.dimension != embedder.dimension() {
        anyhow::bail!(
            "index at {} was built with {} ({} dims) but {} ({} dims) is configured; rebuild it",
            config.index.path.display(),
            manifest.model_id,
            manifest.dimension,
            embedder.model_id(),
            embedder.dimension()
        );
    }

    Ok(index)
}

pub async fn chat_service(
    config: &Config,
    index: VectorIndex,
    embedder: SharedEmbedder,
) -> Result<ChatService> {
    let courses = create_course_store(&config.courses)
        .await
        .with_context(|| format!("failed to open {} course store", config.courses.driver))?;
    let llm = OllamaClient::new(&config.llm).context("failed to create LLM client")?;

    Ok(ChatService::new(
        Box::new(RegexIntentClassifier::new(&config.study_plan)),
        courses,
        Retriever::new(Arc::new(index), embedder),
        Arc::new(llm),
        config.retrieval.top_k as usize,
    ))
}
