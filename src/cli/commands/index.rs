use std::time::Instant;

use anyhow::Result;
use clap::Args;

use super::app::{build_index, load_embedder};
use crate::cli::output::{IndexStats, OutputFormat, get_formatter};
use crate::models::Config;

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[arg(long, help = "PDF folder to index (overrides documents.folder)")]
    pub docs: Option<std::path::PathBuf>,
}

/// Rebuild the vector index from the PDF folder.
pub async fn handle_index(args: IndexArgs, mut config: Config, format: OutputFormat) -> Result<()> {
    if let Some(docs) = args.docs {
        config.documents.folder = docs;
    }

    let start = Instant::now();
    let embedder = load_embedder(&config)?;
    let index = build_index(&config, embedder).await?;

    let stats = IndexStats {
        files: index.manifest().sources.len(),
        chunks: index.len(),
        index_path: config.index.path.display().to_string(),
        model_id: index.manifest().model_id.clone(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    println!("{}", get_formatter(format).format_index_stats(&stats));
    Ok(())
}
