use std::future::Future;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::app::{build_index, chat_service, load_embedder, load_index};
use crate::models::Config;
use crate::server::{AppState, run_server};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides server.host)")]
    pub host: Option<String>,

    #[arg(long, short = 'p', help = "Port (overrides server.port)")]
    pub port: Option<u16>,

    #[arg(long, help = "Serve the existing index instead of rebuilding it")]
    pub no_rebuild: bool,
}

/// Build (or load) the index, connect to the course store and serve HTTP
/// until `shutdown` resolves.
pub async fn handle_serve(
    args: ServeArgs,
    mut config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let embedder = load_embedder(&config)?;
    let index = if args.no_rebuild {
        load_index(&config, &embedder)?
    } else {
        build_index(&config, embedder.clone()).await?
    };
    info!(chunks = index.len(), "vector index ready");

    let service = chat_service(&config, index, embedder).await?;
    run_server(&config.server, AppState::new(service), shutdown)
        .await
        .with_context(|| format!("server error on {}", config.server.bind_address()))
}
