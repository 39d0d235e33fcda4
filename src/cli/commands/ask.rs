use anyhow::Result;
use clap::Args;

use super::app::{build_index, chat_service, load_embedder, load_index};
use crate::cli::output::{OutputFormat, get_formatter};
use crate::models::Config;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Message to send, as it would be typed into the chat page
    #[arg(required = true)]
    pub message: Vec<String>,

    #[arg(long, help = "Rebuild the vector index before answering")]
    pub rebuild: bool,
}

pub async fn handle_ask(args: AskArgs, config: Config, format: OutputFormat) -> Result<()> {
    let message = args.message.join(" ");
    let embedder = load_embedder(&config)?;

    let index = if args.rebuild {
        build_index(&config, embedder.clone()).await?
    } else {
        load_index(&config, &embedder)?
    };

    let service = chat_service(&config, index, embedder).await?;
    let reply = service.handle(&message).await?;

    println!("{}", get_formatter(format).format_answer(&reply));
    Ok(())
}
