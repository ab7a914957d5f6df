//! Ask command - question the assistant about the stored datasets.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::{debug, info};

use stockview_core::assistant::{build_prompt, Assistant, ChatTurn, GeminiClient, PromptLimits};

use super::{load_config, open_store};

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Question to ask
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    /// JSON file with earlier turns: [{"role": "user"|"assistant", "content": "..."}]
    #[arg(long)]
    history: Option<PathBuf>,

    /// Print the prompt instead of sending it
    #[arg(long)]
    print_prompt: bool,
}

pub async fn run(args: AskArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let question = args.question.join(" ");

    if question.trim().is_empty() {
        anyhow::bail!("A question is required");
    }

    let history: Vec<ChatTurn> = match &args.history {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)
            .map_err(|e| anyhow::anyhow!("Invalid history file {}: {}", path.display(), e))?,
        None => Vec::new(),
    };

    let store = open_store(&config);
    let (stock, sales) = store.snapshot().await;
    let limits = PromptLimits::from(&config.assistant);

    if args.print_prompt {
        println!("{}", build_prompt(&question, &history, &stock, &sales, limits));
        return Ok(());
    }

    let client = GeminiClient::from_config(&config.assistant)?;
    info!("Asking {} with {} history turns", client.model(), history.len());

    let assistant = Assistant::new(client).with_limits(limits);
    let reply = assistant.ask(&question, &history, &stock, &sales).await?;
    debug!("Received {} character reply", reply.len());

    println!("{}", reply);

    Ok(())
}
