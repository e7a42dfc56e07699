mod cli;
mod commands;
mod config;

use std::sync::Arc;

use clap::Parser;
use extension_qidian::QidianCatalog;
use extension_uaa::UaaSource;
use extension_youshu::YoushuSource;
use novelscout_engine::Dispatcher;
use novelscout_extension::{Client, ReqwestExecutor};
use novelscout_types::SearchType;

use crate::cli::Commands;
use crate::commands::{
    handle_chat_command, handle_config_command, handle_random_command, handle_search_command,
};
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match cli.command {
        Commands::Config { command } => handle_config_command(command).await?,
        command => run(command).await?,
    }

    Ok(())
}

async fn run(command: Commands) -> eyre::Result<()> {
    let config = Config::load().await?;
    let dispatcher = build_dispatcher(&config);
    let cover_dir = config.output.cover_dir.as_deref();

    match command {
        Commands::Ys { args, user } => {
            handle_search_command(&dispatcher, SearchType::Youshu, &user, &args, cover_dir).await
        }
        Commands::Hs { args, user } => {
            handle_search_command(&dispatcher, SearchType::Uaa, &user, &args, cover_dir).await
        }
        Commands::Random => handle_random_command(&dispatcher, cover_dir).await,
        Commands::Chat { user } => handle_chat_command(&dispatcher, &user, cover_dir).await,
        Commands::Config { command } => handle_config_command(command).await,
    }
}

/// Wires every source onto one shared HTTP client.
fn build_dispatcher(config: &Config) -> Dispatcher {
    let client = Client::new(Arc::new(ReqwestExecutor::new()));

    Dispatcher::new(client.clone(), config.dispatcher_config())
        .with_source(Arc::new(YoushuSource::new(client.clone(), &config.youshu)))
        .with_source(Arc::new(UaaSource::new(client.clone(), &config.uaa)))
        .with_catalog(Arc::new(QidianCatalog::new(client)))
}
