//! Twenty Questions - unified CLI
//!
//! Serves games over HTTP or plays one game in the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use twenty_questions::{
    AppConfig, Console, GameServer, GameSession, LlmClient, PlayerKind, Role, SessionStore,
    build_player,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;
    let client = LlmClient::new(config.create_llm_config(), config.retry_policy())?;

    match cli.command {
        Command::Serve { port, host } => run_server(config, client, host, port).await,
        Command::Play { first, second } => run_terminal(client, first, second).await,
    }
}

/// Run the REST game server
#[instrument(skip(config, client))]
async fn run_server(
    config: AppConfig,
    client: LlmClient,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server().host().clone());
    let port = port.unwrap_or(*config.server().port());
    let address = format!("{}:{}", host, port);

    info!(address = %address, "Starting Twenty Questions server");
    GameServer::new(SessionStore::new(client))
        .serve(&address)
        .await
}

/// Play one game on stdin/stdout
#[instrument(skip(client))]
async fn run_terminal(client: LlmClient, first: PlayerKind, second: PlayerKind) -> Result<()> {
    let id = uuid::Uuid::new_v4().to_string();
    let mut session = GameSession::start(
        id,
        build_player(Role::First, first, &client),
        build_player(Role::Second, second, &client),
    )
    .await?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut console = Console::new(stdin, std::io::stdout());
    let view = console.run(&mut session).await?;
    info!(status = %view.status, question_count = view.question_count, "Game finished");
    Ok(())
}
