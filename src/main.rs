//! Noir Detective - terminal murder mystery.

#![warn(missing_docs)]

mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use noir_detective::{
    CaseGenerator, CaseSource, DialogueClient, GameConfig, GameController, Language, LlmClient,
    Session, run_tui,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,noir_detective=debug";
const TUI_LOG_FILE: &str = "noir_detective.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { config, language } => play(config.as_deref(), language).await,
        Command::Generate { config, language } => generate(config.as_deref(), language).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Loads the config and applies the command-line language override.
#[instrument]
fn load_config(path: Option<&Path>, language: Option<Language>) -> Result<GameConfig> {
    let config = GameConfig::load(path)?;
    Ok(match language {
        Some(language) => config.with_language(language),
        None => config,
    })
}

/// Run the game in the terminal
async fn play(config_path: Option<&Path>, language: Option<Language>) -> Result<()> {
    // Log to a file so output does not corrupt the alternate screen
    let log_file = std::fs::File::create(TUI_LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!("Starting Noir Detective");

    let config = load_config(config_path, language)?;
    let llm_config = config.create_llm_config()?;
    info!(
        provider = ?llm_config.provider(),
        model = %llm_config.model(),
        "LLM provider configured"
    );
    let llm = LlmClient::new(llm_config);

    let controller = GameController::new(
        Session::new(*config.max_energy(), *config.language()),
        CaseGenerator::new(llm.clone(), *config.case_max_tokens()),
        DialogueClient::new(llm),
    );

    run_tui(controller).await
}

/// Generate one case and print it to stdout
async fn generate(config_path: Option<&Path>, language: Option<Language>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(config_path, language)?;
    let llm = LlmClient::new(config.create_llm_config()?);
    let generator = CaseGenerator::new(llm, *config.case_max_tokens());

    let case = generator.generate_case(*config.language()).await?;
    info!(case_id = %case.id(), "Case generated");
    println!("{}", serde_json::to_string_pretty(&case)?);

    Ok(())
}
