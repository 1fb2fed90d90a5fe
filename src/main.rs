//! # RAG Console
//!
//! Terminal runner for the session client.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Session storage, HTTP client and lifecycle manager
//! - The stdin activity loop

use anyhow::Result;
use tokio::io::BufReader;
use tracing::info;

use rag_console_client::config::Settings;
use rag_console_client::startup::{Console, Credentials};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    rag_console_client::telemetry::init_tracing();

    info!("Starting RAG console...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        base_url = %settings.api.base_url,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let credentials = match (std::env::var("CONSOLE_EMAIL"), std::env::var("CONSOLE_PASSWORD")) {
        (Ok(email), Ok(password)) => Some(Credentials { email, password }),
        _ => None,
    };

    let console = Console::build(settings)?;

    info!("Console ready; each input line counts as activity");
    let reason = console
        .run_until_stopped(credentials, BufReader::new(tokio::io::stdin()))
        .await?;
    info!(?reason, "Exiting");

    Ok(())
}
