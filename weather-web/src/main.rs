//! Binary crate for the `weather-web` server.
//!
//! This crate focuses on:
//! - Parsing startup flags
//! - Logging setup
//! - HTTP routing on top of `weather-core`

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(_) => tracing::debug!("no .env found"),
    }

    let cmd = cli::Cli::parse();
    cmd.run().await
}
