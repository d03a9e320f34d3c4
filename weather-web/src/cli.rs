use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use weather_core::Config;

use crate::routes::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-web", version, about = "Weather lookup web server")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Path to a TOML config file. Defaults to $WEATHER_CONFIG or the
    /// platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref())?;
        tracing::debug!(?config, "configuration loaded");

        // Refuses to start without an API key.
        let state = Arc::new(AppState::from_config(&config)?);

        tracing::info!(
            addr = %self.bind,
            units = %config.units,
            provider = %config.api_base_url,
            "starting weather server"
        );
        warp::serve(routes::routes(state)).run(self.bind).await;

        Ok(())
    }
}
