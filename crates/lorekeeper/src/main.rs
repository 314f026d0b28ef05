mod ai;
mod api;
mod config;
mod database;
mod task;
mod utils;
mod wiki;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::ai::{GeminiClient, TextGenerator};
use crate::config::{Args, Config};
use crate::database::setup_database;
use crate::task::http_server;
use crate::utils::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logger(&config.log_level)?;
    info!("lorekeeper {} starting", env!("CARGO_PKG_VERSION"));

    let database_path = config.ensure_database_path()?;
    info!("database: {}", database_path.display());
    let db = Arc::new(
        setup_database(&database_path)
            .await
            .context("failed to open the database")?,
    );

    if config.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; /api/generate and enhance with a storybook will fail");
    }
    let ai: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(&config.gemini)?);

    http_server(db, ai, config.bind_address).await
}
