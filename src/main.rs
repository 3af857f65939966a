// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use sentence_embedding_node::{
    api::{start_server, AppState},
    cli::Cli,
    embeddings::load_encoder,
    version,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Default to info unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    info!("Starting {}", version::get_version_string());
    info!(
        "Model backend: {:?}, source: {}",
        config.model.backend, config.model.repo_id
    );

    // Loaded once, shared read-only by every request
    let encoder = load_encoder(&config.model).await?;
    let state = AppState::new(encoder);

    start_server(&config.server, state).await
}
