// ABOUTME: Server binary for the expense tracker usage API
// ABOUTME: Loads environment configuration, initializes logging and storage, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Expense Tracker Usage API Server Binary
//!
//! Serves `GET /api/usage` and `GET /api/usage/tracker/:tracker_id` backed by
//! the `SQLite` message ledger.

use anyhow::Result;
use clap::Parser;
use expense_tracker::{config::environment::ServerConfig, logging, resources::ServerResources, server};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "expense-tracker-server")]
#[command(about = "Expense Tracker usage API - per-message token accounting")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env(config.log_level)?;

    info!("Starting expense tracker usage API");
    info!("{}", config.summary());

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::from_config(config).await?);
    info!(
        tokenizer = %resources.usage_service.ledger().token_counter().scheme(),
        "Server resources initialized"
    );

    if let Err(e) = server::run(resources, http_port).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
