// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod fetch;
pub mod serve;

use crate::config::ServeConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};

/// Vector Serve CLI
#[derive(Parser, Debug)]
#[command(name = "vector-serve")]
#[command(version = crate::version::VERSION)]
#[command(about = "HTTP embedding server with a lazily loaded model cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub config: ServeConfig,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API (default)
    Serve,

    /// Download the pre-warm models into the cache directory and exit
    Fetch(fetch::FetchArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    cli.config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run(cli.config).await,
        Commands::Fetch(args) => fetch::run(cli.config, args).await,
    }
}
