// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ringbridge CLI
//!
//! Command-line interface for the ring-buffer benchmark bridge.

use clap::{Parser, Subcommand};

mod commands;
mod gateway;
mod metrics;
mod server;

/// Ringbridge - HTTP and stdio-RPC bridge for the ring-buffer benchmark
#[derive(Parser)]
#[command(name = "ringbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ringbridge.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the protocol server over stdio
    Serve,

    /// Start the HTTP gateway
    Gateway {
        /// Override the gateway port from the configuration
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the Prometheus metrics port from the configuration
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Derive a benchmark configuration from a requirement string
    Configure {
        /// Free-form requirements (e.g. "lockfree with 4 producers")
        requirements: String,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging. Logs always go to stderr: in `serve` mode stdout
    // carries the RPC protocol and must stay clean.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve => commands::serve::execute(&cli.config).await,
        Commands::Gateway { port, metrics_port } => {
            commands::gateway::execute(&cli.config, port, metrics_port)
                .await
                .map_err(|e| e as Box<dyn std::error::Error>)
        }
        Commands::Configure { requirements } => commands::configure::execute(&requirements).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
