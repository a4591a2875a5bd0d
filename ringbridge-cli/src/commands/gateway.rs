// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringbridge gateway` command - Start the HTTP facade.

use ringbridge_core::ConfigLoader;

use crate::gateway::ServerCommand;

pub async fn execute(
    config_path: &str,
    port: Option<u16>,
    metrics_port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = ConfigLoader::load_or_default(config_path)?;

    if let Some(port) = port {
        if port == 0 {
            return Err("Gateway port must be nonzero".into());
        }
        config.gateway.port = port;
    }
    if let Some(metrics_port) = metrics_port {
        if metrics_port == 0 {
            return Err("Metrics port must be nonzero".into());
        }
        config.gateway.metrics_port = Some(metrics_port);
    }

    tracing::info!(
        port = config.gateway.port,
        bench_root = %config.bench.root.display(),
        "Starting gateway"
    );

    if let Some(metrics_port) = config.gateway.metrics_port {
        crate::metrics::start_metrics_server(metrics_port);
    }

    let server_command = ServerCommand::from_current_exe(config_path)?;
    crate::gateway::start_gateway(config, server_command).await?;
    Ok(())
}
