// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringbridge validate` command - Validate configuration file.

use ringbridge_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  Repository Root:  {}", config.bench.root.display());
            println!("  Executable:       {}", config.bench.executable.display());
            println!("  Run Timeout:      {}s", config.bench.timeout.as_secs());
            println!();
            println!("Gateway Settings:");
            println!("  Port:             {}", config.gateway.port);
            match config.gateway.metrics_port {
                Some(port) => println!("  Metrics Port:     {}", port),
                None => println!("  Metrics Port:     disabled"),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
