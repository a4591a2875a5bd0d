//! `ringbridge serve` command - Run the protocol server over stdio.

use ringbridge_core::ConfigLoader;

pub async fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(config_path)?;

    tracing::info!(
        bench_root = %config.bench.root.display(),
        timeout_secs = config.bench.timeout.as_secs(),
        "Starting protocol server"
    );

    crate::server::run(config).await?;
    Ok(())
}
