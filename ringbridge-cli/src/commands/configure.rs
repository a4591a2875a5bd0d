//! `ringbridge configure` command - One-shot requirement inference.
//!
//! Prints the derived benchmark configuration as pretty JSON.

use ringbridge_core::advisor;

pub async fn execute(requirements: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = advisor::configure(requirements);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
