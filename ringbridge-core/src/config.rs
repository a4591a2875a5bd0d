// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration for the bridge itself.
//!
//! Validates paths, ports, and the run timeout at load time. A missing file
//! yields the built-in defaults so the bridge starts with zero
//! configuration; a present-but-invalid file is a hard error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BridgeError, BridgeResult, ValidationError};

/// Environment variable overriding `bench.root`.
pub const BENCH_ROOT_ENV: &str = "RINGBRIDGE_BENCH_ROOT";

/// Longest permitted benchmark timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 900;

/// Raw benchmark section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawBenchConfig {
    #[serde(default = "default_bench_root")]
    root: String,
    #[serde(default = "default_executable")]
    executable: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_bench_root() -> String {
    "./ring-buffer".to_string()
}

fn default_executable() -> String {
    "build/ring-buffer-app".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RawBenchConfig {
    fn default() -> Self {
        Self {
            root: default_bench_root(),
            executable: default_executable(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Raw gateway section.
#[derive(Debug, Deserialize)]
struct RawGatewayConfig {
    #[serde(default = "default_gateway_port")]
    port: u16,
    #[serde(default)]
    metrics_port: Option<u16>,
}

fn default_gateway_port() -> u16 {
    8000
}

impl Default for RawGatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            metrics_port: None,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
struct RawBridgeConfig {
    #[serde(default)]
    bench: RawBenchConfig,
    #[serde(default)]
    gateway: RawGatewayConfig,
}

/// Validated benchmark invocation settings.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Benchmark repository root; working directory for every run.
    pub root: PathBuf,
    /// Executable path, absolute or relative to `root`.
    pub executable: PathBuf,
    /// Wall-clock bound per run.
    pub timeout: Duration,
}

/// Validated HTTP facade settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub metrics_port: Option<u16>,
}

/// Complete validated bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bench: BenchConfig,
    pub gateway: GatewayConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        ConfigLoader::validate(RawBridgeConfig::default()).expect("built-in defaults are valid")
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file, falling back to the built-in
    /// defaults when the file does not exist.
    ///
    /// `RINGBRIDGE_BENCH_ROOT` overrides `bench.root` either way.
    pub fn load_or_default(path: impl AsRef<Path>) -> BridgeResult<BridgeConfig> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            Self::load_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            BridgeConfig::default()
        };

        if let Ok(root) = std::env::var(BENCH_ROOT_ENV) {
            if !root.is_empty() {
                config.bench.root = PathBuf::from(root);
            }
        }

        Ok(config)
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BridgeResult<BridgeConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BridgeError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BridgeResult<BridgeConfig> {
        let raw: RawBridgeConfig =
            serde_yaml::from_str(content).map_err(|e| BridgeError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawBridgeConfig) -> BridgeResult<BridgeConfig> {
        if raw.bench.root.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "bench.root",
                value: raw.bench.root,
                reason: "Benchmark root cannot be empty".to_string(),
            }
            .into());
        }

        if raw.bench.executable.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "bench.executable",
                value: raw.bench.executable,
                reason: "Executable path cannot be empty".to_string(),
            }
            .into());
        }

        if raw.bench.timeout_secs == 0 || raw.bench.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidFieldValue {
                field: "bench.timeout_secs",
                value: raw.bench.timeout_secs.to_string(),
                reason: format!("Timeout must be between 1 and {} seconds", MAX_TIMEOUT_SECS),
            }
            .into());
        }

        if raw.gateway.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: raw.gateway.port,
                reason: "Port 0 is reserved and cannot be used".to_string(),
            }
            .into());
        }

        if let Some(metrics_port) = raw.gateway.metrics_port {
            if metrics_port == 0 {
                return Err(ValidationError::InvalidPort {
                    port: metrics_port,
                    reason: "Metrics port 0 is reserved and cannot be used".to_string(),
                }
                .into());
            }
            if metrics_port == raw.gateway.port {
                return Err(ValidationError::InvalidPort {
                    port: metrics_port,
                    reason: "Metrics port must differ from the gateway port".to_string(),
                }
                .into());
            }
        }

        Ok(BridgeConfig {
            bench: BenchConfig {
                root: PathBuf::from(raw.bench.root),
                executable: PathBuf::from(raw.bench.executable),
                timeout: Duration::from_secs(raw.bench.timeout_secs),
            },
            gateway: GatewayConfig {
                port: raw.gateway.port,
                metrics_port: raw.gateway.metrics_port,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
bench:
  root: /opt/ring-buffer
  executable: build/ring-buffer-app
  timeout_secs: 60

gateway:
  port: 8080
  metrics_port: 9100
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.bench.root, PathBuf::from("/opt/ring-buffer"));
        assert_eq!(config.bench.timeout, Duration::from_secs(60));
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.metrics_port, Some(9100));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigLoader::load_string("{}").unwrap();
        assert_eq!(config.bench.root, PathBuf::from("./ring-buffer"));
        assert_eq!(
            config.bench.executable,
            PathBuf::from("build/ring-buffer-app")
        );
        assert_eq!(config.bench.timeout, Duration::from_secs(30));
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.gateway.metrics_port, None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let yaml = "bench:\n  timeout_secs: 0\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_excessive_timeout_rejected() {
        let yaml = "bench:\n  timeout_secs: 901\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        let yaml = "gateway:\n  port: 0\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_metrics_port_collision_rejected() {
        let yaml = "gateway:\n  port: 8000\n  metrics_port: 8000\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_empty_executable_rejected() {
        let yaml = "bench:\n  executable: \"\"\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.gateway.port, 8000);
    }
}
