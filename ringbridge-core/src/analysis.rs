// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark documentation analysis and configuration templates.
//!
//! The analysis payload is a fixed capability summary of the external
//! program plus its README text; the templates are four named starting
//! points for common workloads. Both are served read-only as protocol
//! resources.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{BufferConfig, BufferType, SizeMb, ThreadCount};

/// Structured capability summary of the external benchmark program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeAnalysis {
    pub content: String,
    pub key_features: Vec<String>,
    pub build_requirements: Vec<String>,
    pub buffer_types: Vec<String>,
    pub command_options: BTreeMap<String, String>,
}

/// A named configuration template with a short description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigTemplate {
    #[serde(flatten)]
    pub config: BufferConfig,
    pub description: String,
}

/// Load the benchmark repository's README, or an empty string when missing.
pub fn load_readme(bench_root: &Path) -> String {
    let readme_path = bench_root.join("README.md");
    match std::fs::read_to_string(&readme_path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(path = %readme_path.display(), error = %e, "Failed to load README");
            String::new()
        }
    }
}

/// Analyze the benchmark repository and summarize its capabilities.
pub fn analyze(bench_root: &Path) -> ReadmeAnalysis {
    let command_options = [
        ("--nogui", "Run without GUI (default: true)"),
        (
            "--mutex-vs-lockfree",
            "Compare MutexRingBuffer and LockFreeRingBuffer",
        ),
        (
            "--concurrent-vs-lockfree",
            "Compare ConcurrentQueue and LockFreeRingBuffer",
        ),
        ("--buffer-type", "Type of buffer to use"),
        ("--producers", "Number of producer threads"),
        ("--consumers", "Number of consumer threads"),
        ("--buffer-size_mb", "Buffer size in megabytes"),
        ("--total-transfer_mb", "Total data transfer in megabytes"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ReadmeAnalysis {
        content: load_readme(bench_root),
        key_features: vec![
            "Ring buffer visualizer with GUI controls".to_string(),
            "Multiple buffer implementations: lockfree, mutex, concurrent_queue".to_string(),
            "Performance testing and benchmarking".to_string(),
            "Docker and Codespaces support".to_string(),
            "Command-line interface with various options".to_string(),
        ],
        build_requirements: vec![
            "C++20 compiler (g++/clang++)".to_string(),
            "CMake 3.28+".to_string(),
            "Ninja".to_string(),
            "GLFW".to_string(),
            "Dear ImGui".to_string(),
            "GLAD".to_string(),
        ],
        buffer_types: BufferType::ALL.iter().map(|t| t.to_string()).collect(),
        command_options,
    }
}

fn template(
    buffer_type: BufferType,
    threads: u32,
    buffer_size_mb: u64,
    total_transfer_mb: u64,
    description: &str,
) -> ConfigTemplate {
    // Template values are fixed literals within the validated ranges.
    ConfigTemplate {
        config: BufferConfig {
            buffer_type,
            producers: ThreadCount::clamped(threads as u64),
            consumers: ThreadCount::clamped(threads as u64),
            buffer_size_mb: SizeMb::new(buffer_size_mb).expect("template size"),
            total_transfer_mb: SizeMb::new(total_transfer_mb).expect("template size"),
            nogui: true,
        },
        description: description.to_string(),
    }
}

/// The four named configuration templates, keyed by template name.
pub fn templates() -> BTreeMap<&'static str, ConfigTemplate> {
    BTreeMap::from([
        (
            "high_performance",
            template(
                BufferType::Lockfree,
                4,
                10,
                1000,
                "High-performance configuration for maximum throughput",
            ),
        ),
        (
            "balanced",
            template(
                BufferType::Mutex,
                2,
                5,
                500,
                "Balanced configuration for general use",
            ),
        ),
        (
            "simple",
            template(
                BufferType::Mutex,
                1,
                1,
                100,
                "Simple configuration for testing and learning",
            ),
        ),
        (
            "stress_test",
            template(
                BufferType::ConcurrentQueue,
                8,
                20,
                2000,
                "Stress test configuration with high load",
            ),
        ),
    ])
}
