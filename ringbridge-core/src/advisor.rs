// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Requirement-text heuristics and result interpretation.
//!
//! Turns a free-form requirement string into a [`BufferConfig`] and an
//! [`ExecutionResult`] into an [`Interpretation`]. Both functions are pure
//! and total: no I/O, no state, no error path.
//!
//! Keyword precedence is encoded as ordered rule tables rather than nested
//! conditionals, so each table can be audited and tested in isolation.
//! First match wins within a table.

use crate::types::{BufferConfig, BufferType, ExecutionResult, Interpretation, SizeMb, ThreadCount};

/// Buffer-type selection rule: any keyword present selects the type.
struct TypeRule {
    keywords: &'static [&'static str],
    buffer_type: BufferType,
}

/// Ordered buffer-type rules. Falls back to `mutex` when nothing matches.
const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        keywords: &["lockfree", "lock-free"],
        buffer_type: BufferType::Lockfree,
    },
    TypeRule {
        keywords: &["concurrent"],
        buffer_type: BufferType::ConcurrentQueue,
    },
];

/// Size/volume profile rule: any keyword present selects the profile.
struct ProfileRule {
    keywords: &'static [&'static str],
    buffer_size_mb: u64,
    total_transfer_mb: u64,
}

/// Ordered size/volume rules. "large" outranks "performance", so
/// "large performance test" gets the large profile.
const PROFILE_RULES: &[ProfileRule] = &[
    ProfileRule {
        keywords: &["large", "big"],
        buffer_size_mb: 10,
        total_transfer_mb: 1000,
    },
    ProfileRule {
        keywords: &["small"],
        buffer_size_mb: 1,
        total_transfer_mb: 10,
    },
    ProfileRule {
        keywords: &["performance", "benchmark"],
        buffer_size_mb: 5,
        total_transfer_mb: 500,
    },
];

const FAILURE_RECOMMENDATIONS: [&str; 3] = [
    "Check if the benchmark program is built correctly",
    "Verify all dependencies are installed",
    "Try with different buffer configuration",
];

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Extract all maximal digit runs, left to right.
///
/// Absurdly long runs saturate; the consumers clamp to 1..=16 anyway.
fn extract_numbers(text: &str) -> Vec<u64> {
    let mut numbers = Vec::new();
    let mut current: Option<u64> = None;

    for c in text.chars() {
        match (c.to_digit(10), current) {
            (Some(d), Some(n)) => {
                current = Some(n.saturating_mul(10).saturating_add(d as u64));
            }
            (Some(d), None) => current = Some(d as u64),
            (None, Some(n)) => {
                numbers.push(n);
                current = None;
            }
            (None, None) => {}
        }
    }
    if let Some(n) = current {
        numbers.push(n);
    }
    numbers
}

/// Infer a benchmark configuration from a free-form requirement string.
///
/// Matching is case-insensitive. Always returns a fully populated,
/// invariant-satisfying config; unrecognized text yields the defaults.
pub fn configure(requirements: &str) -> BufferConfig {
    let text = requirements.to_lowercase();
    let mut config = BufferConfig::default();

    if let Some(rule) = TYPE_RULES.iter().find(|r| matches_any(&text, r.keywords)) {
        config.buffer_type = rule.buffer_type;
    }

    let numbers = extract_numbers(&text);
    let has_producer = text.contains("producer");
    let has_consumer = text.contains("consumer");

    if has_producer && !numbers.is_empty() {
        config.producers = ThreadCount::clamped(numbers[0]);
    }

    if has_consumer && !numbers.is_empty() {
        // When both roles are named but only one number is present, both
        // fields read that number. Observed behavior, kept as-is.
        let idx = if has_producer && numbers.len() > 1 { 1 } else { 0 };
        config.consumers = ThreadCount::clamped(numbers[idx]);
    }

    if let Some(rule) = PROFILE_RULES.iter().find(|r| matches_any(&text, r.keywords)) {
        // Profile values are fixed table entries, always >= 1.
        config.buffer_size_mb = SizeMb::new(rule.buffer_size_mb).unwrap_or(config.buffer_size_mb);
        config.total_transfer_mb =
            SizeMb::new(rule.total_transfer_mb).unwrap_or(config.total_transfer_mb);
    }

    config
}

/// Derive recommendations and performance notes from an execution result.
pub fn interpret(result: &ExecutionResult) -> Interpretation {
    if !result.success {
        return Interpretation {
            interpretation: "Execution failed".to_string(),
            error: Some(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            config_used: None,
            performance_notes: Vec::new(),
            recommendations: FAILURE_RECOMMENDATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
    }

    let stdout = result.stdout.to_lowercase();
    let mut performance_notes = Vec::new();
    let mut recommendations = Vec::new();

    if stdout.contains("throughput") {
        performance_notes.push("Throughput metrics available in output".to_string());
    }
    if stdout.contains("latency") {
        performance_notes.push("Latency measurements recorded".to_string());
    }

    recommendations.push(
        match result.config.buffer_type {
            BufferType::Lockfree => "Lock-free buffer chosen - good for high-performance scenarios",
            BufferType::Mutex => "Mutex buffer chosen - good for general use cases",
            BufferType::ConcurrentQueue => {
                "Concurrent queue chosen - good for complex producer-consumer patterns"
            }
        }
        .to_string(),
    );

    let producers = result.config.producers.value();
    let consumers = result.config.consumers.value();
    recommendations.push(
        if producers > consumers {
            "More producers than consumers - may cause buffer overflow"
        } else if consumers > producers {
            "More consumers than producers - may cause buffer underflow"
        } else {
            "Balanced producer-consumer ratio"
        }
        .to_string(),
    );

    Interpretation {
        interpretation: "Buffer execution completed successfully".to_string(),
        error: None,
        config_used: Some(result.config.clone()),
        performance_notes,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_result(config: BufferConfig, stdout: &str) -> ExecutionResult {
        ExecutionResult {
            success: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
            command: None,
            error: None,
            build_instructions: None,
            config,
        }
    }

    #[test]
    fn test_empty_requirements_yield_defaults() {
        assert_eq!(configure(""), BufferConfig::default());
    }

    #[test]
    fn test_lockfree_without_numbers() {
        for text in ["use a lockfree buffer", "I want LOCK-FREE please"] {
            let config = configure(text);
            assert_eq!(config.buffer_type, BufferType::Lockfree);
            assert_eq!(config.producers.value(), 1);
            assert_eq!(config.consumers.value(), 1);
            assert_eq!(config.buffer_size_mb.megabytes(), 1);
            assert_eq!(config.total_transfer_mb.megabytes(), 100);
        }
    }

    #[test]
    fn test_lockfree_outranks_concurrent() {
        let config = configure("concurrent lockfree hybrid");
        assert_eq!(config.buffer_type, BufferType::Lockfree);
    }

    #[test]
    fn test_concurrent_keyword() {
        let config = configure("concurrent access from many threads");
        assert_eq!(config.buffer_type, BufferType::ConcurrentQueue);
    }

    #[test]
    fn test_performance_profile_with_thread_counts() {
        let config = configure("high performance with 4 producers and 2 consumers");
        assert_eq!(config.buffer_type, BufferType::Mutex);
        assert_eq!(config.producers.value(), 4);
        assert_eq!(config.consumers.value(), 2);
        assert_eq!(config.buffer_size_mb.megabytes(), 5);
        assert_eq!(config.total_transfer_mb.megabytes(), 500);
    }

    #[test]
    fn test_large_profile_outranks_performance() {
        let config = configure("large performance benchmark");
        assert_eq!(config.buffer_size_mb.megabytes(), 10);
        assert_eq!(config.total_transfer_mb.megabytes(), 1000);
    }

    #[test]
    fn test_small_profile() {
        let config = configure("small test run");
        assert_eq!(config.buffer_size_mb.megabytes(), 1);
        assert_eq!(config.total_transfer_mb.megabytes(), 10);
    }

    #[test]
    fn test_thread_counts_clamped_to_sixteen() {
        let config = configure("stress with 64 producers and 99 consumers");
        assert_eq!(config.producers.value(), 16);
        assert_eq!(config.consumers.value(), 16);
    }

    #[test]
    fn test_shared_single_number_ambiguity() {
        // Both roles named, one number: both fields read it.
        let config = configure("8 producers and consumers");
        assert_eq!(config.producers.value(), 8);
        assert_eq!(config.consumers.value(), 8);
    }

    #[test]
    fn test_consumer_only_uses_first_number() {
        let config = configure("3 consumers reading");
        assert_eq!(config.producers.value(), 1);
        assert_eq!(config.consumers.value(), 3);
    }

    #[test]
    fn test_numbers_without_keywords_ignored() {
        let config = configure("transfer 500 in one go");
        assert_eq!(config.producers.value(), 1);
        assert_eq!(config.consumers.value(), 1);
    }

    #[test]
    fn test_configure_idempotent() {
        let text = "concurrent benchmark with 2 producers and 4 consumers";
        assert_eq!(configure(text), configure(text));
    }

    #[test]
    fn test_extract_numbers_maximal_runs() {
        assert_eq!(extract_numbers("ab12cd345e6"), vec![12, 345, 6]);
        assert_eq!(extract_numbers("no digits"), Vec::<u64>::new());
        assert_eq!(extract_numbers("7"), vec![7]);
    }

    #[test]
    fn test_interpret_failure_fixed_recommendations() {
        let result = ExecutionResult::failure(BufferConfig::default(), "executable missing");
        let interpretation = interpret(&result);
        assert_eq!(interpretation.interpretation, "Execution failed");
        assert_eq!(interpretation.error.as_deref(), Some("executable missing"));
        assert_eq!(interpretation.recommendations.len(), 3);
        assert!(interpretation.performance_notes.is_empty());
    }

    #[test]
    fn test_interpret_failure_without_error_message() {
        let mut result = ExecutionResult::failure(BufferConfig::default(), "x");
        result.error = None;
        let interpretation = interpret(&result);
        assert_eq!(interpretation.error.as_deref(), Some("Unknown error"));
    }

    #[test]
    fn test_interpret_success_both_notes() {
        let result = success_result(
            BufferConfig::default(),
            "Throughput: 512 MB/s\nAvg Latency: 12us\n",
        );
        let interpretation = interpret(&result);
        assert_eq!(interpretation.performance_notes.len(), 2);
        assert_eq!(
            interpretation.interpretation,
            "Buffer execution completed successfully"
        );
    }

    #[test]
    fn test_interpret_success_no_metrics_in_output() {
        let result = success_result(BufferConfig::default(), "done\n");
        let interpretation = interpret(&result);
        assert!(interpretation.performance_notes.is_empty());
    }

    #[test]
    fn test_interpret_buffer_type_advisory() {
        let config = BufferConfig {
            buffer_type: BufferType::Lockfree,
            ..BufferConfig::default()
        };
        let interpretation = interpret(&success_result(config, ""));
        assert!(interpretation.recommendations[0].contains("Lock-free"));
    }

    #[test]
    fn test_interpret_balance_advisories() {
        let overflow = BufferConfig {
            producers: ThreadCount::new(4).unwrap(),
            consumers: ThreadCount::new(2).unwrap(),
            ..BufferConfig::default()
        };
        let interpretation = interpret(&success_result(overflow, ""));
        assert!(interpretation.recommendations[1].contains("overflow"));

        let underflow = BufferConfig {
            producers: ThreadCount::new(2).unwrap(),
            consumers: ThreadCount::new(4).unwrap(),
            ..BufferConfig::default()
        };
        let interpretation = interpret(&success_result(underflow, ""));
        assert!(interpretation.recommendations[1].contains("underflow"));

        let interpretation = interpret(&success_result(BufferConfig::default(), ""));
        assert!(interpretation.recommendations[1].contains("Balanced"));
    }
}
