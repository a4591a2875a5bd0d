// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers and value objects for benchmark execution.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by
//! construction. All types validate their invariants at creation time, so a
//! `BufferConfig` can never carry a zero thread count or a negative size no
//! matter which layer produced it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum producer/consumer threads accepted from any source.
pub const MAX_THREADS: u32 = 16;

/// Ring buffer implementation selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferType {
    Lockfree,
    #[default]
    Mutex,
    ConcurrentQueue,
}

impl BufferType {
    /// All known variants, in the order they are advertised.
    pub const ALL: [BufferType; 3] = [
        BufferType::Lockfree,
        BufferType::Mutex,
        BufferType::ConcurrentQueue,
    ];

    /// Wire/flag form, matching the external program's `--buffer-type` values.
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferType::Lockfree => "lockfree",
            BufferType::Mutex => "mutex",
            BufferType::ConcurrentQueue => "concurrent_queue",
        }
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BufferType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lockfree" => Ok(BufferType::Lockfree),
            "mutex" => Ok(BufferType::Mutex),
            "concurrent_queue" => Ok(BufferType::ConcurrentQueue),
            other => Err(ValidationError::UnknownBufferType {
                value: other.to_string(),
            }),
        }
    }
}

/// Validated producer/consumer thread count.
/// Must be in range 1..=MAX_THREADS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ThreadCount(u32);

impl ThreadCount {
    /// Create a new ThreadCount with validation.
    pub fn new(count: u32) -> Result<Self, ValidationError> {
        if count == 0 || count > MAX_THREADS {
            return Err(ValidationError::ThreadCountOutOfBounds {
                count,
                max: MAX_THREADS,
            });
        }
        Ok(Self(count))
    }

    /// Clamp an arbitrary inferred number into the valid range.
    ///
    /// Used by the advisor, which must always produce a valid config from
    /// free-form text.
    pub fn clamped(count: u64) -> Self {
        Self((count.max(1)).min(MAX_THREADS as u64) as u32)
    }

    /// Get the inner count.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ThreadCount {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThreadCount> for u32 {
    fn from(count: ThreadCount) -> Self {
        count.0
    }
}

/// Validated megabyte quantity. Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct SizeMb(u64);

impl SizeMb {
    /// Create a new SizeMb with validation.
    pub fn new(mb: u64) -> Result<Self, ValidationError> {
        if mb == 0 {
            return Err(ValidationError::SizeTooSmall { value: mb });
        }
        Ok(Self(mb))
    }

    /// Get the size in megabytes.
    pub fn megabytes(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SizeMb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}MB", self.0)
    }
}

impl TryFrom<u64> for SizeMb {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SizeMb> for u64 {
    fn from(size: SizeMb) -> Self {
        size.0
    }
}

fn default_buffer_size() -> SizeMb {
    SizeMb(1)
}

fn default_total_transfer() -> SizeMb {
    SizeMb(100)
}

fn default_nogui() -> bool {
    true
}

/// Complete configuration for one benchmark execution.
///
/// Immutable once constructed; consumed by the runner and embedded read-only
/// into the resulting `ExecutionResult`. Partial JSON deserializes to a valid
/// config via field defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default)]
    pub buffer_type: BufferType,
    #[serde(default)]
    pub producers: ThreadCount,
    #[serde(default)]
    pub consumers: ThreadCount,
    #[serde(default = "default_buffer_size")]
    pub buffer_size_mb: SizeMb,
    #[serde(default = "default_total_transfer")]
    pub total_transfer_mb: SizeMb,
    #[serde(default = "default_nogui")]
    pub nogui: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            buffer_type: BufferType::Mutex,
            producers: ThreadCount::default(),
            consumers: ThreadCount::default(),
            buffer_size_mb: default_buffer_size(),
            total_transfer_mb: default_total_transfer(),
            nogui: true,
        }
    }
}

impl BufferConfig {
    /// Render the argument tail for the external program.
    ///
    /// `--nogui` comes first when set, followed by one flag per field in a
    /// fixed order. Flag spellings match the external program exactly,
    /// including its mixed `-`/`_` style.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(6);
        if self.nogui {
            args.push("--nogui".to_string());
        }
        args.push(format!("--buffer-type={}", self.buffer_type));
        args.push(format!("--producers={}", self.producers));
        args.push(format!("--consumers={}", self.consumers));
        args.push(format!("--buffer-size_mb={}", self.buffer_size_mb.megabytes()));
        args.push(format!(
            "--total-transfer_mb={}",
            self.total_transfer_mb.megabytes()
        ));
        args
    }
}

/// Outcome of one benchmark execution. Produced once per run, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff the external process exited with status 0.
    #[serde(default)]
    pub success: bool,
    /// Exit code when the process ran to completion (absent on timeout or
    /// spawn failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// The rendered command line, when a process was actually spawned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Human-readable failure description (timeout, missing executable,
    /// spawn error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Build hint, populated only when the executable was not found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_instructions: Option<String>,
    /// The configuration this result was produced from.
    #[serde(default)]
    pub config: BufferConfig,
}

impl ExecutionResult {
    /// A failure result that never spawned a process.
    pub fn failure(config: BufferConfig, error: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            command: None,
            error: Some(error.into()),
            build_instructions: None,
            config,
        }
    }
}

/// Derived, read-only analysis of an `ExecutionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    pub interpretation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_used: Option<BufferConfig>,
    #[serde(default)]
    pub performance_notes: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_type_roundtrip() {
        for bt in BufferType::ALL {
            assert_eq!(bt.as_str().parse::<BufferType>().unwrap(), bt);
        }
        assert!("spinlock".parse::<BufferType>().is_err());
    }

    #[test]
    fn test_buffer_type_serde_form() {
        let json = serde_json::to_string(&BufferType::ConcurrentQueue).unwrap();
        assert_eq!(json, "\"concurrent_queue\"");
    }

    #[test]
    fn test_thread_count_valid() {
        assert!(ThreadCount::new(1).is_ok());
        assert!(ThreadCount::new(16).is_ok());
    }

    #[test]
    fn test_thread_count_invalid() {
        assert!(ThreadCount::new(0).is_err());
        assert!(ThreadCount::new(17).is_err());
    }

    #[test]
    fn test_thread_count_clamped() {
        assert_eq!(ThreadCount::clamped(0).value(), 1);
        assert_eq!(ThreadCount::clamped(8).value(), 8);
        assert_eq!(ThreadCount::clamped(64).value(), 16);
        assert_eq!(ThreadCount::clamped(u64::MAX).value(), 16);
    }

    #[test]
    fn test_size_mb() {
        assert!(SizeMb::new(0).is_err());
        assert_eq!(SizeMb::new(10).unwrap().megabytes(), 10);
    }

    #[test]
    fn test_config_defaults() {
        let config = BufferConfig::default();
        assert_eq!(config.buffer_type, BufferType::Mutex);
        assert_eq!(config.producers.value(), 1);
        assert_eq!(config.consumers.value(), 1);
        assert_eq!(config.buffer_size_mb.megabytes(), 1);
        assert_eq!(config.total_transfer_mb.megabytes(), 100);
        assert!(config.nogui);
    }

    #[test]
    fn test_config_partial_json() {
        let config: BufferConfig =
            serde_json::from_str(r#"{"buffer_type": "lockfree", "producers": 4}"#).unwrap();
        assert_eq!(config.buffer_type, BufferType::Lockfree);
        assert_eq!(config.producers.value(), 4);
        assert_eq!(config.consumers.value(), 1);
        assert_eq!(config.total_transfer_mb.megabytes(), 100);
    }

    #[test]
    fn test_config_rejects_zero_producers() {
        let result = serde_json::from_str::<BufferConfig>(r#"{"producers": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_fixed_order() {
        let config = BufferConfig::default();
        assert_eq!(
            config.to_args(),
            vec![
                "--nogui",
                "--buffer-type=mutex",
                "--producers=1",
                "--consumers=1",
                "--buffer-size_mb=1",
                "--total-transfer_mb=100",
            ]
        );
    }

    #[test]
    fn test_args_without_nogui() {
        let config = BufferConfig {
            nogui: false,
            ..BufferConfig::default()
        };
        let args = config.to_args();
        assert_eq!(args.len(), 5);
        assert!(args.iter().all(|a| a != "--nogui"));
    }
}
