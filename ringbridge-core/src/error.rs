//! Custom error types for the bridge.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.
//!
//! Benchmark executions never surface here: a missing executable, a timeout,
//! or a nonzero exit is reported as data inside `ExecutionResult`. These
//! enums cover the bridge itself - configuration, transport, and dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the bridge.
/// All errors are explicit variants - no catch-all or generic handling.
#[derive(Debug, Error)]
pub enum BridgeError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // RPC Transport Errors - surfaced to the caller, never silently dropped
    // =========================================================================
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcFault),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for value objects and configuration fields.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown buffer type: {value} (expected lockfree, mutex, or concurrent_queue)")]
    UnknownBufferType { value: String },

    #[error("Thread count out of bounds: {count} (must be between 1 and {max})")]
    ThreadCountOutOfBounds { count: u32, max: u32 },

    #[error("Size must be at least 1 MB, got {value}")]
    SizeTooSmall { value: u64 },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },
}

/// RPC transport failures between the HTTP facade and the protocol server.
#[derive(Debug, Error)]
pub enum RpcFault {
    #[error("Failed to spawn protocol server: {reason}")]
    SpawnFailed { reason: String },

    #[error("Protocol server closed the stream")]
    StreamClosed,

    #[error("RPC call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Response id mismatch: expected {expected}, got {got}")]
    IdMismatch { expected: u64, got: u64 },

    #[error("Server returned error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("Wire format error: {0}")]
    Wire(#[from] serde_json::Error),

    #[error("IO error on RPC stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using BridgeError.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::ThreadCountOutOfBounds { count: 32, max: 16 };
        assert!(err.to_string().contains("32"));
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = ValidationError::SizeTooSmall { value: 0 };
        let bridge_err: BridgeError = validation_err.into();
        assert!(matches!(bridge_err, BridgeError::Validation(_)));
    }

    #[test]
    fn test_rpc_fault_chain() {
        let fault = RpcFault::Remote {
            code: -32601,
            message: "unknown tool".to_string(),
        };
        let bridge_err: BridgeError = fault.into();
        assert!(bridge_err.to_string().contains("-32601"));
    }
}
