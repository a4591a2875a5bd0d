// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! RPC client session over a spawned protocol-server child process.
//!
//! Each session owns one child: requests go down its stdin, responses come
//! back on its stdout, one JSON document per line. Sessions are short-lived
//! by design - the HTTP facade spawns a fresh one per request and never
//! shares a session across callers, so there is no connection state to
//! protect.

use std::process::Stdio;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::RpcFault;
use crate::rpc::wire::{self, Request, Response};

/// Client session bound to one protocol-server child process.
pub struct RpcSession {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    call_timeout: Duration,
}

impl RpcSession {
    /// Spawn the protocol server and wire up its stdio.
    ///
    /// `call_timeout` must comfortably exceed the benchmark timeout, since a
    /// `run_buffer` response only arrives once the child benchmark finishes.
    pub async fn spawn(
        program: impl AsRef<std::ffi::OsStr>,
        args: &[String],
        call_timeout: Duration,
    ) -> Result<Self, RpcFault> {
        let mut child = Command::new(program.as_ref())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // Server logs go to stderr; let them pass through.
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RpcFault::SpawnFailed {
                reason: format!("{}: {}", program.as_ref().to_string_lossy(), e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| RpcFault::SpawnFailed {
            reason: "child stdin not captured".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| RpcFault::SpawnFailed {
            reason: "child stdout not captured".to_string(),
        })?;

        tracing::debug!(pid = ?child.id(), "Protocol server spawned");

        Ok(Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            next_id: 1,
            call_timeout,
        })
    }

    /// Perform the initialize handshake.
    pub async fn initialize(&mut self) -> Result<Value, RpcFault> {
        self.request(wire::methods::INITIALIZE, Value::Null).await
    }

    /// Invoke a named tool and return its payload.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<Value, RpcFault> {
        self.request(
            wire::methods::TOOLS_CALL,
            json!({ "name": name, "arguments": arguments }),
        )
        .await
    }

    /// Read a named resource body.
    pub async fn read_resource(&mut self, uri: &str) -> Result<Value, RpcFault> {
        self.request(wire::methods::RESOURCES_READ, json!({ "uri": uri }))
            .await
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value, RpcFault> {
        let id = self.next_id;
        self.next_id += 1;

        let request = Request {
            id,
            method: method.to_string(),
            params,
        };

        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        tracing::debug!(id = id, method = %method, "RPC request");

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let response = tokio::time::timeout(self.call_timeout, self.lines.next_line())
            .await
            .map_err(|_| RpcFault::Timeout {
                seconds: self.call_timeout.as_secs(),
            })?
            .map_err(RpcFault::Io)?
            .ok_or(RpcFault::StreamClosed)?;

        let response: Response = serde_json::from_str(&response)?;

        if response.id != id {
            return Err(RpcFault::IdMismatch {
                expected: id,
                got: response.id,
            });
        }

        if let Some(error) = response.error {
            return Err(RpcFault::Remote {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Close the session, giving the server a moment to exit cleanly.
    pub async fn shutdown(mut self) {
        // Closing stdin signals end-of-stream to the server's read loop.
        drop(self.stdin);

        match tokio::time::timeout(Duration::from_secs(2), self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(status = ?status.code(), "Protocol server exited");
            }
            _ => {
                tracing::warn!("Protocol server did not exit; killing");
                let _ = self.child.kill().await;
            }
        }
    }
}
