// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Request/response RPC over newline-delimited JSON.
//!
//! The protocol server reads one request per line on stdin and writes one
//! response per line on stdout; the client half spawns the server as a child
//! process and owns both pipes. The transport is treated as reliable and
//! ordered - framing is a single `\n`, matching by request id.

pub mod client;
pub mod wire;

pub use client::RpcSession;
pub use wire::{Request, Response, ToolDescriptor, WireError};
