// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP Gateway for the benchmark bridge.
//!
//! REST facade over the stdio protocol server. Every endpoint spawns a
//! fresh protocol-server session (this executable with `serve`), forwards
//! one tool call, and maps the reply; there is no shared state between
//! requests. Transport failures surface as 500 + `{detail}`; tool-level
//! failures stay inside the forwarded payload.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use ringbridge_core::rpc::RpcSession;
use ringbridge_core::{BridgeConfig, BufferConfig, RpcFault};

use crate::metrics;

/// Extra headroom on top of the benchmark timeout for one RPC round trip.
const RPC_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

/// How the gateway launches the protocol server.
#[derive(Debug, Clone)]
pub struct ServerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ServerCommand {
    /// Re-invoke this executable with `serve` and the same config file.
    pub fn from_current_exe(config_path: &str) -> std::io::Result<Self> {
        Ok(Self {
            program: std::env::current_exe()?,
            args: vec!["--config".to_string(), config_path.to_string(), "serve".to_string()],
        })
    }
}

/// Gateway state shared across handlers.
#[derive(Clone)]
struct GatewayState {
    config: Arc<BridgeConfig>,
    server_command: Arc<ServerCommand>,
}

#[derive(Debug, Error)]
enum ApiError {
    #[error("Protocol server error: {0}")]
    Rpc(#[from] RpcFault),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Bridge call failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ConfigureRequest {
    requirements: String,
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    config: BufferConfig,
}

#[derive(Debug, Deserialize)]
struct InterpretRequest {
    execution_output: String,
    config: BufferConfig,
}

pub async fn start_gateway(
    config: BridgeConfig,
    server_command: ServerCommand,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let port = config.gateway.port;
    let state = GatewayState {
        config: Arc::new(config),
        server_command: Arc::new(server_command),
    };

    let app = Router::new()
        .route("/", get(root))
        .route("/analyze-readme", get(analyze_readme))
        .route("/configure-buffer", post(configure_buffer))
        .route("/run-buffer", post(run_buffer))
        .route("/interpret-results", post(interpret_results))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Spawn a session, forward one tool call, and tear the session down.
async fn call_tool(state: &GatewayState, tool: &str, arguments: Value) -> Result<Value, ApiError> {
    let call_id = Uuid::new_v4();
    let call_timeout = state.config.bench.timeout + RPC_TIMEOUT_MARGIN;

    metrics::TOOL_CALLS.with_label_values(&[tool]).inc();
    tracing::info!(call_id = %call_id, tool = %tool, "Forwarding tool call");

    let outcome = async {
        let mut session = RpcSession::spawn(
            &state.server_command.program,
            &state.server_command.args,
            call_timeout,
        )
        .await?;
        session.initialize().await?;
        let result = session.call_tool(tool, arguments).await;
        session.shutdown().await;
        result
    }
    .await;

    match outcome {
        Ok(value) => Ok(value),
        Err(fault) => {
            metrics::TOOL_ERRORS.with_label_values(&[tool]).inc();
            tracing::error!(call_id = %call_id, tool = %tool, error = %fault, "Tool call failed");
            Err(fault.into())
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Ring buffer benchmark bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "HTTP API over the ring-buffer benchmark protocol server",
        "endpoints": {
            "analyze_readme": "GET /analyze-readme",
            "configure_buffer": "POST /configure-buffer",
            "run_buffer": "POST /run-buffer",
            "interpret_results": "POST /interpret-results",
            "health": "GET /health",
        },
    }))
}

async fn analyze_readme(State(state): State<GatewayState>) -> Result<Json<Value>, ApiError> {
    let analysis = call_tool(&state, "analyze_readme", json!({})).await?;
    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
        "tool": "analyze_readme",
    })))
}

async fn configure_buffer(
    State(state): State<GatewayState>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<Value>, ApiError> {
    let configuration = call_tool(
        &state,
        "configure_buffer",
        json!({ "requirements": request.requirements }),
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "configuration": configuration,
        "requirements": request.requirements,
        "tool": "configure_buffer",
    })))
}

async fn run_buffer(
    State(state): State<GatewayState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<Value>, ApiError> {
    let buffer_type = request.config.buffer_type.to_string();
    let timer = metrics::RUN_DURATION
        .with_label_values(&[buffer_type.as_str()])
        .start_timer();

    let arguments = serde_json::to_value(&request.config).map_err(RpcFault::Wire)?;
    let execution_result = call_tool(&state, "run_buffer", arguments).await?;
    timer.observe_duration();

    Ok(Json(json!({
        "success": true,
        "execution_result": execution_result,
        "config_used": request.config,
        "tool": "run_buffer",
    })))
}

async fn interpret_results(
    State(state): State<GatewayState>,
    Json(request): Json<InterpretRequest>,
) -> Result<Json<Value>, ApiError> {
    // The tool analyzes a full execution result; rebuild one around the
    // caller-supplied output so the stdout scan sees their text.
    let execution_result = json!({
        "success": true,
        "exit_code": 0,
        "stdout": request.execution_output,
        "stderr": "",
        "config": request.config,
    });

    let interpretation = call_tool(
        &state,
        "interpret_results",
        json!({ "execution_result": execution_result }),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "interpretation": interpretation,
        "execution_output": request.execution_output,
        "config_analyzed": request.config,
        "tool": "interpret_results",
    })))
}

async fn health(State(state): State<GatewayState>) -> Json<Value> {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match call_tool(&state, "analyze_readme", json!({})).await {
        Ok(_) => Json(json!({
            "status": "healthy",
            "mcp_server": "connected",
            "timestamp": timestamp,
        })),
        Err(e) => Json(json!({
            "status": "unhealthy",
            "mcp_server": "disconnected",
            "error": e.to_string(),
            "timestamp": timestamp,
        })),
    }
}
