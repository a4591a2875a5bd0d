// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Stdio protocol server.
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Each request is dispatched on its own task and the
//! responses are funneled through a single writer, so a slow benchmark run
//! never blocks the read loop and concurrent requests do not serialize
//! behind it. Logs go to stderr only; stdout belongs to the protocol.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use uuid::Uuid;

use ringbridge_core::rpc::wire::{
    self, codes, Request, ResourceDescriptor, ResourceReadParams, Response, ToolCallParams,
    ToolDescriptor,
};
use ringbridge_core::types::MAX_THREADS;
use ringbridge_core::{advisor, analysis, BenchmarkRunner, BridgeConfig, BufferConfig};

const SERVER_NAME: &str = "ringbridge";

const README_URI: &str = "file:///ring_buffer_docs/readme";
const ANALYSIS_URI: &str = "file:///ring_buffer_docs/analysis";
const TEMPLATES_URI: &str = "file:///buffer_configs/templates";

/// Run the protocol server over this process's stdio until EOF.
pub async fn run(config: BridgeConfig) -> std::io::Result<()> {
    let config = Arc::new(config);
    let session = Uuid::new_v4();
    tracing::info!(session = %session, "Protocol server listening on stdio");

    let (tx, mut rx) = mpsc::channel::<Response>(32);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line = match serde_json::to_string(&response) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode response");
                    continue;
                }
            };
            line.push('\n');
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                let config = Arc::clone(&config);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let id = request.id;
                    let response = dispatch(&config, request).await;
                    if tx.send(response).await.is_err() {
                        tracing::warn!(id = id, "Writer gone; dropping response");
                    }
                });
            }
            Err(e) => {
                let response =
                    Response::err(0, codes::PARSE_ERROR, format!("Invalid request: {}", e));
                if tx.send(response).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(tx);
    let _ = writer.await;
    tracing::info!(session = %session, "Protocol server stdin closed; exiting");
    Ok(())
}

/// Route one request to its handler.
async fn dispatch(config: &BridgeConfig, request: Request) -> Response {
    tracing::debug!(id = request.id, method = %request.method, "Dispatching request");

    match request.method.as_str() {
        wire::methods::INITIALIZE => Response::ok(
            request.id,
            json!({
                "server": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "protocol_version": wire::PROTOCOL_VERSION,
                "capabilities": { "tools": true, "resources": true },
            }),
        ),
        wire::methods::TOOLS_LIST => {
            Response::ok(request.id, json!({ "tools": tool_descriptors() }))
        }
        wire::methods::TOOLS_CALL => match serde_json::from_value::<ToolCallParams>(request.params)
        {
            Ok(params) => call_tool(config, request.id, params).await,
            Err(e) => Response::err(
                request.id,
                codes::INVALID_PARAMS,
                format!("Invalid tool call params: {}", e),
            ),
        },
        wire::methods::RESOURCES_LIST => {
            Response::ok(request.id, json!({ "resources": resource_descriptors() }))
        }
        wire::methods::RESOURCES_READ => {
            match serde_json::from_value::<ResourceReadParams>(request.params) {
                Ok(params) => read_resource(config, request.id, &params.uri),
                Err(e) => Response::err(
                    request.id,
                    codes::INVALID_PARAMS,
                    format!("Invalid resource read params: {}", e),
                ),
            }
        }
        other => Response::err(
            request.id,
            codes::METHOD_NOT_FOUND,
            format!("Unknown method: {}", other),
        ),
    }
}

/// Invoke one of the four tools.
///
/// Tool-level failures (missing executable, timeout, nonzero exit) are data
/// in the payload; only malformed arguments and unknown names become RPC
/// errors.
async fn call_tool(config: &BridgeConfig, id: u64, params: ToolCallParams) -> Response {
    match params.name.as_str() {
        "analyze_readme" => {
            let analysis = analysis::analyze(&config.bench.root);
            match serde_json::to_value(&analysis) {
                Ok(value) => Response::ok(id, value),
                Err(e) => Response::err(id, codes::INTERNAL, e.to_string()),
            }
        }
        "configure_buffer" => {
            let requirements = match params.arguments.get("requirements").and_then(Value::as_str) {
                Some(requirements) => requirements.to_string(),
                None => {
                    return Response::err(
                        id,
                        codes::INVALID_PARAMS,
                        "configure_buffer requires a 'requirements' string",
                    )
                }
            };
            let derived = advisor::configure(&requirements);
            Response::ok(
                id,
                json!({
                    "configuration": derived,
                    "explanation": format!(
                        "Generated configuration based on requirements: '{}'",
                        requirements
                    ),
                }),
            )
        }
        "run_buffer" => {
            // Absent arguments mean "run with defaults".
            let arguments = if params.arguments.is_null() {
                json!({})
            } else {
                params.arguments
            };
            let buffer_config = match serde_json::from_value::<BufferConfig>(arguments) {
                Ok(buffer_config) => buffer_config,
                Err(e) => {
                    return Response::err(
                        id,
                        codes::INVALID_PARAMS,
                        format!("Invalid buffer config: {}", e),
                    )
                }
            };

            let runner = BenchmarkRunner::new(&config.bench.root, &config.bench.executable)
                .with_timeout(config.bench.timeout);
            let result = runner.run(&buffer_config).await;

            match serde_json::to_value(&result) {
                Ok(value) => Response::ok(id, value),
                Err(e) => Response::err(id, codes::INTERNAL, e.to_string()),
            }
        }
        "interpret_results" => {
            let execution_result = params
                .arguments
                .get("execution_result")
                .cloned()
                .unwrap_or(Value::Null);
            let execution_result = if execution_result.is_null() {
                json!({})
            } else {
                execution_result
            };
            match serde_json::from_value(execution_result) {
                Ok(execution_result) => {
                    let interpretation = advisor::interpret(&execution_result);
                    match serde_json::to_value(&interpretation) {
                        Ok(value) => Response::ok(id, value),
                        Err(e) => Response::err(id, codes::INTERNAL, e.to_string()),
                    }
                }
                Err(e) => Response::err(
                    id,
                    codes::INVALID_PARAMS,
                    format!("Invalid execution result: {}", e),
                ),
            }
        }
        other => Response::err(
            id,
            codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {}", other),
        ),
    }
}

fn read_resource(config: &BridgeConfig, id: u64, uri: &str) -> Response {
    let text = match uri {
        README_URI => Ok(analysis::load_readme(&config.bench.root)),
        ANALYSIS_URI => serde_json::to_string_pretty(&analysis::analyze(&config.bench.root)),
        TEMPLATES_URI => serde_json::to_string_pretty(&analysis::templates()),
        other => {
            return Response::err(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Unknown resource URI: {}", other),
            )
        }
    };

    match text {
        Ok(text) => Response::ok(id, json!({ "uri": uri, "text": text })),
        Err(e) => Response::err(id, codes::INTERNAL, e.to_string()),
    }
}

fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "analyze_readme".to_string(),
            description:
                "Analyze the benchmark README and provide insights about features and capabilities"
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        },
        ToolDescriptor {
            name: "configure_buffer".to_string(),
            description: "Help configure buffer parameters based on user requirements".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "requirements": {
                        "type": "string",
                        "description": "User requirements for buffer configuration (e.g., 'high performance with 4 producers and 2 consumers')",
                    }
                },
                "required": ["requirements"],
            }),
        },
        ToolDescriptor {
            name: "run_buffer".to_string(),
            description: "Execute the ring-buffer benchmark with specified parameters".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "buffer_type": {
                        "type": "string",
                        "enum": ["lockfree", "mutex", "concurrent_queue"],
                        "description": "Type of buffer implementation to use",
                        "default": "mutex",
                    },
                    "producers": {
                        "type": "integer",
                        "description": "Number of producer threads",
                        "default": 1,
                        "minimum": 1,
                        "maximum": MAX_THREADS,
                    },
                    "consumers": {
                        "type": "integer",
                        "description": "Number of consumer threads",
                        "default": 1,
                        "minimum": 1,
                        "maximum": MAX_THREADS,
                    },
                    "buffer_size_mb": {
                        "type": "integer",
                        "description": "Buffer size in megabytes",
                        "default": 1,
                        "minimum": 1,
                        "maximum": 100,
                    },
                    "total_transfer_mb": {
                        "type": "integer",
                        "description": "Total data transfer in megabytes",
                        "default": 100,
                        "minimum": 1,
                        "maximum": 10000,
                    }
                },
                "required": [],
            }),
        },
        ToolDescriptor {
            name: "interpret_results".to_string(),
            description: "Analyze buffer performance output and provide recommendations"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "execution_result": {
                        "type": "object",
                        "description": "Result from run_buffer tool execution",
                    }
                },
                "required": ["execution_result"],
            }),
        },
    ]
}

fn resource_descriptors() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: README_URI.to_string(),
            name: "Ring Buffer README".to_string(),
            description: "Complete README documentation for the benchmark program".to_string(),
            mime_type: "text/markdown".to_string(),
        },
        ResourceDescriptor {
            uri: ANALYSIS_URI.to_string(),
            name: "Ring Buffer Analysis".to_string(),
            description: "Analyzed information about benchmark features and capabilities"
                .to_string(),
            mime_type: "application/json".to_string(),
        },
        ResourceDescriptor {
            uri: TEMPLATES_URI.to_string(),
            name: "Buffer Configuration Templates".to_string(),
            description: "Common buffer configuration templates for different use cases"
                .to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbridge_core::ConfigLoader;

    fn test_config() -> BridgeConfig {
        ConfigLoader::load_string("bench:\n  root: /nonexistent\n").unwrap()
    }

    fn request(id: u64, method: &str, params: Value) -> Request {
        Request {
            id,
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize_reports_capabilities() {
        let response = dispatch(&test_config(), request(1, "initialize", Value::Null)).await;
        let result = response.result.unwrap();
        assert_eq!(result["server"], SERVER_NAME);
        assert_eq!(result["capabilities"]["tools"], true);
    }

    #[tokio::test]
    async fn test_tools_list_has_four_tools() {
        let response = dispatch(&test_config(), request(1, "tools/list", Value::Null)).await;
        let result = response.result.unwrap();
        assert_eq!(result["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = dispatch(&test_config(), request(7, "tools/destroy", Value::Null)).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, codes::METHOD_NOT_FOUND);
        assert_eq!(response.id, 7);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let params = json!({ "name": "format_disk", "arguments": {} });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        assert_eq!(response.error.unwrap().code, codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_configure_buffer_tool() {
        let params = json!({
            "name": "configure_buffer",
            "arguments": { "requirements": "lockfree with 4 producers and 2 consumers" },
        });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        let result = response.result.unwrap();
        assert_eq!(result["configuration"]["buffer_type"], "lockfree");
        assert_eq!(result["configuration"]["producers"], 4);
        assert!(result["explanation"]
            .as_str()
            .unwrap()
            .contains("lockfree with 4 producers"));
    }

    #[tokio::test]
    async fn test_configure_buffer_requires_requirements() {
        let params = json!({ "name": "configure_buffer", "arguments": {} });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        assert_eq!(response.error.unwrap().code, codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_run_buffer_missing_executable_is_payload_not_error() {
        let params = json!({ "name": "run_buffer", "arguments": { "buffer_type": "mutex" } });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        let result = response.result.unwrap();
        assert_eq!(result["success"], false);
        assert!(result["build_instructions"].as_str().unwrap().contains("cmake"));
    }

    #[tokio::test]
    async fn test_run_buffer_rejects_invalid_config() {
        let params = json!({ "name": "run_buffer", "arguments": { "producers": 0 } });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        assert_eq!(response.error.unwrap().code, codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_interpret_results_tool() {
        let params = json!({
            "name": "interpret_results",
            "arguments": {
                "execution_result": {
                    "success": true,
                    "stdout": "Throughput: 1 GB/s",
                    "config": { "buffer_type": "lockfree" },
                }
            }
        });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        let result = response.result.unwrap();
        assert_eq!(
            result["interpretation"],
            "Buffer execution completed successfully"
        );
        assert_eq!(result["performance_notes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_interpret_results_empty_object_takes_failure_branch() {
        let params = json!({ "name": "interpret_results", "arguments": { "execution_result": {} } });
        let response = dispatch(&test_config(), request(1, "tools/call", params)).await;
        let result = response.result.unwrap();
        assert_eq!(result["interpretation"], "Execution failed");
        assert_eq!(result["recommendations"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_resources_list_and_read() {
        let response = dispatch(&test_config(), request(1, "resources/list", Value::Null)).await;
        let result = response.result.unwrap();
        assert_eq!(result["resources"].as_array().unwrap().len(), 3);

        let params = json!({ "uri": TEMPLATES_URI });
        let response = dispatch(&test_config(), request(2, "resources/read", params)).await;
        let result = response.result.unwrap();
        assert!(result["text"].as_str().unwrap().contains("high_performance"));
    }

    #[tokio::test]
    async fn test_resources_read_unknown_uri() {
        let params = json!({ "uri": "file:///secrets" });
        let response = dispatch(&test_config(), request(1, "resources/read", params)).await;
        assert_eq!(response.error.unwrap().code, codes::METHOD_NOT_FOUND);
    }
}
