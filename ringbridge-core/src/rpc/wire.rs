// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wire types for the bridge RPC protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version advertised during `initialize`.
pub const PROTOCOL_VERSION: u32 = 1;

/// Method names.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
}

/// Error codes, JSON-RPC numbering.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL: i32 = -32000;
}

/// One request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Error half of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub code: i32,
    pub message: String,
}

/// One response line. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Response {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(WireError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for `resources/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReadParams {
    pub uri: String,
}

/// A named, schema-described tool advertised by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A read-only resource advertised by `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_line_shape() {
        let line = r#"{"id": 3, "method": "tools/call", "params": {"name": "configure_buffer", "arguments": {"requirements": "small"}}}"#;
        let request: Request = serde_json::from_str(line).unwrap();
        assert_eq!(request.id, 3);
        assert_eq!(request.method, methods::TOOLS_CALL);

        let params: ToolCallParams = serde_json::from_value(request.params).unwrap();
        assert_eq!(params.name, "configure_buffer");
    }

    #[test]
    fn test_request_params_default_to_null() {
        let request: Request = serde_json::from_str(r#"{"id": 1, "method": "tools/list"}"#).unwrap();
        assert!(request.params.is_null());
    }

    #[test]
    fn test_response_serializes_one_arm() {
        let ok = serde_json::to_value(Response::ok(1, json!({"x": 1}))).unwrap();
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(Response::err(2, codes::METHOD_NOT_FOUND, "nope")).unwrap();
        assert!(err.get("result").is_none());
        assert_eq!(err["error"]["code"], codes::METHOD_NOT_FOUND);
    }
}
