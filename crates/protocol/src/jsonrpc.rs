//! JSON-RPC 2.0 shapes carried inside a frame.
//!
//! Only single request/response exchanges are modelled; batches and notifications are not.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes used on the wire.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const SERVER_ERROR: i64 = -32000;
    /// The request was well-formed but the resource it names does not exist.
    pub const NOT_FOUND: i64 = 1001;
}

/// A decoded request. Every field is optional on the wire; absent ones decode to `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub method: Value,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_str()
    }

    /// `params` as a map; `null` counts as empty. `None` means the caller sent a non-object.
    pub fn params_map(&self) -> Option<Map<String, Value>> {
        match &self.params {
            Value::Null => Some(Map::new()),
            Value::Object(map) => Some(map.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error")
            .with_data(serde_json::json!({ "details": detail.into() }))
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, "Invalid Request")
            .with_data(serde_json::json!({ "details": detail.into() }))
    }

    pub fn server_error(detail: impl Into<String>) -> Self {
        Self::new(codes::SERVER_ERROR, "Server error")
            .with_data(serde_json::json!({ "details": detail.into() }))
    }
}

/// Exactly one of `result` / `error`, flattened into the response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}
