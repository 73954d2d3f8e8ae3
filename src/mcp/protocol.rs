/// Wire types for MCP over newline-delimited JSON-RPC 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::CalendarError;
use crate::storage::StorageError;
use crate::tools::ToolError;

/// Protocol revision announced in `initialize`
pub const MCP_VERSION: &str = "2024-11-05";

/// An incoming request or notification
///
/// Requests without an `id` are notifications and get no response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    /// e.g. "tools/call"
    pub method: String,
    pub params: Option<Value>,
}

/// Outgoing reply; exactly one of `result` and `error` is set
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Echoes the request id, or null when the request could not be parsed
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// See `error_codes`
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `params` of a `tools/call` request
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    /// Missing arguments decode as an empty object
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Result of a `tools/call`
///
/// Tool failures are reported here with `is_error` set rather than as
/// JSON-RPC errors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
    /// Application error code for failed calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ToolContent {
    /// Always "text" here
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// One entry of `tools/list`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Generated from the params struct
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// The tool list never changes at runtime
    pub list_changed: bool,
}

/// Reply to `initialize`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Standard JSON-RPC codes plus the application range
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    /// Not a JSON-RPC 2.0 request object
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Also used for tool arguments that fail to decode
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Unknown user, habit or goal
    pub const NOT_FOUND: i32 = -32001;
    /// Bad view kind, timezone, date, range, week start or period
    pub const CALENDAR_VALIDATION: i32 = -32002;
    /// Entity field validation
    pub const VALIDATION_ERROR: i32 = -32003;
    /// The datastore could not serve the request
    pub const STORAGE_ERROR: i32 = -32004;
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }
}

impl ToolCallResult {
    pub fn success(text: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error: false,
            error_code: None,
        }
    }

    /// Failed call; the text is prefixed with "Error: "
    pub fn error(error_message: String, code: i32) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: format!("Error: {}", error_message),
            }],
            is_error: true,
            error_code: Some(code),
        }
    }
}

fn storage_error_code(error: &StorageError) -> i32 {
    match error {
        StorageError::UserNotFound { .. }
        | StorageError::HabitNotFound { .. }
        | StorageError::EntryNotFound { .. }
        | StorageError::GoalNotFound { .. } => error_codes::NOT_FOUND,
        StorageError::Query(_) | StorageError::Connection(_) | StorageError::Migration(_) => {
            error_codes::STORAGE_ERROR
        }
        StorageError::Serialization(_) => error_codes::INTERNAL_ERROR,
    }
}

/// Map a tool failure to its application error code
pub fn tool_error_code(error: &ToolError) -> i32 {
    match error {
        ToolError::Calendar(CalendarError::DatastoreUnavailable(storage)) => storage_error_code(storage),
        ToolError::Calendar(_) => error_codes::CALENDAR_VALIDATION,
        ToolError::Domain(_) | ToolError::InvalidArgument { .. } => error_codes::VALIDATION_ERROR,
        ToolError::Storage(storage) => storage_error_code(storage),
    }
}
