//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}
//!
//! also provides format string templating for flexible scripting support

use serde::Serialize;
use std::io::IsTerminal;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
    /// one item name per line
    Names,
    /// custom format string with {field} placeholders
    Format,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > names > format > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool, names: bool, format: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if names {
            return Self::Names;
        }
        if format {
            return Self::Format;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// polcfg exit code offset by -32000
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// additional error data
#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    /// every diagnostic when a command collects more than one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl JsonRpcError {
    /// create error with standard JSON-RPC error code range
    /// polcfg uses -32000 to -32099 for application errors (per JSON-RPC spec)
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    pub fn with_data(
        code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
        details: Vec<String>,
    ) -> Self {
        let suggestions = non_empty(suggestions);
        let details = non_empty(details);
        let data = if suggestions.is_none() && details.is_none() {
            None
        } else {
            Some(ErrorData {
                suggestions,
                details,
            })
        };

        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data,
            },
            id: None,
        }
    }
}

/// convert polcfg exit code to JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(code: i32) -> i32 {
    -32000 - code
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

/// result data for the compile command
#[derive(Serialize)]
pub struct CompileData {
    pub expression: String,
    /// canonical rendering of the compiled tree
    pub canonical: String,
    /// attributes needed to evaluate the expression
    pub attributes: Vec<String>,
    pub conditions: usize,
}

/// result data for the check command
#[derive(Serialize)]
pub struct CheckData {
    pub path: String,
    pub status_managers: Vec<String>,
    pub fileclasses: Vec<FileClassData>,
    pub policies: Vec<PolicyData>,
}

#[derive(Serialize)]
pub struct FileClassData {
    pub name: String,
    pub definition: String,
    pub attributes: Vec<String>,
}

#[derive(Serialize)]
pub struct PolicyData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub rules: Vec<RuleData>,
}

#[derive(Serialize)]
pub struct RuleData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub condition: String,
    pub attributes: Vec<String>,
}

/// one row of the criteria table
#[derive(Serialize)]
pub struct CriterionData {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub comparable: bool,
    pub constraints: Vec<String>,
    pub attributes: Vec<String>,
}

/// generated configuration text (template or defaults)
#[derive(Serialize)]
pub struct TextData {
    pub text: String,
}

/// replace {field} placeholders in a template with values from serializable data
pub fn format_template<T: Serialize>(template: &str, data: &T) -> String {
    let value = match serde_json::to_value(data) {
        Ok(v) => v,
        Err(_) => return template.to_string(),
    };

    let mut result = template.to_string();

    if let serde_json::Value::Object(map) = value {
        for (key, val) in map {
            let placeholder = format!("{{{}}}", key);
            let replacement = match val {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Array(arr) => arr
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                serde_json::Value::Object(_) => val.to_string(),
            };
            result = result.replace(&placeholder, &replacement);
        }
    }

    result
}

pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

pub fn print_json_error(code: i32, message: &str) {
    let error = JsonRpcError::new(code, message);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}

pub fn print_json_error_with_data(
    code: i32,
    message: &str,
    suggestions: Vec<String>,
    details: Vec<String>,
) {
    let error = JsonRpcError::with_data(code, message, suggestions, details);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}
