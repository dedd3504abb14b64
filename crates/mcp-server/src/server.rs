//! Newline-delimited JSON-RPC dispatch loop.
//!
//! stdout is the protocol channel: nothing but responses is ever written to
//! the writer.  Diagnostics go through `tracing`, which the binary routes to
//! stderr in MCP mode.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::{
    InitializeResult, JsonRpcError, JsonRpcMessage, JsonRpcResponse, McpToolDef, ServerInfo,
    ToolCallParams, ToolCallResult, ToolsListResult, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};

/// Errors a tool implementation reports at the protocol level.  Business
/// failures belong in a [`ToolCallResult`] with `is_error` set instead.
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Internal(String),
}

impl ToolCallError {
    fn to_rpc(&self) -> JsonRpcError {
        let code = match self {
            Self::UnknownTool(_) => INVALID_PARAMS,
            Self::Internal(_) => INTERNAL_ERROR,
        };
        JsonRpcError::new(code, self.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    #[error("MCP I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The tools exposed by a server.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn server_info(&self) -> ServerInfo;

    fn tools(&self) -> Vec<McpToolDef>;

    async fn call(&self, name: &str, arguments: Value) -> Result<ToolCallResult, ToolCallError>;
}

pub struct McpServer<H> {
    handler: H,
}

impl<H: ToolHandler> McpServer<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<(), McpServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Read one message per line, write one response per request.
    /// Returns at EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), McpServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let json = serde_json::to_string(&response)?;
                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        tracing::info!("MCP input closed");
        Ok(())
    }

    /// Dispatch a single line.  `None` means no response is due
    /// (notifications).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable MCP line");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(PARSE_ERROR, "Parse error"),
                ));
            }
        };

        let message: JsonRpcMessage = match serde_json::from_value(value.clone()) {
            Ok(m) => m,
            Err(_) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::new(INVALID_REQUEST, "Invalid Request"),
                ));
            }
        };

        let Some(id) = message.id.clone() else {
            tracing::debug!(method = %message.method, "MCP notification");
            return None;
        };

        tracing::debug!(method = %message.method, "MCP request");
        let response = match self.dispatch(&message.method, message.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => to_value(&InitializeResult::new(self.handler.server_info())),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_value(&ToolsListResult {
                tools: self.handler.tools(),
            }),
            "tools/call" => {
                let params: ToolCallParams =
                    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|e| {
                        JsonRpcError::new(INVALID_PARAMS, format!("invalid tools/call params: {e}"))
                    })?;
                let arguments = match params.arguments {
                    Value::Null => Value::Object(Default::default()),
                    other => other,
                };
                let result = self
                    .handler
                    .call(&params.name, arguments)
                    .await
                    .map_err(|e| {
                        tracing::warn!(tool = %params.name, error = %e, "tool call rejected");
                        e.to_rpc()
                    })?;
                to_value(&result)
            }
            other => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        fn server_info(&self) -> ServerInfo {
            ServerInfo {
                name: "echo".into(),
                version: "0.0.1".into(),
            }
        }

        fn tools(&self) -> Vec<McpToolDef> {
            vec![McpToolDef {
                name: "echo".into(),
                description: "Echo the arguments".into(),
                input_schema: json!({ "type": "object" }),
            }]
        }

        async fn call(&self, name: &str, arguments: Value) -> Result<ToolCallResult, ToolCallError> {
            match name {
                "echo" => Ok(ToolCallResult::json(&arguments, false)),
                other => Err(ToolCallError::UnknownTool(other.into())),
            }
        }
    }

    async fn roundtrip(line: &str) -> Option<JsonRpcResponse> {
        McpServer::new(Echo).handle_line(line).await
    }

    #[tokio::test]
    async fn ping_returns_empty_object() {
        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).await.unwrap();
        assert_eq!(resp.id, json!(1));
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        assert!(roundtrip(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_32601() {
        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":"x","method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, json!("x"));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_is_32700_with_null_id() {
        let resp = roundtrip("{not json").await.unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn missing_method_is_invalid_request() {
        let resp = roundtrip(r#"{"jsonrpc":"2.0","id":3}"#).await.unwrap();
        assert_eq!(resp.id, json!(3));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn tools_call_dispatches_to_handler() {
        let resp = roundtrip(
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"echo","arguments":{"a":1}}}"#,
        )
        .await
        .unwrap();
        let result: ToolCallResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.content[0].text, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let resp = roundtrip(
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }
}
