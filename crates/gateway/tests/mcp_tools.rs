mod common;

use serde_json::{json, Value};
use sg_gateway::mcp::ScheduleTools;
use sg_mcp::protocol::{JsonRpcResponse, INVALID_PARAMS};
use sg_mcp::McpServer;

use common::{forty_hour_payload, harness, Harness};

fn server(h: &Harness) -> McpServer<ScheduleTools> {
    McpServer::new(ScheduleTools::new(h.state.clone()))
}

async fn call(server: &McpServer<ScheduleTools>, id: u64, name: &str, arguments: Value) -> JsonRpcResponse {
    let line = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
    .to_string();
    server.handle_line(&line).await.expect("requests get a response")
}

/// Decode the single JSON text item of a tool result.
fn tool_body(resp: &JsonRpcResponse) -> (bool, Value) {
    let result = resp.result.as_ref().expect("tool call should succeed at the RPC level");
    let text = result["content"][0]["text"].as_str().unwrap();
    (result["isError"].as_bool().unwrap(), serde_json::from_str(text).unwrap())
}

#[tokio::test]
async fn lists_the_three_tools() {
    let h = harness();
    let resp = server(&h)
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
        .await
        .unwrap();
    let names: Vec<&str> = resp.result.as_ref().unwrap()["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["generate_schedule", "validate_schedule", "health"]);
}

#[tokio::test]
async fn generate_schedule_registers_a_download() {
    let h = harness();
    let srv = server(&h);
    let resp = call(&srv, 2, "generate_schedule", json!({ "payload": forty_hour_payload() })).await;

    let (is_error, body) = tool_body(&resp);
    assert!(!is_error);
    assert_eq!(body["ok"], true);
    assert_eq!(body["project_total_duration_display"], "40:00:00");
    assert!(body["download_url"].as_str().unwrap().contains("/download/"));
    assert_eq!(h.state.registry.len(), 1);
}

#[tokio::test]
async fn validation_failures_are_tool_errors() {
    let h = harness();
    let srv = server(&h);
    let payload = json!({ "project": { "name": "P" }, "macros": [{ "name": "A", "micros": [] }] });
    let resp = call(&srv, 3, "validate_schedule", json!({ "payload": payload })).await;

    assert!(resp.error.is_none());
    let (is_error, body) = tool_body(&resp);
    assert!(is_error);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["issue"], "EMPTY_MICROS");
}

#[tokio::test]
async fn missing_payload_is_reported_not_crashed() {
    let h = harness();
    let srv = server(&h);
    let resp = call(&srv, 4, "generate_schedule", json!({})).await;

    let (is_error, body) = tool_body(&resp);
    assert!(is_error);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(h.state.registry.is_empty());
}

#[tokio::test]
async fn health_tool_reports_service() {
    let h = harness();
    let (is_error, body) = tool_body(&call(&server(&h), 5, "health", json!({})).await);
    assert!(!is_error);
    assert_eq!(body["service"], "schedgen");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let h = harness();
    let resp = call(&server(&h), 6, "delete_everything", json!({})).await;
    assert!(resp.result.is_none());
    assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
}
