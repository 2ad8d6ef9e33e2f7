//! Integration tests for the MCP tools and the server loop.

mod common;

use serde_json::{json, Value};
use tokio::io::{duplex, AsyncReadExt};

use common::{decaying_records, iss_records, FakeSpaceTrack, ISS_LINE1, ISS_LINE2};
use spacetrack_mcp::catalog::HttpReply;
use spacetrack_mcp::mcp::server::{McpServer, ServerState};
use spacetrack_mcp::mcp::transport::LineTransport;
use spacetrack_mcp::mcp::{ToolCallResult, GET_TLES, PROPAGATE_SATELLITE_POSITION};

fn server_for(fake: &FakeSpaceTrack) -> McpServer {
    let input: &[u8] = b"";
    McpServer::with_transport(fake.client(), LineTransport::new(input, tokio::io::sink()))
}

fn body(result: &ToolCallResult) -> Value {
    serde_json::from_str(result.first_text().unwrap()).unwrap()
}

fn error_message(result: &ToolCallResult) -> String {
    assert!(result.is_error, "expected an error result");
    body(result)["error"].as_str().unwrap().to_string()
}

// =============================================================================
// get_tles
// =============================================================================

#[tokio::test]
async fn get_tles_returns_records_as_json() {
    let fake = FakeSpaceTrack::new().route("NORAD_CAT_ID/25544", HttpReply::json(200, iss_records()));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(GET_TLES, &json!({ "norad_cat_id": 25544 }))
        .await;

    assert!(!result.is_error);
    let records = body(&result);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["TLE_LINE1"], ISS_LINE1);
}

#[tokio::test]
async fn get_tles_returns_text_verbatim() {
    let text = format!("{ISS_LINE1}\n{ISS_LINE2}\n");
    let fake = FakeSpaceTrack::new().route("format/tle", HttpReply::text(200, text.clone()));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            GET_TLES,
            &json!({ "norad_cat_id": 25544, "format_type": "tle", "limit": 1 }),
        )
        .await;

    assert!(!result.is_error);
    assert_eq!(result.first_text(), Some(text.as_str()));
    // limit is not a tool argument; the configured limit always applies
    assert!(fake.traffic().queries[0].contains("/format/tle/LIMIT/10/"));
}

#[tokio::test]
async fn get_tles_rejects_unknown_format() {
    let fake = FakeSpaceTrack::new();
    let mut server = server_for(&fake);

    let result = server
        .call_tool(GET_TLES, &json!({ "format_type": "kvn" }))
        .await;

    assert!(error_message(&result).contains("format_type"));
    assert!(fake.traffic().queries.is_empty());
}

#[tokio::test]
async fn get_tles_uses_configured_limit() {
    let fake = FakeSpaceTrack::new();
    let mut server = server_for(&fake);

    server.call_tool(GET_TLES, &json!({})).await;

    assert!(fake.traffic().queries[0].contains("/LIMIT/10/"));
}

// =============================================================================
// propagate_satellite_position
// =============================================================================

#[tokio::test]
async fn propagates_latest_element_set() {
    let fake = FakeSpaceTrack::new().route("NORAD_CAT_ID/25544", HttpReply::json(200, iss_records()));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            PROPAGATE_SATELLITE_POSITION,
            &json!({ "norad_cat_id": 25544, "epoch": "2008-09-20T12:25:40Z" }),
        )
        .await;

    assert!(!result.is_error);
    let state = body(&result);
    assert_eq!(state["norad_cat_id"], 25544);
    assert_eq!(state["target_epoch"], "2008-09-20T12:25:40Z");
    assert_eq!(state["tle_epoch"], "2008-09-20T12:25:40.104192");

    let position: Vec<f64> = serde_json::from_value(state["position_km"].clone()).unwrap();
    let velocity: Vec<f64> = serde_json::from_value(state["velocity_km_per_s"].clone()).unwrap();
    assert_eq!(position.len(), 3);
    assert_eq!(velocity.len(), 3);

    let radius = position.iter().map(|c| c * c).sum::<f64>().sqrt();
    assert!((6_600.0..7_000.0).contains(&radius), "radius {radius}");
}

#[tokio::test]
async fn propagate_rejects_invalid_epoch() {
    let fake = FakeSpaceTrack::new().route("NORAD_CAT_ID/25544", HttpReply::json(200, iss_records()));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            PROPAGATE_SATELLITE_POSITION,
            &json!({ "norad_cat_id": 25544, "epoch": "next tuesday" }),
        )
        .await;

    assert_eq!(
        error_message(&result),
        "Invalid epoch format. Please use ISO 8601 (e.g., '2025-12-31T12:00:00Z')."
    );
}

#[tokio::test]
async fn propagate_reports_unknown_satellite() {
    let fake = FakeSpaceTrack::new();
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            PROPAGATE_SATELLITE_POSITION,
            &json!({ "norad_cat_id": 25544, "epoch": "2025-01-01T00:00:00Z" }),
        )
        .await;

    assert_eq!(error_message(&result), "No TLEs found for NORAD ID: 25544");
}

#[tokio::test]
async fn propagate_reports_unparseable_element_lines() {
    let records = json!([{
        "EPOCH": "2024-01-01T00:00:00",
        "TLE_LINE1": "1 25544U not a tle",
        "TLE_LINE2": "2 25544 also not a tle",
    }])
    .to_string();
    let fake = FakeSpaceTrack::new().route("NORAD_CAT_ID/25544", HttpReply::json(200, records));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            PROPAGATE_SATELLITE_POSITION,
            &json!({ "norad_cat_id": 25544, "epoch": "2024-01-01T00:00:00Z" }),
        )
        .await;

    assert_eq!(error_message(&result), "Failed to parse TLE for NORAD ID 25544.");
}

#[tokio::test]
async fn propagate_reports_sgp4_failure() {
    let fake =
        FakeSpaceTrack::new().route("NORAD_CAT_ID/28872", HttpReply::json(200, decaying_records()));
    let mut server = server_for(&fake);

    let result = server
        .call_tool(
            PROPAGATE_SATELLITE_POSITION,
            &json!({ "norad_cat_id": 28872, "epoch": "2006-11-29T00:00:00Z" }),
        )
        .await;

    assert!(result.is_error);
    let serialised = serde_json::to_value(&result).unwrap();
    assert_eq!(serialised["isError"], true);
    assert!(error_message(&result)
        .starts_with("Failed to propagate satellite 28872 to 2006-11-29T00:00:00Z: "));
}

// =============================================================================
// Server Loop
// =============================================================================

#[tokio::test]
async fn full_session_over_transport() {
    let fake = FakeSpaceTrack::new().route("NORAD_CAT_ID/25544", HttpReply::json(200, iss_records()));

    let input = [
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0.0" }
            }
        }),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {
                "name": "propagate_satellite_position",
                "arguments": { "norad_cat_id": 25544, "epoch": "2008-09-20T13:00:00Z" }
            }
        }),
        json!({ "jsonrpc": "2.0", "id": 4, "method": "resources/list" }),
        json!({ "jsonrpc": "2.0", "id": 5, "method": "ping" }),
    ]
    .iter()
    .map(|message| format!("{message}\n"))
    .collect::<String>();

    let input: &'static [u8] = Box::leak(input.into_bytes().into_boxed_slice());
    let (mut client, server_end) = duplex(1 << 20);
    let mut server = McpServer::with_transport(fake.client(), LineTransport::new(input, server_end));

    server.run().await.unwrap();
    assert_eq!(server.state(), ServerState::ShuttingDown);
    assert_eq!(server.protocol_version(), Some("2024-11-05"));

    server.shutdown().await;
    assert_eq!(fake.traffic().logouts, 1);
    drop(server);

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    let responses: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "spacetrack-mcp");

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(names, [GET_TLES, PROPAGATE_SATELLITE_POSITION]);

    assert_eq!(responses[2]["id"], 3);
    assert!(responses[2]["result"].get("isError").is_none());
    let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    let state: Value = serde_json::from_str(text).unwrap();
    assert_eq!(state["norad_cat_id"], 25544);

    assert_eq!(responses[3]["id"], 4);
    assert_eq!(responses[3]["error"]["code"], -32601);

    assert_eq!(responses[4]["id"], 5);
    assert_eq!(responses[4]["result"], json!({}));
}

#[tokio::test]
async fn tools_are_unavailable_before_initialisation() {
    let fake = FakeSpaceTrack::new();
    let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n";
    let (mut client, server_end) = duplex(1 << 16);
    let mut server = McpServer::with_transport(fake.client(), LineTransport::new(input, server_end));

    server.run().await.unwrap();
    drop(server);

    let mut output = String::new();
    client.read_to_string(&mut output).await.unwrap();
    let response: Value = serde_json::from_str(output.trim_end()).unwrap();
    assert_eq!(response["id"], 1);
    assert_eq!(response["error"]["code"], -32600);
    assert!(fake.traffic().queries.is_empty());
}
