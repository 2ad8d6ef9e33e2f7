//! MCP server for Space-Track element sets and SGP4 propagation.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Closing the catalog session
//!
//! Requests are handled one at a time, in arrival order, so the catalog
//! session is only ever touched from one place.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, CatalogResult, Lookup};
use crate::mcp::protocol::{
    negotiate_version, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, SERVER_NAME,
};
use crate::mcp::tools::{
    self, ToolCallParams, ToolCallResult, GET_TLES, PROPAGATE_SATELLITE_POSITION,
};
use crate::mcp::transport::LineTransport;
use crate::propagation;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<Value>,
}

/// The MCP server.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: LineTransport,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<&'static str>,
    /// Space-Track client shared by all tool calls.
    catalog: CatalogClient,
}

impl McpServer {
    /// Creates a server on stdio.
    #[must_use]
    pub fn new(catalog: CatalogClient) -> Self {
        Self::with_transport(catalog, LineTransport::stdio())
    }

    /// Creates a server on an arbitrary transport.
    #[must_use]
    pub fn with_transport(catalog: CatalogClient, transport: LineTransport) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            catalog,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub const fn protocol_version(&self) -> Option<&'static str> {
        self.protocol_version
    }

    /// Returns the catalog client.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Logs in to Space-Track ahead of the first tool call.
    ///
    /// # Errors
    ///
    /// Returns the authentication error if the login fails.
    pub async fn connect(&mut self) -> CatalogResult<()> {
        self.catalog.connect().await
    }

    /// Closes the catalog session.
    ///
    /// Errors are logged, never returned, so shutdown always completes.
    pub async fn shutdown(&mut self) {
        self.state = ServerState::ShuttingDown;
        info!("Closing Space-Track session");
        match self.catalog.close().await {
            Ok(()) => info!("Space-Track session closed"),
            Err(e) => warn!(error = %e, "Error while closing Space-Track session"),
        }
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// Returns when the input closes or a termination signal arrives. The
    /// caller is expected to run [`shutdown`](Self::shutdown) afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            info!("Input closed, shutting down");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        use crate::mcp::protocol::parse_message;

        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => self.handle_request(req).await,
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                Ok(())
            }
            Err(error) => {
                debug!(code = error.error.code, "Rejected malformed message");
                self.transport.write_message(&error).await
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> std::io::Result<()> {
        debug!(id = %req.id, method = %req.method, "Request received");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.transport.write_message(&resp).await,
            Err(error) => self.transport.write_message(&error).await,
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                info!("Client initialised, server running");
                self.state = ServerState::Running;
            }
            method => debug!(method, "Ignoring notification"),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req.parse_params("initialize")?;
        let negotiated_version = negotiate_version(&params.protocol_version);

        info!(
            requested = %params.protocol_version,
            negotiated = negotiated_version,
            client = ?params.client_info,
            "Initialising MCP session"
        );

        self.protocol_version = Some(negotiated_version);
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": { "tools": {} },
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": tools::tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &mut self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req.parse_params("tool call")?;
        let result = self.call_tool(&params.name, &params.arguments).await;

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            ));
        }
        Ok(())
    }

    /// Dispatches one tool call.
    pub async fn call_tool(&mut self, name: &str, arguments: &Value) -> ToolCallResult {
        info!(tool = name, "Tool call");
        match name {
            GET_TLES => self.call_get_tles(arguments).await,
            PROPAGATE_SATELLITE_POSITION => self.call_propagate_satellite_position(arguments).await,
            _ => ToolCallResult::error(format!("Unknown tool: {name}")),
        }
    }

    // ==================== Tool Handlers ====================

    /// Retrieves element sets matching the given filters.
    async fn call_get_tles(&mut self, arguments: &Value) -> ToolCallResult {
        let query = match tools::parse_tle_query(arguments, self.catalog.default_limit()) {
            Ok(query) => query,
            Err(message) => return ToolCallResult::error(message),
        };

        debug!(?query, "get_tles");
        let response = self.catalog.fetch_element_sets(&query).await;
        tools::catalog_result(response)
    }

    /// Propagates a satellite's latest element set to the requested epoch.
    async fn call_propagate_satellite_position(&mut self, arguments: &Value) -> ToolCallResult {
        let Some(norad_cat_id) = arguments.get("norad_cat_id").and_then(Value::as_u64) else {
            return ToolCallResult::error(
                "Missing or invalid required parameter: norad_cat_id (integer)",
            );
        };
        let Some(epoch) = arguments.get("epoch").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: epoch (ISO 8601 string)");
        };

        let element_set = match self.catalog.latest_element_set(norad_cat_id).await {
            Lookup::Found(element_set) => element_set,
            Lookup::NotFound => {
                return ToolCallResult::error(format!("No TLEs found for NORAD ID: {norad_cat_id}"));
            }
            Lookup::Failed(reason) => {
                return ToolCallResult::error(format!(
                    "Failed to fetch TLE for NORAD ID {norad_cat_id}: {reason}"
                ));
            }
        };

        let Ok(state) =
            propagation::parse_element_set(&element_set.tle_line1, &element_set.tle_line2)
        else {
            return ToolCallResult::error(format!("Failed to parse TLE for NORAD ID {norad_cat_id}."));
        };

        let Some(target) = tools::parse_epoch(epoch) else {
            return ToolCallResult::error(
                "Invalid epoch format. Please use ISO 8601 (e.g., '2025-12-31T12:00:00Z').",
            );
        };

        match propagation::propagate(&state, &target) {
            Ok(vector) => tools::propagation_result(norad_cat_id, epoch, &vector, &element_set.epoch),
            Err(e) => ToolCallResult::error(format!(
                "Failed to propagate satellite {norad_cat_id} to {epoch}: {e}"
            )),
        }
    }
}
