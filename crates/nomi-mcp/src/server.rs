//! MCP Server implementation
//!
//! The main server struct that coordinates MCP protocol handling with the
//! tool dispatcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nomi_api::{NomiApi, NomiClient};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::config::{CredentialSource, ServerConfig};
use crate::handlers::Dispatcher;
use crate::protocol::{
    CancelledParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, InitializeParams,
    InitializeResult, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION, ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{ToolDefinition, get_tool_definitions};
use crate::{Error, Result};

/// Name reported to the host in `initialize`
pub const SERVER_NAME: &str = "nomi-ai-server";

/// Cancel reason given to calls still running when input closes
pub const SHUTDOWN_REASON: &str = "server shutting down";

type CancelSender = oneshot::Sender<Option<String>>;

struct InFlight {
    /// JSON-encoded request id; `None` for notifications
    request_id: Option<String>,
    cancel: CancelSender,
}

/// Registration of an in-flight `tools/call`
pub struct PendingCall {
    seq: u64,
    cancelled: oneshot::Receiver<Option<String>>,
}

/// MCP Server for the Nomi API
///
/// # Example
///
/// ```ignore
/// use nomi_mcp::{NomiMcpServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = NomiMcpServer::new(ServerConfig::default())?;
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct NomiMcpServer {
    dispatcher: Dispatcher,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,

    /// Running tool calls, keyed by registration number
    in_flight: Mutex<HashMap<u64, InFlight>>,
    next_call: AtomicU64,
}

impl NomiMcpServer {
    /// Create a server talking to the configured Nomi endpoint
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = NomiClient::with_base_url(&config.base_url)?;
        Ok(Self::with_api(Arc::new(client), config.credentials))
    }

    /// Create a server over any [`NomiApi`] implementation
    pub fn with_api(api: Arc<dyn NomiApi>, credentials: CredentialSource) -> Self {
        Self {
            dispatcher: Dispatcher::new(api, credentials),
            tools: get_tool_definitions(),
            in_flight: Mutex::new(HashMap::new()),
            next_call: AtomicU64::new(0),
        }
    }

    /// Run the MCP server on stdio
    pub async fn run(self) -> Result<()> {
        tracing::info!("Nomi AI MCP Server running on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }

    /// Serve one JSON-RPC message per line from `input` until it closes
    ///
    /// Tool calls run on their own tasks so that cancellations can be
    /// received while they are pending; all other messages are answered
    /// inline. Responses are written to `output` by a single writer task.
    /// When input closes, unfinished tool calls are cancelled and answered
    /// before this returns.
    pub async fn serve<R, W>(self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                output.write_all(line.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut calls = JoinSet::new();
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            while calls.try_join_next().is_some() {}

            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let request = match decode(&line) {
                Ok(request) => request,
                Err(response) => {
                    send(&tx, &response);
                    continue;
                }
            };

            if let Some(response) = unsupported_version(&request) {
                send(&tx, &response);
                continue;
            }

            if request.method == "tools/call" {
                // Register before spawning so a following cancel finds the call
                let pending = server.begin_call(request.id.as_ref());
                let server = Arc::clone(&server);
                let tx = tx.clone();
                calls.spawn(async move {
                    let notification = request.id.is_none();
                    let response = server
                        .handle_tools_call(request.id, request.params, pending)
                        .await;
                    if !notification {
                        send(&tx, &response);
                    }
                });
            } else if let Some(response) = server.handle_request(request).await {
                send(&tx, &response);
            }
        }

        tracing::info!("Input closed, shutting down");

        server.cancel_all(SHUTDOWN_REASON);
        while calls.join_next().await.is_some() {}

        drop(tx);
        writer
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Parses the JSON-RPC request and dispatches to the appropriate handler.
    ///
    /// # Returns
    ///
    /// The JSON-RPC response as a string, or empty string for notifications.
    /// Malformed JSON is returned as `Err`.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let value: Value = serde_json::from_str(message)?;

        let response = match request_from_value(value) {
            Ok(request) => self.handle_request(request).await,
            Err(response) => Some(response),
        };

        match response {
            Some(response) => serde_json::to_string(&response).map_err(Error::from),
            None => Ok(String::new()),
        }
    }

    /// Handle a parsed request; `None` for notifications
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if let Some(response) = unsupported_version(&request) {
            return Some(response);
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "initialized" | "notifications/initialized" => return None,
            "notifications/cancelled" => {
                self.handle_cancelled(request.params);
                return None;
            }
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => {
                let notification = request.id.is_none();
                let pending = self.begin_call(request.id.as_ref());
                let response = self
                    .handle_tools_call(request.id, request.params, pending)
                    .await;
                if notification {
                    return None;
                }
                response
            }
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    /// Handle the initialize request
    ///
    /// Returns server capabilities and info.
    fn handle_initialize(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        match serde_json::from_value::<InitializeParams>(params) {
            Ok(params) => tracing::info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol_version = %params.protocol_version,
                "Client connected"
            ),
            Err(_) => tracing::debug!("initialize without client info"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e)),
        }
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools }))
    }

    /// Handle tools/call request
    ///
    /// Tool failures are reported inside a successful JSON-RPC response with
    /// `isError: true`; only unreadable params produce a JSON-RPC error.
    async fn handle_tools_call(
        &self,
        id: Option<Value>,
        params: Value,
        pending: PendingCall,
    ) -> JsonRpcResponse {
        let PendingCall { seq, cancelled } = pending;

        let response = match serde_json::from_value::<ToolCallParams>(params) {
            Ok(call) => {
                let result = self
                    .dispatcher
                    .invoke_until(&call.name, call.arguments, wait_cancelled(cancelled))
                    .await;
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::error(
                        id,
                        INTERNAL_ERROR,
                        format!("Internal error: {}", e),
                    ),
                }
            }
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        };

        self.finish_call(seq);
        response
    }

    /// Handle notifications/cancelled
    ///
    /// Every running call with the given request id is cancelled. Unknown or
    /// already finished request ids are ignored.
    fn handle_cancelled(&self, params: Value) {
        let Ok(params) = serde_json::from_value::<CancelledParams>(params) else {
            tracing::debug!("Ignoring malformed cancellation");
            return;
        };

        let key = params.request_id.to_string();
        let senders: Vec<CancelSender> = {
            let mut in_flight = self.lock_in_flight();
            let matching: Vec<u64> = in_flight
                .iter()
                .filter(|(_, call)| call.request_id.as_deref() == Some(key.as_str()))
                .map(|(seq, _)| *seq)
                .collect();
            matching
                .into_iter()
                .filter_map(|seq| in_flight.remove(&seq))
                .map(|call| call.cancel)
                .collect()
        };

        if senders.is_empty() {
            tracing::debug!(request_id = %key, "No pending call to cancel");
            return;
        }

        tracing::info!(request_id = %key, reason = ?params.reason, "Cancelling tool call");
        for sender in senders {
            let _ = sender.send(params.reason.clone());
        }
    }

    /// Register a tool call so it can be cancelled by request id
    pub fn begin_call(&self, id: Option<&Value>) -> PendingCall {
        let seq = self.next_call.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = oneshot::channel();
        self.lock_in_flight().insert(
            seq,
            InFlight {
                request_id: id.map(Value::to_string),
                cancel,
            },
        );

        PendingCall { seq, cancelled }
    }

    fn finish_call(&self, seq: u64) {
        self.lock_in_flight().remove(&seq);
    }

    /// Cancel every running tool call
    fn cancel_all(&self, reason: &str) {
        let calls: Vec<InFlight> = self.lock_in_flight().drain().map(|(_, call)| call).collect();
        if calls.is_empty() {
            return;
        }

        tracing::info!(count = calls.len(), "Cancelling unfinished tool calls");
        for call in calls {
            let _ = call.cancel.send(Some(reason.to_string()));
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<u64, InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tool calls currently registered as in flight
    pub fn pending_calls(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Resolve with the cancel reason once the call is cancelled
///
/// A dropped sender means the call finished normally, so that case never
/// resolves.
async fn wait_cancelled(cancelled: oneshot::Receiver<Option<String>>) -> Option<String> {
    match cancelled.await {
        Ok(reason) => reason,
        Err(_) => std::future::pending().await,
    }
}

/// Parse one input line
///
/// Malformed JSON is a parse error. Well-formed JSON that is not a request is
/// an invalid request, answered with its id when one can be read.
fn decode(line: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| parse_error(&e))?;
    request_from_value(value)
}

fn request_from_value(value: Value) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e))
    })
}

fn unsupported_version(request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    (request.jsonrpc != "2.0").then(|| {
        JsonRpcResponse::error(
            request.id.clone(),
            INVALID_REQUEST,
            format!("Invalid Request: unsupported jsonrpc version {}", request.jsonrpc),
        )
    })
}

fn parse_error(err: &serde_json::Error) -> JsonRpcResponse {
    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", err))
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            if tx.send(line).is_err() {
                tracing::error!("Response writer stopped; dropping response");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize response"),
    }
}
