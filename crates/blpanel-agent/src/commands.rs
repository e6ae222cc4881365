//! Command building and request tracking for agent communication
//!
//! This module provides:
//! - Request ID tracking for matching responses
//! - Command building for the agent's JSON request format
//! - Timeout handling for stalled commands

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, RwLock};

use blpanel_core::prelude::*;
use blpanel_core::DeviceState;

/// Default time to wait for an agent reply
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Global request ID counter
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID
pub fn next_request_id() -> u64 {
    REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A pending request awaiting response
struct PendingRequest {
    /// Channel to send the response
    response_tx: oneshot::Sender<CommandResponse>,
    /// When this request was created
    created_at: Instant,
    /// Description for logging
    #[allow(dead_code)]
    description: String,
}

/// Response from a command
#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub id: u64,
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn from_agent_reply(id: u64, result: Option<Value>, error: Option<Value>) -> Self {
        Self {
            id,
            success: error.is_none(),
            result,
            error: error.map(|e| match e {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        }
    }

    /// Create a success response
    pub fn success(id: u64, result: Option<Value>) -> Self {
        Self {
            id,
            success: true,
            result,
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// The agent's human-readable status string, for dialogs.
    ///
    /// Falls back to a generic "OK" when the reply carried no payload.
    pub fn status_text(&self) -> String {
        match &self.result {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::from("OK"),
        }
    }

    /// Convert into a `Result`, mapping the error text to [`Error::Agent`]
    pub fn into_result(self) -> Result<Option<Value>> {
        if self.success {
            Ok(self.result)
        } else {
            Err(Error::agent(
                self.error.unwrap_or_else(|| String::from("unknown error")),
            ))
        }
    }
}

/// Tracks pending requests and matches responses
pub struct RequestTracker {
    /// Map of request ID to pending request
    pending: Arc<RwLock<HashMap<u64, PendingRequest>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new pending request
    /// Returns (request_id, receiver for response)
    pub async fn register(&self, description: &str) -> (u64, oneshot::Receiver<CommandResponse>) {
        let id = next_request_id();
        let (tx, rx) = oneshot::channel();

        let pending = PendingRequest {
            response_tx: tx,
            created_at: Instant::now(),
            description: description.to_string(),
        };

        self.pending.write().await.insert(id, pending);

        (id, rx)
    }

    /// Handle an incoming reply from the agent
    /// Returns true if the reply was matched to a pending request
    pub async fn handle_response(
        &self,
        id: u64,
        result: Option<Value>,
        error: Option<Value>,
    ) -> bool {
        if let Some(pending) = self.pending.write().await.remove(&id) {
            let response = CommandResponse::from_agent_reply(id, result, error);
            let _ = pending.response_tx.send(response);
            true
        } else {
            false
        }
    }

    /// Drop one pending request without completing it.
    /// Returns true if the request was still pending.
    pub async fn remove(&self, id: u64) -> bool {
        self.pending.write().await.remove(&id).is_some()
    }

    /// Cancel all pending requests (e.g., on shutdown)
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.write().await;
        for (id, req) in pending.drain() {
            let _ = req.response_tx.send(CommandResponse::error(id, "Request cancelled"));
        }
    }

    /// Remove stale requests that have timed out
    pub async fn cleanup_stale(&self, timeout: Duration) -> Vec<u64> {
        let mut pending = self.pending.write().await;
        let now = Instant::now();

        let stale: Vec<u64> = pending
            .iter()
            .filter(|(_, req)| now.duration_since(req.created_at) > timeout)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some(req) = pending.remove(id) {
                let _ = req.response_tx.send(CommandResponse::error(*id, "Request timed out"));
            }
        }

        stale
    }

    /// Get the number of pending requests
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// The four request/response operations the agent exposes
#[derive(Debug, Clone)]
pub enum AgentCommand {
    /// Trigger a discovery cycle; devices arrive later on the push socket
    Discover,
    /// Query a device's state map (Paired, Connected, Icon, ...)
    DeviceState { address: String },
    /// Pair (if needed) and connect a device
    Connect { address: String },
    /// Disconnect a connected device
    Disconnect { address: String },
    /// Unpair and remove a device on the agent side
    Forget { address: String },
}

impl AgentCommand {
    /// Build the JSON request line for this command
    pub fn build(&self, id: u64) -> String {
        let (method, params) = match self {
            AgentCommand::Discover => ("DiscoverDevices", json!({})),
            AgentCommand::DeviceState { address } => ("DeviceState", json!({ "address": address })),
            AgentCommand::Connect { address } => ("PairConnDevice", json!({ "address": address })),
            AgentCommand::Disconnect { address } => {
                ("DisconnectDevice", json!({ "address": address }))
            }
            AgentCommand::Forget { address } => ("RemoveDevice", json!({ "address": address })),
        };

        json!({
            "id": id,
            "method": method,
            "params": params,
        })
        .to_string()
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            AgentCommand::Discover => "discover devices",
            AgentCommand::DeviceState { .. } => "query device state",
            AgentCommand::Connect { .. } => "connect device",
            AgentCommand::Disconnect { .. } => "disconnect device",
            AgentCommand::Forget { .. } => "forget device",
        }
    }
}

/// Sends commands to the agent with request tracking
#[derive(Clone)]
pub struct CommandSender {
    /// Channel to the writer task that owns the socket's write half
    write_tx: mpsc::Sender<String>,
    /// Request tracker for response matching
    tracker: Arc<RequestTracker>,
    /// Timeout applied by the typed helpers
    timeout: Duration,
}

impl std::fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSender")
            .field("write_tx", &"<channel>")
            .field("tracker", &"<tracker>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommandSender {
    pub fn new(write_tx: mpsc::Sender<String>, tracker: Arc<RequestTracker>) -> Self {
        Self {
            write_tx,
            tracker,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Use a non-default timeout for the typed helpers
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a CommandSender for testing (uses a dummy channel)
    pub fn new_for_test() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self::new(tx, Arc::new(RequestTracker::default()))
    }

    /// Send a command and wait for the reply with the configured timeout
    pub async fn send(&self, command: AgentCommand) -> Result<CommandResponse> {
        self.send_with_timeout(command, self.timeout).await
    }

    /// Send a command with a custom timeout
    pub async fn send_with_timeout(
        &self,
        command: AgentCommand,
        timeout: Duration,
    ) -> Result<CommandResponse> {
        // Register the pending request
        let (id, response_rx) = self.tracker.register(command.description()).await;

        let request = command.build(id);
        debug!("Sending to agent: {}", request);

        self.write_tx
            .send(request)
            .await
            .map_err(|_| Error::channel_send(format!("agent writer gone ({})", command.description())))?;

        match tokio::time::timeout(timeout, response_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => {
                // Drop only this entry so a late reply is not misdelivered;
                // concurrent commands keep their own budgets.
                self.tracker.remove(id).await;
                Err(Error::command_timeout(command.description()))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Typed Operations
    // ─────────────────────────────────────────────────────────────

    /// Trigger a discovery cycle. Success carries no device data; devices
    /// arrive later on the push socket. Concurrent calls are not
    /// deduplicated.
    pub async fn discover(&self) -> Result<()> {
        self.send(AgentCommand::Discover).await?.into_result()?;
        Ok(())
    }

    /// Query a device's state map
    pub async fn device_state(&self, address: &str) -> Result<DeviceState> {
        let result = self
            .send(AgentCommand::DeviceState {
                address: address.to_string(),
            })
            .await?
            .into_result()?;

        DeviceState::from_value(result.unwrap_or(Value::Null))
    }

    /// Connect or disconnect a device depending on `connect`.
    ///
    /// Returns the agent's human-readable status string. Does not update
    /// any local state; callers must re-query to observe the effect.
    pub async fn set_connection(&self, address: &str, connect: bool) -> Result<String> {
        let command = if connect {
            AgentCommand::Connect {
                address: address.to_string(),
            }
        } else {
            AgentCommand::Disconnect {
                address: address.to_string(),
            }
        };

        let response = self.send(command).await?;
        let status = response.status_text();
        response.into_result()?;
        Ok(status)
    }

    /// Ask the agent to unpair and remove a device
    pub async fn forget(&self, address: &str) -> Result<String> {
        let response = self
            .send(AgentCommand::Forget {
                address: address.to_string(),
            })
            .await?;
        let status = response.status_text();
        response.into_result()?;
        Ok(status)
    }
}
