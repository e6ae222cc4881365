//! Request/response connection to the agent
//!
//! Owns the command socket: a writer task serializes outgoing request
//! lines, a reader task routes reply lines back to the [`RequestTracker`].
//! Call/response matching, per-call timeouts, and cancellation on shutdown
//! all live here so callers only ever see `Result`s.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::commands::{CommandSender, RequestTracker};
use crate::protocol;
use blpanel_core::prelude::*;

/// How often the stale-request sweep runs
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

/// How old a pending request may get before the sweep fails it
const STALE_REQUEST_AGE: Duration = Duration::from_secs(60);

/// Owns the connection to the agent's command socket.
///
/// Cheap [`CommandSender`] clones are handed out to anyone who needs to
/// issue commands; the client itself is kept by the engine so the reader
/// task can be joined and pending requests cancelled on shutdown.
pub struct AgentClient {
    sender: CommandSender,
    tracker: Arc<RequestTracker>,
    reader_handle: JoinHandle<()>,
}

impl AgentClient {
    /// Connect to the command socket and start the writer/reader tasks
    pub async fn connect(path: &Path, shutdown_rx: watch::Receiver<bool>) -> Result<Self> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| Error::agent_connect(path, e.to_string()))?;

        info!("Connected to agent socket: {}", path.display());

        let (read_half, write_half) = stream.into_split();
        let tracker = Arc::new(RequestTracker::default());

        let (write_tx, write_rx) = mpsc::channel::<String>(32);
        tokio::spawn(Self::writer(write_half, write_rx));

        let reader_handle = tokio::spawn(Self::reader(
            read_half,
            Arc::clone(&tracker),
            shutdown_rx.clone(),
        ));

        tokio::spawn(Self::stale_sweep(Arc::clone(&tracker), shutdown_rx));

        Ok(Self {
            sender: CommandSender::new(write_tx, Arc::clone(&tracker)),
            tracker,
            reader_handle,
        })
    }

    /// Get a cloneable handle for issuing commands
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Cancel all pending requests and join the reader task.
    /// The shutdown signal must already have been sent.
    pub async fn shutdown(self) {
        self.tracker.cancel_all().await;
        if let Err(e) = self.reader_handle.await {
            warn!("Agent reader task join failed: {}", e);
        }
    }

    /// Write request lines to the socket
    async fn writer(mut write_half: OwnedWriteHalf, mut rx: mpsc::Receiver<String>) {
        while let Some(request) = rx.recv().await {
            let line = format!("{request}\n");
            if let Err(e) = write_half.write_all(line.as_bytes()).await {
                error!("Failed to write to agent socket: {}", e);
                break;
            }
            if let Err(e) = write_half.flush().await {
                error!("Failed to flush agent socket: {}", e);
                break;
            }
        }

        debug!("Agent writer finished");
    }

    /// Read reply lines and route them to the tracker.
    ///
    /// An unmatched reply (no pending request with that id) is logged and
    /// dropped; a reply that fails to decode never terminates the stream.
    async fn reader(
        read_half: OwnedReadHalf,
        tracker: Arc<RequestTracker>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut lines = BufReader::new(read_half).lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        debug!("Agent reader shutting down");
                        break;
                    }
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        trace!("agent: {}", line);
                        if let Some((id, result, error)) = protocol::parse_response(&line) {
                            if !tracker.handle_response(id, result, error).await {
                                debug!("Reply for unknown request id {}", id);
                            }
                        }
                    }
                    Ok(None) => {
                        info!("Agent socket closed");
                        break;
                    }
                    Err(e) => {
                        error!("Agent socket read failed: {}", e);
                        break;
                    }
                }
            }
        }

        // Outstanding calls can never complete once the reader is gone.
        tracker.cancel_all().await;
        debug!("Agent reader finished");
    }

    /// Periodically fail requests that outlived even the generous cap
    async fn stale_sweep(tracker: Arc<RequestTracker>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let stale = tracker.cleanup_stale(STALE_REQUEST_AGE).await;
                    if !stale.is_empty() {
                        warn!("Timed out {} stale agent request(s)", stale.len());
                    }
                }
            }
        }
    }
}
