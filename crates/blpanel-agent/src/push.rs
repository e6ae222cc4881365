//! Push-socket listener
//!
//! Maintains the single long-lived connection to the agent's notification
//! socket. Decoded announcements are forwarded to the Synchronizer's
//! inbound queue; the listener itself never touches the registry.
//!
//! There is no reconnect and no backoff: a connect failure is returned to
//! the caller, and a mid-stream failure or remote close ends the listener
//! for the rest of the process lifetime. Both ends of the stream are
//! reported on the queue so the degraded mode is observable.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::protocol;
use blpanel_core::prelude::*;
use blpanel_core::PushEvent;

/// Supervised reader task for the agent's push socket.
///
/// Unlike a detached daemon thread, the listener owns a [`JoinHandle`] and
/// watches a shutdown signal, so the engine can stop it and join it on
/// exit.
#[derive(Debug)]
pub struct PushListener {
    handle: JoinHandle<()>,
}

impl PushListener {
    /// Connect to the push socket and start the reader task.
    ///
    /// Connect failure is fatal to the listener: the error is returned and
    /// no task is spawned. The process keeps running without push updates.
    pub async fn connect(
        path: &Path,
        event_tx: mpsc::Sender<PushEvent>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self> {
        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| Error::push_connect(path, e.to_string()))?;

        info!("Connected to push socket: {}", path.display());

        let handle = tokio::spawn(Self::read_loop(stream, event_tx, shutdown_rx));

        Ok(Self { handle })
    }

    /// Read lines until EOF, stream error, or shutdown.
    ///
    /// Empty lines are ignored; undecodable lines are logged and skipped
    /// inside [`protocol::parse_announcement`]. Each decoded announcement
    /// becomes one queue item.
    async fn read_loop(
        stream: UnixStream,
        event_tx: mpsc::Sender<PushEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut lines = BufReader::new(stream).lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Push listener shutting down");
                        break;
                    }
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        trace!("push: {}", line);
                        if let Some(announcement) = protocol::parse_announcement(&line) {
                            if event_tx
                                .send(PushEvent::Announcement(announcement))
                                .await
                                .is_err()
                            {
                                debug!("Push event channel closed");
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        // Zero-byte read: the agent closed the socket.
                        info!("Push socket closed by agent");
                        let _ = event_tx.send(PushEvent::Closed).await;
                        break;
                    }
                    Err(e) => {
                        error!("Push socket read failed: {}", e);
                        let _ = event_tx
                            .send(PushEvent::Failed {
                                message: e.to_string(),
                            })
                            .await;
                        break;
                    }
                }
            }
        }

        debug!("Push listener finished");
    }

    /// Wait for the reader task to finish. Call after signalling shutdown.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!("Push listener task join failed: {}", e);
        }
    }
}
