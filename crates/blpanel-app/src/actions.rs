//! Action handlers: agent command dispatch and completion routing
//!
//! Each agent-bound action becomes one spawned task; the task's outcome
//! re-enters the synchronizer queue as a completion message, so all
//! registry mutation and rendering still happen on the single consumer
//! loop. Failures are turned into messages, never panics, and nothing is
//! retried automatically.

use tokio::sync::mpsc;

use crate::handler::UpdateAction;
use crate::message::Message;
use blpanel_agent::CommandSender;
use blpanel_core::prelude::*;

/// Execute an agent-bound action by spawning a background task.
///
/// `Notify` actions never reach this function; the engine handles them
/// inline because they need the presenter.
pub fn handle_action(action: UpdateAction, msg_tx: mpsc::Sender<Message>, sender: CommandSender) {
    match action {
        UpdateAction::TriggerDiscover => {
            tokio::spawn(async move {
                let message = match sender.discover().await {
                    Ok(()) => Message::DiscoverFinished,
                    Err(e) => Message::DiscoverFailed {
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(message).await;
            });
        }

        UpdateAction::QueryDeviceState { address, purpose } => {
            tokio::spawn(async move {
                let message = match sender.device_state(&address).await {
                    Ok(state) => Message::DeviceStateLoaded {
                        address,
                        state,
                        purpose,
                    },
                    Err(e) => Message::DeviceStateFailed {
                        address,
                        error: e.to_string(),
                        purpose,
                    },
                };
                let _ = msg_tx.send(message).await;
            });
        }

        UpdateAction::SetConnection { address, connect } => {
            tokio::spawn(async move {
                let message = match sender.set_connection(&address, connect).await {
                    Ok(status) => Message::ConnectionChanged { address, status },
                    Err(e) => Message::ConnectionFailed {
                        address,
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(message).await;
            });
        }

        UpdateAction::Forget { address } => {
            tokio::spawn(async move {
                let message = match sender.forget(&address).await {
                    Ok(status) => Message::ForgetFinished { address, status },
                    Err(e) => Message::ForgetFailed {
                        address,
                        error: e.to_string(),
                    },
                };
                let _ = msg_tx.send(message).await;
            });
        }

        UpdateAction::Notify(notice) => {
            // Engine dispatches these before calling handle_action.
            warn!("Notify action reached handle_action: {:?}", notice);
        }
    }
}
