//! Main update() function and message dispatch

use super::{Notice, UpdateAction, UpdateResult};
use crate::message::{Message, StatePurpose};
use crate::registry::UpsertOutcome;
use crate::state::{AppPhase, AppState};
use blpanel_core::prelude::*;
use blpanel_core::{DeviceRecord, PushEvent};

/// Process a message, mutate state, and describe the effects.
///
/// Exactly one presenter notification is produced per item that changed
/// something user-visible; agent calls are returned as actions and their
/// completions come back through the queue as new messages.
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Push(event) => handle_push(state, event),

        Message::DeviceVisible { address } => {
            // The record may have been forgotten between admission and
            // this follow-up; render only what is still there.
            match state.registry.get(&address) {
                Some(record) => UpdateResult::notify(Notice::DeviceAdded(record.clone())),
                None => UpdateResult::none(),
            }
        }

        Message::Quit => {
            state.phase = AppPhase::Quitting;
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────
        // User Actions
        // ─────────────────────────────────────────────────────
        Message::Discover => {
            // Clearing first is the debounce: a re-trigger starts a fresh
            // cycle and resets first-write-wins.
            state.registry.clear();
            state.discovering = true;
            info!("Starting discovery cycle");
            UpdateResult::both(Message::ListCleared, UpdateAction::TriggerDiscover)
        }

        Message::ListCleared => UpdateResult::notify(Notice::ListCleared),

        Message::OpenDevice { address } => {
            if state.registry.contains(&address) {
                UpdateResult::action(UpdateAction::QueryDeviceState {
                    address,
                    purpose: StatePurpose::Detail,
                })
            } else {
                warn!("Open requested for unknown device {}", address);
                UpdateResult::none()
            }
        }

        Message::SetConnection { address, connect } => {
            UpdateResult::action(UpdateAction::SetConnection { address, connect })
        }

        Message::ForgetDevice { address } => {
            UpdateResult::action(UpdateAction::Forget { address })
        }

        // ─────────────────────────────────────────────────────
        // Command Completions
        // ─────────────────────────────────────────────────────
        Message::DiscoverFinished => {
            state.discovering = false;
            if state.phase == AppPhase::Starting {
                state.phase = AppPhase::Running;
            }
            info!("Discovery trigger acknowledged");
            UpdateResult::none()
        }

        Message::DiscoverFailed { error } => {
            state.discovering = false;
            error!("Discovery failed: {}", error);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Discovery"),
                body: format!("Error: {error}"),
            })
        }

        Message::DeviceStateLoaded {
            address,
            state: device_state,
            purpose,
        } => {
            let changed = state.registry.set_state(&address, &device_state);
            match purpose {
                StatePurpose::Icon => match state.registry.get(&address) {
                    Some(record) if changed && !record.is_hidden() => {
                        UpdateResult::notify(Notice::DeviceUpdated(record.clone()))
                    }
                    _ => UpdateResult::none(),
                },
                StatePurpose::Detail => {
                    let body = match state.registry.get(&address) {
                        Some(record) => format!(
                            "MAC: {}\nDevice: {}\nStatus: {}\n\n{}",
                            record.address,
                            record.display_name(),
                            record.status.label(),
                            device_state.to_pretty(),
                        ),
                        None => device_state.to_pretty(),
                    };
                    UpdateResult::notify(Notice::Dialog {
                        title: String::from("Device Information"),
                        body,
                    })
                }
            }
        }

        Message::DeviceStateFailed {
            address,
            error,
            purpose,
        } => match purpose {
            StatePurpose::Icon => {
                // The placeholder icon stays; nothing to show the user.
                warn!(
                    "Failed to get device state for {} icon, ignoring: {}",
                    address, error
                );
                UpdateResult::none()
            }
            StatePurpose::Detail => UpdateResult::notify(Notice::Dialog {
                title: String::from("Error"),
                body: format!("DeviceState failed: {error}"),
            }),
        },

        Message::ConnectionChanged { address, status } => {
            // Deliberately no registry mutation: connection state is only
            // observed via a fresh DeviceState query.
            info!("Connection change for {}: {}", address, status);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Connection Status"),
                body: status,
            })
        }

        Message::ConnectionFailed { address, error } => {
            error!("Connection change for {} failed: {}", address, error);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Connection Status"),
                body: format!("Error: {error}"),
            })
        }

        Message::ForgetFinished { address, status } => {
            // Local removal is immediate; the agent's own bookkeeping is
            // only reconciled by the next discovery cycle.
            state.registry.forget(&address);
            info!("Forgot device {}: {}", address, status);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Forget Device Status"),
                body: status,
            })
        }

        Message::ForgetFailed { address, error } => {
            error!("Forget for {} failed: {}", address, error);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Forget Device Status"),
                body: format!("Error: {error}"),
            })
        }
    }
}

/// Push listener events: announcements feed the registry; stream end is
/// fatal to the listener but never to the process.
fn handle_push(state: &mut AppState, event: PushEvent) -> UpdateResult {
    match event {
        PushEvent::Announcement(announcement) => {
            let Some(address) = announcement.address() else {
                // No identifier, nothing to admit.
                return UpdateResult::none();
            };

            let record = DeviceRecord::new(address, announcement.name.clone());
            let address = address.to_string();

            match state.registry.upsert(record) {
                UpsertOutcome::Applied => UpdateResult::both(
                    Message::DeviceVisible {
                        address: address.clone(),
                    },
                    UpdateAction::QueryDeviceState {
                        address,
                        purpose: StatePurpose::Icon,
                    },
                ),
                UpsertOutcome::Ignored => UpdateResult::none(),
            }
        }

        PushEvent::Closed => {
            state.push_lost = true;
            warn!("Push channel closed; no further device updates will arrive");
            UpdateResult::none()
        }

        PushEvent::Failed { message } => {
            state.push_lost = true;
            error!("Push channel failed: {}", message);
            UpdateResult::notify(Notice::Dialog {
                title: String::from("Push Channel"),
                body: format!("Device updates lost: {message}"),
            })
        }
    }
}
