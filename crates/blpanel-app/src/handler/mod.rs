//! Handler module - TEA update function
//!
//! `update()` is the only code that mutates [`AppState`]. It is pure with
//! respect to I/O: effects are described as [`UpdateAction`]s and carried
//! out by the engine (presenter notifications synchronously, agent calls
//! as spawned tasks whose completions re-enter the queue).

pub(crate) mod update;


use crate::message::{Message, StatePurpose};
use blpanel_core::DeviceRecord;

// Re-export main entry point
pub use update::update;

/// Presenter notifications; each becomes exactly one callback
#[derive(Debug, Clone)]
pub enum Notice {
    DeviceAdded(DeviceRecord),
    DeviceUpdated(DeviceRecord),
    ListCleared,
    Dialog { title: String, body: String },
}

/// Actions the engine performs after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Ask the agent to start a discovery cycle
    TriggerDiscover,

    /// Query a device's state asynchronously
    QueryDeviceState {
        address: String,
        purpose: StatePurpose,
    },

    /// Connect or disconnect a device
    SetConnection { address: String, connect: bool },

    /// Ask the agent to unpair/remove a device
    Forget { address: String },

    /// Invoke a presenter callback (handled inline, never spawned)
    Notify(Notice),
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the engine to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn both(msg: Message, action: UpdateAction) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }

    pub fn notify(notice: Notice) -> Self {
        Self::action(UpdateAction::Notify(notice))
    }
}
