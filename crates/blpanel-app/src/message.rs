//! Message types for the synchronizer's inbound queue (TEA pattern)
//!
//! Everything the engine reacts to is one of these: decoded push events,
//! user-initiated actions, and agent command completions. Items are
//! processed strictly in arrival order; there is no priority between
//! push-derived and command-derived messages.

use blpanel_core::{DeviceState, PushEvent};

/// Why a device state query was issued.
///
/// The same agent call serves two consumers: resolving a device's icon
/// right after it appears, and populating the detail dialog on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePurpose {
    /// Resolve the icon for a freshly added device (placeholder shown
    /// until this completes; failures are ignored)
    Icon,
    /// Populate the device detail dialog (failures are surfaced)
    Detail,
}

/// All possible messages in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Event from the push listener
    Push(PushEvent),

    /// A new visible device was admitted into the registry (follow-up to
    /// a push announcement; triggers the render callback)
    DeviceVisible { address: String },

    /// The registry was cleared for a fresh discovery cycle (follow-up to
    /// `Discover`; triggers the clear callback)
    ListCleared,

    /// Request to quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // User Actions
    // ─────────────────────────────────────────────────────────
    /// Start a fresh discovery cycle (clears the registry first)
    Discover,
    /// Open the detail view for a device
    OpenDevice { address: String },
    /// Connect or disconnect a device
    SetConnection { address: String, connect: bool },
    /// Forget (unpair/remove) a device
    ForgetDevice { address: String },

    // ─────────────────────────────────────────────────────────
    // Command Completions
    // ─────────────────────────────────────────────────────────
    /// Discovery trigger acknowledged (devices arrive via push)
    DiscoverFinished,
    /// Discovery trigger failed
    DiscoverFailed { error: String },

    /// A device state query completed
    DeviceStateLoaded {
        address: String,
        state: DeviceState,
        purpose: StatePurpose,
    },
    /// A device state query failed
    DeviceStateFailed {
        address: String,
        error: String,
        purpose: StatePurpose,
    },

    /// Connect/disconnect completed; carries the agent's status text.
    /// The registry is NOT updated here -- a fresh state query is the
    /// only way to observe the new connection state.
    ConnectionChanged { address: String, status: String },
    /// Connect/disconnect failed
    ConnectionFailed { address: String, error: String },

    /// Forget completed on the agent side; the local record is removed
    /// immediately, independent of backend confirmation timing
    ForgetFinished { address: String, status: String },
    /// Forget failed
    ForgetFailed { address: String, error: String },
}
