//! Push-channel event definitions

use serde::{Deserialize, Serialize};

/// One decoded line from the agent's push socket.
///
/// The wire format is newline-delimited JSON; each object carries at least
/// the device's hardware address under `mac` and optionally a display name.
/// Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceAnnouncement {
    /// Hardware address; announcements without one are no-ops downstream
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl DeviceAnnouncement {
    /// The address, if present and non-empty
    pub fn address(&self) -> Option<&str> {
        self.mac.as_deref().filter(|mac| !mac.is_empty())
    }
}

/// Events emitted by the push listener into the Synchronizer's inbound queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A decoded device announcement
    Announcement(DeviceAnnouncement),
    /// The agent closed the socket (zero-byte read); clean end of stream
    Closed,
    /// The stream failed mid-read; no further push updates will arrive
    Failed { message: String },
}
