//! Device data model: records, status, and queried state

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Icon shown until a state query resolves the device's real icon
pub const DEFAULT_ICON: &str = "bluetooth-active-symbolic";

/// Explicit device condition.
///
/// Replaces the independent `paired`/`connected` booleans of the agent's
/// wire format with one enum so the two flags cannot drift out of sync
/// locally. `Connected` implies paired on the backend side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// No state query has completed for this device yet
    #[default]
    Unknown,
    /// Seen on the push channel, not paired
    Discovered,
    /// Paired but not currently connected
    Paired,
    /// Paired and connected
    Connected,
}

impl DeviceStatus {
    /// Map the agent's `(Paired, Connected)` flags onto a status.
    ///
    /// This is the only place the two booleans are interpreted; everything
    /// else works off the enum.
    pub fn from_flags(paired: bool, connected: bool) -> Self {
        match (paired, connected) {
            (_, true) => DeviceStatus::Connected,
            (true, false) => DeviceStatus::Paired,
            (false, false) => DeviceStatus::Discovered,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, DeviceStatus::Connected)
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, DeviceStatus::Paired | DeviceStatus::Connected)
    }

    /// Human-readable label for dialogs and the console presenter
    pub fn label(&self) -> &'static str {
        match self {
            DeviceStatus::Unknown => "unknown",
            DeviceStatus::Discovered => "discovered",
            DeviceStatus::Paired => "paired",
            DeviceStatus::Connected => "connected",
        }
    }
}

/// One known device in the registry.
///
/// The hardware address is the unique key. Name and icon are display
/// fields set by the first announcement that admitted the device
/// (first-write-wins); status and icon are refreshed only by an explicit
/// state query, never inferred from push traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Hardware address, e.g. `AA:BB:CC:DD:EE:FF`
    pub address: String,
    /// Advertised name, if the announcement carried one
    pub name: Option<String>,
    /// Icon identifier resolved via a state query; `None` until resolved
    pub icon: Option<String>,
    /// Last state reported by an explicit query
    pub status: DeviceStatus,
    /// When this address was first admitted into the registry
    pub first_seen: DateTime<Local>,
}

impl DeviceRecord {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name,
            icon: None,
            status: DeviceStatus::default(),
            first_seen: Local::now(),
        }
    }

    /// Name to render, falling back to a placeholder derived from the address
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Device ({})", self.address),
        }
    }

    /// Icon to render right now (placeholder until a state query resolves it)
    pub fn icon_name(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_ICON)
    }

    /// Devices whose resolved name normalizes to "unknown" are excluded
    /// from rendering but still occupy their address slot in the registry.
    pub fn is_hidden(&self) -> bool {
        self.display_name().trim().eq_ignore_ascii_case("unknown")
    }
}

/// Result of a `DeviceState` query against the agent.
///
/// The agent answers with a capitalized-key map (`Paired`, `Connected`,
/// `Icon`, ...). The full map is kept for the detail dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    pub paired: bool,
    pub connected: bool,
    pub icon: Option<String>,
    /// Complete raw state map as returned by the agent
    pub raw: serde_json::Map<String, Value>,
}

impl DeviceState {
    /// Parse the agent's reply payload.
    ///
    /// Missing flags default to `false`; a non-object payload is a
    /// protocol error.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::protocol(format!(
                    "DeviceState reply is not an object: {other}"
                )))
            }
        };

        let paired = raw.get("Paired").and_then(Value::as_bool).unwrap_or(false);
        let connected = raw
            .get("Connected")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let icon = raw
            .get("Icon")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            paired,
            connected,
            icon,
            raw,
        })
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::from_flags(self.paired, self.connected)
    }

    /// Pretty-printed state map for the "Device Information" dialog
    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&Value::Object(self.raw.clone()))
            .unwrap_or_else(|_| String::from("{}"))
    }
}
