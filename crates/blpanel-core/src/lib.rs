//! # blpanel-core - Core Domain Types
//!
//! Foundation crate for Blueland Panel. Provides the device data model,
//! push-channel record types, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Device Model (`device`)
//! - [`DeviceRecord`] - One known device: address, name, icon, status
//! - [`DeviceStatus`] - Explicit device condition (Unknown, Discovered, Paired, Connected)
//! - [`DeviceState`] - Result of a `DeviceState` query against the agent
//!
//! ### Push Channel (`events`)
//! - [`DeviceAnnouncement`] - One decoded line from the agent's push socket
//! - [`PushEvent`] - Wrapper enum for announcement/closed/failed listener events
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use blpanel_core::prelude::*;
//! ```

pub mod device;
pub mod error;
pub mod events;
pub mod logging;

/// Prelude for common imports used throughout all Blueland Panel crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use device::{DeviceRecord, DeviceState, DeviceStatus, DEFAULT_ICON};
pub use error::{Error, Result};
pub use events::{DeviceAnnouncement, PushEvent};
