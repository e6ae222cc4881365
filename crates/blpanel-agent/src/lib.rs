//! # blpanel-agent - Backend Communication
//!
//! Talks to the Blueland agent over its two per-user Unix sockets: the
//! one-directional push socket announcing discovered devices, and the
//! request/response socket carrying commands.
//!
//! Depends on [`blpanel_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Push Channel
//! - [`PushListener`] - Supervised reader task for the push socket
//!
//! ### Commands
//! - [`AgentClient`] - Owns the request/response connection
//! - [`CommandSender`] - Cloneable handle for issuing agent commands
//! - [`AgentCommand`] - The four request/response operations
//! - [`RequestTracker`] - Matches responses to pending requests
//!
//! ### Protocol Parsing
//! - [`parse_announcement()`] - Decode one push-socket line
//! - [`parse_response()`] - Decode one reply line from the command socket

pub mod client;
pub mod commands;
pub mod protocol;
pub mod push;

// Public API re-exports
pub use client::AgentClient;
pub use commands::{AgentCommand, CommandResponse, CommandSender, RequestTracker};
pub use protocol::{parse_announcement, parse_response};
pub use push::PushListener;
