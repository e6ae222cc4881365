//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Push Channel Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to connect to push socket {path}: {reason}")]
    PushConnect { path: PathBuf, reason: String },

    #[error("Push channel error: {message}")]
    Push { message: String },

    // ─────────────────────────────────────────────────────────────
    // Agent (Request/Response) Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to connect to agent socket {path}: {reason}")]
    AgentConnect { path: PathBuf, reason: String },

    #[error("Agent error: {message}")]
    Agent { message: String },

    #[error("Agent protocol error: {message}")]
    Protocol { message: String },

    #[error("Command '{description}' timed out")]
    CommandTimeout { description: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn push(message: impl Into<String>) -> Self {
        Self::Push {
            message: message.into(),
        }
    }

    pub fn push_connect(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PushConnect {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    pub fn agent_connect(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AgentConnect {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    pub fn command_timeout(description: impl Into<String>) -> Self {
        Self::CommandTimeout {
            description: description.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// Recoverable errors are surfaced to the user (dialog or log line) and
    /// the process keeps running. Agent call failures are never retried
    /// automatically.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Agent { .. }
                | Error::Protocol { .. }
                | Error::CommandTimeout { .. }
                | Error::ChannelSend { .. }
                | Error::Json(_)
        )
    }

    /// Check if this error is fatal to the component that produced it.
    ///
    /// A failed push-socket connect kills the listener (no retry, no
    /// backoff) but never the process; the worst case is that no further
    /// device updates arrive.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::PushConnect { .. } | Error::AgentConnect { .. } | Error::ChannelClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::agent("Connection lost");
        assert_eq!(err.to_string(), "Agent error: Connection lost");

        let err = Error::command_timeout("discover devices");
        assert!(err.to_string().contains("discover devices"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::push_connect("/run/user/1000/blueland/blueland.sock", "refused").is_fatal());
        assert!(Error::ChannelClosed.is_fatal());
        assert!(!Error::agent("test").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::agent("test").is_recoverable());
        assert!(Error::protocol("parse error").is_recoverable());
        assert!(Error::command_timeout("device state").is_recoverable());
        assert!(!Error::push_connect("/tmp/x.sock", "refused").is_recoverable());
    }

    #[test]
    fn test_connect_errors_carry_path() {
        let err = Error::agent_connect("/run/user/1000/blueland/agent.sock", "refused");
        assert!(err.to_string().contains("agent.sock"));
        assert!(err.to_string().contains("refused"));
    }
}
