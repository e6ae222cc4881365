//! Wire protocol parsing for both agent sockets
//!
//! The push socket carries newline-delimited JSON announcements. The
//! command socket carries newline-delimited JSON replies keyed by the
//! numeric request `id`. A line that fails to decode is logged and
//! skipped; it never terminates either stream.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use blpanel_core::DeviceAnnouncement;

/// Parse one line from the push socket.
///
/// Returns `None` for empty lines (silently) and for undecodable lines
/// (logged). The caller keeps reading either way.
pub fn parse_announcement(line: &str) -> Option<DeviceAnnouncement> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<DeviceAnnouncement>(trimmed) {
        Ok(announcement) => Some(announcement),
        Err(e) => {
            warn!("Skipping undecodable push record: {} ({})", trimmed, e);
            None
        }
    }
}

/// A reply line from the command socket (before id extraction)
#[derive(Debug, Deserialize)]
struct RawResponse {
    id: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Parse one reply line from the command socket.
///
/// Returns the request id with the result/error payloads, or `None` if
/// the line is empty, undecodable, or carries a non-numeric id.
pub fn parse_response(line: &str) -> Option<(u64, Option<Value>, Option<Value>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let raw: RawResponse = match serde_json::from_str(trimmed) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping undecodable agent reply: {} ({})", trimmed, e);
            return None;
        }
    };

    match raw.id.as_u64() {
        Some(id) => Some((id, raw.result, raw.error)),
        None => {
            warn!("Agent reply with non-numeric id: {}", raw.id);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_announcement_valid() {
        let ann =
            parse_announcement(r#"{"mac":"AA:BB:CC:DD:EE:FF","name":"Headphones"}"#).unwrap();
        assert_eq!(ann.mac.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(ann.name.as_deref(), Some("Headphones"));
    }

    #[test]
    fn test_parse_announcement_without_name() {
        let ann = parse_announcement(r#"{"mac":"AA:BB:CC:DD:EE:FF"}"#).unwrap();
        assert_eq!(ann.name, None);
    }

    #[test]
    fn test_parse_announcement_empty_line() {
        assert_eq!(parse_announcement(""), None);
        assert_eq!(parse_announcement("   "), None);
    }

    #[test]
    fn test_parse_announcement_malformed() {
        assert_eq!(parse_announcement("not-json"), None);
        assert_eq!(parse_announcement("{truncated"), None);
        // Valid JSON of the wrong shape is also skipped
        assert_eq!(parse_announcement("[1,2,3]"), None);
    }

    #[test]
    fn test_parse_response_success() {
        let (id, result, error) =
            parse_response(r#"{"id":7,"result":{"Paired":true}}"#).unwrap();
        assert_eq!(id, 7);
        assert_eq!(result, Some(json!({"Paired": true})));
        assert_eq!(error, None);
    }

    #[test]
    fn test_parse_response_error() {
        let (id, result, error) =
            parse_response(r#"{"id":3,"error":"No such device"}"#).unwrap();
        assert_eq!(id, 3);
        assert_eq!(result, None);
        assert_eq!(error, Some(json!("No such device")));
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert_eq!(parse_response(""), None);
        assert_eq!(parse_response("not-json"), None);
        assert_eq!(parse_response(r#"{"id":"abc","result":null}"#), None);
        assert_eq!(parse_response(r#"{"result":null}"#), None);
    }
}
