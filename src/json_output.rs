//! JSON Output for Dispatched Commands
//!
//! Structured events describing what the dispatcher did with each message,
//! one JSON object per line, for consumption by external tools.

use serde::{Deserialize, Serialize};

use crate::{Command, CommandType, Result};

/// Current time as f64 seconds since UNIX epoch, millisecond resolution
pub fn current_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// A telegram produced for a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Command ID copied from the RMI message
    pub command_id: i32,
    /// Name of the handler that built the command
    pub handler: String,
    /// Whether the controller blocks on this command
    pub command_type: CommandType,
    /// First keyword of the telegram
    pub verb: String,
    /// Wire text as sent to the controller
    pub telegram: String,
}

/// Why a message could not be turned into a telegram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoHandler,
    HandlerFailed,
    BadInput,
}

/// Dispatch failure event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Timestamp when error occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Failure category
    pub kind: ErrorKind,
    /// Associated command ID if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<i32>,
    /// Error message
    pub error: String,
}

/// Parsed telegram entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Keyword/value pairs in wire order
    pub entries: Vec<(String, String)>,
}

/// Classification of one controller reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Reply line as received
    pub reply: String,
    /// False only for the literal `error`
    pub accepted: bool,
}

/// Match criteria of one registered handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Position in the register; lower wins
    pub index: usize,
    /// Handler name
    pub name: String,
    /// Present sample fields, one `field:value` string each
    pub criteria: Vec<String>,
}

impl TelegramEvent {
    pub fn new(handler: &str, command: &Command, append_newline: bool) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "telegram".to_string(),
            command_id: command.command_id(),
            handler: handler.to_string(),
            command_type: command.command_type(),
            verb: command.command().to_string(),
            telegram: command.to_telegram(append_newline),
        }
    }
}

impl ErrorEvent {
    pub fn new(kind: ErrorKind, command_id: Option<i32>, error: &str) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "error".to_string(),
            kind,
            command_id,
            error: error.to_string(),
        }
    }

    pub fn no_handler(command_id: i32, command_type: &str) -> Self {
        Self::new(
            ErrorKind::NoHandler,
            Some(command_id),
            &format!("no handler for command_type '{}'", command_type),
        )
    }

    pub fn handler_failed(command_id: i32, handler: &str) -> Self {
        Self::new(
            ErrorKind::HandlerFailed,
            Some(command_id),
            &format!("handler {} produced no command", handler),
        )
    }

    pub fn bad_input(error: &str) -> Self {
        Self::new(ErrorKind::BadInput, None, error)
    }
}

impl EntriesEvent {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "entries".to_string(),
            entries,
        }
    }
}

impl ReplyEvent {
    pub fn new(reply: &str, accepted: bool) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "reply".to_string(),
            reply: reply.to_string(),
            accepted,
        }
    }
}

impl HandlerEvent {
    pub fn new(index: usize, name: &str, criteria: Vec<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "handler".to_string(),
            index,
            name: name.to_string(),
            criteria,
        }
    }
}

/// Serialize an event as one newline-terminated JSON line
pub fn event_line<T: Serialize>(event: &T) -> Result<String> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_event_json() {
        let cmd = Command::motion("ptp", "0 1.5").with_id(7);
        let event = TelegramEvent::new("ptp_joints", &cmd, false);
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "telegram");
        assert_eq!(json["command_id"], 7);
        assert_eq!(json["command_type"], "motion");
        assert_eq!(json["verb"], "ptp");
        assert_eq!(json["telegram"], "ptp : 0 1.5;");
    }

    #[test]
    fn test_error_event_json() {
        let event = ErrorEvent::no_handler(3, "XYZ");
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "no_handler");
        assert_eq!(json["command_id"], 3);

        let json = serde_json::to_value(ErrorEvent::bad_input("oops")).unwrap();
        assert!(json.get("command_id").is_none());
    }

    #[test]
    fn test_reply_and_handler_events_json() {
        let json = serde_json::to_value(ReplyEvent::new("", true)).unwrap();
        assert_eq!(json["type"], "reply");
        assert_eq!(json["reply"], "");
        assert_eq!(json["accepted"], true);

        let event = HandlerEvent::new(2, "set_tool", vec!["command_type:SETTING".to_string()]);
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "handler");
        assert_eq!(json["index"], 2);
        assert_eq!(json["criteria"][0], "command_type:SETTING");
    }

    #[test]
    fn test_event_line_is_single_terminated_line() {
        let line = event_line(&ReplyEvent::new("error", false)).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let json: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(json["accepted"], false);
    }
}
