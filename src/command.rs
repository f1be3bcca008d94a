//! Materialized controller commands
//!
//! A [`Command`] is an ordered list of `(keyword, value)` pairs. The first
//! pair is the verb, the rest are parameters in the order the handler added
//! them. Rendering produces one telegram:
//!
//! ```text
//! ptp : 0 1.5 -2 0 0 0;velocity : 10;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal reply the controller sends when it rejects a telegram
pub const ERROR_REPLY: &str = "error";

/// Command classification
///
/// Motion commands block the controller until the move completes;
/// informational ones return immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    #[default]
    Motion,
    Info,
}

/// A command ready to be sent to the controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    command_type: CommandType,
    command_id: i32,
    entries: Vec<(String, String)>,
}

impl Command {
    /// Create an empty command of the given type
    pub fn new(command_type: CommandType) -> Self {
        Self {
            command_type,
            command_id: 0,
            entries: Vec::new(),
        }
    }

    /// Motion command with the verb already set
    pub fn motion(verb: impl Into<String>, params: impl Into<String>) -> Self {
        let mut cmd = Self::default();
        cmd.make_command(CommandType::Motion, verb, params, true);
        cmd
    }

    /// Informational command with the verb already set
    pub fn info(verb: impl Into<String>, params: impl Into<String>) -> Self {
        let mut cmd = Self::default();
        cmd.make_command(CommandType::Info, verb, params, true);
        cmd
    }

    /// Set the type and the verb slot.
    ///
    /// With `erase_existing` all entries are dropped first. Otherwise an
    /// existing verb entry is replaced and the parameters after it are kept.
    pub fn make_command(
        &mut self,
        command_type: CommandType,
        verb: impl Into<String>,
        params: impl Into<String>,
        erase_existing: bool,
    ) {
        self.command_type = command_type;
        if erase_existing {
            self.entries.clear();
        }

        let entry = (verb.into(), params.into());
        match self.entries.first_mut() {
            Some(first) => *first = entry,
            None => self.entries.push(entry),
        }
    }

    /// Append a parameter entry
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder form of [`Command::add_param`]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_param(key, value);
        self
    }

    /// The verb, or an empty string if nothing has been set
    pub fn command(&self) -> &str {
        self.entries.first().map(|(key, _)| key.as_str()).unwrap_or("")
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn set_command_type(&mut self, command_type: CommandType) {
        self.command_type = command_type;
    }

    pub fn command_id(&self) -> i32 {
        self.command_id
    }

    pub fn set_command_id(&mut self, command_id: i32) {
        self.command_id = command_id;
    }

    /// Builder form of [`Command::set_command_id`]
    pub fn with_id(mut self, command_id: i32) -> Self {
        self.command_id = command_id;
        self
    }

    /// All entries in wire order, verb first
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Entries after the verb
    pub fn params(&self) -> &[(String, String)] {
        self.entries.get(1..).unwrap_or(&[])
    }

    /// Render the telegram, optionally terminated by a newline
    pub fn to_telegram(&self, append_newline: bool) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            if !value.is_empty() {
                out.push_str(" : ");
                out.push_str(value);
            }
            out.push(';');
        }
        if append_newline {
            out.push('\n');
        }
        out
    }

    /// Accept any reply except the exact literal `error`
    pub fn check_response(&self, reply: &str) -> bool {
        reply != ERROR_REPLY
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_telegram(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_rendering() {
        let cmd = Command::motion("ptp", "")
            .with_param("J", "1 2 3")
            .with_param("velocity", "10");

        assert_eq!(cmd.to_telegram(true), "ptp;J : 1 2 3;velocity : 10;\n");
        assert_eq!(cmd.to_telegram(false), "ptp;J : 1 2 3;velocity : 10;");
        assert_eq!(cmd.to_string(), "ptp;J : 1 2 3;velocity : 10;");
    }

    #[test]
    fn test_empty_command_renders_empty() {
        let cmd = Command::new(CommandType::Info);
        assert_eq!(cmd.to_telegram(false), "");
        assert_eq!(cmd.to_telegram(true), "\n");
        assert_eq!(cmd.command(), "");
        assert!(cmd.params().is_empty());
    }

    #[test]
    fn test_make_command_replaces_verb_and_keeps_params() {
        let mut cmd = Command::motion("ptp", "1 2").with_param("velocity", "10");
        cmd.make_command(CommandType::Info, "lin", "3 4", false);

        assert_eq!(cmd.command(), "lin");
        assert_eq!(cmd.command_type(), CommandType::Info);
        assert_eq!(cmd.entries()[0], ("lin".to_string(), "3 4".to_string()));
        assert_eq!(cmd.params(), &[("velocity".to_string(), "10".to_string())]);
    }

    #[test]
    fn test_make_command_erase_existing() {
        let mut cmd = Command::motion("ptp", "1 2").with_param("velocity", "10");
        cmd.make_command(CommandType::Motion, "lin", "", true);

        assert_eq!(cmd.entries().len(), 1);
        assert_eq!(cmd.to_telegram(false), "lin;");
    }

    #[test]
    fn test_add_param_on_empty_command_appends() {
        let mut cmd = Command::new(CommandType::Motion);
        cmd.add_param("velocity", "10");

        assert_eq!(cmd.entries().len(), 1);
        assert_eq!(cmd.command(), "velocity");
        assert_eq!(cmd.to_telegram(false), "velocity : 10;");
    }

    #[test]
    fn test_accessors() {
        let mut cmd = Command::info("get", "version");
        cmd.set_command_id(42);
        cmd.set_command_type(CommandType::Motion);

        assert_eq!(cmd.command_id(), 42);
        assert_eq!(cmd.command_type(), CommandType::Motion);
        assert_eq!(cmd.with_id(9).command_id(), 9);
    }

    #[test]
    fn test_check_response() {
        let cmd = Command::motion("ptp", "");
        assert!(!cmd.check_response("error"));
        assert!(cmd.check_response("error "));
        assert!(cmd.check_response("Error"));
        assert!(cmd.check_response(""));
        assert!(cmd.check_response("done"));
    }
}
