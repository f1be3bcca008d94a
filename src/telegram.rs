//! Telegram parsing
//!
//! Inverse of [`Command::to_telegram`](crate::Command::to_telegram): splits a
//! controller line back into its ordered `(keyword, value)` entries.
//!
//! ```text
//! telegram  := entry (";" entry)* ";" ["\n"]
//! entry     := key [ " : " value ]
//! ```

use regex::Regex;

use crate::{command::CommandType, Command, Result, RmiError};

/// Parser for single telegram lines
pub struct TelegramParser {
    entry_pattern: Regex,
}

impl TelegramParser {
    pub fn new() -> Result<Self> {
        let entry_pattern = Regex::new(r"^([^;:\n]+?)(?: : ([^;:\n]+))?$")?;
        Ok(Self { entry_pattern })
    }

    /// Parse one telegram into its entries.
    ///
    /// An empty line (or a bare newline) yields no entries. Anything else must
    /// end in `;` and every entry must be `KEY` or `KEY : VALUE`.
    pub fn parse(&self, line: &str) -> Result<Vec<(String, String)>> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        if line.is_empty() {
            return Ok(Vec::new());
        }

        let body = line
            .strip_suffix(';')
            .ok_or_else(|| RmiError::Telegram(format!("missing trailing ';' in {:?}", line)))?;

        body.split(';')
            .map(|entry| {
                let caps = self.entry_pattern.captures(entry).ok_or_else(|| {
                    RmiError::Telegram(format!("bad entry {:?} in {:?}", entry, line))
                })?;
                let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                Ok((key.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Parse a telegram into a [`Command`] of the given type
    pub fn parse_command(&self, line: &str, command_type: CommandType) -> Result<Command> {
        let mut cmd = Command::new(command_type);
        for (key, value) in self.parse(line)? {
            cmd.add_param(key, value);
        }
        Ok(cmd)
    }
}

/// Parse a single telegram with a one-off parser
pub fn parse_telegram(line: &str) -> Result<Vec<(String, String)>> {
    TelegramParser::new()?.parse(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_parse_entries_in_order() {
        let entries = parse_telegram("ptp;J : 1 2 3;velocity : 10;\n").unwrap();
        assert_eq!(
            entries,
            vec![entry("ptp", ""), entry("J", "1 2 3"), entry("velocity", "10")]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_telegram("").unwrap().is_empty());
        assert!(parse_telegram("\n").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_telegram("ptp").is_err());
        assert!(parse_telegram("ptp;;").is_err());
        assert!(parse_telegram("ptp : a : b;").is_err());
        assert!(parse_telegram("ptp :1;").is_err());
    }

    #[test]
    fn test_structure_round_trip() {
        let parser = TelegramParser::new().unwrap();
        let commands = vec![
            Command::motion("ptp", "0 1.5 -2 0 0 0").with_param("velocity", "10"),
            Command::info("setting", "").with_param("tool", "").with_param("frame", "1 2 3"),
            Command::motion("lin", "1 2 3 0 0 0 1"),
        ];

        for cmd in commands {
            let entries = parser.parse(&cmd.to_telegram(false)).unwrap();
            assert_eq!(entries.as_slice(), cmd.entries());

            let rebuilt = parser
                .parse_command(&cmd.to_telegram(true), cmd.command_type())
                .unwrap();
            assert_eq!(rebuilt.entries(), cmd.entries());
        }
    }
}
