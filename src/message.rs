//! Robot Movement Interface messages
//!
//! Upstream command records as published on the RMI bus. Every field is
//! optional in the sense that an empty string or empty sequence means
//! "not set"; serde defaults let partially populated JSON or YAML messages
//! deserialize cleanly.

use serde::{Deserialize, Serialize};

/// A single RMI command message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmiCommand {
    pub command_id: i32,
    pub command_type: String,

    pub pose_reference: String,
    pub pose_type: String,
    pub pose: Vec<f32>,

    pub velocity_type: String,
    pub velocity: Vec<f32>,

    pub acceleration_type: String,
    pub acceleration: Vec<f32>,

    pub blending_type: String,
    pub blending: Vec<f32>,

    pub additional_parameters: Vec<String>,
    pub additional_values: Vec<f32>,
}

impl RmiCommand {
    /// Start a message (or sample) with only the command type set
    pub fn with_type(command_type: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, command_id: i32) -> Self {
        self.command_id = command_id;
        self
    }

    pub fn pose_reference(mut self, pose_reference: impl Into<String>) -> Self {
        self.pose_reference = pose_reference.into();
        self
    }

    pub fn pose_type(mut self, pose_type: impl Into<String>) -> Self {
        self.pose_type = pose_type.into();
        self
    }

    pub fn pose(mut self, pose: Vec<f32>) -> Self {
        self.pose = pose;
        self
    }

    pub fn velocity_type(mut self, velocity_type: impl Into<String>) -> Self {
        self.velocity_type = velocity_type.into();
        self
    }

    pub fn velocity(mut self, velocity: Vec<f32>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn acceleration_type(mut self, acceleration_type: impl Into<String>) -> Self {
        self.acceleration_type = acceleration_type.into();
        self
    }

    pub fn acceleration(mut self, acceleration: Vec<f32>) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn blending_type(mut self, blending_type: impl Into<String>) -> Self {
        self.blending_type = blending_type.into();
        self
    }

    pub fn blending(mut self, blending: Vec<f32>) -> Self {
        self.blending = blending;
        self
    }

    pub fn additional(mut self, parameters: Vec<String>, values: Vec<f32>) -> Self {
        self.additional_parameters = parameters;
        self.additional_values = values;
        self
    }

    /// True if any numeric field holds NaN or an infinity.
    ///
    /// Formatting passes such values through untouched, so hosts that care
    /// should filter messages with this before dispatch.
    pub fn has_non_finite(&self) -> bool {
        [
            &self.pose,
            &self.velocity,
            &self.acceleration,
            &self.blending,
            &self.additional_values,
        ]
        .iter()
        .any(|values| values.iter().any(|v| !v.is_finite()))
    }
}

/// A batch of RMI commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmiCommandList {
    pub replace_previous_commands: bool,
    pub commands: Vec<RmiCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_deserializes_with_defaults() {
        let json = r#"{"command_type":"PTP","pose_type":"JOINTS",
            "pose":[0,1.5,-2,0,0,0],"command_id":7}"#;
        let msg: RmiCommand = serde_json::from_str(json).unwrap();

        assert_eq!(msg.command_type, "PTP");
        assert_eq!(msg.pose_type, "JOINTS");
        assert_eq!(msg.pose.len(), 6);
        assert_eq!(msg.command_id, 7);
        assert!(msg.pose_reference.is_empty());
        assert!(msg.velocity.is_empty());
    }

    #[test]
    fn test_command_list_deserializes() {
        let json = r#"{"commands":[{"command_type":"LIN"},{"command_type":"SETTING"}]}"#;
        let list: RmiCommandList = serde_json::from_str(json).unwrap();

        assert!(!list.replace_previous_commands);
        assert_eq!(list.commands.len(), 2);
        assert_eq!(list.commands[1].command_type, "SETTING");
    }

    #[test]
    fn test_has_non_finite() {
        let msg = RmiCommand::with_type("PTP").pose(vec![0.0, 1.0]);
        assert!(!msg.has_non_finite());

        let msg = msg.velocity(vec![f32::NAN]);
        assert!(msg.has_non_finite());
    }
}
