//! Command handlers
//!
//! A handler pairs a *sample* RMI message with a transform. The fields the
//! sample populates are the match criteria; empty fields match anything. When
//! a message matches, the transform turns it into a [`Command`].

use std::fmt;

use tracing::error;

use crate::{message::RmiCommand, util::used_and_not_equal, Command};

/// Transform from a matching RMI message to a controller command
pub type TransformFn = Box<dyn Fn(&RmiCommand) -> Command + Send + Sync>;

/// Extra match constraint layered on top of the sample comparison
pub type GuardFn = Box<dyn Fn(&RmiCommand) -> bool + Send + Sync>;

/// Check every comparable field of `sample` against `msg`.
///
/// `command_id` never takes part. An all-empty sample matches every message.
pub fn matches_sample(sample: &RmiCommand, msg: &RmiCommand) -> bool {
    !(used_and_not_equal(&sample.command_type, &msg.command_type)
        || used_and_not_equal(&sample.pose_reference, &msg.pose_reference)
        || used_and_not_equal(&sample.pose_type, &msg.pose_type)
        || used_and_not_equal(&sample.pose, &msg.pose)
        || used_and_not_equal(&sample.velocity_type, &msg.velocity_type)
        || used_and_not_equal(&sample.velocity, &msg.velocity)
        || used_and_not_equal(&sample.acceleration_type, &msg.acceleration_type)
        || used_and_not_equal(&sample.acceleration, &msg.acceleration)
        || used_and_not_equal(&sample.blending_type, &msg.blending_type)
        || used_and_not_equal(&sample.blending, &msg.blending)
        || used_and_not_equal(&sample.additional_parameters, &msg.additional_parameters)
        || used_and_not_equal(&sample.additional_values, &msg.additional_values))
}

/// Write the present fields of a sample, one per line
pub fn dump_sample(sample: &RmiCommand, out: &mut dyn fmt::Write) -> fmt::Result {
    let tags = [
        ("command_type", &sample.command_type),
        ("pose_reference", &sample.pose_reference),
        ("pose_type", &sample.pose_type),
        ("velocity_type", &sample.velocity_type),
        ("acceleration_type", &sample.acceleration_type),
        ("blending_type", &sample.blending_type),
    ];
    for (name, value) in tags {
        if !value.is_empty() {
            writeln!(out, "{}:{}", name, value)?;
        }
    }

    let sequences = [
        ("pose", sample.pose.len()),
        ("velocity", sample.velocity.len()),
        ("acceleration", sample.acceleration.len()),
        ("blending", sample.blending.len()),
        ("additional_parameters", sample.additional_parameters.len()),
        ("additional_values", sample.additional_values.len()),
    ];
    for (name, len) in sequences {
        if len > 0 {
            writeln!(out, "{} (size):{}", name, len)?;
        }
    }
    Ok(())
}

/// A matcher and transformer registered in a [`CommandRegister`](crate::CommandRegister)
///
/// Implementors must be `Send + Sync` so a populated register can be shared
/// between threads for lookups.
pub trait CommandHandler: Send + Sync {
    /// Human label used in diagnostics
    fn name(&self) -> &str;

    /// The match pattern
    fn sample(&self) -> &RmiCommand;

    /// Does this handler accept `msg`?
    ///
    /// Defaults to comparing the sample field by field. Override to add
    /// stronger constraints, e.g. a required pose length.
    fn matches(&self, msg: &RmiCommand) -> bool {
        matches_sample(self.sample(), msg)
    }

    /// Turn a matching message into a command.
    ///
    /// Returns `None` if the handler cannot produce a command at all.
    fn process_msg(&self, msg: &RmiCommand) -> Option<Command>;

    /// Write the handler name and its match criteria
    fn dump(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "CommandHandler {} criteria:", self.name())?;
        dump_sample(self.sample(), out)
    }
}

/// Handler built from a sample message and a transform closure
pub struct SampleHandler {
    name: String,
    sample: RmiCommand,
    transform: Option<TransformFn>,
    guard: Option<GuardFn>,
}

impl SampleHandler {
    /// Create a handler from its three parts
    pub fn new<F>(name: impl Into<String>, sample: RmiCommand, transform: F) -> Self
    where
        F: Fn(&RmiCommand) -> Command + Send + Sync + 'static,
    {
        Self::from_sample(name, sample).with_transform(transform)
    }

    /// Create a handler with match criteria only.
    ///
    /// A transform must be attached with [`SampleHandler::with_transform`]
    /// before the handler can produce commands.
    pub fn from_sample(name: impl Into<String>, sample: RmiCommand) -> Self {
        Self {
            name: name.into(),
            sample,
            transform: None,
            guard: None,
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&RmiCommand) -> Command + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Require `guard` to hold in addition to the sample comparison
    pub fn with_guard<G>(mut self, guard: G) -> Self
    where
        G: Fn(&RmiCommand) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl CommandHandler for SampleHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&self) -> &RmiCommand {
        &self.sample
    }

    fn matches(&self, msg: &RmiCommand) -> bool {
        matches_sample(&self.sample, msg) && self.guard.as_ref().map_or(true, |guard| guard(msg))
    }

    fn process_msg(&self, msg: &RmiCommand) -> Option<Command> {
        match &self.transform {
            Some(transform) => Some(transform(msg)),
            None => {
                error!(
                    "CommandHandler {} was asked to process a message but has no transform set",
                    self.name
                );
                None
            }
        }
    }
}

impl fmt::Debug for SampleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleHandler")
            .field("name", &self.name)
            .field("sample", &self.sample)
            .field("has_transform", &self.transform.is_some())
            .field("has_guard", &self.guard.is_some())
            .finish()
    }
}
