//! Command Register - ordered handler table
//!
//! Handlers are looked up by a linear first-match scan in registration order,
//! so extension modules register specific handlers before catch-alls.
//!
//! The register is filled once during startup (`&mut self`) and only read
//! afterwards (`&self`). Because every handler is `Send + Sync`, a populated
//! register can be wrapped in an `Arc` and queried from several threads
//! without locking.

use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    handler::{CommandHandler, SampleHandler},
    message::RmiCommand,
    Command,
};

/// A set of handlers contributed by an extension module
pub trait HandlerCatalog {
    /// Label used in startup logs
    fn name(&self) -> &str;

    /// Add this catalog's handlers, most specific first
    fn register_handlers(&self, register: &mut CommandRegister);
}

/// Outcome of dispatching one message
pub enum Dispatch<'a> {
    /// The handler produced a command
    Command {
        handler: &'a dyn CommandHandler,
        command: Command,
    },
    /// No handler matched
    NoHandler,
    /// A handler matched but could not build a command
    Failed { handler: &'a dyn CommandHandler },
}

impl Dispatch<'_> {
    pub fn into_command(self) -> Option<Command> {
        match self {
            Dispatch::Command { command, .. } => Some(command),
            _ => None,
        }
    }

    /// Name of the matching handler, if any
    pub fn handler_name(&self) -> Option<&str> {
        match self {
            Dispatch::Command { handler, .. } | Dispatch::Failed { handler } => {
                Some(handler.name())
            }
            Dispatch::NoHandler => None,
        }
    }
}

/// Ordered collection of command handlers
#[derive(Default)]
pub struct CommandRegister {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; it takes lowest precedence so far
    pub fn register(&mut self, handler: impl CommandHandler + 'static) -> &mut Self {
        self.register_boxed(Box::new(handler))
    }

    pub fn register_boxed(&mut self, handler: Box<dyn CommandHandler>) -> &mut Self {
        debug!("Registering command handler {}", handler.name());
        self.handlers.push(handler);
        self
    }

    /// Build a [`SampleHandler`] from its parts and register it
    pub fn add_handler<F>(
        &mut self,
        name: impl Into<String>,
        sample: RmiCommand,
        transform: F,
    ) -> &mut Self
    where
        F: Fn(&RmiCommand) -> Command + Send + Sync + 'static,
    {
        self.register(SampleHandler::new(name, sample, transform))
    }

    /// Let an extension module register its handlers
    pub fn install(&mut self, catalog: &dyn HandlerCatalog) -> &mut Self {
        let before = self.handlers.len();
        catalog.register_handlers(self);
        info!(
            "Installed {} command handlers from {}",
            self.handlers.len() - before,
            catalog.name()
        );
        self
    }

    /// All handlers in registration order
    pub fn handlers(&self) -> &[Box<dyn CommandHandler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// First handler, in registration order, that matches `msg`
    pub fn find_handler(&self, msg: &RmiCommand) -> Option<&dyn CommandHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.matches(msg))
            .map(|handler| handler.as_ref())
    }

    /// Find the handler for `msg` and run its transform, reporting which
    /// handler was involved. Unmatched messages are logged here.
    pub fn dispatch(&self, msg: &RmiCommand) -> Dispatch<'_> {
        let Some(handler) = self.find_handler(msg) else {
            warn!(
                "No command handler for command_type '{}' (command_id {})",
                msg.command_type, msg.command_id
            );
            return Dispatch::NoHandler;
        };

        debug!("Command {} handled by {}", msg.command_id, handler.name());
        match handler.process_msg(msg) {
            Some(command) => Dispatch::Command { handler, command },
            None => Dispatch::Failed { handler },
        }
    }

    /// Find the handler for `msg` and run its transform.
    ///
    /// Returns `None` when nothing matches or the handler cannot build a
    /// command.
    pub fn process(&self, msg: &RmiCommand) -> Option<Command> {
        self.dispatch(msg).into_command()
    }

    /// Write every handler's criteria in registration order
    pub fn dump(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        for handler in &self.handlers {
            handler.dump(out)?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f)
    }
}

impl fmt::Debug for CommandRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|handler| handler.name()))
            .finish()
    }
}
