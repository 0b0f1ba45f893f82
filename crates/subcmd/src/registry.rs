//! The command registry.
//!
//! Maps each command name to its private [`OptionSet`] and its handler.
//! Names are unique; the listing used for usage text is sorted.

use std::collections::BTreeMap;
use std::fmt;

use crate::handler::Command;
use crate::options::OptionSet;
use crate::setup::SetupError;

/// Description shown for commands that don't describe themselves.
pub const NO_DESCRIPTION: &str = "No description available.";

/// A command together with the options it declared.
pub struct RegisteredCommand {
    name: String,
    options: OptionSet,
    handler: Box<dyn Command>,
}

impl RegisteredCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn handler(&self) -> &dyn Command {
        self.handler.as_ref()
    }

    pub(crate) fn handler_mut(&mut self) -> &mut dyn Command {
        self.handler.as_mut()
    }

    /// The handler's own description, or [`NO_DESCRIPTION`].
    pub fn description(&self) -> &str {
        self.handler.describe().unwrap_or(NO_DESCRIPTION)
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("options", &self.options.len())
            .field("arg_names", &self.handler.arg_names())
            .finish_non_exhaustive()
    }
}

/// Name → command mapping, populated once during initialization.
#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<String, RegisteredCommand>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// `factory` receives an empty option set scoped to the command, declares
    /// every option the command accepts on it, and returns the handler.
    ///
    /// # Errors
    ///
    /// Fails if `name` is empty, starts with `-`, is already registered, or if
    /// the factory made an invalid option declaration. The registry is left
    /// unchanged in every case.
    pub fn register<F, C>(&mut self, name: impl Into<String>, factory: F) -> Result<(), SetupError>
    where
        F: FnOnce(&mut OptionSet) -> C,
        C: Command + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(SetupError::EmptyCommandName);
        }
        if name.starts_with('-') {
            return Err(SetupError::InvalidCommandName(name));
        }
        if self.commands.contains_key(&name) {
            return Err(SetupError::DuplicateCommand(name));
        }

        let mut options = OptionSet::new(name.clone());
        let handler = factory(&mut options);
        if let Some(err) = options.error() {
            return Err(SetupError::Option {
                scope: name,
                source: err.clone(),
            });
        }

        tracing::debug!(command = %name, options = options.len(), "registered command");
        self.commands.insert(
            name.clone(),
            RegisteredCommand {
                name,
                options,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> Option<&mut RegisteredCommand> {
        self.commands.get_mut(name)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Registered commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
