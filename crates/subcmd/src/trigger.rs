//! Function-triggered global options.
//!
//! A trigger is a bool global option bound to a callback, such as `-version`.
//! Its place in the dispatch flow:
//!
//! ```text
//! global options parsed
//!   → TRIGGERS ← (Invoke: run callbacks, end the run with status 0)
//!   → command lookup
//!   → command options parsed
//!   → Command::execute
//! ```
//!
//! Whether the dispatcher fires triggers itself is decided by
//! [`TriggerPolicy`]. With [`TriggerPolicy::Manual`] nothing is invoked and the
//! host reads the flag from [`CommandContext::globals`](crate::CommandContext).

use std::fmt;

use crate::options::{OptionSet, ParsedOptions};

/// Callback run when its trigger option is present.
pub type TriggerFn = Box<dyn FnMut()>;

/// What the dispatcher does with trigger options that were given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    /// Run every fired callback in declaration order, then end the run
    /// without dispatching a command.
    #[default]
    Invoke,
    /// Leave triggers to the host; dispatch proceeds normally.
    Manual,
}

/// A declared trigger option.
pub struct TriggerOption {
    name: String,
    description: String,
    callback: TriggerFn,
}

impl TriggerOption {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for TriggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerOption")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// All trigger options of a program.
#[derive(Debug, Default)]
pub struct Triggers {
    options: Vec<TriggerOption>,
}

impl Triggers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as a bool option on `globals` and binds `callback` to it.
    ///
    /// A rejected declaration (say, a name already used by another global
    /// option) is recorded on `globals` and the trigger is not added.
    pub fn declare<F>(
        &mut self,
        globals: &mut OptionSet,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: F,
    ) where
        F: FnMut() + 'static,
    {
        let name = name.into();
        let description = description.into();

        let before = globals.len();
        globals.flag(name.clone(), description.clone());
        if globals.len() == before {
            return;
        }

        self.options.push(TriggerOption {
            name,
            description,
            callback: Box::new(callback),
        });
    }

    /// Names of the triggers set in `globals`, in declaration order.
    pub fn fired(&self, globals: &ParsedOptions) -> Vec<&str> {
        self.options
            .iter()
            .filter(|option| globals.flag(&option.name))
            .map(|option| option.name.as_str())
            .collect()
    }

    /// Runs the callback of every trigger set in `globals` and returns their
    /// names, in declaration order.
    pub fn fire(&mut self, globals: &ParsedOptions) -> Vec<String> {
        let mut fired = Vec::new();
        for option in &mut self.options {
            if globals.flag(&option.name) {
                tracing::debug!(trigger = %option.name, "firing trigger option");
                (option.callback)();
                fired.push(option.name.clone());
            }
        }
        fired
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
