//! Command dispatch.
//!
//! [`DispatcherBuilder`] collects global options, trigger options and commands
//! during initialization; [`Dispatcher`] runs one command line through them:
//!
//! ```text
//! tokens
//!   → global options      (help → usage, error → message + usage)
//!   → trigger options     (see TriggerPolicy)
//!   → command name        (missing/unknown → message + usage)
//!   → command options     (error/help → command usage)
//!   → Command::execute    (error → message, status unchanged)
//! ```

use std::ffi::OsString;
use std::path::Path;

use crate::handler::{Command, CommandContext};
use crate::options::OptionSet;
use crate::outcome::{Outcome, OutcomeKind, UsageReason};
use crate::registry::Registry;
use crate::setup::SetupError;
use crate::trigger::{TriggerPolicy, Triggers};
use crate::usage::{CommandUsage, UsageData};

const GLOBAL_SCOPE: &str = "global options";

/// Builder for [`Dispatcher`].
///
/// ```rust
/// use subcmd::{CommandContext, Dispatcher, FnCommand};
///
/// let mut dispatcher = Dispatcher::builder()
///     .program("tool")
///     .globals(|opts| {
///         opts.flag("quiet", "suppress progress output");
///     })
///     .command("build", |opts| {
///         opts.int("jobs", 1, "parallel jobs");
///         FnCommand::new("<target>", |args: &[String], ctx: &CommandContext| {
///             assert_eq!(args, ["release"]);
///             assert_eq!(ctx.options.int("jobs"), Some(4));
///             Ok(())
///         })
///     })?
///     .build()?;
///
/// let outcome = dispatcher.run_from(["build", "-jobs", "4", "release"]);
/// assert_eq!(outcome.status(), 0);
/// # Ok::<(), subcmd::SetupError>(())
/// ```
#[derive(Debug)]
pub struct DispatcherBuilder {
    program: Option<String>,
    globals: OptionSet,
    triggers: Triggers,
    registry: Registry,
    policy: TriggerPolicy,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            program: None,
            globals: OptionSet::new(GLOBAL_SCOPE),
            triggers: Triggers::new(),
            registry: Registry::new(),
            policy: TriggerPolicy::default(),
        }
    }

    /// Program name used in usage lines. Defaults to the file name of
    /// `argv[0]`.
    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = Some(name.into());
        self
    }

    /// Declares global options, the ones accepted before the command name.
    pub fn globals<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut OptionSet),
    {
        configure(&mut self.globals);
        self
    }

    /// Declares a bool global option that runs `callback` when given.
    pub fn trigger<F>(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        callback: F,
    ) -> Self
    where
        F: FnMut() + 'static,
    {
        self.triggers
            .declare(&mut self.globals, name, description, callback);
        self
    }

    /// Declares `-version`, running `show_version` when given.
    pub fn version<F>(self, show_version: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.trigger("version", "show version", show_version)
    }

    pub fn trigger_policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a command. See [`Registry::register`].
    pub fn command<F, C>(mut self, name: impl Into<String>, factory: F) -> Result<Self, SetupError>
    where
        F: FnOnce(&mut OptionSet) -> C,
        C: Command + 'static,
    {
        self.registry.register(name, factory)?;
        Ok(self)
    }

    /// Validates the configuration and freezes it into a [`Dispatcher`].
    ///
    /// # Errors
    ///
    /// [`SetupError::NoCommands`] if no command was registered, or
    /// [`SetupError::Option`] for an invalid global or trigger declaration.
    pub fn build(self) -> Result<Dispatcher, SetupError> {
        if let Some(err) = self.globals.error() {
            return Err(SetupError::Option {
                scope: GLOBAL_SCOPE.to_string(),
                source: err.clone(),
            });
        }
        if self.registry.is_empty() {
            return Err(SetupError::NoCommands);
        }

        Ok(Dispatcher {
            program: self.program.unwrap_or_else(default_program),
            globals: self.globals,
            triggers: self.triggers,
            registry: self.registry,
            policy: self.policy,
        })
    }
}

fn default_program() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "program".to_string())
}

/// Routes a command line to its registered command.
#[derive(Debug)]
pub struct Dispatcher {
    program: String,
    globals: OptionSet,
    triggers: Triggers,
    registry: Registry,
    policy: TriggerPolicy,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn globals(&self) -> &OptionSet {
        &self.globals
    }

    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// The top-level usage text.
    pub fn usage(&self) -> String {
        UsageData::extract(&self.program, &self.registry, &self.globals).render()
    }

    /// Dispatches the process arguments (without the program name).
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    pub fn run(&mut self) -> Outcome {
        self.run_from(process_args(std::env::args_os().skip(1)))
    }

    /// Dispatches `args`, which must not include the program name.
    pub fn run_from<I, S>(&mut self, args: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        tracing::debug!(program = %self.program, ?args, "dispatching");

        let globals = match self.globals.parse(args) {
            Ok(globals) => globals,
            Err(err) if err.is_help() => {
                return self.usage_outcome(String::new(), UsageReason::Help);
            }
            Err(err) => {
                tracing::debug!(error = %err, "global options rejected");
                return self.usage_outcome(format!("{err}\n"), UsageReason::InvalidGlobals);
            }
        };

        match self.policy {
            TriggerPolicy::Invoke => {
                let fired = self.triggers.fire(&globals);
                if !fired.is_empty() {
                    return Outcome::triggered(fired);
                }
            }
            TriggerPolicy::Manual => {
                let fired = self.triggers.fired(&globals);
                if !fired.is_empty() {
                    tracing::debug!(?fired, "trigger options left to the host");
                }
            }
        }

        let tokens = globals.args().to_vec();
        let Some((name, rest)) = tokens.split_first() else {
            return self.usage_outcome("No command specified.\n\n".into(), UsageReason::NoCommand);
        };

        let program = self.program.as_str();
        let global_options = &self.globals;
        let Some(command) = self.registry.lookup_mut(name) else {
            tracing::debug!(command = %name, "unknown command");
            return usage_outcome(
                program,
                &self.registry,
                global_options,
                format!("Unknown command: {name}\n"),
                UsageReason::UnknownCommand(name.clone()),
            );
        };

        let options = match command.options().parse(rest.iter().cloned()) {
            Ok(options) => options,
            Err(err) => {
                tracing::debug!(command = %name, error = %err, "command options rejected");
                let mut text = if err.is_help() {
                    String::new()
                } else {
                    format!("{err}\n")
                };
                text.push_str(&CommandUsage::extract(program, command).render());
                return Outcome::usage(
                    text,
                    OutcomeKind::CommandUsage {
                        command: name.clone(),
                        help: err.is_help(),
                    },
                );
            }
        };

        let positional = options.args().to_vec();
        let ctx = CommandContext {
            program: program.to_string(),
            command: name.clone(),
            globals,
            options,
        };

        tracing::debug!(command = %name, args = ?positional, "executing command");
        match command.handler_mut().execute(&positional, &ctx) {
            Ok(()) => Outcome::executed(name.as_str(), None),
            Err(err) => {
                tracing::debug!(command = %name, error = %err, "command failed");
                Outcome::executed(name.as_str(), Some(&err))
            }
        }
    }

    fn usage_outcome(&self, text: String, reason: UsageReason) -> Outcome {
        usage_outcome(&self.program, &self.registry, &self.globals, text, reason)
    }
}

fn process_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.into_string() {
            Ok(arg) => arg,
            Err(raw) => {
                let lossy = raw.to_string_lossy().into_owned();
                tracing::debug!(arg = %lossy, "argument is not valid UTF-8");
                lossy
            }
        })
        .collect()
}

fn usage_outcome(
    program: &str,
    registry: &Registry,
    globals: &OptionSet,
    mut text: String,
    reason: UsageReason,
) -> Outcome {
    text.push_str(&UsageData::extract(program, registry, globals).render());
    Outcome::usage(text, OutcomeKind::Usage(reason))
}
