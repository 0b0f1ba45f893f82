//! Command handler types.
//!
//! A [`Command`] is the business-logic side of a registered subcommand. It is
//! created once, by the factory passed to
//! [`DispatcherBuilder::command`](crate::DispatcherBuilder::command), and
//! executed at most once per run with the positional arguments left over
//! after its options were parsed.
//!
//! # Core Types
//!
//! - [`Command`]: trait for subcommand handlers (`&mut self`)
//! - [`CommandContext`]: program name, command name and parsed options
//! - [`FnCommand`]: adapter turning a closure into a [`Command`]

use crate::options::ParsedOptions;

/// Context passed to command handlers.
///
/// Handlers read option values from here: `options` holds the command's own
/// options, `globals` the ones given before the command name.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Program name as shown in usage lines.
    pub program: String,
    /// The command being executed.
    pub command: String,
    pub globals: ParsedOptions,
    pub options: ParsedOptions,
}

/// Trait for subcommand handlers.
///
/// Handlers take `&mut self`, so they can keep state without interior
/// mutability. [`describe`](Command::describe) is optional: commands that
/// don't implement it are listed with a placeholder description.
///
/// # Example
///
/// ```rust
/// use subcmd::{Command, CommandContext};
///
/// struct Greet {
///     greeted: usize,
/// }
///
/// impl Command for Greet {
///     fn execute(&mut self, args: &[String], _ctx: &CommandContext) -> anyhow::Result<()> {
///         for name in args {
///             eprintln!("hello, {name}");
///             self.greeted += 1;
///         }
///         Ok(())
///     }
///
///     fn arg_names(&self) -> &str {
///         "<name>..."
///     }
///
///     fn describe(&self) -> Option<&str> {
///         Some("greet everyone named on the command line")
///     }
/// }
/// ```
pub trait Command {
    /// Runs the command with the positional arguments left after option
    /// parsing.
    fn execute(&mut self, args: &[String], ctx: &CommandContext) -> anyhow::Result<()>;

    /// Names of the positional arguments, for the usage line
    /// (e.g. `<src> <dst>`).
    fn arg_names(&self) -> &str;

    /// One-line description for the command list.
    fn describe(&self) -> Option<&str> {
        None
    }
}

/// A [`Command`] backed by an `FnMut` closure.
///
/// ```rust
/// use subcmd::{Command, CommandContext, FnCommand};
///
/// let mut cmd = FnCommand::new("<file>", |args: &[String], _ctx: &CommandContext| {
///     anyhow::ensure!(args.len() == 1, "expected exactly one file");
///     Ok(())
/// })
/// .with_description("check a single file");
///
/// assert!(cmd.execute(&["a.txt".to_string()], &CommandContext::default()).is_ok());
/// assert_eq!(cmd.describe(), Some("check a single file"));
/// ```
pub struct FnCommand<F> {
    f: F,
    arg_names: String,
    description: Option<String>,
}

impl<F> FnCommand<F>
where
    F: FnMut(&[String], &CommandContext) -> anyhow::Result<()>,
{
    /// Creates a command with the given argument names and body.
    pub fn new(arg_names: impl Into<String>, f: F) -> Self {
        Self {
            f,
            arg_names: arg_names.into(),
            description: None,
        }
    }

    /// Sets the one-line description shown in the command list.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<F> Command for FnCommand<F>
where
    F: FnMut(&[String], &CommandContext) -> anyhow::Result<()>,
{
    fn execute(&mut self, args: &[String], ctx: &CommandContext) -> anyhow::Result<()> {
        (self.f)(args, ctx)
    }

    fn arg_names(&self) -> &str {
        &self.arg_names
    }

    fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
