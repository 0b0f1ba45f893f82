//! Subcommand registration and dispatch for command-line programs.
//!
//! `subcmd` routes `<program> [globalopts] <command> [cmdopts] <args...>` to
//! the command registered under `<command>`. Each command declares its own
//! options; global options are declared once for the whole program. Option
//! parsing itself is done by clap.
//!
//! # Features
//!
//! - **One-time registration**: duplicate and invalid command names are
//!   rejected while the dispatcher is built
//! - **Two-tier grammar**: global options stop at the command name, the rest
//!   belongs to the command
//! - **Trigger options**: bool global options that run a callback (`-version`)
//! - **Usage text**: synthesized from the registry, sorted by command name
//! - **Testable core**: a run returns an [`Outcome`]; only
//!   [`Outcome::finish`] touches the process
//!
//! # Example
//!
//! ```rust
//! use subcmd::{CommandContext, Dispatcher, FnCommand, OutcomeKind, UsageReason};
//!
//! let mut dispatcher = Dispatcher::builder()
//!     .program("tool")
//!     .version(|| eprintln!("tool 1.0"))
//!     .command("greet", |opts| {
//!         opts.string("greeting", "hello", "what to say");
//!         FnCommand::new("<name>", |args: &[String], ctx: &CommandContext| {
//!             let greeting = ctx.options.string("greeting").unwrap_or_default();
//!             for name in args {
//!                 eprintln!("{greeting}, {name}");
//!             }
//!             Ok(())
//!         })
//!         .with_description("greet people")
//!     })?
//!     .build()?;
//!
//! assert_eq!(dispatcher.run_from(["greet", "world"]).status(), 0);
//!
//! let outcome = dispatcher.run_from(["nope"]);
//! assert_eq!(outcome.status(), 2);
//! assert_eq!(
//!     outcome.kind(),
//!     &OutcomeKind::Usage(UsageReason::UnknownCommand("nope".into()))
//! );
//! assert!(outcome.diagnostics().starts_with("Unknown command: nope\n"));
//! # Ok::<(), subcmd::SetupError>(())
//! ```
//!
//! In `main`, hand the outcome to the process:
//!
//! ```rust,ignore
//! fn main() {
//!     let mut dispatcher = build_dispatcher().expect("command setup");
//!     dispatcher.run().finish();
//! }
//! ```

mod dispatch;
mod handler;
mod options;
mod outcome;
mod registry;
mod setup;
mod trigger;
mod usage;

pub use dispatch::{Dispatcher, DispatcherBuilder};

pub use handler::{Command, CommandContext, FnCommand};

pub use options::{OptionKind, OptionSet, OptionSpec, ParseError, ParsedOptions};

pub use outcome::{Outcome, OutcomeKind, UsageReason};

pub use registry::{RegisteredCommand, Registry, NO_DESCRIPTION};

pub use setup::{DeclareError, SetupError};

pub use trigger::{TriggerFn, TriggerOption, TriggerPolicy, Triggers};

pub use usage::{render_options, CommandSummary, CommandUsage, UsageData, USAGE_STATUS};
