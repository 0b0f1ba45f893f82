//! The result of one dispatch run.
//!
//! [`Dispatcher::run_from`](crate::Dispatcher::run_from) never exits the
//! process. It returns an [`Outcome`] holding the exit status and the text
//! meant for stderr, and [`Outcome::finish`] is the only place that writes it
//! out and terminates.

use std::io::Write;

use crate::usage::USAGE_STATUS;

/// Why a run ended in the top-level usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageReason {
    /// `-h`/`-help` before the command name.
    Help,
    /// The global options did not parse.
    InvalidGlobals,
    NoCommand,
    UnknownCommand(String),
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The command was executed; `failed` is set when it returned an error.
    Executed { command: String, failed: bool },
    /// Trigger options fired and dispatch was skipped.
    Triggered(Vec<String>),
    /// Top-level usage was reported.
    Usage(UsageReason),
    /// The command's options did not parse (or help was asked for) and its
    /// own usage was reported.
    CommandUsage { command: String, help: bool },
}

/// Exit status, stderr text and kind of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    status: i32,
    diagnostics: String,
    kind: OutcomeKind,
}

impl Outcome {
    pub(crate) fn executed(command: impl Into<String>, error: Option<&anyhow::Error>) -> Self {
        Self {
            status: 0,
            diagnostics: error.map(|err| format!("{err:#}\n")).unwrap_or_default(),
            kind: OutcomeKind::Executed {
                command: command.into(),
                failed: error.is_some(),
            },
        }
    }

    pub(crate) fn triggered(names: Vec<String>) -> Self {
        Self {
            status: 0,
            diagnostics: String::new(),
            kind: OutcomeKind::Triggered(names),
        }
    }

    pub(crate) fn usage(diagnostics: String, kind: OutcomeKind) -> Self {
        Self {
            status: USAGE_STATUS,
            diagnostics,
            kind,
        }
    }

    /// Process exit status: 0, or [`USAGE_STATUS`] for usage output.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Everything destined for stderr.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    pub fn kind(&self) -> &OutcomeKind {
        &self.kind
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Returns true if the run ended in usage output of either kind.
    pub fn is_usage(&self) -> bool {
        matches!(
            self.kind,
            OutcomeKind::Usage(_) | OutcomeKind::CommandUsage { .. }
        )
    }

    /// Name of the executed command, if one ran.
    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            OutcomeKind::Executed { command, .. } => Some(command),
            _ => None,
        }
    }

    /// Writes the diagnostics to `out`.
    pub fn write_diagnostics<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.diagnostics.as_bytes())?;
        out.flush()
    }

    /// Writes the diagnostics to stderr and exits the process if the status
    /// is non-zero. Returns normally on success.
    pub fn finish(self) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        // Nothing sensible is left to do if stderr is gone.
        let _ = self.write_diagnostics(&mut handle);
        drop(handle);

        if self.status != 0 {
            std::process::exit(self.status);
        }
    }
}
