//! Usage text.
//!
//! Usage is built in two steps, like help elsewhere: the data is extracted
//! from the registry into [`UsageData`] / [`CommandUsage`], then rendered to
//! plain text. The dispatcher always pairs rendered usage with
//! [`USAGE_STATUS`].

use std::fmt::Write as _;

use crate::options::{OptionKind, OptionSet, OptionSpec};
use crate::registry::{RegisteredCommand, Registry};

/// Exit status of every run that ends in usage output.
pub const USAGE_STATUS: i32 = 2;

/// One line of the command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
}

/// Everything the top-level usage text shows.
#[derive(Debug, Clone)]
pub struct UsageData<'a> {
    pub program: &'a str,
    /// Sorted by name.
    pub commands: Vec<CommandSummary>,
    pub globals: &'a OptionSet,
}

/// Everything the usage text of a single command shows.
#[derive(Debug, Clone)]
pub struct CommandUsage<'a> {
    pub program: &'a str,
    pub command: &'a str,
    pub arg_names: &'a str,
    pub options: &'a OptionSet,
}

impl<'a> UsageData<'a> {
    pub fn extract(program: &'a str, registry: &Registry, globals: &'a OptionSet) -> Self {
        let commands = registry
            .iter()
            .map(|cmd| CommandSummary {
                name: cmd.name().to_string(),
                description: cmd.description().to_string(),
            })
            .collect();

        Self {
            program,
            commands,
            globals,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "Usage:\n\n  {} [globalopts] cmd [cmdopts] [cmdargs]\n\n",
            self.program
        );

        out.push_str("Commands:\n");
        for summary in &self.commands {
            let _ = writeln!(out, "  {}: {}", summary.name, summary.description);
        }

        if !self.globals.is_empty() {
            out.push_str("\nGlobal options:\n");
            out.push_str(&render_options(self.globals));
        }
        out
    }
}

impl<'a> CommandUsage<'a> {
    pub fn extract(program: &'a str, command: &'a RegisteredCommand) -> Self {
        Self {
            program,
            command: command.name(),
            arg_names: command.handler().arg_names(),
            options: command.options(),
        }
    }

    /// `<program> [globalopts] <command> [cmdopts] <argnames>`
    pub fn usage_line(&self) -> String {
        let mut line = format!("{} [globalopts] {} ", self.program, self.command);
        if !self.options.is_empty() {
            line.push_str("[cmdopts] ");
        }
        line.push_str(self.arg_names);
        line.trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let mut out = format!("Usage:\n\n  {}\n\n", self.usage_line());
        if !self.options.is_empty() {
            let _ = writeln!(out, "{} options:", self.command);
            out.push_str(&render_options(self.options));
        }
        out
    }
}

/// Renders every option of `options`, sorted by name.
///
/// ```text
///   -jobs int
///     	parallel jobs (default 4)
///   -v	verbose output (default false)
/// ```
pub fn render_options(options: &OptionSet) -> String {
    options.sorted().into_iter().map(render_option).collect()
}

fn render_option(spec: &OptionSpec) -> String {
    let (type_word, usage) = unquote_usage(spec);

    let mut out = format!("  -{}", spec.name);
    if !type_word.is_empty() {
        out.push(' ');
        out.push_str(&type_word);
    }
    // Short entries keep the description on the same line.
    if out.len() <= 4 {
        out.push('\t');
    } else {
        out.push_str("\n    \t");
    }
    out.push_str(&usage.replace('\n', "\n    \t"));

    match spec.kind {
        OptionKind::String if spec.default.is_empty() => {}
        OptionKind::String => {
            let _ = write!(out, " (default {:?})", spec.default);
        }
        _ => {
            let _ = write!(out, " (default {})", spec.default);
        }
    }
    out.push('\n');
    out
}

/// Splits a back-quoted word out of the description to use as the type word.
///
/// `"read from `file`"` yields `("file", "read from file")`. Without back
/// quotes the option's type name is used.
fn unquote_usage(spec: &OptionSpec) -> (String, String) {
    let usage = &spec.description;
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let word = &usage[start + 1..start + 1 + len];
            let plain = format!("{}{}{}", &usage[..start], word, &usage[start + 2 + len..]);
            return (word.to_string(), plain);
        }
    }
    (spec.kind.type_name().to_string(), usage.clone())
}
