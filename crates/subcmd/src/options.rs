//! Option declaration and parsing for one scope.
//!
//! An [`OptionSet`] is the declaration surface handed to command factories and
//! to the global configuration closure. Parsing is delegated to clap: each set
//! becomes a `clap::Command` with a single trailing positional that swallows
//! everything from the first non-option token on, so global parsing stops at
//! the command name and leaves the rest untouched.
//!
//! Options are written `-name` or `--name`. Non-bool options take their value
//! as `-name value` or `-name=value`; bool options only accept the `=` form
//! (`-verbose=false`). The last occurrence of a repeated option wins.

use clap::builder::BoolishValueParser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use thiserror::Error;

use crate::setup::DeclareError;

// User option names can't start with '-', so these never collide.
const ARGS_ID: &str = "-args";
const HELP_ID: &str = "-help";

/// The value type of a declared option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    String,
    Int,
    Uint,
    Float,
}

impl OptionKind {
    /// Type word shown in usage listings; empty for bool options.
    pub fn type_name(self) -> &'static str {
        match self {
            OptionKind::Bool => "",
            OptionKind::String => "string",
            OptionKind::Int => "int",
            OptionKind::Uint => "uint",
            OptionKind::Float => "float",
        }
    }

    /// Returns true if the option consumes a value token.
    pub fn takes_value(self) -> bool {
        !matches!(self, OptionKind::Bool)
    }
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionKind,
    /// Textual default, as parsed and as shown in usage.
    pub default: String,
    pub description: String,
}

impl OptionSpec {
    fn to_arg(&self) -> Arg {
        let arg = Arg::new(self.name.clone()).long(self.name.clone());

        if self.kind == OptionKind::Bool {
            return arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .default_value(self.default.clone())
                .value_parser(BoolishValueParser::new());
        }

        let arg = arg
            .action(ArgAction::Set)
            .num_args(1)
            .allow_hyphen_values(true)
            .value_name(self.kind.type_name());
        let arg = match self.kind {
            OptionKind::Int => arg.value_parser(value_parser!(i64)),
            OptionKind::Uint => arg.value_parser(value_parser!(u64)),
            OptionKind::Float => arg.value_parser(value_parser!(f64)),
            _ => arg.value_parser(value_parser!(String)),
        };

        if self.default.is_empty() {
            arg
        } else {
            arg.default_value(self.default.clone())
        }
    }
}

/// Declaration surface for the options of one scope.
///
/// Declaration methods chain. An invalid declaration does not panic: the first
/// one is remembered and reported as a [`SetupError`](crate::SetupError) when
/// the scope is registered.
///
/// ```rust
/// use subcmd::OptionSet;
///
/// let mut opts = OptionSet::new("build");
/// opts.flag("verbose", "print each step")
///     .int("jobs", 4, "number of parallel jobs");
///
/// let parsed = opts.parse(["-jobs", "8", "release"]).unwrap();
/// assert_eq!(parsed.int("jobs"), Some(8));
/// assert!(!parsed.flag("verbose"));
/// assert_eq!(parsed.args(), ["release"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    scope: String,
    specs: Vec<OptionSpec>,
    error: Option<DeclareError>,
}

impl OptionSet {
    /// Creates an empty option set. `scope` names it in diagnostics.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Declares a bool option defaulting to false.
    pub fn flag(&mut self, name: impl Into<String>, usage: impl Into<String>) -> &mut Self {
        self.bool(name, false, usage)
    }

    pub fn bool(
        &mut self,
        name: impl Into<String>,
        default: bool,
        usage: impl Into<String>,
    ) -> &mut Self {
        self.declare(name.into(), OptionKind::Bool, default.to_string(), usage.into())
    }

    pub fn string(
        &mut self,
        name: impl Into<String>,
        default: impl Into<String>,
        usage: impl Into<String>,
    ) -> &mut Self {
        self.declare(name.into(), OptionKind::String, default.into(), usage.into())
    }

    pub fn int(
        &mut self,
        name: impl Into<String>,
        default: i64,
        usage: impl Into<String>,
    ) -> &mut Self {
        self.declare(name.into(), OptionKind::Int, default.to_string(), usage.into())
    }

    pub fn uint(
        &mut self,
        name: impl Into<String>,
        default: u64,
        usage: impl Into<String>,
    ) -> &mut Self {
        self.declare(name.into(), OptionKind::Uint, default.to_string(), usage.into())
    }

    pub fn float(
        &mut self,
        name: impl Into<String>,
        default: f64,
        usage: impl Into<String>,
    ) -> &mut Self {
        self.declare(name.into(), OptionKind::Float, default.to_string(), usage.into())
    }

    /// Returns true if no option has been declared.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Declared options, in declaration order.
    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    /// Declared options sorted by name, the order used in usage listings.
    pub fn sorted(&self) -> Vec<&OptionSpec> {
        let mut specs: Vec<&OptionSpec> = self.specs.iter().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// The first rejected declaration, if any.
    pub fn error(&self) -> Option<&DeclareError> {
        self.error.as_ref()
    }

    fn declare(
        &mut self,
        name: String,
        kind: OptionKind,
        default: String,
        description: String,
    ) -> &mut Self {
        let rejected = if name.is_empty() {
            Some(DeclareError::EmptyName)
        } else if name.starts_with('-') || name.contains('=') {
            Some(DeclareError::InvalidName(name.clone()))
        } else if name == "help" || name == "h" {
            Some(DeclareError::Reserved(name.clone()))
        } else if self.get(&name).is_some() {
            Some(DeclareError::Redefined(name.clone()))
        } else {
            None
        };

        match rejected {
            Some(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
            None => self.specs.push(OptionSpec {
                name,
                kind,
                default,
                description,
            }),
        }
        self
    }

    /// Parses `tokens` against the declared options.
    ///
    /// Parsing stops at the first positional token or after `--`; that token
    /// and everything after it end up in [`ParsedOptions::args`].
    pub fn parse<I, S>(&self, tokens: I) -> Result<ParsedOptions, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = self.normalize(tokens.into_iter().map(Into::into).collect());
        let matches = self.to_command().try_get_matches_from(tokens)?;
        let args = matches
            .get_many::<String>(ARGS_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(ParsedOptions {
            declared: self.specs.iter().map(|spec| spec.name.clone()).collect(),
            matches,
            args,
        })
    }

    fn to_command(&self) -> clap::Command {
        let cmd = clap::Command::new(self.scope.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new(HELP_ID)
                    .long("help")
                    .alias("h")
                    .action(ArgAction::Help),
            )
            .arg(
                Arg::new(ARGS_ID)
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .trailing_var_arg(true)
                    .value_parser(value_parser!(String)),
            );

        self.specs
            .iter()
            .fold(cmd, |cmd, spec| cmd.arg(spec.to_arg()))
    }

    /// Rewrites single-dash options to clap's long form, up to the first
    /// positional token.
    fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter();

        while let Some(token) = iter.next() {
            if token == "--" || token == "-" || !token.starts_with('-') {
                out.push(token);
                out.extend(iter);
                break;
            }

            let body = token
                .strip_prefix("--")
                .or_else(|| token.strip_prefix('-'))
                .unwrap_or(&token);
            let (name, inline_value) = match body.split_once('=') {
                Some((name, _)) => (name, true),
                None => (body, false),
            };
            let takes_value = self
                .get(name)
                .is_some_and(|spec| spec.kind.takes_value());

            out.push(format!("--{body}"));
            if takes_value && !inline_value {
                if let Some(value) = iter.next() {
                    out.push(value);
                }
            }
        }

        out
    }
}

/// Values produced by a successful [`OptionSet::parse`].
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    declared: Vec<String>,
    matches: ArgMatches,
    args: Vec<String>,
}

impl ParsedOptions {
    fn lookup<T>(&self, name: &str) -> Option<&T>
    where
        T: std::any::Any + Clone + Send + Sync + 'static,
    {
        if !self.declared.iter().any(|declared| declared == name) {
            return None;
        }
        self.matches.try_get_one::<T>(name).ok().flatten()
    }

    /// Value of a bool option; false when undeclared.
    pub fn flag(&self, name: &str) -> bool {
        self.lookup::<bool>(name).copied().unwrap_or(false)
    }

    /// Value of a string option, `None` when unset with an empty default.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.lookup::<String>(name).map(String::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.lookup::<i64>(name).copied()
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.lookup::<u64>(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.lookup::<f64>(name).copied()
    }

    /// Returns true if the option was given on the command line rather than
    /// taken from its default.
    pub fn is_set(&self, name: &str) -> bool {
        self.declared.iter().any(|declared| declared == name)
            && self.matches.value_source(name) == Some(ValueSource::CommandLine)
    }

    /// Tokens left over after option parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// A malformed command line, as reported by [`OptionSet::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `-h`, `-help` or `--help` was given.
    #[error("help requested")]
    HelpRequested,

    #[error("flag provided but not defined: -{0}")]
    UnknownOption(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for flag -{option}")]
    InvalidValue { option: String, value: String },

    #[error("{0}")]
    Other(String),
}

impl ParseError {
    pub fn is_help(&self) -> bool {
        matches!(self, ParseError::HelpRequested)
    }
}

impl From<clap::Error> for ParseError {
    fn from(err: clap::Error) -> Self {
        let option = context_string(&err, ContextKind::InvalidArg).map(option_name);

        match (err.kind(), option) {
            (ErrorKind::DisplayHelp, _) => ParseError::HelpRequested,
            (ErrorKind::UnknownArgument, Some(option)) => ParseError::UnknownOption(option),
            (ErrorKind::InvalidValue | ErrorKind::ValueValidation, Some(option)) => {
                match context_string(&err, ContextKind::InvalidValue) {
                    Some(value) if !value.is_empty() => ParseError::InvalidValue { option, value },
                    _ => ParseError::MissingValue(option),
                }
            }
            _ => ParseError::Other(first_line(&err)),
        }
    }
}

fn context_string(err: &clap::Error, kind: ContextKind) -> Option<String> {
    match err.get(kind)? {
        ContextValue::String(value) => Some(value.clone()),
        _ => None,
    }
}

/// `--out <string>` and `--verbose[=<verbose>]` both become the bare name.
fn option_name(rendered: String) -> String {
    rendered
        .trim_start_matches('-')
        .split([' ', '=', '['])
        .next()
        .unwrap_or_default()
        .to_string()
}

fn first_line(err: &clap::Error) -> String {
    let text = err.to_string();
    let line = text.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
