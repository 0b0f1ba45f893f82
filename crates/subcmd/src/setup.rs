//! Error types for setup operations.
//!
//! Everything in here is a programming error in the host: it is reported while
//! the dispatcher is being built, before any user input is looked at.

use thiserror::Error;

/// Error type for setup operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A command was registered with an empty name.
    #[error("command name must not be empty")]
    EmptyCommandName,

    /// A command name that could never be typed as a command.
    #[error("invalid command name {0:?}: must not start with '-'")]
    InvalidCommandName(String),

    /// Duplicate command registered.
    #[error("command {0:?} already registered")]
    DuplicateCommand(String),

    /// The dispatcher was built without any command.
    #[error("program has no commands defined")]
    NoCommands,

    /// An option declaration was rejected.
    #[error("invalid option in {scope}: {source}")]
    Option {
        /// "global options" or the command name.
        scope: String,
        #[source]
        source: DeclareError,
    },
}

/// Why an option declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("option name must not be empty")]
    EmptyName,

    #[error("option name {0:?} must not start with '-' or contain '='")]
    InvalidName(String),

    #[error("option redefined: {0}")]
    Redefined(String),

    #[error("option name {0:?} is reserved for help")]
    Reserved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::DuplicateCommand("build".into());
        assert_eq!(err.to_string(), "command \"build\" already registered");

        let err = SetupError::NoCommands;
        assert_eq!(err.to_string(), "program has no commands defined");
    }

    #[test]
    fn test_option_error_keeps_source() {
        use std::error::Error as _;

        let err = SetupError::Option {
            scope: "build".into(),
            source: DeclareError::Redefined("verbose".into()),
        };
        assert_eq!(
            err.to_string(),
            "invalid option in build: option redefined: verbose"
        );
        assert!(err.source().is_some());
    }
}
