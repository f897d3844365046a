//! Errors raised while defining a command tree or parsing a command line.

use crate::command::CommandPath;
use crate::value::ValueError;
use thiserror::Error;

/// Errors that can occur while building or parsing a command tree.
///
/// User errors carry the path of the command that was active, so a driver
/// can print that command's help. Authoring errors are bugs in the command
/// definition and are best caught by [`crate::Application::validate`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} {}: already set", .command, .facet)]
    Redefined {
        command: String,
        facet: &'static str,
    },

    #[error("{} flags: flag {} has neither a short nor a long name", .command, .index)]
    AnonymousFlag { command: String, index: usize },

    #[error("{} flags: {} declared twice", .command, .flag)]
    DuplicateFlag { command: String, flag: String },

    #[error("{} commands: {} declared twice", .command, .name)]
    DuplicateCommand { command: String, name: String },

    #[error("{} args: <{}> is variadic but not last", .command, .arg)]
    VariadicNotLast { command: String, arg: String },

    #[error("{}broken flag: {}", .command.prefix(), .flag)]
    BrokenFlag { command: CommandPath, flag: String },

    #[error("{}broken argument: {}", .command.prefix(), .arg)]
    BrokenArg { command: CommandPath, arg: String },

    #[error("{}: not handled", .command.name())]
    NotHandled { command: CommandPath },

    #[error("program name: missing")]
    MissingProgramName,

    #[error("{}unexpected flag: {}", .command.prefix(), .flag)]
    UnexpectedFlag { command: CommandPath, flag: String },

    #[error("{}unexpected flag value: {}", .command.prefix(), .flag)]
    UnexpectedFlagValue { command: CommandPath, flag: String },

    #[error("{}{}: expected {}", .command.prefix(), .flag, .hint.as_deref().unwrap_or("<value>"))]
    MissingFlagValue {
        command: CommandPath,
        flag: String,
        hint: Option<String>,
    },

    #[error("{}{}: {}", .command.prefix(), .flag, .cause)]
    FlagParse {
        command: CommandPath,
        flag: String,
        #[source]
        cause: ValueError,
    },

    #[error("{}{}: {}", .command.prefix(), .arg, .cause)]
    ArgParse {
        command: CommandPath,
        arg: String,
        value: String,
        #[source]
        cause: ValueError,
    },

    #[error("{}{}", .command.prefix(), unexpected_args(.args))]
    UnexpectedArgs {
        command: CommandPath,
        args: Vec<String>,
    },

    #[error("{}expected {:?}", .command.prefix(), .args.join(" "))]
    MissingArgs {
        command: CommandPath,
        args: Vec<String>,
    },

    #[error("{}expected <command>", .command.prefix())]
    MissingCommand { command: CommandPath },

    #[error("{}help requested", .command.prefix())]
    HelpDisabled { command: CommandPath },
}

fn unexpected_args(args: &[String]) -> String {
    match args {
        [one] => format!("unexpected argument: {:?}", one),
        many => format!("unexpected arguments: {}", many.join(" ")),
    }
}

impl Error {
    /// The command that was active when the error was raised, if any.
    pub fn command(&self) -> Option<&CommandPath> {
        match self {
            Error::BrokenFlag { command, .. }
            | Error::BrokenArg { command, .. }
            | Error::NotHandled { command }
            | Error::UnexpectedFlag { command, .. }
            | Error::UnexpectedFlagValue { command, .. }
            | Error::MissingFlagValue { command, .. }
            | Error::FlagParse { command, .. }
            | Error::ArgParse { command, .. }
            | Error::UnexpectedArgs { command, .. }
            | Error::MissingArgs { command, .. }
            | Error::MissingCommand { command }
            | Error::HelpDisabled { command } => Some(command),
            Error::Redefined { .. }
            | Error::AnonymousFlag { .. }
            | Error::DuplicateFlag { .. }
            | Error::DuplicateCommand { .. }
            | Error::VariadicNotLast { .. }
            | Error::MissingProgramName => None,
        }
    }

    /// Whether this is a bug in the command definition rather than bad input.
    pub fn is_authoring(&self) -> bool {
        matches!(
            self,
            Error::Redefined { .. }
                | Error::AnonymousFlag { .. }
                | Error::DuplicateFlag { .. }
                | Error::DuplicateCommand { .. }
                | Error::VariadicNotLast { .. }
                | Error::BrokenFlag { .. }
                | Error::BrokenArg { .. }
                | Error::NotHandled { .. }
        )
    }
}
