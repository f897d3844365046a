//! cmdrun - typed multi-command argument parsing.
//!
//! A command tree of flags, positional arguments and subcommands is built
//! from option cells that parsing fills in place. The crate also renders
//! help, reports parses for debugging, and drives a tree defined in JSON
//! from shell scripts.

pub mod app;
pub mod command;
pub mod config;
pub mod debug;
pub mod error;
pub mod flag_only;
pub mod help;
pub mod opt;
pub mod opts;
pub mod output;
pub mod parser;
pub mod value;

pub use app::{Application, Context, Environ, Handler};
pub use command::{Arg, Command, CommandPath, Flag};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use flag_only::{accumulator, enabler, toggler, FlagOnly};
pub use opt::{
    boolean, file, file_like, float, int, named_of, parser, string, string_like, string_of, Opt,
    Single,
};
pub use opts::{
    bool_slice, file_slice, float_slice, int_slice, named_slice_of, parser_slice, string_like_slice,
    string_slice, string_slice_of, Multi,
};
pub use parser::{ParseOutcome, Selected};
pub use value::{NamedValue, ValueError};
