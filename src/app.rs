//! The application: the root command plus the driver that parses a
//! command line, prints help and runs the selected handler.

use crate::command::{Command, CommandPath};
use crate::error::Error;
use crate::help;
use crate::parser::{self, ParseOutcome};
use std::fmt;
use std::io::{self, Write};
use std::ops::{Deref, DerefMut};
use std::process::ExitCode;

/// Function run for a selected command.
pub type Handler = Box<dyn Fn(&mut Context<'_>) -> anyhow::Result<()>>;

/// What a handler gets to work with.
pub struct Context<'e> {
    pub command: &'e CommandPath,
    pub stdout: &'e mut dyn Write,
    pub stderr: &'e mut dyn Write,
}

/// Process arguments and output streams.
pub struct Environ<'w> {
    pub args: Vec<String>,
    pub stdout: Box<dyn Write + 'w>,
    pub stderr: Box<dyn Write + 'w>,
}

impl Environ<'static> {
    /// The running process's arguments, stdout and stderr.
    pub fn from_process() -> Self {
        Self {
            args: std::env::args().collect(),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }
}

impl<'w> Environ<'w> {
    /// Replace the arguments; `args[0]` is the program name.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// A command-line application: the root command and parse settings.
pub struct Application {
    root: Command,
    group_short_flags: bool,
}

impl Deref for Application {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.root
    }
}

impl DerefMut for Application {
    fn deref_mut(&mut self) -> &mut Command {
        &mut self.root
    }
}

impl From<Command> for Application {
    fn from(root: Command) -> Self {
        Self {
            root,
            group_short_flags: false,
        }
    }
}

impl Application {
    pub fn new(name: &str, desc: &str) -> Self {
        Command::new(name, desc).into()
    }

    /// Treat every `-`-prefixed token as flag-shaped, so `-abc` can be
    /// read as `-a -b -c`. Multi-digit negative numbers are then only
    /// accepted by positionals that tolerate a leading dash.
    pub fn allow_group_short_flags(&mut self, allow: bool) {
        self.group_short_flags = allow;
    }

    pub fn groups_short_flags(&self) -> bool {
        self.group_short_flags
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Parse `args` (program name first), filling option cells.
    ///
    /// Parsing is lazy about definition errors that sit on commands the
    /// line does not reach; see [`Application::validate`].
    pub fn parse(&self, args: &[String]) -> Result<ParseOutcome<'_>, Error> {
        parser::parse(&self.root, args, self.group_short_flags)
    }

    /// Check the whole tree for definition errors.
    pub fn validate(&self) -> Result<(), Error> {
        self.root.validate(&CommandPath::root(self.root.name()))
    }

    /// The command at `path`, which starts with the application name.
    pub fn find(&self, path: &CommandPath) -> Option<&Command> {
        let mut command = &self.root;
        for name in path.segments().iter().skip(1) {
            command = command.find(name)?;
        }
        Some(command)
    }

    /// The commands along `path`, root first.
    pub(crate) fn resolve(&self, path: &CommandPath) -> Vec<&Command> {
        let mut commands = vec![&self.root];
        for name in path.segments().iter().skip(1) {
            match commands[commands.len() - 1].find(name) {
                Some(command) => commands.push(command),
                None => break,
            }
        }
        commands
    }

    /// Write help for the command at `path` to `w`.
    pub fn write_help(&self, w: &mut dyn Write, path: &CommandPath) -> io::Result<()> {
        let command = self.find(path).unwrap_or(&self.root);
        help::write_usage(w, self, command, path)
    }

    /// Validate, parse `env.args`, then run the selected command's handler.
    ///
    /// Help requests print help. Unexpected or missing arguments also
    /// print help for the command they occurred in before failing.
    pub fn main(&self, env: &mut Environ<'_>) -> anyhow::Result<()> {
        self.validate()?;

        let outcome = match self.parse(&env.args) {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, Error::UnexpectedArgs { .. } | Error::MissingArgs { .. }) {
                    if let Some(path) = err.command() {
                        self.write_help(&mut *env.stdout, path)?;
                    }
                }
                return Err(err.into());
            }
        };

        match outcome {
            ParseOutcome::Help(selected) => {
                self.write_help(&mut *env.stdout, selected.path())?;
                Ok(())
            }
            ParseOutcome::Command(selected) => {
                let handler = selected.handler()?;
                let mut ctx = Context {
                    command: selected.path(),
                    stdout: &mut *env.stdout,
                    stderr: &mut *env.stderr,
                };
                handler(&mut ctx)
            }
        }
    }

    /// Print `err` as `<name>: error: <message>`.
    pub fn ferror(&self, w: &mut dyn Write, err: &dyn fmt::Display) -> io::Result<()> {
        writeln!(w, "{}: error: {}", self.name(), err)
    }

    /// Run [`Application::main`], reporting any error to stderr.
    pub fn run(&self, env: &mut Environ<'_>) -> ExitCode {
        match self.main(env) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                let _ = self.ferror(&mut *env.stderr, &err);
                ExitCode::FAILURE
            }
        }
    }
}
