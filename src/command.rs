//! The command tree: commands, their flags, positional arguments and
//! subcommands, plus the lookup indices the parser searches.

use crate::app::{Context, Handler};
use crate::error::Error;
use crate::opt::{self, Opt};
use std::fmt;
use std::rc::Rc;

/// The names of the commands from the root down to a selected command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPath(Vec<String>);

impl CommandPath {
    pub fn root(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Full dotted name, e.g. `git.commit`.
    pub fn name(&self) -> String {
        self.0.join(".")
    }

    /// Dotted name without the program, e.g. `commit`; empty for the root.
    pub fn command_name(&self) -> String {
        self.0.get(1..).map(|rest| rest.join(".")).unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() <= 1
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Message prefix for errors raised in this command.
    pub(crate) fn prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}: ", self.command_name())
        }
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A part of a command that may be configured at most once.
enum Facet<T> {
    Unset,
    Set(T),
}

impl<T> Default for Facet<T> {
    fn default() -> Self {
        Facet::Unset
    }
}

impl<T> Facet<T> {
    fn check(&self, command: &str, facet: &'static str) -> Result<(), Error> {
        match self {
            Facet::Unset => Ok(()),
            Facet::Set(_) => Err(Error::Redefined {
                command: command.to_string(),
                facet,
            }),
        }
    }

    fn set(&mut self, value: T, command: &str, facet: &'static str) -> Result<(), Error> {
        self.check(command, facet)?;
        *self = Facet::Set(value);
        Ok(())
    }

    fn get(&self) -> Option<&T> {
        match self {
            Facet::Unset => None,
            Facet::Set(value) => Some(value),
        }
    }

    fn is_set(&self) -> bool {
        matches!(self, Facet::Set(_))
    }
}

/// A named option of a command, given as `-s`, `--long`, `--long=value`
/// or `--long value`.
pub struct Flag {
    short: Option<char>,
    long: Option<String>,
    opt: Rc<dyn Opt>,
    hint: Option<String>,
    default: Option<String>,
}

impl Flag {
    pub(crate) fn new(opt: Rc<dyn Opt>, short: Option<char>, long: Option<String>) -> Self {
        Self {
            short: short.filter(|c| *c != '\0'),
            long: long.filter(|l| !l.is_empty()),
            opt,
            hint: None,
            default: None,
        }
    }

    /// Parse `literal` into the option when the flag is not given.
    pub fn default(mut self, literal: &str) -> Self {
        self.default = Some(literal.to_string());
        self
    }

    /// Placeholder shown in help and in "expected" errors, e.g. `<file>`.
    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn hint_text(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn option(&self) -> &dyn Opt {
        &*self.opt
    }

    /// `--long` when there is one, else `-s`.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{}", long),
            (None, Some(short)) => format!("-{}", short),
            (None, None) => String::new(),
        }
    }

    /// `-s, --long`, or whichever names exist.
    pub fn describe(&self) -> String {
        let mut names = Vec::new();
        if let Some(short) = self.short {
            names.push(format!("-{}", short));
        }
        if let Some(long) = &self.long {
            names.push(format!("--{}", long));
        }
        names.join(", ")
    }
}

/// A positional option of a command.
pub struct Arg {
    opt: Rc<dyn Opt>,
    name: String,
    variadic: bool,
}

impl Arg {
    pub(crate) fn new(opt: Rc<dyn Opt>, name: &str, variadic: bool) -> Self {
        Self {
            opt,
            name: name.to_string(),
            variadic,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn option(&self) -> &dyn Opt {
        &*self.opt
    }

    /// Whether `token` may fill this slot even if it starts with dashes.
    pub fn can(&self, token: &str) -> bool {
        opt::accepts(&*self.opt, token)
    }

    /// `<name>`, or `<name> ...` when variadic.
    pub fn describe(&self) -> String {
        if self.variadic {
            format!("<{}> ...", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }
}

struct FlagSet {
    flags: Vec<Flag>,
    by_rune: Vec<usize>,
    by_long: Vec<usize>,
}

impl FlagSet {
    fn build(command: &str, flags: Vec<Flag>) -> Result<Self, Error> {
        if let Some(index) = flags
            .iter()
            .position(|f| f.short.is_none() && f.long.is_none())
        {
            return Err(Error::AnonymousFlag {
                command: command.to_string(),
                index,
            });
        }

        let mut by_rune: Vec<usize> = (0..flags.len()).filter(|&i| flags[i].short.is_some()).collect();
        let mut by_long: Vec<usize> = (0..flags.len()).filter(|&i| flags[i].long.is_some()).collect();
        by_rune.sort_by_key(|&i| flags[i].short);
        by_long.sort_by(|&a, &b| flags[a].long.cmp(&flags[b].long));

        let duplicate = by_rune
            .windows(2)
            .find(|w| flags[w[0]].short == flags[w[1]].short)
            .map(|w| format!("-{}", flags[w[0]].short.unwrap_or_default()))
            .or_else(|| {
                by_long
                    .windows(2)
                    .find(|w| flags[w[0]].long == flags[w[1]].long)
                    .map(|w| format!("--{}", flags[w[0]].long.as_deref().unwrap_or_default()))
            });
        if let Some(flag) = duplicate {
            return Err(Error::DuplicateFlag {
                command: command.to_string(),
                flag,
            });
        }

        Ok(Self {
            flags,
            by_rune,
            by_long,
        })
    }

    fn search_rune(&self, rune: char) -> Option<usize> {
        self.by_rune
            .binary_search_by(|&i| self.flags[i].short.cmp(&Some(rune)))
            .ok()
            .map(|pos| self.by_rune[pos])
    }

    fn search_long(&self, name: &str) -> Option<usize> {
        self.by_long
            .binary_search_by(|&i| self.flags[i].long.as_deref().cmp(&Some(name)))
            .ok()
            .map(|pos| self.by_long[pos])
    }
}

struct CommandSet {
    commands: Vec<Command>,
    by_name: Vec<usize>,
}

impl CommandSet {
    fn build(command: &str, commands: Vec<Command>) -> Result<Self, Error> {
        let mut by_name: Vec<usize> = (0..commands.len()).collect();
        by_name.sort_by(|&a, &b| commands[a].name.cmp(&commands[b].name));
        if let Some(w) = by_name
            .windows(2)
            .find(|w| commands[w[0]].name == commands[w[1]].name)
        {
            return Err(Error::DuplicateCommand {
                command: command.to_string(),
                name: commands[w[0]].name.clone(),
            });
        }
        Ok(Self { commands, by_name })
    }

    fn search(&self, name: &str) -> Option<usize> {
        self.by_name
            .binary_search_by(|&i| self.commands[i].name.as_str().cmp(name))
            .ok()
            .map(|pos| self.by_name[pos])
    }
}

/// A command ("verb") with its flags, positional arguments, subcommands
/// and handler. The application itself is the root command.
pub struct Command {
    name: String,
    desc: String,
    detail: Facet<String>,
    flags: Facet<FlagSet>,
    args: Facet<Vec<Arg>>,
    commands: Facet<CommandSet>,
    handler: Facet<Handler>,
    no_help: bool,
    unlisted: bool,
}

impl Command {
    pub fn new(name: &str, desc: &str) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            detail: Facet::default(),
            flags: Facet::default(),
            args: Facet::default(),
            commands: Facet::default(),
            handler: Facet::default(),
            no_help: false,
            unlisted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.desc
    }

    pub fn details(&self) -> Option<&str> {
        self.detail.get().map(String::as_str)
    }

    pub fn flags(&self) -> &[Flag] {
        self.flags.get().map_or(&[], |set| set.flags.as_slice())
    }

    pub fn args(&self) -> &[Arg] {
        self.args.get().map_or(&[], Vec::as_slice)
    }

    pub fn commands(&self) -> &[Command] {
        self.commands.get().map_or(&[], |set| set.commands.as_slice())
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.get()
    }

    pub fn has_details(&self) -> bool {
        self.detail.is_set()
    }

    pub fn has_flags(&self) -> bool {
        self.flags.is_set()
    }

    pub fn has_args(&self) -> bool {
        self.args.is_set()
    }

    pub fn has_commands(&self) -> bool {
        self.commands.is_set()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_set()
    }

    /// Whether `-h`/`--help` is not offered by this command.
    pub fn help_disabled(&self) -> bool {
        self.no_help
    }

    /// Whether this command is hidden from its parent's help.
    pub fn is_unlisted(&self) -> bool {
        self.unlisted
    }

    pub fn no_help(mut self) -> Self {
        self.no_help = true;
        self
    }

    pub fn unlisted(mut self) -> Self {
        self.unlisted = true;
        self
    }

    /// Set extra help text. May be called once.
    pub fn set_details(&mut self, detail: &str) -> Result<(), Error> {
        self.detail.set(detail.to_string(), &self.name, "detail")
    }

    /// Set the named options. May be called once; declaration order is
    /// kept for help.
    pub fn set_flags(&mut self, flags: Vec<Flag>) -> Result<(), Error> {
        self.flags.check(&self.name, "flags")?;
        let set = FlagSet::build(&self.name, flags)?;
        self.flags.set(set, &self.name, "flags")
    }

    /// Set the positional options. May be called once; only the last may
    /// be variadic.
    pub fn set_args(&mut self, args: Vec<Arg>) -> Result<(), Error> {
        self.args.check(&self.name, "args")?;
        if let Some(arg) = args.iter().rev().skip(1).find(|a| a.variadic) {
            return Err(Error::VariadicNotLast {
                command: self.name.clone(),
                arg: arg.name.clone(),
            });
        }
        self.args.set(args, &self.name, "args")
    }

    /// Set the subcommands. May be called once; names must be unique.
    pub fn set_commands(&mut self, commands: Vec<Command>) -> Result<(), Error> {
        self.commands.check(&self.name, "commands")?;
        let set = CommandSet::build(&self.name, commands)?;
        self.commands.set(set, &self.name, "commands")
    }

    /// Set the function run when this command is selected. May be called once.
    pub fn set_handler(
        &mut self,
        handler: impl Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    ) -> Result<(), Error> {
        self.handler.set(Box::new(handler), &self.name, "handler")
    }

    pub fn with_details(mut self, detail: &str) -> Result<Self, Error> {
        self.set_details(detail)?;
        Ok(self)
    }

    pub fn with_flags(mut self, flags: Vec<Flag>) -> Result<Self, Error> {
        self.set_flags(flags)?;
        Ok(self)
    }

    pub fn with_args(mut self, args: Vec<Arg>) -> Result<Self, Error> {
        self.set_args(args)?;
        Ok(self)
    }

    pub fn with_commands(mut self, commands: Vec<Command>) -> Result<Self, Error> {
        self.set_commands(commands)?;
        Ok(self)
    }

    pub fn with_handler(
        mut self,
        handler: impl Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    ) -> Result<Self, Error> {
        self.set_handler(handler)?;
        Ok(self)
    }

    /// Match `token` against the declared flags.
    ///
    /// Returns the flag index and, for `--name=value`, the inline value.
    /// A single dash matches only when exactly one character follows it.
    pub fn lookup_flag<'t>(&self, token: &'t str) -> Option<(usize, Option<&'t str>)> {
        let set = self.flags.get()?;
        if !token.starts_with('-') || token == "-" {
            return None;
        }

        if let Some(name) = token.strip_prefix("--") {
            if let Some(index) = set.search_long(name) {
                return Some((index, None));
            }
            let eq = token.find('=')?;
            if eq < 3 {
                return None;
            }
            let index = set.search_long(&token[2..eq])?;
            return Some((index, Some(&token[eq + 1..])));
        }

        let mut runes = token[1..].chars();
        let rune = runes.next()?;
        if runes.next().is_some() {
            return None;
        }
        set.search_rune(rune).map(|index| (index, None))
    }

    /// Index of the flag with short name `rune`.
    pub fn lookup_rune(&self, rune: char) -> Option<usize> {
        self.flags.get()?.search_rune(rune)
    }

    /// Index of the subcommand called `name`.
    pub fn lookup_command(&self, name: &str) -> Option<usize> {
        self.commands.get()?.search(name)
    }

    /// The subcommand called `name`.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.lookup_command(name).map(|index| &self.commands()[index])
    }

    /// Check this command and every descendant for definition errors a
    /// parse would otherwise only hit when reaching them.
    pub fn validate(&self, path: &CommandPath) -> Result<(), Error> {
        if !self.has_commands() && !self.has_handler() {
            return Err(Error::NotHandled {
                command: path.clone(),
            });
        }
        for flag in self.flags() {
            let opt = flag.option();
            if opt.as_flag().is_none() && opt.as_value().is_none() && opt.as_inline().is_none() {
                return Err(Error::BrokenFlag {
                    command: path.clone(),
                    flag: flag.display_name(),
                });
            }
        }
        for arg in self.args() {
            let opt = arg.option();
            if opt.as_value().is_none() && opt.as_values().is_none() {
                return Err(Error::BrokenArg {
                    command: path.clone(),
                    arg: arg.describe(),
                });
            }
        }
        for child in self.commands() {
            child.validate(&path.child(&child.name))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("flags", &self.flags().len())
            .field("args", &self.args().len())
            .field("commands", &self.commands().len())
            .field("handled", &self.has_handler())
            .finish()
    }
}
