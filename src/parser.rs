//! The parsing engine: walks a command line against the command tree,
//! filling option cells and selecting a command.

use crate::app::Handler;
use crate::command::{Arg, Command, CommandPath};
use crate::error::Error;
use crate::value::ValueError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// The command a command line resolved to, with its ancestors.
#[derive(Debug)]
pub struct Selected<'a> {
    commands: Vec<&'a Command>,
    path: CommandPath,
}

impl<'a> Selected<'a> {
    /// The selected (deepest) command.
    pub fn command(&self) -> &'a Command {
        self.commands[self.commands.len() - 1]
    }

    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    /// The selected command followed by its ancestors up to the root.
    pub fn lineage(&self) -> impl Iterator<Item = &'a Command> + '_ {
        self.commands.iter().rev().copied()
    }

    /// Fails when a command with subcommands was selected without choosing
    /// one and it has no handler of its own.
    pub fn ensure_complete(&self) -> Result<(), Error> {
        let command = self.command();
        if command.has_commands() && !command.has_handler() {
            return Err(Error::MissingCommand {
                command: self.path.clone(),
            });
        }
        Ok(())
    }

    /// The handler to run for the selected command.
    pub fn handler(&self) -> Result<&'a Handler, Error> {
        self.ensure_complete()?;
        self.command().handler().ok_or_else(|| Error::NotHandled {
            command: self.path.clone(),
        })
    }
}

/// What a successful parse produced.
#[derive(Debug)]
pub enum ParseOutcome<'a> {
    /// A command was selected and its options were filled.
    Command(Selected<'a>),
    /// `-h`/`--help` was given; show help for the selected command.
    Help(Selected<'a>),
}

impl<'a> ParseOutcome<'a> {
    pub fn selected(&self) -> &Selected<'a> {
        match self {
            ParseOutcome::Command(selected) | ParseOutcome::Help(selected) => selected,
        }
    }

    pub fn is_help(&self) -> bool {
        matches!(self, ParseOutcome::Help(_))
    }
}

/// Parse `args` (program name first) against the tree rooted at `root`.
pub(crate) fn parse<'a>(
    root: &'a Command,
    args: &[String],
    group_short_flags: bool,
) -> Result<ParseOutcome<'a>, Error> {
    let tokens = match args.split_first() {
        Some((_program, tokens)) => tokens,
        None => return Err(Error::MissingProgramName),
    };
    reset_options(root);
    let mut parser = Parser::new(root, tokens, group_short_flags);
    parser.run()?;
    parser.finish()
}

/// Internal parser state, local to one parse.
struct Parser<'a, 't> {
    tokens: &'t [String],
    group_short_flags: bool,
    stack: Vec<&'a Command>,
    path: CommandPath,
    /// Index of the next token.
    pos: usize,
    /// Index of the next positional slot of the current command.
    slot: usize,
    can_flag: bool,
    show_help: bool,
    /// Sightings per (depth, flag index) in this parse.
    seen: HashMap<(usize, usize), usize>,
}

impl<'a, 't> Parser<'a, 't> {
    fn new(root: &'a Command, tokens: &'t [String], group_short_flags: bool) -> Self {
        Self {
            tokens,
            group_short_flags,
            stack: vec![root],
            path: CommandPath::root(root.name()),
            pos: 0,
            slot: 0,
            can_flag: true,
            show_help: false,
            seen: HashMap::new(),
        }
    }

    fn current(&self) -> &'a Command {
        self.stack[self.stack.len() - 1]
    }

    fn run(&mut self) -> Result<(), Error> {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            let token = token.as_str();
            let command = self.current();

            if self.can_flag {
                if token == "--" {
                    trace!(pos = self.pos, "flag parsing disabled");
                    self.can_flag = false;
                    self.pos += 1;
                    continue;
                }

                if let Some((index, inline)) = command.lookup_flag(token) {
                    let consumed = self.apply_flag(index, token, inline)?;
                    self.pos += 1 + consumed;
                    continue;
                }

                if !command.help_disabled() && (token == "-h" || token == "--help") {
                    debug!(command = %self.path, "help requested");
                    self.show_help = true;
                    self.pos += 1;
                    continue;
                }

                if self.looks_like_flag(token) && !self.slot_accepts(token) {
                    if self.group_short_flags {
                        if let Some(consumed) = self.expand_cluster(token)? {
                            self.pos += 1 + consumed;
                            continue;
                        }
                    }
                    return Err(Error::UnexpectedFlag {
                        command: self.path.clone(),
                        flag: token.to_string(),
                    });
                }
            }

            if let Some(arg) = command.args().get(self.slot) {
                self.fill_slot(arg)?;
                self.slot += 1;
                continue;
            }

            if let Some(child) = command.find(token) {
                debug!(command = child.name(), "entering subcommand");
                reset_options(child);
                self.stack.push(child);
                self.path = self.path.child(child.name());
                self.slot = 0;
                self.pos += 1;
                continue;
            }

            return Err(Error::UnexpectedArgs {
                command: self.path.clone(),
                args: tokens[self.pos..].to_vec(),
            });
        }
        Ok(())
    }

    /// Whether `token` is treated as a flag when no declared flag matches.
    fn looks_like_flag(&self, token: &str) -> bool {
        if self.group_short_flags {
            return token.starts_with('-');
        }
        token.starts_with("--") || (token.starts_with('-') && token.chars().count() == 2)
    }

    fn slot_accepts(&self, token: &str) -> bool {
        self.current()
            .args()
            .get(self.slot)
            .map_or(false, |arg| arg.can(token))
    }

    /// Dispatch one occurrence of the flag at `index` of the current command.
    ///
    /// Returns how many tokens after the current one were consumed.
    fn apply_flag(&mut self, index: usize, token: &str, inline: Option<&str>) -> Result<usize, Error> {
        let depth = self.stack.len() - 1;
        let flag = &self.current().flags()[index];
        let opt = flag.option();
        let occurrence = self.seen.get(&(depth, index)).copied().unwrap_or(0);
        let flag_error = |cause: ValueError| Error::FlagParse {
            command: self.path.clone(),
            flag: token.to_string(),
            cause,
        };

        let consumed = match inline {
            None => {
                if let Some(parser) = opt.as_flag() {
                    parser.parse_flag(occurrence).map_err(flag_error)?;
                    0
                } else if let Some(parser) = opt.as_value() {
                    let value = self.tokens.get(self.pos + 1).ok_or_else(|| {
                        Error::MissingFlagValue {
                            command: self.path.clone(),
                            flag: token.to_string(),
                            hint: flag.hint_text().map(str::to_string),
                        }
                    })?;
                    parser.parse_value(value).map_err(flag_error)?;
                    1
                } else {
                    return Err(Error::BrokenFlag {
                        command: self.path.clone(),
                        flag: token.to_string(),
                    });
                }
            }
            Some(value) => match opt.as_inline() {
                Some(parser) => {
                    parser.parse_inline(value).map_err(flag_error)?;
                    0
                }
                None => {
                    return Err(Error::UnexpectedFlagValue {
                        command: self.path.clone(),
                        flag: token.to_string(),
                    })
                }
            },
        };

        *self.seen.entry((depth, index)).or_insert(0) += 1;
        trace!(flag = token, occurrence, "flag applied");
        Ok(consumed)
    }

    /// Try `-abc` as the short flags `-a -b -c`. Flag-only runes fire in
    /// order; the first rune taking a value takes the rest of the cluster,
    /// or the next token when it is last.
    ///
    /// Returns `None`, applying nothing, unless every rune resolves.
    fn expand_cluster(&mut self, token: &str) -> Result<Option<usize>, Error> {
        let cluster = match token.strip_prefix('-') {
            Some(cluster) if !cluster.is_empty() && !cluster.starts_with('-') => cluster,
            _ => return Ok(None),
        };

        let command = self.current();
        let mut plan: Vec<(usize, String, Option<&str>)> = Vec::new();
        for (offset, rune) in cluster.char_indices() {
            let index = match command.lookup_rune(rune) {
                Some(index) => index,
                None => return Ok(None),
            };
            let name = format!("-{}", rune);
            let opt = command.flags()[index].option();
            if opt.as_flag().is_some() {
                plan.push((index, name, None));
                continue;
            }
            let rest = &cluster[offset + rune.len_utf8()..];
            plan.push((index, name, Some(rest).filter(|r| !r.is_empty())));
            break;
        }

        trace!(token, flags = plan.len(), "expanding short flag cluster");
        let mut consumed = 0;
        for (index, name, inline) in plan {
            consumed += self.apply_flag(index, &name, inline)?;
        }
        Ok(Some(consumed))
    }

    /// Fill the current positional slot starting at the current token.
    fn fill_slot(&mut self, arg: &'a Arg) -> Result<(), Error> {
        let opt = arg.option();
        let tokens = self.tokens;

        if let Some(parser) = opt.as_values() {
            let run = &tokens[self.pos..];
            if !self.can_flag {
                let taken = parser
                    .parse_values(run)
                    .map_err(|p| self.arg_error(arg, &run[p.accepted], p.error))?;
                self.pos += taken;
                return Ok(());
            }

            let (values, escape) = collect_run(arg, run);
            trace!(arg = arg.name(), count = values.len(), "collected variadic run");
            let taken = parser
                .parse_values(&values)
                .map_err(|p| self.arg_error(arg, &values[p.accepted], p.error))?;
            self.pos += taken;
            if let Some(at) = escape {
                // the escape was passed, so skip it and stop flag parsing
                if taken > at {
                    self.pos += 1;
                    self.can_flag = false;
                }
            }
            return Ok(());
        }

        if let Some(parser) = opt.as_value() {
            let token = &tokens[self.pos];
            parser
                .parse_value(token)
                .map_err(|cause| self.arg_error(arg, token, cause))?;
            self.pos += 1;
            return Ok(());
        }

        Err(Error::BrokenArg {
            command: self.path.clone(),
            arg: arg.describe(),
        })
    }

    fn arg_error(&self, arg: &Arg, value: &str, cause: ValueError) -> Error {
        Error::ArgParse {
            command: self.path.clone(),
            arg: arg.name().to_string(),
            value: value.to_string(),
            cause,
        }
    }

    fn finish(self) -> Result<ParseOutcome<'a>, Error> {
        let command = self.current();

        if self.show_help {
            if command.help_disabled() {
                return Err(Error::HelpDisabled { command: self.path });
            }
            return Ok(ParseOutcome::Help(self.selected()));
        }

        if let Some(missing) = command.args().get(self.slot..).filter(|m| !m.is_empty()) {
            return Err(Error::MissingArgs {
                command: self.path,
                args: missing.iter().map(Arg::describe).collect(),
            });
        }

        self.apply_defaults()?;
        Ok(ParseOutcome::Command(self.selected()))
    }

    /// Parse the declared default of every flag not given, from the
    /// selected command up to the root.
    fn apply_defaults(&self) -> Result<(), Error> {
        for (depth, command) in self.stack.iter().enumerate().rev() {
            for (index, flag) in command.flags().iter().enumerate() {
                let literal = match flag.default_literal() {
                    Some(literal) if !self.seen.contains_key(&(depth, index)) => literal,
                    _ => continue,
                };
                debug!(command = command.name(), flag = %flag.display_name(), literal, "applying default");
                flag.option()
                    .parse_default(literal)
                    .map_err(|cause| Error::FlagParse {
                        command: self.path.clone(),
                        flag: flag.display_name(),
                        cause,
                    })?;
            }
        }
        Ok(())
    }

    fn selected(self) -> Selected<'a> {
        Selected {
            commands: self.stack,
            path: self.path,
        }
    }
}

/// Put every flag and argument of `command` back to its unparsed value,
/// so nothing carries over from an earlier parse of the same tree.
fn reset_options(command: &Command) {
    for flag in command.flags() {
        flag.option().reset();
    }
    for arg in command.args() {
        arg.option().reset();
    }
}

/// Collect the longest run of `run` that `arg` accepts. A bare `--` ends
/// the checks: it is dropped and everything after it is taken as is.
///
/// Returns the values and the position of the dropped `--`, if any.
fn collect_run(arg: &Arg, run: &[String]) -> (Vec<String>, Option<usize>) {
    let mut values = Vec::new();
    for (i, token) in run.iter().enumerate() {
        if token == "--" {
            values.extend(run[i + 1..].iter().cloned());
            return (values, Some(i));
        }
        if !arg.can(token) {
            break;
        }
        values.push(token.clone());
    }
    (values, None)
}
