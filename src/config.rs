//! JSON definition of a command tree, used to drive the parser from shell
//! scripts.

use crate::app::Application;
use crate::command::{Arg, Command, CommandPath, Flag};
use crate::flag_only::{accumulator, enabler, toggler, FlagOnly};
use crate::opt::{self, Opt, Single};
use crate::opts::{self, Multi};
use serde::Deserialize;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// Prefix of exported variable names when the config sets none.
pub const DEFAULT_PREFIX: &str = "CMDRUN_";

/// Errors that can occur while reading, checking or building a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("duplicate name in command '{0}': {1}")]
    DuplicateName(String, String),

    #[error("duplicate subcommand name: {0}")]
    DuplicateCommandName(String),

    #[error("invalid short option '{0}': must be a single ASCII letter or digit")]
    InvalidShortOption(String),

    #[error("'choices' on '{0}' is empty: must have at least one valid value")]
    EmptyChoices(String),

    #[error("'choices' on '{0}' has duplicate value: {1}")]
    DuplicateChoice(String, String),

    #[error("'choices' on '{0}' requires a string or file value_type")]
    ChoicesNeedStrings(String),

    #[error("'choices' cannot be used with a value-less flag '{0}'")]
    ChoicesOnFlag(String),

    #[error("'value_type' cannot be used with a value-less flag '{0}'")]
    ValueTypeOnFlag(String),

    #[error("'multiple' cannot be used with a value-less flag '{0}'")]
    MultipleOnFlag(String),

    #[error("variadic argument '{0}' must be the last argument")]
    VariadicNotLast(String),

    #[error("invalid command tree: {0}")]
    Build(#[from] crate::Error),
}

/// How a flag behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    /// `true` once given; giving it twice is an error
    Switch,
    /// Flips between `false` and `true` each time it is given
    Toggle,
    /// Counts how many times it is given
    Count,
    /// Takes a value (`--name value` or `--name=value`)
    Option,
}

/// Type a value is converted to and checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Any string value (default, no validation)
    #[default]
    String,
    /// A string that may also be `-`
    File,
    /// Signed 64-bit integer, with `0x`/`0o`/`0b` prefixes
    Int,
    /// Unsigned 64-bit integer
    Uint,
    /// 64-bit float
    Float,
    /// Strict `true` or `false`
    Bool,
}

/// Configuration for a single flag.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagConfig {
    /// The name of the flag (used for the variable name)
    pub name: String,
    /// Short option character (e.g., 'v' for -v)
    pub short: Option<char>,
    /// Long option name (e.g., "verbose" for --verbose)
    pub long: Option<String>,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    /// Option flags only: may be given more than once, collecting values
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub value_type: ValueType,
    pub choices: Option<Vec<String>>,
    /// Literal parsed when the flag is not given
    pub default: Option<String>,
    /// Placeholder for the value in help, e.g. "<file>"
    pub hint: Option<String>,
    pub help: Option<String>,
}

impl FlagConfig {
    /// The long name, falling back to the flag name when there is no
    /// short name either.
    pub fn effective_long(&self) -> Option<&str> {
        match (&self.long, self.short) {
            (Some(long), _) => Some(long),
            (None, None) => Some(&self.name),
            (None, Some(_)) => None,
        }
    }
}

/// Configuration for a positional argument.
#[derive(Debug, Clone, Deserialize)]
pub struct ArgConfig {
    pub name: String,
    #[serde(default)]
    pub value_type: ValueType,
    pub choices: Option<Vec<String>>,
    /// Collects all remaining values; only the last argument may be variadic
    #[serde(default)]
    pub variadic: bool,
    pub help: Option<String>,
}

/// Configuration for a command and, recursively, its subcommands.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub details: Option<String>,
    /// Don't offer -h/--help for this command
    #[serde(default)]
    pub no_help: bool,
    /// Don't list this command in its parent's help
    #[serde(default)]
    pub unlisted: bool,
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
    #[serde(default)]
    pub args: Vec<ArgConfig>,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// Top-level configuration: the root command plus output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub root: CommandConfig,
    /// Variable name prefix (default: "CMDRUN_")
    pub prefix: Option<String>,
    #[serde(default)]
    pub group_short_flags: bool,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_command(&self.root)
    }

    /// Get the effective prefix, using the default if none is set.
    pub fn effective_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// Build the command tree, returning it with handles to every value.
    pub fn build(&self) -> Result<(Application, Bindings), ConfigError> {
        let mut bindings = Vec::new();
        let root = build_command(&self.root, &[], &mut bindings)?;
        let mut app = Application::from(root);
        app.allow_group_short_flags(self.group_short_flags);
        Ok((app, Bindings(bindings)))
    }
}

fn validate_command(command: &CommandConfig) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for flag in &command.flags {
        if !names.insert(flag.name.as_str()) {
            return Err(ConfigError::DuplicateName(
                command.name.clone(),
                flag.name.clone(),
            ));
        }
        validate_flag(flag)?;
    }

    for (i, arg) in command.args.iter().enumerate() {
        if !names.insert(arg.name.as_str()) {
            return Err(ConfigError::DuplicateName(
                command.name.clone(),
                arg.name.clone(),
            ));
        }
        if arg.variadic && i + 1 != command.args.len() {
            return Err(ConfigError::VariadicNotLast(arg.name.clone()));
        }
        validate_choices(&arg.name, arg.choices.as_deref(), arg.value_type)?;
    }

    let mut subcommands = HashSet::new();
    for sub in &command.commands {
        if !subcommands.insert(sub.name.as_str()) {
            return Err(ConfigError::DuplicateCommandName(sub.name.clone()));
        }
        validate_command(sub)?;
    }

    Ok(())
}

fn validate_flag(flag: &FlagConfig) -> Result<(), ConfigError> {
    if let Some(short) = flag.short {
        if !short.is_ascii_alphanumeric() {
            return Err(ConfigError::InvalidShortOption(short.to_string()));
        }
    }

    if flag.flag_type != FlagType::Option {
        if flag.choices.is_some() {
            return Err(ConfigError::ChoicesOnFlag(flag.name.clone()));
        }
        if flag.value_type != ValueType::String {
            return Err(ConfigError::ValueTypeOnFlag(flag.name.clone()));
        }
        if flag.multiple {
            return Err(ConfigError::MultipleOnFlag(flag.name.clone()));
        }
    }

    validate_choices(&flag.name, flag.choices.as_deref(), flag.value_type)
}

fn validate_choices(
    name: &str,
    choices: Option<&[String]>,
    value_type: ValueType,
) -> Result<(), ConfigError> {
    let choices = match choices {
        Some(choices) => choices,
        None => return Ok(()),
    };

    if !matches!(value_type, ValueType::String | ValueType::File) {
        return Err(ConfigError::ChoicesNeedStrings(name.to_string()));
    }
    if choices.is_empty() {
        return Err(ConfigError::EmptyChoices(name.to_string()));
    }
    let mut seen = HashSet::new();
    for choice in choices {
        if !seen.insert(choice) {
            return Err(ConfigError::DuplicateChoice(
                name.to_string(),
                choice.clone(),
            ));
        }
    }
    Ok(())
}

fn build_command(
    config: &CommandConfig,
    parent: &[String],
    bindings: &mut Vec<Binding>,
) -> Result<Command, ConfigError> {
    let mut path = parent.to_vec();
    path.push(config.name.clone());

    let mut command = Command::new(&config.name, &config.description);
    if config.no_help {
        command = command.no_help();
    }
    if config.unlisted {
        command = command.unlisted();
    }
    if let Some(details) = &config.details {
        command.set_details(details)?;
    }

    let mut flags = Vec::with_capacity(config.flags.len());
    for flag_config in &config.flags {
        let value = BoundValue::for_flag(flag_config);
        let mut flag = Flag::new(
            value.opt(),
            flag_config.short,
            flag_config.effective_long().map(str::to_string),
        );
        if let Some(literal) = &flag_config.default {
            flag = flag.default(literal);
        }
        if let Some(hint) = &flag_config.hint {
            flag = flag.hint(hint);
        }
        flags.push(flag);
        bindings.push(Binding {
            path: path.clone(),
            name: flag_config.name.clone(),
            value,
        });
    }
    if !flags.is_empty() {
        command.set_flags(flags)?;
    }

    let mut args = Vec::with_capacity(config.args.len());
    for arg_config in &config.args {
        let help = arg_config.help.as_deref().unwrap_or_default();
        let choices = arg_config.choices.as_deref();
        let value = if arg_config.variadic {
            BoundValue::multi(&arg_config.name, help, arg_config.value_type, choices)
        } else {
            BoundValue::single(&arg_config.name, help, arg_config.value_type, choices)
        };
        args.push(Arg::new(value.opt(), &arg_config.name, arg_config.variadic));
        bindings.push(Binding {
            path: path.clone(),
            name: arg_config.name.clone(),
            value,
        });
    }
    if !args.is_empty() {
        command.set_args(args)?;
    }

    if !config.commands.is_empty() {
        let mut commands = Vec::with_capacity(config.commands.len());
        for sub in &config.commands {
            commands.push(build_command(sub, &path, bindings)?);
        }
        command.set_commands(commands)?;
    }

    Ok(command)
}

/// A typed handle to a value filled by parsing.
#[derive(Clone)]
pub enum BoundValue {
    Text(Single<String>),
    Int(Single<i64>),
    Uint(Single<u64>),
    Float(Single<f64>),
    Bool(Single<bool>),
    Texts(Multi<String>),
    Ints(Multi<i64>),
    Uints(Multi<u64>),
    Floats(Multi<f64>),
    Bools(Multi<bool>),
    Switch(FlagOnly<bool>),
    Count(FlagOnly<u64>),
}

/// A bound value as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Scalar(String),
    List(Vec<String>),
}

fn choice_names(choices: &[String]) -> Vec<&str> {
    choices.iter().map(String::as_str).collect()
}

fn strings<T: ToString>(values: Vec<T>) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl BoundValue {
    fn for_flag(config: &FlagConfig) -> Self {
        let help = config.help.as_deref().unwrap_or_default();
        let name = config.name.as_str();
        match config.flag_type {
            FlagType::Switch => BoundValue::Switch(enabler(name, help, false, true)),
            FlagType::Toggle => BoundValue::Switch(toggler(name, help, false, true)),
            FlagType::Count => BoundValue::Count(accumulator(name, help, 0, 1)),
            FlagType::Option if config.multiple => {
                Self::multi(name, help, config.value_type, config.choices.as_deref())
            }
            FlagType::Option => Self::single(name, help, config.value_type, config.choices.as_deref()),
        }
    }

    fn single(name: &str, help: &str, value_type: ValueType, choices: Option<&[String]>) -> Self {
        match (value_type, choices) {
            (ValueType::String | ValueType::File, Some(choices)) => {
                BoundValue::Text(opt::string_of(name, help, &choice_names(choices)))
            }
            (ValueType::String, None) => BoundValue::Text(opt::string(name, help)),
            (ValueType::File, None) => BoundValue::Text(opt::file(name, help)),
            (ValueType::Int, _) => BoundValue::Int(opt::int(name, help, 0)),
            (ValueType::Uint, _) => BoundValue::Uint(opt::int(name, help, 0)),
            (ValueType::Float, _) => BoundValue::Float(opt::float(name, help)),
            (ValueType::Bool, _) => BoundValue::Bool(opt::boolean(name, help)),
        }
    }

    fn multi(name: &str, help: &str, value_type: ValueType, choices: Option<&[String]>) -> Self {
        match (value_type, choices) {
            (ValueType::String | ValueType::File, Some(choices)) => {
                BoundValue::Texts(opts::string_slice_of(name, help, &choice_names(choices)))
            }
            (ValueType::String, None) => BoundValue::Texts(opts::string_slice(name, help)),
            (ValueType::File, None) => BoundValue::Texts(opts::file_slice(name, help)),
            (ValueType::Int, _) => BoundValue::Ints(opts::int_slice(name, help, 0)),
            (ValueType::Uint, _) => BoundValue::Uints(opts::int_slice(name, help, 0)),
            (ValueType::Float, _) => BoundValue::Floats(opts::float_slice(name, help)),
            (ValueType::Bool, _) => BoundValue::Bools(opts::bool_slice(name, help)),
        }
    }

    fn opt(&self) -> Rc<dyn Opt> {
        match self {
            BoundValue::Text(v) => v.as_opt(),
            BoundValue::Int(v) => v.as_opt(),
            BoundValue::Uint(v) => v.as_opt(),
            BoundValue::Float(v) => v.as_opt(),
            BoundValue::Bool(v) => v.as_opt(),
            BoundValue::Texts(v) => v.as_opt(),
            BoundValue::Ints(v) => v.as_opt(),
            BoundValue::Uints(v) => v.as_opt(),
            BoundValue::Floats(v) => v.as_opt(),
            BoundValue::Bools(v) => v.as_opt(),
            BoundValue::Switch(v) => v.as_opt(),
            BoundValue::Count(v) => v.as_opt(),
        }
    }

    /// The current value as text.
    pub fn render(&self) -> Rendered {
        match self {
            BoundValue::Text(v) => Rendered::Scalar(v.value()),
            BoundValue::Int(v) => Rendered::Scalar(v.value().to_string()),
            BoundValue::Uint(v) => Rendered::Scalar(v.value().to_string()),
            BoundValue::Float(v) => Rendered::Scalar(v.value().to_string()),
            BoundValue::Bool(v) => Rendered::Scalar(v.value().to_string()),
            BoundValue::Texts(v) => Rendered::List(v.values()),
            BoundValue::Ints(v) => Rendered::List(strings(v.values())),
            BoundValue::Uints(v) => Rendered::List(strings(v.values())),
            BoundValue::Floats(v) => Rendered::List(strings(v.values())),
            BoundValue::Bools(v) => Rendered::List(strings(v.values())),
            BoundValue::Switch(v) => Rendered::Scalar(v.value().to_string()),
            BoundValue::Count(v) => Rendered::Scalar(v.value().to_string()),
        }
    }
}

/// A value and the command that declares it.
#[derive(Clone)]
pub struct Binding {
    /// Command names from the root to the declaring command.
    pub path: Vec<String>,
    pub name: String,
    pub value: BoundValue,
}

/// Every value declared by a config, in declaration order.
#[derive(Clone, Default)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.0.iter()
    }

    /// Bindings declared by the selected command or one of its ancestors.
    pub fn on_path<'b>(&'b self, path: &'b CommandPath) -> impl Iterator<Item = &'b Binding> + 'b {
        self.0
            .iter()
            .filter(move |b| path.segments().starts_with(&b.path))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOutcome;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn value_of(bindings: &Bindings, name: &str) -> Rendered {
        bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.value.render())
            .unwrap_or_else(|| panic!("no binding named {}", name))
    }

    const GIT: &str = r#"{
        "name": "git",
        "description": "A tiny git",
        "prefix": "GIT_",
        "flags": [
            {"name": "verbose", "short": "v", "type": "count", "help": "More output"}
        ],
        "commands": [
            {
                "name": "commit",
                "description": "Record changes",
                "flags": [
                    {"name": "message", "short": "m", "long": "message", "type": "option", "hint": "<msg>"},
                    {"name": "amend", "type": "switch"}
                ],
                "args": [
                    {"name": "paths", "value_type": "file", "variadic": true}
                ]
            },
            {
                "name": "log",
                "flags": [
                    {"name": "max", "short": "n", "type": "option", "value_type": "uint", "default": "10"},
                    {"name": "format", "type": "option", "choices": ["short", "full"], "default": "short"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_json(GIT).unwrap();
        assert_eq!(config.root.name, "git");
        assert_eq!(config.root.description, "A tiny git");
        assert_eq!(config.effective_prefix(), "GIT_");
        assert_eq!(config.root.flags[0].flag_type, FlagType::Count);
        assert_eq!(config.root.commands.len(), 2);

        let commit = &config.root.commands[0];
        assert_eq!(commit.flags[0].hint.as_deref(), Some("<msg>"));
        assert_eq!(commit.flags[1].effective_long(), Some("amend"));
        assert!(commit.args[0].variadic);
        assert_eq!(commit.args[0].value_type, ValueType::File);

        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json(r#"{"name": "minimal"}"#).unwrap();
        assert_eq!(config.root.name, "minimal");
        assert!(config.root.description.is_empty());
        assert!(config.prefix.is_none());
        assert!(!config.group_short_flags);
        assert!(config.root.flags.is_empty());
        assert_eq!(config.effective_prefix(), DEFAULT_PREFIX);
        config.validate().unwrap();
    }

    #[test]
    fn test_error_on_malformed_json() {
        let result = Config::from_json(r#"{"name": "x", "flags": [{"name": "f"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_error_on_duplicate_names() {
        let config = Config::from_json(
            r#"{"name": "test",
                "flags": [{"name": "dup", "short": "a", "type": "switch"}],
                "args": [{"name": "dup"}]}"#,
        )
        .unwrap();
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::DuplicateName(_, name)) if name == "dup"));
    }

    #[test]
    fn test_error_on_duplicate_subcommands() {
        let config = Config::from_json(
            r#"{"name": "test", "commands": [{"name": "a"}, {"name": "a"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCommandName(name)) if name == "a"
        ));
    }

    #[test]
    fn test_error_on_invalid_short_option() {
        let config = Config::from_json(
            r#"{"name": "test", "flags": [{"name": "bad", "short": "-", "type": "switch"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidShortOption(_))
        ));
    }

    #[test]
    fn test_error_on_choices_misuse() {
        let on_switch = Config::from_json(
            r#"{"name": "t", "flags": [{"name": "s", "type": "switch", "choices": ["a"]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            on_switch.validate(),
            Err(ConfigError::ChoicesOnFlag(_))
        ));

        let empty = Config::from_json(
            r#"{"name": "t", "args": [{"name": "a", "choices": []}]}"#,
        )
        .unwrap();
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyChoices(_))));

        let duplicated = Config::from_json(
            r#"{"name": "t", "args": [{"name": "a", "choices": ["x", "x"]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            duplicated.validate(),
            Err(ConfigError::DuplicateChoice(_, choice)) if choice == "x"
        ));

        let numeric = Config::from_json(
            r#"{"name": "t", "args": [{"name": "a", "value_type": "int", "choices": ["1"]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            numeric.validate(),
            Err(ConfigError::ChoicesNeedStrings(_))
        ));
    }

    #[test]
    fn test_error_on_value_options_for_switch() {
        let typed = Config::from_json(
            r#"{"name": "t", "flags": [{"name": "s", "type": "toggle", "value_type": "int"}]}"#,
        )
        .unwrap();
        assert!(matches!(typed.validate(), Err(ConfigError::ValueTypeOnFlag(_))));

        let multiple = Config::from_json(
            r#"{"name": "t", "flags": [{"name": "s", "type": "count", "multiple": true}]}"#,
        )
        .unwrap();
        assert!(matches!(
            multiple.validate(),
            Err(ConfigError::MultipleOnFlag(_))
        ));
    }

    #[test]
    fn test_error_on_variadic_not_last() {
        let config = Config::from_json(
            r#"{"name": "t", "args": [{"name": "a", "variadic": true}, {"name": "b"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::VariadicNotLast(name)) if name == "a"
        ));
    }

    #[test]
    fn test_build_reports_duplicate_short_names() {
        let config = Config::from_json(
            r#"{"name": "t", "flags": [
                {"name": "a", "short": "x", "type": "switch"},
                {"name": "b", "short": "x", "type": "switch"}
            ]}"#,
        )
        .unwrap();
        config.validate().unwrap();
        let err = config.build().err().unwrap();
        assert!(matches!(err, ConfigError::Build(crate::Error::DuplicateFlag { .. })));
    }

    #[test]
    fn test_build_and_parse() {
        let config = Config::from_json(GIT).unwrap();
        let (app, bindings) = config.build().unwrap();
        assert_eq!(bindings.len(), 6);

        let argv = args(&["git", "-v", "commit", "-m", "fix", "--amend", "a.txt", "-"]);
        let outcome = app.parse(&argv).unwrap();
        assert!(!outcome.is_help());
        assert_eq!(outcome.selected().path().name(), "git.commit");

        assert_eq!(value_of(&bindings, "verbose"), Rendered::Scalar("1".to_string()));
        assert_eq!(value_of(&bindings, "message"), Rendered::Scalar("fix".to_string()));
        assert_eq!(value_of(&bindings, "amend"), Rendered::Scalar("true".to_string()));
        assert_eq!(
            value_of(&bindings, "paths"),
            Rendered::List(vec!["a.txt".to_string(), "-".to_string()])
        );

        let on_path: Vec<&str> = bindings
            .on_path(outcome.selected().path())
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(on_path, vec!["verbose", "message", "amend", "paths"]);
    }

    #[test]
    fn test_build_applies_defaults_and_choices() {
        let config = Config::from_json(GIT).unwrap();
        let (app, bindings) = config.build().unwrap();

        let outcome = app.parse(&args(&["git", "log"])).unwrap();
        assert!(matches!(outcome, ParseOutcome::Command(_)));
        assert_eq!(value_of(&bindings, "max"), Rendered::Scalar("10".to_string()));
        assert_eq!(value_of(&bindings, "format"), Rendered::Scalar("short".to_string()));

        let err = app
            .parse(&args(&["git", "log", "--format", "long"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"log: --format: "long" not one of "short", "full""#
        );
    }

    #[test]
    fn test_group_short_flags_setting() {
        let config = Config::from_json(
            r#"{"name": "t", "group_short_flags": true, "flags": [
                {"name": "a", "short": "a", "type": "switch"},
                {"name": "b", "short": "b", "type": "count"}
            ]}"#,
        )
        .unwrap();
        let (app, bindings) = config.build().unwrap();
        assert!(app.groups_short_flags());
        app.parse(&args(&["t", "-abb"])).unwrap();
        assert_eq!(value_of(&bindings, "a"), Rendered::Scalar("true".to_string()));
        assert_eq!(value_of(&bindings, "b"), Rendered::Scalar("2".to_string()));
    }
}
