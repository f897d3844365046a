//! Sourceable shell scripts for a parsed command line: variable exports,
//! a help heredoc, or an error report.

use crate::app::Application;
use crate::command::CommandPath;
use crate::config::{Bindings, Rendered};
use crate::help::help_text;
use crate::parser::ParseOutcome;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Heredoc delimiter for help output.
const HELP_DELIMITER: &str = "CMDRUN_HELP";
/// Name of the variable holding the selected command, after the prefix.
const COMMAND_VAR: &str = "COMMAND";

/// Escape a string for safe use in a shell double-quoted context.
fn escape_shell_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '$' => escaped.push_str("\\$"),
            '`' => escaped.push_str("\\`"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Convert a flag or argument name to a valid shell variable name.
///
/// Converts to uppercase and replaces anything that is not a letter,
/// digit or underscore with an underscore.
fn to_shell_var_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Script for the selected command: its dotted name and every value
/// declared on the path from the root to it.
///
/// Lists become bash arrays, which cannot be exported.
pub fn generate_output_string(bindings: &Bindings, path: &CommandPath, prefix: &str) -> String {
    let mut output = format!(
        "export {}{}=\"{}\"\n",
        prefix,
        COMMAND_VAR,
        escape_shell_value(&path.command_name())
    );

    for binding in bindings.on_path(path) {
        let var_name = format!("{}{}", prefix, to_shell_var_name(&binding.name));
        match binding.value.render() {
            Rendered::Scalar(value) => {
                output.push_str(&format!(
                    "export {}=\"{}\"\n",
                    var_name,
                    escape_shell_value(&value)
                ));
            }
            Rendered::List(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|v| format!("\"{}\"", escape_shell_value(v)))
                    .collect();
                output.push_str(&format!("{}=({})\n", var_name, items.join(" ")));
            }
        }
    }

    output
}

/// Script that prints the error to stderr and exits 1.
pub fn generate_error_string(program: &str, message: &str) -> String {
    format!(
        "echo \"{}: error: {}\" >&2\nexit 1\n",
        escape_shell_value(program),
        escape_shell_value(message)
    )
}

/// Script that prints the help text and exits 0.
pub fn generate_help_output_string(help_text: &str) -> String {
    format!(
        "cat <<'{delimiter}'\n{text}{delimiter}\nexit 0\n",
        delimiter = HELP_DELIMITER,
        text = help_text
    )
}

/// Parse `args` (without the program name) and produce the matching
/// script: exports, help, or an error report.
///
/// A selected command that only groups subcommands is reported as
/// missing a command.
pub fn script_for(app: &Application, bindings: &Bindings, prefix: &str, args: &[String]) -> String {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(app.name().to_string());
    argv.extend_from_slice(args);

    let outcome = app.parse(&argv).and_then(|outcome| {
        if let ParseOutcome::Command(selected) = &outcome {
            selected.ensure_complete()?;
        }
        Ok(outcome)
    });

    match outcome {
        Ok(ParseOutcome::Help(selected)) => {
            generate_help_output_string(&help_text(app, selected.path()))
        }
        Ok(ParseOutcome::Command(selected)) => {
            generate_output_string(bindings, selected.path(), prefix)
        }
        Err(err) => generate_error_string(app.name(), &err.to_string()),
    }
}

/// Write content to a temporary file and return its path.
///
/// The file persists until it is deleted.
pub fn write_temp_file(content: &str) -> Result<PathBuf> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let path = file.into_temp_path().keep()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const TOOL: &str = r#"{
        "name": "tool",
        "flags": [
            {"name": "dry-run", "short": "n", "type": "switch"}
        ],
        "commands": [
            {
                "name": "copy",
                "flags": [{"name": "mode", "type": "option", "default": "0644"}],
                "args": [
                    {"name": "src", "variadic": false},
                    {"name": "dest", "variadic": true}
                ]
            },
            {"name": "group", "commands": [{"name": "leaf"}]}
        ]
    }"#;

    fn build() -> (Application, Bindings) {
        Config::from_json(TOOL).unwrap().build().unwrap()
    }

    fn script(args: &[&str]) -> String {
        let (app, bindings) = build();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        script_for(&app, &bindings, "T_", &args)
    }

    #[test]
    fn test_exports_selected_path() {
        let output = script(&["-n", "copy", "a b", "x", "$y"]);
        assert_eq!(
            output,
            "export T_COMMAND=\"copy\"\n\
             export T_DRY_RUN=\"true\"\n\
             export T_MODE=\"0644\"\n\
             export T_SRC=\"a b\"\n\
             T_DEST=(\"x\" \"\\$y\")\n"
        );
    }

    #[test]
    fn test_root_command_is_empty() {
        let (app, bindings) = build();
        let argv = vec!["tool".to_string(), "-n".to_string()];
        let outcome = app.parse(&argv).unwrap();
        let output = generate_output_string(&bindings, outcome.selected().path(), "T_");
        assert_eq!(output, "export T_COMMAND=\"\"\nexport T_DRY_RUN=\"true\"\n");

        assert_eq!(
            script(&[]),
            "echo \"tool: error: expected <command>\" >&2\nexit 1\n"
        );
    }

    #[test]
    fn test_help_request_produces_heredoc() {
        let output = script(&["copy", "--help"]);
        assert!(output.starts_with("cat <<'CMDRUN_HELP'\nUsage: tool copy"));
        assert!(output.ends_with("CMDRUN_HELP\nexit 0\n"));
    }

    #[test]
    fn test_errors_produce_error_script() {
        let output = script(&["--bogus"]);
        assert_eq!(
            output,
            "echo \"tool: error: unexpected flag: --bogus\" >&2\nexit 1\n"
        );

        let output = script(&["group"]);
        assert_eq!(
            output,
            "echo \"tool: error: group: expected <command>\" >&2\nexit 1\n"
        );
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_shell_value("$HOME"), "\\$HOME");
        assert_eq!(escape_shell_value("`whoami`"), "\\`whoami\\`");
        assert_eq!(escape_shell_value("C:\\Users"), "C:\\\\Users");
        assert_eq!(escape_shell_value("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_shell_value("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_shell_value("hello!"), "hello!");
    }

    #[test]
    fn test_shell_var_names() {
        assert_eq!(to_shell_var_name("my-option"), "MY_OPTION");
        assert_eq!(to_shell_var_name("a.b"), "A_B");
        assert_eq!(to_shell_var_name("v2"), "V2");
    }

    #[test]
    fn test_error_string_escapes_message() {
        let output = generate_error_string("app", "bad value: $HOME `test`");
        assert_eq!(
            output,
            "echo \"app: error: bad value: \\$HOME \\`test\\`\" >&2\nexit 1\n"
        );
    }

    #[test]
    fn test_write_temp_file_keeps_script() {
        let path = write_temp_file(&script(&["copy", "a", "b"])).unwrap();
        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("export T_COMMAND=\"copy\"\n"));
        assert!(contents.contains("export T_DRY_RUN=\"false\""));
        std::fs::remove_file(path).unwrap();

        let path = write_temp_file(&generate_help_output_string("test help text\n")).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "cat <<'CMDRUN_HELP'\ntest help text\nCMDRUN_HELP\nexit 0\n");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reparse_does_not_leak_between_scripts() {
        let (app, bindings) = build();
        let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let first = script_for(&app, &bindings, "T_", &args(&["-n", "copy", "a", "x", "y"]));
        assert!(first.contains("export T_DRY_RUN=\"true\""));

        let second = script_for(&app, &bindings, "T_", &args(&["copy", "b", "z"]));
        assert_eq!(
            second,
            "export T_COMMAND=\"copy\"\n\
             export T_DRY_RUN=\"false\"\n\
             export T_MODE=\"0644\"\n\
             export T_SRC=\"b\"\n\
             T_DEST=(\"z\")\n"
        );
    }
}
