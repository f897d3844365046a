//! Help text for a command: usage line, description, and tables of
//! arguments, flags and subcommands.

use crate::app::Application;
use crate::command::{Command, CommandPath};
use std::io::{self, Write};

const HELP_FLAG: &str = "-h, --help";
const HELP_DESC: &str = "Show context-sensitive help.";

/// Two-column section. The first column is padded to the longest entry,
/// clamped to `min..=max`; longer entries put the description on a new line.
struct Table {
    name: &'static str,
    items: Vec<(String, String)>,
    min: usize,
    max: usize,
    pad: usize,
}

impl Table {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
            min: 6,
            max: 12,
            pad: 3,
        }
    }

    fn add(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.items.push((left.into(), right.into()));
    }

    fn write(&self, w: &mut dyn Write) -> io::Result<()> {
        let longest = self
            .items
            .iter()
            .map(|(left, _)| left.chars().count())
            .fold(self.min, usize::max)
            .min(self.max);
        let width = longest + self.pad;

        writeln!(w)?;
        writeln!(w, "{}", self.name)?;
        for (left, right) in &self.items {
            if left.chars().count() > longest {
                writeln!(w, "  {}", left)?;
                writeln!(w, "  {:width$} {}", "", right, width = width)?;
            } else {
                writeln!(w, "  {:<width$} {}", left, right, width = width)?;
            }
        }
        Ok(())
    }
}

/// Write usage information for `command`, found at `path` in `app`.
pub fn write_usage(
    w: &mut dyn Write,
    app: &Application,
    command: &Command,
    path: &CommandPath,
) -> io::Result<()> {
    let is_root = path.is_root();

    let mut usage = vec!["Usage:".to_string(), app.name().to_string()];
    if !is_root {
        usage.push(path.command_name());
    }
    if !command.commands().is_empty() {
        usage.push("<command>".to_string());
    }
    if !command.flags().is_empty() || (is_root && !command.commands().is_empty()) {
        usage.push("[flags]".to_string());
    }
    usage.extend(command.args().iter().map(|arg| arg.describe()));
    writeln!(w, "{}", usage.join(" "))?;

    if !command.description().is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", command.description())?;
    }
    if let Some(detail) = command.details().filter(|d| !d.is_empty()) {
        writeln!(w)?;
        writeln!(w, "{}", detail.trim_end())?;
    }

    if !command.args().is_empty() {
        let mut args = Table::new("Arguments:");
        for arg in command.args() {
            args.add(arg.describe(), arg.option().description());
        }
        args.write(w)?;
    }

    if !command.flags().is_empty() || !command.help_disabled() {
        // align long-only flags with the long names of flags that have both
        let indent_long = !app.help_disabled()
            || command
                .flags()
                .iter()
                .any(|f| f.short_name().is_some() && f.long_name().is_some());

        let mut flags = Table::new("Flags:");
        flags.max = 22;
        if !command.help_disabled() {
            flags.add(HELP_FLAG, HELP_DESC);
        }
        for flag in command.flags() {
            let mut name = flag.describe();
            if indent_long && flag.short_name().is_none() {
                name.insert_str(0, "    ");
            }
            if let Some(literal) = flag.default_literal() {
                name.push('=');
                name.push_str(literal);
            } else if let Some(hint) = flag.hint_text() {
                name.push('=');
                name.push_str(hint);
            }
            flags.add(name, flag.option().description());
        }
        flags.write(w)?;
    }

    if !command.commands().is_empty() {
        let mut commands = Table::new("Commands:");
        for sub in command.commands().iter().filter(|c| !c.is_unlisted()) {
            commands.add(sub.name(), sub.description());
        }
        commands.write(w)?;
        writeln!(w)?;
        writeln!(
            w,
            "Run \"{} <command> --help\" for more information on a command.",
            app.name()
        )?;
    }

    Ok(())
}

/// Help for the command at `path`, as a string.
pub fn help_text(app: &Application, path: &CommandPath) -> String {
    let mut out = Vec::new();
    // writing into a Vec cannot fail
    let _ = app.write_help(&mut out, path);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag_only::enabler;
    use crate::opt::{file, string};

    fn demo() -> Application {
        let mut app = Application::new("app", "Demo app.");
        app.set_flags(vec![
            enabler("verbose", "Be loud", false, true).flags('v', "verbose"),
            string("name", "Name").flag().default("x"),
        ])
        .unwrap();
        app.set_args(vec![file("file", "Input file").pos("file")]).unwrap();
        app
    }

    #[test]
    fn test_root_help_layout() {
        let app = demo();
        let text = help_text(&app, &CommandPath::root("app"));
        assert_eq!(
            text,
            "Usage: app [flags] <file>\n\
             \n\
             Demo app.\n\
             \n\
             Arguments:\n  \
             <file>    Input file\n\
             \n\
             Flags:\n  \
             -h, --help       Show context-sensitive help.\n  \
             -v, --verbose    Be loud\n      \
             --name=x     Name\n"
        );
    }

    #[test]
    fn test_commands_table_and_footer() {
        let mut app = Application::new("tool", "");
        app.set_commands(vec![
            Command::new("add", "Add things"),
            Command::new("remove-everything-now", "Wipe"),
            Command::new("secret", "Hidden").unlisted(),
        ])
        .unwrap();
        let text = help_text(&app, &CommandPath::root("tool"));
        assert_eq!(
            text,
            "Usage: tool <command> [flags]\n\
             \n\
             Flags:\n  \
             -h, --help    Show context-sensitive help.\n\
             \n\
             Commands:\n  \
             add             Add things\n  \
             remove-everything-now\n                  \
             Wipe\n\
             \n\
             Run \"tool <command> --help\" for more information on a command.\n"
        );
    }

    #[test]
    fn test_subcommand_usage_and_details() {
        let mut app = Application::new("git", "");
        app.set_commands(vec![Command::new("commit", "Record changes")
            .with_details("Longer text.\n")
            .unwrap()
            .with_args(vec![string("msg", "Message").pos("msg")])
            .unwrap()
            .no_help()])
        .unwrap();
        let text = help_text(&app, &CommandPath::root("git").child("commit"));
        assert_eq!(
            text,
            "Usage: git commit <msg>\n\
             \n\
             Record changes\n\
             \n\
             Longer text.\n\
             \n\
             Arguments:\n  \
             <msg>     Message\n"
        );
    }

    #[test]
    fn test_hint_shown_without_default() {
        let mut app = Application::from(Command::new("app", "").no_help());
        app.set_flags(vec![string("out", "Output").flag().hint("<file>")])
            .unwrap();
        let text = help_text(&app, &CommandPath::root("app"));
        assert_eq!(text, "Usage: app [flags]\n\nFlags:\n  --out=<file>    Output\n");
    }
}
