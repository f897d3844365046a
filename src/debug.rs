//! A plain-text report of what a command line parses to, for examples
//! and tests.

use crate::app::Application;
use crate::command::Command;
use crate::parser::ParseOutcome;
use std::fmt::Write as _;

impl Application {
    /// Parse `args` (without the program name) and describe the result:
    /// the arguments and any error, the selected command, then every flag
    /// and argument value from the selected command up to the root.
    pub fn debug(&self, args: &[&str]) -> String {
        let mut argv = vec![self.name().to_string()];
        argv.extend(args.iter().map(|a| a.to_string()));
        let shown = format!("[{}]", args.join(" "));

        let mut out = String::new();
        match self.parse(&argv) {
            Ok(ParseOutcome::Help(selected)) => {
                let _ = writeln!(out, "{}", shown);
                let _ = writeln!(out, "  cmd: {}.--help", selected.path());
            }
            Ok(ParseOutcome::Command(selected)) => {
                let _ = writeln!(out, "{}", shown);
                let _ = writeln!(out, "  cmd: {}", selected.path());
                let lineage: Vec<&Command> = selected.lineage().collect();
                write_values(&mut out, &lineage);
            }
            Err(err) => {
                let _ = writeln!(out, "{} err: {}", shown, err);
                if let Some(path) = err.command() {
                    let _ = writeln!(out, "  cmd: {}", path);
                    let mut lineage = self.resolve(path);
                    lineage.reverse();
                    write_values(&mut out, &lineage);
                }
            }
        }
        out
    }
}

/// Flag values, then argument values, each indented one step further per
/// ancestor.
fn write_values(out: &mut String, lineage: &[&Command]) {
    for (depth, command) in lineage.iter().enumerate() {
        let indent = "  ".repeat(depth + 1);
        for flag in command.flags() {
            let _ = writeln!(out, "{}flag: {}", indent, flag.option().debug());
        }
    }
    for (depth, command) in lineage.iter().enumerate() {
        let indent = "  ".repeat(depth + 1);
        for arg in command.args() {
            let _ = writeln!(out, "{}arg: {}", indent, arg.option().debug());
        }
    }
}
