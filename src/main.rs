//! cmdrun - drive a command tree defined in JSON from shell scripts.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cmdrun::config::Config;
use cmdrun::help::help_text;
use cmdrun::output::{script_for, write_temp_file};
use cmdrun::CommandPath;
use tracing_subscriber::EnvFilter;

/// Multi-command argument parsing for shell scripts.
#[derive(Parser, Debug)]
#[command(name = "cmdrun", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse script arguments and write a file to source
    Parse {
        /// JSON command tree for the target script
        #[arg(long)]
        config: String,

        /// Variable name prefix (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Arguments to parse for the target script
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help for the target script or one of its commands
    Help {
        /// JSON command tree for the target script
        #[arg(long)]
        config: String,

        /// Subcommand names leading to the command to describe
        #[arg(last = true)]
        path: Vec<String>,
    },

    /// Print what a command line parses to
    Debug {
        /// JSON command tree for the target script
        #[arg(long)]
        config: String,

        /// Arguments to parse for the target script
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn load_config(json: &str) -> Result<Config> {
    let cfg = Config::from_json(json).context("failed to parse config JSON")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            config,
            prefix,
            args,
        } => {
            let cfg = load_config(&config)?;
            let (app, bindings) = cfg.build().context("failed to build command tree")?;

            // CLI prefix takes precedence over config prefix
            let effective_prefix = prefix.as_deref().unwrap_or_else(|| cfg.effective_prefix());

            let script = script_for(&app, &bindings, effective_prefix, &args);
            let path = write_temp_file(&script).context("failed to generate output file")?;
            println!("{}", path.display());
        }
        Commands::Help { config, path } => {
            let cfg = load_config(&config)?;
            let (app, _) = cfg.build().context("failed to build command tree")?;

            let mut target = CommandPath::root(app.name());
            for name in &path {
                target = target.child(name);
            }
            if app.find(&target).is_none() {
                bail!("unknown command: {}", target.command_name());
            }
            print!("{}", help_text(&app, &target));
        }
        Commands::Debug { config, args } => {
            let cfg = load_config(&config)?;
            let (app, _) = cfg.build().context("failed to build command tree")?;
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            print!("{}", app.debug(&args));
        }
    }

    Ok(())
}
