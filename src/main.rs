//! stagefile - A batch file manager with deferred copy and move.
//!
//! Usage:
//!   stf [DIR]                 Interactive shell, starting in DIR
//!   stf shell [DIR]           Same as above
//!   stf ls [DIR]              Print one directory listing
//!   stf --root PATH ...       Use PATH on the host as the store root
//!   stf --help                Show help

mod shell;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use stagefile_core::{OnConflict, SessionConfig};
use stagefile_ops::Session;
use stagefile_store::LocalStore;

use crate::shell::Shell;

#[derive(Parser)]
#[command(
    name = "stagefile",
    version,
    about = "A batch file manager with deferred copy and move",
    long_about = "stagefile browses a directory tree rooted at --root.\n\n\
                  Select items, mark them for copy or move, navigate anywhere \
                  and paste them into the directory you end up in."
)]
struct Cli {
    /// Host directory used as the store root
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// JSON session configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// What to do when a destination already exists
    #[arg(long, global = true)]
    on_conflict: Option<OnConflict>,

    /// Refuse to mark a new batch while one is pending
    #[arg(long, global = true)]
    strict: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory to start in, inside the store
    dir: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive shell
    Shell {
        /// Directory to start in
        dir: Option<String>,
    },

    /// Print a directory listing
    Ls {
        /// Directory to list
        #[arg(default_value = "/")]
        dir: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(on_conflict) = cli.on_conflict {
        config.on_conflict = on_conflict;
    }
    if cli.strict {
        config.reject_remark_while_pending = true;
    }

    let store = LocalStore::new(&cli.root)
        .with_context(|| format!("Cannot open store root {}", cli.root.display()))?;

    match cli.command {
        Some(Command::Ls { dir, format }) => {
            config.initial_directory = dir;
            run_ls(store, config, format)
        }
        Some(Command::Shell { dir }) => {
            if let Some(dir) = dir {
                config.initial_directory = dir;
            }
            run_shell(store, config)
        }
        None => {
            if let Some(dir) = cli.dir {
                config.initial_directory = dir;
            }
            run_shell(store, config)
        }
    }
}

/// Send tracing output to stderr, filtered by `RUST_LOG` or `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let config: SessionConfig = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn run_ls(store: LocalStore, config: SessionConfig, format: OutputFormat) -> Result<()> {
    let dir = config.initial_directory.clone();
    let session = Session::new(store, config).with_context(|| format!("Cannot list {dir}"))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(session.listing())?;
            println!("{}", json);
        }
        OutputFormat::Text => shell::print_listing(session.listing()),
    }
    Ok(())
}

fn run_shell(store: LocalStore, config: SessionConfig) -> Result<()> {
    let on_conflict = config.on_conflict;
    let dir = config.initial_directory.clone();
    let session = Session::new(store, config).with_context(|| format!("Cannot open {dir}"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot start runtime")?;

    let mut shell = Shell::new(session, runtime, on_conflict)?;
    shell.run()
}
