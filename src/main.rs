//! Buildorder CLI - compile order for Ruby sources without `require`

mod commands;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "buildorder")]
#[command(version)]
#[command(about = "Static build ordering for Ruby sources")]
#[command(long_about = r#"
Buildorder works out which Ruby files must be compiled before which others
by matching the constants each file defines against the constants it uses.
No `require` statements are needed.

Example usage:
  buildorder order --path ./app
  buildorder graph --json
  buildorder cycle --from app/views/board_view.rb --to app/models/board.rb
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to <path>/buildorder.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root to analyze
    #[arg(short, long, global = true, default_value = ".")]
    path: PathBuf,

    /// Fail on syntax the scanner does not recognize
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the build order
    Order,

    /// Show the file dependency graph and link statistics
    Graph,

    /// List constants referenced but defined by no analyzed file
    Externals,

    /// Check whether a new dependency would introduce a cycle
    Cycle {
        /// File that would gain the dependency
        #[arg(long)]
        from: String,

        /// File it would depend on
        #[arg(long)]
        to: String,
    },

    /// Write a default buildorder.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }

    /// Human output with decorations (banners, progress, summaries)
    pub fn is_decorated(self) -> bool {
        self.is_human() && !buildorder::output::is_quiet()
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn emit_success<T: Serialize>(output_mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = Envelope { ok: true, command, data: Some(data), error: None };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

pub fn emit_failure<T: Serialize>(
    output_mode: OutputMode,
    command: &str,
    error: &str,
    data: Option<T>,
) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = Envelope { ok: false, command, data, error: Some(error.to_string()) };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

/// A failure already shown to the user; only the exit status is left
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Order => "order",
            Commands::Graph => "graph",
            Commands::Externals => "externals",
            Commands::Cycle { .. } => "cycle",
            Commands::Init { .. } => "init",
            Commands::Version => "version",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let command = cli.command.name();

    if let Err(e) = run(cli, output_mode) {
        if e.downcast_ref::<Reported>().is_none() {
            if output_mode.is_human() {
                buildorder::ui::error(&format!("{:#}", e));
            } else if let Err(emit) = emit_failure::<()>(output_mode, command, &format!("{:#}", e), None) {
                eprintln!("{}", emit);
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version => commands::run_version(output_mode),
        Commands::Init { force } => {
            let path = cli
                .config
                .unwrap_or_else(|| buildorder::config::default_config_path_in(&cli.path));
            commands::run_init(output_mode, &path, force)
        }
        command => {
            let ctx = commands::Context::load(&cli.path, cli.config.as_deref(), cli.strict, output_mode)?;
            match command {
                Commands::Order => commands::run_order(&ctx),
                Commands::Graph => commands::run_graph(&ctx),
                Commands::Externals => commands::run_externals(&ctx),
                Commands::Cycle { from, to } => commands::run_cycle(&ctx, &from, &to),
                Commands::Init { .. } | Commands::Version => Ok(()),
            }
        }
    }
}
