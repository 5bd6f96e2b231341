mod api;
mod config;
mod inspect;
mod report;
mod server;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use tracelens_logging::{init_tracing, LogFormat};

use crate::config::{Config, ServeOverrides};

#[derive(Parser, Debug)]
#[command(
    name = "tracelens",
    about = "Live viewer for instrumented program traces",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to tracelens.toml (default: ./tracelens.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter, e.g. "debug" or "tracelens=trace" (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Also append JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accept traces over HTTP and stream them to viewers
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep-alive interval for live streams, e.g. "15s"
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        keepalive: Option<Duration>,

        /// Open the viewer in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Print the step outline of a saved trace
    Outline {
        /// Trace payload (JSON object or bare entry array)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the graphs found in a saved trace as JSON
    Graph {
        /// Trace payload (JSON object or bare entry array)
        file: PathBuf,

        /// Only inspect this entry
        #[arg(short, long)]
        entry: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let (mut config, source) = Config::load(cli.config.as_deref(), &working_dir)?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.map(LogFormat::from).unwrap_or(config.log.format);
    let log_file = cli.log_file.clone().or_else(|| config.log.file.clone());
    let _log_guard = init_tracing(&level, format, log_file.as_deref())
        .context("Failed to initialize logging")?;

    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            keepalive,
            open,
        } => {
            config.apply(ServeOverrides {
                host,
                port,
                keepalive,
                open,
            });
            server::handle_serve_command(&config).await
        }
        Command::Outline { file, json } => report::handle_outline_command(&file, json),
        Command::Graph { file, entry } => report::handle_graph_command(&file, entry),
    }
}
