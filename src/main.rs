mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stablecal_core::ExportConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stablecal")]
#[command(about = "Export event records to a deterministic, byte-stable iCalendar feed")]
struct Cli {
    /// Config file to use instead of ~/.config/stablecal/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export event records (JSON array or JSON Lines) to an .ics file
    Export {
        /// Records file, "-" or omitted for stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output .ics file, "-" for stdout (defaults to `output` from config, then stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Calendar title (X-WR-CALNAME)
        #[arg(long)]
        calendar_name: Option<String>,

        /// Product identifier (PRODID)
        #[arg(long)]
        product_id: Option<String>,
    },
    /// Print the UID derived for each url
    Uid {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Check that an .ics file parses and is in canonical order
    Check {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            input,
            output,
            calendar_name,
            product_id,
        } => {
            if let Some(name) = calendar_name {
                config.calendar_name = name;
            }
            if let Some(id) = product_id {
                config.product_id = id;
            }
            let output = output.or_else(|| config.output_path());
            commands::export::run(config, input.as_deref(), output.as_deref())
        }
        Commands::Uid { urls } => commands::uid::run(&config, &urls),
        Commands::Check { file } => commands::check::run(&file),
    }
}

/// Logs go to stderr so stdout can carry the calendar itself.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    debug!(path = ?path, "Loading config");

    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            ExportConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => ExportConfig::load().context("Failed to load config"),
    }
}
