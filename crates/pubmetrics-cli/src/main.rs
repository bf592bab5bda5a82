//! pubmetrics - per-article metrics reports from publisher XML
//!
//! Reads an article index dump, resolves each article's stored XML and writes
//! one CSV row per article with author, affiliation and dataset metrics.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pubmetrics_core::shutdown_flag;

mod cmd;
mod config;
mod store;

use config::Config;

#[derive(Parser)]
#[command(name = "pubmetrics")]
#[command(about = "Per-article author, affiliation and dataset metrics from publisher XML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./pubmetrics.toml or ~/.config/pubmetrics/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Per-request timeout in seconds for HTTP file fetches
    #[arg(long, global = true)]
    fetch_timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Export the metrics report for one publisher and date range
    Export(cmd::export::ExportArgs),
    /// Parse one local XML file and show what was extracted
    Inspect(cmd::inspect::InspectArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(pubmetrics_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the spinner shows activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    pubmetrics_core::init_logging(quiet, cli.debug, multi).context("Failed to initialize logging")?;

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // CLI overrides config file
    if let Some(timeout) = cli.fetch_timeout {
        config.http.fetch_timeout = timeout;
    }
    if let Some(retries) = cli.max_retries {
        config.http.max_retries = retries;
    }

    match cli.command {
        Command::Export(args) => {
            setup_signal_handler()?;
            cmd::export::run(args, &config, &progress)
        }
        Command::Inspect(args) => cmd::inspect::run(args),
        Command::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn setup_signal_handler() -> Result<()> {
    // First signal: stop pulling articles and write the partial report
    // Second signal: force exit
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    for signal in [signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT] {
        unsafe {
            signal_hook::low_level::register(signal, || {
                if shutdown_flag().swap(true, Ordering::Relaxed) {
                    std::process::exit(130);
                }
            })
        }
        .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }
    Ok(())
}

fn print_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Output directory",
        &config.output.default_dir.display().to_string(),
    ]);
    table.add_row(vec!["Workers", &config.export.workers.to_string()]);
    table.add_row(vec!["Batch size", &config.export.batch_size.to_string()]);
    table.add_row(vec![
        "Article files",
        config.storage.files.as_deref().unwrap_or("not set"),
    ]);
    table.add_row(vec![
        "Repository file",
        &config
            .storage
            .repository
            .as_ref()
            .map_or_else(|| "not set".to_string(), |p| p.display().to_string()),
    ]);
    table.add_row(vec!["Storage marker", &config.storage.marker]);
    table.add_row(vec![
        "Fetch timeout",
        &format!("{}s", config.http.fetch_timeout),
    ]);
    table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);
    table.add_row(vec!["Backoff", &format!("{}ms", config.http.backoff_ms)]);

    eprintln!("\n{table}");
}
