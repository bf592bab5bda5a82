//! Export subcommand - one CSV report per publisher and date range

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use pubmetrics_core::{SharedProgress, fmt_num, shutdown_flag};
use pubmetrics_extract::{Collaborators, DateRange, ExportConfig, Publisher, Summary};

use super::parse_date;
use crate::config::Config;
use crate::store::{JsonRepository, JsonlArticleSource, open_file_store};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Publisher tag as written in the article index (APS, Hindawi, Springer, OUP, Elsevier)
    #[arg(short, long)]
    pub publisher: String,

    /// First publication date to include (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last publication date to include (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Article index dump (JSON Lines, optionally .gz)
    #[arg(short, long)]
    pub articles: PathBuf,

    /// Article files: directory or http(s) base URL (default: [storage].files)
    #[arg(short, long)]
    pub files: Option<String>,

    /// Repository author/affiliation JSON (default: [storage].repository)
    #[arg(short, long)]
    pub repository: Option<PathBuf>,

    /// Output CSV (default: <output.default_dir>/<publisher>_<start>_<end>.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Articles per parallel batch
    #[arg(long)]
    pub batch_size: Option<usize>,
}

pub fn run(args: ExportArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let publisher = Publisher::from_name(&args.publisher);

    let files_location = args
        .files
        .clone()
        .or_else(|| config.storage.files.clone())
        .context("No article file store configured (use --files or [storage].files)")?;
    let files = open_file_store(&files_location, config.http.timeout())?;

    let repository_path = args.repository.as_deref().or(config.storage.repository.as_deref());
    let repository = JsonRepository::load(repository_path)?;

    let source = JsonlArticleSource::new(&args.articles);

    let export_config = ExportConfig {
        publisher,
        range: DateRange::new(args.start, args.end),
        workers: args.workers.unwrap_or(config.export.workers).max(1),
        batch_size: args.batch_size.unwrap_or(config.export.batch_size).max(1),
        retry: config.http.retry_policy(),
        storage_marker: config.storage.marker.clone(),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config.output.default_dir, &export_config));

    let collaborators = Collaborators {
        files: files.as_ref(),
        repository: &repository,
    };
    let export = pubmetrics_extract::run(
        &export_config,
        &source,
        collaborators,
        shutdown_flag(),
        progress,
    )?;

    export.table.write_csv_file(&output)?;
    log::info!("Wrote {} rows to {}", export.table.len(), output.display());

    print_summary(&export_config.publisher, &export.summary, &output);
    Ok(())
}

fn default_output(dir: &Path, config: &ExportConfig) -> PathBuf {
    let bound = |d: Option<NaiveDate>| d.map_or_else(|| "open".to_string(), |d| d.to_string());
    dir.join(format!(
        "{}_{}_{}.csv",
        config.publisher.name().to_lowercase(),
        bound(config.range.start),
        bound(config.range.end)
    ))
}

fn print_summary(publisher: &Publisher, summary: &Summary, output: &Path) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(format!("{publisher} export")).fg(Color::Cyan),
            Cell::new("").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Matched articles", &fmt_num(summary.matched)]);
    table.add_row(vec!["Exported rows", &fmt_num(summary.exported)]);
    table.add_row(vec![
        "Skipped (malformed XML)",
        &fmt_num(summary.skipped_malformed),
    ]);
    table.add_row(vec![
        "Status",
        if summary.cancelled {
            "cancelled (partial)"
        } else {
            "complete"
        },
    ]);
    table.add_row(vec![
        "Time",
        &format!("{:.1}s", summary.elapsed.as_secs_f64()),
    ]);
    table.add_row(vec!["Output", &output.display().to_string()]);

    eprintln!("\n{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_names_publisher_and_bounds() {
        let mut config = ExportConfig::new(Publisher::Elsevier);
        config.range = DateRange::parse(Some("2024-10-01"), Some("2024-12-31")).unwrap();
        assert_eq!(
            default_output(Path::new("reports"), &config),
            PathBuf::from("reports/elsevier_2024-10-01_2024-12-31.csv")
        );

        config.range = DateRange::default();
        assert_eq!(
            default_output(Path::new("reports"), &config),
            PathBuf::from("reports/elsevier_open_open.csv")
        );
    }
}
