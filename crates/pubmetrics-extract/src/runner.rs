//! Main runner for the metrics export

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pubmetrics_core::{ProgressContext, retry_with_backoff};
use rayon::prelude::*;

use crate::article::ArticleRecord;
use crate::config::ExportConfig;
use crate::error::ArticleError;
use crate::metrics::MetricsRecord;
use crate::report::ReportTable;
use crate::source::{ArticleCursor, ArticleSource};
use crate::worker::{self, Collaborators};

/// Export execution summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Articles of the requested publisher seen on the cursor
    pub matched: usize,
    /// Rows written to the table
    pub exported: usize,
    /// Articles dropped because their document was malformed
    pub skipped_malformed: usize,
    /// Whether the run stopped early on request. The rows are then a prefix
    /// of the matched articles.
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Rows plus what it took to produce them
#[derive(Debug)]
pub struct Export {
    pub table: ReportTable,
    pub summary: Summary,
}

/// Run the export for `config.publisher` over `source`.
///
/// Articles are pulled in batches and processed in parallel; rows keep cursor
/// order. `cancel` is checked between articles: once set, no further articles
/// start and the rows finished so far are returned.
pub fn run(
    config: &ExportConfig,
    source: &dyn ArticleSource,
    collaborators: Collaborators<'_>,
    cancel: &AtomicBool,
    progress: &ProgressContext,
) -> Result<Export> {
    let start = Instant::now();
    let publisher = &config.publisher;

    if !publisher.is_supported() {
        log::warn!("Publisher {publisher} is not supported, exporting base columns only");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("Failed to create thread pool")?;

    let mut cursor = retry_with_backoff("open article cursor", &config.retry, || {
        source.articles(&config.range)
    })
    .context("Failed to query article index")?;

    log::info!(
        "Exporting {publisher} articles with {} workers (batch {})",
        config.workers,
        config.batch_size
    );

    let pb = progress.article_bar(publisher.name());
    let mut table = ReportTable::new(publisher);
    let mut matched = 0;
    let mut skipped = 0;
    let mut cancelled = false;

    loop {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }

        let batch = next_batch(&mut cursor, config, cancel)?;
        if batch.is_empty() {
            break;
        }
        matched += batch.len();

        let results: Vec<_> = pool.install(|| {
            batch
                .par_iter()
                .map(|article| {
                    if cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    let result = worker::process_article(article, config, collaborators);
                    pb.inc(1);
                    Some(result)
                })
                .collect()
        });

        match collect_batch(&mut table, results) {
            Ok(outcome) => {
                skipped += outcome.skipped;
                cancelled = outcome.cancelled;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e).context("Export aborted");
            }
        }
        if cancelled {
            break;
        }
    }
    pb.finish_and_clear();

    let summary = Summary {
        matched,
        exported: table.len(),
        skipped_malformed: skipped,
        cancelled,
        elapsed: start.elapsed(),
    };
    log_summary(publisher.name(), &summary);

    Ok(Export { table, summary })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct BatchOutcome {
    skipped: usize,
    cancelled: bool,
}

/// Push one batch's rows in cursor order.
///
/// `None` marks an article that never started because of cancellation. Rows
/// after the first one are dropped even if they finished, so the table stays
/// a prefix of the cursor.
fn collect_batch(
    table: &mut ReportTable,
    results: Vec<Option<Result<MetricsRecord, ArticleError>>>,
) -> Result<BatchOutcome, ArticleError> {
    let mut outcome = BatchOutcome::default();

    for result in results {
        match result {
            Some(Ok(record)) => table.push(&record),
            Some(Err(e)) if !e.is_fatal() => {
                outcome.skipped += 1;
                log::warn!("Skipping {e}");
            }
            Some(Err(e)) => return Err(e),
            None => {
                outcome.cancelled = true;
                break;
            }
        }
    }

    Ok(outcome)
}

/// Pull up to `batch_size` articles of the configured publisher.
///
/// Cursor errors are not retried here: a half-consumed stream cannot be
/// resumed, so they end the run.
fn next_batch(
    cursor: &mut ArticleCursor<'_>,
    config: &ExportConfig,
    cancel: &AtomicBool,
) -> Result<Vec<ArticleRecord>> {
    let mut batch = Vec::with_capacity(config.batch_size);

    while batch.len() < config.batch_size.max(1) && !cancel.load(Ordering::Relaxed) {
        let Some(item) = cursor.next() else {
            break;
        };
        let article = item.context("Failed to read from article index")?;
        if article.publisher().as_ref() == Some(&config.publisher) {
            batch.push(article);
        } else {
            log::trace!("article {}: other publisher", article.id);
        }
    }

    Ok(batch)
}

fn log_summary(publisher: &str, summary: &Summary) {
    log::info!("=== {publisher} Export Summary ===");
    log::info!(
        "Articles: {} exported / {} matched ({} skipped as malformed)",
        summary.exported,
        summary.matched,
        summary.skipped_malformed
    );
    if summary.cancelled {
        log::warn!("Export was cancelled, the table is partial");
    }
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    if summary.exported > 0 {
        let rate = summary.exported as f64 / summary.elapsed.as_secs_f64();
        log::info!("Throughput: {:.0} articles/sec", rate);
    }
}
