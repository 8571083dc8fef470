//! Um lote completo: CSV de entrada → orquestrador → relatório de status.

use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;

use tracing::info;

use crate::config::AppConfig;
use crate::csv_io::{read_items_from_path, report_name, write_report_to_path};
use crate::error::AppError;
use crate::item::{BatchSummary, Outcome, WorkItem};
use crate::limiter::ConcurrencyLimiter;
use crate::orchestrator::run_batch;

/// What a finished CSV batch produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub summary: BatchSummary,
    pub report_path: PathBuf,
}

/// Reads `config.input_dir/<filename>`, runs `transform` over every row with
/// `config.concurrency` slots and writes `config.output_dir/<stem>_status.csv`.
///
/// Only reading the input or writing the report can fail the run.
pub async fn generate_from_csv<F, Fut, T, E>(
    config: &AppConfig,
    filename: &str,
    transform: F,
) -> Result<BatchReport, AppError>
where
    F: Fn(WorkItem) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let limiter = ConcurrencyLimiter::new(config.concurrency)?;

    let input_path = config.input_dir.join(filename);
    let items = read_items_from_path(&input_path).await?;
    info!(input = %input_path.display(), items = items.len(), "loaded work items");

    let outcomes = run_batch(&items, transform, &limiter).await;

    let report_path = config.output_dir.join(report_name(filename));
    write_report_to_path(&report_path, &outcomes).await?;

    let summary = BatchSummary::from_outcomes(&outcomes);
    info!(
        report = %report_path.display(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "status report written"
    );

    Ok(BatchReport {
        outcomes,
        summary,
        report_path,
    })
}
