use crate::app_error::AppError;
use crate::jira::FilterApi;
use crate::models::{FilterPayload, FilterPolicy, ImportResult, ImportSummary, SheetRow};

/// Imports one row. Incomplete rows are skipped without reaching `api`.
pub fn import_row(api: &dyn FilterApi, policy: &FilterPolicy, row: &SheetRow) -> ImportResult {
    let record = match row.to_record() {
        Ok(record) => record,
        Err(reason) => {
            return ImportResult::Skipped {
                row_number: row.row_number,
                reason,
            }
        }
    };

    let payload = FilterPayload::new(record, policy);
    log::info!("Attempting to create filter: '{}'...", payload.name);
    match api.create_filter(&payload) {
        Ok(created) => ImportResult::Success(created),
        Err(reason) => ImportResult::Failure { reason },
    }
}

/// Runs every row through `api` in order and tallies the outcomes.
/// Per-row errors are reported and never stop the run.
pub fn run_import(api: &dyn FilterApi, policy: &FilterPolicy, rows: &[SheetRow]) -> ImportSummary {
    let mut summary = ImportSummary {
        total_rows: rows.len(),
        ..ImportSummary::default()
    };

    for row in rows {
        let result = import_row(api, policy, row);
        report(row, &result);
        summary.record(&result);
    }

    summary
}

fn report(row: &SheetRow, result: &ImportResult) {
    match result {
        ImportResult::Success(created) => {
            log::info!(
                "Successfully created filter '{}' (ID: {})",
                created.name,
                created.id
            );
            log::info!("View URL: {}", created.view_url);
        }
        ImportResult::Skipped { row_number, reason } => {
            log::warn!("Skipping row {row_number}: {reason}");
        }
        ImportResult::Failure { reason } => match reason {
            AppError::Http { status, body } => {
                log::error!(
                    "HTTP error creating filter '{}' (row {}): status {status}",
                    row.name,
                    row.row_number
                );
                log::error!("Response body: {body}");
            }
            other => {
                log::error!(
                    "Failed to create filter '{}' (row {}): {other}",
                    row.name,
                    row.row_number
                );
            }
        },
    }
}

pub fn render_summary(summary: &ImportSummary) -> String {
    format!(
        "--- Process Complete ---\n\
         Total filters processed from sheet: {}\n\
         Total filters successfully created in Jira: {}\n\
         Submitted: {}, failed requests: {}, skipped rows: {}",
        summary.total_rows, summary.created, summary.submitted, summary.failed, summary.skipped
    )
}
