//! CSV report of the documents a run failed on.
//!
//! One row per record, no header: source collection, document id, record
//! kind, error text, scope, env.

use std::path::{Path, PathBuf};

use opsync_core::sync_record::SyncRecord;

use crate::action::Action;
use crate::error::PipelineError;

/// `{dir}/{action}_{unix_seconds}.csv`.
pub fn report_path(dir: &Path, action: Action, unix_seconds: i64) -> PathBuf {
    dir.join(format!("{}_{}.csv", action.as_str(), unix_seconds))
}

/// Write `records` to a new report in `dir`. Nothing is written when there
/// are no records.
pub fn write_report(
    dir: &Path,
    action: Action,
    records: &[SyncRecord],
) -> Result<Option<PathBuf>, PipelineError> {
    if records.is_empty() {
        return Ok(None);
    }

    let path = report_path(dir, action, chrono::Utc::now().timestamp());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "failure report written");
    Ok(Some(path))
}
