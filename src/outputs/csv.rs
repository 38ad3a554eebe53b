//! CSV summary of one run.
//!
//! The header depends on the mode. One row follows per identifier whose record
//! has every field the mode requires, in ascending id order. Fields containing
//! a comma, quote or line break are quoted.

use crate::models::{ArticleId, ArticleRecord, Mode, SentimentReport};
use crate::utils::ensure_writable_dir;
use itertools::Itertools;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// What happened to the summary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// A new file was written with this many data rows.
    Written { rows: usize },
    /// The file already existed and was left untouched.
    Skipped,
}

/// Quote a field if it would otherwise break the row.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render the summary text and count its data rows.
pub fn render_summary(
    mode: Mode,
    report: SentimentReport,
    records: &[(ArticleId, ArticleRecord)],
) -> (String, usize) {
    let mut out = String::new();
    writeln!(out, "{}", mode.header().join(",")).unwrap();

    let mut rows = 0;
    for (id, record) in records {
        let Some(fields) = record.row_fields(report) else {
            continue;
        };
        let line = std::iter::once(id.to_string())
            .chain(fields.iter().map(|f| csv_field(f).into_owned()))
            .join(",");
        writeln!(out, "{line}").unwrap();
        rows += 1;
    }
    (out, rows)
}

/// Write the summary to `path` unless a file is already there.
#[instrument(level = "info", skip_all, fields(path = %path.display(), %mode))]
pub async fn write_summary(
    path: &Path,
    mode: Mode,
    report: SentimentReport,
    records: &[(ArticleId, ArticleRecord)],
) -> Result<SummaryOutcome, Box<dyn Error>> {
    if fs::try_exists(path).await? {
        info!("Summary already exists; leaving it untouched");
        return Ok(SummaryOutcome::Skipped);
    }
    if let Some(dir) = path.parent() {
        ensure_writable_dir(dir).await?;
    }

    let (csv, rows) = render_summary(mode, report, records);
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(csv.as_bytes()).await?;
    file.flush().await?;
    info!(rows, "Wrote summary");
    Ok(SummaryOutcome::Written { rows })
}
