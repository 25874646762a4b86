//! Post-run dispatch: sample the freshest table and post a summary.
//!
//! The transformed warehouse table is preferred. When it cannot be read (the
//! transformation failed, or has not materialised it yet) the staging table is
//! sampled instead so the message still shows what was loaded.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::ports::{Notifier, NotifierError, StagingStoreError, TableSampler};
use super::{DatabaseTarget, DatasetName, QualifiedTable, WebhookUrl};

/// Default number of rows included in a dispatch.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;
/// Longest rendering of a single value, in characters.
pub const MAX_VALUE_CHARS: usize = 32;
/// Rendering of SQL NULL.
pub const NULL_TEXT: &str = "NULL";

const TITLE: &str = "*Relayboard Dispatch*";
const FENCE: &str = "```";

/// Rows read back from a warehouse table, every value as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSample {
    /// Table the rows were read from.
    pub table: QualifiedTable,
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Row values; `None` is SQL NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Failure to compose or deliver a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Neither the transformed nor the staging table could be sampled.
    #[error(transparent)]
    Sample(#[from] StagingStoreError),
    /// The webhook rejected or never received the message.
    #[error(transparent)]
    Deliver(#[from] NotifierError),
}

fn truncate(value: &str) -> String {
    value.chars().take(MAX_VALUE_CHARS).collect()
}

/// Render the chat message for a run.
///
/// # Examples
/// ```
/// use worker::domain::{DatasetName, QualifiedTable, RowSample, format_dispatch};
///
/// let dataset = DatasetName::new("orders").expect("valid");
/// let sample = RowSample {
///     table: QualifiedTable::staging(&dataset),
///     columns: vec!["id".into(), "note".into()],
///     rows: vec![vec![Some("1".into()), None]],
/// };
/// let text = format_dispatch(7, &dataset, &sample);
/// assert!(text.contains("Run: 7 (orders)"));
/// assert!(text.contains("id=1, note=NULL"));
/// ```
#[must_use]
pub fn format_dispatch(run_id: i64, dataset: &DatasetName, sample: &RowSample) -> String {
    let mut lines = vec![
        TITLE.to_owned(),
        format!("Run: {run_id} ({dataset})"),
        format!("Table: `{}`", sample.table),
        format!("Rows: {}", sample.rows.len()),
        FENCE.to_owned(),
    ];
    lines.extend(sample.rows.iter().map(|row| {
        sample
            .columns
            .iter()
            .zip(row)
            .map(|(column, value)| {
                let text = value.as_deref().map_or_else(|| NULL_TEXT.to_owned(), truncate);
                format!("{column}={text}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }));
    lines.push(FENCE.to_owned());
    lines.join("\n")
}

/// Message composed for one run, before delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchMessage {
    /// Table the sample came from.
    pub table: QualifiedTable,
    /// Rendered message text.
    pub text: String,
}

/// Samples result tables and posts run summaries to a webhook.
#[derive(Clone)]
pub struct DispatchService {
    sampler: Arc<dyn TableSampler>,
    notifier: Arc<dyn Notifier>,
    sample_rows: usize,
}

impl DispatchService {
    /// Create a dispatcher sampling up to `sample_rows` rows per message.
    #[must_use]
    pub const fn new(
        sampler: Arc<dyn TableSampler>,
        notifier: Arc<dyn Notifier>,
        sample_rows: usize,
    ) -> Self {
        Self {
            sampler,
            notifier,
            sample_rows,
        }
    }

    /// Sample the transformed table, falling back to staging, and render the
    /// message.
    ///
    /// # Errors
    /// Returns the staging sampler error when both tables are unreadable.
    pub async fn compose(
        &self,
        run_id: i64,
        dataset: &DatasetName,
        database: &DatabaseTarget,
    ) -> Result<DispatchMessage, StagingStoreError> {
        let transformed = QualifiedTable::transformed(dataset);
        let sample = match self
            .sampler
            .sample(database, &transformed, self.sample_rows)
            .await
        {
            Ok(sample) => sample,
            Err(error) => {
                warn!(table = %transformed, %error, "transformed table unreadable; sampling staging");
                self.sampler
                    .sample(database, &QualifiedTable::staging(dataset), self.sample_rows)
                    .await?
            }
        };
        let text = format_dispatch(run_id, dataset, &sample);
        Ok(DispatchMessage {
            table: sample.table,
            text,
        })
    }

    /// Compose and post the message for a run.
    ///
    /// # Errors
    /// Returns [`DispatchError`] when sampling or delivery fails.
    pub async fn dispatch(
        &self,
        run_id: i64,
        dataset: &DatasetName,
        database: &DatabaseTarget,
        webhook: &WebhookUrl,
    ) -> Result<QualifiedTable, DispatchError> {
        let message = self.compose(run_id, dataset, database).await?;
        self.notifier.post_text(webhook, &message.text).await?;
        info!(table = %message.table, "dispatch delivered");
        Ok(message.table)
    }
}
