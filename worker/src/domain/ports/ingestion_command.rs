//! Driving port for full pipeline runs.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::TransformReport;
use crate::domain::{NotificationStatus, RunOutcome, RunReport, RunRequest, RunStatus};

/// Entry point inbound adapters use to execute a run.
///
/// Runs never fail at this boundary: stage failures are part of the
/// returned [`RunOutcome`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngestionCommand: Send + Sync {
    /// Execute every stage for `request`.
    async fn run(&self, request: RunRequest) -> RunOutcome;
}

/// Fixture reporting an immediate, empty success.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureIngestionCommand;

#[async_trait]
impl IngestionCommand for FixtureIngestionCommand {
    async fn run(&self, request: RunRequest) -> RunOutcome {
        RunOutcome {
            run_id: request.run_id,
            started_at: DateTime::<Utc>::UNIX_EPOCH,
            finished_at: DateTime::<Utc>::UNIX_EPOCH,
            status: RunStatus::Completed(RunReport {
                rows_loaded: 0,
                model_path: PathBuf::new(),
                transform: TransformReport::default(),
                notification: NotificationStatus::Skipped,
            }),
        }
    }
}
