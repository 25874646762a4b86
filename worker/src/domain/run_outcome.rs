//! Results of a pipeline run as seen by callers.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::QualifiedTable;
use super::ports::TransformReport;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    /// Reading the CSV object.
    Fetch,
    /// Parsing and loading the staging table.
    Load,
    /// Writing the generated model file.
    GenerateModel,
    /// Running the transformation tool.
    RunTransform,
    /// Sampling and posting the dispatch.
    Notify,
}

impl RunStage {
    /// Wire name of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Load => "load",
            Self::GenerateModel => "generate_model",
            Self::RunTransform => "run_transform",
            Self::Notify => "notify",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the run's dispatch was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// No webhook was configured.
    Skipped,
    /// The dispatch was posted with rows from `table`.
    Sent {
        /// Table the sample was read from.
        table: QualifiedTable,
    },
}

impl NotificationStatus {
    /// Whether a message went out.
    #[must_use]
    pub const fn was_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Rows written to the staging table.
    pub rows_loaded: u64,
    /// Location of the generated model.
    pub model_path: PathBuf,
    /// Captured transformation output.
    pub transform: TransformReport,
    /// Dispatch result.
    pub notification: NotificationStatus,
}

/// Where and why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// Stage that failed; later stages did not run.
    pub stage: RunStage,
    /// Error message of the failure.
    pub message: String,
    /// Stage, error chain and any captured standard error.
    pub traceback: String,
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every stage finished.
    Completed(RunReport),
    /// A stage failed.
    Failed(RunFailure),
}

/// A finished run with its timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Caller's run identifier.
    pub run_id: i64,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub finished_at: DateTime<Utc>,
    /// How it ended.
    pub status: RunStatus,
}

impl RunOutcome {
    /// Whether every stage finished.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(RunStage::Fetch, "fetch")]
    #[case(RunStage::Load, "load")]
    #[case(RunStage::GenerateModel, "generate_model")]
    #[case(RunStage::RunTransform, "run_transform")]
    #[case(RunStage::Notify, "notify")]
    fn display_matches_serialised_name(#[case] stage: RunStage, #[case] expected: &str) {
        assert_eq!(stage.to_string(), expected);
        assert_eq!(
            serde_json::to_value(stage).expect("json"),
            serde_json::Value::from(expected)
        );
    }
}
