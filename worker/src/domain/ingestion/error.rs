//! Pipeline error taxonomy. Each variant belongs to exactly one stage.

use std::error::Error as _;
use std::fmt;

use thiserror::Error;

use crate::domain::ports::{
    ModelWriterError, ObjectSourceError, StagingStoreError, TransformerError,
};
use crate::domain::{DispatchError, RunFailure, RunStage, TabularError};

/// The transformation tool ran but did not exit with status zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformExitError {
    /// Exit status, `None` when killed by a signal.
    pub code: Option<i32>,
    /// Trailing standard error output.
    pub stderr_tail: String,
}

impl fmt::Display for TransformExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "transformation command exited with status {code}"),
            None => f.write_str("transformation command was terminated by a signal"),
        }
    }
}

impl std::error::Error for TransformExitError {}

/// Any failure that stops a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Fetching the object failed.
    #[error(transparent)]
    Fetch(#[from] ObjectSourceError),
    /// The payload is not usable CSV.
    #[error(transparent)]
    Parse(#[from] TabularError),
    /// Replacing the staging table failed.
    #[error(transparent)]
    Load(#[from] StagingStoreError),
    /// Writing the model file failed.
    #[error(transparent)]
    GenerateModel(#[from] ModelWriterError),
    /// The transformation tool could not be run.
    #[error(transparent)]
    Transform(#[from] TransformerError),
    /// The transformation tool reported failure.
    #[error(transparent)]
    TransformExit(#[from] TransformExitError),
    /// Sampling or posting the dispatch failed.
    #[error(transparent)]
    Notify(#[from] DispatchError),
}

impl PipelineError {
    /// Stage this error stops the run at.
    #[must_use]
    pub const fn stage(&self) -> RunStage {
        match self {
            Self::Fetch(_) => RunStage::Fetch,
            Self::Parse(_) | Self::Load(_) => RunStage::Load,
            Self::GenerateModel(_) => RunStage::GenerateModel,
            Self::Transform(_) | Self::TransformExit(_) => RunStage::RunTransform,
            Self::Notify(_) => RunStage::Notify,
        }
    }

    /// Render the stage, the error and its source chain, and any captured
    /// standard error.
    #[must_use]
    pub fn traceback(&self) -> String {
        let mut lines = vec![format!("stage: {}", self.stage()), format!("error: {self}")];
        let mut cause = self.source();
        while let Some(inner) = cause {
            lines.push(format!("caused by: {inner}"));
            cause = inner.source();
        }
        if let Self::TransformExit(exit) = self
            && !exit.stderr_tail.is_empty()
        {
            lines.push(format!("stderr:\n{}", exit.stderr_tail));
        }
        lines.join("\n")
    }
}

impl From<&PipelineError> for RunFailure {
    fn from(error: &PipelineError) -> Self {
        Self {
            stage: error.stage(),
            message: error.to_string(),
            traceback: error.traceback(),
        }
    }
}
