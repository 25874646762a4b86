//! Driving port for previewing a CSV object without loading it.

use async_trait::async_trait;
use thiserror::Error;

use super::ObjectSourceError;
use crate::domain::{PreviewRequest, Row, StagingColumn, TabularError};

/// Header mapping and leading rows of a CSV object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOutcome {
    /// Header cells with the identifiers a load would use.
    pub columns: Vec<StagingColumn>,
    /// Number of data rows in the whole object.
    pub total_rows: usize,
    /// The first rows, up to the requested limit.
    pub rows: Vec<Row>,
}

/// Reasons a preview could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// The object could not be fetched.
    #[error(transparent)]
    Fetch(#[from] ObjectSourceError),
    /// The object is not usable CSV.
    #[error(transparent)]
    Parse(#[from] TabularError),
}

/// Entry point for previews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreviewQuery: Send + Sync {
    /// Fetch and parse the object named by `request`.
    async fn preview(&self, request: PreviewRequest) -> Result<PreviewOutcome, PreviewError>;
}

/// Fixture returning an empty preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePreviewQuery;

#[async_trait]
impl PreviewQuery for FixturePreviewQuery {
    async fn preview(&self, _request: PreviewRequest) -> Result<PreviewOutcome, PreviewError> {
        Ok(PreviewOutcome {
            columns: Vec::new(),
            total_rows: 0,
            rows: Vec::new(),
        })
    }
}
