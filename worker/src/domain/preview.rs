//! Preview of a CSV object: header mapping and the first rows.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::ports::{ObjectSource, PreviewError, PreviewOutcome, PreviewQuery};
use super::{CsvTable, PreviewRequest, StagingSchema};

/// Fetches and parses objects without touching the warehouse.
#[derive(Clone)]
pub struct PreviewService {
    source: Arc<dyn ObjectSource>,
}

impl PreviewService {
    /// Create a preview service reading from `source`.
    #[must_use]
    pub const fn new(source: Arc<dyn ObjectSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl PreviewQuery for PreviewService {
    async fn preview(&self, request: PreviewRequest) -> Result<PreviewOutcome, PreviewError> {
        let payload = self.source.fetch(&request.source).await?;
        let table = CsvTable::parse(&payload)?;
        let columns = StagingSchema::from_header(table.header()).columns().to_vec();
        let total_rows = table.rows().len();
        let rows = table
            .into_rows()
            .into_iter()
            .take(request.limit.get())
            .collect();
        info!(key = request.source.key(), total_rows, "object previewed");
        Ok(PreviewOutcome {
            columns,
            total_rows,
            rows,
        })
    }
}
