//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised without any infrastructure.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureIngestionCommand, FixturePreviewQuery, IngestionCommand, PreviewQuery,
};

/// Driving ports available to HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Full pipeline runs.
    pub ingestion: Arc<dyn IngestionCommand>,
    /// Object previews.
    pub preview: Arc<dyn PreviewQuery>,
}

impl HttpState {
    /// Bundle the ports.
    #[must_use]
    pub const fn new(ingestion: Arc<dyn IngestionCommand>, preview: Arc<dyn PreviewQuery>) -> Self {
        Self { ingestion, preview }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureIngestionCommand), Arc::new(FixturePreviewQuery))
    }
}
