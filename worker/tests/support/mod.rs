//! Shared helpers for the worker integration tests.

use std::sync::Arc;

use serde_json::{Value, json};
use worker::domain::ports::{
    FixtureModelWriter, FixtureObjectSource, FixtureStagingStore, FixtureTransformer,
    ModelWriter, Notifier, ObjectSource, StagingLoader, TableSampler, Transformer,
};
use worker::domain::{DispatchService, IngestionPolicy, IngestionPorts, IngestionService};

/// Three orders with a quoted header that needs cleaning.
pub const ORDERS_CSV: &str = "\"Name\",\"Sale Amount\"\nAda,10.50\nGrace,20\nLinus,\n";

/// Request body for `POST /run_full` against `dataset`.
pub fn run_full_body(dataset: &str, webhook_url: Option<&str>) -> Value {
    let mut body = json!({
        "runId": 42,
        "datasetName": dataset,
        "s3": {
            "endpoint": "http://127.0.0.1:9000",
            "bucket": "raw",
            "key": format!("{dataset}.csv"),
            "accessKey": "minio",
            "secretKey": "minio123"
        },
        "pg": {
            "host": "127.0.0.1",
            "port": 5432,
            "user": "relayboard",
            "password": "relayboard",
            "database": "warehouse"
        }
    });
    if let Some(url) = webhook_url {
        body["slack"] = json!({ "webhookUrl": url });
    }
    body
}

/// In-memory adapters shared between a service and the assertions.
pub struct FixturePorts {
    pub source: Arc<FixtureObjectSource>,
    pub warehouse: Arc<FixtureStagingStore>,
    pub models: Arc<FixtureModelWriter>,
}

impl FixturePorts {
    pub fn serving(csv: &str) -> Self {
        Self {
            source: Arc::new(FixtureObjectSource::new(csv.as_bytes().to_vec())),
            warehouse: Arc::new(FixtureStagingStore::default()),
            models: Arc::new(FixtureModelWriter::default()),
        }
    }

    /// Build an ingestion service that posts through `notifier`.
    pub fn ingestion_service(&self, notifier: Arc<dyn Notifier>) -> IngestionService {
        self.service_with(
            self.warehouse.clone(),
            self.warehouse.clone(),
            notifier,
            Arc::new(FixtureTransformer::default()),
        )
    }

    /// Build an ingestion service with explicit warehouse and transformer
    /// adapters.
    pub fn service_with(
        &self,
        staging: Arc<dyn StagingLoader>,
        sampler: Arc<dyn TableSampler>,
        notifier: Arc<dyn Notifier>,
        transformer: Arc<dyn Transformer>,
    ) -> IngestionService {
        let source: Arc<dyn ObjectSource> = self.source.clone();
        let models: Arc<dyn ModelWriter> = self.models.clone();
        IngestionService::new(
            IngestionPorts {
                source,
                staging,
                models,
                transformer,
                dispatcher: DispatchService::new(sampler, notifier, 5),
            },
            IngestionPolicy {
                project_dir: std::env::temp_dir(),
                tolerate_transform_failure: false,
            },
            Arc::new(mockable::DefaultClock),
        )
    }
}
