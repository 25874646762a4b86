//! Pipeline orchestration.
//!
//! A run moves through Fetch, Load, GenerateModel, RunTransform and Notify
//! in order. The first failure ends the run; earlier effects are left in
//! place. Every run executes inside a `run` span carrying its id and dataset.

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use sha2::{Digest, Sha256};
use tracing::{Instrument, error, info, info_span, warn};

pub use error::{PipelineError, TransformExitError};

use super::ports::{
    IngestionCommand, ModelWriter, ObjectSource, StagingLoad, StagingLoader, Transformer, tail,
};
use super::{
    CsvTable, DispatchService, GeneratedModel, NotificationStatus, QualifiedTable, RunFailure,
    RunOutcome, RunReport, RunRequest, RunStage, RunStatus, StagingSchema,
};

/// Characters of transformation output kept in logs and failure traces.
const OUTPUT_TAIL_CHARS: usize = 500;

/// Driven ports used by [`IngestionService`].
#[derive(Clone)]
pub struct IngestionPorts {
    /// Object storage reader.
    pub source: Arc<dyn ObjectSource>,
    /// Staging table writer.
    pub staging: Arc<dyn StagingLoader>,
    /// Generated model sink.
    pub models: Arc<dyn ModelWriter>,
    /// Transformation tool runner.
    pub transformer: Arc<dyn Transformer>,
    /// Sampling and webhook delivery.
    pub dispatcher: DispatchService,
}

/// Run-independent settings for [`IngestionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionPolicy {
    /// Transformation project root; the tool runs with this as its working
    /// directory.
    pub project_dir: PathBuf,
    /// Treat a non-zero transformation exit as success.
    pub tolerate_transform_failure: bool,
}

/// Executes full pipeline runs.
#[derive(Clone)]
pub struct IngestionService {
    ports: IngestionPorts,
    policy: IngestionPolicy,
    clock: Arc<dyn Clock>,
}

impl IngestionService {
    /// Assemble the service.
    #[must_use]
    pub const fn new(ports: IngestionPorts, policy: IngestionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            policy,
            clock,
        }
    }

    async fn execute(&self, request: &RunRequest) -> Result<RunReport, PipelineError> {
        info!(stage = %RunStage::Fetch, key = request.source.key(), "stage started");
        let payload = self.ports.source.fetch(&request.source).await?;
        info!(
            bytes = payload.len(),
            sha256 = %hex::encode(Sha256::digest(&payload)),
            "object fetched"
        );

        info!(stage = %RunStage::Load, "stage started");
        let parsed = CsvTable::parse(&payload)?;
        drop(payload);
        let schema = StagingSchema::from_header(parsed.header());
        let staging_table = QualifiedTable::staging(&request.dataset);
        let load = StagingLoad {
            table: staging_table.clone(),
            schema: schema.clone(),
            rows: parsed.into_rows(),
        };
        let rows_loaded = self
            .ports
            .staging
            .replace_table(&request.database, load)
            .await?;
        info!(table = %staging_table, rows = rows_loaded, columns = schema.len(), "staging table replaced");

        info!(stage = %RunStage::GenerateModel, "stage started");
        let model = GeneratedModel::render(&request.dataset, &schema);
        let model_path = self.ports.models.write(&model).await?;
        info!(path = %model_path.display(), "model written");

        info!(stage = %RunStage::RunTransform, "stage started");
        let transform = self.ports.transformer.run(&self.policy.project_dir).await?;
        if transform.succeeded() {
            info!(exit_code = ?transform.exit_code, "transformation finished");
        } else if self.policy.tolerate_transform_failure {
            warn!(
                exit_code = ?transform.exit_code,
                stderr = tail(&transform.stderr, OUTPUT_TAIL_CHARS),
                "transformation failed; continuing"
            );
        } else {
            return Err(TransformExitError {
                code: transform.exit_code,
                stderr_tail: tail(&transform.stderr, OUTPUT_TAIL_CHARS).to_owned(),
            }
            .into());
        }

        let notification = match &request.webhook {
            Some(webhook) => {
                info!(stage = %RunStage::Notify, "stage started");
                let table = self
                    .ports
                    .dispatcher
                    .dispatch(request.run_id, &request.dataset, &request.database, webhook)
                    .await?;
                NotificationStatus::Sent { table }
            }
            None => {
                info!(stage = %RunStage::Notify, "no webhook configured; dispatch skipped");
                NotificationStatus::Skipped
            }
        };

        Ok(RunReport {
            rows_loaded,
            model_path,
            transform,
            notification,
        })
    }
}

#[async_trait]
impl IngestionCommand for IngestionService {
    async fn run(&self, request: RunRequest) -> RunOutcome {
        let span = info_span!("run", run_id = request.run_id, dataset = %request.dataset);
        async {
            let started_at = self.clock.utc();
            let status = match self.execute(&request).await {
                Ok(report) => {
                    info!(
                        rows = report.rows_loaded,
                        notified = report.notification.was_sent(),
                        "run completed"
                    );
                    RunStatus::Completed(report)
                }
                Err(err) => {
                    let failure = RunFailure::from(&err);
                    error!(stage = %failure.stage, error = %failure.message, "run failed");
                    RunStatus::Failed(failure)
                }
            };
            RunOutcome {
                run_id: request.run_id,
                started_at,
                finished_at: self.clock.utc(),
                status,
            }
        }
        .instrument(span)
        .await
    }
}
