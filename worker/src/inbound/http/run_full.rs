//! Full pipeline endpoint.
//!
//! ```text
//! POST /run_full {"runId":42,"datasetName":"orders","s3":{...},"pg":{...},"slack":{"webhookUrl":"..."}}
//! ```
//!
//! Pipeline failures are answered with HTTP 200 and `ok: false`; only bodies
//! that cannot be decoded or validated get an error status.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::ApiResult;
use super::payloads::ObjectStorePayload;
use super::state::HttpState;
use crate::domain::ports::tail;
use crate::domain::{
    DatabaseTarget, DatasetName, Error, ObjectLocation, RequestValidationError, RunOutcome,
    RunRequest, RunStage, RunStatus, Secret, WebhookUrl,
};

/// Characters of tool output returned to the caller.
pub const OUTPUT_TAIL_CHARS: usize = 500;

/// PostgreSQL connection parameters.
#[derive(Deserialize, ToSchema)]
pub struct DatabasePayload {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database: String,
}

/// Optional chat webhook settings.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Incoming-webhook URL; absent or blank skips the dispatch.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Request body for `POST /run_full`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunFullPayload {
    /// Caller's run identifier.
    pub run_id: i64,
    /// Dataset the object is loaded as.
    pub dataset_name: String,
    /// Object to ingest.
    pub s3: ObjectStorePayload,
    /// Warehouse to load into.
    pub pg: DatabasePayload,
    /// Dispatch target.
    #[serde(default)]
    pub slack: Option<WebhookPayload>,
}

impl TryFrom<RunFullPayload> for RunRequest {
    type Error = RequestValidationError;

    fn try_from(value: RunFullPayload) -> Result<Self, Self::Error> {
        let pg = value.pg;
        Ok(Self {
            run_id: value.run_id,
            dataset: DatasetName::new(value.dataset_name)?,
            source: ObjectLocation::try_from(value.s3)?,
            database: DatabaseTarget::new(
                pg.host,
                pg.port,
                pg.user,
                Secret::new(pg.password),
                pg.database,
            )?,
            webhook: WebhookUrl::parse_optional(
                value
                    .slack
                    .as_ref()
                    .and_then(|slack| slack.webhook_url.as_deref()),
            )?,
        })
    }
}

/// Body returned when every stage finished.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RunSucceededResponse {
    /// Always `true`.
    pub ok: bool,
    /// Last characters of the transformation tool's standard output.
    pub dbt_stdout: String,
    /// Last characters of the transformation tool's standard error.
    pub dbt_stderr: String,
    /// Tool exit status; absent when killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether a dispatch was posted.
    pub notified: bool,
    /// Rows written to the staging table.
    pub rows_loaded: u64,
    /// RFC 3339 start time.
    pub started_at: String,
    /// RFC 3339 finish time.
    pub finished_at: String,
}

/// Body returned when a stage failed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RunFailedResponse {
    /// Always `false`.
    pub ok: bool,
    /// Stage that failed.
    pub stage: RunStage,
    /// Error message.
    pub error: String,
    /// Stage, error chain and captured standard error.
    pub traceback: String,
    /// RFC 3339 start time.
    pub started_at: String,
    /// RFC 3339 finish time.
    pub finished_at: String,
}

/// Response body for `POST /run_full`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RunFullResponse {
    /// Every stage finished.
    Succeeded(RunSucceededResponse),
    /// A stage failed.
    Failed(RunFailedResponse),
}

impl From<RunOutcome> for RunFullResponse {
    fn from(outcome: RunOutcome) -> Self {
        let started_at = outcome.started_at.to_rfc3339();
        let finished_at = outcome.finished_at.to_rfc3339();
        match outcome.status {
            RunStatus::Completed(report) => Self::Succeeded(RunSucceededResponse {
                ok: true,
                dbt_stdout: tail(&report.transform.stdout, OUTPUT_TAIL_CHARS).to_owned(),
                dbt_stderr: tail(&report.transform.stderr, OUTPUT_TAIL_CHARS).to_owned(),
                exit_code: report.transform.exit_code,
                notified: report.notification.was_sent(),
                rows_loaded: report.rows_loaded,
                started_at,
                finished_at,
            }),
            RunStatus::Failed(failure) => Self::Failed(RunFailedResponse {
                ok: false,
                stage: failure.stage,
                error: failure.message,
                traceback: failure.traceback,
                started_at,
                finished_at,
            }),
        }
    }
}

fn map_validation_error(err: &RequestValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Run every pipeline stage for one CSV object.
#[utoipa::path(
    post,
    path = "/run_full",
    request_body = RunFullPayload,
    responses(
        (status = 200, description = "Run finished; see `ok` for the result", body = RunFullResponse),
        (status = 400, description = "Body could not be decoded or validated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["pipeline"],
    operation_id = "runFull"
)]
#[post("/run_full")]
pub async fn run_full(
    state: web::Data<HttpState>,
    payload: web::Json<RunFullPayload>,
) -> ApiResult<HttpResponse> {
    let request =
        RunRequest::try_from(payload.into_inner()).map_err(|err| map_validation_error(&err))?;
    let outcome = state.ingestion.run(request).await;
    Ok(HttpResponse::Ok().json(RunFullResponse::from(outcome)))
}
