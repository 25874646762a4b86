//! Domain layer: the ingestion pipeline's rules, services and ports.
//!
//! Nothing here knows about HTTP, PostgreSQL or S3; adapters in
//! [`crate::inbound`] and [`crate::outbound`] plug into [`ports`].

mod column_name;
mod dataset;
mod dispatch;
mod error;
mod ingestion;
pub mod ports;
mod preview;
mod request;
mod run_outcome;
mod tabular;
mod trace_id;
mod transform_model;

pub use self::column_name::{
    MAX_IDENTIFIER_LEN, NUMERIC_PREFIX, StagingColumn, StagingSchema, UNNAMED_COLUMN,
    clean_column_name,
};
pub use self::dataset::{
    DatasetName, DatasetNameValidationError, MAX_DATASET_NAME_LEN, MODEL_SUFFIX, QualifiedTable,
    STAGING_SCHEMA, WAREHOUSE_SCHEMA, quote_identifier,
};
pub use self::dispatch::{
    DEFAULT_SAMPLE_ROWS, DispatchError, DispatchMessage, DispatchService, MAX_VALUE_CHARS,
    NULL_TEXT, RowSample, format_dispatch,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::ingestion::{
    IngestionPolicy, IngestionPorts, IngestionService, PipelineError, TransformExitError,
};
pub use self::preview::PreviewService;
pub use self::request::{
    DEFAULT_PREVIEW_ROWS, DatabaseTarget, MAX_PREVIEW_ROWS, ObjectLocation, PreviewLimit,
    PreviewRequest, RequestValidationError, RunRequest, Secret, WebhookUrl,
};
pub use self::run_outcome::{
    NotificationStatus, RunFailure, RunOutcome, RunReport, RunStage, RunStatus,
};
pub use self::tabular::{CsvTable, Row, TabularError};
pub use self::trace_id::TraceId;
pub use self::transform_model::{GENERATED_MODELS_DIR, GeneratedModel};
