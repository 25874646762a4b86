//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the pipeline endpoints, the health probes and the
//! shared error envelope. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, RunStage};
use crate::inbound::http::payloads::ObjectStorePayload;
use crate::inbound::http::preview::{PreviewColumn, PreviewPayload, PreviewResponse};
use crate::inbound::http::run_full::{
    DatabasePayload, RunFailedResponse, RunFullPayload, RunFullResponse, RunSucceededResponse,
    WebhookPayload,
};

/// OpenAPI document for the worker's HTTP interface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Relayboard worker API",
        description = "Runs the CSV ingestion pipeline and previews object-storage files."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::run_full::run_full,
        crate::inbound::http::preview::preview,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RunStage,
        ObjectStorePayload,
        DatabasePayload,
        WebhookPayload,
        RunFullPayload,
        RunFullResponse,
        RunSucceededResponse,
        RunFailedResponse,
        PreviewPayload,
        PreviewColumn,
        PreviewResponse,
    )),
    tags(
        (name = "pipeline", description = "Ingestion runs and previews"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/run_full")]
    #[case("/preview")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_exposes_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    fn run_payload_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let payload = schemas.get("RunFullPayload").expect("RunFullPayload schema");

        assert_object_schema_has_field(payload, "runId");
        assert_object_schema_has_field(payload, "datasetName");
        assert_object_schema_has_field(payload, "s3");
        assert_object_schema_has_field(payload, "pg");
    }
}
