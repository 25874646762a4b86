//! Object preview endpoint.
//!
//! ```text
//! POST /preview {"s3":{...},"limit":20}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::ApiResult;
use super::payloads::ObjectStorePayload;
use super::state::HttpState;
use crate::domain::ports::PreviewOutcome;
use crate::domain::{
    Error, ObjectLocation, PreviewLimit, PreviewRequest, RequestValidationError, StagingColumn,
};

/// Request body for `POST /preview`.
#[derive(Deserialize, ToSchema)]
pub struct PreviewPayload {
    /// Object to inspect.
    pub s3: ObjectStorePayload,
    /// Rows to return; defaults to 20, capped at 200.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl TryFrom<PreviewPayload> for PreviewRequest {
    type Error = RequestValidationError;

    fn try_from(value: PreviewPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            source: ObjectLocation::try_from(value.s3)?,
            limit: PreviewLimit::clamped(value.limit),
        })
    }
}

/// Response body for `POST /preview`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PreviewResponse {
    /// The object was read.
    Succeeded {
        /// Always `true`.
        ok: bool,
        /// Header cells and the identifiers a load would use.
        columns: Vec<PreviewColumn>,
        /// Data rows in the whole object.
        #[serde(rename = "totalRows")]
        total_rows: usize,
        /// Leading rows; `null` marks an empty cell.
        rows: Vec<Vec<Option<String>>>,
    },
    /// The object could not be fetched or parsed.
    Failed {
        /// Always `false`.
        ok: bool,
        /// Error message.
        error: String,
    },
}

/// One header cell and its cleaned identifier.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewColumn {
    /// Header text as found.
    pub original: String,
    /// Identifier used in the warehouse.
    pub cleaned: String,
}

impl From<StagingColumn> for PreviewColumn {
    fn from(value: StagingColumn) -> Self {
        Self {
            original: value.original,
            cleaned: value.cleaned,
        }
    }
}

impl From<PreviewOutcome> for PreviewResponse {
    fn from(value: PreviewOutcome) -> Self {
        Self::Succeeded {
            ok: true,
            columns: value.columns.into_iter().map(PreviewColumn::from).collect(),
            total_rows: value.total_rows,
            rows: value.rows,
        }
    }
}

/// Fetch a CSV object and show its column mapping and first rows.
#[utoipa::path(
    post,
    path = "/preview",
    request_body = PreviewPayload,
    responses(
        (status = 200, description = "Preview result; see `ok`", body = PreviewResponse),
        (status = 400, description = "Body could not be decoded or validated", body = Error)
    ),
    tags = ["pipeline"],
    operation_id = "preview"
)]
#[post("/preview")]
pub async fn preview(
    state: web::Data<HttpState>,
    payload: web::Json<PreviewPayload>,
) -> ApiResult<HttpResponse> {
    let request = PreviewRequest::try_from(payload.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
    })?;
    let response = match state.preview.preview(request).await {
        Ok(outcome) => PreviewResponse::from(outcome),
        Err(err) => PreviewResponse::Failed {
            ok: false,
            error: err.to_string(),
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
