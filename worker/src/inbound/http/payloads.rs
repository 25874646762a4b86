//! Wire shapes shared by several endpoints.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{ObjectLocation, RequestValidationError, Secret};

/// Object storage location and credentials.
///
/// Example JSON:
/// `{"endpoint":"http://minio:9000","bucket":"raw","key":"orders.csv","accessKey":"minio","secretKey":"minio123"}`
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStorePayload {
    /// Base URL of the S3-compatible endpoint.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Access key identifier.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

impl TryFrom<ObjectStorePayload> for ObjectLocation {
    type Error = RequestValidationError;

    fn try_from(value: ObjectStorePayload) -> Result<Self, Self::Error> {
        Self::new(
            &value.endpoint,
            value.bucket,
            value.key,
            value.access_key,
            Secret::new(value.secret_key),
        )
    }
}
