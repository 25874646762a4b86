//! `rust-s3` adapter for the object source port.
//!
//! Every fetch builds a path-style bucket handle from the request's own
//! endpoint and credentials, so one adapter serves any MinIO or S3 target.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::domain::ObjectLocation;
use crate::domain::ports::{ObjectSource, ObjectSourceError};

/// Region used when the caller's store ignores regions, as MinIO does.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Object source reading whole objects over the S3 API.
#[derive(Debug, Clone)]
pub struct S3ObjectSource {
    region: String,
}

impl S3ObjectSource {
    /// Create a source that signs requests for `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    fn bucket(&self, location: &ObjectLocation) -> Result<Box<Bucket>, ObjectSourceError> {
        let region = Region::Custom {
            region: self.region.clone(),
            endpoint: endpoint_text(location),
        };
        let credentials = Credentials::new(
            Some(location.access_key()),
            Some(location.secret_key().expose()),
            None,
            None,
            None,
        )
        .map_err(|err| ObjectSourceError::credentials(err.to_string()))?;
        let bucket = Bucket::new(location.bucket(), region, credentials)
            .map_err(|err| ObjectSourceError::invalid_location(err.to_string()))?;
        Ok(bucket.with_path_style())
    }
}

impl Default for S3ObjectSource {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

fn endpoint_text(location: &ObjectLocation) -> String {
    location.endpoint().as_str().trim_end_matches('/').to_owned()
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn fetch(&self, location: &ObjectLocation) -> Result<Vec<u8>, ObjectSourceError> {
        let bucket = self.bucket(location)?;
        let response = bucket
            .get_object(location.key())
            .await
            .map_err(|err| ObjectSourceError::connection(err.to_string()))?;
        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(ObjectSourceError::status(code));
        }
        Ok(response.bytes().to_vec())
    }
}
