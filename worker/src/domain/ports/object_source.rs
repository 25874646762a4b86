//! Driven port for reading CSV objects from S3-compatible storage.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::ObjectLocation;

define_port_error! {
    /// Errors raised while fetching an object.
    pub enum ObjectSourceError {
        /// The store could not be reached or the transfer broke off.
        Connection {
            /// Transport error text.
            message: String,
        } => "object store connection failed: {message}",
        /// The credentials could not be used to sign the request.
        Credentials {
            /// Signing error text.
            message: String,
        } => "object store credentials rejected: {message}",
        /// The store answered with a non-success status.
        Status {
            /// HTTP status code.
            code: u16,
        } => "object store returned status {code}",
        /// The bucket or endpoint could not be addressed.
        InvalidLocation {
            /// What was wrong with the location.
            message: String,
        } => "object location invalid: {message}",
    }
}

/// Port for fetching the raw bytes of one object.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Read the whole object at `location`.
    async fn fetch(&self, location: &ObjectLocation) -> Result<Vec<u8>, ObjectSourceError>;
}

/// Fixture returning the same payload for every location.
#[derive(Debug, Clone, Default)]
pub struct FixtureObjectSource {
    payload: Vec<u8>,
}

impl FixtureObjectSource {
    /// Serve `payload` for every fetch.
    #[must_use]
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl ObjectSource for FixtureObjectSource {
    async fn fetch(&self, _location: &ObjectLocation) -> Result<Vec<u8>, ObjectSourceError> {
        Ok(self.payload.clone())
    }
}
