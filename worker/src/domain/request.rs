//! Validated inputs for pipeline runs and previews.
//!
//! Inbound adapters decode wire payloads and convert them into these types;
//! everything past this boundary can assume the invariants hold.

use std::fmt;
use std::num::NonZeroUsize;

use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

use super::{DatasetName, DatasetNameValidationError};

/// Credential text that is wiped on drop and never printed.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wrap secret text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the secret for handing to a client library.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Validation failures raised while assembling a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// The dataset name is invalid.
    #[error(transparent)]
    Dataset(#[from] DatasetNameValidationError),
    /// A required text field is blank.
    #[error("{field} must not be blank")]
    BlankField {
        /// Wire name of the field.
        field: &'static str,
    },
    /// The object store endpoint is not an absolute http(s) URL.
    #[error("s3.endpoint is not a valid http(s) URL: {message}")]
    InvalidEndpoint {
        /// Parser diagnostic.
        message: String,
    },
    /// The database port is zero.
    #[error("pg.port must be between 1 and 65535")]
    InvalidPort,
    /// The webhook URL is not an absolute http(s) URL.
    #[error("slack.webhookUrl is not a valid http(s) URL: {message}")]
    InvalidWebhook {
        /// Parser diagnostic.
        message: String,
    },
}

impl RequestValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "datasetName",
            Self::BlankField { field } => *field,
            Self::InvalidEndpoint { .. } => "s3.endpoint",
            Self::InvalidPort => "pg.port",
            Self::InvalidWebhook { .. } => "slack.webhookUrl",
        }
    }
}

fn require(value: String, field: &'static str) -> Result<String, RequestValidationError> {
    if value.trim().is_empty() {
        Err(RequestValidationError::BlankField { field })
    } else {
        Ok(value)
    }
}

fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|err| err.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}

/// Where to fetch the CSV object from, plus the credentials to do so.
#[derive(Debug, Clone)]
pub struct ObjectLocation {
    endpoint: Url,
    bucket: String,
    key: String,
    access_key: String,
    secret_key: Secret,
}

impl ObjectLocation {
    /// Validate an object store location.
    ///
    /// # Errors
    /// Returns [`RequestValidationError`] for a malformed endpoint or a blank
    /// bucket, key or access key.
    pub fn new(
        endpoint: &str,
        bucket: impl Into<String>,
        key: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: Secret,
    ) -> Result<Self, RequestValidationError> {
        let endpoint = parse_http_url(endpoint)
            .map_err(|message| RequestValidationError::InvalidEndpoint { message })?;
        Ok(Self {
            endpoint,
            bucket: require(bucket.into(), "s3.bucket")?,
            key: require(key.into(), "s3.key")?,
            access_key: require(access_key.into(), "s3.accessKey")?,
            secret_key,
        })
    }

    /// Object store base URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key within the bucket.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Access key identifier.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Secret access key.
    #[must_use]
    pub const fn secret_key(&self) -> &Secret {
        &self.secret_key
    }
}

/// PostgreSQL connection parameters supplied with each run.
#[derive(Debug, Clone)]
pub struct DatabaseTarget {
    host: String,
    port: u16,
    user: String,
    password: Secret,
    database: String,
}

impl DatabaseTarget {
    /// Validate connection parameters.
    ///
    /// # Errors
    /// Returns [`RequestValidationError`] for a blank host, user or database
    /// name, or a zero port.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: Secret,
        database: impl Into<String>,
    ) -> Result<Self, RequestValidationError> {
        if port == 0 {
            return Err(RequestValidationError::InvalidPort);
        }
        Ok(Self {
            host: require(host.into(), "pg.host")?,
            port,
            user: require(user.into(), "pg.user")?,
            password,
            database: require(database.into(), "pg.database")?,
        })
    }

    /// Server host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Login role.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Login password.
    #[must_use]
    pub const fn password(&self) -> &Secret {
        &self.password
    }

    /// Database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Incoming-webhook URL of the chat workspace.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(Url);

impl WebhookUrl {
    /// Parse an optional webhook URL; absent or blank input means "do not
    /// notify".
    ///
    /// # Errors
    /// Returns [`RequestValidationError::InvalidWebhook`] for non-blank text
    /// that is not an absolute http(s) URL.
    ///
    /// # Examples
    /// ```
    /// use worker::domain::WebhookUrl;
    ///
    /// assert!(WebhookUrl::parse_optional(Some("  ")).expect("blank").is_none());
    /// assert!(WebhookUrl::parse_optional(Some("https://hooks.example/T1")).expect("url").is_some());
    /// assert!(WebhookUrl::parse_optional(Some("not a url")).is_err());
    /// ```
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, RequestValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_http_url(text)
                .map(|url| Some(Self(url)))
                .map_err(|message| RequestValidationError::InvalidWebhook { message }),
        }
    }

    /// Borrow the parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Incoming-webhook paths embed the workspace token.
        write!(f, "WebhookUrl({}://{}/***)", self.0.scheme(), self.0.host_str().unwrap_or(""))
    }
}

/// One full pipeline invocation.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Caller-chosen correlation number.
    pub run_id: i64,
    /// Dataset being loaded.
    pub dataset: DatasetName,
    /// Object to ingest.
    pub source: ObjectLocation,
    /// Warehouse to load into.
    pub database: DatabaseTarget,
    /// Where to post the dispatch; `None` skips notification.
    pub webhook: Option<WebhookUrl>,
}

/// Default number of preview rows.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;
/// Upper bound on preview rows.
pub const MAX_PREVIEW_ROWS: usize = 200;

/// Number of rows returned by a preview, clamped to `1..=MAX_PREVIEW_ROWS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimit(NonZeroUsize);

impl PreviewLimit {
    /// Clamp a requested row count; `None` selects [`DEFAULT_PREVIEW_ROWS`].
    ///
    /// # Examples
    /// ```
    /// use worker::domain::PreviewLimit;
    ///
    /// assert_eq!(PreviewLimit::clamped(None).get(), 20);
    /// assert_eq!(PreviewLimit::clamped(Some(0)).get(), 1);
    /// assert_eq!(PreviewLimit::clamped(Some(5_000)).get(), 200);
    /// ```
    #[must_use]
    pub fn clamped(requested: Option<usize>) -> Self {
        let rows = requested
            .unwrap_or(DEFAULT_PREVIEW_ROWS)
            .clamp(1, MAX_PREVIEW_ROWS);
        Self(NonZeroUsize::new(rows).unwrap_or(NonZeroUsize::MIN))
    }

    /// Row count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PreviewLimit {
    fn default() -> Self {
        Self::clamped(None)
    }
}

/// Request to inspect a CSV object without loading it.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    /// Object to inspect.
    pub source: ObjectLocation,
    /// Number of rows to return.
    pub limit: PreviewLimit,
}
