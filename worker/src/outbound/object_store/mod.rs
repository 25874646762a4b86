//! S3-compatible object storage outbound adapter.

mod s3_source;

pub use s3_source::{DEFAULT_REGION, S3ObjectSource};
