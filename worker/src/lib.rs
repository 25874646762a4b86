//! Relayboard ingestion worker.
//!
//! Pulls a CSV object from S3-compatible storage, replaces a text staging
//! table in PostgreSQL, writes a generated transformation model, runs the
//! transformation tool and posts a sample of the result to a chat webhook.
//! The pipeline is exposed over HTTP ([`server`]) and as the `run-once`
//! command.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
