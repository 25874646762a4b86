//! Outbound adapters implementing the domain's driven ports.
//!
//! - **object_store**: S3-compatible reads via `rust-s3`
//! - **persistence**: PostgreSQL staging loads and sampling via `postgres`
//! - **filesystem**: generated model files via `cap-std`
//! - **transformer**: the transformation tool as a child process
//! - **webhook**: chat notifications via `reqwest`
//!
//! Adapters translate between domain types and infrastructure calls and hold
//! no pipeline logic.

pub mod filesystem;
pub mod object_store;
pub mod persistence;
pub mod transformer;
pub mod webhook;
