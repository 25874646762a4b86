//! PostgreSQL warehouse adapter.

mod postgres_staging_store;

pub use postgres_staging_store::PostgresStagingStore;
