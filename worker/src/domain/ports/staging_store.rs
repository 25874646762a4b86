//! Driven ports for the warehouse: replacing staging tables and reading
//! samples back.
//!
//! Both ports receive the connection target per call; each pipeline run
//! names its own database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{DatabaseTarget, QualifiedTable, Row, RowSample, StagingSchema};

define_port_error! {
    /// Errors raised by warehouse adapters.
    pub enum StagingStoreError {
        /// The connection could not be opened.
        Connection {
            /// Server or transport error text.
            message: String,
        } => "warehouse connection failed: {message}",
        /// A statement failed.
        Query {
            /// Server error text with SQLSTATE.
            message: String,
        } => "warehouse query failed: {message}",
        /// Streaming rows into the table failed.
        Copy {
            /// Server or encoder error text.
            message: String,
        } => "warehouse copy failed: {message}",
        /// The worker task running the blocking client failed.
        Task {
            /// Join error text.
            message: String,
        } => "warehouse task failed: {message}",
    }
}

/// Everything needed to (re)create and fill one staging table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLoad {
    /// Destination table.
    pub table: QualifiedTable,
    /// Column identifiers, in header order.
    pub schema: StagingSchema,
    /// Rows, each as wide as `schema`.
    pub rows: Vec<Row>,
}

/// Port replacing a staging table with freshly parsed rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StagingLoader: Send + Sync {
    /// Drop and recreate `load.table` with one text column per schema entry,
    /// then insert every row, atomically. Returns the number of rows written.
    async fn replace_table(
        &self,
        database: &DatabaseTarget,
        load: StagingLoad,
    ) -> Result<u64, StagingStoreError>;
}

/// Port reading the first rows of a table as text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableSampler: Send + Sync {
    /// Read up to `limit` rows from `table`.
    async fn sample(
        &self,
        database: &DatabaseTarget,
        table: &QualifiedTable,
        limit: usize,
    ) -> Result<RowSample, StagingStoreError>;
}

/// In-memory warehouse keyed by displayed table name.
#[derive(Debug, Default)]
pub struct FixtureStagingStore {
    tables: Mutex<HashMap<String, (Vec<String>, Vec<Row>)>>,
}

impl FixtureStagingStore {
    /// Names of the tables currently held, sorted.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .lock()
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl StagingLoader for FixtureStagingStore {
    async fn replace_table(
        &self,
        _database: &DatabaseTarget,
        load: StagingLoad,
    ) -> Result<u64, StagingStoreError> {
        let columns = load.schema.cleaned_names().map(str::to_owned).collect();
        let written = u64::try_from(load.rows.len()).unwrap_or(u64::MAX);
        let mut tables = self
            .tables
            .lock()
            .map_err(|err| StagingStoreError::task(err.to_string()))?;
        tables.insert(load.table.to_string(), (columns, load.rows));
        Ok(written)
    }
}

#[async_trait]
impl TableSampler for FixtureStagingStore {
    async fn sample(
        &self,
        _database: &DatabaseTarget,
        table: &QualifiedTable,
        limit: usize,
    ) -> Result<RowSample, StagingStoreError> {
        let tables = self
            .tables
            .lock()
            .map_err(|err| StagingStoreError::task(err.to_string()))?;
        let (columns, rows) = tables
            .get(&table.to_string())
            .ok_or_else(|| StagingStoreError::query(format!("relation {table} does not exist")))?;
        Ok(RowSample {
            table: table.clone(),
            columns: columns.clone(),
            rows: rows.iter().take(limit).cloned().collect(),
        })
    }
}
