//! PostgreSQL-backed staging loader and table sampler.
//!
//! Uses the synchronous `postgres` client on Tokio's blocking pool. Each call
//! opens its own connection to the target named in the request and closes it
//! when done.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use postgres::{Client, Config, NoTls, SimpleQueryMessage, Transaction};
use tracing::{Span, debug};

use crate::domain::ports::{StagingLoad, StagingLoader, StagingStoreError, TableSampler};
use crate::domain::{DatabaseTarget, QualifiedTable, RowSample, quote_identifier};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Warehouse adapter replacing staging tables and sampling result tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresStagingStore;

impl PostgresStagingStore {
    /// Create the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Render a `postgres` error with the server's message and SQLSTATE.
///
/// `postgres::Error` displays server errors as a bare `db error`, so the
/// detail lives in [`postgres::Error::as_db_error`] or the source chain.
fn describe(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error
            .source()
            .map_or_else(|| error.to_string(), |source| format!("{error}: {source}"));
    };

    let mut summary = format!(
        "{}: {} (SQLSTATE {})",
        db_error.severity(),
        db_error.message(),
        db_error.code().code()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}

fn connect(target: &DatabaseTarget) -> Result<Client, StagingStoreError> {
    let mut config = Config::new();
    config
        .host(target.host())
        .port(target.port())
        .user(target.user())
        .password(target.password().expose())
        .dbname(target.database())
        .application_name("relayboard-worker")
        .connect_timeout(CONNECT_TIMEOUT);
    config
        .connect(NoTls)
        .map_err(|error| StagingStoreError::connection(describe(&error)))
}

async fn run_blocking<T, F>(work: F) -> Result<T, StagingStoreError>
where
    F: FnOnce() -> Result<T, StagingStoreError> + Send + 'static,
    T: Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|error| StagingStoreError::task(error.to_string()))?
}

fn column_list(load: &StagingLoad) -> String {
    load.schema
        .cleaned_names()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ")
}

/// DDL dropping and recreating the staging table with one text column per
/// schema entry.
fn staging_ddl(load: &StagingLoad) -> String {
    let columns = load
        .schema
        .cleaned_names()
        .map(|name| format!("{} text", quote_identifier(name)))
        .collect::<Vec<_>>()
        .join(", ");
    let table = &load.table;
    format!(
        "create schema if not exists {schema};\n\
         drop table if exists {table};\n\
         create table {table} ({columns});",
        schema = quote_identifier(table.schema()),
    )
}

fn copy_statement(load: &StagingLoad) -> String {
    format!(
        "copy {} ({}) from stdin with (format csv)",
        load.table,
        column_list(load)
    )
}

fn copy_rows(
    transaction: &mut Transaction<'_>,
    load: &StagingLoad,
) -> Result<u64, StagingStoreError> {
    let copy_error = |error: postgres::Error| StagingStoreError::copy(describe(&error));
    let sink = transaction
        .copy_in(copy_statement(load).as_str())
        .map_err(copy_error)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);
    for row in &load.rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or_default()))
            .map_err(|error| StagingStoreError::copy(error.to_string()))?;
    }
    let encoded = writer
        .into_inner()
        .map_err(|error| StagingStoreError::copy(error.to_string()))?;
    encoded.finish().map_err(copy_error)
}

fn replace_blocking(target: &DatabaseTarget, load: &StagingLoad) -> Result<u64, StagingStoreError> {
    let query_error = |error: postgres::Error| StagingStoreError::query(describe(&error));
    let mut client = connect(target)?;
    let mut transaction = client.transaction().map_err(query_error)?;
    transaction
        .batch_execute(&staging_ddl(load))
        .map_err(query_error)?;
    let written = copy_rows(&mut transaction, load)?;
    transaction.commit().map_err(query_error)?;
    debug!(table = %load.table, rows = written, "staging copy committed");
    Ok(written)
}

fn sample_blocking(
    target: &DatabaseTarget,
    table: &QualifiedTable,
    limit: usize,
) -> Result<RowSample, StagingStoreError> {
    let mut client = connect(target)?;
    let messages = client
        .simple_query(&format!("select * from {table} limit {limit}"))
        .map_err(|error| StagingStoreError::query(describe(&error)))?;

    let mut sample = RowSample {
        table: table.clone(),
        columns: Vec::new(),
        rows: Vec::new(),
    };
    for message in messages {
        if let SimpleQueryMessage::Row(row) = message {
            if sample.columns.is_empty() {
                sample.columns = row
                    .columns()
                    .iter()
                    .map(|column| column.name().to_owned())
                    .collect();
            }
            sample
                .rows
                .push((0..row.len()).map(|idx| row.get(idx).map(str::to_owned)).collect());
        }
    }
    Ok(sample)
}

#[async_trait]
impl StagingLoader for PostgresStagingStore {
    async fn replace_table(
        &self,
        database: &DatabaseTarget,
        load: StagingLoad,
    ) -> Result<u64, StagingStoreError> {
        let target = database.clone();
        run_blocking(move || replace_blocking(&target, &load)).await
    }
}

#[async_trait]
impl TableSampler for PostgresStagingStore {
    async fn sample(
        &self,
        database: &DatabaseTarget,
        table: &QualifiedTable,
        limit: usize,
    ) -> Result<RowSample, StagingStoreError> {
        let target = database.clone();
        let sampled = table.clone();
        run_blocking(move || sample_blocking(&target, &sampled, limit)).await
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{DatasetName, StagingSchema};

    #[fixture]
    fn load() -> StagingLoad {
        let dataset = DatasetName::new("orders").expect("valid dataset");
        StagingLoad {
            table: QualifiedTable::staging(&dataset),
            schema: StagingSchema::from_header(["Name", "Sale Amount", "name"]),
            rows: Vec::new(),
        }
    }

    #[rstest]
    fn ddl_recreates_table_with_text_columns(load: StagingLoad) {
        assert_eq!(
            staging_ddl(&load),
            "create schema if not exists \"staging\";\n\
             drop table if exists staging.\"orders\";\n\
             create table staging.\"orders\" (\"name\" text, \"sale_amount\" text, \"name_1\" text);"
        );
    }

    #[rstest]
    fn copy_names_the_same_columns_as_the_ddl(load: StagingLoad) {
        assert_eq!(
            copy_statement(&load),
            "copy staging.\"orders\" (\"name\", \"sale_amount\", \"name_1\") from stdin with (format csv)"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let target = DatabaseTarget::new(
            "127.0.0.1",
            9,
            "nobody",
            crate::domain::Secret::new("x"),
            "nowhere",
        )
        .expect("valid target");
        let dataset = DatasetName::new("orders").expect("valid dataset");
        let err = PostgresStagingStore::new()
            .sample(&target, &QualifiedTable::staging(&dataset), 5)
            .await
            .expect_err("nothing listens on the discard port");
        let message = match err {
            StagingStoreError::Connection { message } => message,
            other => panic!("expected a connection error, got {other:?}"),
        };
        assert!(
            message.starts_with("error connecting to server: "),
            "cause should follow the summary: {message}"
        );
    }
}
