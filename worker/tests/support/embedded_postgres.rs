//! Embedded PostgreSQL provisioning for warehouse integration tests.
//!
//! Every caller gets a fresh database on the shared `pg-embed-setup-unpriv`
//! cluster. Set `SKIP_TEST_CLUSTER=1` to skip instead of fail when the
//! cluster cannot start.

use std::fmt::Display;

use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::config::Host;
use postgres::{Client, Config, NoTls};
use uuid::Uuid;
use worker::domain::{DatabaseTarget, Secret};

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` allows it, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// A freshly created database and the worker's view of it.
pub struct TestDatabase {
    pub url: String,
    pub target: DatabaseTarget,
}

impl TestDatabase {
    /// Create an empty database on the shared cluster.
    pub fn provision() -> Result<Self, String> {
        let cluster = shared_cluster_handle().map_err(|error| error.to_string())?;
        let name = format!("relayboard_{}", Uuid::new_v4().simple());
        cluster
            .create_database(name.as_str())
            .map_err(|error| format!("create database {name}: {error:?}"))?;
        let url = cluster.connection().database_url(name.as_str());
        let target = target_from_url(&url)?;
        Ok(Self { url, target })
    }

    /// Run `sql` and return every row as optional text cells.
    pub fn query(&self, sql: &str) -> Result<Vec<Vec<Option<String>>>, String> {
        let mut client =
            Client::connect(self.url.as_str(), NoTls).map_err(|error| format_postgres_error(&error))?;
        let messages = client
            .simple_query(sql)
            .map_err(|error| format_postgres_error(&error))?;
        Ok(messages
            .into_iter()
            .filter_map(|message| match message {
                postgres::SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|idx| row.get(idx).map(str::to_owned))
                        .collect(),
                ),
                _ => None,
            })
            .collect())
    }
}

/// Render a `postgres` error with the server's message when there is one.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    error.as_db_error().map_or_else(
        || error.to_string(),
        |db_error| format!("postgres error {:?}: {}", db_error.code(), db_error.message()),
    )
}

fn target_from_url(url: &str) -> Result<DatabaseTarget, String> {
    let config: Config = url
        .parse()
        .map_err(|error: postgres::Error| format!("parse {url}: {error}"))?;
    let host = config
        .get_hosts()
        .iter()
        .find_map(|host| match host {
            Host::Tcp(name) => Some(name.clone()),
            _ => None,
        })
        .ok_or_else(|| format!("no TCP host in {url}"))?;
    let port = config.get_ports().first().copied().unwrap_or(5432);
    let user = config.get_user().unwrap_or("postgres").to_owned();
    let password = config
        .get_password()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default();
    let database = config.get_dbname().unwrap_or("postgres").to_owned();

    DatabaseTarget::new(host, port, user, Secret::new(password), database)
        .map_err(|error| format!("database target: {error}"))
}
