//! Worker configuration loaded via OrthoConfig.
//!
//! Values come from `--flags`, `RELAYBOARD_*` environment variables and an
//! optional configuration file, in increasing order of precedence for
//! flags.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_SAMPLE_ROWS;
use crate::outbound::object_store::DEFAULT_REGION;
use crate::outbound::transformer::DEFAULT_TRANSFORM_COMMAND;

const DEFAULT_PORT: u16 = 5055;
const DEFAULT_PROJECT_DIR: &str = "../../dbt/relayboard";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Configuration values for the HTTP worker and the `run-once` command.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RELAYBOARD")]
pub struct WorkerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// Root of the transformation project; generated models land beneath it.
    pub dbt_project_dir: Option<PathBuf>,
    /// Command line used to run the transformation tool.
    pub transform_command: Option<String>,
    /// Treat a non-zero transformation exit as success.
    #[ortho_config(default = false)]
    pub tolerate_transform_failure: bool,
    /// Rows sampled into each chat message.
    pub sample_limit: Option<usize>,
    /// Region name presented to the object store.
    pub s3_region: Option<String>,
    /// Timeout applied to webhook deliveries.
    pub webhook_timeout_secs: Option<u64>,
}

impl WorkerSettings {
    /// Return the bind address, falling back to `0.0.0.0:5055`.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Return the transformation project directory.
    #[must_use]
    pub fn dbt_project_dir(&self) -> PathBuf {
        self.dbt_project_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_DIR))
    }

    /// Return the transformation command line.
    #[must_use]
    pub fn transform_command(&self) -> &str {
        self.transform_command
            .as_deref()
            .unwrap_or(DEFAULT_TRANSFORM_COMMAND)
    }

    /// Return the number of rows sampled per dispatch.
    #[must_use]
    pub fn sample_limit(&self) -> usize {
        self.sample_limit.unwrap_or(DEFAULT_SAMPLE_ROWS)
    }

    /// Return the object store region.
    #[must_use]
    pub fn s3_region(&self) -> &str {
        self.s3_region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Return the webhook delivery timeout.
    #[must_use]
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(
            self.webhook_timeout_secs
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for worker configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "RELAYBOARD_BIND_ADDR",
        "RELAYBOARD_DBT_PROJECT_DIR",
        "RELAYBOARD_TRANSFORM_COMMAND",
        "RELAYBOARD_TOLERATE_TRANSFORM_FAILURE",
        "RELAYBOARD_SAMPLE_LIMIT",
        "RELAYBOARD_S3_REGION",
        "RELAYBOARD_WEBHOOK_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> WorkerSettings {
        WorkerSettings::load_from_iter([OsString::from("worker")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5055".parse().expect("addr"));
        assert_eq!(
            settings.dbt_project_dir(),
            PathBuf::from(DEFAULT_PROJECT_DIR)
        );
        assert_eq!(settings.transform_command(), "dbt run");
        assert!(!settings.tolerate_transform_failure);
        assert_eq!(settings.sample_limit(), 5);
        assert_eq!(settings.s3_region(), "us-east-1");
        assert_eq!(settings.webhook_timeout(), Duration::from_secs(10));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("RELAYBOARD_BIND_ADDR", Some("127.0.0.1:6060".to_owned())),
            ("RELAYBOARD_DBT_PROJECT_DIR", Some("/srv/dbt".to_owned())),
            (
                "RELAYBOARD_TRANSFORM_COMMAND",
                Some("dbt run --select staging".to_owned()),
            ),
            ("RELAYBOARD_TOLERATE_TRANSFORM_FAILURE", Some("true".to_owned())),
            ("RELAYBOARD_SAMPLE_LIMIT", Some("3".to_owned())),
            ("RELAYBOARD_S3_REGION", Some("eu-west-2".to_owned())),
            ("RELAYBOARD_WEBHOOK_TIMEOUT_SECS", Some("2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:6060".parse().expect("addr"));
        assert_eq!(settings.dbt_project_dir(), PathBuf::from("/srv/dbt"));
        assert_eq!(settings.transform_command(), "dbt run --select staging");
        assert!(settings.tolerate_transform_failure);
        assert_eq!(settings.sample_limit(), 3);
        assert_eq!(settings.s3_region(), "eu-west-2");
        assert_eq!(settings.webhook_timeout(), Duration::from_secs(2));
    }
}
