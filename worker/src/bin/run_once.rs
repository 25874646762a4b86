//! Execute one pipeline run from a request file and print the outcome.
//!
//! The request file has the same shape as the `POST /run_full` body. Adapter
//! settings come from `RELAYBOARD_*` variables and the configuration file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use worker::domain::RunRequest;
use worker::domain::ports::IngestionCommand;
use worker::inbound::http::run_full::{RunFullPayload, RunFullResponse};
use worker::server::build_ingestion_service;
use worker::settings::WorkerSettings;

/// `run-once` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "run-once",
    about = "Run the ingestion pipeline once for a request file",
    version
)]
struct CliArgs {
    /// Path to a JSON run request.
    #[arg(value_name = "path")]
    request: PathBuf,
}

fn main() -> io::Result<ExitCode> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> io::Result<ExitCode> {
    let request = load_request(&args.request)?;
    let settings = WorkerSettings::load_from_iter([OsString::from("run-once")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let service = build_ingestion_service(&settings)?;

    let outcome = service.run(request).await;
    let succeeded = outcome.is_success();
    let body = serde_json::to_string_pretty(&RunFullResponse::from(outcome))
        .map_err(|error| io::Error::other(format!("encode outcome: {error}")))?;
    writeln!(io::stdout().lock(), "{body}")?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_request(path: &Path) -> io::Result<RunRequest> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "request path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open request directory '{}': {error}",
            parent.display()
        ))
    })?;
    let raw = directory.read(file_name).map_err(|error| {
        io::Error::other(format!("read request '{}': {error}", path.display()))
    })?;
    parse_request(&raw)
}

fn parse_request(raw: &[u8]) -> io::Result<RunRequest> {
    let payload: RunFullPayload = serde_json::from_slice(raw).map_err(|error| {
        io::Error::new(io::ErrorKind::InvalidData, format!("decode request: {error}"))
    })?;
    RunRequest::try_from(payload).map_err(|error| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid request: {error}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn request_json(dataset: &str) -> serde_json::Value {
        json!({
            "runId": 7,
            "datasetName": dataset,
            "s3": {
                "endpoint": "http://localhost:9000",
                "bucket": "uploads",
                "key": "orders.csv",
                "accessKey": "minio",
                "secretKey": "minio123"
            },
            "pg": {
                "host": "localhost",
                "port": 5432,
                "user": "relayboard",
                "password": "secret",
                "database": "warehouse"
            }
        })
    }

    #[rstest]
    fn parses_a_positional_request_path() {
        let args = CliArgs::try_parse_from(["run-once", "requests/orders.json"]).expect("args");
        assert_eq!(args.request, PathBuf::from("requests/orders.json"));
    }

    #[rstest]
    fn rejects_a_missing_request_path() {
        assert!(CliArgs::try_parse_from(["run-once"]).is_err());
    }

    #[rstest]
    fn loads_a_request_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("orders.json");
        std::fs::write(&path, request_json("orders").to_string()).expect("write request");

        let request = load_request(&path).expect("request loads");
        assert_eq!(request.run_id, 7);
        assert_eq!(request.dataset.to_string(), "orders");
        assert!(request.webhook.is_none());
    }

    #[rstest]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_request(&dir.path().join("absent.json")).expect_err("missing file");
        assert!(err.to_string().contains("absent.json"));
    }

    #[rstest]
    fn undecodable_request_is_invalid_data() {
        let err = parse_request(b"{not json").expect_err("request should be rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[rstest]
    fn blank_dataset_is_invalid_input() {
        let raw = request_json("").to_string();
        let err = parse_request(raw.as_bytes()).expect_err("request should be rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().starts_with("invalid request:"));
    }
}
