//! Builders wiring the domain services to their outbound adapters.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use crate::domain::{
    DispatchService, IngestionPolicy, IngestionPorts, IngestionService, PreviewService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::filesystem::CapStdModelWriter;
use crate::outbound::object_store::S3ObjectSource;
use crate::outbound::persistence::PostgresStagingStore;
use crate::outbound::transformer::ProcessTransformer;
use crate::outbound::webhook::WebhookHttpNotifier;
use crate::settings::WorkerSettings;

/// Build the ingestion service over S3, PostgreSQL, the filesystem, a child
/// process and the webhook client.
///
/// # Errors
/// Returns [`std::io::Error`] when the transformation command is empty or the
/// HTTP client cannot be initialised.
pub fn build_ingestion_service(settings: &WorkerSettings) -> std::io::Result<IngestionService> {
    let project_dir = settings.dbt_project_dir();
    let transformer = ProcessTransformer::from_command_line(settings.transform_command())
        .map_err(|err| std::io::Error::other(format!("transform command: {err}")))?;
    let notifier = WebhookHttpNotifier::new(settings.webhook_timeout())
        .map_err(|err| std::io::Error::other(format!("webhook client: {err}")))?;
    let warehouse = Arc::new(PostgresStagingStore::new());

    info!(
        project_dir = %project_dir.display(),
        command = settings.transform_command(),
        tolerate_transform_failure = settings.tolerate_transform_failure,
        "ingestion service configured"
    );

    let ports = IngestionPorts {
        source: Arc::new(S3ObjectSource::new(settings.s3_region())),
        staging: warehouse.clone(),
        models: Arc::new(CapStdModelWriter::new(&project_dir)),
        transformer: Arc::new(transformer),
        dispatcher: DispatchService::new(warehouse, Arc::new(notifier), settings.sample_limit()),
    };
    let policy = IngestionPolicy {
        project_dir,
        tolerate_transform_failure: settings.tolerate_transform_failure,
    };
    Ok(IngestionService::new(ports, policy, Arc::new(DefaultClock)))
}

/// Build the preview service over S3.
#[must_use]
pub fn build_preview_service(settings: &WorkerSettings) -> PreviewService {
    PreviewService::new(Arc::new(S3ObjectSource::new(settings.s3_region())))
}

/// Build the HTTP state from real adapters.
///
/// # Errors
/// Propagates failures from [`build_ingestion_service`].
pub fn build_http_state(settings: &WorkerSettings) -> std::io::Result<HttpState> {
    Ok(HttpState::new(
        Arc::new(build_ingestion_service(settings)?),
        Arc::new(build_preview_service(settings)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn settings_with_command(command: Option<&str>) -> WorkerSettings {
        WorkerSettings {
            bind_addr: None,
            dbt_project_dir: None,
            transform_command: command.map(str::to_owned),
            tolerate_transform_failure: false,
            sample_limit: None,
            s3_region: None,
            webhook_timeout_secs: None,
        }
    }

    #[rstest]
    fn default_settings_build_state() {
        assert!(build_http_state(&settings_with_command(None)).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_transform_command_is_rejected(#[case] command: &str) {
        let err = build_ingestion_service(&settings_with_command(Some(command)))
            .err()
            .expect("blank command should fail");
        assert!(err.to_string().starts_with("transform command:"));
    }
}
