//! HTTP inbound adapter exposing the worker's endpoints.

pub mod error;
pub mod health;
pub mod payloads;
pub mod preview;
pub mod run_full;
pub mod state;

use actix_web::web;

pub use error::ApiResult;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON extractor settings shared by every endpoint.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(error::json_error_handler)
}

/// Register the pipeline and probe endpoints.
///
/// Callers provide [`state::HttpState`] and [`health::HealthState`] as
/// `web::Data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(run_full::run_full)
        .service(preview::preview)
        .service(health::ready)
        .service(health::live);
}
