//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use crate::inbound::http::state::HttpState;
use crate::settings::WorkerSettings;

use super::state_builders::build_http_state;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Construct a configuration serving fixture ports on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            http_state: HttpState::default(),
        }
    }

    /// Construct a configuration wired to the real adapters.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when an adapter cannot be built from the
    /// settings, for example an empty transformation command.
    pub fn from_settings(settings: &WorkerSettings) -> std::io::Result<Self> {
        Ok(Self::new(settings.bind_addr()).with_http_state(build_http_state(settings)?))
    }

    /// Replace the driving ports served by the handlers.
    #[must_use]
    pub fn with_http_state(mut self, http_state: HttpState) -> Self {
        self.http_state = http_state;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
