// ── Runtime console configuration ──
//
// Describes which server to talk to and how long notices stay up.
// Core never reads config files; the CLI/TUI resolve a profile and hand
// a `ConsoleConfig` in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use rwtool_api::{ApiClient, TransportConfig};

use crate::error::CoreError;
use crate::session::Session;

/// How long notices stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTimings {
    /// Success and failure notices.
    pub default: Duration,
    /// Local validation notices.
    pub validation: Duration,
}

impl NoticeTimings {
    pub const DEFAULT: Duration = Duration::from_millis(3000);
    pub const VALIDATION: Duration = Duration::from_millis(2000);
}

impl Default for NoticeTimings {
    fn default() -> Self {
        Self {
            default: Self::DEFAULT,
            validation: Self::VALIDATION,
        }
    }
}

/// Everything a console session needs to reach the server.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Server base URL (e.g. `http://localhost:8080`).
    pub url: Url,
    /// Per-request timeout. A request that exceeds it fails like any
    /// other transport error and goes through the normal failure path.
    pub timeout: Duration,
    /// Bearer token from a previous login, if any.
    pub token: Option<SecretString>,
    pub notices: NoticeTimings,
    /// Who the console acts as.
    pub session: Session,
}

impl ConsoleConfig {
    pub fn new(url: Url, session: Session) -> Self {
        Self {
            url,
            timeout: rwtool_api::transport::DEFAULT_TIMEOUT,
            token: None,
            notices: NoticeTimings::default(),
            session,
        }
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        match &self.token {
            Some(token) => transport.with_token(token.clone()),
            None => transport,
        }
    }

    /// Build the HTTP client for this config.
    pub fn client(&self) -> Result<ApiClient, CoreError> {
        Ok(ApiClient::new(self.url.as_str(), &self.transport())?)
    }
}
