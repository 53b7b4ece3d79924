// ── Core error types ──
//
// User-facing errors from rwtool-core. Screens never look at HTTP status
// codes or reqwest internals directly: the `From<rwtool_api::Error>` impl
// folds transport failures into a small set of variants, and
// `user_message` turns any of them into the text shown in a notice.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connectivity ─────────────────────────────────────────────────
    /// The server could not be reached (refused, DNS, timeout).
    #[error("Cannot reach the server: {reason}")]
    Network { reason: String },

    // ── Server responses ─────────────────────────────────────────────
    /// Non-success response. `message` is the server's own text, if it sent one.
    #[error("Server error{}: {}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default(), message.as_deref().unwrap_or("no message"))]
    Server {
        status: Option<u16>,
        message: Option<String>,
        /// Machine-readable code from a JSON error body (e.g. `EMAIL_EXISTS`).
        code: Option<String>,
    },

    #[error("Not found{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NotFound { message: Option<String> },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server answered with a body we could not understand.
    #[error("Unexpected response: {message}")]
    Protocol { message: String },

    // ── Client side ──────────────────────────────────────────────────
    /// Local form validation rejected the input; nothing was sent.
    #[error("{message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The owning screen was torn down while the operation was in flight.
    #[error("Operation discarded")]
    Discarded,
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// The text to show the user: the server's message when it sent one,
    /// the validation text for local rejections, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                message: Some(message),
                ..
            }
            | Self::NotFound {
                message: Some(message),
            }
            | Self::Validation { message } => message.clone(),
            _ => fallback.to_owned(),
        }
    }

    /// Machine-readable error code, when the server sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::Authentication { .. } => Some(401),
            _ => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rwtool_api::Error> for CoreError {
    fn from(err: rwtool_api::Error) -> Self {
        match err {
            rwtool_api::Error::Authentication { message } => CoreError::Authentication { message },
            rwtool_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    CoreError::Network {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Server {
                        status: e.status().map(|s| s.as_u16()),
                        message: None,
                        code: None,
                    }
                }
            }
            rwtool_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid server URL: {e}"),
            },
            rwtool_api::Error::ClientSetup(message) => CoreError::Config { message },
            rwtool_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { message },
            rwtool_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Server {
                status: Some(status),
                message,
                code,
            },
            rwtool_api::Error::Deserialization { message, .. } => CoreError::Protocol { message },
        }
    }
}
