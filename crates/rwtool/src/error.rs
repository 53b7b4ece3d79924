//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use rwtool_config::ConfigError;
use rwtool_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 3;
    pub const AUTH: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const VALIDATION: i32 = 6;
    pub const SERVER: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the server at {url}: {reason}")]
    #[diagnostic(
        code(rwtool::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Override with --api-url or: rwtool config set api_url <URL>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(rwtool::auth_failed),
        help("Log in again with: rwtool auth login --profile {profile}")
    )]
    AuthFailed { message: String, profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(rwtool::not_found),
        help("Run: rwtool {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Not found: {message}")]
    #[diagnostic(code(rwtool::not_found))]
    ServerNotFound { message: String },

    // ── Server ───────────────────────────────────────────────────────
    #[error(
        "Server error{}: {message}{}",
        status.map(|s| format!(" (HTTP {s})")).unwrap_or_default(),
        code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
    )]
    #[diagnostic(code(rwtool::server_error))]
    Server {
        status: Option<u16>,
        message: String,
        code: Option<String>,
    },

    #[error("Unexpected response from the server: {message}")]
    #[diagnostic(
        code(rwtool::protocol),
        help("The backend may be a different version than this client expects.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(rwtool::validation))]
    Validation { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rwtool::invalid_argument))]
    InvalidArgument { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(rwtool::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: rwtool config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No identity configured for profile '{profile}'")]
    #[diagnostic(
        code(rwtool::no_identity),
        help(
            "This command acts as a specific user.\n\
             Set one with: rwtool config set email <EMAIL>\n\
             Or pass --as-email."
        )
    )]
    NoIdentity { profile: String },

    #[error(transparent)]
    #[diagnostic(code(rwtool::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rwtool::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(rwtool::cancelled))]
    Cancelled,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(rwtool::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ServerNotFound { .. } => exit_code::NOT_FOUND,
            Self::Server { .. } | Self::Protocol { .. } => exit_code::SERVER,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::InvalidArgument { .. } | Self::NonInteractiveRequiresYes { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in the server URL and profile name that `From<CoreError>`
    /// cannot know.
    pub fn in_context(self, profile: &str, url: &str) -> Self {
        match self {
            Self::ConnectionFailed { reason, .. } => Self::ConnectionFailed {
                url: url.into(),
                reason,
            },
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: profile.into(),
            },
            other => other,
        }
    }

    /// Attach the entity kind to a bare 404 so the help can point at
    /// the right list command.
    pub fn for_resource(self, resource_type: &str, identifier: &str, list_command: &str) -> Self {
        match self {
            Self::ServerNotFound { .. } => Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.into(),
                list_command: list_command.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed {
                url: "(configured server)".into(),
                reason,
            },

            CoreError::Authentication { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },

            CoreError::NotFound { message } => CliError::ServerNotFound {
                message: message.unwrap_or_else(|| "resource does not exist".into()),
            },

            CoreError::Server {
                status,
                message,
                code,
            } => CliError::Server {
                status,
                message: message.unwrap_or_else(|| "no message".into()),
                code,
            },

            CoreError::Protocol { message } => CliError::Protocol { message },

            CoreError::Validation { message } => CliError::Validation { message },

            CoreError::Config { message } => CliError::InvalidArgument {
                field: "config".into(),
                reason: message,
            },

            CoreError::Discarded => CliError::Cancelled,
        }
    }
}

// ── ConfigError helpers ──────────────────────────────────────────────

/// Turn an unknown-profile error into the diagnostic listing the
/// profiles that do exist.
pub fn unknown_profile(err: ConfigError, cfg: &rwtool_config::Config) -> CliError {
    match err {
        ConfigError::UnknownProfile { name } => {
            let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
            names.sort();
            let available = if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            };
            CliError::ProfileNotFound { name, available }
        }
        other => CliError::Config(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_distinct_exit_codes() {
        let cases = [
            (
                CoreError::Network {
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Authentication {
                    message: "bad token".into(),
                },
                exit_code::AUTH,
            ),
            (CoreError::NotFound { message: None }, exit_code::NOT_FOUND),
            (
                CoreError::Validation {
                    message: "Domain name is required".into(),
                },
                exit_code::VALIDATION,
            ),
            (
                CoreError::Server {
                    status: Some(500),
                    message: None,
                    code: None,
                },
                exit_code::SERVER,
            ),
        ];
        for (core, expected) in cases {
            assert_eq!(CliError::from(core).exit_code(), expected);
        }
    }

    #[test]
    fn not_found_gets_resource_context() {
        let err = CliError::from(CoreError::NotFound { message: None }).for_resource(
            "domain",
            "d-9",
            "domains list",
        );
        assert!(matches!(
            &err,
            CliError::NotFound { identifier, .. } if identifier == "d-9"
        ));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = CliError::from(CoreError::Validation {
            message: "Please provide a reason for rejection".into(),
        });
        assert_eq!(err.to_string(), "Please provide a reason for rejection");
    }
}
