//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use controlr_config::ConfigError;
use controlr_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the cloud service at {url}")]
    #[diagnostic(
        code(controlr::connection_failed),
        help(
            "Check your network connection and the configured region.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(controlr::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(controlr::auth_failed),
        help(
            "Verify the account email, password, and application credentials.\n\
             Run: controlr config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Session expired: {message}")]
    #[diagnostic(code(controlr::session_expired), help("Run the command again to sign in."))]
    SessionExpired { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(controlr::no_credentials),
        help(
            "Store one with: controlr config set-password --profile {profile}\n\
             Or set the CONTROLR_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("No application secret configured for profile '{profile}'")]
    #[diagnostic(
        code(controlr::no_app_secret),
        help(
            "Store one with: controlr config set-password --app-secret --profile {profile}\n\
             Or set the CONTROLR_APP_SECRET environment variable."
        )
    )]
    NoAppSecret { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(controlr::not_found),
        help("Run: controlr {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(controlr::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("Unexpected cloud response: {message}")]
    #[diagnostic(code(controlr::protocol))]
    Protocol { message: String },

    #[error("{characteristic} is read-only")]
    #[diagnostic(code(controlr::read_only))]
    ReadOnly { characteristic: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(controlr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(controlr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: controlr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(controlr::no_config),
        help(
            "Create one with: controlr config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(controlr::config),
        help("Check the config file with: controlr config show")
    )]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(controlr::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(controlr::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::SessionExpired { .. }
            | Self::NoCredentials { .. }
            | Self::NoAppSecret { .. } => exit_code::AUTH,
            Self::NotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ReadOnly { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::SessionExpired { message } => CliError::SessionExpired { message },
            CoreError::NotAuthenticated | CoreError::NotConnected => CliError::SessionExpired {
                message: "not signed in".into(),
            },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            err @ CoreError::ShutDown => CliError::ApiError {
                status: None,
                message: err.to_string(),
            },
            CoreError::Api { message, status } => CliError::ApiError { status, message },
            CoreError::Protocol { message } => CliError::Protocol { message },
            err @ CoreError::UnexpectedValue { .. } => CliError::Protocol {
                message: err.to_string(),
            },
            CoreError::ReadOnly { characteristic } => CliError::ReadOnly { characteristic },
            CoreError::InvalidValue {
                characteristic,
                reason,
            } => CliError::Validation {
                field: characteristic,
                reason,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::NoAppSecret { profile } => CliError::NoAppSecret { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
