// ── Core error types ──
//
// User-facing errors from controlr-core. The `From<controlr_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants; hosts match on these, never on HTTP details.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- sign in again: {message}")]
    SessionExpired { message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Not connected -- call connect() first")]
    NotConnected,

    /// The controller was shut down; build a new one to reconnect.
    #[error("Controller has been shut down")]
    ShutDown,

    // ── Transport errors ─────────────────────────────────────────────
    #[error("Cannot reach cloud service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── API errors ───────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response: {message}")]
    Protocol { message: String },

    #[error("Property '{property}' has value {value}, expected {expected}")]
    UnexpectedValue {
        property: String,
        value: String,
        expected: &'static str,
    },

    // ── Accessory errors ─────────────────────────────────────────────
    #[error("Characteristic {characteristic} is read-only")]
    ReadOnly { characteristic: String },

    #[error("Invalid value for {characteristic}: {reason}")]
    InvalidValue {
        characteristic: String,
        reason: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if polling again later may succeed.
    ///
    /// A 401 on an ordinary request counts: it is usually a request that
    /// raced a token renewal, and the next poll carries the new token.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed { .. } => true,
            Self::Api {
                status: Some(status),
                ..
            } => *status >= 500 || *status == 429 || *status == 401,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<controlr_api::Error> for CoreError {
    fn from(err: controlr_api::Error) -> Self {
        match err {
            controlr_api::Error::Authentication { message, .. } => {
                CoreError::AuthenticationFailed { message }
            }
            controlr_api::Error::RefreshRejected { message } => {
                CoreError::SessionExpired { message }
            }
            controlr_api::Error::MissingToken => CoreError::NotAuthenticated,
            controlr_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            controlr_api::Error::Protocol { message, body: _ } => CoreError::Protocol { message },
            controlr_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            controlr_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            controlr_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
        }
    }
}
