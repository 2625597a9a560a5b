use thiserror::Error;

/// Top-level error type for the `controlr-api` crate.
///
/// Covers every failure mode of the cloud session: credential exchange,
/// token refresh, authorized requests, and payload decoding.
/// `controlr-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in or token refresh was rejected (bad credentials, 5xx, etc.)
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// The refresh token was rejected with 401 and has been discarded.
    /// A fresh sign-in is required before the session can renew again.
    #[error("Refresh token rejected -- sign-in required: {message}")]
    RefreshRejected { message: String },

    // ── API ─────────────────────────────────────────────────────────
    /// An authorized call was attempted with no access token.
    /// Raised before any network traffic.
    #[error("Missing access token -- authenticate first")]
    MissingToken,

    /// Non-success HTTP status from an authorized call.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The response decoded but did not have the expected shape.
    #[error("Unexpected payload: {message}")]
    Protocol { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Returns `true` for failures of the credential exchange itself
    /// (sign-in or refresh), as opposed to failures of authorized calls.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::RefreshRejected { .. }
        )
    }

    /// Returns `true` if this error indicates the session is no longer
    /// usable and a fresh sign-in might resolve it.
    ///
    /// A 401 on an ordinary request counts, but does not by itself
    /// clear any session state.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::RefreshRejected { .. } | Self::MissingToken | Self::Http { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth polling again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::RefreshRejected { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
