// Cloud session
//
// Owns the credentials-to-token exchange, the token state, and proactive
// renewal. Every authorized endpoint (directory, properties) is an
// inherent method in its own module and goes through `authorized_request`
// so the missing-token check and bearer header live in one place.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{AppCredentials, ServiceRegion, TokenStatus};
use crate::error::Error;
use crate::models::{ErrorBody, TokenResponse};
use crate::transport::TransportConfig;

/// Window before expiry during which `refresh_if_needed` renews the token.
pub const REFRESH_GRACE_PERIOD_SECS: i64 = 12 * 60 * 60;

const SIGN_IN_PATH: &[&str] = &["users", "sign_in"];
const REFRESH_PATH: &[&str] = &["users", "refresh_token"];

const JSON: &str = "application/json";

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Default)]
struct TokenState {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

/// What a call to [`Session::refresh_if_needed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No refresh token held; nothing to do until the next sign-in.
    NoRefreshToken,
    /// The access token is still outside the grace period.
    NotDue { expires_at: DateTime<Utc> },
    /// A refresh exchange ran and the tokens were replaced.
    Refreshed { expires_at: DateTime<Utc> },
}

/// Authenticated session against the Ayla device cloud.
///
/// Holds an HTTP client rather than being one. Token state sits behind an
/// async `RwLock`; sign-in and refresh additionally take the `renewal`
/// mutex so overlapping renewals cannot let an older refresh token
/// overwrite a newer one. Share it across tasks with `Arc<Session>`.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    app: AppCredentials,
    tokens: RwLock<TokenState>,
    renewal: Mutex<()>,
}

impl Session {
    /// Create an unauthenticated session for a service region.
    pub fn new(
        region: ServiceRegion,
        app: AppCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, region.base_url()?, app))
    }

    /// Create a session with a pre-built `reqwest::Client` and an explicit
    /// base URL (proxies, test servers).
    pub fn with_client(http: reqwest::Client, base_url: Url, app: AppCredentials) -> Self {
        Self {
            http,
            base_url,
            app,
            tokens: RwLock::new(TokenState::default()),
            renewal: Mutex::new(()),
        }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether an access token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access_token.is_some()
    }

    /// Whether a refresh token is currently held.
    pub async fn has_refresh_token(&self) -> bool {
        self.tokens.read().await.refresh_token.is_some()
    }

    /// When the current access token expires, if one was ever issued.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.tokens.read().await.expires_at
    }

    /// Secret-free snapshot of the token state.
    pub async fn token_status(&self) -> TokenStatus {
        let tokens = self.tokens.read().await;
        TokenStatus {
            has_access_token: tokens.access_token.is_some(),
            has_refresh_token: tokens.refresh_token.is_some(),
            expires_at: tokens.expires_at,
        }
    }

    // ── Credential exchange ──────────────────────────────────────────

    /// Exchange email/password for a token set.
    ///
    /// `POST /users/sign_in`. On any failure the session is left with no
    /// tokens at all; a non-200 response is `Error::Authentication`.
    pub async fn authenticate(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        let _renewal = self.renewal.lock().await;

        match self.sign_in(email, password).await {
            Ok(expires_at) => {
                info!(%expires_at, "signed in");
                Ok(())
            }
            Err(e) => {
                *self.tokens.write().await = TokenState::default();
                Err(e)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<DateTime<Utc>, Error> {
        let url = self.endpoint(SIGN_IN_PATH)?;
        info!(email, "signing in");

        let body = json!({
            "user": {
                "email": email,
                "password": password.expose_secret(),
                "application": {
                    "app_id": self.app.app_id,
                    "app_secret": self.app.app_secret.expose_secret(),
                },
            },
        });

        let resp = self
            .http
            .post(url)
            .header(ACCEPT, JSON)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let message = error_message(status, &resp.text().await.unwrap_or_default());
            return Err(Error::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        self.store_tokens(resp).await
    }

    /// Renew the access token if it expires within the grace period.
    ///
    /// `POST /users/refresh_token`. Performs no network call when no
    /// refresh token is held or when expiry is more than
    /// [`REFRESH_GRACE_PERIOD_SECS`] away. A 401 discards the refresh
    /// token, so later calls are no-ops until [`authenticate`](Self::authenticate)
    /// succeeds again.
    pub async fn refresh_if_needed(&self) -> Result<RefreshOutcome, Error> {
        let _renewal = self.renewal.lock().await;

        let (refresh_token, expires_at) = {
            let tokens = self.tokens.read().await;
            (tokens.refresh_token.clone(), tokens.expires_at)
        };

        let Some(refresh_token) = refresh_token else {
            warn!("token refresh skipped: no refresh token");
            return Ok(RefreshOutcome::NoRefreshToken);
        };

        if let Some(expires_at) = expires_at {
            if expires_at - Utc::now() > TimeDelta::seconds(REFRESH_GRACE_PERIOD_SECS) {
                info!(%expires_at, "token refresh skipped: access token still fresh");
                return Ok(RefreshOutcome::NotDue { expires_at });
            }
        }

        let url = self.endpoint(REFRESH_PATH)?;
        info!("refreshing access token");

        let body = json!({
            "user": { "refresh_token": refresh_token.expose_secret() },
        });

        let resp = self
            .http
            .post(url)
            .header(ACCEPT, JSON)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(status, &resp.text().await.unwrap_or_default());
            self.tokens.write().await.refresh_token = None;
            warn!("refresh token rejected; sign-in required");
            return Err(Error::RefreshRejected { message });
        }
        if status != StatusCode::OK {
            let message = error_message(status, &resp.text().await.unwrap_or_default());
            return Err(Error::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        let expires_at = self.store_tokens(resp).await?;
        info!(%expires_at, "access token refreshed");
        Ok(RefreshOutcome::Refreshed { expires_at })
    }

    /// Decode a token response and replace all three token fields.
    async fn store_tokens(&self, resp: reqwest::Response) -> Result<DateTime<Utc>, Error> {
        let text = resp.text().await?;
        let parsed: TokenResponse =
            serde_json::from_str(&text).map_err(|e| protocol_error(&e, text.clone()))?;

        let lifetime = TimeDelta::try_seconds(parsed.expires_in).ok_or_else(|| Error::Protocol {
            message: format!("expires_in out of range: {}", parsed.expires_in),
            body: String::new(),
        })?;
        let expires_at = Utc::now() + lifetime;

        *self.tokens.write().await = TokenState {
            access_token: Some(SecretString::from(parsed.access_token)),
            refresh_token: Some(SecretString::from(parsed.refresh_token)),
            expires_at: Some(expires_at),
        };
        Ok(expires_at)
    }

    // ── Authorized requests ──────────────────────────────────────────

    /// Send an authorized request and decode a 2xx JSON body into `T`.
    ///
    /// Fails with [`Error::MissingToken`] before touching the network when
    /// no access token is held. Non-2xx responses become [`Error::Http`];
    /// bodies that do not decode into `T` become [`Error::Protocol`].
    pub async fn authorized_request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let resp = self.send_authorized(method, segments, query, body).await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        serde_json::from_str(&text).map_err(|e| protocol_error(&e, text))
    }

    /// Send an authorized request and hand back the raw response, for
    /// endpoints whose success criterion is a specific status code.
    pub(crate) async fn send_authorized(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, Error> {
        let token = self
            .tokens
            .read()
            .await
            .access_token
            .clone()
            .ok_or(Error::MissingToken)?;

        let url = self.endpoint(segments)?;
        debug!("{method} {url}");

        let mut auth = HeaderValue::from_str(&format!("auth_token {}", token.expose_secret()))
            .map_err(|_| Error::Protocol {
                message: "access token is not a valid header value".into(),
                body: String::new(),
            })?;
        auth.set_sensitive(true);

        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, JSON)
            .header(AUTHORIZATION, auth);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Build a message from an error body: the decoded `error` field when
/// present, else a short preview of the raw body.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| body.chars().take(BODY_PREVIEW_CHARS).collect());
    let reason = status.canonical_reason().unwrap_or("Unknown");
    format!("{} {reason}: {detail}", status.as_u16())
}

fn protocol_error(err: &serde_json::Error, body: String) -> Error {
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    Error::Protocol {
        message: format!("{err} (body preview: {preview:?})"),
        body,
    }
}
