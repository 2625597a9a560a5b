use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Ayla field-service region hosting the account.
///
/// Determines the base URL for every request; accounts are not
/// visible across regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRegion {
    /// North America (Rinnai's default).
    #[default]
    Us,
    /// Europe.
    Eu,
    /// Mainland China.
    Cn,
}

impl ServiceRegion {
    /// Root URL of the field service for this region.
    pub fn service_url(self) -> &'static str {
        match self {
            Self::Us => "https://ads-field.aylanetworks.com",
            Self::Eu => "https://ads-field-eu.aylanetworks.com",
            Self::Cn => "https://ads-field.ayla.com.cn",
        }
    }

    /// Parsed form of [`service_url`](Self::service_url).
    pub fn base_url(self) -> Result<Url, Error> {
        Ok(Url::parse(self.service_url())?)
    }
}

/// OEM application credentials sent alongside the user's email/password
/// on sign-in. Issued per mobile app by the cloud vendor.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: SecretString,
}

/// Point-in-time copy of the session's token state, safe to log.
///
/// Carries no secret material -- only whether each token is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStatus {
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    pub expires_at: Option<DateTime<Utc>>,
}
